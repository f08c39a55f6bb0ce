use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use obm_client::models::best_step;
use obm_client::{
    ClientConfig, DatasetRef, ModelArchitecture, ProjectRef, RequestContext, TrainOptions,
    TrainStep, TrainingBackendClient,
};
use serde_json::Value;
use std::time::Instant;

/// Command-line access to the OBM training backend.
///
/// Settings default to OBM_ENABLED, OBM_API_VERSION and OBM_BASE_URL.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable or disable the backend (overrides OBM_ENABLED)
    #[arg(long, global = true)]
    enabled: Option<bool>,

    /// API version path segment (overrides OBM_API_VERSION)
    #[arg(long, global = true)]
    api_version: Option<String>,

    /// Backend base URL (overrides OBM_BASE_URL)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Render known payloads as a table instead of JSON
    #[arg(long, global = true)]
    table: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the model architectures available to a project
    Models(ContextArgs),
    /// Submit a training job
    Train(TrainArgs),
    /// Show the per-step metrics of a training run
    Details {
        #[command(flatten)]
        context: ContextArgs,
        /// Training run version name
        #[arg(long)]
        version_name: String,
    },
}

#[derive(Args)]
struct ContextArgs {
    /// Workspace id
    #[arg(long)]
    workspace: String,
    /// Project id
    #[arg(long)]
    project: String,
}

impl From<&ContextArgs> for RequestContext {
    fn from(args: &ContextArgs) -> Self {
        RequestContext::new(args.workspace.as_str(), args.project.as_str())
    }
}

#[derive(Args)]
struct TrainArgs {
    #[arg(long)]
    workspace_slug: String,
    #[arg(long)]
    project_id: String,
    #[arg(long)]
    project_slug: String,
    /// Dataset version identifier (informational)
    #[arg(long)]
    dataset_version: String,
    #[arg(long)]
    dataset_version_no: u64,
    #[arg(long)]
    dataset_version_name: String,
    /// Architecture name, e.g. YOLOv5n
    #[arg(long)]
    arch: String,
    /// Requested epochs (capped at the default ceiling)
    #[arg(long)]
    epochs: Option<u32>,
    /// Start from pre-trained weights
    #[arg(long)]
    pre_trained: bool,
}

fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("reading OBM_* environment")?;
    if let Some(enabled) = cli.enabled {
        config = config.with_enabled(enabled);
    }
    if let Some(version) = &cli.api_version {
        config = config.with_api_version(version);
    }
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    info!("Using backend {} ({}), enabled: {}", config.base_url, config.api_version, config.enabled);
    let client = TrainingBackendClient::new(config).context("building client")?;

    let start_time = Instant::now();
    let result = match &cli.command {
        Command::Models(ctx) => client.list_models(&ctx.into()).await,
        Command::Train(args) => {
            let options = TrainOptions {
                epochs: args.epochs,
                pre_trained: Some(args.pre_trained),
            };
            client
                .train(
                    &args.workspace_slug,
                    &ProjectRef::new(args.project_id.as_str(), args.project_slug.as_str()),
                    &args.dataset_version,
                    &args.arch,
                    &DatasetRef::new(args.dataset_version_no, args.dataset_version_name.as_str()),
                    Some(&options),
                )
                .await
        }
        Command::Details { context, version_name } => {
            client.train_details(&context.into(), version_name).await
        }
    };
    info!("Request finished in {:.2?}", start_time.elapsed());

    match (&cli.command, result, cli.table) {
        (Command::Models(_), Some(data), true) => print_models(&data)?,
        (Command::Details { .. }, Some(data), true) => print_steps(&data)?,
        (_, result, _) => {
            let value = result.unwrap_or(Value::Null);
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
    }

    Ok(())
}

fn print_models(data: &Value) -> Result<()> {
    let models = ModelArchitecture::list_from(data)?;
    println!("{:<12} {:>6} {:>8} {:>10} {:>9} {:>8}", "model", "size", "mAP50", "mAP50-95", "params(M)", "FLOPs(B)");
    for m in models {
        let map = m.map_val.as_ref();
        println!(
            "{:<12} {:>6} {:>8} {:>10} {:>9} {:>8}",
            m.model,
            m.size.map(|s| s.to_string()).unwrap_or_else(|| "-".to_string()),
            fmt_opt(map.and_then(|v| v.val_50)),
            fmt_opt(map.and_then(|v| v.val_50_59)),
            fmt_opt(m.params_m),
            fmt_opt(m.flops_b),
        );
    }
    Ok(())
}

fn print_steps(data: &Value) -> Result<()> {
    let steps = TrainStep::list_from(data)?;
    println!("{:>6} {:>10} {:>10} {:>9} {:>8} {:>10}", "step", "train_loss", "val_loss", "precision", "recall", "mAP50-95");
    for s in &steps {
        println!(
            "{:>6} {:>10} {:>10} {:>9} {:>8} {:>10}",
            s.step,
            fmt_opt(s.train.map(|l| l.total())),
            fmt_opt(s.val.map(|l| l.total())),
            fmt_opt(s.metrics.map(|m| m.precision)),
            fmt_opt(s.metrics.map(|m| m.recall)),
            fmt_opt(s.metrics.map(|m| m.map_0_5_0_95)),
        );
    }
    if let Some(best) = best_step(&steps) {
        println!("\nBest step: {}", best.step);
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}
