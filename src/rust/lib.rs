//! Client for the OBM object-detection model-training backend.
//!
//! Three operations are exposed: listing the model architectures available to
//! a project, submitting a training job, and polling the metrics of a training
//! run. All of them are fail-soft: failures are logged and surface as `None`
//! (or an empty object for a rejected training job), never as an error.
//!
//! # Basic Usage
//!
//! ```no_run
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! use obm_client::{
//!     ClientConfig, DatasetRef, ProjectRef, RequestContext, TrainOptions, TrainingBackendClient,
//! };
//!
//! let client = TrainingBackendClient::new(ClientConfig::from_env()?)?;
//! let ctx = RequestContext::new("ws1", "p1");
//!
//! let models = client.list_models(&ctx).await;
//!
//! let job = client
//!     .train(
//!         "workspace-slug",
//!         &ProjectRef::new("p1", "project-slug"),
//!         "ver_234",
//!         "YOLOv5n",
//!         &DatasetRef::new(234, "ver_234_345"),
//!         Some(&TrainOptions::default().with_epochs(50)),
//!     )
//!     .await;
//!
//! let details = client.train_details(&ctx, "ver_234_345").await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod models;

pub use client::{
    model_train_name, resolve_epochs, ClientError, DatasetRef, Endpoint, HttpTransport, ProjectRef,
    RequestContext, ResponseEnvelope, TrainOptions, TrainRequest, TrainingBackendClient, Transport,
    TransportResponse, DEFAULT_EPOCHS,
};
pub use config::{ClientConfig, ConfigError};
pub use models::{ModelArchitecture, TrainStep};

pub fn init_logger() {
    env_logger::init();
}
