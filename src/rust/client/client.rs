use log::{debug, error, info, warn};
use serde_json::{Map, Value};
use url::Url;

use super::endpoint::Endpoint;
use super::envelope::ResponseEnvelope;
use super::error::ClientError;
use super::request::{DatasetRef, ProjectRef, RequestContext, TrainOptions, TrainRequest};
use super::transport::{HttpTransport, Transport};
use crate::config::ClientConfig;

/// Client for the OBM training backend.
///
/// Every public operation is fail-soft: transport errors, unexpected status
/// codes and malformed bodies are logged and collapsed into a sentinel value.
/// Nothing here retries.
///
/// ```no_run
/// # async fn run() -> Result<(), obm_client::ClientError> {
/// use obm_client::{ClientConfig, RequestContext, TrainingBackendClient};
///
/// let client = TrainingBackendClient::new(ClientConfig::new(true, "v1", "http://obm.local"))?;
/// let ctx = RequestContext::new("ws1", "p1");
/// if let Some(models) = client.list_models(&ctx).await {
///     println!("{}", models);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct TrainingBackendClient<T = HttpTransport> {
    config: ClientConfig,
    base_url: Url,
    transport: T,
}

impl TrainingBackendClient<HttpTransport> {
    /// Creates a client over the default `reqwest` transport.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        Self::with_transport(config, HttpTransport::new()?)
    }
}

impl<T: Transport> TrainingBackendClient<T> {
    /// Creates a client over a custom transport.
    ///
    /// Fails if the configured base URL does not parse.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(config.base_url.clone()));
        }
        Ok(Self { config, base_url, transport })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Absolute URL of `endpoint` under the configured base URL and version.
    pub fn endpoint_url(&self, endpoint: Endpoint<'_>) -> Result<Url, ClientError> {
        endpoint.url(&self.base_url, &self.config.api_version)
    }

    /// Lists the model architectures available to the context's project.
    ///
    /// Returns the envelope's `data` (a JSON array of descriptors) or `None`
    /// when the backend is disabled, unreachable, answers with a non-200
    /// status, or sends an invalid envelope. No request is made when disabled.
    pub async fn list_models(&self, context: &RequestContext) -> Option<Value> {
        if !self.config.enabled {
            info!("OBM API disabled, skipping model list");
            return None;
        }

        info!("Fetching model list");
        let endpoint = Endpoint::ListModels {
            workspace_id: context.workspace_id().unwrap_or_default(),
            project_id: context.project_id().unwrap_or_default(),
        };
        match self.fetch_envelope_data(endpoint).await {
            Ok(models) => {
                info!("Model list fetched (found: {})", models.is_some());
                models
            }
            Err(e) => {
                error!("Failed to fetch model list: {}", e);
                None
            }
        }
    }

    /// Submits a training job.
    ///
    /// On a 200 response returns the decoded body. On any other status returns
    /// an empty JSON object rather than `None`; `None` is reserved for
    /// transport and decode failures. `dataset_version` is only logged.
    pub async fn train(
        &self,
        workspace_slug: &str,
        project: &ProjectRef,
        dataset_version: &str,
        model_id: &str,
        dataset: &DatasetRef,
        options: Option<&TrainOptions>,
    ) -> Option<Value> {
        info!(
            "Starting training: project {}, dataset version {}, model {}",
            project.id, dataset_version, model_id
        );
        let request = TrainRequest::new(workspace_slug, project, model_id, dataset, options);
        match self.submit(&request).await {
            Ok(payload) => {
                info!("Training request finished");
                Some(payload)
            }
            Err(e) => {
                error!("Failed to submit training request: {}", e);
                None
            }
        }
    }

    /// Fetches the per-step metrics of a training run.
    ///
    /// Same contract as [`list_models`](Self::list_models), except that it is
    /// not gated on the enabled flag.
    pub async fn train_details(&self, context: &RequestContext, version_name: &str) -> Option<Value> {
        info!("Fetching training details for {}", version_name);
        let endpoint = Endpoint::TrainDetails {
            workspace_id: context.workspace_id().unwrap_or_default(),
            project_id: context.project_id().unwrap_or_default(),
            version_name,
        };
        match self.fetch_envelope_data(endpoint).await {
            Ok(details) => {
                info!("Training details fetched (found: {})", details.is_some());
                details
            }
            Err(e) => {
                error!("Failed to fetch training details: {}", e);
                None
            }
        }
    }

    async fn fetch_envelope_data(&self, endpoint: Endpoint<'_>) -> Result<Option<Value>, ClientError> {
        let url = self.endpoint_url(endpoint)?;
        info!("GET {}", url);
        let response = self.transport.get(&url).await?;
        info!("Response status: {}", response.status);

        if !response.is_ok() {
            warn!("Unexpected status {} from {}", response.status, url);
            return Ok(None);
        }

        let envelope = ResponseEnvelope::parse(&response.body)?;
        if !is_valid_response(&envelope) {
            warn!(
                "Invalid response envelope from {}: code {:?}, status {:?}",
                url, envelope.code, envelope.status
            );
            return Ok(None);
        }
        Ok(envelope.into_data())
    }

    async fn submit(&self, request: &TrainRequest) -> Result<Value, ClientError> {
        let url = self.endpoint_url(Endpoint::Train)?;
        let body = serde_json::to_value(request)?;
        info!("POST {}", url);
        debug!("Training request body: {}", body);

        let response = self.transport.post_json(&url, &body).await?;
        info!("Response status: {}", response.status);

        if !response.is_ok() {
            warn!("Unexpected status {} from {}", response.status, url);
            return Ok(Value::Object(Map::new()));
        }

        let payload: Value = serde_json::from_str(&response.body)?;
        debug!("Training response payload: {}", payload);
        Ok(payload)
    }
}

fn is_valid_response(envelope: &ResponseEnvelope) -> bool {
    envelope.is_valid()
}

// Compile-time verification that the default client can be shared across tasks
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<TrainingBackendClient>();
    }
};
