mod client;
mod endpoint;
mod envelope;
mod error;
mod request;
mod transport;

pub use client::TrainingBackendClient;
pub use endpoint::Endpoint;
pub use envelope::{ResponseEnvelope, CODE_SUCCESS, STATUS_SUCCESS};
pub use error::ClientError;
pub use request::{
    model_train_name, resolve_epochs, DatasetRef, ProjectRef, RequestContext, TrainOptions,
    TrainRequest, DEFAULT_EPOCHS,
};
pub use transport::{HttpTransport, Transport, TransportResponse};
