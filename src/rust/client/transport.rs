use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use url::Url;

use super::error::ClientError;

/// Raw outcome of an HTTP exchange: status code and body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// The HTTP layer the client sits on.
///
/// Implementations return `Ok` for any response the server produced, whatever
/// its status; `Err` is reserved for failures to get a response at all.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> impl Future<Output = Result<TransportResponse, ClientError>> + Send;

    fn post_json(
        &self,
        url: &Url,
        body: &Value,
    ) -> impl Future<Output = Result<TransportResponse, ClientError>> + Send;
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a client that sends `Content-Type: application/json` and
    /// `Accept: */*` on every request.
    pub fn new() -> Result<Self, ClientError> {
        Self::from_builder(reqwest::Client::builder())
    }

    /// Same as [`new`](Self::new), on top of a caller-tuned builder such as
    /// one with proxy or TLS settings.
    pub fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        let client = builder.default_headers(headers).build()?;
        Ok(Self { client })
    }

    async fn read(response: reqwest::Response) -> Result<TransportResponse, ClientError> {
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(TransportResponse { status, body })
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<TransportResponse, ClientError> {
        let response = self.client.get(url.clone()).send().await?;
        Self::read(response).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<TransportResponse, ClientError> {
        let response = self.client.post(url.clone()).json(body).send().await?;
        Self::read(response).await
    }
}
