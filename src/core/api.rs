// src/core/api.rs

use crate::core::error::ApiError;
use crate::core::models::{
    CheckoutResponse, ErrorBody, OrderRequest, ReportReceipt, ScanRequest, ScanResult, TrackEvent,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// The remote services the session talks to.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `POST /scan`. A body that fails to decode or breaks the count
    /// invariant is a [`ApiError::MalformedResponse`].
    async fn scan(&self, url: &str) -> Result<ScanResult, ApiError>;

    /// `POST /checkout`. Returns the payment redirect target.
    async fn checkout(&self, url: &str, email: &str) -> Result<String, ApiError>;

    /// `POST /report` (legacy email delivery).
    async fn report(&self, url: &str, email: &str) -> Result<ReportReceipt, ApiError>;

    /// `POST /track`. Best effort; failures are swallowed.
    async fn track(&self, event: TrackEvent);
}

/// [`Backend`] over HTTP/JSON.
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("WebSecCheck/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| {
                error!(error = %e, "Failed to build HTTP client.");
                ApiError::from(e)
            })?;
        Ok(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
    }

    #[cfg(test)]
    fn with_client(client: Client, base_url: &str) -> Self {
        Self { client, base_url: base_url.trim_end_matches('/').to_string() }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path);
        debug!(url = %url, "Sending request.");
        let response = self.client.post(&url).json(body).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Request failed.");
            ApiError::from(e)
        })?;
        decode(response).await
    }
}

/// Maps non-2xx responses to transport errors carrying the body's `detail`,
/// and 2xx bodies that do not decode to malformed-response errors.
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        let detail = serde_json::from_slice::<ErrorBody>(&bytes).ok().and_then(|b| b.detail);
        warn!(status = %status, detail = ?detail, "Service returned an error status.");
        return Err(ApiError::transport(Some(status.as_u16()), detail));
    }
    serde_json::from_slice(&bytes).map_err(|e| ApiError::MalformedResponse(e.to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn scan(&self, url: &str) -> Result<ScanResult, ApiError> {
        info!(url, "Requesting scan.");
        let result: ScanResult = self.post("scan", &ScanRequest { url: url.to_string() }).await?;
        result.verify().map_err(ApiError::MalformedResponse)?;
        Ok(result)
    }

    async fn checkout(&self, url: &str, email: &str) -> Result<String, ApiError> {
        info!(url, "Requesting checkout.");
        let body = OrderRequest { url: url.to_string(), email: email.to_string() };
        let response: CheckoutResponse = self.post("checkout", &body).await?;
        redirect_target(response)
    }

    async fn report(&self, url: &str, email: &str) -> Result<ReportReceipt, ApiError> {
        info!(url, "Requesting emailed report.");
        let body = OrderRequest { url: url.to_string(), email: email.to_string() };
        self.post("report", &body).await
    }

    async fn track(&self, event: TrackEvent) {
        let url = self.endpoint("track");
        if let Err(e) = self.client.post(&url).json(&event).send().await {
            debug!(path = %event.path, error = %e, "Page-view beacon dropped.");
        }
    }
}

/// A 2xx checkout body without a usable `init_point` is an error.
pub fn redirect_target(response: CheckoutResponse) -> Result<String, ApiError> {
    response
        .init_point
        .filter(|target| !target.trim().is_empty())
        .ok_or_else(|| ApiError::MalformedResponse("checkout response has no init_point".to_string()))
}
