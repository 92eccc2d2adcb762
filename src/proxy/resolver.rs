//! Resolves the caller's own external address through the echo service

use crate::error::{ResolutionFailure, VerifyError};
use crate::proxy::checker::CheckerConfig;
use crate::proxy::models::{EchoFormat, TrueAddress};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Direct (unproxied) client for the reference echo service
pub struct AddressResolver {
    client: Client,
    test_url: String,
    format: EchoFormat,
    timeout: Duration,
}

impl AddressResolver {
    /// Build a resolver sharing the checker's reference URL, format and timeout.
    /// Proxy environment variables are ignored so the baseline is really ours.
    pub fn new(config: &CheckerConfig) -> Result<Self, VerifyError> {
        let client = Client::builder()
            .no_proxy()
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            test_url: config.test_url.clone(),
            format: config.format,
            timeout: config.timeout,
        })
    }

    /// Fetch the true address once. Any failure here means no probing can happen.
    #[instrument(skip(self), fields(url = %self.test_url))]
    pub async fn resolve(&self) -> Result<TrueAddress, ResolutionFailure> {
        let body = match tokio::time::timeout(self.timeout, self.fetch()).await {
            Ok(body) => body?,
            Err(_) => return Err(ResolutionFailure::Timeout),
        };

        let addr = self
            .format
            .extract(&body)
            .map_err(ResolutionFailure::Malformed)?;

        if addr.is_empty() {
            return Err(ResolutionFailure::Empty);
        }

        debug!(address = %addr, "resolved true address");
        Ok(TrueAddress::new(addr))
    }

    async fn fetch(&self) -> Result<String, ResolutionFailure> {
        let response = self
            .client
            .get(&self.test_url)
            .send()
            .await
            .map_err(request_failure)?;

        if !response.status().is_success() {
            return Err(ResolutionFailure::Status(response.status().as_u16()));
        }

        response.text().await.map_err(request_failure)
    }
}

fn request_failure(e: reqwest::Error) -> ResolutionFailure {
    if e.is_timeout() {
        ResolutionFailure::Timeout
    } else {
        ResolutionFailure::Request(e)
    }
}
