//! Proxy checker module: probes candidates and classifies their egress address

use crate::error::ProbeFailure;
use crate::proxy::models::{EchoFormat, ProbeOutcome, Proxy, TrueAddress};
use futures::stream::{self, StreamExt};
use reqwest::{Client, Proxy as ReqwestProxy};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// Default timeout for proxy checks in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default number of concurrent checks
pub const DEFAULT_CONCURRENCY: usize = 10;

/// Default address-echo service
pub const DEFAULT_TEST_URL: &str = "http://httpbin.org/ip";

/// Configuration for proxy checker
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Timeout for each request, direct or proxied
    pub timeout: Duration,
    /// Maximum number of probes in flight
    pub concurrency: usize,
    /// Address-echo URL, fetched directly and through every candidate
    pub test_url: String,
    /// How to read the echoed address from the response body
    pub format: EchoFormat,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            concurrency: DEFAULT_CONCURRENCY,
            test_url: DEFAULT_TEST_URL.to_string(),
            format: EchoFormat::default(),
        }
    }
}

impl CheckerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    pub fn with_test_url(mut self, url: String) -> Self {
        self.test_url = url;
        self
    }

    pub fn with_format(mut self, format: EchoFormat) -> Self {
        self.format = format;
        self
    }
}

/// Proxy checker for validating proxies
#[derive(Debug, Clone, Default)]
pub struct ProxyChecker {
    config: CheckerConfig,
}

impl ProxyChecker {
    /// Create a new proxy checker with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new proxy checker with custom configuration
    pub fn with_config(config: CheckerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Probe a single proxy with one request. There are no retries.
    pub async fn check_proxy(&self, proxy: &Proxy, true_addr: &TrueAddress) -> ProbeOutcome {
        let client = match self.create_client(proxy) {
            Ok(client) => client,
            Err(e) => return ProbeOutcome::failed(proxy.clone(), ProbeFailure::Client(e.to_string())),
        };

        let body = match tokio::time::timeout(self.config.timeout, self.fetch(&client)).await {
            Ok(Ok(body)) => body,
            Ok(Err(reason)) => return ProbeOutcome::failed(proxy.clone(), reason),
            Err(_) => return ProbeOutcome::failed(proxy.clone(), ProbeFailure::Timeout),
        };

        match self.config.format.extract(&body) {
            Ok(egress) => classify(proxy, egress, true_addr),
            Err(e) => ProbeOutcome::failed(proxy.clone(), ProbeFailure::Malformed(e)),
        }
    }

    /// Check proxies concurrently, streaming outcomes in completion order.
    ///
    /// At most `concurrency` probes are in flight. The channel closes once every
    /// proxy has been attempted.
    pub fn check_proxies_stream(
        &self,
        proxies: Vec<Proxy>,
        true_addr: TrueAddress,
    ) -> mpsc::Receiver<ProbeOutcome> {
        let concurrency = self.config.concurrency.max(1);
        let (tx, rx) = mpsc::channel(concurrency);
        let checker = self.clone();

        tokio::spawn(async move {
            let checker = &checker;
            let true_addr = &true_addr;

            let mut outcomes = stream::iter(proxies)
                .map(move |proxy| async move { checker.check_proxy(&proxy, true_addr).await })
                .buffer_unordered(concurrency);

            while let Some(outcome) = outcomes.next().await {
                if tx.send(outcome).await.is_err() {
                    debug!("outcome receiver dropped, stopping checks");
                    break;
                }
            }
        });

        rx
    }

    /// Check multiple proxies concurrently and collect every outcome
    pub async fn check_proxies(&self, proxies: Vec<Proxy>, true_addr: &TrueAddress) -> Vec<ProbeOutcome> {
        let mut rx = self.check_proxies_stream(proxies, true_addr.clone());
        let mut results = Vec::new();
        while let Some(outcome) = rx.recv().await {
            results.push(outcome);
        }
        results
    }

    async fn fetch(&self, client: &Client) -> Result<String, ProbeFailure> {
        let response = client
            .get(&self.config.test_url)
            .send()
            .await
            .map_err(transport_failure)?;

        if !response.status().is_success() {
            return Err(ProbeFailure::Status(response.status().as_u16()));
        }

        response.text().await.map_err(transport_failure)
    }

    /// Create a reqwest client routed through the proxy's canonical SOCKS5 address
    fn create_client(&self, proxy: &Proxy) -> reqwest::Result<Client> {
        let reqwest_proxy = ReqwestProxy::all(proxy.url())?;

        Client::builder()
            .proxy(reqwest_proxy)
            .timeout(self.config.timeout)
            .build()
    }
}

/// Decide whether an echoed egress address proves the proxy works
pub fn classify(proxy: &Proxy, egress: String, true_addr: &TrueAddress) -> ProbeOutcome {
    if egress.is_empty() || egress == true_addr.as_str() {
        ProbeOutcome::failed(proxy.clone(), ProbeFailure::NoEffectiveProxying)
    } else {
        ProbeOutcome::working(proxy.clone(), egress)
    }
}

fn transport_failure(e: reqwest::Error) -> ProbeFailure {
    if e.is_timeout() {
        ProbeFailure::Timeout
    } else {
        ProbeFailure::Transport(e.to_string())
    }
}
