//! Proxy data models

use crate::error::ProbeFailure;
use serde::Deserialize;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;

/// Proxy type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProxyType {
    #[default]
    Http,
    Https,
    Socks5,
}

impl ProxyType {
    /// Schemes accepted on input lines
    pub fn from_input_scheme(scheme: &str) -> Option<Self> {
        match scheme.to_ascii_lowercase().as_str() {
            "http" => Some(ProxyType::Http),
            "https" => Some(ProxyType::Https),
            _ => None,
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            ProxyType::Http => 80,
            ProxyType::Https => 443,
            ProxyType::Socks5 => 1080,
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyType::Http => write!(f, "http"),
            ProxyType::Https => write!(f, "https"),
            ProxyType::Socks5 => write!(f, "socks5"),
        }
    }
}

/// A candidate endpoint as read from the input list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Proxy {
    /// Host as it appears in a URI, IPv6 literals keep their brackets
    pub host: String,
    pub port: u16,
    /// Scheme the candidate was listed with
    pub proxy_type: ProxyType,
}

impl Proxy {
    pub fn new(host: String, port: u16, proxy_type: ProxyType) -> Self {
        Self {
            host,
            port,
            proxy_type,
        }
    }

    /// Canonical probe address. Requests are always routed over SOCKS5.
    pub fn url(&self) -> String {
        format!("{}://{}:{}", ProxyType::Socks5, self.host, self.port)
    }
}

impl fmt::Display for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url())
    }
}

/// The caller's own external address, resolved once per run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrueAddress(Arc<str>);

impl TrueAddress {
    pub fn new(addr: impl Into<Arc<str>>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TrueAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body layout of the address-echo service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoFormat {
    /// `{"origin": "<addr>"}` as served by httpbin
    #[default]
    Json,
    /// The whole body is the address, as served by ifconfig.me
    Text,
}

#[derive(Debug, Deserialize)]
struct EchoResponse {
    #[serde(default)]
    origin: String,
}

impl EchoFormat {
    /// Pull the echoed address out of a response body.
    ///
    /// The result is either empty or a comma-separated list of IP addresses
    /// with no whitespace, so it always fits on one results line.
    pub fn extract(&self, body: &str) -> std::result::Result<String, String> {
        let raw = match self {
            EchoFormat::Json => serde_json::from_str::<EchoResponse>(body)
                .map_err(|e| e.to_string())?
                .origin,
            EchoFormat::Text => body.to_string(),
        };
        normalize_address(&raw)
    }
}

/// Validate an echoed address. httpbin reports `client, proxy, ...` when
/// forwarding headers are present, so every comma-separated part must be an IP.
fn normalize_address(raw: &str) -> std::result::Result<String, String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(String::new());
    }

    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<IpAddr>()
                .map(|ip| ip.to_string())
                .map_err(|_| format!("not an IP address list: {:?}", raw))
        })
        .collect::<std::result::Result<Vec<_>, _>>()
        .map(|ips| ips.join(","))
}

impl FromStr for EchoFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(EchoFormat::Json),
            "text" => Ok(EchoFormat::Text),
            _ => Err(format!("Invalid echo format: {}. Use: json, text", s)),
        }
    }
}

/// Classification of one candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    Working { proxy: Proxy, egress: String },
    Failed { proxy: Proxy, reason: ProbeFailure },
}

impl ProbeOutcome {
    pub fn working(proxy: Proxy, egress: String) -> Self {
        Self::Working { proxy, egress }
    }

    pub fn failed(proxy: Proxy, reason: ProbeFailure) -> Self {
        Self::Failed { proxy, reason }
    }

    pub fn is_working(&self) -> bool {
        matches!(self, ProbeOutcome::Working { .. })
    }

    pub fn proxy(&self) -> &Proxy {
        match self {
            ProbeOutcome::Working { proxy, .. } | ProbeOutcome::Failed { proxy, .. } => proxy,
        }
    }
}
