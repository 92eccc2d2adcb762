//! Proxy Verifier - Egress-based proxy checker
//!
//! Routes a request to an address-echo service through each candidate proxy
//! and keeps the ones whose egress address differs from our own.

pub mod error;
pub mod proxy;
pub mod verifier;

pub use error::VerifyError;
pub use proxy::*;
pub use verifier::{ProxyVerifier, RunSummary};

use std::path::PathBuf;

/// Application result type
pub type Result<T> = std::result::Result<T, VerifyError>;

/// Default candidate list path
pub const DEFAULT_INPUT: &str = "proxies.txt";

/// Default results file path
pub const DEFAULT_OUTPUT: &str = "success.txt";

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Candidate list, one URI per line
    pub input: PathBuf,
    /// Results file, appended to
    pub output: PathBuf,
    /// Probe settings shared by the resolver and the checker
    pub checker: CheckerConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input: PathBuf::from(DEFAULT_INPUT),
            output: PathBuf::from(DEFAULT_OUTPUT),
            checker: CheckerConfig::default(),
        }
    }
}

impl Config {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            ..Default::default()
        }
    }

    pub fn with_checker(mut self, checker: CheckerConfig) -> Self {
        self.checker = checker;
        self
    }
}
