//! Error types for address resolution, candidate parsing and probing

use std::path::PathBuf;
use thiserror::Error;

/// The caller's own address could not be established. Fatal to a run.
#[derive(Error, Debug)]
pub enum ResolutionFailure {
    #[error("request to reference service failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("reference service timed out")]
    Timeout,

    #[error("reference service returned HTTP status {0}")]
    Status(u16),

    #[error("malformed reference response: {0}")]
    Malformed(String),

    #[error("reference service returned an empty address")]
    Empty,
}

/// An input line that does not describe a probeable candidate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidCandidate {
    #[error("not a valid URI: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("line is not valid UTF-8")]
    NotUtf8,
}

/// Why a single candidate was not classified as working
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeFailure {
    #[error("client setup failed: {0}")]
    Client(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("timed out")]
    Timeout,

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("no effective proxying")]
    NoEffectiveProxying,
}

/// Errors that end a run
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("cannot resolve true address: {0}")]
    Resolution(#[from] ResolutionFailure),

    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),
}

impl VerifyError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
