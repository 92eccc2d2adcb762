//! Candidate parser: turns input lines into probeable proxies

use crate::error::{InvalidCandidate, VerifyError};
use crate::proxy::models::{Proxy, ProxyType};
use crate::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use url::Url;

/// An input line the normalizer rejected. It is never probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidLine {
    pub line: String,
    pub reason: InvalidCandidate,
}

/// Candidates read from one input list
#[derive(Debug, Clone, Default)]
pub struct ParsedCandidates {
    /// Unique candidates in first-seen order
    pub proxies: Vec<Proxy>,
    /// Lines rejected by the normalizer
    pub invalid: Vec<InvalidLine>,
    /// Lines that normalized to an address already listed
    pub duplicates: usize,
}

impl ParsedCandidates {
    /// Number of non-blank, non-comment lines seen
    pub fn total(&self) -> usize {
        self.proxies.len() + self.invalid.len() + self.duplicates
    }
}

/// Parser for candidate endpoint lists
pub struct CandidateParser;

impl CandidateParser {
    /// Parse a single candidate line of the form `scheme://host:port`.
    ///
    /// Only `http` and `https` are accepted. Credentials, path, query and
    /// fragment are dropped; a missing port falls back to the scheme default.
    pub fn parse_line(line: &str) -> std::result::Result<Proxy, InvalidCandidate> {
        let url = Url::parse(line.trim())?;

        let proxy_type = ProxyType::from_input_scheme(url.scheme())
            .ok_or_else(|| InvalidCandidate::UnsupportedScheme(url.scheme().to_string()))?;

        let host = url
            .host_str()
            .filter(|h| !h.is_empty())
            .ok_or(InvalidCandidate::MissingHost)?
            .to_string();

        // port() is None for an explicit default port as well as an absent one
        let port = url.port().unwrap_or_else(|| proxy_type.default_port());

        Ok(Proxy::new(host, port, proxy_type))
    }

    /// Parse a whole list, skipping blank lines and `#` comments
    pub fn parse_string(content: &str) -> ParsedCandidates {
        Self::parse_bytes(content.as_bytes())
    }

    /// Parse a raw list. A line that is not valid UTF-8 is rejected on its own
    /// without affecting the rest of the list.
    pub fn parse_bytes(content: &[u8]) -> ParsedCandidates {
        let mut parsed = ParsedCandidates::default();
        let mut seen = HashSet::new();

        for raw in content.split(|b| *b == b'\n') {
            let decoded = std::str::from_utf8(raw);
            let line = match decoded {
                Ok(line) => line.trim().to_string(),
                Err(_) => String::from_utf8_lossy(raw).trim().to_string(),
            };
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let result = match decoded {
                Ok(_) => Self::parse_line(&line),
                Err(_) => Err(InvalidCandidate::NotUtf8),
            };

            match result {
                Ok(proxy) => {
                    if seen.insert(proxy.url()) {
                        parsed.proxies.push(proxy);
                    } else {
                        parsed.duplicates += 1;
                    }
                }
                Err(reason) => parsed.invalid.push(InvalidLine { line, reason }),
            }
        }

        parsed
    }

    /// Read and parse a candidate file in one go
    pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedCandidates> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|e| VerifyError::io(path, e))?;
        Ok(Self::parse_bytes(&content))
    }
}
