//! Proxy module for parsing and checking proxies
//!
//! This module provides functionality for:
//! - Normalizing candidate URIs into canonical SOCKS5 probe addresses
//! - Resolving the caller's true address through an echo service
//! - Probing candidates concurrently with a bounded pool
//! - Appending working proxies to a results file

pub mod checker;
pub mod models;
pub mod parser;
pub mod recorder;
pub mod resolver;

pub use checker::{CheckerConfig, ProxyChecker};
pub use models::{EchoFormat, ProbeOutcome, Proxy, ProxyType, TrueAddress};
pub use parser::{CandidateParser, InvalidLine, ParsedCandidates};
pub use recorder::ResultRecorder;
pub use resolver::AddressResolver;
