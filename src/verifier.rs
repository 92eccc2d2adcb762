//! One verification run: resolve, read, probe, record

use crate::proxy::{AddressResolver, CandidateParser, ProbeOutcome, ProxyChecker, ResultRecorder};
use crate::{Config, Result};
use std::fmt;
use tracing::{info, instrument, warn};

/// Counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidate lines read, excluding blanks and comments
    pub read: usize,
    pub invalid: usize,
    pub duplicates: usize,
    pub probed: usize,
    pub working: usize,
    pub failed: usize,
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "read {} | invalid {} | duplicate {} | probed {} | working {} | failed {}",
            self.read, self.invalid, self.duplicates, self.probed, self.working, self.failed
        )
    }
}

/// Drives a full run over one input file
pub struct ProxyVerifier {
    config: Config,
}

impl ProxyVerifier {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run to completion.
    ///
    /// Fails before any probe if the true address cannot be resolved, in which
    /// case the output file is left untouched. Individual probe failures are
    /// only logged.
    #[instrument(skip(self), fields(input = %self.config.input.display()))]
    pub async fn run(&self) -> Result<RunSummary> {
        let resolver = AddressResolver::new(&self.config.checker)?;
        let true_addr = resolver.resolve().await?;
        info!("True address: {}", true_addr);

        let parsed = CandidateParser::parse_file(&self.config.input)?;
        for invalid in &parsed.invalid {
            warn!("Invalid candidate {}: {}", invalid.line, invalid.reason);
        }

        let mut summary = RunSummary {
            read: parsed.total(),
            invalid: parsed.invalid.len(),
            duplicates: parsed.duplicates,
            probed: parsed.proxies.len(),
            ..Default::default()
        };

        info!(
            "Read {} candidates, probing {} with {} workers",
            summary.read, summary.probed, self.config.checker.concurrency
        );

        let mut recorder = ResultRecorder::open(&self.config.output)?;
        let checker = ProxyChecker::with_config(self.config.checker.clone());
        let mut rx = checker.check_proxies_stream(parsed.proxies, true_addr);

        while let Some(outcome) = rx.recv().await {
            match outcome {
                ProbeOutcome::Working { proxy, egress } => {
                    info!("Working proxy: {} egress {}", proxy, egress);
                    recorder.record(&proxy, &egress)?;
                    summary.working += 1;
                }
                ProbeOutcome::Failed { proxy, reason } => {
                    info!("Failed proxy: {}: {}", proxy, reason);
                    summary.failed += 1;
                }
            }
        }

        info!(
            "Verification complete: {} ({} lines appended to {})",
            summary,
            recorder.written(),
            recorder.path().display()
        );

        Ok(summary)
    }
}
