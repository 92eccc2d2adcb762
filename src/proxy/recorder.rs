//! Append-only results store for working proxies

use crate::error::VerifyError;
use crate::proxy::models::Proxy;
use crate::Result;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writes `<canonical-address> <egress-address>` lines as results arrive.
///
/// A recorder has exactly one owner, so lines are never interleaved.
pub struct ResultRecorder {
    path: PathBuf,
    file: File,
    written: usize,
}

impl ResultRecorder {
    /// Open (or create) the results file in append mode
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| VerifyError::io(&path, e))?;

        Ok(Self {
            path,
            file,
            written: 0,
        })
    }

    /// Append one complete line with a single write
    pub fn record(&mut self, proxy: &Proxy, egress: &str) -> Result<()> {
        let line = format_line(proxy, egress);
        self.file
            .write_all(line.as_bytes())
            .and_then(|_| self.file.flush())
            .map_err(|e| VerifyError::io(&self.path, e))?;
        self.written += 1;
        Ok(())
    }

    /// Lines written by this recorder
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn format_line(proxy: &Proxy, egress: &str) -> String {
    format!("{} {}\n", proxy.url(), egress)
}
