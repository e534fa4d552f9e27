//! Progress and checkpoint files for long mining runs.

use seqmine_core::{Error, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

/// Tracks progress towards a target duration and periodically writes a
/// progress fraction and an obfuscated checkpoint of the elapsed
/// seconds. Corrupt checkpoints are ignored on startup.
///
/// The checkpoint is a single decimal `u64`: the low 48 bits carry
/// `elapsed_seconds + (key >> 16)`, the high 16 bits the bit-popcount
/// of the low part.
pub struct ProgressMonitor {
    start_time: Instant,
    target_seconds: u64,
    checkpoint_seconds: u64,
    progress_file: Option<PathBuf>,
    checkpoint_file: Option<PathBuf>,
    checkpoint_key: u64,
}

impl ProgressMonitor {
    pub fn new(
        target_seconds: u64,
        progress_file: Option<PathBuf>,
        checkpoint_file: Option<PathBuf>,
        checkpoint_key: u64,
    ) -> Result<Self> {
        if target_seconds == 0 {
            return Err(Error::Other("invalid target duration: 0".to_string()));
        }
        let mut monitor = Self {
            start_time: Instant::now(),
            target_seconds,
            checkpoint_seconds: 0,
            progress_file,
            checkpoint_file,
            checkpoint_key,
        };
        if let Some(path) = monitor.checkpoint_file.clone() {
            if path.exists() {
                match monitor.read_checkpoint(&path) {
                    Ok(seconds) => {
                        monitor.checkpoint_seconds = seconds;
                        info!(
                            "resuming from checkpoint at {:.1}%",
                            monitor.progress() * 100.0
                        );
                    }
                    Err(e) => {
                        // continue without the checkpoint
                        warn!(error = %e, "ignoring corrupt checkpoint");
                    }
                }
            }
        }
        Ok(monitor)
    }

    fn read_checkpoint(&self, path: &PathBuf) -> Result<u64> {
        let text = fs::read_to_string(path)?;
        let value: u64 = text
            .trim()
            .parse()
            .map_err(|_| Error::Checkpoint("not a number".to_string()))?;
        self.decode(value)
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.checkpoint_seconds + self.start_time.elapsed().as_secs()
    }

    pub fn is_target_reached(&self) -> bool {
        self.elapsed_seconds() >= self.target_seconds
    }

    pub fn progress(&self) -> f64 {
        let progress = self.elapsed_seconds() as f64 / self.target_seconds as f64;
        progress.clamp(0.0, 1.0)
    }

    /// Writes the progress fraction and the checkpoint word.
    pub fn write_progress(&self) -> Result<()> {
        if let Some(path) = &self.progress_file {
            fs::write(path, format!("{:.3}\n", self.progress()))?;
        }
        if let Some(path) = &self.checkpoint_file {
            fs::write(path, format!("{}\n", self.encode(self.elapsed_seconds())))?;
        }
        Ok(())
    }

    fn encode(&self, elapsed_seconds: u64) -> u64 {
        let value = (self.checkpoint_key >> 16).wrapping_add(elapsed_seconds);
        value + (u64::from(value.count_ones()) << 48)
    }

    fn decode(&self, value: u64) -> Result<u64> {
        let check = value >> 48;
        let low = (value << 16) >> 16;
        if check != u64::from(low.count_ones()) {
            return Err(Error::Checkpoint("checksum error".to_string()));
        }
        low.checked_sub(self.checkpoint_key >> 16)
            .ok_or_else(|| Error::Checkpoint("key mismatch".to_string()))
    }
}
