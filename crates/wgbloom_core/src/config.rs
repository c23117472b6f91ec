use crate::consts::{DEFAULT_CORPUS_BYTES, DEFAULT_FILTER_BITS, DEFAULT_NUM_HASHES};
use crate::device::DeviceLimits;
use crate::errors::{BloomError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Benchmark parameters. Missing JSON fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BloomConfig {
    /// Filter size in bits (one flag byte each).
    pub size: usize,
    pub num_hashes: usize,
    /// Byte budget of the insert corpus.
    pub true_file_size: usize,
    /// Byte budget of the query corpus.
    pub false_file_size: usize,
    pub num_runs: usize,
    pub seed: Option<u64>,
    pub verify: bool,
    /// ASCII dump of the final filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    pub device: DeviceLimits,
}

impl Default for BloomConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_FILTER_BITS,
            num_hashes: DEFAULT_NUM_HASHES,
            true_file_size: DEFAULT_CORPUS_BYTES,
            false_file_size: DEFAULT_CORPUS_BYTES,
            num_runs: 1,
            seed: None,
            verify: true,
            output: None,
            device: DeviceLimits::default(),
        }
    }
}

impl BloomConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path)?;
        let cfg: BloomConfig = serde_json::from_str(&s)?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut f = fs::File::create(path)?;
        f.write_all(serde_json::to_string_pretty(self)?.as_bytes())?;
        f.sync_all()?;
        Ok(())
    }

    /// Hard errors only. Zero hashes and oversized budgets are reported at
    /// dispatch time instead, where the affected dispatch is skipped.
    pub fn validate(&self) -> Result<()> {
        if self.size == 0 {
            return Err(BloomError::Config("filter size must be non-zero".into()));
        }
        if self.num_runs == 0 {
            return Err(BloomError::Config("num_runs must be at least 1".into()));
        }
        if self.device.max_work_group_size == 0 {
            return Err(BloomError::Config("max_work_group_size must be non-zero".into()));
        }
        if self.device.threads == Some(0) {
            return Err(BloomError::Config("threads must be at least 1".into()));
        }
        Ok(())
    }

    /// Parameter summary printed before the first run.
    pub fn show_details(&self) -> String {
        let mut s = String::from("Bloom filter parameters\n");
        s.push_str(&format!("size: {}\n", self.size));
        s.push_str(&format!("numHashes: {}\n", self.num_hashes));
        s.push_str(&format!("trueFileSize: {}\n", self.true_file_size));
        s.push_str(&format!("falseFileSize: {}\n", self.false_file_size));
        s.push_str(&format!("numRuns: {}\n", self.num_runs));
        s.push_str(&format!(
            "device: maxWorkGroupSize={} localMemSize={}\n",
            self.device.max_work_group_size, self.device.local_mem_size
        ));
        s
    }
}
