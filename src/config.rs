use serde::{Deserialize, Serialize};

use crate::utils::consts::{DEFAULT_BER_THRESHOLD, DEFAULT_IMAX, DEFAULT_SYNC_LENGTH};

/// How a known reference sequence is located in the receive buffer
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStrategy {
    /// Cross-correlation peak; the offset is only a candidate
    Correlation,
    /// Block-wise exact match search
    #[default]
    Block,
}

/// Per-call parameters for a BER measurement
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BerConfig {
    /// BER above this is reported as `ThresholdExceeded`
    pub threshold: f64,
    /// Maximum number of sync windows per attempt
    pub imax: usize,
    /// Sync window length; `None` picks a default from the reference
    pub sync_length: Option<usize>,
    pub strategy: SyncStrategy,
}

impl Default for BerConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_BER_THRESHOLD,
            imax: DEFAULT_IMAX,
            sync_length: None,
            strategy: SyncStrategy::Block,
        }
    }
}

impl BerConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_imax(mut self, imax: usize) -> Self {
        self.imax = imax;
        self
    }

    pub fn with_sync_length(mut self, sync_length: usize) -> Self {
        self.sync_length = Some(sync_length);
        self
    }

    pub fn with_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Window length for a known reference of `reference_len` bits
    pub fn known_sync_length(&self, reference_len: usize) -> usize {
        self.sync_length
            .unwrap_or(DEFAULT_SYNC_LENGTH)
            .min(reference_len)
    }

    /// Window length for a PRBS of the given order: twice the order unless set
    pub fn prbs_sync_length(&self, order: u32) -> usize {
        self.sync_length
            .unwrap_or(2 * order as usize)
    }
}
