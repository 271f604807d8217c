//! Synchronisation and bit-error-rate measurement for test-pattern links.
//!
//! A received bit or symbol stream is aligned against a known reference or a
//! regenerated PRBS, lengths are reconciled, and the error ratio is checked
//! against a sanity threshold. Polarity, rail-order and phase ambiguities are
//! resolved by a bounded retry ladder.

pub mod ber;
pub mod config;
pub mod error;
pub mod modulation;
pub mod prbs;
pub mod sync;
pub mod utils;

pub use ber::{BerMeasurement, BerResult, DualRailMeasurement, Reference, ber, ber_qam_prbs};
pub use config::{BerConfig, SyncStrategy};
pub use error::{SyncError, SyncResult};
