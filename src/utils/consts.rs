/// Log level when RUST_LOG is not set
pub const LOG_LEVEL: &str = "info";

// ============================================================================
// Synchronisation defaults
// ============================================================================

/// Maximum number of sync windows tried before giving up
pub const DEFAULT_IMAX: usize = 200;

/// BER above this value is treated as a wrong sync, not a measurement
pub const DEFAULT_BER_THRESHOLD: f64 = 0.2;

/// Window length for exact-match sync against a known sequence
pub const DEFAULT_SYNC_LENGTH: usize = 32;

/// QAM order of a dual-rail (I/Q) PRBS test signal
pub const DUAL_RAIL_QAM_ORDER: usize = 4;

// Demo binary
/// Seed used when none is given on the command line
pub const DEFAULT_SEED: u64 = 42;

/// Number of bits synthesised by the demo
pub const DEFAULT_DEMO_LENGTH: usize = 1000;
