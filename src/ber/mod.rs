// Bit-error counting and the retry orchestration around synchronisation

pub mod counter;
pub mod dual_rail;
pub mod measure;
pub mod retry;

pub use counter::{BerResult, ber_synced};
pub use dual_rail::{DualRailMeasurement, ber_qam_prbs, split_rails};
pub use measure::{BerMeasurement, Polarity, Reference, ber, ber_prbs, ber_unsynced};
pub use retry::{Disambiguation, POLARITY_LADDER, RAIL_ORDER_LADDER, run_ladder};
