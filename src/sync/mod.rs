// Offset estimation and sequence alignment

pub mod block;
pub mod length;
pub mod prbs;
pub mod xcorr;

pub use block::{Aligned, SyncDirection, block_sync, find_exact};
pub use length::{LengthMode, adjust_length, extend_by};
pub use prbs::prbs_sync;
pub use xcorr::{Correlation, RotatedCorrelation, find_offset, find_offset_bits, find_offset_complex};
