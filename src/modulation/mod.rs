// QAM constellation tables and hard-decision demodulation

pub mod qam;
pub mod quantize;

pub use qam::QamConstellation;
pub use quantize::{Quantized, quantize};
