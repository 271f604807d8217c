use num_complex::Complex64;
use rayon::prelude::*;

use crate::error::{SyncError, SyncResult};
use crate::modulation::qam::QamConstellation;

/// Hard decisions for a stream of complex samples
#[derive(Clone, Debug, PartialEq)]
pub struct Quantized {
    /// Ideal constellation point chosen for each sample
    pub symbols: Vec<Complex64>,
    /// Constellation index (= Gray bit word) of each decision
    pub indices: Vec<usize>,
}

impl QamConstellation {
    /// Index of the closest point; ties go to the lowest index
    pub fn nearest(&self, sample: Complex64) -> usize {
        let mut best = 0;
        let mut min_dist = f64::INFINITY;
        for (i, &point) in self.points().iter().enumerate() {
            let dist = (sample - point).norm_sqr();
            if dist < min_dist {
                min_dist = dist;
                best = i;
            }
        }
        best
    }

    /// Maximum-likelihood hard decision after power normalisation
    pub fn quantize(&self, samples: &[Complex64]) -> SyncResult<Quantized> {
        if samples.is_empty() {
            return Err(SyncError::invalid("cannot quantize an empty signal"));
        }
        let power = samples
            .iter()
            .map(|s| s.norm_sqr())
            .sum::<f64>()
            / samples.len() as f64;
        if !(power.is_finite() && power > 0.0) {
            return Err(SyncError::invalid(format!(
                "signal power must be finite and positive, got {}",
                power
            )));
        }
        let scale = 1.0 / power.sqrt();

        let (symbols, indices): (Vec<Complex64>, Vec<usize>) = samples
            .par_iter()
            .map(|&s| {
                let idx = self.nearest(s * scale);
                (self.points()[idx], idx)
            })
            .unzip();

        tracing::debug!(
            samples = samples.len(),
            order = self.order(),
            "quantized signal"
        );
        Ok(Quantized { symbols, indices })
    }
}

/// Hard-decides `samples` onto the M-QAM constellation of the given order
pub fn quantize(samples: &[Complex64], order: usize) -> SyncResult<Quantized> {
    QamConstellation::new(order)?.quantize(samples)
}
