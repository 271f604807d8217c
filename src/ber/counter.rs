use serde::Serialize;

use crate::error::{SyncError, SyncResult};
use crate::utils::bits::count_mismatches;

/// Linear bit-error ratio with the counts it was computed from
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct BerResult {
    pub ratio: f64,
    pub errors: usize,
    /// Number of compared bits
    pub length: usize,
}

impl BerResult {
    pub fn new(errors: usize, length: usize) -> Self {
        Self {
            ratio: errors as f64 / length as f64,
            errors,
            length,
        }
    }

    /// Dual-rail combination: mean of the two ratios, summed counts
    pub fn average(a: &BerResult, b: &BerResult) -> Self {
        Self {
            ratio: (a.ratio + b.ratio) / 2.0,
            errors: a.errors + b.errors,
            length: a.length + b.length,
        }
    }
}

/// BER between two already aligned, equal-length bit streams.
///
/// A ratio strictly above `threshold` is reported as `ThresholdExceeded`:
/// such a value almost always means the alignment is wrong.
pub fn ber_synced(rx: &[bool], tx: &[bool], threshold: f64) -> SyncResult<BerResult> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(SyncError::invalid(format!(
            "BER threshold must be in [0, 1], got {}",
            threshold
        )));
    }
    if tx.is_empty() {
        return Err(SyncError::invalid("cannot compute BER of an empty sequence"));
    }
    if rx.len() != tx.len() {
        return Err(SyncError::invalid(format!(
            "sequences must have equal length, got {} and {}",
            rx.len(),
            tx.len()
        )));
    }

    let result = BerResult::new(count_mismatches(rx, tx), tx.len());
    if result.ratio > threshold {
        tracing::warn!(ber = result.ratio, threshold, "BER over threshold");
        return Err(SyncError::ThresholdExceeded {
            ber: result.ratio,
            threshold,
        });
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::bits::bits_from_u8;

    #[test]
    fn test_identical_sequences() {
        let x = bits_from_u8(&[1, 0, 0, 1, 1, 1, 0]);
        let result = ber_synced(&x, &x, 0.2).unwrap();
        assert_eq!(result, BerResult { ratio: 0.0, errors: 0, length: 7 });
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let tx = vec![false; 10];
        let mut rx = tx.clone();
        rx[1] = true;
        rx[6] = true;
        let result = ber_synced(&rx, &tx, 0.2).unwrap();
        assert_eq!(result.errors, 2);
        assert_eq!(result.ratio, 0.2);

        rx[9] = true;
        let err = ber_synced(&rx, &tx, 0.2).unwrap_err();
        assert!(matches!(err, SyncError::ThresholdExceeded { .. }));
    }

    #[test]
    fn test_ratio_is_errors_over_length() {
        let tx = vec![true; 8];
        let rx = bits_from_u8(&[1, 1, 0, 1, 1, 1, 1, 1]);
        let result = ber_synced(&rx, &tx, 1.0).unwrap();
        assert_eq!(result.ratio, result.errors as f64 / result.length as f64);
        assert_eq!(result.ratio, 0.125);
    }

    #[test]
    fn test_length_mismatch_is_invalid() {
        let err = ber_synced(&[true, false], &[true], 0.2).unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument(_)));
        assert!(ber_synced(&[], &[], 0.2).is_err());
    }

    #[test]
    fn test_threshold_outside_unit_interval_is_invalid() {
        let tx = vec![false; 8];
        let rx = vec![true; 8];
        for threshold in [f64::NAN, f64::INFINITY, -0.1, 1.5] {
            let err = ber_synced(&rx, &tx, threshold).unwrap_err();
            assert!(matches!(err, SyncError::InvalidArgument(_)), "threshold {}", threshold);
        }
    }

    #[test]
    fn test_average() {
        let a = BerResult::new(1, 100);
        let b = BerResult::new(3, 100);
        let c = BerResult::average(&a, &b);
        assert_eq!(c.errors, 4);
        assert_eq!(c.length, 200);
        assert!((c.ratio - 0.02).abs() < 1e-12);
    }
}
