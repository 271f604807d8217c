use num_complex::Complex64;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};

use crate::error::{SyncError, SyncResult};
use crate::utils::bits::to_bipolar;

/// Correlation-based offset estimate. Only a candidate: nothing has been
/// confirmed to match.
#[derive(Clone, Debug)]
pub struct Correlation {
    /// Position of `reference[0]` inside the receive buffer
    pub offset: usize,
    /// Correlation value at the peak (signed)
    pub peak: f64,
    /// Full linear correlation; index `m` is lag `m - (len(reference) - 1)`
    pub trace: Vec<f64>,
}

/// Offset estimate for complex symbols, with the rotation that won
#[derive(Clone, Debug)]
pub struct RotatedCorrelation {
    pub correlation: Correlation,
    /// Number of 90° turns applied to the reference
    pub quarter_turns: u8,
    /// The reference after rotation
    pub reference: Vec<Complex64>,
}

// Zero-padded forward transform of a real signal
fn spectrum(signal: &[f64], n: usize, fft: &dyn Fft<f64>) -> Vec<Complex64> {
    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    buffer.resize(n, Complex64::default());
    fft.process(&mut buffer);
    buffer
}

/// Linear convolution through a single FFT of size `len(a) + len(b) - 1`
fn fft_convolve(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len() + b.len() - 1;
    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);

    let spectrum_a = spectrum(a, n, forward.as_ref());
    let spectrum_b = spectrum(b, n, forward.as_ref());
    let mut product: Vec<Complex64> = spectrum_a
        .par_iter()
        .zip(spectrum_b.par_iter())
        .map(|(&x, &y)| x * y)
        .collect();

    planner.plan_fft_inverse(n).process(&mut product);
    let scale = 1.0 / n as f64;
    product.iter().map(|c| c.re * scale).collect()
}

/// Full cross-correlation of `receive` against `reference`
/// (convolution with the time-reversed reference).
pub fn cross_correlate(reference: &[f64], receive: &[f64]) -> Vec<f64> {
    if reference.is_empty() || receive.is_empty() {
        return Vec::new();
    }
    let reference_reversed: Vec<f64> = reference
        .iter()
        .rev()
        .copied()
        .collect();
    fft_convolve(receive, &reference_reversed)
}

fn check_lengths(reference_len: usize, receive_len: usize) -> SyncResult<()> {
    if reference_len == 0 {
        return Err(SyncError::invalid("reference is empty"));
    }
    if receive_len < reference_len {
        return Err(SyncError::invalid(format!(
            "receive buffer ({}) is shorter than the reference ({})",
            receive_len, reference_len
        )));
    }
    Ok(())
}

// First index of the largest |value|
fn argmax_abs(trace: &[f64]) -> (usize, f64) {
    trace
        .iter()
        .enumerate()
        .fold((0, 0.0), |(bi, bv): (usize, f64), (i, &v)| {
            if v.abs() > bv.abs() { (i, v) } else { (bi, bv) }
        })
}

fn lag_to_offset(peak_index: usize, reference_len: usize, receive_len: usize) -> usize {
    let n = reference_len as isize;
    let lag = peak_index as isize - (n - 1);
    if receive_len == reference_len {
        lag.rem_euclid(n) as usize
    } else if lag < 0 {
        (lag + n) as usize
    } else {
        lag as usize
    }
}

/// Locates `reference` inside `receive` from the correlation peak magnitude.
pub fn find_offset(reference: &[f64], receive: &[f64]) -> SyncResult<Correlation> {
    check_lengths(reference.len(), receive.len())?;

    let trace = cross_correlate(reference, receive);
    let (peak_index, peak) = argmax_abs(&trace);
    let offset = lag_to_offset(peak_index, reference.len(), receive.len());
    tracing::debug!(offset, peak, "correlation peak");

    Ok(Correlation {
        offset,
        peak,
        trace,
    })
}

/// `find_offset` for bit sequences, correlated in bipolar form
pub fn find_offset_bits(reference: &[bool], receive: &[bool]) -> SyncResult<Correlation> {
    find_offset(&to_bipolar(reference), &to_bipolar(receive))
}

/// Multiplies by i^turns without rounding
pub fn quarter_turn(s: Complex64, turns: u8) -> Complex64 {
    match turns % 4 {
        0 => s,
        1 => Complex64::new(-s.im, s.re),
        2 => Complex64::new(-s.re, -s.im),
        _ => Complex64::new(s.im, -s.re),
    }
}

fn angles(samples: &[Complex64]) -> Vec<f64> {
    samples.iter().map(|s| s.arg()).collect()
}

/// Locates a complex `reference` inside `receive` by correlating phase angles.
///
/// With `allow_rotation` the reference is also tried at 90°, 180° and 270°
/// and the rotation with the largest peak wins. Purely real input skips the
/// rotation search and correlates the real parts.
pub fn find_offset_complex(
    reference: &[Complex64],
    receive: &[Complex64],
    allow_rotation: bool,
) -> SyncResult<RotatedCorrelation> {
    check_lengths(reference.len(), receive.len())?;

    let is_real = reference
        .iter()
        .chain(receive.iter())
        .all(|s| s.im == 0.0);
    if is_real {
        let re = |v: &[Complex64]| v.iter().map(|s| s.re).collect::<Vec<f64>>();
        return Ok(RotatedCorrelation {
            correlation: find_offset(&re(reference), &re(receive))?,
            quarter_turns: 0,
            reference: reference.to_vec(),
        });
    }

    let receive_angles = angles(receive);
    let max_turns = if allow_rotation { 4 } else { 1 };

    let mut best: Option<RotatedCorrelation> = None;
    for turns in 0..max_turns {
        let rotated: Vec<Complex64> = reference
            .iter()
            .map(|&s| quarter_turn(s, turns))
            .collect();
        let correlation = find_offset(&angles(&rotated), &receive_angles)?;
        tracing::debug!(turns, peak = correlation.peak, "rotation tried");

        let better = best
            .as_ref()
            .is_none_or(|b| correlation.peak.abs() > b.correlation.peak.abs());
        if better {
            best = Some(RotatedCorrelation {
                correlation,
                quarter_turns: turns,
                reference: rotated,
            });
        }
    }

    best.ok_or_else(|| SyncError::invalid("no rotation evaluated"))
}
