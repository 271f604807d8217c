use num_complex::Complex64;

use crate::error::{SyncError, SyncResult};

/// Gray-coded M-QAM constellation normalised to unit mean power.
///
/// `points()[w]` is the symbol that carries bit word `w` (MSB first), so a
/// hard decision index is directly the recovered bit word.
#[derive(Clone, Debug)]
pub struct QamConstellation {
    order: usize,
    bits_per_symbol: usize,
    scaling_factor: f64,
    points: Vec<Complex64>,
}

impl QamConstellation {
    pub fn new(order: usize) -> SyncResult<Self> {
        if order < 4 || !order.is_power_of_two() {
            return Err(SyncError::invalid(format!(
                "QAM order must be a power of two >= 4, got {}",
                order
            )));
        }
        let bits_per_symbol = order.trailing_zeros() as usize;

        let grid = if bits_per_symbol % 2 == 0 {
            square_grid(order)
        } else {
            cross_grid(order)
        };
        let scaling_factor = grid
            .iter()
            .map(|s| s.norm_sqr())
            .sum::<f64>()
            / order as f64;
        let norm = scaling_factor.sqrt();

        let mut points = vec![Complex64::new(0.0, 0.0); order];
        for (symbol, word) in grid.iter().zip(gray_code(order)) {
            points[word] = *symbol / norm;
        }

        Ok(Self {
            order,
            bits_per_symbol,
            scaling_factor,
            points,
        })
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn bits_per_symbol(&self) -> usize {
        self.bits_per_symbol
    }

    /// Mean power of the unnormalised integer grid
    pub fn scaling_factor(&self) -> f64 {
        self.scaling_factor
    }

    /// Unit-power constellation table indexed by bit word
    pub fn points(&self) -> &[Complex64] {
        &self.points
    }

    /// Maps bits onto symbols; a trailing partial word is dropped.
    pub fn modulate(&self, bits: &[bool]) -> Vec<Complex64> {
        bits.chunks_exact(self.bits_per_symbol)
            .map(|chunk| {
                let word = chunk
                    .iter()
                    .fold(0usize, |w, &b| (w << 1) | b as usize);
                self.points[word]
            })
            .collect()
    }

    /// Expands constellation indices back into bits (MSB first)
    pub fn demodulate(&self, indices: &[usize]) -> Vec<bool> {
        let mut bits = Vec::with_capacity(indices.len() * self.bits_per_symbol);
        for &word in indices {
            for j in (0..self.bits_per_symbol).rev() {
                bits.push((word >> j) & 1 == 1);
            }
        }
        bits
    }
}

fn gray(v: usize) -> usize {
    v ^ (v >> 1)
}

// Odd-integer levels -(n-1), ..., n-1
fn levels(n: usize) -> impl Iterator<Item = f64> {
    (0..n).map(move |i| (2 * i) as f64 - (n - 1) as f64)
}

/// Square grid, row-major over (real, imag)
fn square_grid(order: usize) -> Vec<Complex64> {
    let side = 1usize << (order.trailing_zeros() / 2);
    levels(side)
        .flat_map(|re| levels(side).map(move |im| Complex64::new(re, im)))
        .collect()
}

/// Cross grid for odd bit counts: a 2^(N+1) x 2^N rectangle whose outer
/// columns are folded onto the top and bottom rows
fn cross_grid(order: usize) -> Vec<Complex64> {
    let n = (order.trailing_zeros() - 1) / 2;
    let s = (1usize << (n - 1)) as f64;

    levels(1 << (n + 1))
        .flat_map(|re| levels(1 << n).map(move |im| Complex64::new(re, im)))
        .map(|p| {
            if p.re.abs() <= 3.0 * s {
                return p;
            }
            let (sr, si) = (p.re.signum(), p.im.signum());
            if p.im.abs() > s {
                Complex64::new(sr * (p.re.abs() - 2.0 * s), si * (4.0 * s - p.im.abs()))
            } else {
                Complex64::new(sr * (4.0 * s - p.re.abs()), si * (p.im.abs() + 2.0 * s))
            }
        })
        .collect()
}

/// Bit word carried by each grid point, in grid order
pub fn gray_code(order: usize) -> Vec<usize> {
    let bits = order.trailing_zeros() as usize;
    let (nx, ny, shift) = if bits % 2 == 0 {
        (1usize << (bits / 2), 1usize << (bits / 2), bits / 2)
    } else {
        let n = (bits - 1) / 2;
        (1usize << (n + 1), 1usize << n, n)
    };
    (0..nx)
        .flat_map(|x| (0..ny).map(move |y| (gray(x) << shift) | gray(y)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mean_power(points: &[Complex64]) -> f64 {
        points.iter().map(|p| p.norm_sqr()).sum::<f64>() / points.len() as f64
    }

    #[test]
    fn test_scaling_factors() {
        for (order, expected) in [(4, 2.0), (16, 10.0), (64, 42.0), (32, 20.0)] {
            let qam = QamConstellation::new(order).unwrap();
            assert_abs_diff_eq!(qam.scaling_factor(), expected, epsilon = 1e-12);
            assert_abs_diff_eq!(mean_power(qam.points()), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_qpsk_layout() {
        let qam = QamConstellation::new(4).unwrap();
        let a = 1.0 / 2f64.sqrt();
        // MSB rides on the real axis, LSB on the imaginary axis
        assert_abs_diff_eq!(qam.points()[0b00].re, -a, epsilon = 1e-12);
        assert_abs_diff_eq!(qam.points()[0b00].im, -a, epsilon = 1e-12);
        assert_abs_diff_eq!(qam.points()[0b01].im, a, epsilon = 1e-12);
        assert_abs_diff_eq!(qam.points()[0b10].re, a, epsilon = 1e-12);
        assert_abs_diff_eq!(qam.points()[0b11].re, a, epsilon = 1e-12);
    }

    #[test]
    fn test_16qam_neighbours_differ_in_one_bit() {
        let qam = QamConstellation::new(16).unwrap();
        let pts = qam.points();
        let d_min = 2.0 / qam.scaling_factor().sqrt();
        for a in 0..16 {
            for b in 0..16 {
                if a != b && ((pts[a] - pts[b]).norm() - d_min).abs() < 1e-9 {
                    assert_eq!((a ^ b).count_ones(), 1, "{} vs {}", a, b);
                }
            }
        }
    }

    #[test]
    fn test_cross_32qam_has_no_corners() {
        let qam = QamConstellation::new(32).unwrap();
        let scale = qam.scaling_factor().sqrt();
        let mut grid: Vec<(i64, i64)> = qam
            .points()
            .iter()
            .map(|p| ((p.re * scale).round() as i64, (p.im * scale).round() as i64))
            .collect();
        grid.sort();
        grid.dedup();
        assert_eq!(grid.len(), 32);
        assert!(grid.iter().all(|&(re, im)| re.abs() <= 5 && im.abs() <= 5));
        assert!(!grid.contains(&(5, 5)));
    }

    #[test]
    fn test_modulate_demodulate() {
        let qam = QamConstellation::new(16).unwrap();
        let bits = vec![true, false, true, true, false, false, false, true, true];
        let symbols = qam.modulate(&bits);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0], qam.points()[0b1011]);
        assert_eq!(qam.demodulate(&[0b1011, 0b0001]), bits[..8].to_vec());
    }

    #[test]
    fn test_rejects_bad_order() {
        assert!(QamConstellation::new(2).is_err());
        assert!(QamConstellation::new(12).is_err());
    }
}
