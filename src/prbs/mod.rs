//! Pseudo-random bit sequence (PRBS) generation.
//!
//! The synchronisers only need "continue this sequence from these `order`
//! bits", so generation is exposed through [`PrbsSource`] and the full
//! period is never materialised.

use crate::error::{SyncError, SyncResult};

/// Source of PRBS continuations
pub trait PrbsSource {
    /// Returns the `length` bits following `seed`.
    ///
    /// `seed` holds the last `order` bits of the sequence, oldest first.
    fn generate(&self, order: u32, length: usize, seed: &[bool]) -> SyncResult<Vec<bool>>;
}

/// Second feedback tap of the two-tap polynomial `x^order + x^tap + 1`
pub fn feedback_tap(order: u32) -> Option<u32> {
    match order {
        7 => Some(6),
        9 => Some(5),
        10 => Some(7),
        11 => Some(9),
        15 => Some(14),
        20 => Some(3),
        23 => Some(18),
        31 => Some(28),
        _ => None,
    }
}

/// Period of a maximal-length sequence of the given order
pub fn period(order: u32) -> u64 {
    (1u64 << order) - 1
}

/// Fibonacci LFSR producing `b[n] = b[n - order] ^ b[n - tap]`
#[derive(Debug, Clone)]
pub struct Lfsr {
    // bit d-1 holds b[n-d]
    reg: u64,
    mask: u64,
    order: u32,
    tap: u32,
}

impl Lfsr {
    pub fn new(order: u32, seed: &[bool]) -> SyncResult<Self> {
        let tap = feedback_tap(order)
            .ok_or_else(|| SyncError::invalid(format!("unsupported PRBS order {}", order)))?;
        if seed.len() != order as usize {
            return Err(SyncError::invalid(format!(
                "PRBS seed must hold {} bits, got {}",
                order,
                seed.len()
            )));
        }

        let mask = (1u64 << order) - 1;
        let reg = seed
            .iter()
            .fold(0u64, |reg, &bit| ((reg << 1) | bit as u64) & mask);

        Ok(Self {
            reg,
            mask,
            order,
            tap,
        })
    }

    /// The all-zero state is a fixed point and never part of the m-sequence
    pub fn is_locked_up(&self) -> bool {
        self.reg == 0
    }
}

impl Iterator for Lfsr {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        let bit = ((self.reg >> (self.order - 1)) ^ (self.reg >> (self.tap - 1))) & 1;
        self.reg = ((self.reg << 1) | bit) & self.mask;
        Some(bit == 1)
    }
}

/// Extends a PRBS by XOR feedback from an arbitrary seed window
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtXorPrbs;

impl PrbsSource for ExtXorPrbs {
    fn generate(&self, order: u32, length: usize, seed: &[bool]) -> SyncResult<Vec<bool>> {
        Ok(Lfsr::new(order, seed)?
            .take(length)
            .collect())
    }
}

/// First `length` bits of the PRBS started from the all-ones state
pub fn prbs_sequence(order: u32, length: usize) -> SyncResult<Vec<bool>> {
    let seed = vec![true; order as usize];
    let lfsr = Lfsr::new(order, &seed)?;
    Ok(seed
        .into_iter()
        .chain(lfsr)
        .take(length)
        .collect())
}
