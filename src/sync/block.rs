use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};
use crate::utils::bits::roll;

/// Which sequence gets rolled once the offset is known
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncDirection {
    /// Roll the receive buffer so it lines up with the reference
    ReceiveToReference,
    /// Roll the reference so it lines up with the receive buffer
    ReferenceToReceive,
}

/// A synchronised sequence and the offset that produced it
#[derive(Clone, Debug, PartialEq)]
pub struct Aligned<T> {
    /// Position of `reference[0]` in the receive buffer, in `[0, len(reference))`.
    /// For PRBS sync this is the start index in the receive buffer.
    pub offset: usize,
    pub sequence: Vec<T>,
}

/// First start position where `window` occurs in the cyclic `reference`.
/// Every element must match.
pub fn find_exact<T: PartialEq>(window: &[T], reference: &[T]) -> Option<usize> {
    let (w, n) = (window.len(), reference.len());
    if w == 0 || w > n {
        return None;
    }
    (0..n).find(|&start| {
        window
            .iter()
            .enumerate()
            .all(|(j, x)| *x == reference[(start + j) % n])
    })
}

/// Exact-match synchronisation over successive blocks of `receive`.
///
/// Block `i` is `receive[i*block_length..(i+1)*block_length]`. The first block
/// found verbatim in `reference` fixes the offset. Gives up after `imax`
/// blocks or when the next block would run past the end of `receive`.
pub fn block_sync<T: PartialEq + Clone>(
    reference: &[T],
    receive: &[T],
    block_length: usize,
    imax: usize,
    direction: SyncDirection,
) -> SyncResult<Aligned<T>> {
    if reference.is_empty() || receive.is_empty() {
        return Err(SyncError::invalid("reference and receive must be non-empty"));
    }
    if block_length == 0 || block_length > reference.len() {
        return Err(SyncError::invalid(format!(
            "block length {} must be in 1..={}",
            block_length,
            reference.len()
        )));
    }
    let n = reference.len() as isize;

    for i in 0..imax {
        let start = i * block_length;
        let end = start + block_length;
        if end > receive.len() {
            debug!(block = i, "receive buffer exhausted");
            break;
        }

        let Some(pos) = find_exact(&receive[start..end], reference) else {
            debug!(block = i, "no exact match");
            continue;
        };

        let offset = (start as isize - pos as isize).rem_euclid(n) as usize;
        let sequence = match direction {
            SyncDirection::ReferenceToReceive => roll(reference, offset as isize),
            SyncDirection::ReceiveToReference => roll(receive, -(offset as isize)),
        };
        info!(block = i, offset, "block sync locked");
        return Ok(Aligned { offset, sequence });
    }

    Err(SyncError::SyncExhausted { attempts: 1 })
}
