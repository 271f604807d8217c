use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};
use crate::prbs::{PrbsSource, feedback_tap};
use crate::sync::block::Aligned;

/// Synchronises a PRBS of the given order to a received bit stream.
///
/// Slides a `block_length` window one bit at a time. The first `order` bits
/// of a window seed the generator; the window matches when the regenerated
/// continuation equals the rest of the window exactly. The returned sequence
/// is the matched block followed by the generated tail, as long as
/// `receive[offset..]`.
///
/// All-zero seeds are skipped: the zero state is not part of the sequence.
pub fn prbs_sync<G: PrbsSource + ?Sized>(
    generator: &G,
    receive: &[bool],
    order: u32,
    block_length: usize,
    imax: usize,
) -> SyncResult<Aligned<bool>> {
    if receive.is_empty() {
        return Err(SyncError::invalid("receive buffer is empty"));
    }
    if feedback_tap(order).is_none() {
        return Err(SyncError::invalid(format!("unsupported PRBS order {}", order)));
    }
    let k = order as usize;
    if block_length <= k {
        return Err(SyncError::invalid(format!(
            "sync block of {} bits leaves nothing to check for PRBS order {}",
            block_length, order
        )));
    }

    for i in 0..imax {
        if i + block_length > receive.len() {
            debug!(index = i, "receive buffer exhausted");
            break;
        }
        let block = &receive[i..i + block_length];
        let seed = &block[..k];
        if seed.iter().all(|&b| !b) {
            continue;
        }

        let continuation = generator.generate(order, block_length - k, seed)?;
        if continuation[..] != block[k..] {
            continue;
        }

        let tail = generator.generate(
            order,
            receive.len() - i - block_length,
            &block[block_length - k..],
        )?;
        let mut expected = Vec::with_capacity(receive.len() - i);
        expected.extend_from_slice(block);
        expected.extend(tail);

        info!(index = i, order, "PRBS sync locked");
        return Ok(Aligned {
            offset: i,
            sequence: expected,
        });
    }

    Err(SyncError::SyncExhausted { attempts: 1 })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prbs::{ExtXorPrbs, prbs_sequence};
    use crate::utils::bits::invert;

    /// PRBS7 starting at `start`, preceded by the complement of its true
    /// predecessor bits so no earlier window can satisfy the recurrence
    fn prbs_at(start: usize, total: usize) -> Vec<bool> {
        let seq = prbs_sequence(7, total).unwrap();
        seq.iter()
            .enumerate()
            .map(|(j, &b)| if j < start { !b } else { b })
            .collect()
    }

    #[test]
    fn test_locks_at_start_index() {
        let rx = prbs_at(53, 400);
        let aligned = prbs_sync(&ExtXorPrbs, &rx, 7, 20, 200).unwrap();
        assert_eq!(aligned.offset, 53);
        assert_eq!(aligned.sequence[..20], rx[53..73]);
        assert_eq!(aligned.sequence.len(), 400 - 53);
        assert_eq!(aligned.sequence, rx[53..].to_vec());
    }

    #[test]
    fn test_budget_is_respected() {
        let rx = prbs_at(53, 400);
        let err = prbs_sync(&ExtXorPrbs, &rx, 7, 20, 53).unwrap_err();
        assert!(err.is_sync_failure());
        assert_eq!(prbs_sync(&ExtXorPrbs, &rx, 7, 20, 54).unwrap().offset, 53);
    }

    #[test]
    fn test_inverted_prbs_never_locks() {
        let rx = invert(&prbs_sequence(7, 600).unwrap());
        let err = prbs_sync(&ExtXorPrbs, &rx, 7, 14, 200).unwrap_err();
        assert_eq!(err, SyncError::SyncExhausted { attempts: 1 });
    }

    #[test]
    fn test_dead_receiver_never_locks() {
        let rx = vec![false; 500];
        assert!(prbs_sync(&ExtXorPrbs, &rx, 7, 14, 200).is_err());
    }

    #[test]
    fn test_tail_survives_errors_after_lock() {
        let clean = prbs_sequence(15, 3000).unwrap();
        let mut rx = clean.clone();
        for i in (100..3000).step_by(97) {
            rx[i] = !rx[i];
        }
        let aligned = prbs_sync(&ExtXorPrbs, &rx, 15, 30, 200).unwrap();
        assert_eq!(aligned.offset, 0);
        assert_eq!(aligned.sequence, clean);
    }

    #[test]
    fn test_bad_order_or_empty_receive_is_invalid() {
        let rx = prbs_sequence(7, 100).unwrap();
        for (order, receive) in [(0, &rx[..]), (8, &rx[..10]), (7, &rx[..0])] {
            let err = prbs_sync(&ExtXorPrbs, receive, order, 16, 200).unwrap_err();
            assert!(matches!(err, SyncError::InvalidArgument(_)), "order {}", order);
        }
    }

    #[test]
    fn test_block_must_exceed_order() {
        let rx = prbs_sequence(7, 100).unwrap();
        let err = prbs_sync(&ExtXorPrbs, &rx, 7, 7, 200).unwrap_err();
        assert!(matches!(err, SyncError::InvalidArgument(_)));
    }
}
