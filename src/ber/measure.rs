use std::borrow::Cow;

use serde::Serialize;
use tracing::info;

use crate::ber::counter::{BerResult, ber_synced};
use crate::ber::retry::{Disambiguation, POLARITY_LADDER, run_ladder};
use crate::config::{BerConfig, SyncStrategy};
use crate::error::{SyncError, SyncResult};
use crate::prbs::{ExtXorPrbs, PrbsSource};
use crate::sync::{
    Aligned, LengthMode, SyncDirection, adjust_length, block_sync, find_offset_bits, prbs_sync,
};
use crate::utils::bits::{invert, roll};

/// What the received bits are compared against
#[derive(Clone, Copy, Debug)]
pub enum Reference<'a> {
    /// A stored transmit sequence, assumed to repeat periodically
    Known(&'a [bool]),
    /// A PRBS regenerated from the received bits
    Prbs { order: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Polarity {
    Normal,
    Inverted,
}

impl From<Disambiguation> for Polarity {
    fn from(step: Disambiguation) -> Self {
        match step {
            Disambiguation::Invert => Polarity::Inverted,
            _ => Polarity::Normal,
        }
    }
}

/// BER together with how the sync was achieved
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BerMeasurement {
    pub result: BerResult,
    /// Known reference: position of `tx[0]` in `rx`. PRBS: first compared index of `rx`.
    pub offset: usize,
    pub polarity: Polarity,
}

fn align_known(tx: &[bool], rx: &[bool], cfg: &BerConfig) -> SyncResult<Aligned<bool>> {
    match cfg.strategy {
        SyncStrategy::Block => block_sync(
            tx,
            rx,
            cfg.known_sync_length(tx.len()),
            cfg.imax,
            SyncDirection::ReferenceToReceive,
        ),
        SyncStrategy::Correlation => {
            let offset = find_offset_bits(tx, rx)?.offset % tx.len();
            Ok(Aligned {
                offset,
                sequence: roll(tx, offset as isize),
            })
        }
    }
}

/// BER of `rx` against a known, possibly shorter and periodically repeated `tx`.
///
/// `tx` is aligned onto `rx`, retried once with inverted polarity if it cannot
/// be synchronised, reshaped onto the length of `rx` and compared.
/// Correlation offsets are unconfirmed candidates, so with
/// `SyncStrategy::Correlation` an over-threshold BER also triggers the retry.
pub fn ber_unsynced(rx: &[bool], tx: &[bool], cfg: &BerConfig) -> SyncResult<BerMeasurement> {
    if rx.is_empty() || tx.is_empty() {
        return Err(SyncError::invalid("rx and tx must be non-empty"));
    }
    let strategy = cfg.strategy;
    let retry_on = move |err: &SyncError| match strategy {
        SyncStrategy::Block => err.is_sync_failure(),
        SyncStrategy::Correlation => {
            err.is_sync_failure() || matches!(err, SyncError::ThresholdExceeded { .. })
        }
    };

    let (measurement, _) = run_ladder(&POLARITY_LADDER, retry_on, |step| {
        let tx: Cow<[bool]> = match step {
            Disambiguation::Invert => Cow::Owned(invert(tx)),
            _ => Cow::Borrowed(tx),
        };
        let aligned = align_known(&tx, rx, cfg)?;
        let (tx_sync, rx_cmp) = adjust_length(&aligned.sequence, rx, LengthMode::Auto)?;
        let result = ber_synced(&rx_cmp, &tx_sync, cfg.threshold)?;
        Ok(BerMeasurement {
            result,
            offset: aligned.offset,
            polarity: step.into(),
        })
    })?;

    info!(
        ber = measurement.result.ratio,
        errors = measurement.result.errors,
        offset = measurement.offset,
        polarity = ?measurement.polarity,
        "known-sequence BER"
    );
    Ok(measurement)
}

/// BER of `rx` against a PRBS of the given order, retrying with inverted
/// bits when the sequence cannot be found.
pub fn ber_prbs<G: PrbsSource + ?Sized>(
    rx: &[bool],
    order: u32,
    cfg: &BerConfig,
    generator: &G,
) -> SyncResult<BerMeasurement> {
    if rx.is_empty() {
        return Err(SyncError::invalid("rx must be non-empty"));
    }
    let sync_length = cfg.prbs_sync_length(order);

    let (measurement, _) = run_ladder(&POLARITY_LADDER, SyncError::is_sync_failure, |step| {
        let rx: Cow<[bool]> = match step {
            Disambiguation::Invert => Cow::Owned(invert(rx)),
            _ => Cow::Borrowed(rx),
        };
        let aligned = prbs_sync(generator, &rx, order, sync_length, cfg.imax)?;
        let result = ber_synced(&rx[aligned.offset..], &aligned.sequence, cfg.threshold)?;
        Ok(BerMeasurement {
            result,
            offset: aligned.offset,
            polarity: step.into(),
        })
    })?;

    info!(
        ber = measurement.result.ratio,
        errors = measurement.result.errors,
        order,
        polarity = ?measurement.polarity,
        "PRBS BER"
    );
    Ok(measurement)
}

/// BER of `rx` against either a known sequence or a PRBS
pub fn ber(rx: &[bool], reference: Reference<'_>, cfg: &BerConfig) -> SyncResult<BerMeasurement> {
    match reference {
        Reference::Known(tx) => ber_unsynced(rx, tx, cfg),
        Reference::Prbs { order } => ber_prbs(rx, order, cfg, &ExtXorPrbs),
    }
}
