use num_complex::Complex64;
use serde::Serialize;
use tracing::{debug, info};

use crate::ber::counter::{BerResult, ber_synced};
use crate::ber::measure::{BerMeasurement, Polarity, ber_prbs};
use crate::ber::retry::{Disambiguation, RAIL_ORDER_LADDER, run_ladder};
use crate::config::BerConfig;
use crate::error::{SyncError, SyncResult};
use crate::modulation::quantize;
use crate::prbs::{ExtXorPrbs, PrbsSource};
use crate::sync::prbs_sync;
use crate::utils::bits::invert;
use crate::utils::consts::DUAL_RAIL_QAM_ORDER;

/// Combined BER of two PRBS rails sharing one carrier
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DualRailMeasurement {
    pub result: BerResult,
    pub in_phase: BerMeasurement,
    pub quadrature: BerMeasurement,
    /// PRBS orders that synchronised the (I, Q) rails
    pub orders: (u32, u32),
}

/// Hard-decides a QPSK stream into its in-phase and quadrature bit rails
pub fn split_rails(samples: &[Complex64]) -> SyncResult<(Vec<bool>, Vec<bool>)> {
    let decided = quantize(samples, DUAL_RAIL_QAM_ORDER)?;
    Ok(decided
        .symbols
        .iter()
        .map(|s| (s.re > 0.0, s.im > 0.0))
        .unzip())
}

fn sync_quadrature<G: PrbsSource + ?Sized>(
    rail: &[bool],
    order: u32,
    polarity: Polarity,
    cfg: &BerConfig,
    generator: &G,
) -> SyncResult<BerMeasurement> {
    let aligned = prbs_sync(generator, rail, order, cfg.prbs_sync_length(order), cfg.imax)?;
    let result = ber_synced(&rail[aligned.offset..], &aligned.sequence, cfg.threshold)?;
    Ok(BerMeasurement {
        result,
        offset: aligned.offset,
        polarity,
    })
}

/// BER of a QPSK stream whose I and Q rails each carry an independent PRBS.
///
/// The in-phase rail gets the usual polarity retry and the quadrature rail
/// inherits whatever inversion it needed. If either rail cannot be found the
/// two orders are swapped once. The combined ratio is the mean of the rail
/// ratios.
pub fn ber_qam_prbs(
    rx: &[Complex64],
    order_i: u32,
    order_q: u32,
    cfg: &BerConfig,
) -> SyncResult<DualRailMeasurement> {
    if rx.is_empty() {
        return Err(SyncError::invalid("receive buffer is empty"));
    }
    let (rail_i, rail_q) = split_rails(rx)?;

    let mut cfg = cfg.clone();
    if cfg.sync_length.is_none() {
        cfg.sync_length = Some(2 * order_i.max(order_q) as usize);
    }

    let (measurement, _) = run_ladder(&RAIL_ORDER_LADDER, SyncError::is_sync_failure, |step| {
        let (oi, oq) = match step {
            Disambiguation::SwapOrders => (order_q, order_i),
            _ => (order_i, order_q),
        };
        debug!(order_i = oi, order_q = oq, "syncing rails");

        let in_phase = ber_prbs(&rail_i, oi, &cfg, &ExtXorPrbs)?;
        let quadrature = match in_phase.polarity {
            Polarity::Inverted => {
                sync_quadrature(&invert(&rail_q), oq, Polarity::Inverted, &cfg, &ExtXorPrbs)?
            }
            Polarity::Normal => sync_quadrature(&rail_q, oq, Polarity::Normal, &cfg, &ExtXorPrbs)?,
        };

        Ok(DualRailMeasurement {
            result: BerResult::average(&in_phase.result, &quadrature.result),
            in_phase,
            quadrature,
            orders: (oi, oq),
        })
    })?;

    info!(
        ber = measurement.result.ratio,
        errors = measurement.result.errors,
        orders = ?measurement.orders,
        "dual-rail BER"
    );
    Ok(measurement)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modulation::QamConstellation;
    use crate::prbs::prbs_sequence;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    /// QPSK symbols carrying `i` on the real axis and `q` on the imaginary
    /// axis, scaled and lightly perturbed
    fn qpsk(i: &[bool], q: &[bool], seed: u64) -> Vec<Complex64> {
        let qam = QamConstellation::new(4).unwrap();
        let bits: Vec<bool> = i.iter().zip(q).flat_map(|(&a, &b)| [a, b]).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        qam.modulate(&bits)
            .into_iter()
            .map(|s| {
                let noise = Complex64::new(rng.random_range(-0.2..0.2), rng.random_range(-0.2..0.2));
                (s + noise) * 3.0
            })
            .collect()
    }

    fn rails(len: usize) -> (Vec<bool>, Vec<bool>) {
        (prbs_sequence(7, len).unwrap(), prbs_sequence(9, len).unwrap())
    }

    #[test]
    fn test_split_rails() {
        let (i, q) = rails(64);
        let (ri, rq) = split_rails(&qpsk(&i, &q, 1)).unwrap();
        assert_eq!(ri, i);
        assert_eq!(rq, q);
    }

    #[test]
    fn test_clean_rails() {
        let (i, q) = rails(1000);
        let m = ber_qam_prbs(&qpsk(&i, &q, 2), 7, 9, &BerConfig::default()).unwrap();
        assert_eq!(m.result, BerResult::average(&BerResult::new(0, 1000), &BerResult::new(0, 1000)));
        assert_eq!(m.result.length, 2000);
        assert_eq!(m.orders, (7, 9));
    }

    #[test]
    fn test_swapped_orders_are_recovered() {
        let (i, q) = rails(1000);
        let m = ber_qam_prbs(&qpsk(&i, &q, 3), 9, 7, &BerConfig::default()).unwrap();
        assert_eq!(m.orders, (7, 9));
        assert_eq!(m.result.errors, 0);
    }

    #[test]
    fn test_inversion_carries_over_to_quadrature() {
        let (i, q) = rails(1000);
        let m = ber_qam_prbs(&qpsk(&invert(&i), &invert(&q), 4), 7, 9, &BerConfig::default())
            .unwrap();
        assert_eq!(m.in_phase.polarity, Polarity::Inverted);
        assert_eq!(m.quadrature.polarity, Polarity::Inverted);
        assert_eq!(m.result.errors, 0);
    }

    #[test]
    fn test_errors_on_one_rail_are_averaged() {
        let (mut i, q) = rails(1000);
        for k in (150..900).step_by(80) {
            i[k] = !i[k];
        }
        let m = ber_qam_prbs(&qpsk(&i, &q, 5), 7, 9, &BerConfig::default()).unwrap();
        assert_eq!(m.in_phase.result.errors, 10);
        assert_eq!(m.result.errors, 10);
        assert_eq!(m.result.length, 2000);
        assert!((m.result.ratio - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_constant_rails_exhaust() {
        let ones = vec![true; 500];
        let err = ber_qam_prbs(&qpsk(&ones, &ones, 6), 7, 9, &BerConfig::default()).unwrap_err();
        assert_eq!(err, SyncError::SyncExhausted { attempts: 4 });
    }
}
