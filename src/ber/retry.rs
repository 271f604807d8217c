use tracing::warn;

use crate::error::{SyncError, SyncResult};

/// A transform tried when synchronisation fails
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disambiguation {
    Identity,
    /// Flip the polarity of the bits
    Invert,
    /// Exchange the PRBS orders assumed for the I and Q rails
    SwapOrders,
}

pub const POLARITY_LADDER: [Disambiguation; 2] = [Disambiguation::Identity, Disambiguation::Invert];

pub const RAIL_ORDER_LADDER: [Disambiguation; 2] =
    [Disambiguation::Identity, Disambiguation::SwapOrders];

/// Runs `attempt` for each step in order and returns the first success
/// together with the step that produced it.
///
/// Errors accepted by `retry_on` advance to the next step; anything else is
/// returned at once. When every step fails the last error is returned, with
/// exhaustion counts summed over all steps.
pub fn run_ladder<T>(
    steps: &[Disambiguation],
    retry_on: impl Fn(&SyncError) -> bool,
    mut attempt: impl FnMut(Disambiguation) -> SyncResult<T>,
) -> SyncResult<(T, Disambiguation)> {
    let mut exhausted = 0;
    let mut last = None;

    for &step in steps {
        match attempt(step) {
            Ok(value) => return Ok((value, step)),
            Err(err) if retry_on(&err) => {
                warn!(?step, %err, "sync attempt failed");
                if let SyncError::SyncExhausted { attempts } = &err {
                    exhausted += *attempts;
                }
                last = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    match last {
        Some(SyncError::SyncExhausted { .. }) | None => Err(SyncError::SyncExhausted {
            attempts: exhausted.max(1),
        }),
        Some(err) => Err(err),
    }
}
