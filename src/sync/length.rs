use serde::{Deserialize, Serialize};

use crate::error::{SyncError, SyncResult};

/// How two sequences of unequal length are reconciled
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LengthMode {
    /// Reshape the first sequence onto the length of the second
    #[default]
    Auto,
    /// Cut the longer sequence to the shorter one
    Truncate,
    /// Tile the shorter sequence up to the longer one
    Extend,
}

/// Appends `n` samples by repeating `data` from its start.
/// Assumes the underlying signal is periodic with period `data.len()`.
pub fn extend_by<T: Clone>(data: &[T], n: usize) -> Vec<T> {
    data.iter()
        .cycle()
        .take(data.len() + n)
        .cloned()
        .collect()
}

/// Returns `(a', b')` of equal length according to `mode`.
pub fn adjust_length<T: Clone>(a: &[T], b: &[T], mode: LengthMode) -> SyncResult<(Vec<T>, Vec<T>)> {
    if a.is_empty() || b.is_empty() {
        return Err(SyncError::invalid("cannot adjust the length of an empty sequence"));
    }
    let (la, lb) = (a.len(), b.len());

    let adjusted = match mode {
        LengthMode::Auto if la > lb => (a[..lb].to_vec(), b.to_vec()),
        LengthMode::Auto => (extend_by(a, lb - la), b.to_vec()),
        LengthMode::Truncate => {
            let n = la.min(lb);
            (a[..n].to_vec(), b[..n].to_vec())
        }
        LengthMode::Extend if la > lb => (a.to_vec(), extend_by(b, la - lb)),
        LengthMode::Extend => (extend_by(a, lb - la), b.to_vec()),
    };
    Ok(adjusted)
}
