// Sequence helpers shared by the synchronisers and the BER counter.
// Every helper returns a new buffer; callers' data is never modified.

/// Cyclic shift with numpy `roll` semantics: `out[(i + shift) mod n] = data[i]`.
/// Negative shifts rotate the other way.
pub fn roll<T: Clone>(data: &[T], shift: isize) -> Vec<T> {
    let n = data.len();
    if n == 0 {
        return Vec::new();
    }
    let k = shift.rem_euclid(n as isize) as usize;
    let mut rolled = Vec::with_capacity(n);
    rolled.extend_from_slice(&data[n - k..]);
    rolled.extend_from_slice(&data[..n - k]);
    rolled
}

/// Polarity inversion of a bit sequence
pub fn invert(bits: &[bool]) -> Vec<bool> {
    bits.iter().map(|&b| !b).collect()
}

/// Maps bits to ±1 so that zeros contribute to a correlation
pub fn to_bipolar(bits: &[bool]) -> Vec<f64> {
    bits.iter()
        .map(|&b| if b { 1.0 } else { -1.0 })
        .collect()
}

/// Number of positions where the two sequences differ (over the common prefix)
pub fn count_mismatches<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    a.iter()
        .zip(b.iter())
        .filter(|(x, y)| x != y)
        .count()
}

/// Convert a 0/1 byte stream to bits
pub fn bits_from_u8(data: &[u8]) -> Vec<bool> {
    data.iter().map(|&b| b != 0).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_matches_numpy() {
        let data = [1, 2, 3, 4, 5];
        assert_eq!(roll(&data, 2), vec![4, 5, 1, 2, 3]);
        assert_eq!(roll(&data, -2), vec![3, 4, 5, 1, 2]);
        assert_eq!(roll(&data, 7), roll(&data, 2));
        assert_eq!(roll(&data, 0), data.to_vec());
        assert!(roll::<i32>(&[], 3).is_empty());
    }

    #[test]
    fn test_roll_does_not_touch_input() {
        let data = vec![true, false, false];
        let rolled = roll(&data, 1);
        assert_eq!(data, vec![true, false, false]);
        assert_eq!(rolled, vec![false, true, false]);
    }

    #[test]
    fn test_invert_and_bipolar() {
        let bits = bits_from_u8(&[1, 0, 1]);
        assert_eq!(invert(&bits), vec![false, true, false]);
        assert_eq!(to_bipolar(&bits), vec![1.0, -1.0, 1.0]);
    }

    #[test]
    fn test_count_mismatches() {
        let a = bits_from_u8(&[1, 0, 1, 1, 0]);
        let b = bits_from_u8(&[1, 1, 1, 0, 0]);
        assert_eq!(count_mismatches(&a, &b), 2);
        assert_eq!(count_mismatches(&a, &a), 0);
    }
}
