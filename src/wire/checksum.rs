//! One's-complement arithmetic and the Internet header checksum built on it.
//!
//! The primitive [`add_with_end_around_carry`] is usable standalone for any
//! RFC 1071-style checksum; the header helpers operate on the 10 big-endian
//! words of a 20-byte IPv4 header.

/// Add two fixed-width unsigned values with end-around carry.
///
/// `a` and `b` must each fit in `bits` bits (`1..=31`); feeding wider values
/// is outside the contract and the caller's responsibility. A carry out of
/// the top bit folds back into bit 0. For a single addition this is exactly
/// `sum % max` since `a + b <= 2 * max`, where `max` is the all-ones value.
pub fn add_with_end_around_carry(a: u32, b: u32, bits: u32) -> u32 {
    let max = (1u32 << bits) - 1;
    let sum = a + b;
    if sum <= max {
        sum
    } else {
        sum % max
    }
}

/// Fold 16-bit words left to right into a running one's-complement sum.
///
/// Every intermediate result stays at or below `0xffff`, so the
/// single-addition bound of [`add_with_end_around_carry`] holds at each step.
pub fn sum16<I>(words: I) -> u16
where
    I: IntoIterator<Item = u16>,
{
    words.into_iter().fold(0u32, |acc, word| {
        add_with_end_around_carry(acc, u32::from(word), 16)
    }) as u16
}

/// The checksum value to store in a header: the 16-bit complement of the
/// folded words. The word holding the checksum field itself must be zero.
pub fn compute<I>(words: I) -> u16
where
    I: IntoIterator<Item = u16>,
{
    !sum16(words)
}

/// Verify words exactly as stored, checksum field included: the data is
/// intact iff the folded sum is all ones.
pub fn verify<I>(words: I) -> bool
where
    I: IntoIterator<Item = u16>,
{
    sum16(words) == 0xffff
}

/// One's-complement fold over an arbitrary byte slice, big-endian word
/// order. An odd trailing byte is padded with a zero low byte.
pub fn data(bytes: &[u8]) -> u16 {
    sum16(bytes.chunks(2).map(|chunk| {
        let hi = chunk[0];
        let lo = chunk.get(1).copied().unwrap_or(0);
        u16::from(hi) << 8 | u16::from(lo)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_without_carry() {
        assert_eq!(add_with_end_around_carry(7, 3, 16), 10);
    }

    #[test]
    fn add_wraps_at_width() {
        assert_eq!(add_with_end_around_carry(0b1111, 0b0001, 4), 0b0001);
    }

    #[test]
    fn rfc1071_example() {
        // https://tools.ietf.org/html/rfc1071#section-3
        let words = [0x0001u16, 0xf203, 0xf4f5, 0xf6f7];
        assert_eq!(sum16(words), 0xddf2);
    }

    #[test]
    fn compute_is_complement_of_sum() {
        let words = [0x0001u16, 0xf203, 0xf4f5, 0xf6f7];
        assert_eq!(compute(words), 0x220d);
    }

    #[test]
    fn verify_round_trip() {
        let words = [0x0001u16, 0xf203, 0xf4f5, 0xf6f7];
        let stored = [0x0001u16, 0xf203, 0xf4f5, 0xf6f7, compute(words)];
        assert!(verify(stored));
        assert!(!verify([0x0001u16, 0xf203]));
    }

    #[test]
    fn data_pads_odd_trailing_byte() {
        assert_eq!(data(&[0x00, 0x01, 0xf2]), sum16([0x0001u16, 0xf200]));
        assert_eq!(data(&[]), 0);
    }
}
