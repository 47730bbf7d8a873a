//! Digit codec
//!
//! Converts between a non-negative sequence number and its positional
//! representation under a per-digit radix list, and computes the noid
//! check digit.

/// Base-10 alphabet used by the `d` digit kind.
pub const DIGIT_D: &str = "0123456789";

/// Extended base-29 alphabet used by the `e` digit kind. Lowercase, vowels
/// and `l` omitted to avoid spelling accidental words and ambiguous glyphs.
pub const DIGIT_E: &str = "0123456789bcdfghjkmnpqrstvwxz";

/// One positional digit kind in a template's digit spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigitKind {
    D,
    E,
}

impl DigitKind {
    fn radix(self) -> i64 {
        match self {
            DigitKind::D => 10,
            DigitKind::E => DIGIT_E.len() as i64,
        }
    }
}

/// Radix list for a digit spec, indexed right-to-left (least significant
/// digit first). `sizes[0]` is the radix of the least significant output
/// position.
pub fn sizes(digits: &[DigitKind]) -> Vec<i64> {
    digits.iter().rev().map(|d| d.radix()).collect()
}

/// Render `n` as a string of digits under `sizes`, most-significant-first.
///
/// When `unbounded` is true and `n` still has value left after consuming
/// every configured position, keep emitting digits using the radix of the
/// most-significant configured position until `n` is exhausted.
pub fn iton(mut n: i64, sizes: &[i64], unbounded: bool) -> String {
    let mut buf: Vec<u8> = Vec::with_capacity(sizes.len());
    let alphabet = DIGIT_E.as_bytes();

    for &radix in sizes {
        let value = (n % radix) as usize;
        n /= radix;
        buf.push(alphabet[value]);
    }

    if unbounded {
        let radix = *sizes.last().unwrap_or(&10);
        while n > 0 {
            let value = (n % radix) as usize;
            n /= radix;
            buf.push(alphabet[value]);
        }
    }

    buf.reverse();
    String::from_utf8(buf).expect("alphabet is ASCII")
}

/// Decode `id` (a digits-only string, no slug/check-digit) back to its
/// sequence number, or `-1` if any character is outside the alphabet or any
/// digit is out of range for its position's radix.
pub fn ntoi(id: &str, sizes: &[i64]) -> i64 {
    let digit_values: Vec<i64> = match id.chars().map(lookup).collect::<Option<Vec<_>>>() {
        Some(v) => v,
        None => return -1,
    };

    let mut value: i64 = 0;
    let mut multiplier: i64 = 1;
    let mut size_idx = 0usize;

    for &d in digit_values.iter().rev() {
        let radix = sizes[size_idx];
        if d >= radix {
            return -1;
        }
        value += d * multiplier;
        multiplier = multiplier.saturating_mul(radix);
        if size_idx < sizes.len() - 1 {
            size_idx += 1;
        }
    }

    value
}

/// Index of `c` in the extended alphabet, or `None` if not present.
fn lookup(c: char) -> Option<i64> {
    DIGIT_E.chars().position(|a| a == c).map(|i| i as i64)
}

/// Compute the noid check digit for `s`: a weighted sum of each character's
/// alphabet index (1-based position weight), mod the alphabet length.
/// Characters outside the alphabet contribute nothing to the sum.
pub fn checksum(s: &str) -> char {
    let mut sum: i64 = 0;
    for (i, c) in s.chars().enumerate() {
        if let Some(v) = lookup(c) {
            sum += v * (i as i64 + 1);
        }
    }
    let len = DIGIT_E.len() as i64;
    DIGIT_E.chars().nth((sum.rem_euclid(len)) as usize).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_are_right_to_left() {
        // "eedd" -> rightmost is 'd','d' then 'e','e'
        let digits = [DigitKind::E, DigitKind::E, DigitKind::D, DigitKind::D];
        assert_eq!(sizes(&digits), vec![10, 10, 29, 29]);
    }

    #[test]
    fn roundtrip_decimal() {
        let sizes = vec![10, 10, 10];
        for n in 0..1000 {
            let s = iton(n, &sizes, false);
            assert_eq!(s.len(), 3);
            assert_eq!(ntoi(&s, &sizes), n);
        }
    }

    #[test]
    fn unbounded_grows_past_configured_width() {
        let sizes = vec![10];
        let s = iton(12345, &sizes, true);
        assert_eq!(s, "12345");
        assert_eq!(ntoi(&s, &sizes), 12345);
    }

    #[test]
    fn ntoi_rejects_unknown_chars() {
        let sizes = vec![10, 10];
        assert_eq!(ntoi("a1", &sizes), -1);
    }

    #[test]
    fn ntoi_rejects_overflowing_digit() {
        // radix 10 in both positions, 'b' has extended-alphabet index >= 10
        let sizes = vec![10, 10];
        assert_eq!(ntoi("0b", &sizes), -1);
    }

    #[test]
    fn checksum_matches_known_value() {
        // b=10, c=11, d=12 in the extended alphabet.
        // weighted sum = 10*1 + 11*2 + 12*3 = 68, 68 % 29 = 10 -> 'b'
        let c = checksum("bcd");
        assert_eq!(c, 'b');
    }

    #[test]
    fn checksum_skips_unknown_chars() {
        // 'a' and 'e' (vowels) are outside the alphabet and contribute 0.
        assert_eq!(checksum("aeiou"), checksum(""));
    }
}
