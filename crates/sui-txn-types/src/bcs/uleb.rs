//! ULEB128 variable-length integers.
//!
//! Seven payload bits per byte, least significant group first, with the high
//! bit of every byte except the last set as a continuation flag.

use crate::error::{BcsError, BcsResult};

/// Maximum number of bytes a `u64` can occupy in ULEB128 form.
pub const MAX_ULEB128_LEN: usize = 10;

/// Encodes `value` as ULEB128.
pub fn uleb_encode(mut value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(uleb_len(value));
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        out.push(byte);
        if value == 0 {
            return out;
        }
    }
}

/// Decodes a ULEB128 integer from the start of `bytes`.
///
/// Returns the value and the number of bytes consumed. Decoding stops at the
/// first byte without the continuation bit.
///
/// # Errors
///
/// Fails if the input ends before a terminating byte, or if the integer does
/// not fit in 64 bits.
pub fn uleb_decode(bytes: &[u8]) -> BcsResult<(u64, usize)> {
    let mut value: u64 = 0;
    let mut shift = 0u32;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= MAX_ULEB128_LEN {
            break;
        }
        let group = u64::from(byte & 0x7f);
        // the 10th byte may only carry the single remaining bit
        if shift == 63 && group > 1 {
            return Err(BcsError::MalformedUleb128 { offset: 0 });
        }
        value |= group << shift;
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
        shift += 7;
    }

    Err(BcsError::MalformedUleb128 { offset: 0 })
}

/// Number of bytes `value` occupies when ULEB128-encoded.
pub fn uleb_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_encodings() {
        assert_eq!(uleb_encode(0), vec![0x00]);
        assert_eq!(uleb_encode(127), vec![0x7f]);
        assert_eq!(uleb_encode(128), vec![0x80, 0x01]);
        assert_eq!(uleb_encode(300), vec![0xac, 0x02]);
        assert_eq!(uleb_encode(16384), vec![0x80, 0x80, 0x01]);
    }

    #[test]
    fn test_decode_stops_at_terminator() {
        let (value, len) = uleb_decode(&[0xac, 0x02, 0xff, 0xff]).unwrap();
        assert_eq!(value, 300);
        assert_eq!(len, 2);
    }

    #[test]
    fn test_decode_truncated() {
        assert!(uleb_decode(&[0x80, 0x80]).is_err());
        assert!(uleb_decode(&[]).is_err());
    }

    #[test]
    fn test_u64_max() {
        let bytes = uleb_encode(u64::MAX);
        assert_eq!(bytes.len(), MAX_ULEB128_LEN);
        assert_eq!(uleb_decode(&bytes).unwrap(), (u64::MAX, MAX_ULEB128_LEN));
    }

    #[test]
    fn test_decode_overflow() {
        let mut bytes = vec![0xff; 9];
        bytes.push(0x02);
        assert!(matches!(
            uleb_decode(&bytes),
            Err(BcsError::MalformedUleb128 { .. })
        ));

        let too_long = vec![0x80; 11];
        assert!(uleb_decode(&too_long).is_err());
    }

    #[test]
    fn test_len() {
        assert_eq!(uleb_len(0), 1);
        assert_eq!(uleb_len(127), 1);
        assert_eq!(uleb_len(128), 2);
        assert_eq!(uleb_len(u64::MAX), 10);
    }

    proptest! {
        #[test]
        fn roundtrip_below_2_pow_53(n in 0u64..(1u64 << 53)) {
            let bytes = uleb_encode(n);
            prop_assert_eq!(uleb_decode(&bytes).unwrap(), (n, bytes.len()));
            prop_assert_eq!(bytes.len(), uleb_len(n));
        }

        #[test]
        fn encoding_is_injective(a in any::<u64>(), b in any::<u64>()) {
            prop_assume!(a != b);
            prop_assert_ne!(uleb_encode(a), uleb_encode(b));
        }
    }
}
