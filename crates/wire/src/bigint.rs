//! Big-integer byte caster.
//!
//! Values are encoded as a sign byte (`0` for non-negative) followed by the
//! big-endian magnitude without leading zeros. Zero encodes as `[0, 0]`.

const POSITIVE: u8 = 0;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BigIntError {
    #[error("encoded value is too short")]
    TooShort,

    #[error("negative values are not supported")]
    Negative,

    #[error("magnitude of {0} bytes does not fit in 128 bits")]
    Overflow(usize),
}

pub fn encode_big_uint(value: u128) -> Vec<u8> {
    if value == 0 {
        return vec![POSITIVE, 0];
    }
    let magnitude = value.to_be_bytes();
    let leading = (value.leading_zeros() / 8) as usize;
    let mut out = Vec::with_capacity(1 + magnitude.len() - leading);
    out.push(POSITIVE);
    out.extend(magnitude.iter().skip(leading));
    out
}

pub fn decode_big_uint(bytes: &[u8]) -> Result<u128, BigIntError> {
    let (sign, magnitude) = bytes.split_first().ok_or(BigIntError::TooShort)?;
    if magnitude.is_empty() {
        return Err(BigIntError::TooShort);
    }
    if *sign != POSITIVE {
        return Err(BigIntError::Negative);
    }
    if magnitude.len() > 16 {
        return Err(BigIntError::Overflow(magnitude.len()));
    }
    Ok(magnitude
        .iter()
        .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte)))
}

/// Convert a decimal amount into base units with `decimals` fractional digits.
///
/// Negative and non-finite amounts become zero; amounts past `u128::MAX`
/// saturate.
pub fn denominate(amount: f64, decimals: u32) -> u128 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    let scaled = amount * 10f64.powi(decimals as i32);
    // Float to int casts saturate.
    scaled.round() as u128
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_is_two_bytes() {
        assert_eq!(encode_big_uint(0), vec![0, 0]);
        assert_eq!(decode_big_uint(&[0, 0]).unwrap(), 0);
    }

    #[test]
    fn magnitude_is_big_endian_without_padding() {
        assert_eq!(encode_big_uint(1), vec![0, 1]);
        assert_eq!(encode_big_uint(0x0102), vec![0, 1, 2]);
        assert_eq!(decode_big_uint(&[0, 1, 2]).unwrap(), 0x0102);
    }

    #[test]
    fn max_value_uses_sixteen_bytes() {
        let encoded = encode_big_uint(u128::MAX);
        assert_eq!(encoded.len(), 17);
        assert_eq!(decode_big_uint(&encoded).unwrap(), u128::MAX);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(decode_big_uint(&[]), Err(BigIntError::TooShort));
        assert_eq!(decode_big_uint(&[0]), Err(BigIntError::TooShort));
        assert_eq!(decode_big_uint(&[1, 5]), Err(BigIntError::Negative));
        assert_eq!(
            decode_big_uint(&[0; 18]),
            Err(BigIntError::Overflow(17))
        );
    }

    #[test]
    fn denominates_into_base_units() {
        assert_eq!(denominate(1.0, 18), 1_000_000_000_000_000_000);
        assert_eq!(denominate(0.5, 2), 50);
        assert_eq!(denominate(-3.0, 18), 0);
        assert_eq!(denominate(f64::NAN, 18), 0);
    }
}
