//! IBM mainframe floating-point decoding and SAS missing values.
//!
//! Numeric fields in XPORT observations are IBM hexadecimal floats:
//! sign bit, 7-bit base-16 exponent biased by 64, and a base-2
//! fraction in the remaining bytes. Fields may be truncated to as few
//! as 2 bytes, dropping low-order fraction bits.

/// SAS missing value codes for numeric fields.
///
/// SAS distinguishes the standard missing value (`.`), the underscore
/// missing value (`._`), and 26 special missing values (`.A`-`.Z`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingValue {
    /// Standard missing value (`.`).
    Standard,
    /// Underscore missing value (`._`).
    Underscore,
    /// Special missing value (`.A` through `.Z`).
    Special(char),
}

impl MissingValue {
    /// Map a sentinel byte to its missing value code.
    #[must_use]
    pub fn from_sentinel(byte: u8) -> Option<Self> {
        match byte {
            b'.' => Some(Self::Standard),
            b'_' => Some(Self::Underscore),
            b'A'..=b'Z' => Some(Self::Special(byte as char)),
            _ => None,
        }
    }

    /// The sentinel byte stored as the first byte of a missing field.
    #[must_use]
    pub const fn sentinel(self) -> u8 {
        match self {
            Self::Standard => b'.',
            Self::Underscore => b'_',
            Self::Special(letter) => letter as u8,
        }
    }
}

impl std::fmt::Display for MissingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "."),
            Self::Underscore => write!(f, "._"),
            Self::Special(letter) => write!(f, ".{letter}"),
        }
    }
}

/// Detect a missing-value field.
///
/// A numeric field is missing when its first byte is a sentinel
/// (`.`, `_`, or `A`-`Z`) and every remaining byte is zero. This check
/// runs before float decoding. An all-zero field is NOT missing; it
/// decodes to numeric 0 through the normal path.
#[must_use]
pub fn missing_value(bytes: &[u8]) -> Option<MissingValue> {
    let (&first, rest) = bytes.split_first()?;
    let code = MissingValue::from_sentinel(first)?;
    if rest.iter().all(|&b| b == 0) {
        Some(code)
    } else {
        None
    }
}

/// Convert an IBM hexadecimal float field (2-8 bytes, big-endian) to f64.
///
/// `sign` is the top bit of byte 0, the exponent is the remaining 7
/// bits biased by 64, and the fraction is the remaining bits read as a
/// base-2 fraction. The result is `(1 - 2*sign) * 16^(exp-64) * frac`.
///
/// Decoding never fails: byte patterns that are not valid IBM floats
/// still produce a number, mirroring the format's lack of validation.
/// Callers must check [`missing_value`] first.
#[must_use]
pub fn ibm_to_ieee(bytes: &[u8]) -> f64 {
    let Some((&first, rest)) = bytes.split_first() else {
        return 0.0;
    };
    let sign = if first & 0x80 != 0 { -1.0 } else { 1.0 };
    let exponent = i32::from(first & 0x7f) - 64;

    let mut mantissa = 0u64;
    let mut bits = 0i32;
    for &byte in rest.iter().take(7) {
        mantissa = (mantissa << 8) | u64::from(byte);
        bits += 8;
    }
    if mantissa == 0 {
        return 0.0;
    }
    // Each fraction bit i contributes 2^-(i+1), i.e. mantissa / 2^bits.
    let fraction = mantissa as f64 / 2f64.powi(bits);
    sign * 16f64.powi(exponent) * fraction
}
