//! Stable id codec
//!
//! Integers are rendered in a fixed base-N alphabet. Encoding is injective and
//! monotonic under shortlex order (shorter strings first, then byte order),
//! because the alphabet is sorted ascending and leading zero digits are never
//! produced.

use crate::errors::{ReconcileError, Result};

/// Base-N codec over a sorted ASCII alphabet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdConverter {
    chars: &'static [u8],
}

impl IdConverter {
    /// Digits and consonants without vowels or easily confused letters
    pub const LATIN29: IdConverter = IdConverter::new("23456789BCDFGHJKLMNPQRSTVWXYZ");

    /// Latin alphabet with digits, mostly for debugging
    pub const LATIN36: IdConverter = IdConverter::new("0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ");

    pub const fn new(chars: &'static str) -> Self {
        Self {
            chars: chars.as_bytes(),
        }
    }

    pub fn radix(&self) -> u64 {
        self.chars.len() as u64
    }

    pub fn encode(&self, id: u64) -> String {
        let radix = self.radix();
        let mut digits = Vec::new();
        let mut rest = id;
        loop {
            digits.push(self.chars[(rest % radix) as usize]);
            rest /= radix;
            if rest == 0 {
                break;
            }
        }
        digits.reverse();
        // alphabet is ASCII
        digits.into_iter().map(char::from).collect()
    }

    /// Decode an encoded id
    ///
    /// Fails for empty strings, characters outside the alphabet, leading zero
    /// digits and values beyond `u64`. Temporary project identifiers fail here.
    pub fn decode(&self, encoded: &str) -> Result<u64> {
        if encoded.is_empty() {
            return Err(ReconcileError::encoding("empty identifier"));
        }
        let bytes = encoded.as_bytes();
        if bytes.len() > 1 && bytes[0] == self.chars[0] {
            return Err(ReconcileError::encoding(format!(
                "identifier {} has a leading zero digit",
                encoded
            )));
        }

        let radix = self.radix();
        let mut value: u64 = 0;
        for &b in bytes {
            let digit = self
                .chars
                .iter()
                .position(|&c| c == b)
                .ok_or_else(|| {
                    ReconcileError::encoding(format!(
                        "identifier {} contains character {:?} outside the alphabet",
                        encoded,
                        char::from(b)
                    ))
                })? as u64;
            value = value
                .checked_mul(radix)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| {
                    ReconcileError::encoding(format!("identifier {} overflows", encoded))
                })?;
        }
        Ok(value)
    }
}

/// Encode a stable id with the release alphabet
pub fn encode(id: u64) -> String {
    IdConverter::LATIN29.encode(id)
}

/// Decode a stable id with the release alphabet
pub fn decode(encoded: &str) -> Result<u64> {
    IdConverter::LATIN29.decode(encoded)
}
