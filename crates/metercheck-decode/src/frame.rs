//! MT-1820 frame decoding.
//!
//! A frame is one serial read of up to 32 bytes. Bytes 0..5 carry the
//! reading's digits as Latin-1 text, byte 6 carries the decimal point
//! position as a raw integer, and a `+?` prefix means the meter could
//! not produce a reading.

use std::fmt;
use thiserror::Error;

/// Bytes requested from the meter per read.
pub const FRAME_SIZE: usize = 32;
/// Width of the digit field at the start of a frame.
pub const DIGITS_LEN: usize = 5;
/// Offset of the decimal point byte.
pub const DECIMAL_POINT_OFFSET: usize = 6;
/// Prefix the meter sends when it reports its own fault.
pub const FAULT_MARKER: &[u8] = b"+?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Pass,
    Fail,
    Error,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "Pass",
            Self::Fail => "Fail",
            Self::Error => "Error",
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedReading {
    /// Digit field after trimming.
    pub digits: String,
    /// Number of digit characters before the decimal point.
    pub decimal_point: usize,
    pub value: f64,
}

impl DecodedReading {
    /// A reading passes only when it is exactly zero.
    pub fn classification(&self) -> Classification {
        if self.value == 0.0 {
            Classification::Pass
        } else {
            Classification::Fail
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("empty frame")]
    Empty,

    #[error("meter reported a fault")]
    DeviceFault,

    #[error("digit field is empty")]
    MalformedDigits,

    #[error("frame too short for decimal point byte: {len} bytes")]
    ShortFrame { len: usize },

    #[error("decimal point at {position} outside {digits} digits")]
    DecimalPointOutOfRange { position: usize, digits: usize },

    #[error("not a number: {0:?}")]
    InvalidNumber(String),
}

/// Decodes one frame into a reading, reporting why it was rejected.
pub fn decode(frame: &[u8]) -> Result<DecodedReading, DecodeError> {
    if frame.is_empty() {
        return Err(DecodeError::Empty);
    }
    if frame.starts_with(FAULT_MARKER) {
        return Err(DecodeError::DeviceFault);
    }

    let digits = digit_text(&frame[..frame.len().min(DIGITS_LEN)]);
    if digits.is_empty() {
        return Err(DecodeError::MalformedDigits);
    }

    let decimal_point = *frame
        .get(DECIMAL_POINT_OFFSET)
        .ok_or(DecodeError::ShortFrame { len: frame.len() })? as usize;

    let split = char_boundary(&digits, decimal_point).ok_or_else(|| {
        DecodeError::DecimalPointOutOfRange {
            position: decimal_point,
            digits: digits.chars().count(),
        }
    })?;

    let candidate = format!("{}.{}", &digits[..split], &digits[split..]);
    let value = match candidate.parse::<f64>() {
        Ok(v) => v,
        Err(_) => return Err(DecodeError::InvalidNumber(candidate)),
    };

    Ok(DecodedReading {
        digits,
        decimal_point,
        value,
    })
}

/// Classifies one frame. Never fails: every rejection is `Error`.
pub fn classify(frame: &[u8]) -> Classification {
    match decode(frame) {
        Ok(reading) => {
            log::trace!("decoded {:?} as {}", reading.digits, reading.value);
            reading.classification()
        }
        Err(e) => {
            log::debug!("frame rejected: {e}");
            Classification::Error
        }
    }
}

fn digit_text(field: &[u8]) -> String {
    // Latin-1 maps each byte straight to the code point of the same value.
    let text: String = field.iter().map(|&b| b as char).collect();
    text.trim_matches(is_blank)
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n'))
        .collect()
}

// Unicode whitespace plus the information separators U+001C..U+001F.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Byte offset of the `n`th character, or the end when `n` equals the
/// character count.
fn char_boundary(text: &str, n: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(n)
}
