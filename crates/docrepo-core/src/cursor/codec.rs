//! Hex transport form for cursor payloads.
//!
//! Cursors cross transports as printable text; this module only maps bytes
//! to and from lowercase hex and knows nothing about what the bytes mean.

use std::fmt::Write as _;
use thiserror::Error as ThisError;

///
/// CursorDecodeError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum CursorDecodeError {
    #[error("cursor string is blank")]
    Empty,

    #[error("cursor decodes to {bytes} bytes, limit is {max_bytes}")]
    Oversized { bytes: usize, max_bytes: usize },

    #[error("cursor hex has a dangling half byte")]
    OddLength,

    #[error("cursor holds non-hex character {found:?} at offset {offset}")]
    NonHex { offset: usize, found: char },
}

/// Lowercase hex, two characters per byte.
#[must_use]
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .fold(String::with_capacity(bytes.len() * 2), |mut out, byte| {
            // Writing into a String cannot fail.
            let _ = write!(out, "{byte:02x}");
            out
        })
}

/// Decode `cursor` into at most `max_bytes` bytes.
///
/// Leading and trailing whitespace is ignored and hex digits may be in
/// either case. `offset` in `NonHex` is a byte offset into the trimmed text.
pub fn decode_hex(cursor: &str, max_bytes: usize) -> Result<Vec<u8>, CursorDecodeError> {
    let digits = cursor.trim().as_bytes();
    if digits.is_empty() {
        return Err(CursorDecodeError::Empty);
    }
    if !digits.len().is_multiple_of(2) {
        return Err(CursorDecodeError::OddLength);
    }

    let bytes = digits.len() / 2;
    if bytes > max_bytes {
        return Err(CursorDecodeError::Oversized { bytes, max_bytes });
    }

    digits
        .chunks_exact(2)
        .enumerate()
        .map(|(i, pair)| Ok((nibble(pair[0], 2 * i)? << 4) | nibble(pair[1], 2 * i + 1)?))
        .collect()
}

fn nibble(digit: u8, offset: usize) -> Result<u8, CursorDecodeError> {
    char::from(digit)
        .to_digit(16)
        .and_then(|value| u8::try_from(value).ok())
        .ok_or(CursorDecodeError::NonHex {
            offset,
            found: char::from(digit),
        })
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_cursor_is_empty() {
        for blank in ["", " \t\r\n"] {
            assert_eq!(decode_hex(blank, 8), Err(CursorDecodeError::Empty));
        }
    }

    #[test]
    fn half_byte_is_rejected() {
        assert_eq!(decode_hex("f0f", 8), Err(CursorDecodeError::OddLength));
    }

    #[test]
    fn payload_above_limit_is_oversized() {
        let at_limit = "7e".repeat(3);
        let decoded = decode_hex(&at_limit, 3).expect("cursor at the limit should decode");
        assert_eq!(decoded, vec![0x7e; 3]);

        let over = format!("{at_limit}00");
        assert_eq!(
            decode_hex(&over, 3),
            Err(CursorDecodeError::Oversized {
                bytes: 4,
                max_bytes: 3,
            })
        );
    }

    #[test]
    fn non_hex_reports_offset_and_character() {
        assert_eq!(
            decode_hex("00z1", 8),
            Err(CursorDecodeError::NonHex {
                offset: 2,
                found: 'z',
            })
        );
    }

    #[test]
    fn either_case_decodes_and_encodes_lowercase() {
        let bytes = decode_hex("\tC0ffEE  ", 8).expect("mixed case should decode");

        assert_eq!(bytes, vec![0xc0, 0xff, 0xee]);
        assert_eq!(encode_hex(&bytes), "c0ffee");
    }
}
