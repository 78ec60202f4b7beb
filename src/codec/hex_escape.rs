//! Hex-escape codec - human-typed text to raw payload bytes.
//!
//! Console users type binary payloads as text with `\xHH` escapes:
//!
//! ```text
//! lorawan send \x01\x02hello   ->  01 02 68 65 6c 6c 6f
//! ```
//!
//! # Rules
//!
//! - `\xHH` (two hex digits, either case) decodes to one byte.
//! - `\` followed by any other character yields that character verbatim,
//!   so `\\` is a literal backslash.
//! - Every other character is copied as its UTF-8 bytes.
//! - A trailing lone `\`, or a `\x` without two hex digits after it, is a
//!   [`MalformedEscape`](crate::error::RadiowireError::MalformedEscape) error.
//!
//! The decoded length never exceeds the input length.
//!
//! # Example
//!
//! ```
//! use radiowire::codec::HexEscapeCodec;
//!
//! let raw = HexEscapeCodec::decode(r"\x41\x42").unwrap();
//! assert_eq!(raw, b"AB");
//!
//! let text = HexEscapeCodec::encode(&[0x00, 0xff]);
//! assert_eq!(text, r"\x00\xff");
//! ```

use std::fmt::Write;

use crate::error::{RadiowireError, Result};

/// Codec for `\xHH`-escaped payload text.
pub struct HexEscapeCodec;

impl HexEscapeCodec {
    /// Decode escaped text into a fresh byte vector.
    ///
    /// # Errors
    ///
    /// Returns `MalformedEscape` if an escape sequence is incomplete.
    pub fn decode(input: &str) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(input.len());
        Self::decode_into(input, &mut out)?;
        Ok(out)
    }

    /// Decode escaped text, appending to `out`.
    ///
    /// On error `out` may hold a partially decoded prefix.
    pub fn decode_into(input: &str, out: &mut Vec<u8>) -> Result<()> {
        let bytes = input.as_bytes();
        let mut n = 0;

        while n < bytes.len() {
            if bytes[n] != b'\\' {
                out.push(bytes[n]);
                n += 1;
                continue;
            }

            let offset = n;
            let next = *bytes.get(n + 1).ok_or(RadiowireError::MalformedEscape {
                offset,
                reason: "trailing backslash",
            })?;

            if next != b'x' {
                // Backslash is ASCII, so `next` starts a char; any UTF-8
                // continuation bytes are copied by the plain branch above.
                out.push(next);
                n += 2;
                continue;
            }

            let digits = bytes
                .get(n + 2..n + 4)
                .ok_or(RadiowireError::MalformedEscape {
                    offset,
                    reason: "\\x needs two hex digits",
                })?;

            match (hex_value(digits[0]), hex_value(digits[1])) {
                (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                _ => {
                    return Err(RadiowireError::MalformedEscape {
                        offset,
                        reason: "invalid hex digit",
                    })
                }
            }
            n += 4;
        }

        Ok(())
    }

    /// Render every byte as `\xHH`.
    ///
    /// `decode(&encode(b))` always returns `b`.
    pub fn encode(data: &[u8]) -> String {
        let mut out = String::with_capacity(data.len() * 4);
        for byte in data {
            // Writing to a String cannot fail.
            let _ = write!(out, "\\x{:02x}", byte);
        }
        out
    }
}

#[inline]
fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}
