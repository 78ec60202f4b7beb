//! Codec module - console payload text to raw bytes.
//!
//! - [`HexEscapeCodec`] - `\xHH` escapes for binary payloads typed on the console
//!
//! # Design
//!
//! Codecs are implemented as marker structs with static methods rather than trait objects.
//! The decoder is a pure function: it owns no buffers and has no side effects beyond
//! writing the output it is given.
//!
//! # Example
//!
//! ```
//! use radiowire::codec::HexEscapeCodec;
//!
//! let payload = HexEscapeCodec::decode(r"temp=\x17").unwrap();
//! assert_eq!(payload, b"temp=\x17");
//! ```

mod hex_escape;

pub use hex_escape::HexEscapeCodec;
