//! # Error Types
//!
//! Decode failures for the canonical wire codec. Every variant is fatal to
//! the candidate block carrying the bytes; there is no lenient mode.

use thiserror::Error;

/// Errors raised while decoding consensus wire bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before the value was complete.
    #[error("unexpected end of input at byte {at}")]
    UnexpectedEof { at: usize },

    /// The xfield tag byte names no known kind.
    #[error("unknown xfield tag {0:#04x}")]
    UnknownXFieldTag(u8),

    /// The xfield payload length does not match the canonical width
    /// for its tag.
    #[error("xfield payload length {got} does not match expected {expected}")]
    BadXFieldLength { expected: usize, got: u64 },

    /// The aggregate public key payload is not a compressed-point encoding.
    #[error("invalid aggregate pubkey prefix {0:#04x}")]
    BadPubKeyPrefix(u8),

    /// A compact-size used more bytes than its value requires.
    #[error("non-minimal compact size encoding")]
    NonCanonicalCompactSize,

    /// A declared length runs past the end of the input.
    #[error("declared length {0} exceeds remaining input")]
    LengthOverflow(u64),

    /// Bytes remained after the outermost value was decoded.
    #[error("trailing bytes after decoded value")]
    TrailingBytes,
}
