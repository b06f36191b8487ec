//! Error types for the command grammar and identity encoding.

use thiserror::Error;

/// Errors produced while tokenizing a command line.
///
/// These never reach the remote peer verbatim; the bot answers every
/// parse failure with the same generic reply it uses for unknown commands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
    /// A token opened with `"` but the line ended before the closing quote.
    #[error("unterminated quote")]
    UnterminatedQuote,

    /// The line is at least as long as the transport's message limit.
    #[error("line too long ({len} bytes)")]
    TooLong {
        /// Byte length of the rejected line.
        len: usize,
    },
}

/// Errors produced while decoding keys and addresses.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum KeyError {
    /// The decoded value has the wrong number of bytes.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Required byte length.
        expected: usize,
        /// Byte length that was supplied.
        actual: usize,
    },

    /// The text is not valid hexadecimal.
    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    /// The address checksum does not match its key and nospam.
    #[error("address checksum mismatch")]
    BadChecksum,
}
