use std::io;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while building a code or running the codec.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The byte source or the output sink failed.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A byte was fed to the encoder that the code table has no code for.
    #[error("byte {byte:#04x} at offset {offset} has no code in the table")]
    UnknownSymbol { byte: u8, offset: u64 },

    /// The bit sequence ended at `position`, in the middle of a code or
    /// before every expected byte was decoded.
    #[error("compressed stream is cut short at bit {position}")]
    Truncated { position: u64 },

    /// A compressed container does not follow the expected layout.
    #[error("malformed compressed stream at {position}: {reason}")]
    Corrupt { position: u64, reason: &'static str },

    /// Precomputed byte counts add up to more than a `usize` can hold.
    #[error("byte counts add up to more than {}", usize::MAX)]
    CountOverflow,

    /// Tree construction did not end with exactly one root.
    #[error("code tree construction left {remaining} nodes instead of one root")]
    Unconverged { remaining: usize },
}
