use std::io;

/// Errors produced while reading or writing wire primitives.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// The stream does not follow the wire format (includes premature end of input).
    #[error("invalid input data: {0}")]
    InvalidData(String),

    /// A value passed to a packed encoder is below the encodable minimum.
    #[error("value {value} out of encodable range (minimum {min})")]
    OutOfRange { value: i64, min: i64 },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl WireError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidData(reason.into())
    }

    /// Map a failed `read_exact` onto the wire taxonomy: running out of
    /// input is malformed data, anything else is a transport failure.
    pub(crate) fn from_read(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::invalid("unexpected end of stream")
        } else {
            Self::Io(err)
        }
    }
}

/// Convenience alias used throughout the wire crate.
pub type WireResult<T> = Result<T, WireError>;
