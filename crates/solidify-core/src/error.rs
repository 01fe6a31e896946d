//! Error types for the codec engine.

use std::io;

use solidify_wire::WireError;

use crate::graph::ObjectRef;
use crate::key::TypeKey;

/// Errors raised while liquifying or solidifying.
///
/// Variants fall into three groups: usage errors (the caller or a
/// processor broke the API contract), data errors (the stream is malformed
/// or came from an incompatible encoder) and I/O errors from the
/// underlying stream. See [`is_usage_error`](Self::is_usage_error) and
/// [`is_data_error`](Self::is_data_error).
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// No processor is registered for the requested type.
    #[error("no processor registered for type {0}")]
    UnregisteredType(TypeKey),

    /// A second processor was registered for the same type.
    #[error("duplicate registration for type {0}")]
    DuplicateRegistration(TypeKey),

    /// A value handed to a packed encoder is below its minimum.
    #[error("value {value} out of encodable range (minimum {min})")]
    OutOfRange {
        /// The rejected value.
        value: i64,
        /// Smallest encodable value.
        min: i64,
    },

    /// A processor tried to use the object cache but its type has none.
    #[error("type {0} has no object cache")]
    MissingCache(TypeKey),

    /// A value does not have the shape its type's processor expects.
    #[error("type mismatch for {ty}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Type being processed.
        ty: TypeKey,
        /// What the processor accepts.
        expected: &'static str,
        /// What it was given.
        found: &'static str,
    },

    /// An object reference does not resolve to a node in the graph.
    #[error("dangling object reference {0}")]
    DanglingReference(ObjectRef),

    /// Any other contract violation by the caller.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A value handed to the writer exceeds a configured or encodable limit.
    #[error("{what} {actual} too large to encode (limit {limit})")]
    TooLarge {
        /// Which limit.
        what: &'static str,
        /// Observed value.
        actual: u64,
        /// Maximum allowed.
        limit: u64,
    },

    /// An earlier call on this session failed, leaving its stream and
    /// caches out of step.
    #[error("session unusable after an earlier error")]
    SessionFailed,

    /// The stream does not follow the wire format.
    #[error("invalid input data: {0}")]
    InvalidData(String),

    /// Decoding the stream would exceed a configured limit.
    #[error("{what} limit exceeded: {actual} > {limit}")]
    LimitExceeded {
        /// Which limit.
        what: &'static str,
        /// Observed value.
        actual: u64,
        /// Configured maximum.
        limit: u64,
    },

    /// I/O error from the underlying stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl CodecError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidData(reason.into())
    }

    /// Programmer mistakes: retrying with the same input cannot succeed.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::UnregisteredType(_)
                | Self::DuplicateRegistration(_)
                | Self::OutOfRange { .. }
                | Self::MissingCache(_)
                | Self::TypeMismatch { .. }
                | Self::DanglingReference(_)
                | Self::InvalidArgument(_)
                | Self::TooLarge { .. }
                | Self::SessionFailed
        )
    }

    /// Malformed or hostile input.
    pub fn is_data_error(&self) -> bool {
        matches!(self, Self::InvalidData(_) | Self::LimitExceeded { .. })
    }
}

impl From<WireError> for CodecError {
    fn from(err: WireError) -> Self {
        match err {
            WireError::InvalidData(reason) => Self::InvalidData(reason),
            WireError::OutOfRange { value, min } => Self::OutOfRange { value, min },
            WireError::Io(e) => Self::Io(e),
        }
    }
}

/// Convenience alias for codec results.
pub type CodecResult<T> = Result<T, CodecError>;
