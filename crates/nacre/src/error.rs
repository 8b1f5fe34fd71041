use std::fmt;

use crate::{engine::EngineError, handle::HandleId, resource::LimitError};

/// Result type alias for operations that can fail at the access layer.
pub type AccessResult<T> = Result<T, AccessError>;

/// Errors produced by the typed access layer.
///
/// Separates locally detected failures (invalid identifiers, stale handles,
/// closed contexts, kind mismatches) from engine-originated failures, which
/// are surfaced unchanged in the [`Engine`](AccessError::Engine) variant.
/// This lets callers pattern-match on the failure category without string
/// parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum AccessError {
    /// An identifier or argument was missing or outside the accessor's
    /// allowed set. Always detected before any engine call is made.
    InvalidArgument {
        /// Human-readable description of what was invalid.
        reason: String,
    },
    /// The operation was attempted on a closed context.
    ContextClosed,
    /// The handle refers to a released slot or a recycled slot generation.
    StaleHandle(HandleId),
    /// A typed wrapper was used against an entry of a different kind.
    KindMismatch {
        /// Kind the wrapper expected.
        expected: &'static str,
        /// Kind actually stored in the arena entry.
        actual: &'static str,
    },
    /// The engine returned a tag value that does not decode into its
    /// identifier family.
    UnknownTag {
        /// Name of the field whose tag failed to decode.
        field: &'static str,
        /// The undecodable raw tag value.
        raw: i32,
    },
    /// The engine returned a scalar of a different primitive type than the
    /// field carries.
    ScalarMismatch {
        /// Name of the field being read.
        field: &'static str,
        /// Primitive type the field carries.
        expected: &'static str,
        /// Primitive type the engine returned.
        actual: &'static str,
    },
    /// A handle tracker limit was exceeded. No engine call was made.
    Limit(LimitError),
    /// An opaque failure from the engine, propagated unchanged.
    Engine(EngineError),
}

impl AccessError {
    /// Builds an [`AccessError::InvalidArgument`] from any message.
    pub(crate) fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument { reason: reason.into() }
    }
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::ContextClosed => write!(f, "context is closed"),
            Self::StaleHandle(id) => {
                write!(
                    f,
                    "stale handle (slot {index}, generation {generation})",
                    index = id.index(),
                    generation = id.generation()
                )
            }
            Self::KindMismatch { expected, actual } => {
                write!(f, "kind mismatch: expected {expected}, found {actual}")
            }
            Self::UnknownTag { field, raw } => {
                write!(f, "engine returned unknown tag {raw} for field {field}")
            }
            Self::ScalarMismatch { field, expected, actual } => {
                write!(f, "field {field} expected a {expected} scalar, engine returned {actual}")
            }
            Self::Limit(err) => write!(f, "{err}"),
            Self::Engine(err) => write!(f, "engine error: {err}"),
        }
    }
}

impl std::error::Error for AccessError {}

impl From<LimitError> for AccessError {
    fn from(err: LimitError) -> Self {
        Self::Limit(err)
    }
}

impl From<EngineError> for AccessError {
    fn from(err: EngineError) -> Self {
        Self::Engine(err)
    }
}
