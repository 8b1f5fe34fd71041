//! The foreign-call boundary to the numerical engine.
//!
//! Everything this layer cannot do itself (allocating native objects,
//! storing field references, running algorithm mathematics) happens behind
//! the [`Engine`] trait. Each trait method corresponds to one primitive
//! native operation; the access layer validates identifiers before invoking
//! them and treats every call as atomic and blocking. A failed call is never
//! retried, since the underlying operation is not assumed idempotent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::handle::ObjectKind;

/// An opaque token referencing engine-side state.
///
/// Issued by the engine, owned by a [`Context`](crate::Context), and never
/// dereferenced by this layer. The zero token is reserved as null and is
/// rejected at registration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawHandle(u64);

impl RawHandle {
    /// The reserved null token.
    pub const NULL: Self = Self(0);

    /// Wraps an engine-issued token value.
    #[must_use]
    pub const fn new(token: u64) -> Self {
        Self(token)
    }

    /// Returns the raw token value for debugging or external maps.
    #[must_use]
    pub const fn as_raw(self) -> u64 {
        self.0
    }

    /// Returns `true` for the reserved null token.
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{token:x}", token = self.0)
    }
}

/// A primitive scalar value carried by a parameter field.
///
/// Covers the primitive types the engine exchanges for scalar parameters:
/// integers, floating-point values, enumerated tags, and boolean flags.
/// Tags are raw `i32` wire values; decoding them into an identifier family
/// is the access layer's job.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Scalar {
    /// A signed integer parameter (e.g. a depth or observation count).
    Int(i64),
    /// A floating-point parameter (e.g. an epsilon or penalty weight).
    Float(f64),
    /// An enumerated tag carried as its raw wire value.
    Tag(i32),
    /// A boolean flag.
    Flag(bool),
}

impl Scalar {
    /// Returns the primitive type name, used in mismatch diagnostics.
    #[must_use]
    pub fn kind_name(self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Tag(_) => "tag",
            Self::Flag(_) => "flag",
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Tag(v) => write!(f, "tag({v})"),
            Self::Flag(v) => write!(f, "{v}"),
        }
    }
}

/// An opaque failure originating inside the engine.
///
/// The access layer never inspects, recovers from, or retries these; they
/// pass through unchanged as [`AccessError::Engine`](crate::AccessError::Engine).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineError {
    message: String,
}

impl EngineError {
    /// Wraps an engine failure message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }

    /// Returns the engine's failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineError {}

/// The primitive operations the numerical engine must provide.
///
/// Implementations own all native state; the access layer only ever holds
/// [`RawHandle`] tokens issued here. Creation is kind-dispatched: the engine
/// decides what backing object a [`ObjectKind`] maps to. `destroy` releases
/// one ownership reference; engines with internal sharing free the object
/// once the last reference is released.
pub trait Engine: fmt::Debug {
    /// Creates a new engine object of the given kind.
    fn create(&mut self, kind: ObjectKind) -> Result<RawHandle, EngineError>;

    /// Returns the object stored in `field` of `handle`.
    ///
    /// The returned token carries one ownership reference for the caller.
    fn get_field(&mut self, handle: RawHandle, field: i32) -> Result<RawHandle, EngineError>;

    /// Stores `value` in `field` of `handle`.
    ///
    /// The engine takes its own reference to `value`; the caller keeps its
    /// reference.
    fn set_field(&mut self, handle: RawHandle, field: i32, value: RawHandle) -> Result<(), EngineError>;

    /// Returns the scalar stored in `field` of `handle`.
    fn get_scalar(&mut self, handle: RawHandle, field: i32) -> Result<Scalar, EngineError>;

    /// Stores a scalar in `field` of `handle`.
    fn set_scalar(&mut self, handle: RawHandle, field: i32, value: Scalar) -> Result<(), EngineError>;

    /// Releases one ownership reference to `handle`.
    ///
    /// Infallible by design: release runs during bulk context teardown where
    /// there is no caller left to handle a failure.
    fn destroy(&mut self, handle: RawHandle);
}
