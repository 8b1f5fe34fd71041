//! Engine-call tracing infrastructure.
//!
//! Provides a trait-based tracing system for the foreign-call boundary with
//! zero-cost abstraction. When using [`NoopTracer`], all trace methods
//! compile away entirely via monomorphization — identical to how
//! [`NoLimitTracker`](crate::resource::NoLimitTracker) eliminates budget
//! checking overhead.
//!
//! # Architecture
//!
//! The [`EngineTracer`] trait defines hook points at every engine call made
//! through a context. Concrete implementations collect different kinds of
//! data:
//!
//! | Tracer | Purpose |
//! |--------|---------|
//! | [`NoopTracer`] | Zero-cost no-op (production default) |
//! | [`StderrTracer`] | Human-readable call log to stderr |
//! | [`CountingTracer`] | Per-operation call counters |
//! | [`RecordingTracer`] | Full event recording for post-mortem inspection |
//!
//! Read and write hooks fire immediately before the engine call is
//! forwarded, so a counting tracer observes exactly the calls the engine
//! receives, including calls the engine subsequently fails. [`on_create`]
//! is the exception: it carries the issued token, so it fires after the
//! engine call and only for successful creates.
//!
//! [`on_create`]: EngineTracer::on_create

use crate::{
    engine::{RawHandle, Scalar},
    handle::ObjectKind,
};

/// Trace event emitted for one engine call.
///
/// Used by [`RecordingTracer`] to capture a full call trace.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceEvent {
    /// An object of the given kind was created.
    Create {
        /// Kind requested from the engine.
        kind: ObjectKind,
        /// Token the engine issued.
        raw: RawHandle,
    },
    /// A field was read from an object.
    GetField {
        /// Owner token.
        owner: RawHandle,
        /// Wire value of the field identifier.
        field: i32,
    },
    /// A field was written on an object.
    SetField {
        /// Owner token.
        owner: RawHandle,
        /// Wire value of the field identifier.
        field: i32,
        /// Token stored into the field.
        value: RawHandle,
    },
    /// A scalar was read from an object.
    GetScalar {
        /// Owner token.
        owner: RawHandle,
        /// Wire value of the field identifier.
        field: i32,
    },
    /// A scalar was written on an object.
    SetScalar {
        /// Owner token.
        owner: RawHandle,
        /// Wire value of the field identifier.
        field: i32,
        /// Scalar value written.
        value: Scalar,
    },
    /// An ownership reference was released.
    Destroy {
        /// Token released.
        raw: RawHandle,
    },
    /// The context was closed, bulk-releasing its remaining entries.
    Close {
        /// Number of entries released during teardown.
        released: usize,
    },
}

/// Trait for engine-call tracing.
///
/// All methods have default no-op implementations, so [`NoopTracer`] requires
/// zero lines of code and compiles to zero instructions. Implementations only
/// override the hooks they care about.
pub trait EngineTracer: std::fmt::Debug {
    /// Called after the engine issues a token for a create call.
    #[inline(always)]
    fn on_create(&mut self, _kind: ObjectKind, _raw: RawHandle) {}

    /// Called before a field read is forwarded.
    #[inline(always)]
    fn on_get_field(&mut self, _owner: RawHandle, _field: i32) {}

    /// Called before a field write is forwarded.
    #[inline(always)]
    fn on_set_field(&mut self, _owner: RawHandle, _field: i32, _value: RawHandle) {}

    /// Called before a scalar read is forwarded.
    #[inline(always)]
    fn on_get_scalar(&mut self, _owner: RawHandle, _field: i32) {}

    /// Called before a scalar write is forwarded.
    #[inline(always)]
    fn on_set_scalar(&mut self, _owner: RawHandle, _field: i32, _value: Scalar) {}

    /// Called before an ownership release is forwarded.
    #[inline(always)]
    fn on_destroy(&mut self, _raw: RawHandle) {}

    /// Called after a context finishes bulk teardown.
    #[inline(always)]
    fn on_close(&mut self, _released: usize) {}
}

// ============================================================================
// NoopTracer — zero-cost production default
// ============================================================================

/// A tracer that does nothing.
///
/// All trait methods use the default no-op implementations. Because the
/// context carries the tracer as a type parameter, the compiler inlines every
/// hook to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTracer;

impl EngineTracer for NoopTracer {}

// ============================================================================
// StderrTracer — human-readable call log
// ============================================================================

/// Tracer that prints a human-readable engine-call log to stderr.
///
/// Output format:
/// ```text
/// create   Table             -> 0x1
/// set      0x2 field 0       <- 0x1
/// get      0x2 field 0
/// destroy  0x1
/// close    released=3
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrTracer;

impl StderrTracer {
    /// Creates a new stderr tracer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EngineTracer for StderrTracer {
    fn on_create(&mut self, kind: ObjectKind, raw: RawHandle) {
        eprintln!("create   {kind:<17} -> {raw}");
    }

    fn on_get_field(&mut self, owner: RawHandle, field: i32) {
        eprintln!("get      {owner} field {field}");
    }

    fn on_set_field(&mut self, owner: RawHandle, field: i32, value: RawHandle) {
        eprintln!("set      {owner} field {field}       <- {value}");
    }

    fn on_get_scalar(&mut self, owner: RawHandle, field: i32) {
        eprintln!("getsc    {owner} field {field}");
    }

    fn on_set_scalar(&mut self, owner: RawHandle, field: i32, value: Scalar) {
        eprintln!("setsc    {owner} field {field}       <- {value}");
    }

    fn on_destroy(&mut self, raw: RawHandle) {
        eprintln!("destroy  {raw}");
    }

    fn on_close(&mut self, released: usize) {
        eprintln!("close    released={released}");
    }
}

// ============================================================================
// CountingTracer — per-operation call counters
// ============================================================================

/// Tracer that counts engine calls by operation.
///
/// The counters make "no engine call happened" directly observable, which is
/// what identifier-validation tests need.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountingTracer {
    /// Number of create calls.
    pub creates: usize,
    /// Number of field reads.
    pub field_gets: usize,
    /// Number of field writes.
    pub field_sets: usize,
    /// Number of scalar reads.
    pub scalar_gets: usize,
    /// Number of scalar writes.
    pub scalar_sets: usize,
    /// Number of ownership releases.
    pub destroys: usize,
}

impl CountingTracer {
    /// Creates a tracer with all counters at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of engine calls observed.
    #[must_use]
    pub fn engine_calls(&self) -> usize {
        self.creates + self.field_gets + self.field_sets + self.scalar_gets + self.scalar_sets + self.destroys
    }
}

impl EngineTracer for CountingTracer {
    fn on_create(&mut self, _kind: ObjectKind, _raw: RawHandle) {
        self.creates += 1;
    }

    fn on_get_field(&mut self, _owner: RawHandle, _field: i32) {
        self.field_gets += 1;
    }

    fn on_set_field(&mut self, _owner: RawHandle, _field: i32, _value: RawHandle) {
        self.field_sets += 1;
    }

    fn on_get_scalar(&mut self, _owner: RawHandle, _field: i32) {
        self.scalar_gets += 1;
    }

    fn on_set_scalar(&mut self, _owner: RawHandle, _field: i32, _value: Scalar) {
        self.scalar_sets += 1;
    }

    fn on_destroy(&mut self, _raw: RawHandle) {
        self.destroys += 1;
    }
}

// ============================================================================
// RecordingTracer — full event recording
// ============================================================================

/// Tracer that records every engine call as a [`TraceEvent`].
///
/// Useful for post-mortem inspection of exactly what crossed the foreign-call
/// boundary, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingTracer {
    events: Vec<TraceEvent>,
}

impl RecordingTracer {
    /// Creates a tracer with an empty event log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in call order.
    #[must_use]
    pub fn events(&self) -> &[TraceEvent] {
        &self.events
    }

    /// Consumes the tracer and returns the recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<TraceEvent> {
        self.events
    }
}

impl EngineTracer for RecordingTracer {
    fn on_create(&mut self, kind: ObjectKind, raw: RawHandle) {
        self.events.push(TraceEvent::Create { kind, raw });
    }

    fn on_get_field(&mut self, owner: RawHandle, field: i32) {
        self.events.push(TraceEvent::GetField { owner, field });
    }

    fn on_set_field(&mut self, owner: RawHandle, field: i32, value: RawHandle) {
        self.events.push(TraceEvent::SetField { owner, field, value });
    }

    fn on_get_scalar(&mut self, owner: RawHandle, field: i32) {
        self.events.push(TraceEvent::GetScalar { owner, field });
    }

    fn on_set_scalar(&mut self, owner: RawHandle, field: i32, value: Scalar) {
        self.events.push(TraceEvent::SetScalar { owner, field, value });
    }

    fn on_destroy(&mut self, raw: RawHandle) {
        self.events.push(TraceEvent::Destroy { raw });
    }

    fn on_close(&mut self, released: usize) {
        self.events.push(TraceEvent::Close { released });
    }
}
