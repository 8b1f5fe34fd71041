use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Arena-local identity for an entry owned by a [`Context`](crate::Context).
///
/// Carries both the slot index and the slot's generation at allocation time.
/// Generations advance when a freed slot is reused, so a handle kept across a
/// release can never silently alias the slot's next occupant: lookups with a
/// stale generation fail with
/// [`AccessError::StaleHandle`](crate::AccessError::StaleHandle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId {
    index: u32,
    generation: u32,
}

impl HandleId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Returns the slot index.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.index as usize
    }

    /// Returns the slot generation this handle was issued under.
    #[inline]
    #[must_use]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Kind tag stored with every arena entry.
///
/// Creation is dispatched on this tag, and every typed wrapper dereference
/// checks it, so a handle to (say) a parameter set can never be forwarded to
/// the engine where a numeric table is expected.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
pub enum ObjectKind {
    /// A two-dimensional numeric table.
    Table,
    /// An ordered collection of engine objects.
    Collection,
    /// A trained model.
    Model,
    /// An algorithm input object.
    Input,
    /// A scalar parameter set.
    ParameterSet,
    /// A final result object.
    ResultSet,
    /// A partial result produced mid-computation.
    PartialResult,
}

impl ObjectKind {
    /// Returns the static kind name used in stats breakdowns and diagnostics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Typed view over an arena entry holding a numeric table.
///
/// Thin by design: a copyable `(HandleId)` whose kind is checked on every
/// dereference through the owning context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Table {
    id: HandleId,
}

impl Table {
    pub(crate) fn new(id: HandleId) -> Self {
        Self { id }
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn id(self) -> HandleId {
        self.id
    }
}

/// Typed view over an arena entry holding a collection of engine objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Collection {
    id: HandleId,
}

impl Collection {
    pub(crate) fn new(id: HandleId) -> Self {
        Self { id }
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn id(self) -> HandleId {
        self.id
    }
}

/// Typed view over an arena entry holding a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Model {
    id: HandleId,
}

impl Model {
    pub(crate) fn new(id: HandleId) -> Self {
        Self { id }
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn id(self) -> HandleId {
        self.id
    }
}
