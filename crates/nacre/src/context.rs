use std::collections::BTreeMap;

use crate::{
    engine::{Engine, RawHandle, Scalar},
    error::{AccessError, AccessResult},
    handle::{Collection, HandleId, ObjectKind, Table},
    resource::{HandleTracker, NoLimitTracker},
    tracer::{EngineTracer, NoopTracer},
};

/// Snapshot of context state at a point in time.
///
/// Captures handle counts by kind, slot usage, and tracker counters. Used for
/// monitoring context growth and comparing states via diffs.
///
/// The `handles_by_kind` map uses `BTreeMap` for deterministic iteration
/// order, making snapshots suitable for display and comparison without sort
/// overhead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextStats {
    /// Total number of live entries in the arena.
    pub live_handles: usize,
    /// Number of free (recycled) slots available for reuse.
    pub free_slots: usize,
    /// Total arena capacity (live + free).
    pub total_slots: usize,
    /// Breakdown of live entries by [`ObjectKind`] name.
    pub handles_by_kind: BTreeMap<&'static str, usize>,
    /// Tracker live handle count, if the tracker records one.
    ///
    /// `None` when the context uses `NoLimitTracker` (the default).
    pub tracker_live: Option<usize>,
    /// Tracker lifetime registration count, if the tracker records one.
    pub tracker_registrations: Option<usize>,
}

/// Difference between two context snapshots.
///
/// Computed by comparing a "before" and "after" [`ContextStats`] via
/// [`ContextStats::diff`]. Positive deltas mean growth; negative means
/// shrinkage. Kinds exclusive to the "after" snapshot are listed in
/// `new_kinds`; kinds exclusive to the "before" snapshot are in
/// `removed_kinds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDiff {
    /// Change in live entry count (`after - before`).
    pub live_handles_delta: isize,
    /// Change in free slot count.
    pub free_slots_delta: isize,
    /// Change in total slot count.
    pub total_slots_delta: isize,
    /// Per-kind deltas. Only includes kinds present in either snapshot.
    pub handles_by_kind_delta: BTreeMap<&'static str, isize>,
    /// Kinds that appeared in "after" but not "before".
    pub new_kinds: Vec<&'static str>,
    /// Kinds that appeared in "before" but not "after".
    pub removed_kinds: Vec<&'static str>,
    /// Change in tracker live count (only if both snapshots have the value).
    pub tracker_live_delta: Option<isize>,
    /// Change in tracker registrations (only if both snapshots have the value).
    pub tracker_registrations_delta: Option<isize>,
}

impl ContextStats {
    /// Computes the difference between `self` ("before") and `other` ("after").
    ///
    /// Returns a [`ContextDiff`] where positive deltas indicate growth from
    /// `self` to `other`. For tracker fields, a delta is computed only when
    /// both snapshots contain `Some`.
    #[must_use]
    pub fn diff(&self, other: &Self) -> ContextDiff {
        let (handles_by_kind_delta, new_kinds, removed_kinds) =
            compute_kind_deltas(&self.handles_by_kind, &other.handles_by_kind);

        ContextDiff {
            live_handles_delta: isize_delta(self.live_handles, other.live_handles),
            free_slots_delta: isize_delta(self.free_slots, other.free_slots),
            total_slots_delta: isize_delta(self.total_slots, other.total_slots),
            handles_by_kind_delta,
            new_kinds,
            removed_kinds,
            tracker_live_delta: optional_isize_delta(self.tracker_live, other.tracker_live),
            tracker_registrations_delta: optional_isize_delta(self.tracker_registrations, other.tracker_registrations),
        }
    }
}

impl ContextDiff {
    /// Returns `true` when all deltas are zero and no kinds were added or removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live_handles_delta == 0
            && self.free_slots_delta == 0
            && self.total_slots_delta == 0
            && self.new_kinds.is_empty()
            && self.removed_kinds.is_empty()
            && self.handles_by_kind_delta.values().all(|&v| v == 0)
            && self.tracker_live_delta.is_none_or(|d| d == 0)
            && self.tracker_registrations_delta.is_none_or(|d| d == 0)
    }
}

impl std::fmt::Display for ContextDiff {
    /// Produces a human-readable summary of what changed between two context
    /// snapshots. Example output:
    ///
    /// ```text
    /// ContextDiff: +3 live handles, +4 slots
    ///   Table: +2
    ///   New kinds: Model
    /// ```
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "ContextDiff: no changes");
        }

        write!(
            f,
            "ContextDiff: {:+} live handles, {:+} slots",
            self.live_handles_delta, self.total_slots_delta
        )?;

        // Per-kind deltas (skip zero deltas for conciseness).
        for (&kind, &delta) in &self.handles_by_kind_delta {
            if delta != 0 {
                write!(f, "\n  {kind}: {delta:+}")?;
            }
        }

        if !self.new_kinds.is_empty() {
            write!(f, "\n  New kinds: {}", self.new_kinds.join(", "))?;
        }
        if !self.removed_kinds.is_empty() {
            write!(f, "\n  Removed kinds: {}", self.removed_kinds.join(", "))?;
        }

        if let Some(delta) = self.tracker_live_delta
            && delta != 0
        {
            write!(f, "\n  Tracker live: {delta:+}")?;
        }
        if let Some(delta) = self.tracker_registrations_delta
            && delta != 0
        {
            write!(f, "\n  Tracker registrations: {delta:+}")?;
        }

        Ok(())
    }
}

/// Computes `after - before` as `isize`, handling the `usize -> isize` conversion.
fn isize_delta(before: usize, after: usize) -> isize {
    (after as isize).wrapping_sub(before as isize)
}

/// Computes the delta between two optional `usize` values.
///
/// Returns `Some(delta)` only when both values are `Some`.
fn optional_isize_delta(before: Option<usize>, after: Option<usize>) -> Option<isize> {
    match (before, after) {
        (Some(b), Some(a)) => Some(isize_delta(b, a)),
        _ => None,
    }
}

/// Computes per-kind deltas, plus lists of new and removed kinds.
fn compute_kind_deltas(
    before: &BTreeMap<&'static str, usize>,
    after: &BTreeMap<&'static str, usize>,
) -> (BTreeMap<&'static str, isize>, Vec<&'static str>, Vec<&'static str>) {
    let mut deltas = BTreeMap::new();
    let mut new_kinds = Vec::new();
    let mut removed_kinds = Vec::new();

    for (&kind, &count) in before {
        let after_count = after.get(kind).copied().unwrap_or(0);
        deltas.insert(kind, isize_delta(count, after_count));
        if !after.contains_key(kind) {
            removed_kinds.push(kind);
        }
    }

    for (&kind, &count) in after {
        if !before.contains_key(kind) {
            deltas.insert(kind, count as isize);
            new_kinds.push(kind);
        }
    }

    (deltas, new_kinds, removed_kinds)
}

/// Lifecycle state of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ContextState {
    Open,
    Closed,
}

/// One arena entry owning a reference to an engine object.
#[derive(Debug, Clone)]
struct Entry {
    refcount: usize,
    raw: RawHandle,
    kind: ObjectKind,
}

/// Arena that owns every engine object issued through it.
///
/// Uses a free list to reuse slots from released entries, keeping slot usage
/// constant for callers that repeatedly register and release handles. Each
/// slot carries a generation counter that advances on reuse, so a stale
/// [`HandleId`] fails with [`AccessError::StaleHandle`] instead of aliasing
/// the slot's next occupant.
///
/// The context owns the engine value: all engine calls route through it, the
/// tracker check runs before any engine call that would acquire an object,
/// and the tracer observes every call. Closing the context releases every
/// entry it still owns: bulk cleanup is the safety net, [`Self::release`]
/// the primary path. After close (or drop), every operation fails with
/// [`AccessError::ContextClosed`].
///
/// Generic over `E: Engine` plus a [`HandleTracker`] and an [`EngineTracer`].
/// With the `NoLimitTracker`/`NoopTracer` defaults, all budget checks and
/// trace hooks compile away to no-ops.
#[derive(Debug)]
pub struct Context<E: Engine, T: HandleTracker = NoLimitTracker, Tr: EngineTracer = NoopTracer> {
    entries: Vec<Option<Entry>>,
    /// Per-slot generation counters. Advanced when a freed slot is reused.
    slot_generations: Vec<u32>,
    /// Indexes of freed slots available for reuse.
    free_list: Vec<usize>,
    engine: E,
    tracker: T,
    tracer: Tr,
    state: ContextState,
}

impl<E: Engine> Context<E> {
    /// Creates an open context with no handle budget and no tracing.
    pub fn new(engine: E) -> Self {
        Self::with_parts(engine, NoLimitTracker, NoopTracer)
    }
}

impl<E: Engine, T: HandleTracker> Context<E, T> {
    /// Creates an open context with a handle tracker and no tracing.
    pub fn with_tracker(engine: E, tracker: T) -> Self {
        Self::with_parts(engine, tracker, NoopTracer)
    }
}

impl<E: Engine, T: HandleTracker, Tr: EngineTracer> Context<E, T, Tr> {
    /// Creates an open context from its engine, tracker, and tracer parts.
    pub fn with_parts(engine: E, tracker: T, tracer: Tr) -> Self {
        Self {
            entries: Vec::new(),
            slot_generations: Vec::new(),
            free_list: Vec::new(),
            engine,
            tracker,
            tracer,
            state: ContextState::Open,
        }
    }

    /// Returns a shared reference to the engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Returns a shared reference to the handle tracker.
    pub fn tracker(&self) -> &T {
        &self.tracker
    }

    /// Returns a shared reference to the tracer.
    pub fn tracer(&self) -> &Tr {
        &self.tracer
    }

    /// Returns `true` while the context is open.
    pub fn is_open(&self) -> bool {
        self.state == ContextState::Open
    }

    fn ensure_open(&self) -> AccessResult<()> {
        match self.state {
            ContextState::Open => Ok(()),
            ContextState::Closed => Err(AccessError::ContextClosed),
        }
    }

    /// Creates a new engine object of the given kind and registers it.
    ///
    /// The tracker check runs before the engine call, so a rejected creation
    /// performs no engine work.
    pub fn create(&mut self, kind: ObjectKind) -> AccessResult<HandleId> {
        self.ensure_open()?;
        self.tracker.on_register()?;
        let raw = match self.engine.create(kind) {
            Ok(raw) => raw,
            Err(err) => {
                self.tracker.on_release();
                return Err(AccessError::Engine(err));
            }
        };
        if raw.is_null() {
            self.tracker.on_release();
            return Err(AccessError::invalid_argument("engine issued the null token"));
        }
        self.tracer.on_create(kind, raw);
        Ok(self.insert(raw, kind))
    }

    /// Creates and registers a new numeric table.
    pub fn new_table(&mut self) -> AccessResult<Table> {
        Ok(Table::new(self.create(ObjectKind::Table)?))
    }

    /// Creates and registers a new object collection.
    pub fn new_collection(&mut self) -> AccessResult<Collection> {
        Ok(Collection::new(self.create(ObjectKind::Collection)?))
    }

    /// Registers an engine-issued token as an owned arena entry.
    ///
    /// Used when the engine hands back an object this context should own,
    /// e.g. a token received from another binding layer. The null token is
    /// rejected with `InvalidArgument`.
    pub fn register(&mut self, raw: RawHandle, kind: ObjectKind) -> AccessResult<HandleId> {
        self.ensure_open()?;
        if raw.is_null() {
            return Err(AccessError::invalid_argument("the null token cannot be registered"));
        }
        self.tracker.on_register()?;
        Ok(self.insert(raw, kind))
    }

    fn insert(&mut self, raw: RawHandle, kind: ObjectKind) -> HandleId {
        let entry = Entry { refcount: 1, raw, kind };
        if let Some(index) = self.free_list.pop() {
            // Reuse a freed slot; advancing the generation invalidates any
            // handle still pointing at the previous occupant.
            self.slot_generations[index] = self.slot_generations[index].wrapping_add(1);
            self.entries[index] = Some(entry);
            HandleId::new(as_u32(index), self.slot_generations[index])
        } else {
            let index = self.entries.len();
            self.slot_generations.push(0);
            self.entries.push(Some(entry));
            HandleId::new(as_u32(index), 0)
        }
    }

    fn entry(&self, id: HandleId) -> AccessResult<&Entry> {
        self.ensure_open()?;
        let slot = self.entries.get(id.index()).ok_or(AccessError::StaleHandle(id))?;
        if self.slot_generations[id.index()] != id.generation() {
            return Err(AccessError::StaleHandle(id));
        }
        slot.as_ref().ok_or(AccessError::StaleHandle(id))
    }

    fn entry_mut(&mut self, id: HandleId) -> AccessResult<&mut Entry> {
        self.ensure_open()?;
        let generation = *self.slot_generations.get(id.index()).ok_or(AccessError::StaleHandle(id))?;
        if generation != id.generation() {
            return Err(AccessError::StaleHandle(id));
        }
        self.entries[id.index()].as_mut().ok_or(AccessError::StaleHandle(id))
    }

    /// Returns the engine token behind a handle.
    pub fn raw(&self, id: HandleId) -> AccessResult<RawHandle> {
        Ok(self.entry(id)?.raw)
    }

    /// Returns the kind of the entry behind a handle.
    pub fn kind(&self, id: HandleId) -> AccessResult<ObjectKind> {
        Ok(self.entry(id)?.kind)
    }

    /// Returns the engine token behind a handle after checking its kind.
    pub fn raw_of_kind(&self, id: HandleId, expected: ObjectKind) -> AccessResult<RawHandle> {
        let entry = self.entry(id)?;
        if entry.kind != expected {
            return Err(AccessError::KindMismatch {
                expected: expected.as_str(),
                actual: entry.kind.as_str(),
            });
        }
        Ok(entry.raw)
    }

    /// Returns `true` when the handle refers to a live entry of an open context.
    pub fn is_live(&self, id: HandleId) -> bool {
        self.entry(id).is_ok()
    }

    /// Returns the current reference count of an entry.
    pub fn refcount(&self, id: HandleId) -> AccessResult<usize> {
        Ok(self.entry(id)?.refcount)
    }

    /// Takes an additional reference to an entry.
    ///
    /// Each `retain` must be balanced by one [`Self::release`].
    pub fn retain(&mut self, id: HandleId) -> AccessResult<()> {
        self.entry_mut(id)?.refcount += 1;
        Ok(())
    }

    /// Releases one reference to an entry, freeing it at refcount zero.
    ///
    /// Freeing pushes the slot onto the free list for reuse and releases the
    /// engine-side reference through [`Engine::destroy`].
    pub fn release(&mut self, id: HandleId) -> AccessResult<()> {
        let entry = self.entry_mut(id)?;
        if entry.refcount > 1 {
            entry.refcount -= 1;
            return Ok(());
        }
        let entry = self.entries[id.index()].take().expect("Context::release: entry vanished");
        self.free_list.push(id.index());
        self.tracker.on_release();
        self.tracer.on_destroy(entry.raw);
        self.engine.destroy(entry.raw);
        Ok(())
    }

    /// Closes the context, releasing every entry it still owns.
    ///
    /// Bulk teardown ignores reference counts: the context guarantees release
    /// of all owned engine objects regardless of whether individual handles
    /// were explicitly released. Idempotent; a second close is a no-op. After
    /// close, every operation fails with [`AccessError::ContextClosed`].
    pub fn close(&mut self) {
        if self.state == ContextState::Closed {
            return;
        }
        let mut released = 0usize;
        for index in 0..self.entries.len() {
            if let Some(entry) = self.entries[index].take() {
                self.tracker.on_release();
                self.tracer.on_destroy(entry.raw);
                self.engine.destroy(entry.raw);
                released += 1;
            }
        }
        self.entries.clear();
        self.slot_generations.clear();
        self.free_list.clear();
        self.tracer.on_close(released);
        self.state = ContextState::Closed;
    }

    /// Returns a snapshot of the context's current state.
    pub fn stats(&self) -> ContextStats {
        let mut handles_by_kind: BTreeMap<&'static str, usize> = BTreeMap::new();
        let mut live_handles = 0;
        for entry in self.entries.iter().flatten() {
            live_handles += 1;
            *handles_by_kind.entry(entry.kind.as_str()).or_insert(0) += 1;
        }
        ContextStats {
            live_handles,
            free_slots: self.free_list.len(),
            total_slots: self.entries.len(),
            handles_by_kind,
            tracker_live: self.tracker.live_handles(),
            tracker_registrations: self.tracker.total_registrations(),
        }
    }

    /// Reads a field of `owner` and registers the result as a new entry.
    ///
    /// The tracker check runs before the engine call; if the engine call
    /// fails afterwards, the tracker registration is rolled back.
    pub(crate) fn field_handle(
        &mut self,
        owner: HandleId,
        owner_kind: ObjectKind,
        field: i32,
        result_kind: ObjectKind,
    ) -> AccessResult<HandleId> {
        let owner_raw = self.raw_of_kind(owner, owner_kind)?;
        self.tracker.on_register()?;
        self.tracer.on_get_field(owner_raw, field);
        let value = match self.engine.get_field(owner_raw, field) {
            Ok(value) => value,
            Err(err) => {
                self.tracker.on_release();
                return Err(AccessError::Engine(err));
            }
        };
        if value.is_null() {
            self.tracker.on_release();
            return Err(AccessError::invalid_argument("engine returned the null token"));
        }
        Ok(self.insert(value, result_kind))
    }

    /// Writes a handle-valued field of `owner`.
    pub(crate) fn put_field_handle(
        &mut self,
        owner: HandleId,
        owner_kind: ObjectKind,
        field: i32,
        value: HandleId,
        value_kind: ObjectKind,
    ) -> AccessResult<()> {
        let owner_raw = self.raw_of_kind(owner, owner_kind)?;
        let value_raw = self.raw_of_kind(value, value_kind)?;
        self.tracer.on_set_field(owner_raw, field, value_raw);
        self.engine.set_field(owner_raw, field, value_raw)?;
        Ok(())
    }

    /// Reads a scalar field of `owner`.
    pub(crate) fn scalar(&mut self, owner: HandleId, owner_kind: ObjectKind, field: i32) -> AccessResult<Scalar> {
        let owner_raw = self.raw_of_kind(owner, owner_kind)?;
        self.tracer.on_get_scalar(owner_raw, field);
        Ok(self.engine.get_scalar(owner_raw, field)?)
    }

    /// Writes a scalar field of `owner`.
    pub(crate) fn put_scalar(
        &mut self,
        owner: HandleId,
        owner_kind: ObjectKind,
        field: i32,
        value: Scalar,
    ) -> AccessResult<()> {
        let owner_raw = self.raw_of_kind(owner, owner_kind)?;
        self.tracer.on_set_scalar(owner_raw, field, value);
        self.engine.set_scalar(owner_raw, field, value)?;
        Ok(())
    }
}

impl<E: Engine, T: HandleTracker, Tr: EngineTracer> Drop for Context<E, T, Tr> {
    /// Closing on drop is the last-resort safety net for contexts that were
    /// never explicitly closed.
    fn drop(&mut self) {
        self.close();
    }
}

/// Converts an arena slot index to the `u32` stored in handles.
fn as_u32(index: usize) -> u32 {
    u32::try_from(index).expect("arena slot index exceeds u32 range")
}
