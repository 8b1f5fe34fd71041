//! Typed accessors over engine objects.
//!
//! Each accessor binds one arena handle and exposes get/set operations keyed
//! by an identifier family. The shape is uniform: validate the identifier,
//! forward one engine call through the owning context, wrap the result as a
//! typed view registered in the same context. Accessors hold no engine state
//! themselves; they are copyable handles plus a kind contract.

use crate::{
    context::Context,
    engine::Engine,
    error::{AccessError, AccessResult},
    handle::{Collection, HandleId, Model, ObjectKind, Table},
    ident::{FieldId, KernelInputId, PredictionInputId, SeedingPartialDataId, StepResultId, TrainingResultId},
    resource::HandleTracker,
    tracer::EngineTracer,
};

/// Input accessor for the prediction stage.
///
/// Carries the data table the trained model is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PredictionInput {
    handle: HandleId,
}

impl PredictionInput {
    /// Creates a new prediction input object in the context.
    pub fn create<E: Engine, T: HandleTracker, Tr: EngineTracer>(ctx: &mut Context<E, T, Tr>) -> AccessResult<Self> {
        Ok(Self { handle: ctx.create(ObjectKind::Input)? })
    }

    /// Binds an accessor to an existing input entry.
    pub fn bind<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        ctx: &Context<E, T, Tr>,
        handle: HandleId,
    ) -> AccessResult<Self> {
        ctx.raw_of_kind(handle, ObjectKind::Input)?;
        Ok(Self { handle })
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns the input table stored under `id`.
    pub fn get<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: PredictionInputId,
    ) -> AccessResult<Table> {
        let handle = ctx.field_handle(self.handle, ObjectKind::Input, id.raw(), ObjectKind::Table)?;
        Ok(Table::new(handle))
    }

    /// Stores an input table under `id`.
    pub fn set<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: PredictionInputId,
        value: Table,
    ) -> AccessResult<()> {
        ctx.put_field_handle(self.handle, ObjectKind::Input, id.raw(), value.id(), ObjectKind::Table)
    }
}

/// Input accessor for a kernel function.
///
/// Holds the left and right operand matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelInput {
    handle: HandleId,
}

impl KernelInput {
    /// Creates a new kernel input object in the context.
    pub fn create<E: Engine, T: HandleTracker, Tr: EngineTracer>(ctx: &mut Context<E, T, Tr>) -> AccessResult<Self> {
        Ok(Self { handle: ctx.create(ObjectKind::Input)? })
    }

    /// Binds an accessor to an existing input entry.
    pub fn bind<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        ctx: &Context<E, T, Tr>,
        handle: HandleId,
    ) -> AccessResult<Self> {
        ctx.raw_of_kind(handle, ObjectKind::Input)?;
        Ok(Self { handle })
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns the operand stored under `id`.
    pub fn get<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: KernelInputId,
    ) -> AccessResult<Table> {
        let handle = ctx.field_handle(self.handle, ObjectKind::Input, id.raw(), ObjectKind::Table)?;
        Ok(Table::new(handle))
    }

    /// Stores an operand under `id`.
    pub fn set<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: KernelInputId,
        value: Table,
    ) -> AccessResult<()> {
        ctx.put_field_handle(self.handle, ObjectKind::Input, id.raw(), value.id(), ObjectKind::Table)
    }
}

/// Result accessor for the training stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrainingResult {
    handle: HandleId,
}

impl TrainingResult {
    /// Creates a new training result object in the context.
    pub fn create<E: Engine, T: HandleTracker, Tr: EngineTracer>(ctx: &mut Context<E, T, Tr>) -> AccessResult<Self> {
        Ok(Self { handle: ctx.create(ObjectKind::ResultSet)? })
    }

    /// Binds an accessor to an existing result entry.
    pub fn bind<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        ctx: &Context<E, T, Tr>,
        handle: HandleId,
    ) -> AccessResult<Self> {
        ctx.raw_of_kind(handle, ObjectKind::ResultSet)?;
        Ok(Self { handle })
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns the trained model stored under `id`.
    pub fn get<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: TrainingResultId,
    ) -> AccessResult<Model> {
        let handle = ctx.field_handle(self.handle, ObjectKind::ResultSet, id.raw(), ObjectKind::Model)?;
        Ok(Model::new(handle))
    }
}

/// Partial result of the final convergence-check step of a distributed
/// computation.
///
/// The step produces a single slot: the finished flag. The identifier family
/// is shared across steps, so membership is checked here; any other member
/// fails with `InvalidArgument` before the engine is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletionPartialResult {
    handle: HandleId,
}

impl CompletionPartialResult {
    /// Slots this step produces.
    const ALLOWED: &'static [StepResultId] = &[StepResultId::FinishedFlag];

    /// Creates a new partial result object in the context.
    pub fn create<E: Engine, T: HandleTracker, Tr: EngineTracer>(ctx: &mut Context<E, T, Tr>) -> AccessResult<Self> {
        Ok(Self { handle: ctx.create(ObjectKind::PartialResult)? })
    }

    /// Binds an accessor to an existing partial result entry.
    pub fn bind<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        ctx: &Context<E, T, Tr>,
        handle: HandleId,
    ) -> AccessResult<Self> {
        ctx.raw_of_kind(handle, ObjectKind::PartialResult)?;
        Ok(Self { handle })
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns `true` iff `id` belongs to this accessor's allowed set.
    #[must_use]
    pub fn validate(id: StepResultId) -> bool {
        Self::ALLOWED.contains(&id)
    }

    fn ensure_allowed(id: StepResultId) -> AccessResult<()> {
        if Self::validate(id) {
            Ok(())
        } else {
            Err(AccessError::invalid_argument(format!(
                "identifier {id} is not produced by the convergence-check step"
            )))
        }
    }

    /// Returns the table stored under `id`.
    pub fn get<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: StepResultId,
    ) -> AccessResult<Table> {
        Self::ensure_allowed(id)?;
        let handle = ctx.field_handle(self.handle, ObjectKind::PartialResult, id.raw(), ObjectKind::Table)?;
        Ok(Table::new(handle))
    }

    /// Stores a table under `id`.
    pub fn set<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: StepResultId,
        value: Table,
    ) -> AccessResult<()> {
        Self::ensure_allowed(id)?;
        ctx.put_field_handle(self.handle, ObjectKind::PartialResult, id.raw(), value.id(), ObjectKind::Table)
    }
}

/// Partial result of the cluster seeding stage on a local node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedingPartialResult {
    handle: HandleId,
}

impl SeedingPartialResult {
    /// Creates a new seeding partial result object in the context.
    pub fn create<E: Engine, T: HandleTracker, Tr: EngineTracer>(ctx: &mut Context<E, T, Tr>) -> AccessResult<Self> {
        Ok(Self { handle: ctx.create(ObjectKind::PartialResult)? })
    }

    /// Binds an accessor to an existing partial result entry.
    pub fn bind<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        ctx: &Context<E, T, Tr>,
        handle: HandleId,
    ) -> AccessResult<Self> {
        ctx.raw_of_kind(handle, ObjectKind::PartialResult)?;
        Ok(Self { handle })
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns the collection stored under `id`.
    pub fn get<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: SeedingPartialDataId,
    ) -> AccessResult<Collection> {
        let handle = ctx.field_handle(self.handle, ObjectKind::PartialResult, id.raw(), ObjectKind::Collection)?;
        Ok(Collection::new(handle))
    }

    /// Stores a collection under `id`.
    pub fn set<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        id: SeedingPartialDataId,
        value: Collection,
    ) -> AccessResult<()> {
        ctx.put_field_handle(self.handle, ObjectKind::PartialResult, id.raw(), value.id(), ObjectKind::Collection)
    }
}
