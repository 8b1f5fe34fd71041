//! Scalar parameter registry for decision tree training.

use crate::{
    context::Context,
    engine::{Engine, Scalar},
    error::{AccessError, AccessResult},
    handle::{HandleId, ObjectKind},
    ident::{FieldId, PruningId, SplitCriterionId},
    resource::HandleTracker,
    tracer::EngineTracer,
};

/// Parameters of the decision tree classification training algorithm.
///
/// Each getter/setter is one scalar engine call. Tag-valued fields decode
/// into their identifier family on read; a tag the engine returns that falls
/// outside the family surfaces as [`AccessError::UnknownTag`] rather than
/// being coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParameter {
    handle: HandleId,
}

impl TreeParameter {
    // Wire slots of the scalar fields on the engine-side parameter object.
    const PRUNING: i32 = 0;
    const MAX_TREE_DEPTH: i32 = 1;
    const MIN_OBSERVATIONS_IN_LEAF: i32 = 2;
    const SPLIT_CRITERION: i32 = 3;

    /// Creates a new parameter set in the context.
    pub fn create<E: Engine, T: HandleTracker, Tr: EngineTracer>(ctx: &mut Context<E, T, Tr>) -> AccessResult<Self> {
        Ok(Self { handle: ctx.create(ObjectKind::ParameterSet)? })
    }

    /// Binds an accessor to an existing parameter set entry.
    pub fn bind<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        ctx: &Context<E, T, Tr>,
        handle: HandleId,
    ) -> AccessResult<Self> {
        ctx.raw_of_kind(handle, ObjectKind::ParameterSet)?;
        Ok(Self { handle })
    }

    /// Returns the underlying arena handle.
    #[must_use]
    pub fn handle(&self) -> HandleId {
        self.handle
    }

    /// Returns the pruning method.
    pub fn pruning<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
    ) -> AccessResult<PruningId> {
        decode_tag(ctx.scalar(self.handle, ObjectKind::ParameterSet, Self::PRUNING)?, "pruning")
    }

    /// Sets the pruning method.
    pub fn set_pruning<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        value: PruningId,
    ) -> AccessResult<()> {
        ctx.put_scalar(self.handle, ObjectKind::ParameterSet, Self::PRUNING, Scalar::Tag(value.raw()))
    }

    /// Returns the maximum tree depth. Zero means unlimited depth.
    pub fn max_tree_depth<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
    ) -> AccessResult<u64> {
        decode_count(
            ctx.scalar(self.handle, ObjectKind::ParameterSet, Self::MAX_TREE_DEPTH)?,
            "max tree depth",
        )
    }

    /// Sets the maximum tree depth; zero means unlimited depth.
    pub fn set_max_tree_depth<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        value: u64,
    ) -> AccessResult<()> {
        ctx.put_scalar(
            self.handle,
            ObjectKind::ParameterSet,
            Self::MAX_TREE_DEPTH,
            Scalar::Int(encode_count(value, "max tree depth")?),
        )
    }

    /// Returns the minimum number of observations in a leaf node.
    pub fn min_observations_in_leaf<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
    ) -> AccessResult<u64> {
        decode_count(
            ctx.scalar(self.handle, ObjectKind::ParameterSet, Self::MIN_OBSERVATIONS_IN_LEAF)?,
            "min observations in leaf",
        )
    }

    /// Sets the minimum number of observations in a leaf node.
    pub fn set_min_observations_in_leaf<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        value: u64,
    ) -> AccessResult<()> {
        ctx.put_scalar(
            self.handle,
            ObjectKind::ParameterSet,
            Self::MIN_OBSERVATIONS_IN_LEAF,
            Scalar::Int(encode_count(value, "min observations in leaf")?),
        )
    }

    /// Returns the split criterion.
    pub fn split_criterion<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
    ) -> AccessResult<SplitCriterionId> {
        decode_tag(
            ctx.scalar(self.handle, ObjectKind::ParameterSet, Self::SPLIT_CRITERION)?,
            "split criterion",
        )
    }

    /// Sets the split criterion.
    pub fn set_split_criterion<E: Engine, T: HandleTracker, Tr: EngineTracer>(
        &self,
        ctx: &mut Context<E, T, Tr>,
        value: SplitCriterionId,
    ) -> AccessResult<()> {
        ctx.put_scalar(
            self.handle,
            ObjectKind::ParameterSet,
            Self::SPLIT_CRITERION,
            Scalar::Tag(value.raw()),
        )
    }
}

/// Decodes a tag scalar into its identifier family.
fn decode_tag<I: FieldId>(scalar: Scalar, field: &'static str) -> AccessResult<I> {
    match scalar {
        Scalar::Tag(raw) => I::from_raw(raw).ok_or(AccessError::UnknownTag { field, raw }),
        other => Err(AccessError::ScalarMismatch {
            field,
            expected: "tag",
            actual: other.kind_name(),
        }),
    }
}

/// Decodes a non-negative integer scalar.
fn decode_count(scalar: Scalar, field: &'static str) -> AccessResult<u64> {
    match scalar {
        Scalar::Int(value) => u64::try_from(value).map_err(|_| AccessError::ScalarMismatch {
            field,
            expected: "non-negative int",
            actual: "int",
        }),
        other => Err(AccessError::ScalarMismatch {
            field,
            expected: "int",
            actual: other.kind_name(),
        }),
    }
}

/// Encodes a count for the engine's signed integer scalars.
fn encode_count(value: u64, field: &'static str) -> AccessResult<i64> {
    i64::try_from(value)
        .map_err(|_| AccessError::invalid_argument(format!("{field} value {value} exceeds the engine integer range")))
}
