//! Tests for the scalar parameter registry.
//!
//! Verifies scalar round-trips through the engine, tag decoding into the
//! identifier families, and the failure modes for malformed engine values.

use nacre::{
    AccessError, Context, Engine, ObjectKind, PruningId, Scalar, SplitCriterionId, TreeParameter,
};
use nacre_mem::MemEngine;
use pretty_assertions::assert_eq;

// =============================================================================
// 1. Round-Trips
// =============================================================================

/// Every parameter field writes and reads back through the engine.
#[test]
fn parameters_round_trip_through_the_engine() {
    let mut ctx = Context::new(MemEngine::new());
    let params = TreeParameter::create(&mut ctx).unwrap();

    params.set_pruning(&mut ctx, PruningId::ReducedErrorPruning).unwrap();
    params.set_max_tree_depth(&mut ctx, 12).unwrap();
    params.set_min_observations_in_leaf(&mut ctx, 5).unwrap();
    params.set_split_criterion(&mut ctx, SplitCriterionId::InfoGain).unwrap();

    assert_eq!(params.pruning(&mut ctx).unwrap(), PruningId::ReducedErrorPruning);
    assert_eq!(params.max_tree_depth(&mut ctx).unwrap(), 12);
    assert_eq!(params.min_observations_in_leaf(&mut ctx).unwrap(), 5);
    assert_eq!(params.split_criterion(&mut ctx).unwrap(), SplitCriterionId::InfoGain);
}

/// Depth zero is a valid value meaning unlimited depth.
#[test]
fn zero_depth_round_trips() {
    let mut ctx = Context::new(MemEngine::new());
    let params = TreeParameter::create(&mut ctx).unwrap();
    params.set_max_tree_depth(&mut ctx, 0).unwrap();
    assert_eq!(params.max_tree_depth(&mut ctx).unwrap(), 0);
}

// =============================================================================
// 2. Malformed Engine Values
// =============================================================================

/// Seeds a parameter object on the engine side with an arbitrary scalar.
fn seeded_context(field: i32, value: Scalar) -> (Context<MemEngine>, TreeParameter) {
    let mut engine = MemEngine::new();
    let raw = engine.create(ObjectKind::ParameterSet).unwrap();
    engine.set_scalar(raw, field, value).unwrap();

    let mut ctx = Context::new(engine);
    let handle = ctx.register(raw, ObjectKind::ParameterSet).unwrap();
    let params = TreeParameter::bind(&ctx, handle).unwrap();
    (ctx, params)
}

/// A tag outside the pruning family surfaces as `UnknownTag`, never coerced.
#[test]
fn out_of_family_tag_surfaces_as_unknown_tag() {
    let (mut ctx, params) = seeded_context(0, Scalar::Tag(99));
    let err = params.pruning(&mut ctx).unwrap_err();
    assert_eq!(err, AccessError::UnknownTag { field: "pruning", raw: 99 });
}

/// A scalar of the wrong primitive type is a mismatch, not a decode attempt.
#[test]
fn wrong_primitive_type_is_a_scalar_mismatch() {
    let (mut ctx, params) = seeded_context(0, Scalar::Int(1));
    let err = params.pruning(&mut ctx).unwrap_err();
    assert_eq!(
        err,
        AccessError::ScalarMismatch {
            field: "pruning",
            expected: "tag",
            actual: "int"
        }
    );
}

/// A negative count from the engine cannot be narrowed silently.
#[test]
fn negative_depth_from_the_engine_is_rejected() {
    let (mut ctx, params) = seeded_context(1, Scalar::Int(-5));
    let err = params.max_tree_depth(&mut ctx).unwrap_err();
    assert_eq!(
        err,
        AccessError::ScalarMismatch {
            field: "max tree depth",
            expected: "non-negative int",
            actual: "int"
        }
    );
}

/// Reading a never-written parameter surfaces the engine's own error.
#[test]
fn unset_parameter_surfaces_the_engine_error() {
    let mut ctx = Context::new(MemEngine::new());
    let params = TreeParameter::create(&mut ctx).unwrap();
    let err = params.split_criterion(&mut ctx).unwrap_err();
    assert!(matches!(err, AccessError::Engine(_)), "got {err:?}");
}

// =============================================================================
// 3. Binding
// =============================================================================

/// Parameter accessors refuse entries of other kinds.
#[test]
fn binding_over_a_table_fails() {
    let mut ctx = Context::new(MemEngine::new());
    let table = ctx.new_table().unwrap();
    let err = TreeParameter::bind(&ctx, table.id()).unwrap_err();
    assert_eq!(
        err,
        AccessError::KindMismatch {
            expected: "ParameterSet",
            actual: "Table"
        }
    );
}
