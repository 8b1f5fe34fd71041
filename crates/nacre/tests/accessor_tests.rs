//! Tests for the typed accessors.
//!
//! Verifies that identifier validation happens strictly before any engine
//! call, that in-set identifiers round-trip through the engine, and that
//! engine failures pass through unchanged.

use nacre::{
    AccessError, CompletionPartialResult, Context, Engine, EngineError, KernelInput, KernelInputId, ObjectKind,
    PredictionInput, PredictionInputId, RawHandle, Scalar, SeedingPartialDataId, SeedingPartialResult, StepResultId,
    TrainingResult, TrainingResultId,
};
use nacre_mem::MemEngine;
use pretty_assertions::assert_eq;

/// Engine wrapper that counts every trait-method invocation.
///
/// This is the call-count mock the validation properties need: if an
/// identifier is rejected locally, the count must not move.
#[derive(Debug, Default)]
struct CountingEngine {
    inner: MemEngine,
    calls: usize,
}

impl Engine for CountingEngine {
    fn create(&mut self, kind: ObjectKind) -> Result<RawHandle, EngineError> {
        self.calls += 1;
        self.inner.create(kind)
    }

    fn get_field(&mut self, handle: RawHandle, field: i32) -> Result<RawHandle, EngineError> {
        self.calls += 1;
        self.inner.get_field(handle, field)
    }

    fn set_field(&mut self, handle: RawHandle, field: i32, value: RawHandle) -> Result<(), EngineError> {
        self.calls += 1;
        self.inner.set_field(handle, field, value)
    }

    fn get_scalar(&mut self, handle: RawHandle, field: i32) -> Result<Scalar, EngineError> {
        self.calls += 1;
        self.inner.get_scalar(handle, field)
    }

    fn set_scalar(&mut self, handle: RawHandle, field: i32, value: Scalar) -> Result<(), EngineError> {
        self.calls += 1;
        self.inner.set_scalar(handle, field, value)
    }

    fn destroy(&mut self, handle: RawHandle) {
        self.calls += 1;
        self.inner.destroy(handle);
    }
}

// =============================================================================
// 1. Validation Happens Before Any Engine Call
// =============================================================================

/// An out-of-set identifier must be rejected while the engine call count
/// stays untouched.
#[test]
fn out_of_set_get_fails_before_any_engine_call() {
    let mut ctx = Context::new(CountingEngine::default());
    let partial = CompletionPartialResult::create(&mut ctx).unwrap();
    let calls_before = ctx.engine().calls;

    let err = partial.get(&mut ctx, StepResultId::PartitionBoundaries).unwrap_err();
    assert!(matches!(err, AccessError::InvalidArgument { .. }), "got {err:?}");
    assert_eq!(
        ctx.engine().calls,
        calls_before,
        "a rejected identifier must not reach the engine"
    );
}

/// Same property for the setter, including the out-of-set member that shares
/// a wire value with a valid slot of another family.
#[test]
fn out_of_set_set_fails_before_any_engine_call() {
    let mut ctx = Context::new(CountingEngine::default());
    let partial = CompletionPartialResult::create(&mut ctx).unwrap();
    let table = ctx.new_table().unwrap();
    let calls_before = ctx.engine().calls;

    for id in [StepResultId::PartitionBoundaries, StepResultId::InternalPartition] {
        let err = partial.set(&mut ctx, id, table).unwrap_err();
        assert!(matches!(err, AccessError::InvalidArgument { .. }), "id {id}: got {err:?}");
    }
    assert_eq!(ctx.engine().calls, calls_before);
}

/// The allowed-set predicate itself.
#[test]
fn completion_partial_result_allows_only_the_finished_flag() {
    assert!(CompletionPartialResult::validate(StepResultId::FinishedFlag));
    assert!(!CompletionPartialResult::validate(StepResultId::PartitionBoundaries));
    assert!(!CompletionPartialResult::validate(StepResultId::InternalPartition));
}

// =============================================================================
// 2. In-Set Identifiers Round-Trip
// =============================================================================

/// `set(id, v)` then `get(id)` must resolve to the same engine object within
/// one open context.
#[test]
fn finished_flag_round_trips_through_the_engine() {
    let mut ctx = Context::new(MemEngine::new());
    let partial = CompletionPartialResult::create(&mut ctx).unwrap();
    let flag = ctx.new_table().unwrap();

    partial.set(&mut ctx, StepResultId::FinishedFlag, flag).unwrap();
    let back = partial.get(&mut ctx, StepResultId::FinishedFlag).unwrap();

    assert_eq!(ctx.raw(back.id()).unwrap(), ctx.raw(flag.id()).unwrap());
}

/// Both kernel operands round-trip independently.
#[test]
fn kernel_operands_round_trip_independently() {
    let mut ctx = Context::new(MemEngine::new());
    let input = KernelInput::create(&mut ctx).unwrap();
    let x = ctx.new_table().unwrap();
    let y = ctx.new_table().unwrap();

    input.set(&mut ctx, KernelInputId::X, x).unwrap();
    input.set(&mut ctx, KernelInputId::Y, y).unwrap();

    let x_back = input.get(&mut ctx, KernelInputId::X).unwrap();
    let y_back = input.get(&mut ctx, KernelInputId::Y).unwrap();
    assert_eq!(ctx.raw(x_back.id()).unwrap(), ctx.raw(x.id()).unwrap());
    assert_eq!(ctx.raw(y_back.id()).unwrap(), ctx.raw(y.id()).unwrap());
    assert_ne!(ctx.raw(x_back.id()).unwrap(), ctx.raw(y_back.id()).unwrap());
}

/// The single-identifier prediction input family.
#[test]
fn prediction_input_round_trips_its_data_table() {
    let mut ctx = Context::new(MemEngine::new());
    let input = PredictionInput::create(&mut ctx).unwrap();
    let data = ctx.new_table().unwrap();

    input.set(&mut ctx, PredictionInputId::Data, data).unwrap();
    let back = input.get(&mut ctx, PredictionInputId::Data).unwrap();
    assert_eq!(ctx.raw(back.id()).unwrap(), ctx.raw(data.id()).unwrap());
}

/// The seeding stage exchanges a collection, not a table, under its
/// non-contiguous wire value.
#[test]
fn seeding_partial_result_round_trips_its_collection() {
    let mut ctx = Context::new(MemEngine::new());
    let partial = SeedingPartialResult::create(&mut ctx).unwrap();
    let internal = ctx.new_collection().unwrap();

    partial.set(&mut ctx, SeedingPartialDataId::InternalResult, internal).unwrap();
    let back = partial.get(&mut ctx, SeedingPartialDataId::InternalResult).unwrap();

    assert_eq!(ctx.raw(back.id()).unwrap(), ctx.raw(internal.id()).unwrap());
    assert_eq!(ctx.kind(back.id()).unwrap(), ObjectKind::Collection);
}

// =============================================================================
// 3. Binding To Engine-Issued Objects
// =============================================================================

/// A result object populated on the engine side can be registered, bound,
/// and read through the typed accessor.
#[test]
fn training_result_wraps_an_engine_issued_model() {
    let mut engine = MemEngine::new();
    let result_raw = engine.create(ObjectKind::ResultSet).unwrap();
    let model_raw = engine.create(ObjectKind::Model).unwrap();
    engine
        .set_field(result_raw, 0, model_raw)
        .expect("seeding the result object cannot fail");

    let mut ctx = Context::new(engine);
    let handle = ctx.register(result_raw, ObjectKind::ResultSet).unwrap();
    let result = TrainingResult::bind(&ctx, handle).unwrap();

    let model = result.get(&mut ctx, TrainingResultId::Model).unwrap();
    assert_eq!(ctx.raw(model.id()).unwrap(), model_raw);
    assert_eq!(ctx.kind(model.id()).unwrap(), ObjectKind::Model);
}

/// Binding an accessor over an entry of the wrong kind is a kind mismatch.
#[test]
fn binding_over_the_wrong_kind_fails() {
    let mut ctx = Context::new(MemEngine::new());
    let table = ctx.new_table().unwrap();

    let err = PredictionInput::bind(&ctx, table.id()).unwrap_err();
    assert_eq!(
        err,
        AccessError::KindMismatch {
            expected: "Input",
            actual: "Table"
        }
    );
}

// =============================================================================
// 4. Engine Failures Pass Through
// =============================================================================

/// Reading a slot the engine never stored surfaces the engine's own error,
/// unchanged and unretried.
#[test]
fn unset_field_surfaces_the_engine_error() {
    let mut ctx = Context::new(MemEngine::new());
    let input = KernelInput::create(&mut ctx).unwrap();

    let err = input.get(&mut ctx, KernelInputId::X).unwrap_err();
    let AccessError::Engine(engine_err) = err else {
        panic!("expected an engine error, got {err:?}");
    };
    assert!(
        engine_err.message().contains("unset"),
        "message should come from the engine verbatim, got: {engine_err}"
    );
}
