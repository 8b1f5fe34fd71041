#![doc = include_str!("../../../README.md")]

mod accessor;
mod context;
mod engine;
mod error;
mod handle;
mod ident;
mod parameter;
mod resource;
mod tracer;

pub use crate::{
    accessor::{CompletionPartialResult, KernelInput, PredictionInput, SeedingPartialResult, TrainingResult},
    context::{Context, ContextDiff, ContextStats},
    engine::{Engine, EngineError, RawHandle, Scalar},
    error::{AccessError, AccessResult},
    handle::{Collection, HandleId, Model, ObjectKind, Table},
    ident::{
        FieldId, KernelInputId, PredictionInputId, PruningId, SeedingPartialDataId, SplitCriterionId, StepResultId,
        TrainingResultId,
    },
    parameter::TreeParameter,
    resource::{ContextLimits, HandleTracker, LimitError, LimitedTracker, NoLimitTracker},
    tracer::{CountingTracer, EngineTracer, NoopTracer, RecordingTracer, StderrTracer, TraceEvent},
};
