//! Identifier families for input, result, and parameter slots.
//!
//! Each family is a closed enum whose discriminants are the engine's wire
//! values. An out-of-domain integer cannot be constructed, which removes the
//! bulk of runtime validation; what remains is conversion at the raw-value
//! boundary ([`FieldId::from_raw`]) and membership checks for accessors whose
//! allowed set is a strict subset of a family.

use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString, FromRepr, IntoStaticStr};

use crate::error::{AccessError, AccessResult};

/// Common behavior of every identifier family.
///
/// `raw` and `from_raw` convert between the typed identifier and the `i32`
/// wire value the engine understands. `validate` and `ensure` are the
/// fail-fast guards: an unknown raw value or a missing identifier is an
/// [`AccessError::InvalidArgument`] before anything reaches the engine.
pub trait FieldId: Copy + fmt::Debug + fmt::Display {
    /// Family name used in diagnostics.
    const FAMILY: &'static str;

    /// Returns the engine wire value for this identifier.
    fn raw(self) -> i32;

    /// Decodes a wire value, returning `None` when it is outside the family.
    fn from_raw(raw: i32) -> Option<Self>;

    /// Returns `true` iff `raw` decodes into this family.
    #[must_use]
    fn validate(raw: i32) -> bool {
        Self::from_raw(raw).is_some()
    }

    /// Unwraps an optional identifier, failing fast when it is missing.
    ///
    /// This is the typed rendition of a null-identifier check at a binding
    /// boundary: `None` is rejected locally with `InvalidArgument`.
    fn ensure(id: Option<Self>) -> AccessResult<Self> {
        id.ok_or_else(|| AccessError::invalid_argument(format!("missing {family} identifier", family = Self::FAMILY)))
    }
}

macro_rules! field_id_family {
    ($ty:ident, $family:literal) => {
        impl FieldId for $ty {
            const FAMILY: &'static str = $family;

            fn raw(self) -> i32 {
                self as i32
            }

            fn from_raw(raw: i32) -> Option<Self> {
                Self::from_repr(raw)
            }
        }
    };
}

/// Identifiers of input objects for the prediction stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum PredictionInputId {
    /// Data for the prediction stage.
    Data = 0,
}

field_id_family!(PredictionInputId, "prediction input");

/// Identifiers of the left and right operands of a kernel function.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum KernelInputId {
    /// The left operand matrix.
    X = 0,
    /// The right operand matrix.
    Y = 1,
}

field_id_family!(KernelInputId, "kernel input");

/// Identifiers of training-stage result objects.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum TrainingResultId {
    /// The trained model.
    Model = 0,
}

field_id_family!(TrainingResultId, "training result");

/// Identifiers of partial results exchanged between distributed steps.
///
/// One family covers the step-local slots; each step's accessor narrows it to
/// the slots that step actually produces.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum StepResultId {
    /// Boundaries of the data partitions assigned to each node.
    PartitionBoundaries = 0,
    /// Single-row table flagging whether the computation has converged.
    FinishedFlag = 1,
    /// Node-local partition data carried forward to the next step.
    InternalPartition = 2,
}

field_id_family!(StepResultId, "step result");

/// Identifiers of partial results of the cluster seeding stage.
///
/// The wire values are non-contiguous: slots 0 and 1 belong to outputs this
/// layer does not expose, so decoding them must fail.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum SeedingPartialDataId {
    /// Collection of internal seeding data required by future steps on the node.
    InternalResult = 2,
}

field_id_family!(SeedingPartialDataId, "seeding partial data");

/// Pruning methods for decision tree training.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum PruningId {
    /// No pruning.
    None = 0,
    /// Reduced-error pruning against a held-out set.
    ReducedErrorPruning = 1,
}

field_id_family!(PruningId, "pruning method");

/// Split criteria for decision tree classification training.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display, EnumString, IntoStaticStr, Serialize, Deserialize,
)]
#[repr(i32)]
pub enum SplitCriterionId {
    /// Gini impurity.
    Gini = 0,
    /// Information gain.
    InfoGain = 1,
}

field_id_family!(SplitCriterionId, "split criterion");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_match_the_wire_protocol() {
        assert_eq!(PredictionInputId::Data.raw(), 0);
        assert_eq!(KernelInputId::X.raw(), 0);
        assert_eq!(KernelInputId::Y.raw(), 1);
        assert_eq!(StepResultId::FinishedFlag.raw(), 1);
        assert_eq!(SeedingPartialDataId::InternalResult.raw(), 2);
        assert_eq!(PruningId::ReducedErrorPruning.raw(), 1);
        assert_eq!(SplitCriterionId::InfoGain.raw(), 1);
    }

    #[test]
    fn from_raw_round_trips_every_member() {
        for id in [KernelInputId::X, KernelInputId::Y] {
            assert_eq!(KernelInputId::from_raw(id.raw()), Some(id));
        }
        for id in [
            StepResultId::PartitionBoundaries,
            StepResultId::FinishedFlag,
            StepResultId::InternalPartition,
        ] {
            assert_eq!(StepResultId::from_raw(id.raw()), Some(id));
        }
    }

    #[test]
    fn non_contiguous_family_rejects_the_gaps() {
        assert!(!SeedingPartialDataId::validate(0));
        assert!(!SeedingPartialDataId::validate(1));
        assert!(SeedingPartialDataId::validate(2));
    }

    #[test]
    fn out_of_domain_raw_values_fail_validation() {
        assert!(!PredictionInputId::validate(1));
        assert!(!KernelInputId::validate(2));
        assert!(!PruningId::validate(-1));
        assert!(!SplitCriterionId::validate(17));
    }

    #[test]
    fn ensure_rejects_missing_identifiers() {
        let err = KernelInputId::ensure(None).unwrap_err();
        assert!(matches!(err, AccessError::InvalidArgument { .. }), "got {err:?}");
    }

    #[test]
    fn ensure_passes_present_identifiers_through() {
        assert_eq!(KernelInputId::ensure(Some(KernelInputId::Y)).unwrap(), KernelInputId::Y);
    }
}
