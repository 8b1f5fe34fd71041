//! Conformance tests for the in-memory reference engine.

use nacre::{Engine, ObjectKind, RawHandle, Scalar};
use nacre_mem::MemEngine;
use pretty_assertions::assert_eq;

// =============================================================================
// 1. Token Issuance
// =============================================================================

/// Tokens are unique, non-null, and remember their creation kind.
#[test]
fn tokens_are_unique_and_never_null() {
    let mut engine = MemEngine::new();
    let a = engine.create(ObjectKind::Table).unwrap();
    let b = engine.create(ObjectKind::Model).unwrap();

    assert!(!a.is_null());
    assert!(!b.is_null());
    assert_ne!(a, b);
    assert_eq!(engine.kind_of(a), Some(ObjectKind::Table));
    assert_eq!(engine.kind_of(b), Some(ObjectKind::Model));
}

// =============================================================================
// 2. Reference Semantics
// =============================================================================

/// Storing a value in a field keeps it alive after the caller's reference is
/// released.
#[test]
fn a_field_reference_keeps_the_value_alive() {
    let mut engine = MemEngine::new();
    let owner = engine.create(ObjectKind::Input).unwrap();
    let value = engine.create(ObjectKind::Table).unwrap();
    engine.set_field(owner, 0, value).unwrap();

    // Release the caller's reference; the field still holds one.
    engine.destroy(value);
    assert!(engine.contains(value));

    // Releasing the owner releases its field references too.
    engine.destroy(owner);
    assert!(!engine.contains(owner));
    assert!(!engine.contains(value));
}

/// Replacing a field releases the previous occupant's engine-side reference.
#[test]
fn replacing_a_field_releases_the_previous_value() {
    let mut engine = MemEngine::new();
    let owner = engine.create(ObjectKind::Input).unwrap();
    let first = engine.create(ObjectKind::Table).unwrap();
    let second = engine.create(ObjectKind::Table).unwrap();

    engine.set_field(owner, 0, first).unwrap();
    engine.destroy(first);
    engine.set_field(owner, 0, second).unwrap();

    assert!(!engine.contains(first), "the replaced value lost its last reference");
    assert!(engine.contains(second));
}

/// Each field read hands the caller one more ownership reference.
#[test]
fn get_field_hands_out_an_ownership_reference() {
    let mut engine = MemEngine::new();
    let owner = engine.create(ObjectKind::Input).unwrap();
    let value = engine.create(ObjectKind::Table).unwrap();
    engine.set_field(owner, 0, value).unwrap();
    engine.destroy(value);

    let fetched = engine.get_field(owner, 0).unwrap();
    assert_eq!(fetched, value);

    // One reference from the read, one held by the field.
    engine.destroy(fetched);
    assert!(engine.contains(value));
    engine.destroy(owner);
    assert!(!engine.contains(value));
}

// =============================================================================
// 3. Failure Modes
// =============================================================================

/// Unknown tokens and unset fields produce engine errors.
#[test]
fn unknown_tokens_and_unset_fields_error() {
    let mut engine = MemEngine::new();
    let owner = engine.create(ObjectKind::Input).unwrap();

    assert!(engine.get_field(RawHandle::new(999), 0).is_err());
    assert!(engine.get_field(owner, 0).is_err());
    assert!(engine.get_scalar(owner, 0).is_err());
    assert!(engine.set_field(owner, 0, RawHandle::new(999)).is_err());
}

/// Destroying an unknown token is a silent no-op, matching release-during-
/// teardown semantics.
#[test]
fn destroying_an_unknown_token_is_a_no_op() {
    let mut engine = MemEngine::new();
    engine.destroy(RawHandle::new(42));
    assert_eq!(engine.live_objects(), 0);
}

// =============================================================================
// 4. Scalars
// =============================================================================

/// Scalars of every primitive type store and read back verbatim.
#[test]
fn scalars_round_trip_verbatim() {
    let mut engine = MemEngine::new();
    let owner = engine.create(ObjectKind::ParameterSet).unwrap();

    let values = [
        (0, Scalar::Int(-7)),
        (1, Scalar::Float(0.5)),
        (2, Scalar::Tag(3)),
        (3, Scalar::Flag(true)),
    ];
    for (field, value) in values {
        engine.set_scalar(owner, field, value).unwrap();
    }
    for (field, value) in values {
        assert_eq!(engine.get_scalar(owner, field).unwrap(), value);
    }
}
