//! In-memory reference engine for the `nacre` access layer.
//!
//! [`MemEngine`] implements the [`Engine`] trait with a plain object store:
//! fields and scalars are held verbatim, ownership references are counted,
//! and nothing is ever computed. It exists so the access layer can be tested
//! and embedded without a native engine behind it.
//!
//! Object tokens are issued from a monotonic counter starting at 1; the
//! zero token stays reserved as null, matching the access layer's contract.

use ahash::AHashMap;
use indexmap::IndexMap;
use nacre::{Engine, EngineError, ObjectKind, RawHandle, Scalar};

/// One stored object: its kind, ownership reference count, and field maps.
///
/// `IndexMap` keeps field iteration in insertion order, which makes debug
/// output and failure messages deterministic.
#[derive(Debug, Clone)]
struct MemObject {
    kind: ObjectKind,
    refs: usize,
    fields: IndexMap<i32, RawHandle>,
    scalars: IndexMap<i32, Scalar>,
}

impl MemObject {
    fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            refs: 1,
            fields: IndexMap::new(),
            scalars: IndexMap::new(),
        }
    }
}

/// An in-memory engine holding objects in a token-keyed store.
///
/// Reference semantics mirror a shared-pointer-based native engine: `create`
/// and `get_field` each hand the caller one ownership reference, `set_field`
/// takes an engine-side reference to the stored value, and `destroy` releases
/// one reference, freeing the object (and releasing its field references)
/// when the last one goes.
#[derive(Debug, Default)]
pub struct MemEngine {
    objects: AHashMap<u64, MemObject>,
    next_token: u64,
}

impl MemEngine {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of objects currently alive in the store.
    #[must_use]
    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    /// Returns `true` when the token refers to a live object.
    #[must_use]
    pub fn contains(&self, handle: RawHandle) -> bool {
        self.objects.contains_key(&handle.as_raw())
    }

    /// Returns the kind a live object was created with.
    #[must_use]
    pub fn kind_of(&self, handle: RawHandle) -> Option<ObjectKind> {
        self.objects.get(&handle.as_raw()).map(|object| object.kind)
    }

    fn object(&self, handle: RawHandle) -> Result<&MemObject, EngineError> {
        self.objects
            .get(&handle.as_raw())
            .ok_or_else(|| EngineError::new(format!("no object behind token {handle}")))
    }

    fn object_mut(&mut self, handle: RawHandle) -> Result<&mut MemObject, EngineError> {
        self.objects
            .get_mut(&handle.as_raw())
            .ok_or_else(|| EngineError::new(format!("no object behind token {handle}")))
    }

    fn retain(&mut self, handle: RawHandle) {
        if let Some(object) = self.objects.get_mut(&handle.as_raw()) {
            object.refs += 1;
        }
    }

    /// Releases one reference; frees the object and its field references at zero.
    fn release(&mut self, handle: RawHandle) {
        let Some(object) = self.objects.get_mut(&handle.as_raw()) else {
            return;
        };
        if object.refs > 1 {
            object.refs -= 1;
            return;
        }
        let object = self.objects.remove(&handle.as_raw()).expect("object vanished during release");
        for value in object.fields.into_values() {
            self.release(value);
        }
    }
}

impl Engine for MemEngine {
    fn create(&mut self, kind: ObjectKind) -> Result<RawHandle, EngineError> {
        self.next_token += 1;
        let token = RawHandle::new(self.next_token);
        self.objects.insert(token.as_raw(), MemObject::new(kind));
        Ok(token)
    }

    fn get_field(&mut self, handle: RawHandle, field: i32) -> Result<RawHandle, EngineError> {
        let value = self
            .object(handle)?
            .fields
            .get(&field)
            .copied()
            .ok_or_else(|| EngineError::new(format!("field {field} is unset on {handle}")))?;
        // The caller receives its own ownership reference.
        self.retain(value);
        Ok(value)
    }

    fn set_field(&mut self, handle: RawHandle, field: i32, value: RawHandle) -> Result<(), EngineError> {
        self.object(value)?;
        let previous = {
            let object = self.object_mut(handle)?;
            object.fields.insert(field, value)
        };
        // The field now holds an engine-side reference to the value.
        self.retain(value);
        if let Some(previous) = previous {
            self.release(previous);
        }
        Ok(())
    }

    fn get_scalar(&mut self, handle: RawHandle, field: i32) -> Result<Scalar, EngineError> {
        self.object(handle)?
            .scalars
            .get(&field)
            .copied()
            .ok_or_else(|| EngineError::new(format!("scalar field {field} is unset on {handle}")))
    }

    fn set_scalar(&mut self, handle: RawHandle, field: i32, value: Scalar) -> Result<(), EngineError> {
        self.object_mut(handle)?.scalars.insert(field, value);
        Ok(())
    }

    fn destroy(&mut self, handle: RawHandle) {
        self.release(handle);
    }
}
