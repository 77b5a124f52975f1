//! Object graph storage.

use std::any::Any;
use std::fmt;

use packfile_core::{Arena, Handle};

use crate::class::Encodable;

/// Owns every object of a graph. Pointer fields hold [`Handle`]s into it.
#[derive(Default)]
pub struct ObjectGraph {
    arena: Arena<dyn Encodable>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object, returning its identity.
    pub fn add<T: Encodable>(&mut self, value: T) -> Handle {
        self.arena.insert_boxed(Box::new(value))
    }

    pub fn get(&self, handle: Handle) -> Option<&dyn Encodable> {
        self.arena.get(handle)
    }

    /// Typed access. `None` if the handle is unknown or names another type.
    pub fn downcast<T: Encodable>(&self, handle: Handle) -> Option<&T> {
        let object: &dyn Any = self.arena.get(handle)?;
        object.downcast_ref()
    }

    pub fn contains(&self, handle: Handle) -> bool {
        self.arena.contains(handle)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Handle, &dyn Encodable)> {
        self.arena.iter()
    }

    pub(crate) fn reserve(&mut self) -> Handle {
        self.arena.reserve()
    }

    pub(crate) fn fill(&mut self, handle: Handle, value: Box<dyn Encodable>) {
        self.arena.fill(handle, value);
    }
}

impl fmt::Debug for ObjectGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(h, obj)| (h, obj.class_name())))
            .finish()
    }
}
