//! Handle-indexed object storage.
//!
//! Identity in a packfile is reference identity: two value-equal objects are
//! still two objects. The arena gives every object a stable integer [`Handle`]
//! so identity tables can key on handles instead of addresses.

use std::fmt;

/// A lightweight handle to an object stored in an [`Arena`].
///
/// Handles are ordered by insertion order. Comparing two handles is O(1).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Handle(u32);

impl Handle {
    /// Raw index for serialization/debugging.
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    /// Create a handle from a raw index. Use only for deserialization and tests.
    #[inline]
    pub fn from_raw(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Append-only object storage addressed by [`Handle`].
///
/// Slots can be reserved before their value exists. Deserializing a cyclic
/// graph needs this: a pointer to an object that is still being read must
/// already have a handle.
pub struct Arena<T: ?Sized> {
    slots: Vec<Option<Box<T>>>,
}

impl<T: ?Sized> Default for Arena<T> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

impl<T: ?Sized> Arena<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a boxed value, returning its handle.
    pub fn insert_boxed(&mut self, value: Box<T>) -> Handle {
        let handle = self.next_handle();
        self.slots.push(Some(value));
        handle
    }

    /// Reserve an empty slot to be filled later with [`fill`](Self::fill).
    pub fn reserve(&mut self) -> Handle {
        let handle = self.next_handle();
        self.slots.push(None);
        handle
    }

    /// Fill a slot previously returned by [`reserve`](Self::reserve).
    ///
    /// # Panics
    /// Panics if the handle was not reserved by this arena or is already filled.
    pub fn fill(&mut self, handle: Handle, value: Box<T>) {
        let slot = self.ensure_vacant(handle);
        *slot = Some(value);
    }

    /// Look up an object. Returns `None` for unknown handles and unfilled slots.
    #[inline]
    pub fn get(&self, handle: Handle) -> Option<&T> {
        self.slots.get(handle.index())?.as_deref()
    }

    /// Whether `handle` names a filled slot.
    #[inline]
    pub fn contains(&self, handle: Handle) -> bool {
        self.get(handle).is_some()
    }

    /// Number of slots, including reserved ones.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether every reserved slot has been filled.
    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    /// Iterate over filled slots in handle order.
    pub fn iter(&self) -> impl Iterator<Item = (Handle, &T)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_deref().map(|v| (Handle(i as u32), v)))
    }

    fn next_handle(&self) -> Handle {
        let index = u32::try_from(self.slots.len()).expect("arena exceeds u32::MAX slots");
        Handle(index)
    }

    pub(crate) fn slot_mut(&mut self, handle: Handle) -> Option<&mut Option<Box<T>>> {
        self.slots.get_mut(handle.index())
    }
}

impl<T: ?Sized> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("len", &self.slots.len())
            .field("complete", &self.is_complete())
            .finish()
    }
}
