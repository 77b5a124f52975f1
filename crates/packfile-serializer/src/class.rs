//! Per-type encoder contract and the class registry.
//!
//! Object types are an open set: the serializer never names a concrete type.
//! Each type implements [`Encodable`] (object-safe, used while writing) and
//! [`Class`] (static name, signature and decoder). A [`ClassRegistry`] lists
//! the classes a run may encounter.

use std::any::Any;

use indexmap::IndexMap;

use crate::error::{DecodeError, Result};
use crate::read::ReadContext;
use crate::write::WriteContext;

/// An object that can be written into the data section.
pub trait Encodable: Any {
    /// Runtime type name recorded in the class-name section.
    fn class_name(&self) -> &'static str;

    /// Stable layout identifier recorded next to the class name.
    fn signature(&self) -> u32;

    /// Emit the fixed layout in declaration order, delegating pointer, array
    /// and string fields to `ctx`.
    fn write<'g>(&'g self, ctx: &mut WriteContext<'g>) -> Result<()>;
}

/// Static class metadata and the decoding half of the contract.
pub trait Class: Encodable + Sized {
    const NAME: &'static str;
    const SIGNATURE: u32;

    /// Read the fields `write` emitted, starting at the context cursor.
    fn read(ctx: &mut ReadContext<'_>) -> std::result::Result<Self, DecodeError>;
}

pub(crate) type DecodeFn =
    fn(&mut ReadContext<'_>) -> std::result::Result<Box<dyn Encodable>, DecodeError>;

fn decode_boxed<T: Class>(
    ctx: &mut ReadContext<'_>,
) -> std::result::Result<Box<dyn Encodable>, DecodeError> {
    Ok(Box::new(T::read(ctx)?))
}

/// A registered class.
#[derive(Clone, Copy)]
pub struct ClassInfo {
    pub name: &'static str,
    pub signature: u32,
    pub(crate) decode: DecodeFn,
}

impl std::fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("signature", &format_args!("{:#010x}", self.signature))
            .finish()
    }
}

/// Classes known to a serialization or deserialization run, in registration
/// order.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: IndexMap<&'static str, ClassInfo>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`. Registering a name twice keeps the latest entry.
    pub fn register<T: Class>(&mut self) -> &mut Self {
        self.classes.insert(
            T::NAME,
            ClassInfo {
                name: T::NAME,
                signature: T::SIGNATURE,
                decode: decode_boxed::<T>,
            },
        );
        self
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<T: Class>(mut self) -> Self {
        self.register::<T>();
        self
    }

    pub fn get(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassInfo> {
        self.classes.values()
    }
}

/// CRC-32 over a class name and its `(member, type)` descriptors.
///
/// For classes without an engine-assigned signature. Any change to the name,
/// member order, member names or member types changes the result.
pub fn shape_signature(name: &str, members: &[(&str, &str)]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(name.as_bytes());
    for (member, ty) in members {
        hasher.update(&[0]);
        hasher.update(member.as_bytes());
        hasher.update(b":");
        hasher.update(ty.as_bytes());
    }
    hasher.finalize()
}
