#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Object graph to packfile serialization.
//!
//! Objects live in an [`ObjectGraph`] and refer to each other by
//! [`Handle`](packfile_core::Handle). [`Serializer`] walks everything reachable
//! from a root, writing each object once and recording the local, global and
//! virtual fixups a loader needs to relocate the data section.
//! [`deserialize`] reverses the process.
//!
//! Object types plug in through [`Encodable`] and [`Class`] and are listed in
//! a [`ClassRegistry`].

pub mod class;
mod error;
mod graph;
mod invariants;
pub mod read;
pub mod write;

#[cfg(test)]
mod test_classes;

pub use class::{Class, ClassInfo, ClassRegistry, Encodable, shape_signature};
pub use error::{DecodeError, Result, SerializeError};
pub use graph::ObjectGraph;
pub use read::{ReadContext, deserialize};
pub use write::{Serializer, WriteContext, serialize};
