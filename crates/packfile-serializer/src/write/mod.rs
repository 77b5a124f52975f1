//! Graph-to-container serialization.
//!
//! - [`Serializer`]: runs the object scheduler and assembles the container
//! - [`WriteContext`]: per-run state and the field helpers encoders call

mod assemble;
mod class_names;
mod context;
mod fixups;
mod identity;
mod local;
mod queue;
mod serializer;

#[cfg(test)]
mod serializer_tests;

pub use context::WriteContext;
pub use serializer::Serializer;

use packfile_core::Handle;
use packfile_format::Layout;

use crate::class::ClassRegistry;
use crate::error::Result;
use crate::graph::ObjectGraph;

/// Serialize with default header options.
pub fn serialize(
    graph: &ObjectGraph,
    registry: &ClassRegistry,
    root: Handle,
    layout: Layout,
) -> Result<Vec<u8>> {
    Serializer::new(layout).serialize(graph, registry, root)
}
