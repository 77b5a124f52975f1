//! Serialization driver.

use packfile_core::Handle;
use packfile_format::{HeaderOptions, Layout};
use tracing::debug;

use super::assemble::assemble;
use super::context::WriteContext;
use crate::class::ClassRegistry;
use crate::error::{Result, SerializeError};
use crate::graph::ObjectGraph;

/// Container configuration for serialization runs.
#[derive(Clone, Debug, Default)]
pub struct Serializer {
    layout: Layout,
    options: HeaderOptions,
}

impl Serializer {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            options: HeaderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: HeaderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn options(&self) -> &HeaderOptions {
        &self.options
    }

    /// Serialize everything reachable from `root` into a complete container.
    ///
    /// Each reachable object is written exactly once, cycles included. Any
    /// error aborts the run; no partial output is produced.
    pub fn serialize(
        &self,
        graph: &ObjectGraph,
        registry: &ClassRegistry,
        root: Handle,
    ) -> Result<Vec<u8>> {
        if !graph.contains(root) {
            return Err(SerializeError::DanglingHandle(root));
        }

        let mut ctx = WriteContext::new(graph, registry, self.layout);
        ctx.objects.enqueue(0, root);
        while let Some((depth, handle)) = ctx.objects.pop() {
            if ctx.identity.is_resolved(handle) {
                continue;
            }
            ctx.write_object(depth, handle)?;
        }
        debug_assert_eq!(ctx.identity.pending_len(), 0);

        let fixups = ctx.fixups.sorted();
        debug!(
            objects = ctx.identity.resolved_len(),
            classes = ctx.class_names.names().count(),
            data = ctx.data.len(),
            local = fixups.local.len(),
            global = fixups.global.len(),
            "serialized graph"
        );
        let class_names = ctx.class_names.emit();
        assemble(
            &self.layout,
            &self.options,
            &class_names,
            ctx.data.as_slice(),
            &fixups,
        )
    }
}
