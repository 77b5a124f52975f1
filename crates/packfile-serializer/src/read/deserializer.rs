//! Deserialization driver.

use std::collections::HashMap;

use packfile_core::Handle;
use packfile_format::{DATA_SECTION, PackFile};
use tracing::{debug, trace};

use super::context::ReadContext;
use crate::class::ClassRegistry;
use crate::error::DecodeError;
use crate::graph::ObjectGraph;

/// Rebuild the object graph stored in `file`, returning it with the root.
///
/// The root is the object at the header's contents offset. Every object's
/// class comes from its virtual fixup and must be registered with a matching
/// signature.
pub fn deserialize(
    file: &PackFile,
    registry: &ClassRegistry,
) -> Result<(ObjectGraph, Handle), DecodeError> {
    let header = file.header();
    if header.contents_section_index != DATA_SECTION {
        return Err(DecodeError::ForeignContentsSection(
            header.contents_section_index,
        ));
    }
    let data = file.data()?;
    let class_names: HashMap<u32, _> = file
        .class_names()?
        .into_iter()
        .map(|entry| (entry.offset, entry))
        .collect();
    let types: HashMap<u32, u32> = data
        .virtual_fixups()
        .iter()
        .map(|f| (f.src, f.dst))
        .collect();

    let mut ctx = ReadContext::new(&data, *file.layout());
    let root = ctx.handle_for(header.contents_section_offset);

    while let Some((handle, offset)) = ctx.queue.pop_front() {
        let &name_offset = types
            .get(&offset)
            .ok_or(DecodeError::MissingVirtualFixup(offset))?;
        let entry = class_names
            .get(&name_offset)
            .ok_or(DecodeError::MissingClassName(name_offset))?;
        let info = registry
            .get(&entry.name)
            .ok_or_else(|| DecodeError::UnknownClass(entry.name.clone()))?;
        if info.signature != entry.signature {
            return Err(DecodeError::SignatureMismatch {
                name: entry.name.clone(),
                expected: info.signature,
                found: entry.signature,
            });
        }

        trace!(%handle, class = info.name, offset, "read object");
        ctx.seek(offset)?;
        let object = (info.decode)(&mut ctx)?;
        ctx.graph.fill(handle, object);
    }

    debug!(objects = ctx.graph.len(), "deserialized graph");
    Ok((ctx.graph, root))
}
