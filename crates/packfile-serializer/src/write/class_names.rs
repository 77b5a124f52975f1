//! Class-name section builder.

use indexmap::IndexMap;
use packfile_format::class_name::write_class_name;
use packfile_format::{BUILTIN_CLASSES, ByteWriter, Layout};

use crate::error::{Result, SerializeError};

/// Interns runtime type names into the class-name section.
///
/// The four reflection classes are written up front and are not part of the
/// cache, so an object of one of those types still gets its own entry.
#[derive(Debug)]
pub(crate) struct ClassNameTable {
    bytes: ByteWriter,
    cache: IndexMap<&'static str, u32>,
}

impl ClassNameTable {
    pub fn new(layout: &Layout) -> Self {
        let mut bytes = ByteWriter::new(layout);
        for (name, signature) in BUILTIN_CLASSES {
            write_class_name(&mut bytes, name, signature);
        }
        Self {
            bytes,
            cache: IndexMap::new(),
        }
    }

    /// Offset of `name` in the section, writing its entry on first use.
    pub fn intern(&mut self, name: &'static str, signature: u32) -> Result<u32> {
        if let Some(&offset) = self.cache.get(name) {
            return Ok(offset);
        }
        let offset = write_class_name(&mut self.bytes, name, signature);
        let offset = u32::try_from(offset).map_err(|_| SerializeError::OffsetOverflow(offset))?;
        self.cache.insert(name, offset);
        Ok(offset)
    }

    /// Interned names in first-use order.
    pub fn names(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.cache.iter().map(|(&name, &offset)| (name, offset))
    }

    /// Section payload, padded to 16 with `0xFF`.
    pub fn emit(mut self) -> Vec<u8> {
        self.bytes.pad_with(16, 0xFF);
        self.bytes.into_inner()
    }
}
