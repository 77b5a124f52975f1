//! Per-run serialization state and the field helpers encoders call.

use packfile_core::{
    Handle, Matrix3, Matrix4, QsTransform, Quaternion, Transform, Vector2, Vector3, Vector4,
};
use packfile_format::{ByteWriter, Layout, PaddingPolicy, Primitive};
use tracing::trace;

use super::class_names::ClassNameTable;
use super::fixups::FixupTables;
use super::identity::{IdentityTable, Reference};
use super::local::{
    ArrayPayload, LocalWrite, PAYLOAD_ALIGN, STRING_ELEMENT_ALIGN, STRING_FIELD_ALIGN,
};
use super::queue::WorkStack;
use crate::class::{ClassRegistry, Encodable};
use crate::error::{Result, SerializeError};
use crate::graph::ObjectGraph;

/// Everything one serialization run owns.
///
/// Encoders receive it in [`Encodable::write`] and emit their fields through
/// it in declaration order. Scalars are written in place; pointers, arrays and
/// strings record fixups and schedule further work.
pub struct WriteContext<'g> {
    graph: &'g ObjectGraph,
    registry: &'g ClassRegistry,
    layout: Layout,
    pub(super) data: ByteWriter,
    pub(super) identity: IdentityTable,
    pub(super) fixups: FixupTables,
    pub(super) class_names: ClassNameTable,
    pub(super) objects: WorkStack<Handle>,
    locals: WorkStack<LocalWrite<'g>>,
    object_depth: usize,
    local_depth: usize,
}

macro_rules! forward {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) {
                self.data.$name(value);
            }
        )*
    };
}

impl<'g> WriteContext<'g> {
    pub(super) fn new(
        graph: &'g ObjectGraph,
        registry: &'g ClassRegistry,
        layout: Layout,
    ) -> Self {
        Self {
            graph,
            registry,
            layout,
            data: ByteWriter::new(&layout),
            identity: IdentityTable::default(),
            fixups: FixupTables::default(),
            class_names: ClassNameTable::new(&layout),
            objects: WorkStack::new(),
            locals: WorkStack::new(),
            object_depth: 0,
            local_depth: 0,
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Current offset in the data section.
    pub fn position(&self) -> usize {
        self.data.position()
    }

    forward! {
        write_u8: u8,
        write_i8: i8,
        write_bool: bool,
        write_u16: u16,
        write_i16: i16,
        write_u32: u32,
        write_i32: i32,
        write_u64: u64,
        write_i64: i64,
        write_f32: f32,
        write_vector2: Vector2,
        write_vector3: Vector3,
        write_vector4: Vector4,
        write_quaternion: Quaternion,
        write_matrix3: Matrix3,
        write_matrix4: Matrix4,
        write_transform: Transform,
        write_qs_transform: QsTransform,
    }

    /// Raw bytes, for reserved or padding fields.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.write_bytes(bytes);
    }

    /// Zero-fill to the next multiple of `align`.
    pub fn pad(&mut self, align: usize) {
        self.data.pad(align);
    }

    /// Pointer-width integer. Fails if `value` does not fit 4-byte pointers.
    pub fn write_usize(&mut self, value: u64) -> Result<()> {
        Ok(self.data.write_usize(value)?)
    }

    /// Untyped pointer field; always written as null.
    pub fn write_void_pointer(&mut self) {
        self.pad_pointer();
        self.data.write_null_pointer();
    }

    /// Array field of an unserializable element type; always written empty.
    pub fn write_void_array(&mut self) {
        self.pad_pointer();
        self.data.write_array_header(0);
    }

    /// Pointer to another object of the graph.
    ///
    /// A target already written gets its global fixup now. Otherwise the slot
    /// waits for the target, which is scheduled one level below the current
    /// object on first reference.
    pub fn write_class_pointer(&mut self, target: Option<Handle>) -> Result<()> {
        self.pad_pointer();
        let src = self.here()?;
        self.data.write_null_pointer();

        let Some(target) = target else {
            return Ok(());
        };
        if !self.graph.contains(target) {
            return Err(SerializeError::DanglingHandle(target));
        }
        if let Some(dst) = self.identity.offset(target) {
            self.fixups.add_global(src, dst);
            return Ok(());
        }
        if self.identity.add_pending(target, src) == Reference::Discovered {
            trace!(%target, depth = self.object_depth + 1, "schedule object");
            self.objects.enqueue(self.object_depth + 1, target);
        }
        Ok(())
    }

    pub fn write_class_pointer_array(&mut self, items: &[Option<Handle>]) -> Result<()> {
        self.defer_array(items.len(), ArrayPayload::Pointers(items.to_vec()), false)
    }

    /// Array of objects stored by value. Elements write their fields through
    /// this context but get no identity and no virtual fixup.
    pub fn write_class_array<T: Encodable>(&mut self, items: &'g [T]) -> Result<()> {
        let elements = items.iter().map(|e| e as &dyn Encodable).collect();
        self.defer_array(items.len(), ArrayPayload::Inline(elements), true)
    }

    /// String field. `None` is a null pointer; `Some("")` still gets a payload.
    pub fn write_string(&mut self, text: Option<&'g str>) -> Result<()> {
        self.write_string_aligned(text, STRING_FIELD_ALIGN)
    }

    pub fn write_string_array<S: AsRef<str>>(&mut self, items: &'g [Option<S>]) -> Result<()> {
        let strings: Vec<Option<&'g str>> = items
            .iter()
            .map(|s| s.as_ref().map(|text| text.as_ref()))
            .collect();
        self.defer_array(items.len(), ArrayPayload::Strings(strings), false)
    }

    /// Array of fixed-size values. Elements are encoded immediately.
    pub fn write_primitive_array<P: Primitive>(&mut self, items: &[P]) -> Result<()> {
        let mut raw = ByteWriter::with_order(self.data.endianness(), self.data.pointer_width());
        for &item in items {
            raw.write(item);
        }
        self.defer_array(items.len(), ArrayPayload::Raw(raw.into_inner()), false)
    }

    fn pad_pointer(&mut self) {
        if self.layout.padding_policy == PaddingPolicy::PadToPointerWidth {
            self.data.pad(self.layout.pointer_size());
        }
    }

    fn here(&self) -> Result<u32> {
        let pos = self.data.position();
        u32::try_from(pos).map_err(|_| SerializeError::OffsetOverflow(pos))
    }

    fn defer_array(
        &mut self,
        len: usize,
        payload: ArrayPayload<'g>,
        trailing_pad: bool,
    ) -> Result<()> {
        let count = u32::try_from(len).map_err(|_| SerializeError::OffsetOverflow(len))?;
        self.pad_pointer();
        let src = self.here()?;
        self.data.write_array_header(count);
        if count == 0 {
            return Ok(());
        }

        let slot = self.fixups.add_local(src);
        self.locals.enqueue(self.local_depth, LocalWrite::Array { slot, payload });
        if trailing_pad {
            self.locals.enqueue(self.local_depth, LocalWrite::Pad);
        }
        Ok(())
    }

    fn write_string_aligned(&mut self, text: Option<&'g str>, align: usize) -> Result<()> {
        self.pad_pointer();
        let src = self.here()?;
        self.data.write_null_pointer();

        let Some(text) = text else {
            return Ok(());
        };
        let slot = self.fixups.add_local(src);
        self.locals.enqueue(self.local_depth, LocalWrite::String { slot, text, align });
        Ok(())
    }

    /// Write one scheduled object and every payload it queued.
    pub(super) fn write_object(&mut self, depth: usize, handle: Handle) -> Result<()> {
        let graph = self.graph;
        let object = graph
            .get(handle)
            .ok_or(SerializeError::DanglingHandle(handle))?;
        let name = object.class_name();
        if !self.registry.contains(name) {
            return Err(SerializeError::UnregisteredClass(name));
        }

        let offset = self.here()?;
        let class_name = self.class_names.intern(name, object.signature())?;
        self.fixups.add_virtual(offset, class_name);
        for src in self.identity.resolve(handle, offset) {
            self.fixups.add_global(src, offset);
        }
        trace!(%handle, class = name, offset, depth, "write object");

        self.object_depth = depth;
        self.local_depth = 0;
        object.write(self)?;
        self.data.pad(PAYLOAD_ALIGN);
        self.drain_locals()?;
        self.data.pad(PAYLOAD_ALIGN);
        Ok(())
    }

    fn drain_locals(&mut self) -> Result<()> {
        loop {
            for _ in 0..self.locals.trim() {
                self.data.pad(PAYLOAD_ALIGN);
            }
            let Some((depth, write)) = self.locals.dequeue() else {
                return Ok(());
            };
            self.run_local(depth, write)?;
        }
    }

    fn run_local(&mut self, depth: usize, write: LocalWrite<'g>) -> Result<()> {
        match write {
            LocalWrite::Array { slot, payload } => {
                self.data.pad(PAYLOAD_ALIGN);
                let dst = self.here()?;
                self.fixups.set_local_dst(slot, dst);
                trace!(dst, depth, kind = payload.kind(), "array payload");

                self.local_depth = depth + 1;
                match payload {
                    ArrayPayload::Raw(bytes) => self.data.write_bytes(&bytes),
                    ArrayPayload::Pointers(targets) => {
                        for target in targets {
                            self.write_class_pointer(target)?;
                        }
                    }
                    ArrayPayload::Strings(strings) => {
                        for text in strings {
                            self.write_string_aligned(text, STRING_ELEMENT_ALIGN)?;
                        }
                    }
                    ArrayPayload::Inline(elements) => {
                        for element in elements {
                            element.write(self)?;
                        }
                    }
                }
                self.local_depth = depth;
            }
            LocalWrite::String { slot, text, align } => {
                let dst = self.here()?;
                self.fixups.set_local_dst(slot, dst);
                self.data.write_cstr(text);
                self.data.pad(align);
            }
            LocalWrite::Pad => self.data.pad(PAYLOAD_ALIGN),
        }
        Ok(())
    }
}
