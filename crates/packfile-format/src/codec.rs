//! Endian-aware primitive codec.
//!
//! [`ByteWriter`] is a growable buffer with a cursor at its end; [`ByteReader`]
//! is a seekable cursor over a borrowed slice. Both carry the container's byte
//! order and pointer width so callers never branch on layout themselves.

use packfile_core::{
    Matrix3, Matrix4, QsTransform, Quaternion, Transform, Vector2, Vector3, Vector4,
};

use crate::error::{FormatError, Result};
use crate::layout::{Endianness, Layout, PointerWidth};

/// Bit 31 of an array's capacity word: the array does not own its storage.
pub const ARRAY_DONT_DEALLOCATE: u32 = 0x8000_0000;

/// Growable output buffer.
#[derive(Clone, Debug)]
pub struct ByteWriter {
    buf: Vec<u8>,
    endianness: Endianness,
    pointer_width: PointerWidth,
}

macro_rules! write_scalar {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self, value: $ty) {
                match self.endianness {
                    Endianness::Big => self.buf.extend_from_slice(&value.to_be_bytes()),
                    Endianness::Little => self.buf.extend_from_slice(&value.to_le_bytes()),
                }
            }
        )*
    };
}

impl ByteWriter {
    pub fn new(layout: &Layout) -> Self {
        Self::with_order(layout.endianness, layout.pointer_width)
    }

    pub fn with_order(endianness: Endianness, pointer_width: PointerWidth) -> Self {
        Self {
            buf: Vec::new(),
            endianness,
            pointer_width,
        }
    }

    /// Current write cursor (always the end of the buffer).
    #[inline]
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub fn pointer_width(&self) -> PointerWidth {
        self.pointer_width
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.buf
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    #[inline]
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn write_i8(&mut self, value: i8) {
        self.buf.push(value as u8);
    }

    #[inline]
    pub fn write_bool(&mut self, value: bool) {
        self.buf.push(value as u8);
    }

    write_scalar! {
        write_u16: u16,
        write_i16: i16,
        write_u32: u32,
        write_i32: i32,
        write_u64: u64,
        write_i64: i64,
        write_f32: f32,
    }

    /// Write a pointer-width unsigned integer.
    pub fn write_usize(&mut self, value: u64) -> Result<()> {
        match self.pointer_width {
            PointerWidth::Four => {
                let narrow = u32::try_from(value).map_err(|_| FormatError::PointerWidthMismatch {
                    value,
                    width: PointerWidth::Four.into(),
                })?;
                self.write_u32(narrow);
            }
            PointerWidth::Eight => self.write_u64(value),
        }
        Ok(())
    }

    /// Write a pointer-width zero. Placeholders for pointers patched by fixups.
    pub fn write_null_pointer(&mut self) {
        self.buf.resize(self.buf.len() + self.pointer_width.bytes(), 0);
    }

    /// Array header with a null data pointer: `pointer, count, count | flag`.
    pub fn write_array_header(&mut self, count: u32) {
        self.write_null_pointer();
        self.write_u32(count);
        self.write_u32(count | ARRAY_DONT_DEALLOCATE);
    }

    /// Write `text` followed by a NUL terminator.
    pub fn write_cstr(&mut self, text: &str) {
        self.buf.extend_from_slice(text.as_bytes());
        self.buf.push(0);
    }

    /// Zero-fill up to the next multiple of `align`.
    pub fn pad(&mut self, align: usize) {
        self.pad_with(align, 0);
    }

    /// Fill with `byte` up to the next multiple of `align`.
    pub fn pad_with(&mut self, align: usize, byte: u8) {
        let target = align_up(self.buf.len(), align);
        self.buf.resize(target, byte);
    }

    pub fn write_vector2(&mut self, v: Vector2) {
        v.to_array().into_iter().for_each(|f| self.write_f32(f));
    }

    pub fn write_vector3(&mut self, v: Vector3) {
        v.to_array().into_iter().for_each(|f| self.write_f32(f));
    }

    pub fn write_vector4(&mut self, v: Vector4) {
        v.to_array().into_iter().for_each(|f| self.write_f32(f));
    }

    pub fn write_quaternion(&mut self, q: Quaternion) {
        q.to_array().into_iter().for_each(|f| self.write_f32(f));
    }

    pub fn write_matrix3(&mut self, m: Matrix3) {
        m.cols.into_iter().for_each(|c| self.write_vector4(c));
    }

    pub fn write_matrix4(&mut self, m: Matrix4) {
        m.cols.into_iter().for_each(|c| self.write_vector4(c));
    }

    pub fn write_transform(&mut self, t: Transform) {
        self.write_matrix3(t.rotation);
        self.write_vector4(t.translation);
    }

    pub fn write_qs_transform(&mut self, t: QsTransform) {
        self.write_vector4(t.translation);
        self.write_quaternion(t.rotation);
        self.write_vector4(t.scale);
    }

    /// Write any [`Primitive`].
    #[inline]
    pub fn write<P: Primitive>(&mut self, value: P) {
        value.encode(self);
    }
}

/// Seekable cursor over borrowed bytes.
#[derive(Clone, Debug)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    endianness: Endianness,
    pointer_width: PointerWidth,
}

macro_rules! read_scalar {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            #[inline]
            pub fn $name(&mut self) -> Result<$ty> {
                let raw = self.read_array()?;
                Ok(match self.endianness {
                    Endianness::Big => <$ty>::from_be_bytes(raw),
                    Endianness::Little => <$ty>::from_le_bytes(raw),
                })
            }
        )*
    };
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8], layout: &Layout) -> Self {
        Self::with_order(bytes, layout.endianness, layout.pointer_width)
    }

    pub fn with_order(bytes: &'a [u8], endianness: Endianness, pointer_width: PointerWidth) -> Self {
        Self {
            bytes,
            pos: 0,
            endianness,
            pointer_width,
        }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor. Seeking past the end is allowed; the next read fails.
    #[inline]
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub fn pointer_width(&self) -> PointerWidth {
        self.pointer_width
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(FormatError::UnexpectedEof {
                offset: self.pos,
                needed: len,
                len: self.bytes.len(),
            })?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Advance to the next multiple of `align` (relative to the slice start).
    pub fn align(&mut self, align: usize) {
        self.pos = align_up(self.pos, align);
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut raw = [0u8; N];
        raw.copy_from_slice(self.read_bytes(N)?);
        Ok(raw)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_bytes(1)?[0])
    }

    #[inline]
    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_u8()? != 0)
    }

    read_scalar! {
        read_u16: u16,
        read_i16: i16,
        read_u32: u32,
        read_i32: i32,
        read_u64: u64,
        read_i64: i64,
        read_f32: f32,
    }

    /// Read a pointer-width unsigned integer.
    pub fn read_usize(&mut self) -> Result<u64> {
        match self.pointer_width {
            PointerWidth::Four => self.read_u32().map(u64::from),
            PointerWidth::Eight => self.read_u64(),
        }
    }

    /// Read an array header, returning the element count.
    pub fn read_array_header(&mut self) -> Result<u32> {
        self.skip(self.pointer_width.bytes())?;
        let count = self.read_u32()?;
        self.skip(4)?;
        Ok(count)
    }

    /// Read a NUL-terminated string, consuming the terminator.
    pub fn read_cstr(&mut self) -> Result<String> {
        let rest = &self.bytes[self.pos.min(self.bytes.len())..];
        let len = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or(FormatError::UnexpectedEof {
                offset: self.pos,
                needed: rest.len() + 1,
                len: self.bytes.len(),
            })?;
        let text = String::from_utf8_lossy(&rest[..len]).into_owned();
        self.pos += len + 1;
        Ok(text)
    }

    pub fn read_vector2(&mut self) -> Result<Vector2> {
        Ok(Vector2::from_array([self.read_f32()?, self.read_f32()?]))
    }

    pub fn read_vector3(&mut self) -> Result<Vector3> {
        Ok(Vector3::from_array([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ]))
    }

    pub fn read_vector4(&mut self) -> Result<Vector4> {
        Ok(Vector4::from_array(self.read_lane()?))
    }

    pub fn read_quaternion(&mut self) -> Result<Quaternion> {
        Ok(Quaternion::from_array(self.read_lane()?))
    }

    fn read_lane(&mut self) -> Result<[f32; 4]> {
        Ok([
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ])
    }

    pub fn read_matrix3(&mut self) -> Result<Matrix3> {
        Ok(Matrix3 {
            cols: [self.read_vector4()?, self.read_vector4()?, self.read_vector4()?],
        })
    }

    pub fn read_matrix4(&mut self) -> Result<Matrix4> {
        Ok(Matrix4 {
            cols: [
                self.read_vector4()?,
                self.read_vector4()?,
                self.read_vector4()?,
                self.read_vector4()?,
            ],
        })
    }

    pub fn read_transform(&mut self) -> Result<Transform> {
        Ok(Transform {
            rotation: self.read_matrix3()?,
            translation: self.read_vector4()?,
        })
    }

    pub fn read_qs_transform(&mut self) -> Result<QsTransform> {
        Ok(QsTransform {
            translation: self.read_vector4()?,
            rotation: self.read_quaternion()?,
            scale: self.read_vector4()?,
        })
    }

    /// Read any [`Primitive`].
    #[inline]
    pub fn read<P: Primitive>(&mut self) -> Result<P> {
        P::decode(self)
    }
}

/// A fixed-size value with no pointers, encodable in place.
///
/// Arrays of primitives are the only array payloads that need no fixups of
/// their own.
pub trait Primitive: Copy + 'static {
    fn encode(self, w: &mut ByteWriter);
    fn decode(r: &mut ByteReader<'_>) -> Result<Self>;
}

macro_rules! primitive {
    ($($ty:ty => $write:ident, $read:ident;)*) => {
        $(
            impl Primitive for $ty {
                #[inline]
                fn encode(self, w: &mut ByteWriter) {
                    w.$write(self)
                }

                #[inline]
                fn decode(r: &mut ByteReader<'_>) -> Result<Self> {
                    r.$read()
                }
            }
        )*
    };
}

primitive! {
    u8 => write_u8, read_u8;
    i8 => write_i8, read_i8;
    bool => write_bool, read_bool;
    u16 => write_u16, read_u16;
    i16 => write_i16, read_i16;
    u32 => write_u32, read_u32;
    i32 => write_i32, read_i32;
    u64 => write_u64, read_u64;
    i64 => write_i64, read_i64;
    f32 => write_f32, read_f32;
    Vector2 => write_vector2, read_vector2;
    Vector3 => write_vector3, read_vector3;
    Vector4 => write_vector4, read_vector4;
    Quaternion => write_quaternion, read_quaternion;
    Matrix3 => write_matrix3, read_matrix3;
    Matrix4 => write_matrix4, read_matrix4;
    Transform => write_transform, read_transform;
    QsTransform => write_qs_transform, read_qs_transform;
}

/// Round up to the next multiple of `align`.
#[inline]
pub fn align_up(value: usize, align: usize) -> usize {
    if align <= 1 {
        return value;
    }
    value.div_ceil(align) * align
}
