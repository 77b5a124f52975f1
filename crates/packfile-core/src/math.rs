//! Fixed-layout math value types.
//!
//! These mirror the engine's SIMD-friendly storage: every vector-like value
//! occupies whole 4-float lanes except [`Vector2`] and [`Vector3`], which the
//! engine packs tightly.

/// Two packed floats.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn to_array(self) -> [f32; 2] {
        [self.x, self.y]
    }

    pub fn from_array([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

/// Three packed floats.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn from_array([x, y, z]: [f32; 3]) -> Self {
        Self { x, y, z }
    }
}

/// One 16-byte lane.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn from_array([x, y, z, w]: [f32; 4]) -> Self {
        Self { x, y, z, w }
    }
}

/// Rotation quaternion, stored `x, y, z, w`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }

    pub fn from_array([x, y, z, w]: [f32; 4]) -> Self {
        Self { x, y, z, w }
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 3x3 matrix stored as three padded column lanes (48 bytes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix3 {
    pub cols: [Vector4; 3],
}

impl Matrix3 {
    pub const IDENTITY: Self = Self {
        cols: [
            Vector4::new(1.0, 0.0, 0.0, 0.0),
            Vector4::new(0.0, 1.0, 0.0, 0.0),
            Vector4::new(0.0, 0.0, 1.0, 0.0),
        ],
    };
}

impl Default for Matrix3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 4x4 matrix stored as four column lanes (64 bytes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Matrix4 {
    pub cols: [Vector4; 4],
}

impl Matrix4 {
    pub const IDENTITY: Self = Self {
        cols: [
            Vector4::new(1.0, 0.0, 0.0, 0.0),
            Vector4::new(0.0, 1.0, 0.0, 0.0),
            Vector4::new(0.0, 0.0, 1.0, 0.0),
            Vector4::new(0.0, 0.0, 0.0, 1.0),
        ],
    };
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Rigid transform: rotation columns followed by a translation lane (64 bytes).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform {
    pub rotation: Matrix3,
    pub translation: Vector4,
}

/// Translation, rotation, scale transform (48 bytes).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QsTransform {
    pub translation: Vector4,
    pub rotation: Quaternion,
    pub scale: Vector4,
}

impl QsTransform {
    pub const IDENTITY: Self = Self {
        translation: Vector4::ZERO,
        rotation: Quaternion::IDENTITY,
        scale: Vector4::new(1.0, 1.0, 1.0, 0.0),
    };
}

impl Default for QsTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
