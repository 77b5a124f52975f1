//! Target layout rules.
//!
//! The four layout-rule bytes stored in the file header describe the platform
//! the packfile is loaded on: pointer width, byte order, whether pointer-shaped
//! fields are padded to pointer alignment, and the empty-base-class flag.

use serde::{Deserialize, Serialize};

use crate::error::{FormatError, Result};

/// Byte order of every multi-byte value in the container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    Big,
    #[default]
    Little,
}

impl Endianness {
    /// Header flag: 0 = big, 1 = little.
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::Big),
            1 => Some(Self::Little),
            _ => None,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Self::Big => 0,
            Self::Little => 1,
        }
    }
}

/// Native pointer width of the target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum PointerWidth {
    #[default]
    Four = 4,
    Eight = 8,
}

impl PointerWidth {
    /// Width in bytes.
    pub fn bytes(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for PointerWidth {
    type Error = FormatError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(FormatError::UnsupportedPointerWidth(other)),
        }
    }
}

impl From<PointerWidth> for u8 {
    fn from(width: PointerWidth) -> u8 {
        width as u8
    }
}

/// Whether pointer-shaped fields are aligned to the pointer width first.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddingPolicy {
    #[default]
    None,
    PadToPointerWidth,
}

impl PaddingPolicy {
    pub fn from_flag(flag: u8) -> Option<Self> {
        match flag {
            0 => Some(Self::None),
            1 => Some(Self::PadToPointerWidth),
            _ => None,
        }
    }

    pub fn flag(self) -> u8 {
        match self {
            Self::None => 0,
            Self::PadToPointerWidth => 1,
        }
    }
}

/// Container layout configuration, supplied by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layout {
    pub endianness: Endianness,
    pub pointer_width: PointerWidth,
    #[serde(default)]
    pub padding_policy: PaddingPolicy,
    #[serde(default = "default_empty_base_class")]
    pub empty_base_class: bool,
}

fn default_empty_base_class() -> bool {
    true
}

impl Default for Layout {
    fn default() -> Self {
        Self::WIN32
    }
}

impl Layout {
    /// 32-bit little-endian desktop.
    pub const WIN32: Self = Self::new(Endianness::Little, PointerWidth::Four, PaddingPolicy::None);
    /// 64-bit little-endian desktop.
    pub const WIN64: Self = Self::new(Endianness::Little, PointerWidth::Eight, PaddingPolicy::None);
    /// 32-bit big-endian console.
    pub const XBOX360: Self = Self::new(Endianness::Big, PointerWidth::Four, PaddingPolicy::None);
    /// 32-bit big-endian console with padded pointers.
    pub const PS3: Self = Self::new(
        Endianness::Big,
        PointerWidth::Four,
        PaddingPolicy::PadToPointerWidth,
    );

    /// Named presets, in display order.
    pub const PRESETS: [(&'static str, Layout); 4] = [
        ("win32", Self::WIN32),
        ("win64", Self::WIN64),
        ("xbox360", Self::XBOX360),
        ("ps3", Self::PS3),
    ];

    pub const fn new(
        endianness: Endianness,
        pointer_width: PointerWidth,
        padding_policy: PaddingPolicy,
    ) -> Self {
        Self {
            endianness,
            pointer_width,
            padding_policy,
            empty_base_class: true,
        }
    }

    /// Resolve a preset by (case-insensitive) name.
    pub fn from_preset(name: &str) -> Option<Self> {
        Self::PRESETS
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|&(_, layout)| layout)
    }

    /// Pointer width in bytes.
    #[inline]
    pub fn pointer_size(&self) -> usize {
        self.pointer_width.bytes()
    }

    /// Encode as the four header layout-rule bytes.
    pub fn to_rules(&self) -> [u8; 4] {
        [
            self.pointer_width.into(),
            self.endianness.flag(),
            self.padding_policy.flag(),
            self.empty_base_class as u8,
        ]
    }

    /// Decode the four header layout-rule bytes.
    pub fn from_rules(rules: [u8; 4]) -> Result<Self> {
        let pointer_width = PointerWidth::try_from(rules[0])?;
        let invalid = || FormatError::InvalidLayoutRules(rules);
        let endianness = Endianness::from_flag(rules[1]).ok_or_else(invalid)?;
        let padding_policy = PaddingPolicy::from_flag(rules[2]).ok_or_else(invalid)?;
        let empty_base_class = match rules[3] {
            0 => false,
            1 => true,
            _ => return Err(invalid()),
        };
        Ok(Self {
            endianness,
            pointer_width,
            padding_policy,
            empty_base_class,
        })
    }
}
