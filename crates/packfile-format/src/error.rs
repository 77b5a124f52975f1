use std::io;

/// Container parse and primitive codec errors.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("file too small: {0} bytes (minimum 64)")]
    FileTooSmall(usize),
    #[error("header claims {count} sections, file has {len} bytes")]
    BadSectionCount { count: u32, len: usize },
    #[error("invalid magic: {0:#010x} {1:#010x}")]
    InvalidMagic(u32, u32),
    #[error("unsupported pointer width: {0} (expected 4 or 8)")]
    UnsupportedPointerWidth(u8),
    #[error("invalid layout rules: {0:?}")]
    InvalidLayoutRules([u8; 4]),
    #[error("unexpected end of input: need {needed} bytes at {offset:#x}, have {len}")]
    UnexpectedEof {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("section {tag:?} spans {start:#x}..{end:#x}, file has {len} bytes")]
    SectionOutOfBounds {
        tag: String,
        start: usize,
        end: usize,
        len: usize,
    },
    #[error("section {tag:?} has non-monotonic table offsets")]
    MalformedSection { tag: String },
    #[error("missing section {0:?}")]
    MissingSection(&'static str),
    #[error("malformed class name entry at {offset:#x}")]
    MalformedClassName { offset: usize },
    #[error("value {value:#x} does not fit a {width}-byte pointer")]
    PointerWidthMismatch { value: u64, width: u8 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, FormatError>;
