use packfile_core::Handle;
use packfile_format::FormatError;

/// Errors that abort a serialization run.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("class {0:?} is not registered")]
    UnregisteredClass(&'static str),
    #[error("value {value:#x} does not fit a {width}-byte pointer")]
    PointerWidthMismatch { value: u64, width: u8 },
    #[error("handle {0} does not name an object in the graph")]
    DanglingHandle(Handle),
    #[error("{0} exceeds the 32-bit offset range")]
    OffsetOverflow(usize),
    #[error(transparent)]
    Format(FormatError),
}

impl From<FormatError> for SerializeError {
    fn from(err: FormatError) -> Self {
        match err {
            FormatError::PointerWidthMismatch { value, width } => {
                Self::PointerWidthMismatch { value, width }
            }
            other => Self::Format(other),
        }
    }
}

/// Errors that abort a deserialization run.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("contents live in section {0}, not the data section")]
    ForeignContentsSection(u32),
    #[error("no object starts at {0:#x}")]
    MissingVirtualFixup(u32),
    #[error("class-name offset {0:#x} names no entry")]
    MissingClassName(u32),
    #[error("class {0:?} is not registered")]
    UnknownClass(String),
    #[error("class {name:?}: file has signature {found:#010x}, registry has {expected:#010x}")]
    SignatureMismatch {
        name: String,
        expected: u32,
        found: u32,
    },
    #[error("array at {0:#x} has elements but no local fixup")]
    MissingLocalFixup(u32),
    #[error("read out of range at {offset:#x} (data section is {len} bytes)")]
    OutOfRange { offset: u32, len: usize },
}

pub type Result<T> = std::result::Result<T, SerializeError>;
