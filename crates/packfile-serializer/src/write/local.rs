//! Deferred payload writes.
//!
//! Array contents and strings are not written where their field is. The field
//! gets a placeholder and a local fixup; the payload is queued as a
//! [`LocalWrite`] and emitted after the owning object, patching the fixup's
//! destination when it lands.

use packfile_core::Handle;

use super::fixups::LocalSlot;
use crate::class::Encodable;

/// Alignment of array payloads and objects.
pub(crate) const PAYLOAD_ALIGN: usize = 16;

/// Alignment after a string field's bytes.
pub(crate) const STRING_FIELD_ALIGN: usize = 16;

/// Alignment after each string of a string array.
pub(crate) const STRING_ELEMENT_ALIGN: usize = 2;

pub(crate) enum LocalWrite<'g> {
    Array {
        slot: LocalSlot,
        payload: ArrayPayload<'g>,
    },
    String {
        slot: LocalSlot,
        text: &'g str,
        align: usize,
    },
    /// Trailing pad after an inline object array.
    Pad,
}

/// Array elements, captured when the header is written.
pub(crate) enum ArrayPayload<'g> {
    /// Pre-encoded fixed-size values.
    Raw(Vec<u8>),
    Pointers(Vec<Option<Handle>>),
    Strings(Vec<Option<&'g str>>),
    /// Objects stored by value (no identity, no virtual fixup).
    Inline(Vec<&'g dyn Encodable>),
}

impl ArrayPayload<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Raw(_) => "raw",
            Self::Pointers(_) => "pointers",
            Self::Strings(_) => "strings",
            Self::Inline(_) => "inline",
        }
    }
}
