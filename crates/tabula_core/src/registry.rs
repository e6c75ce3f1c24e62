use std::collections::HashMap;
use std::sync::LazyLock;

use linkme::distributed_slice;

use crate::{AnyRecord, FieldDef, FieldError, Plain};

/// One compiled record or collection type, as seen by the registry.
pub struct TypeEntry {
    pub name: &'static str,
    /// The field table for records; the element defs for collections.
    pub fields: &'static [FieldDef],
    pub from_plain: fn(&Plain) -> Result<Box<dyn AnyRecord>, FieldError>,
}

/// Every `#[record]` and collection-constructor invocation contributes an
/// entry here at link time. The slice lives for the process lifetime.
#[distributed_slice]
pub static RECORD_TYPES: [TypeEntry] = [..];

// Two types with the same simple name collide; the later entry wins.
// Documented limitation, inherited from name-keyed rehydration.
static INDEX: LazyLock<HashMap<&'static str, &'static TypeEntry>> = LazyLock::new(|| {
    let mut index = HashMap::new();
    for entry in RECORD_TYPES.iter() {
        if index.insert(entry.name, entry).is_some() {
            tracing::warn!(name = entry.name, "type registry collision, keeping the later entry");
        }
    }
    index
});

pub fn lookup_type(name: &str) -> Option<&'static TypeEntry> {
    INDEX.get(name).copied()
}

pub fn registered_types() -> impl Iterator<Item = &'static TypeEntry> {
    RECORD_TYPES.iter()
}

/// Reconstruct an instance from its type name and plain form. Generated
/// types are not anchored to any caller-known module, so this name-keyed
/// indirection is how they come back from serialized data.
pub fn rehydrate(name: &str, plain: &Plain) -> Result<Box<dyn AnyRecord>, FieldError> {
    let entry = lookup_type(name).ok_or_else(|| FieldError::UnknownType {
        name: name.to_string(),
    })?;
    (entry.from_plain)(plain)
}
