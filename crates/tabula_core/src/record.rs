use std::any::Any;

use crate::{FieldDef, FieldError, Plain};

/// A compiled record type: an immutable product of named, validated
/// fields. Implemented by the `#[record]` macro, never by hand.
pub trait Record: Sized {
    const NAME: &'static str;

    /// Field table in field order: non-nullable fields first, then
    /// lexicographic by name. The same order drives the positional
    /// constructor, the textual form, ordering and hashing.
    const FIELDS: &'static [FieldDef];

    fn to_plain(&self) -> Plain;
    fn from_plain(plain: &Plain) -> Result<Self, FieldError>;

    fn field(name: &str) -> Option<&'static FieldDef> {
        Self::FIELDS.iter().find(|field| field.name == name)
    }
}

/// Type-erased record, the result of rehydrating by type name through the
/// registry. Downcast with [`AnyRecord::as_any`] to recover the concrete
/// type.
pub trait AnyRecord: Any + std::fmt::Debug + Send + Sync {
    fn type_name(&self) -> &'static str;
    fn to_plain(&self) -> Plain;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Marker for builder slots whose field has not been set yet. A builder
/// only gains its `finish` method once every non-nullable slot has moved
/// off this type.
#[derive(Clone)]
pub struct Unset;
