/// The shape a field takes in the plain-data tree.
///
/// Collection kinds carry their element definitions, so a field table is a
/// complete, statically-allocated description of a record's schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlainKind {
    Bool,
    Int,
    Float,
    Text,
    Bytes,
    /// A scalar whose wire form is text, named after its marshaller
    /// ("Date", "DateTime", "Duration", "Decimal", or a user type).
    Marshalled(&'static str),
    Record(&'static str),
    Seq {
        name: &'static str,
        elem: &'static FieldDef,
    },
    Pair {
        name: &'static str,
        elem: &'static FieldDef,
    },
    Set {
        name: &'static str,
        elem: &'static FieldDef,
    },
    Dict {
        name: &'static str,
        key: &'static FieldDef,
        value: &'static FieldDef,
    },
}

impl PlainKind {
    /// The name used in "should be of type …" messages.
    pub fn name(&self) -> &'static str {
        match self {
            PlainKind::Bool => "Bool",
            PlainKind::Int => "Int",
            PlainKind::Float => "Float",
            PlainKind::Text => "Text",
            PlainKind::Bytes => "Bytes",
            PlainKind::Marshalled(name) => name,
            PlainKind::Record(name) => name,
            PlainKind::Seq { name, .. } => name,
            PlainKind::Pair { name, .. } => name,
            PlainKind::Set { name, .. } => name,
            PlainKind::Dict { name, .. } => name,
        }
    }

    /// Child field definitions: the element def for sequences, pairs and
    /// sets, `[key, value]` for dicts, empty otherwise.
    pub fn subfields(&self) -> Vec<&'static FieldDef> {
        match self {
            PlainKind::Seq { elem, .. }
            | PlainKind::Pair { elem, .. }
            | PlainKind::Set { elem, .. } => vec![elem],
            PlainKind::Dict { key, value, .. } => vec![key, value],
            _ => Vec::new(),
        }
    }
}

/// One field of a record (or one element slot of a collection): its name,
/// its plain-data shape, and whether null is admitted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: PlainKind,
    pub nullable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names() {
        assert_eq!(PlainKind::Int.name(), "Int");
        assert_eq!(PlainKind::Marshalled("Date").name(), "Date");
        assert_eq!(PlainKind::Record("Point").name(), "Point");
    }

    #[test]
    fn subfields_follow_collection_shape() {
        static ELEM: FieldDef = FieldDef {
            name: "[elem]",
            kind: PlainKind::Int,
            nullable: false,
        };
        let seq = PlainKind::Seq {
            name: "IntSeq",
            elem: &ELEM,
        };
        assert_eq!(seq.subfields(), vec![&ELEM]);
        assert!(PlainKind::Text.subfields().is_empty());
    }
}
