use crate::Plain;

/// Everything that can go wrong while validating a field or walking the
/// plain-data tree. Messages name the offending `Class.field` (elements as
/// `[elem]`, dict entries as `<key>` / `<value>`) and quote the value.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum FieldError {
    #[error("{field} should be of type {expected}, not {actual} ({value})")]
    Type {
        field: String,
        expected: &'static str,
        actual: &'static str,
        value: String,
    },
    #[error("{field}: {value} is not a valid value")]
    Value { field: String, value: String },
    #[error("{field} cannot be null")]
    NotNullable { field: String },
    #[error("a pair must have two elements, not {count}")]
    PairLength { count: usize },
    #[error("duplicate key {key:?} in plain map")]
    DuplicateKey { key: String },
    #[error("no marshaller registered for {type_name}")]
    CannotMarshal { type_name: &'static str },
    #[error("unknown record type {name:?}")]
    UnknownType { name: String },
}

impl FieldError {
    /// Wrong dynamic type for a declared field. The field path is filled in
    /// by the caller that knows it, via [`FieldError::at`].
    pub fn type_mismatch(expected: &'static str, actual: &Plain) -> Self {
        FieldError::Type {
            field: String::new(),
            expected,
            actual: actual.type_name(),
            value: actual.to_string(),
        }
    }

    pub fn value_error(field: impl Into<String>, value: impl std::fmt::Display) -> Self {
        FieldError::Value {
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn not_nullable(field: impl Into<String>) -> Self {
        FieldError::NotNullable {
            field: field.into(),
        }
    }

    /// Attach the dotted field path to an error raised below the field
    /// level. A path already present (from a nested record) is kept.
    pub fn at(mut self, field: &str) -> Self {
        match &mut self {
            FieldError::Type { field: slot, .. }
            | FieldError::Value { field: slot, .. }
            | FieldError::NotNullable { field: slot } => {
                if slot.is_empty() {
                    *slot = field.to_string();
                }
            }
            _ => {}
        }
        self
    }

    /// The source taxonomy made `FieldNotNullable` a subtype of
    /// `FieldValueError`; both report true here.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            FieldError::Value { .. } | FieldError::NotNullable { .. } | FieldError::PairLength { .. }
        )
    }

    pub fn is_type_error(&self) -> bool {
        matches!(self, FieldError::Type { .. })
    }

    pub fn field(&self) -> Option<&str> {
        match self {
            FieldError::Type { field, .. }
            | FieldError::Value { field, .. }
            | FieldError::NotNullable { field } => Some(field),
            _ => None,
        }
    }
}

/// Failures of the JSON bridge, kept apart from field validation: these
/// describe a malformed or unrepresentable document, not a bad field value.
#[derive(Debug, thiserror::Error)]
pub enum JsonError {
    #[error("invalid json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("number {0} does not fit the plain-data integer range")]
    NumberOutOfRange(String),
    #[error("char {0:?} is not a byte")]
    NonByteChar(char),
}
