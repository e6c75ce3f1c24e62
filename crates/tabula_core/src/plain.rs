use std::collections::BTreeMap;

use crate::FieldError;

/// The plain-data tree: the portable, language-neutral form every record
/// and collection converts to and from.
///
/// Maps are string-keyed, lists are ordered, scalars are the primitive
/// kinds. Anything richer (dates, decimals, durations) travels as `Text`
/// in its marshalled form.
#[derive(Clone, Debug, PartialEq)]
pub enum Plain {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    List(Vec<Plain>),
    Map(PlainMap),
}

impl Plain {
    pub fn type_name(&self) -> &'static str {
        match self {
            Plain::Null => "Null",
            Plain::Bool(_) => "Bool",
            Plain::Int(_) => "Int",
            Plain::Float(_) => "Float",
            Plain::Text(_) => "Text",
            Plain::Bytes(_) => "Bytes",
            Plain::List(_) => "List",
            Plain::Map(_) => "Map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Plain::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Plain::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Plain::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Plain::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Plain::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Plain::Bytes(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Plain]> {
        match self {
            Plain::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&PlainMap> {
        match self {
            Plain::Map(v) => Some(v),
            _ => None,
        }
    }
}

impl From<bool> for Plain {
    fn from(value: bool) -> Self {
        Plain::Bool(value)
    }
}

impl From<i64> for Plain {
    fn from(value: i64) -> Self {
        Plain::Int(value)
    }
}

impl From<i32> for Plain {
    fn from(value: i32) -> Self {
        Plain::Int(value as i64)
    }
}

impl From<f64> for Plain {
    fn from(value: f64) -> Self {
        Plain::Float(value)
    }
}

impl From<String> for Plain {
    fn from(value: String) -> Self {
        Plain::Text(value)
    }
}

impl From<&str> for Plain {
    fn from(value: &str) -> Self {
        Plain::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Plain {
    fn from(value: Vec<u8>) -> Self {
        Plain::Bytes(value)
    }
}

impl From<Vec<Plain>> for Plain {
    fn from(value: Vec<Plain>) -> Self {
        Plain::List(value)
    }
}

impl From<PlainMap> for Plain {
    fn from(value: PlainMap) -> Self {
        Plain::Map(value)
    }
}

impl<T: Into<Plain>> From<Option<T>> for Plain {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Plain::Null,
        }
    }
}

/// Renders values the way error messages quote them: text quoted, floats
/// with their decimal point, composites JSON-ish.
impl std::fmt::Display for Plain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Plain::Null => write!(f, "null"),
            Plain::Bool(v) => write!(f, "{v}"),
            Plain::Int(v) => write!(f, "{v}"),
            Plain::Float(v) => write!(f, "{v:?}"),
            Plain::Text(v) => write!(f, "{v:?}"),
            Plain::Bytes(v) => {
                write!(f, "b\"")?;
                for byte in v {
                    for escaped in std::ascii::escape_default(*byte) {
                        write!(f, "{}", escaped as char)?;
                    }
                }
                write!(f, "\"")
            }
            Plain::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            Plain::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// String-keyed, key-ordered map node of the plain tree.
///
/// `insert` replaces silently (the codec writes each field once);
/// `from_pairs` is the boundary where duplicate keys are rejected.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlainMap {
    entries: BTreeMap<String, Plain>,
}

impl PlainMap {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, Plain)>,
    ) -> Result<Self, FieldError> {
        let mut map = Self::new();
        for (key, value) in pairs {
            if map.entries.contains_key(&key) {
                return Err(FieldError::DuplicateKey { key });
            }
            map.entries.insert(key, value);
        }
        Ok(map)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Plain) -> Option<Plain> {
        self.entries.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&Plain> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Plain)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Plain> {
        self.entries.values()
    }
}

impl IntoIterator for PlainMap {
    type Item = (String, Plain);
    type IntoIter = std::collections::btree_map::IntoIter<String, Plain>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_pairs_rejects_duplicate_keys() {
        let result = PlainMap::from_pairs([
            ("a".to_string(), Plain::Int(1)),
            ("a".to_string(), Plain::Int(2)),
        ]);
        assert_eq!(
            result,
            Err(FieldError::DuplicateKey {
                key: "a".to_string()
            })
        );
    }

    #[test]
    fn insert_replaces() {
        let mut map = PlainMap::new();
        map.insert("a", Plain::Int(1));
        assert_eq!(map.insert("a", Plain::Int(2)), Some(Plain::Int(1)));
        assert_eq!(map.get("a"), Some(&Plain::Int(2)));
    }

    #[test]
    fn display_quotes_text_and_keeps_float_points() {
        assert_eq!(Plain::Text("uno".to_string()).to_string(), "\"uno\"");
        assert_eq!(Plain::Float(5.0).to_string(), "5.0");
        assert_eq!(Plain::Null.to_string(), "null");
        let list = Plain::List(vec![Plain::Int(1), Plain::Text("x".to_string())]);
        assert_eq!(list.to_string(), "[1, \"x\"]");
    }

    #[test]
    fn map_iterates_in_key_order() {
        let mut map = PlainMap::new();
        map.insert("b", Plain::Int(2));
        map.insert("a", Plain::Int(1));
        let keys: Vec<&str> = map.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
