use serde_json::Value;

use crate::{JsonError, Plain, PlainMap};

/// Bridge between the plain tree and JSON documents.
///
/// Text passes through untouched. Bytes become a string of U+0000–U+00FF
/// code points (one per byte); the byte-typed slot on the way back in
/// reverses that mapping. Integers outside `i64` are rejected rather than
/// silently rounded.
impl Plain {
    pub fn to_json(&self) -> Value {
        match self {
            Plain::Null => Value::Null,
            Plain::Bool(v) => Value::Bool(*v),
            Plain::Int(v) => Value::Number((*v).into()),
            Plain::Float(v) => serde_json::Number::from_f64(*v)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Plain::Text(v) => Value::String(v.clone()),
            Plain::Bytes(v) => Value::String(v.iter().map(|b| *b as char).collect()),
            Plain::List(items) => Value::Array(items.iter().map(Plain::to_json).collect()),
            Plain::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.to_string(), value.to_json()))
                    .collect(),
            ),
        }
    }

    pub fn from_json(value: &Value) -> Result<Plain, JsonError> {
        match value {
            Value::Null => Ok(Plain::Null),
            Value::Bool(v) => Ok(Plain::Bool(*v)),
            Value::Number(number) => {
                if let Some(v) = number.as_i64() {
                    Ok(Plain::Int(v))
                } else if number.is_u64() {
                    Err(JsonError::NumberOutOfRange(number.to_string()))
                } else if let Some(v) = number.as_f64() {
                    Ok(Plain::Float(v))
                } else {
                    Err(JsonError::NumberOutOfRange(number.to_string()))
                }
            }
            Value::String(v) => Ok(Plain::Text(v.clone())),
            Value::Array(items) => items
                .iter()
                .map(Plain::from_json)
                .collect::<Result<Vec<_>, _>>()
                .map(Plain::List),
            Value::Object(entries) => {
                let mut map = PlainMap::new();
                for (key, value) in entries {
                    map.insert(key.clone(), Plain::from_json(value)?);
                }
                Ok(Plain::Map(map))
            }
        }
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    pub fn from_json_str(text: &str) -> Result<Plain, JsonError> {
        let value: Value = serde_json::from_str(text)?;
        Plain::from_json(&value)
    }
}

/// Decode a U+0000–U+00FF string back into bytes.
pub(crate) fn text_to_bytes(text: &str) -> Result<Vec<u8>, JsonError> {
    text.chars()
        .map(|c| {
            u8::try_from(c as u32).map_err(|_| JsonError::NonByteChar(c))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let mut map = PlainMap::new();
        map.insert("id", Plain::Int(1));
        map.insert("label", Plain::Text("uno".into()));
        map.insert("scores", Plain::List(vec![Plain::Float(1.5), Plain::Null]));
        let tree = Plain::Map(map);

        let text = tree.to_json_string();
        assert_eq!(Plain::from_json_str(&text).unwrap(), tree);
    }

    #[test]
    fn bytes_become_byte_code_points() {
        let tree = Plain::Bytes(vec![0x41, 0xFF]);
        let json = tree.to_json();
        assert_eq!(json, Value::String("A\u{ff}".to_string()));
        assert_eq!(text_to_bytes("A\u{ff}").unwrap(), vec![0x41, 0xFF]);
        assert!(matches!(
            text_to_bytes("\u{100}"),
            Err(JsonError::NonByteChar('\u{100}'))
        ));
    }

    #[test]
    fn huge_integers_rejected() {
        let value: Value = serde_json::from_str("18446744073709551615").unwrap();
        assert!(matches!(
            Plain::from_json(&value),
            Err(JsonError::NumberOutOfRange(_))
        ));
    }
}
