use crate::{FieldDef, FieldError, Plain, PlainKind, PlainMap, Record, lookup_type};

static BOOL_WORDS: phf::Map<&'static str, bool> = phf::phf_map! {
    "true" => true,
    "1" => true,
    "false" => false,
    "0" => false,
};

/// Best-effort coercion of an untyped plain tree toward a record's field
/// table, for input scraped or parsed from sources that render everything
/// as text. Override a `clean_*` method to customize one kind; the output
/// still goes through the record constructor, so nothing is trusted.
pub trait Clean {
    fn clean_record(&self, fields: &[FieldDef], input: &Plain) -> Result<Plain, FieldError> {
        let map = match input.as_map() {
            Some(map) => map,
            None => return Err(FieldError::type_mismatch("Map", input)),
        };
        let mut cleaned = PlainMap::new();
        for field in fields {
            match map.get(field.name) {
                // Absent and null stay absent; defaulting is the
                // constructor's business.
                None | Some(Plain::Null) => {}
                Some(value) => {
                    cleaned.insert(field.name, self.clean_field(field, value)?);
                }
            }
        }
        Ok(Plain::Map(cleaned))
    }

    fn clean_field(&self, field: &FieldDef, value: &Plain) -> Result<Plain, FieldError> {
        match field.kind {
            PlainKind::Int => self.clean_int(value),
            PlainKind::Float => self.clean_float(value),
            PlainKind::Bool => self.clean_bool(value),
            PlainKind::Text | PlainKind::Marshalled(_) => self.clean_text(value),
            PlainKind::Bytes => Ok(value.clone()),
            PlainKind::Record(name) => match lookup_type(name) {
                Some(entry) => self.clean_record(entry.fields, value),
                None => Ok(value.clone()),
            },
            PlainKind::Seq { elem, .. }
            | PlainKind::Pair { elem, .. }
            | PlainKind::Set { elem, .. } => {
                let items = match value.as_list() {
                    Some(items) => items,
                    None => return Err(FieldError::type_mismatch("List", value)),
                };
                let cleaned = items
                    .iter()
                    .map(|item| {
                        if item.is_null() {
                            Ok(Plain::Null)
                        } else {
                            self.clean_field(elem, item)
                        }
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Plain::List(cleaned))
            }
            PlainKind::Dict { value: value_def, .. } => {
                let entries = match value.as_map() {
                    Some(entries) => entries,
                    None => return Err(FieldError::type_mismatch("Map", value)),
                };
                let mut cleaned = PlainMap::new();
                for (key, entry) in entries.iter() {
                    cleaned.insert(key, self.clean_field(value_def, entry)?);
                }
                Ok(Plain::Map(cleaned))
            }
        }
    }

    fn clean_int(&self, value: &Plain) -> Result<Plain, FieldError> {
        match value {
            Plain::Int(_) => Ok(value.clone()),
            Plain::Float(v) if v.fract() == 0.0 => Ok(Plain::Int(*v as i64)),
            Plain::Text(text) => text
                .trim()
                .parse::<i64>()
                .map(Plain::Int)
                .map_err(|_| FieldError::value_error("", value)),
            other => Err(FieldError::value_error("", other)),
        }
    }

    fn clean_float(&self, value: &Plain) -> Result<Plain, FieldError> {
        match value {
            Plain::Float(_) => Ok(value.clone()),
            Plain::Int(v) => Ok(Plain::Float(*v as f64)),
            Plain::Text(text) => text
                .trim()
                .parse::<f64>()
                .map(Plain::Float)
                .map_err(|_| FieldError::value_error("", value)),
            other => Err(FieldError::value_error("", other)),
        }
    }

    fn clean_bool(&self, value: &Plain) -> Result<Plain, FieldError> {
        match value {
            Plain::Bool(_) => Ok(value.clone()),
            Plain::Int(0) => Ok(Plain::Bool(false)),
            Plain::Int(1) => Ok(Plain::Bool(true)),
            Plain::Text(text) => BOOL_WORDS
                .get(text.trim().to_lowercase().as_str())
                .map(|v| Plain::Bool(*v))
                .ok_or_else(|| FieldError::value_error("", value)),
            other => Err(FieldError::value_error("", other)),
        }
    }

    fn clean_text(&self, value: &Plain) -> Result<Plain, FieldError> {
        match value {
            Plain::Text(_) => Ok(value.clone()),
            Plain::Int(v) => Ok(Plain::Text(v.to_string())),
            Plain::Float(v) => Ok(Plain::Text(format!("{v:?}"))),
            Plain::Bool(v) => Ok(Plain::Text(v.to_string())),
            other => Err(FieldError::value_error("", other)),
        }
    }
}

/// The stock cleaner: every hook at its default.
pub struct DefaultCleaner;

impl Clean for DefaultCleaner {}

/// Clean `input` against `R`'s field table, then construct the record.
pub fn clean_into<R: Record>(cleaner: &dyn Clean, input: &Plain) -> Result<R, FieldError> {
    let cleaned = cleaner.clean_record(R::FIELDS, input)?;
    R::from_plain(&cleaned)
}
