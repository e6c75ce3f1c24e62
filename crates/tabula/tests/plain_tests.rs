use std::hash::{DefaultHasher, Hash, Hasher};

use chrono::NaiveDate;
use tabula::prelude::*;

#[record]
struct Item {
    id: i64,
    label: String,
}

#[record]
struct Name {
    first: String,
    last: String,
}

#[record]
struct Person {
    age: i64,
    name: Name,
}

#[record]
struct Login {
    when: chrono::NaiveDateTime,
}

#[record]
struct Note {
    id: i64,
    #[field(default = "untitled".to_string())]
    title: Option<String>,
    body: Option<String>,
}

#[record]
struct Ratio {
    value: f64,
}

#[record]
struct Blob {
    data: Vec<u8>,
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn flat_record_round_trips() {
    let item = Item::new(1, "uno".to_string()).unwrap();
    let plain = item.to_plain();

    let map = plain.as_map().unwrap();
    assert_eq!(map.len(), 2);
    assert_eq!(map.get("id"), Some(&Plain::Int(1)));
    assert_eq!(map.get("label"), Some(&Plain::Text("uno".to_string())));

    let back = Item::from_plain(&plain).unwrap();
    assert_eq!(back, item);
    assert_eq!(hash_of(&back), hash_of(&item));
}

#[test]
fn nested_records_become_nested_maps() {
    let person = Person::new(
        100,
        Name::new("Robert".to_string(), "Smith".to_string()).unwrap(),
    )
    .unwrap();

    let plain = person.to_plain();
    let map = plain.as_map().unwrap();
    assert_eq!(map.get("age"), Some(&Plain::Int(100)));
    let name = map.get("name").unwrap().as_map().unwrap();
    assert_eq!(name.get("first"), Some(&Plain::Text("Robert".to_string())));
    assert_eq!(name.get("last"), Some(&Plain::Text("Smith".to_string())));

    assert_eq!(Person::from_plain(&plain).unwrap(), person);
}

#[test]
fn nested_record_errors_name_the_inner_field() {
    let mut name = PlainMap::new();
    name.insert("first", Plain::Text("Robert".to_string()));
    let mut map = PlainMap::new();
    map.insert("age", Plain::Int(100));
    map.insert("name", Plain::Map(name));

    let err = Person::from_plain(&Plain::Map(map)).unwrap_err();
    assert_eq!(err.to_string(), "Name.last cannot be null");
}

#[test]
fn datetime_fields_use_the_iso_wire_form() {
    let when = NaiveDate::from_ymd_opt(2010, 10, 24)
        .unwrap()
        .and_hms_opt(9, 5, 33)
        .unwrap();
    let login = Login::new(when).unwrap();

    let plain = login.to_plain();
    assert_eq!(
        plain.as_map().unwrap().get("when"),
        Some(&Plain::Text("2010-10-24T09:05:33".to_string()))
    );
    assert_eq!(Login::from_plain(&plain).unwrap(), login);
}

#[test]
fn null_nullable_fields_are_omitted_from_the_map() {
    let note = Note::new(1, None, None).unwrap();
    let plain = note.to_plain();
    let map = plain.as_map().unwrap();

    // The default fills `title`, so it serializes; `body` stays null and
    // is omitted.
    assert_eq!(map.get("title"), Some(&Plain::Text("untitled".to_string())));
    assert!(!map.contains_key("body"));
}

#[test]
fn missing_keys_read_as_null() {
    let mut map = PlainMap::new();
    map.insert("id", Plain::Int(7));

    let note = Note::from_plain(&Plain::Map(map)).unwrap();
    assert_eq!(note.id(), &7);
    assert_eq!(note.title(), Some(&"untitled".to_string()));
    assert_eq!(note.body(), None);
}

#[test]
fn missing_non_nullable_key_fails() {
    let mut map = PlainMap::new();
    map.insert("title", Plain::Text("x".to_string()));

    let err = Note::from_plain(&Plain::Map(map)).unwrap_err();
    assert_eq!(err, FieldError::not_nullable("Note.id"));

    // An explicit null is the same as a missing key.
    let mut map = PlainMap::new();
    map.insert("id", Plain::Null);
    let err = Note::from_plain(&Plain::Map(map)).unwrap_err();
    assert_eq!(err, FieldError::not_nullable("Note.id"));
}

#[test]
fn unknown_keys_are_ignored() {
    let mut map = PlainMap::new();
    map.insert("id", Plain::Int(1));
    map.insert("label", Plain::Text("uno".to_string()));
    map.insert("stray", Plain::Bool(true));

    assert!(Item::from_plain(&Plain::Map(map)).is_ok());
}

#[test]
fn wrong_scalar_type_is_reported_with_the_dotted_path() {
    let mut map = PlainMap::new();
    map.insert("id", Plain::Text("uno".to_string()));
    map.insert("label", Plain::Text("uno".to_string()));

    let err = Item::from_plain(&Plain::Map(map)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Item.id should be of type Int, not Text (\"uno\")"
    );
}

#[test]
fn float_fields_widen_plain_ints() {
    let mut map = PlainMap::new();
    map.insert("value", Plain::Int(2));
    let ratio = Ratio::from_plain(&Plain::Map(map)).unwrap();
    assert_eq!(ratio.value(), &2.0);
}

#[test]
fn non_map_input_fails_with_the_record_name() {
    let err = Item::from_plain(&Plain::Int(3)).unwrap_err();
    assert!(matches!(
        err,
        FieldError::Type {
            expected: "Item",
            actual: "Int",
            ..
        }
    ));
}

#[test]
fn bytes_pass_through_and_survive_json() {
    let blob = Blob::new(vec![0x41, 0xFF, 0x00]).unwrap();
    assert_eq!(
        blob.to_plain().as_map().unwrap().get("data"),
        Some(&Plain::Bytes(vec![0x41, 0xFF, 0x00]))
    );

    // JSON renders bytes as byte-sized code points; the byte-typed slot
    // accepts that form back.
    let text = blob.to_plain().to_json_string();
    let tree = Plain::from_json_str(&text).unwrap();
    assert_eq!(Blob::from_plain(&tree).unwrap(), blob);
}

#[test]
fn json_round_trip() {
    let person = Person::new(
        100,
        Name::new("Robert".to_string(), "Smith".to_string()).unwrap(),
    )
    .unwrap();

    let text = person.to_plain().to_json_string();
    let tree = Plain::from_json_str(&text).unwrap();
    assert_eq!(Person::from_plain(&tree).unwrap(), person);
}

#[test]
fn duplicate_keys_are_rejected_when_building_trees() {
    let err = PlainMap::from_pairs([
        ("id".to_string(), Plain::Int(1)),
        ("id".to_string(), Plain::Int(2)),
    ])
    .unwrap_err();
    assert_eq!(
        err,
        FieldError::DuplicateKey {
            key: "id".to_string()
        }
    );
}
