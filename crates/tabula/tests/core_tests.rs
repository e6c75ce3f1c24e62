use std::hash::{DefaultHasher, Hash, Hasher};

use tabula::prelude::*;

#[record]
struct Point {
    x: i64,
    y: i64,
}

#[record]
struct Tagged {
    id: i64,
    #[field(default = "anonymous".to_string())]
    label: Option<String>,
}

#[record]
struct Checked {
    #[field(coerce = |v| v + 10, check = |v: &i64| (0..10).contains(v))]
    id: i64,
}

#[record]
struct Mixed {
    zeta: i64,
    alpha: Option<i64>,
}

#[record]
struct Slug {
    #[field(default = "untitled".to_string(), coerce = |s: String| s.to_uppercase())]
    title: Option<String>,
}

// User methods live in ordinary impl blocks next to the generated ones.
impl Point {
    fn manhattan(&self) -> i64 {
        self.x().abs() + self.y().abs()
    }
}

fn hash_of<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

#[test]
fn positional_construction_and_accessors() {
    let point = Point::new(5, 6).unwrap();
    assert_eq!(point.x(), &5);
    assert_eq!(point.y(), &6);
    assert_eq!(point.manhattan(), 11);
}

#[test]
fn builder_construction_in_any_order() {
    let point = Point::build().y(6).x(5).finish().unwrap();
    assert_eq!(point, Point::new(5, 6).unwrap());

    // Setters promote through Into.
    let point = Point::build().x(5i32).y(6i32).finish().unwrap();
    assert_eq!(point.x(), &5);
}

#[test]
fn textual_form_lists_fields_in_field_order() {
    let point = Point::new(5, 6).unwrap();
    assert_eq!(format!("{point:?}"), "Point(x=5, y=6)");

    let tagged = Tagged::new(1, None).unwrap();
    assert_eq!(format!("{tagged:?}"), "Tagged(id=1, label=\"anonymous\")");

    let mixed = Mixed::new(1, None).unwrap();
    assert_eq!(format!("{mixed:?}"), "Mixed(zeta=1, alpha=None)");
}

#[test]
fn records_sort_lexicographically_by_field_order() {
    let mut points = vec![
        Point::new(10, 10).unwrap(),
        Point::new(0, 10).unwrap(),
        Point::new(10, 0).unwrap(),
        Point::new(0, 0).unwrap(),
    ];
    points.sort();
    assert_eq!(
        points,
        vec![
            Point::new(0, 0).unwrap(),
            Point::new(0, 10).unwrap(),
            Point::new(10, 0).unwrap(),
            Point::new(10, 10).unwrap(),
        ]
    );
}

#[test]
fn equal_fields_mean_equal_hash_and_repr() {
    let a = Point::new(3, 4).unwrap();
    let b = Point::new(3, 4).unwrap();
    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(format!("{a:?}"), format!("{b:?}"));
    assert_ne!(a, Point::new(3, 5).unwrap());
}

#[test]
fn null_sorts_before_any_value() {
    let absent = Mixed::new(1, None).unwrap();
    let smallest = Mixed::new(1, Some(i64::MIN)).unwrap();
    assert!(absent < smallest);
}

#[test]
fn field_ordering_puts_non_nullable_first() {
    let names: Vec<&str> = Mixed::FIELDS.iter().map(|field| field.name).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
    assert!(!Mixed::FIELDS[0].nullable);
    assert!(Mixed::FIELDS[1].nullable);
    assert_eq!(Mixed::FIELDS[0].kind, PlainKind::Int);
}

#[test]
fn default_fills_null_but_not_explicit_values() {
    let anonymous = Tagged::new(1, None).unwrap();
    assert_eq!(anonymous.label(), Some(&"anonymous".to_string()));

    let named = Tagged::new(1, Some("bob".to_string())).unwrap();
    assert_eq!(named.label(), Some(&"bob".to_string()));

    let built = Tagged::build().id(1).label("eve").finish().unwrap();
    assert_eq!(built.label(), Some(&"eve".to_string()));
}

#[test]
fn the_default_is_coerced_too() {
    let slug = Slug::new(None).unwrap();
    assert_eq!(slug.title(), Some(&"UNTITLED".to_string()));

    let slug = Slug::new(Some("mixed Case".to_string())).unwrap();
    assert_eq!(slug.title(), Some(&"MIXED CASE".to_string()));
}

#[test]
fn coerce_runs_before_check() {
    // -5 coerces to 5, which passes the single-digit check.
    let ok = Checked::new(-5).unwrap();
    assert_eq!(ok.id(), &5);

    // 7 coerces to 17, which fails, and the message quotes the coerced
    // value.
    let err = Checked::new(7).unwrap_err();
    assert!(err.is_value_error());
    assert_eq!(err.to_string(), "Checked.id: 17 is not a valid value");
    assert_eq!(err.field(), Some("Checked.id"));
}

#[test]
fn derive_replaces_only_named_fields() {
    let point = Point::new(5, 6).unwrap();

    let same = point.derive().finish().unwrap();
    assert_eq!(same, point);

    let moved = point.derive().y(10).finish().unwrap();
    assert_eq!(moved, Point::new(5, 10).unwrap());
    // The original is untouched.
    assert_eq!(point.y(), &6);
}

#[test]
fn derive_clearing_a_nullable_field_reapplies_the_default() {
    let named = Tagged::new(1, Some("bob".to_string())).unwrap();
    let cleared = named.derive().clear_label().finish().unwrap();
    assert_eq!(cleared.label(), Some(&"anonymous".to_string()));
}

#[test]
fn derive_revalidates() {
    let ok = Checked::new(-5).unwrap();
    let err = ok.derive().id(7).finish().unwrap_err();
    assert!(err.is_value_error());
}

#[test]
fn registry_rehydrates_by_type_name() {
    let point = Point::new(5, 6).unwrap();
    let plain = tabula::Record::to_plain(&point);

    let entry = tabula::lookup_type("Point").unwrap();
    assert_eq!(entry.name, "Point");
    assert_eq!(entry.fields.len(), 2);

    let rehydrated = tabula::rehydrate("Point", &plain).unwrap();
    assert_eq!(rehydrated.type_name(), "Point");
    let as_point = rehydrated.as_any().downcast_ref::<Point>().unwrap();
    assert_eq!(as_point, &point);

    assert!(matches!(
        tabula::rehydrate("NoSuchRecord", &plain),
        Err(FieldError::UnknownType { .. })
    ));
}
