use chrono::{NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use tabula::prelude::*;
use tabula::{ScopedMarshaller, marshal, unmarshal};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Sku(String);

impl MarshalText for Sku {
    const TYPE_NAME: &'static str = "Sku";

    fn marshal_text(&self) -> String {
        self.0.clone()
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        Ok(Sku(text.to_string()))
    }
}

tabula::impl_plain_via_marshal!(Sku);

impl ValueOrd for Sku {
    fn value_cmp(&self, other: &Self) -> std::cmp::Ordering {
        Ord::cmp(self, other)
    }
}

impl ValueHash for Sku {
    fn value_hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::hash::Hash::hash(self, state);
    }
}

#[record]
struct Shipment {
    ordered: NaiveDate,
    shipping_time: TimeDelta,
    sku: Sku,
    total: Decimal,
}

dict_of!(NaiveDate => i64);

#[test]
fn marshalled_fields_use_their_canonical_text_forms() {
    let shipment = Shipment::new(
        NaiveDate::from_ymd_opt(2010, 10, 24).unwrap(),
        TimeDelta::seconds(93784),
        Sku("WIDGET-1".to_string()),
        "19.99".parse().unwrap(),
    )
    .unwrap();

    let plain = shipment.to_plain();
    let map = plain.as_map().unwrap();
    assert_eq!(map.get("ordered"), Some(&Plain::Text("2010-10-24".to_string())));
    assert_eq!(
        map.get("shipping_time"),
        Some(&Plain::Text("93784.0".to_string()))
    );
    assert_eq!(map.get("sku"), Some(&Plain::Text("WIDGET-1".to_string())));
    assert_eq!(map.get("total"), Some(&Plain::Text("19.99".to_string())));

    assert_eq!(Shipment::from_plain(&plain).unwrap(), shipment);
}

#[test]
fn field_kinds_name_their_marshaller() {
    let kinds: Vec<PlainKind> = Shipment::FIELDS.iter().map(|field| field.kind).collect();
    assert_eq!(
        kinds,
        vec![
            PlainKind::Marshalled("Date"),
            PlainKind::Marshalled("Duration"),
            PlainKind::Marshalled("Sku"),
            PlainKind::Marshalled("Decimal"),
        ]
    );
}

#[test]
fn garbage_text_fails_as_a_value_error() {
    let mut map = PlainMap::new();
    map.insert("ordered", Plain::Text("later".to_string()));
    map.insert("shipping_time", Plain::Text("93784.0".to_string()));
    map.insert("sku", Plain::Text("WIDGET-1".to_string()));
    map.insert("total", Plain::Text("19.99".to_string()));

    let err = Shipment::from_plain(&Plain::Map(map)).unwrap_err();
    assert!(err.is_value_error());
    assert_eq!(err.field(), Some("Shipment.ordered"));
}

#[test]
fn marshalled_scalars_work_as_dict_keys() {
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let dict = DateToIntDict::new([(day, 3)]).unwrap();
    let plain = dict.to_plain();
    assert_eq!(
        plain.as_map().unwrap().get("2024-02-29"),
        Some(&Plain::Int(3))
    );
    assert_eq!(DateToIntDict::from_plain(&plain).unwrap(), dict);
}

#[test]
fn scoped_registration_overrides_and_releases() {
    // All Sku overrides live in this one test; tests in this binary run
    // in parallel threads against the same process-wide registry.
    let sku = Sku("WIDGET-1".to_string());
    assert_eq!(marshal(&sku), "WIDGET-1");

    {
        let _guard = ScopedMarshaller::new::<Sku>(
            |sku| format!("sku:{}", sku.0),
            |text| Ok(Sku(text.trim_start_matches("sku:").to_string())),
        );
        assert_eq!(marshal(&sku), "sku:WIDGET-1");
        assert_eq!(unmarshal::<Sku>("sku:WIDGET-1").unwrap(), sku);

        // The plain codec sees the override too.
        assert_eq!(sku.to_plain(), Plain::Text("sku:WIDGET-1".to_string()));
    }

    assert_eq!(marshal(&sku), "WIDGET-1");
}

#[test]
fn explicit_unregister_requires_a_registration() {
    struct NeverRegistered;
    let err = tabula::unregister_marshaller::<NeverRegistered>().unwrap_err();
    assert!(matches!(err, FieldError::CannotMarshal { .. }));
}

#[test]
fn negative_and_fractional_durations_round_trip() {
    let delta = TimeDelta::milliseconds(-1500);
    let text = marshal(&delta);
    assert_eq!(text, "-1.5");
    assert_eq!(unmarshal::<TimeDelta>(&text).unwrap(), delta);
}
