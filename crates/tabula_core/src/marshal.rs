use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use rust_decimal::Decimal;

use crate::FieldError;

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// A scalar whose wire form is text.
///
/// Implementations below are the built-in marshaller table; user types
/// implement this and pick up codec support via
/// [`impl_plain_via_marshal!`](crate::impl_plain_via_marshal). The runtime
/// registry in this module can override any of them for the lifetime of a
/// scope or the process.
pub trait MarshalText: Sized + 'static {
    const TYPE_NAME: &'static str;

    fn marshal_text(&self) -> String;
    fn unmarshal_text(text: &str) -> Result<Self, FieldError>;
}

fn bad_text(text: &str) -> FieldError {
    FieldError::value_error("", format!("{text:?}"))
}

impl MarshalText for i64 {
    const TYPE_NAME: &'static str = "Int";

    fn marshal_text(&self) -> String {
        self.to_string()
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        text.parse().map_err(|_| bad_text(text))
    }
}

impl MarshalText for f64 {
    const TYPE_NAME: &'static str = "Float";

    fn marshal_text(&self) -> String {
        // `{:?}` keeps the decimal point: 93784.0 stays "93784.0".
        format!("{self:?}")
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        text.parse().map_err(|_| bad_text(text))
    }
}

impl MarshalText for bool {
    const TYPE_NAME: &'static str = "Bool";

    fn marshal_text(&self) -> String {
        self.to_string()
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        text.parse().map_err(|_| bad_text(text))
    }
}

impl MarshalText for String {
    const TYPE_NAME: &'static str = "Text";

    fn marshal_text(&self) -> String {
        self.clone()
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        Ok(text.to_string())
    }
}

impl MarshalText for NaiveDate {
    const TYPE_NAME: &'static str = "Date";

    fn marshal_text(&self) -> String {
        self.format(DATE_FORMAT).to_string()
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| bad_text(text))
    }
}

impl MarshalText for NaiveDateTime {
    const TYPE_NAME: &'static str = "DateTime";

    fn marshal_text(&self) -> String {
        // No fractional seconds, no zone.
        self.format(DATETIME_FORMAT).to_string()
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        NaiveDateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|_| bad_text(text))
    }
}

impl MarshalText for TimeDelta {
    const TYPE_NAME: &'static str = "Duration";

    fn marshal_text(&self) -> String {
        let seconds = self.num_seconds() as f64 + self.subsec_nanos() as f64 / 1e9;
        format!("{seconds:?}")
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        let seconds: f64 = text.parse().map_err(|_| bad_text(text))?;
        let nanos = seconds * 1e9;
        if !nanos.is_finite() || nanos.abs() >= i64::MAX as f64 {
            return Err(bad_text(text));
        }
        Ok(TimeDelta::nanoseconds(nanos.round() as i64))
    }
}

impl MarshalText for Decimal {
    const TYPE_NAME: &'static str = "Decimal";

    fn marshal_text(&self) -> String {
        self.to_string()
    }

    fn unmarshal_text(text: &str) -> Result<Self, FieldError> {
        text.parse().map_err(|_| bad_text(text))
    }
}

struct CustomMarshaller {
    type_name: &'static str,
    to_text: Box<dyn Fn(&dyn Any) -> Option<String> + Send + Sync>,
    from_text: Box<dyn Fn(&str) -> Result<Box<dyn Any + Send + Sync>, FieldError> + Send + Sync>,
}

// Process-wide override table. Expected to be populated during program
// initialization; steady-state registration must be externally
// synchronized (see the crate docs).
static CUSTOM_MARSHALLERS: LazyLock<RwLock<HashMap<TypeId, CustomMarshaller>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Override the wire form of `T` until [`unregister_marshaller`] runs.
pub fn register_marshaller<T: Any + Send + Sync>(
    to_text: impl Fn(&T) -> String + Send + Sync + 'static,
    from_text: impl Fn(&str) -> Result<T, FieldError> + Send + Sync + 'static,
) {
    let type_name = std::any::type_name::<T>();
    let marshaller = CustomMarshaller {
        type_name,
        to_text: Box::new(move |value| value.downcast_ref::<T>().map(&to_text)),
        from_text: Box::new(move |text| {
            from_text(text).map(|value| Box::new(value) as Box<dyn Any + Send + Sync>)
        }),
    };
    tracing::debug!(type_name, "registering custom marshaller");
    CUSTOM_MARSHALLERS
        .write()
        .unwrap()
        .insert(TypeId::of::<T>(), marshaller);
}

/// Remove the override for `T`. Errors if none is registered.
pub fn unregister_marshaller<T: Any>() -> Result<(), FieldError> {
    let removed = CUSTOM_MARSHALLERS.write().unwrap().remove(&TypeId::of::<T>());
    match removed {
        Some(marshaller) => {
            tracing::debug!(type_name = marshaller.type_name, "unregistered custom marshaller");
            Ok(())
        }
        None => Err(FieldError::CannotMarshal {
            type_name: std::any::type_name::<T>(),
        }),
    }
}

/// Marshal a value to its text wire form, honoring any registered override.
pub fn marshal<T: MarshalText + Any>(value: &T) -> String {
    if let Some(custom) = CUSTOM_MARSHALLERS.read().unwrap().get(&TypeId::of::<T>()) {
        if let Some(text) = (custom.to_text)(value) {
            return text;
        }
    }
    value.marshal_text()
}

/// Parse a value from its text wire form, honoring any registered override.
pub fn unmarshal<T: MarshalText + Any>(text: &str) -> Result<T, FieldError> {
    let custom_result = {
        let guard = CUSTOM_MARSHALLERS.read().unwrap();
        match guard.get(&TypeId::of::<T>()) {
            Some(custom) => Some((custom.from_text)(text)),
            None => None,
        }
    };
    match custom_result {
        Some(result) => match result?.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(_) => T::unmarshal_text(text),
        },
        None => T::unmarshal_text(text),
    }
}

/// Registers a marshaller override on construction and removes it when
/// dropped, whatever the exit path.
#[must_use = "the override is removed as soon as the guard drops"]
pub struct ScopedMarshaller {
    type_id: TypeId,
    type_name: &'static str,
}

impl ScopedMarshaller {
    pub fn new<T: Any + Send + Sync>(
        to_text: impl Fn(&T) -> String + Send + Sync + 'static,
        from_text: impl Fn(&str) -> Result<T, FieldError> + Send + Sync + 'static,
    ) -> Self {
        register_marshaller(to_text, from_text);
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }
}

impl Drop for ScopedMarshaller {
    fn drop(&mut self) {
        CUSTOM_MARSHALLERS.write().unwrap().remove(&self.type_id);
        tracing::debug!(type_name = self.type_name, "scoped marshaller released");
    }
}
