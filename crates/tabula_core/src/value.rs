use crate::{FieldError, Plain, PlainKind, marshal, unmarshal};

/// Conversion between a typed value and its plain-data node, plus the
/// static description of the node's shape.
///
/// Implemented here for the scalar kinds, `Option` (nullability) and `Box`
/// (recursion); generated for every record and collection type.
pub trait PlainValue: Sized {
    const KIND: PlainKind;

    fn to_plain(&self) -> Plain;
    fn from_plain(plain: &Plain) -> Result<Self, FieldError>;
}

impl PlainValue for bool {
    const KIND: PlainKind = PlainKind::Bool;

    fn to_plain(&self) -> Plain {
        Plain::Bool(*self)
    }

    fn from_plain(plain: &Plain) -> Result<Self, FieldError> {
        match plain {
            Plain::Bool(v) => Ok(*v),
            other => Err(FieldError::type_mismatch("Bool", other)),
        }
    }
}

impl PlainValue for i64 {
    const KIND: PlainKind = PlainKind::Int;

    fn to_plain(&self) -> Plain {
        Plain::Int(*self)
    }

    fn from_plain(plain: &Plain) -> Result<Self, FieldError> {
        match plain {
            Plain::Int(v) => Ok(*v),
            other => Err(FieldError::type_mismatch("Int", other)),
        }
    }
}

impl PlainValue for f64 {
    const KIND: PlainKind = PlainKind::Float;

    fn to_plain(&self) -> Plain {
        Plain::Float(*self)
    }

    fn from_plain(plain: &Plain) -> Result<Self, FieldError> {
        match plain {
            Plain::Float(v) => Ok(*v),
            // The one implicit promotion among the scalar kinds: a float
            // slot accepts an integer and widens it.
            Plain::Int(v) => Ok(*v as f64),
            other => Err(FieldError::type_mismatch("Float", other)),
        }
    }
}

impl PlainValue for String {
    const KIND: PlainKind = PlainKind::Text;

    fn to_plain(&self) -> Plain {
        Plain::Text(self.clone())
    }

    fn from_plain(plain: &Plain) -> Result<Self, FieldError> {
        match plain {
            Plain::Text(v) => Ok(v.clone()),
            other => Err(FieldError::type_mismatch("Text", other)),
        }
    }
}

impl PlainValue for Vec<u8> {
    const KIND: PlainKind = PlainKind::Bytes;

    fn to_plain(&self) -> Plain {
        Plain::Bytes(self.clone())
    }

    fn from_plain(plain: &Plain) -> Result<Self, FieldError> {
        match plain {
            Plain::Bytes(v) => Ok(v.clone()),
            // The JSON bridge renders bytes as a string of byte-sized code
            // points; accept that form back into a byte slot.
            Plain::Text(text) => crate::json::text_to_bytes(text)
                .map_err(|_| FieldError::type_mismatch("Bytes", plain)),
            other => Err(FieldError::type_mismatch("Bytes", other)),
        }
    }
}

impl<T: PlainValue> PlainValue for Option<T> {
    const KIND: PlainKind = T::KIND;

    fn to_plain(&self) -> Plain {
        match self {
            Some(value) => value.to_plain(),
            None => Plain::Null,
        }
    }

    fn from_plain(plain: &Plain) -> Result<Self, FieldError> {
        match plain {
            Plain::Null => Ok(None),
            other => T::from_plain(other).map(Some),
        }
    }
}

impl<T: PlainValue> PlainValue for Box<T> {
    const KIND: PlainKind = T::KIND;

    fn to_plain(&self) -> Plain {
        T::to_plain(self)
    }

    fn from_plain(plain: &Plain) -> Result<Self, FieldError> {
        T::from_plain(plain).map(Box::new)
    }
}

/// Text wire form for dict keys: the plain tree only has string-keyed
/// maps, so a key type must be textual or marshal to text.
pub trait PlainKey: Sized {
    fn to_key(&self) -> String;
    fn from_key(text: &str) -> Result<Self, FieldError>;
}

impl PlainKey for String {
    fn to_key(&self) -> String {
        marshal(self)
    }

    fn from_key(text: &str) -> Result<Self, FieldError> {
        unmarshal(text)
    }
}

impl PlainKey for i64 {
    fn to_key(&self) -> String {
        marshal(self)
    }

    fn from_key(text: &str) -> Result<Self, FieldError> {
        unmarshal(text)
    }
}

impl PlainKey for f64 {
    fn to_key(&self) -> String {
        marshal(self)
    }

    fn from_key(text: &str) -> Result<Self, FieldError> {
        unmarshal(text)
    }
}

impl PlainKey for bool {
    fn to_key(&self) -> String {
        marshal(self)
    }

    fn from_key(text: &str) -> Result<Self, FieldError> {
        unmarshal(text)
    }
}

/// Wires a [`MarshalText`](crate::MarshalText) implementor into the codec:
/// its plain form is its marshalled text, and it is usable as a dict key.
#[macro_export]
macro_rules! impl_plain_via_marshal {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $crate::PlainValue for $ty {
                const KIND: $crate::PlainKind =
                    $crate::PlainKind::Marshalled(<$ty as $crate::MarshalText>::TYPE_NAME);

                fn to_plain(&self) -> $crate::Plain {
                    $crate::Plain::Text($crate::marshal(self))
                }

                fn from_plain(plain: &$crate::Plain) -> Result<Self, $crate::FieldError> {
                    match plain {
                        $crate::Plain::Text(text) => $crate::unmarshal(text),
                        other => Err($crate::FieldError::type_mismatch(
                            <$ty as $crate::MarshalText>::TYPE_NAME,
                            other,
                        )),
                    }
                }
            }

            impl $crate::PlainKey for $ty {
                fn to_key(&self) -> String {
                    $crate::marshal(self)
                }

                fn from_key(text: &str) -> Result<Self, $crate::FieldError> {
                    $crate::unmarshal(text)
                }
            }
        )+
    };
}

impl_plain_via_marshal!(
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    chrono::TimeDelta,
    rust_decimal::Decimal,
);
