use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

/// Total order over field values, usable even where `Ord` is not
/// implemented (floats order by `total_cmp`). Generated record and
/// collection types chain this per field, in field order, to drive their
/// `Eq`, `Ord` and `Hash` impls.
pub trait ValueOrd {
    fn value_cmp(&self, other: &Self) -> Ordering;
}

/// Hash consistent with [`ValueOrd`]'s notion of equality.
pub trait ValueHash {
    fn value_hash<H: Hasher>(&self, state: &mut H);
}

macro_rules! impl_value_key_via_ord {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ValueOrd for $ty {
                fn value_cmp(&self, other: &Self) -> Ordering {
                    Ord::cmp(self, other)
                }
            }

            impl ValueHash for $ty {
                fn value_hash<H: Hasher>(&self, state: &mut H) {
                    Hash::hash(self, state);
                }
            }
        )+
    };
}

// u8 is here so Vec<u8> (the bytes kind) picks up the generic Vec impl.
impl_value_key_via_ord!(
    bool,
    u8,
    i64,
    String,
    chrono::NaiveDate,
    chrono::NaiveDateTime,
    rust_decimal::Decimal,
);

impl ValueOrd for chrono::TimeDelta {
    fn value_cmp(&self, other: &Self) -> Ordering {
        Ord::cmp(self, other)
    }
}

impl ValueHash for chrono::TimeDelta {
    fn value_hash<H: Hasher>(&self, state: &mut H) {
        state.write_i64(self.num_seconds());
        state.write_i32(self.subsec_nanos());
    }
}

impl ValueOrd for f64 {
    fn value_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

impl ValueHash for f64 {
    fn value_hash<H: Hasher>(&self, state: &mut H) {
        // Bit hashing matches total_cmp equality (-0.0 and 0.0 differ,
        // every NaN pattern is equal to itself).
        state.write_u64(self.to_bits());
    }
}

// Null sorts before any value.
impl<T: ValueOrd> ValueOrd for Option<T> {
    fn value_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => a.value_cmp(b),
        }
    }
}

impl<T: ValueHash> ValueHash for Option<T> {
    fn value_hash<H: Hasher>(&self, state: &mut H) {
        match self {
            None => state.write_u8(0),
            Some(value) => {
                state.write_u8(1);
                value.value_hash(state);
            }
        }
    }
}

impl<T: ValueOrd> ValueOrd for Box<T> {
    fn value_cmp(&self, other: &Self) -> Ordering {
        T::value_cmp(self, other)
    }
}

impl<T: ValueHash> ValueHash for Box<T> {
    fn value_hash<H: Hasher>(&self, state: &mut H) {
        T::value_hash(self, state);
    }
}

impl<T: ValueOrd> ValueOrd for Vec<T> {
    fn value_cmp(&self, other: &Self) -> Ordering {
        for (a, b) in self.iter().zip(other.iter()) {
            match a.value_cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.len().cmp(&other.len())
    }
}

impl<T: ValueHash> ValueHash for Vec<T> {
    fn value_hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for item in self {
            item.value_hash(state);
        }
    }
}

impl<K: ValueOrd, V: ValueOrd> ValueOrd for (K, V) {
    fn value_cmp(&self, other: &Self) -> Ordering {
        self.0
            .value_cmp(&other.0)
            .then_with(|| self.1.value_cmp(&other.1))
    }
}

impl<K: ValueHash, V: ValueHash> ValueHash for (K, V) {
    fn value_hash<H: Hasher>(&self, state: &mut H) {
        self.0.value_hash(state);
        self.1.value_hash(state);
    }
}
