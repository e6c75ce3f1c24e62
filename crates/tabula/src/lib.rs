pub use tabula_core::*;
pub use tabula_macros::*;

pub mod prelude {
    pub use crate::{
        Clean, DefaultCleaner, FieldDef, FieldError, MarshalText, Plain, PlainKey, PlainKind,
        PlainMap, PlainValue, Record, ValueHash, ValueOrd, dict_of, pair_of, record, seq_of,
        set_of,
    };
}

pub use tabula_core::linkme;
