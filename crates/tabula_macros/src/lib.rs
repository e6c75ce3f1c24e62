use proc_macro::TokenStream;

mod collections;
mod pipeline;
mod record;
mod utils;

/// Compiles a named struct into an immutable, validated record type.
///
/// Nullability comes from `Option<T>`; per-field options ride on
/// `#[field(default = …, coerce = …, check = …)]`.
#[proc_macro_attribute]
pub fn record(args: TokenStream, item: TokenStream) -> TokenStream {
    record::impl_record(args, item)
}

/// Mints a named, immutable, ordered sequence type validating each
/// element: `seq_of!(pub i64)` defines `IntSeq`.
#[proc_macro]
pub fn seq_of(input: TokenStream) -> TokenStream {
    collections::impl_seq_of(input)
}

/// A sequence that must hold exactly two elements:
/// `pair_of!(pub f64)` defines `FloatPair`.
#[proc_macro]
pub fn pair_of(input: TokenStream) -> TokenStream {
    collections::impl_pair_of(input)
}

/// An immutable set; duplicates coalesce, iteration is sorted:
/// `set_of!(pub String)` defines `TextSet`.
#[proc_macro]
pub fn set_of(input: TokenStream) -> TokenStream {
    collections::impl_set_of(input)
}

/// An immutable map with validated keys and values:
/// `dict_of!(pub String => i64)` defines `TextToIntDict`.
#[proc_macro]
pub fn dict_of(input: TokenStream) -> TokenStream {
    collections::impl_dict_of(input)
}
