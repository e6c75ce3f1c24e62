use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Expr, Ident, Token, Type, Visibility, parse_macro_input};

use crate::pipeline::FieldPipeline;
use crate::utils::{extract_option_inner, type_display_name};

// Each invocation mints a brand-new nominal type: two `seq_of!(pub i64)`
// calls in different modules are distinct types that happen to share a
// simple name. Identity is nominal, not structural.

/// `vis ElemType [, default = …] [, coerce = …] [, check = …]`
struct ListyInput {
    vis: Visibility,
    elem: Type,
    options: Vec<(Ident, Expr)>,
}

impl Parse for ListyInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let vis: Visibility = input.parse()?;
        let elem: Type = input.parse()?;
        let options = parse_options(input)?;
        Ok(ListyInput { vis, elem, options })
    }
}

/// `vis KeyType => ValueType [, key_… = …] [, value_… = …]`
struct DictInput {
    vis: Visibility,
    key: Type,
    value: Type,
    options: Vec<(Ident, Expr)>,
}

impl Parse for DictInput {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        let vis: Visibility = input.parse()?;
        let key: Type = input.parse()?;
        input.parse::<Token![=>]>()?;
        let value: Type = input.parse()?;
        let options = parse_options(input)?;
        Ok(DictInput {
            vis,
            key,
            value,
            options,
        })
    }
}

fn parse_options(input: ParseStream) -> syn::Result<Vec<(Ident, Expr)>> {
    let mut options = Vec::new();
    while input.peek(Token![,]) {
        input.parse::<Token![,]>()?;
        if input.is_empty() {
            break;
        }
        let ident: Ident = input.parse()?;
        input.parse::<Token![=]>()?;
        let expr: Expr = input.parse()?;
        options.push((ident, expr));
    }
    Ok(options)
}

fn pipeline_from_options(
    options: Vec<(Ident, Expr)>,
    prefix: Option<&str>,
    nullable: bool,
) -> syn::Result<FieldPipeline> {
    let mut pipeline = FieldPipeline {
        nullable,
        ..FieldPipeline::default()
    };
    let key_of = |name: &str| match prefix {
        Some(prefix) => format!("{prefix}_{name}"),
        None => name.to_string(),
    };
    for (ident, expr) in options {
        let name = ident.to_string();
        if name == key_of("default") {
            if !nullable {
                return Err(syn::Error::new_spanned(
                    ident,
                    "a default only applies to a nullable (Option) element",
                ));
            }
            pipeline.default = Some(expr);
        } else if name == key_of("coerce") {
            pipeline.coerce = Some(expr);
        } else if name == key_of("check") {
            pipeline.check = Some(expr);
        } else {
            return Err(syn::Error::new_spanned(
                ident,
                format!("unknown collection option {name:?}"),
            ));
        }
    }
    Ok(pipeline)
}

fn split_options(
    options: Vec<(Ident, Expr)>,
) -> (Vec<(Ident, Expr)>, Vec<(Ident, Expr)>, Vec<(Ident, Expr)>) {
    let mut keys = Vec::new();
    let mut values = Vec::new();
    let mut rest = Vec::new();
    for (ident, expr) in options {
        let name = ident.to_string();
        if name.starts_with("key_") {
            keys.push((ident, expr));
        } else if name.starts_with("value_") {
            values.push((ident, expr));
        } else {
            rest.push((ident, expr));
        }
    }
    (keys, values, rest)
}

enum ListyKind {
    Seq,
    Pair,
    Set,
}

impl ListyKind {
    fn suffix(&self) -> &'static str {
        match self {
            ListyKind::Seq => "Seq",
            ListyKind::Pair => "Pair",
            ListyKind::Set => "Set",
        }
    }
}

pub fn impl_seq_of(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ListyInput);
    expand(expand_listy(ListyKind::Seq, input))
}

pub fn impl_pair_of(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ListyInput);
    expand(expand_listy(ListyKind::Pair, input))
}

pub fn impl_set_of(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ListyInput);
    expand(expand_listy(ListyKind::Set, input))
}

pub fn impl_dict_of(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DictInput);
    expand(expand_dict(input))
}

fn expand(result: syn::Result<proc_macro2::TokenStream>) -> TokenStream {
    match result {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand_listy(kind: ListyKind, input: ListyInput) -> syn::Result<proc_macro2::TokenStream> {
    let vis = &input.vis;
    let elem_storage = &input.elem;
    let nullable = extract_option_inner(elem_storage).is_some();
    let elem_inner = extract_option_inner(elem_storage).unwrap_or(elem_storage).clone();

    let coll_str = format!("{}{}", type_display_name(&elem_inner)?, kind.suffix());
    let coll_name = Ident::new(&coll_str, Span::call_site());

    let pipeline = pipeline_from_options(input.options, None, nullable)?;
    let elem_var = Ident::new("elem", Span::call_site());
    let elem_stmts = pipeline.handling_stmts(&elem_var, "[elem]");
    let elem_rebind = if pipeline.rebinds() {
        quote! { let mut elem = elem; }
    } else {
        quote! {}
    };

    let shape_stmts = match kind {
        ListyKind::Seq => quote! {},
        ListyKind::Pair => quote! {
            if checked.len() != 2 {
                return Err(tabula::FieldError::PairLength { count: checked.len() });
            }
        },
        // Sets coalesce duplicates and keep their elements sorted; repr,
        // hashing and ordering all see the sorted sequence.
        ListyKind::Set => quote! {
            checked.sort_by(|a, b| tabula::ValueOrd::value_cmp(a, b));
            checked.dedup_by(|a, b| tabula::ValueOrd::value_cmp(a, b).is_eq());
        },
    };

    let kind_variant = match kind {
        ListyKind::Seq => quote! { Seq },
        ListyKind::Pair => quote! { Pair },
        ListyKind::Set => quote! { Set },
    };

    let indexed_api = match kind {
        ListyKind::Set => quote! {
            pub fn contains(&self, elem: &#elem_storage) -> bool {
                self.0
                    .binary_search_by(|probe| tabula::ValueOrd::value_cmp(probe, elem))
                    .is_ok()
            }
        },
        _ => quote! {
            pub fn get(&self, index: usize) -> Option<&#elem_storage> {
                self.0.get(index)
            }

            pub fn as_slice(&self) -> &[#elem_storage] {
                self.0.as_slice()
            }
        },
    };

    let index_impl = match kind {
        ListyKind::Set => quote! {},
        _ => quote! {
            impl std::ops::Index<usize> for #coll_name {
                type Output = #elem_storage;

                fn index(&self, index: usize) -> &#elem_storage {
                    &self.0[index]
                }
            }
        },
    };

    let (debug_open, debug_close) = match kind {
        ListyKind::Set => (format!("{coll_str}{{"), "}"),
        _ => (format!("{coll_str}("), ")"),
    };

    let debug_elem = if nullable {
        quote! {
            match elem {
                Some(value) => write!(f, "{:?}", value)?,
                None => f.write_str("None")?,
            }
        }
    } else {
        quote! { write!(f, "{:?}", elem)?; }
    };

    let registry_ident = registry_ident(&coll_str);

    Ok(quote! {
        #[derive(Clone)]
        #vis struct #coll_name(Vec<#elem_storage>);

        impl #coll_name {
            pub const ELEMENT_FIELD: tabula::FieldDef = tabula::FieldDef {
                name: "[elem]",
                kind: <#elem_inner as tabula::PlainValue>::KIND,
                nullable: #nullable,
            };

            /// Validates every element with the field pipeline; any finite
            /// iterable is accepted.
            pub fn new(
                elems: impl IntoIterator<Item = #elem_storage>,
            ) -> Result<Self, tabula::FieldError> {
                let mut checked: Vec<#elem_storage> = Vec::new();
                for elem in elems {
                    #elem_rebind
                    #elem_stmts
                    checked.push(elem);
                }
                #shape_stmts
                Ok(Self(checked))
            }

            pub fn element_field() -> &'static tabula::FieldDef {
                &Self::ELEMENT_FIELD
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, #elem_storage> {
                self.0.iter()
            }

            #indexed_api

            pub fn to_plain(&self) -> tabula::Plain {
                tabula::Plain::List(
                    self.0
                        .iter()
                        .map(|elem| tabula::PlainValue::to_plain(elem))
                        .collect(),
                )
            }

            pub fn from_plain(plain: &tabula::Plain) -> Result<Self, tabula::FieldError> {
                match plain {
                    tabula::Plain::List(items) => {
                        let mut elems: Vec<#elem_storage> = Vec::with_capacity(items.len());
                        for item in items {
                            elems.push(
                                tabula::PlainValue::from_plain(item)
                                    .map_err(|error| error.at("[elem]"))?,
                            );
                        }
                        Self::new(elems)
                    }
                    other => Err(tabula::FieldError::type_mismatch(#coll_str, other)),
                }
            }
        }

        impl<'a> IntoIterator for &'a #coll_name {
            type Item = &'a #elem_storage;
            type IntoIter = std::slice::Iter<'a, #elem_storage>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        #index_impl

        impl tabula::PlainValue for #coll_name {
            const KIND: tabula::PlainKind = tabula::PlainKind::#kind_variant {
                name: #coll_str,
                elem: &Self::ELEMENT_FIELD,
            };

            fn to_plain(&self) -> tabula::Plain {
                #coll_name::to_plain(self)
            }

            fn from_plain(plain: &tabula::Plain) -> Result<Self, tabula::FieldError> {
                #coll_name::from_plain(plain)
            }
        }

        impl PartialEq for #coll_name {
            fn eq(&self, other: &Self) -> bool {
                std::cmp::Ord::cmp(self, other).is_eq()
            }
        }

        impl Eq for #coll_name {}

        impl PartialOrd for #coll_name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(std::cmp::Ord::cmp(self, other))
            }
        }

        impl Ord for #coll_name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                tabula::ValueOrd::value_cmp(&self.0, &other.0)
            }
        }

        impl std::hash::Hash for #coll_name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                tabula::ValueHash::value_hash(&self.0, state);
            }
        }

        impl tabula::ValueOrd for #coll_name {
            fn value_cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ord::cmp(self, other)
            }
        }

        impl tabula::ValueHash for #coll_name {
            fn value_hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(self, state);
            }
        }

        impl std::fmt::Debug for #coll_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(#debug_open)?;
                for (i, elem) in self.0.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    #debug_elem
                }
                f.write_str(#debug_close)
            }
        }

        impl tabula::AnyRecord for #coll_name {
            fn type_name(&self) -> &'static str {
                #coll_str
            }

            fn to_plain(&self) -> tabula::Plain {
                tabula::PlainValue::to_plain(self)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }
        }

        #[tabula::linkme::distributed_slice(tabula::RECORD_TYPES)]
        #[linkme(crate = tabula::linkme)]
        static #registry_ident: tabula::TypeEntry = tabula::TypeEntry {
            name: #coll_str,
            fields: &[#coll_name::ELEMENT_FIELD],
            from_plain: |plain| {
                <#coll_name as tabula::PlainValue>::from_plain(plain)
                    .map(|coll| Box::new(coll) as Box<dyn tabula::AnyRecord>)
            },
        };
    })
}

fn expand_dict(input: DictInput) -> syn::Result<proc_macro2::TokenStream> {
    let vis = &input.vis;
    let key_ty = &input.key;
    let value_storage = &input.value;

    if extract_option_inner(key_ty).is_some() {
        return Err(syn::Error::new_spanned(
            key_ty,
            "dict keys cannot be nullable",
        ));
    }
    let value_nullable = extract_option_inner(value_storage).is_some();
    let value_inner = extract_option_inner(value_storage)
        .unwrap_or(value_storage)
        .clone();

    let coll_str = format!(
        "{}To{}Dict",
        type_display_name(key_ty)?,
        type_display_name(&value_inner)?,
    );
    let coll_name = Ident::new(&coll_str, Span::call_site());

    let (key_options, value_options, rest) = split_options(input.options);
    if let Some((ident, _)) = rest.first() {
        return Err(syn::Error::new_spanned(
            ident,
            "dict options must be prefixed key_ or value_",
        ));
    }
    let key_pipeline = pipeline_from_options(key_options, Some("key"), false)?;
    let value_pipeline = pipeline_from_options(value_options, Some("value"), value_nullable)?;

    let key_var = Ident::new("key", Span::call_site());
    let value_var = Ident::new("value", Span::call_site());
    let key_stmts = key_pipeline.handling_stmts(&key_var, "<key>");
    let value_stmts = value_pipeline.handling_stmts(&value_var, "<value>");
    let key_rebind = if key_pipeline.rebinds() {
        quote! { let mut key = key; }
    } else {
        quote! {}
    };
    let value_rebind = if value_pipeline.rebinds() {
        quote! { let mut value = value; }
    } else {
        quote! {}
    };

    let debug_value = if value_nullable {
        quote! {
            match value {
                Some(value) => write!(f, "{:?}", value)?,
                None => f.write_str("None")?,
            }
        }
    } else {
        quote! { write!(f, "{:?}", value)?; }
    };

    let debug_open = format!("{coll_str}{{");
    let registry_ident = registry_ident(&coll_str);

    Ok(quote! {
        #[derive(Clone)]
        #vis struct #coll_name(Vec<(#key_ty, #value_storage)>);

        impl #coll_name {
            pub const KEY_FIELD: tabula::FieldDef = tabula::FieldDef {
                name: "<key>",
                kind: <#key_ty as tabula::PlainValue>::KIND,
                nullable: false,
            };

            pub const VALUE_FIELD: tabula::FieldDef = tabula::FieldDef {
                name: "<value>",
                kind: <#value_inner as tabula::PlainValue>::KIND,
                nullable: #value_nullable,
            };

            /// Validates keys and values with their pipelines; a repeated
            /// key keeps its last value.
            pub fn new(
                entries: impl IntoIterator<Item = (#key_ty, #value_storage)>,
            ) -> Result<Self, tabula::FieldError> {
                let mut checked: Vec<(#key_ty, #value_storage)> = Vec::new();
                for (key, value) in entries {
                    #key_rebind
                    #value_rebind
                    #key_stmts
                    #value_stmts
                    match checked
                        .binary_search_by(|(probe, _)| tabula::ValueOrd::value_cmp(probe, &key))
                    {
                        Ok(index) => checked[index] = (key, value),
                        Err(index) => checked.insert(index, (key, value)),
                    }
                }
                Ok(Self(checked))
            }

            pub fn key_field() -> &'static tabula::FieldDef {
                &Self::KEY_FIELD
            }

            pub fn value_field() -> &'static tabula::FieldDef {
                &Self::VALUE_FIELD
            }

            pub fn get(&self, key: &#key_ty) -> Option<&#value_storage> {
                self.0
                    .binary_search_by(|(probe, _)| tabula::ValueOrd::value_cmp(probe, key))
                    .ok()
                    .map(|index| &self.0[index].1)
            }

            pub fn contains_key(&self, key: &#key_ty) -> bool {
                self.get(key).is_some()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, (#key_ty, #value_storage)> {
                self.0.iter()
            }

            pub fn keys(&self) -> impl Iterator<Item = &#key_ty> {
                self.0.iter().map(|(key, _)| key)
            }

            pub fn values(&self) -> impl Iterator<Item = &#value_storage> {
                self.0.iter().map(|(_, value)| value)
            }

            pub fn to_plain(&self) -> tabula::Plain {
                let mut map = tabula::PlainMap::new();
                for (key, value) in &self.0 {
                    map.insert(
                        tabula::PlainKey::to_key(key),
                        tabula::PlainValue::to_plain(value),
                    );
                }
                tabula::Plain::Map(map)
            }

            pub fn from_plain(plain: &tabula::Plain) -> Result<Self, tabula::FieldError> {
                match plain {
                    tabula::Plain::Map(map) => {
                        let mut entries: Vec<(#key_ty, #value_storage)> =
                            Vec::with_capacity(map.len());
                        for (key_text, value) in map.iter() {
                            let key: #key_ty = tabula::PlainKey::from_key(key_text)
                                .map_err(|error| error.at("<key>"))?;
                            let value: #value_storage = tabula::PlainValue::from_plain(value)
                                .map_err(|error| error.at("<value>"))?;
                            entries.push((key, value));
                        }
                        Self::new(entries)
                    }
                    other => Err(tabula::FieldError::type_mismatch(#coll_str, other)),
                }
            }
        }

        impl<'a> IntoIterator for &'a #coll_name {
            type Item = &'a (#key_ty, #value_storage);
            type IntoIter = std::slice::Iter<'a, (#key_ty, #value_storage)>;

            fn into_iter(self) -> Self::IntoIter {
                self.0.iter()
            }
        }

        impl tabula::PlainValue for #coll_name {
            const KIND: tabula::PlainKind = tabula::PlainKind::Dict {
                name: #coll_str,
                key: &Self::KEY_FIELD,
                value: &Self::VALUE_FIELD,
            };

            fn to_plain(&self) -> tabula::Plain {
                #coll_name::to_plain(self)
            }

            fn from_plain(plain: &tabula::Plain) -> Result<Self, tabula::FieldError> {
                #coll_name::from_plain(plain)
            }
        }

        impl PartialEq for #coll_name {
            fn eq(&self, other: &Self) -> bool {
                std::cmp::Ord::cmp(self, other).is_eq()
            }
        }

        impl Eq for #coll_name {}

        impl PartialOrd for #coll_name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(std::cmp::Ord::cmp(self, other))
            }
        }

        impl Ord for #coll_name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                tabula::ValueOrd::value_cmp(&self.0, &other.0)
            }
        }

        impl std::hash::Hash for #coll_name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                tabula::ValueHash::value_hash(&self.0, state);
            }
        }

        impl tabula::ValueOrd for #coll_name {
            fn value_cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ord::cmp(self, other)
            }
        }

        impl tabula::ValueHash for #coll_name {
            fn value_hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(self, state);
            }
        }

        impl std::fmt::Debug for #coll_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(#debug_open)?;
                for (i, (key, value)) in self.0.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: ", key)?;
                    #debug_value
                }
                f.write_str("}")
            }
        }

        impl tabula::AnyRecord for #coll_name {
            fn type_name(&self) -> &'static str {
                #coll_str
            }

            fn to_plain(&self) -> tabula::Plain {
                tabula::PlainValue::to_plain(self)
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }
        }

        #[tabula::linkme::distributed_slice(tabula::RECORD_TYPES)]
        #[linkme(crate = tabula::linkme)]
        static #registry_ident: tabula::TypeEntry = tabula::TypeEntry {
            name: #coll_str,
            fields: &[#coll_name::KEY_FIELD, #coll_name::VALUE_FIELD],
            from_plain: |plain| {
                <#coll_name as tabula::PlainValue>::from_plain(plain)
                    .map(|coll| Box::new(coll) as Box<dyn tabula::AnyRecord>)
            },
        };
    })
}

fn registry_ident(coll_str: &str) -> Ident {
    use convert_case::Casing;
    Ident::new(
        &format!(
            "__TABULA_TYPE_{}",
            coll_str.to_case(convert_case::Case::UpperSnake)
        ),
        Span::call_site(),
    )
}
