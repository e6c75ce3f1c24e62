use convert_case::Casing;
use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{Fields, Ident, ItemStruct, Type, parse_macro_input};

use crate::pipeline::FieldPipeline;
use crate::utils::extract_option_inner;

struct RecordField {
    ident: Ident,
    /// The declared type, `Option<T>` included.
    ty: Type,
    /// `T` for `Option<T>` fields, the declared type otherwise.
    inner_ty: Type,
    nullable: bool,
    pipeline: FieldPipeline,
    /// Attributes kept on the emitted struct field (docs etc).
    attrs: Vec<syn::Attribute>,
}

pub fn impl_record(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    match expand_record(input) {
        Ok(tokens) => tokens.into(),
        Err(error) => error.to_compile_error().into(),
    }
}

fn expand_record(input: ItemStruct) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let name_str = name.to_string();
    let vis = &input.vis;
    let struct_attrs = &input.attrs;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "record types may not be generic",
        ));
    }

    let Fields::Named(ref fields_named) = input.fields else {
        return Err(syn::Error::new_spanned(
            &input.fields,
            "the record attribute only works on structs with named fields",
        ));
    };

    let mut fields = Vec::new();
    for field in &fields_named.named {
        let ident = field.ident.clone().expect("named field");
        let nullable = extract_option_inner(&field.ty).is_some();
        let inner_ty = extract_option_inner(&field.ty).unwrap_or(&field.ty).clone();
        let pipeline = FieldPipeline::from_attrs(&field.attrs, nullable)?;
        let attrs = field
            .attrs
            .iter()
            .filter(|attr| !attr.path().is_ident("field"))
            .cloned()
            .collect();
        fields.push(RecordField {
            ident,
            ty: field.ty.clone(),
            inner_ty,
            nullable,
            pipeline,
            attrs,
        });
    }

    // The fixed field ordering: non-nullable fields first, then
    // lexicographic. Drives the constructor signature, FIELDS, repr,
    // ordering and hashing.
    let mut ordered: Vec<&RecordField> = fields.iter().collect();
    ordered.sort_by_key(|field| (field.nullable, field.ident.to_string()));

    // --- Struct (fields privatized) and accessors ---

    let struct_fields = fields.iter().map(|field| {
        let attrs = &field.attrs;
        let ident = &field.ident;
        let ty = &field.ty;
        quote! {
            #(#attrs)*
            #ident: #ty
        }
    });

    let accessors = fields.iter().map(|field| {
        let ident = &field.ident;
        let inner_ty = &field.inner_ty;
        if field.nullable {
            quote! {
                pub fn #ident(&self) -> Option<&#inner_ty> {
                    self.#ident.as_ref()
                }
            }
        } else {
            quote! {
                pub fn #ident(&self) -> &#inner_ty {
                    &self.#ident
                }
            }
        }
    });

    // --- Positional constructor, pipeline inlined per field ---

    let new_params = ordered.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! { #ident: #ty }
    });

    let pipeline_stmts = ordered.iter().map(|field| {
        let ident = &field.ident;
        let description = format!("{name_str}.{}", ident);
        let stmts = field.pipeline.handling_stmts(ident, &description);
        if field.pipeline.rebinds() {
            quote! {
                let mut #ident = #ident;
                #stmts
            }
        } else {
            stmts
        }
    });

    let all_idents: Vec<&Ident> = fields.iter().map(|field| &field.ident).collect();
    let ordered_idents: Vec<&Ident> = ordered.iter().map(|field| &field.ident).collect();

    // --- Type-state builder: non-nullable fields hold a generic slot that
    // starts at Unset; finish() only exists once every slot is concrete ---

    let builder_name = Ident::new(&format!("{name}Builder"), Span::call_site());

    let required: Vec<&&RecordField> = ordered.iter().filter(|field| !field.nullable).collect();

    let builder_generics: Vec<Ident> = required
        .iter()
        .map(|field| {
            Ident::new(
                &format!(
                    "T{}",
                    field.ident.to_string().to_case(convert_case::Case::Pascal)
                ),
                Span::call_site(),
            )
        })
        .collect();

    let builder_generic_defaults = builder_generics.iter().map(|generic| {
        quote! { #generic = tabula::Unset }
    });

    let builder_struct_fields = ordered.iter().map(|field| {
        let ident = &field.ident;
        if field.nullable {
            let ty = &field.ty;
            quote! { #ident: #ty }
        } else {
            let position = required
                .iter()
                .position(|required| required.ident == field.ident)
                .expect("non-nullable field is required");
            let generic = &builder_generics[position];
            quote! { #ident: #generic }
        }
    });

    let builder_init_fields = ordered.iter().map(|field| {
        let ident = &field.ident;
        if field.nullable {
            quote! { #ident: None }
        } else {
            quote! { #ident: tabula::Unset }
        }
    });

    let builder_setters = ordered.iter().map(|field| {
        let ident = &field.ident;
        let inner_ty = &field.inner_ty;
        if field.nullable {
            quote! {
                pub fn #ident(mut self, value: impl Into<#inner_ty>) -> Self {
                    self.#ident = Some(value.into());
                    self
                }
            }
        } else {
            let position = required
                .iter()
                .position(|required| required.ident == field.ident)
                .expect("non-nullable field is required");
            let return_generics = required.iter().enumerate().map(|(i, required)| {
                if i == position {
                    let concrete = &required.inner_ty;
                    quote! { #concrete }
                } else {
                    let generic = &builder_generics[i];
                    quote! { #generic }
                }
            });
            let moved_fields = ordered.iter().map(|moved| {
                let moved_ident = &moved.ident;
                if moved.ident == field.ident {
                    quote! { #moved_ident: value.into() }
                } else {
                    quote! { #moved_ident: self.#moved_ident }
                }
            });
            quote! {
                pub fn #ident(self, value: impl Into<#inner_ty>) -> #builder_name<#(#return_generics),*> {
                    #builder_name {
                        #(#moved_fields),*
                    }
                }
            }
        }
    });

    let builder_concrete_types: Vec<&Type> = required.iter().map(|field| &field.inner_ty).collect();

    // --- Derivation builder: seeded from an instance, re-validates ---

    let derive_name = Ident::new(&format!("{name}Derive"), Span::call_site());

    let derive_struct_fields = ordered.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        quote! { #ident: #ty }
    });

    let derive_seed_fields = ordered.iter().map(|field| {
        let ident = &field.ident;
        quote! { #ident: self.#ident.clone() }
    });

    let derive_setters = ordered.iter().map(|field| {
        let ident = &field.ident;
        let inner_ty = &field.inner_ty;
        let setter = if field.nullable {
            quote! {
                pub fn #ident(mut self, value: impl Into<#inner_ty>) -> Self {
                    self.#ident = Some(value.into());
                    self
                }
            }
        } else {
            quote! {
                pub fn #ident(mut self, value: impl Into<#inner_ty>) -> Self {
                    self.#ident = value.into();
                    self
                }
            }
        };
        if field.nullable {
            let clear_ident = Ident::new(&format!("clear_{ident}"), Span::call_site());
            quote! {
                #setter

                pub fn #clear_ident(mut self) -> Self {
                    self.#ident = None;
                    self
                }
            }
        } else {
            setter
        }
    });

    // --- Record impl: field table and the plain codec ---

    let field_defs = ordered.iter().map(|field| {
        let field_name = field.ident.to_string();
        let inner_ty = &field.inner_ty;
        let nullable = field.nullable;
        quote! {
            tabula::FieldDef {
                name: #field_name,
                kind: <#inner_ty as tabula::PlainValue>::KIND,
                nullable: #nullable,
            }
        }
    });

    let to_plain_stmts = ordered.iter().map(|field| {
        let ident = &field.ident;
        let field_name = field.ident.to_string();
        if field.nullable {
            // Null values of nullable fields are omitted from the map.
            quote! {
                if let Some(value) = &self.#ident {
                    map.insert(#field_name, tabula::PlainValue::to_plain(value));
                }
            }
        } else {
            quote! {
                map.insert(#field_name, tabula::PlainValue::to_plain(&self.#ident));
            }
        }
    });

    let from_plain_stmts = ordered.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let field_name = field.ident.to_string();
        let description = format!("{name_str}.{}", ident);
        if field.nullable {
            quote! {
                let #ident: #ty = match __tabula_map.get(#field_name) {
                    None | Some(tabula::Plain::Null) => None,
                    Some(value) => Some(
                        tabula::PlainValue::from_plain(value)
                            .map_err(|error| error.at(#description))?,
                    ),
                };
            }
        } else {
            quote! {
                let #ident: #ty = match __tabula_map.get(#field_name) {
                    None | Some(tabula::Plain::Null) => {
                        return Err(tabula::FieldError::not_nullable(#description));
                    }
                    Some(value) => tabula::PlainValue::from_plain(value)
                        .map_err(|error| error.at(#description))?,
                };
            }
        }
    });

    // --- Keyed ordering, hashing, textual form ---

    let cmp_chain = ordered.iter().map(|field| {
        let ident = &field.ident;
        quote! {
            .then_with(|| tabula::ValueOrd::value_cmp(&self.#ident, &other.#ident))
        }
    });

    let hash_stmts = ordered.iter().map(|field| {
        let ident = &field.ident;
        quote! {
            tabula::ValueHash::value_hash(&self.#ident, state);
        }
    });

    let debug_stmts = ordered.iter().enumerate().map(|(i, field)| {
        let ident = &field.ident;
        let label = if i == 0 {
            format!("{}=", ident)
        } else {
            format!(", {}=", ident)
        };
        if field.nullable {
            quote! {
                f.write_str(#label)?;
                match &self.#ident {
                    Some(value) => write!(f, "{:?}", value)?,
                    None => f.write_str("None")?,
                }
            }
        } else {
            quote! {
                f.write_str(#label)?;
                write!(f, "{:?}", &self.#ident)?;
            }
        }
    });

    let repr_open = format!("{name_str}(");

    // --- Registry entry ---

    let registry_ident = Ident::new(
        &format!(
            "__TABULA_TYPE_{}",
            name_str.to_case(convert_case::Case::UpperSnake)
        ),
        Span::call_site(),
    );

    Ok(quote! {
        #(#struct_attrs)*
        #[derive(Clone)]
        #vis struct #name {
            #(#struct_fields),*
        }

        impl #name {
            #(#accessors)*

            /// Validating positional constructor, arguments in field
            /// order: non-nullable fields first, then lexicographic.
            pub fn new(#(#new_params),*) -> Result<Self, tabula::FieldError> {
                #(#pipeline_stmts)*
                Ok(Self { #(#all_idents),* })
            }

            pub fn build() -> #builder_name {
                #builder_name {
                    #(#builder_init_fields),*
                }
            }

            /// A new instance with some fields replaced; everything else
            /// is copied and the pipeline runs again on the result.
            pub fn derive(&self) -> #derive_name {
                #derive_name {
                    #(#derive_seed_fields),*
                }
            }

            /// The plain form: a map keyed by field name. Null values of
            /// nullable fields are omitted.
            pub fn to_plain(&self) -> tabula::Plain {
                let mut map = tabula::PlainMap::new();
                #(#to_plain_stmts)*
                tabula::Plain::Map(map)
            }

            /// Reads each declared field by name (absent means null) and
            /// feeds the values through the constructor pipeline. Unknown
            /// keys are ignored.
            pub fn from_plain(plain: &tabula::Plain) -> Result<Self, tabula::FieldError> {
                let __tabula_map = match plain {
                    tabula::Plain::Map(map) => map,
                    other => return Err(tabula::FieldError::type_mismatch(#name_str, other)),
                };
                #(#from_plain_stmts)*
                Self::new(#(#ordered_idents),*)
            }
        }

        #[derive(Clone)]
        #vis struct #builder_name<#(#builder_generic_defaults),*> {
            #(#builder_struct_fields),*
        }

        impl<#(#builder_generics),*> #builder_name<#(#builder_generics),*> {
            #(#builder_setters)*
        }

        impl #builder_name<#(#builder_concrete_types),*> {
            pub fn finish(self) -> Result<#name, tabula::FieldError> {
                #name::new(#(self.#ordered_idents),*)
            }
        }

        #[derive(Clone)]
        #vis struct #derive_name {
            #(#derive_struct_fields),*
        }

        impl #derive_name {
            #(#derive_setters)*

            pub fn finish(self) -> Result<#name, tabula::FieldError> {
                #name::new(#(self.#ordered_idents),*)
            }
        }

        impl tabula::Record for #name {
            const NAME: &'static str = #name_str;

            const FIELDS: &'static [tabula::FieldDef] = &[
                #(#field_defs),*
            ];

            fn to_plain(&self) -> tabula::Plain {
                #name::to_plain(self)
            }

            fn from_plain(plain: &tabula::Plain) -> Result<Self, tabula::FieldError> {
                #name::from_plain(plain)
            }
        }

        impl tabula::PlainValue for #name {
            const KIND: tabula::PlainKind = tabula::PlainKind::Record(#name_str);

            fn to_plain(&self) -> tabula::Plain {
                #name::to_plain(self)
            }

            fn from_plain(plain: &tabula::Plain) -> Result<Self, tabula::FieldError> {
                #name::from_plain(plain)
            }
        }

        impl PartialEq for #name {
            fn eq(&self, other: &Self) -> bool {
                std::cmp::Ord::cmp(self, other).is_eq()
            }
        }

        impl Eq for #name {}

        impl PartialOrd for #name {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(std::cmp::Ord::cmp(self, other))
            }
        }

        impl Ord for #name {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ordering::Equal
                    #(#cmp_chain)*
            }
        }

        impl std::hash::Hash for #name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                #(#hash_stmts)*
            }
        }

        impl tabula::ValueOrd for #name {
            fn value_cmp(&self, other: &Self) -> std::cmp::Ordering {
                std::cmp::Ord::cmp(self, other)
            }
        }

        impl tabula::ValueHash for #name {
            fn value_hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(self, state);
            }
        }

        impl std::fmt::Debug for #name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(#repr_open)?;
                #(#debug_stmts)*
                f.write_str(")")
            }
        }

        impl tabula::AnyRecord for #name {
            fn type_name(&self) -> &'static str {
                <Self as tabula::Record>::NAME
            }

            fn to_plain(&self) -> tabula::Plain {
                #name::to_plain(self)
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
            name: #name_str,
            fields: <#name as tabula::Record>::FIELDS,
            from_plain: |plain| {
                <#name as tabula::Record>::from_plain(plain)
                    .map(|record| Box::new(record) as Box<dyn tabula::AnyRecord>)
            },
        };
    })
}
