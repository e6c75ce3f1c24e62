use proc_macro2::TokenStream;
use quote::quote;
use syn::{Attribute, Expr, Ident};

/// The optional pipeline steps one field (or one collection element)
/// declares. The generated constructor inlines only the steps that are
/// present; an unadorned field costs nothing beyond the move.
///
/// Shared between the record compiler and the collection constructors,
/// which must run the same sequence per element.
#[derive(Default)]
pub struct FieldPipeline {
    pub nullable: bool,
    pub default: Option<Expr>,
    pub coerce: Option<Expr>,
    pub check: Option<Expr>,
}

impl FieldPipeline {
    /// Parse `#[field(default = …, coerce = …, check = …)]` attributes.
    /// `nullable` is decided by the declared type, not by an option.
    pub fn from_attrs(attrs: &[Attribute], nullable: bool) -> syn::Result<Self> {
        let mut pipeline = FieldPipeline {
            nullable,
            ..FieldPipeline::default()
        };
        for attr in attrs {
            if !attr.path().is_ident("field") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    pipeline.default = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("coerce") {
                    pipeline.coerce = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("check") {
                    pipeline.check = Some(meta.value()?.parse()?);
                } else {
                    return Err(meta.error("unknown field option, expected default, coerce or check"));
                }
                Ok(())
            })?;
        }
        if pipeline.default.is_some() && !nullable {
            return Err(syn::Error::new_spanned(
                attrs
                    .iter()
                    .find(|attr| attr.path().is_ident("field"))
                    .expect("default came from a field attribute"),
                "a default only applies to a nullable (Option) field",
            ));
        }
        Ok(pipeline)
    }

    /// Whether the generated code rebinds the variable, so the caller
    /// knows to emit `let mut`.
    pub fn rebinds(&self) -> bool {
        self.default.is_some() || self.coerce.is_some()
    }

    /// The statements taking `var` through default injection, coercion and
    /// the predicate check. `var` is `T`, or `Option<T>` when nullable.
    /// `description` is the dotted path used in error messages.
    pub fn handling_stmts(&self, var: &Ident, description: &str) -> TokenStream {
        let mut stmts = TokenStream::new();
        if self.nullable {
            if let Some(default) = &self.default {
                stmts.extend(quote! {
                    if #var.is_none() {
                        #var = Some(#default);
                    }
                });
            }
            if let Some(coerce) = &self.coerce {
                stmts.extend(quote! {
                    #var = #var.map(#coerce);
                });
            }
            if let Some(check) = &self.check {
                stmts.extend(quote! {
                    if let Some(checked) = &#var {
                        if !(#check)(checked) {
                            return Err(tabula::FieldError::value_error(
                                #description,
                                format!("{:?}", checked),
                            ));
                        }
                    }
                });
            }
        } else {
            if let Some(coerce) = &self.coerce {
                stmts.extend(quote! {
                    #var = (#coerce)(#var);
                });
            }
            if let Some(check) = &self.check {
                stmts.extend(quote! {
                    if !(#check)(&#var) {
                        return Err(tabula::FieldError::value_error(
                            #description,
                            format!("{:?}", &#var),
                        ));
                    }
                });
            }
        }
        stmts
    }
}
