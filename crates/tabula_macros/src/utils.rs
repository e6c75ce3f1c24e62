use syn::{GenericArgument, PathArguments, Type};

/// If `ty` is `Option<T>`, returns `Some(T)`. Otherwise returns `None`.
pub fn extract_option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(type_path) = ty else {
        return None;
    };

    let segment = type_path.path.segments.last()?;

    if segment.ident != "Option" {
        return None;
    }

    let PathArguments::AngleBracketed(ref args) = segment.arguments else {
        return None;
    };

    if let Some(GenericArgument::Type(inner)) = args.args.first() {
        Some(inner)
    } else {
        None
    }
}

fn is_vec_u8(ty: &Type) -> bool {
    let Type::Path(type_path) = ty else {
        return false;
    };
    let Some(segment) = type_path.path.segments.last() else {
        return false;
    };
    if segment.ident != "Vec" {
        return false;
    }
    let PathArguments::AngleBracketed(ref args) = segment.arguments else {
        return false;
    };
    matches!(
        args.args.first(),
        Some(GenericArgument::Type(Type::Path(inner)))
            if inner.path.is_ident("u8")
    )
}

/// The name a type contributes to generated collection names:
/// `i64` → `Int`, `String` → `Text`, `Vec<u8>` → `Bytes`, user types keep
/// their own ident (`Point` → `Point`).
pub fn type_display_name(ty: &Type) -> syn::Result<String> {
    if is_vec_u8(ty) {
        return Ok("Bytes".to_string());
    }
    let Type::Path(type_path) = ty else {
        return Err(syn::Error::new_spanned(
            ty,
            "expected a named type here",
        ));
    };
    let Some(segment) = type_path.path.segments.last() else {
        return Err(syn::Error::new_spanned(ty, "expected a named type here"));
    };
    let ident = segment.ident.to_string();
    Ok(match ident.as_str() {
        "i64" => "Int".to_string(),
        "f64" => "Float".to_string(),
        "bool" => "Bool".to_string(),
        "String" => "Text".to_string(),
        "NaiveDate" => "Date".to_string(),
        "NaiveDateTime" => "DateTime".to_string(),
        "TimeDelta" => "Duration".to_string(),
        other => other.to_string(),
    })
}
