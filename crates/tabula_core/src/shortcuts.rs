use regex::Regex;

/// Check helpers for `#[field(check = …)]`. Each returns (or is) a
/// predicate over the validated value; a falsy result fails construction
/// with a value error naming the field.

pub fn nonempty(value: &str) -> bool {
    !value.is_empty()
}

pub fn nonnegative<T: PartialOrd + Default>(value: &T) -> bool {
    *value >= T::default()
}

pub fn strictly_positive<T: PartialOrd + Default>(value: &T) -> bool {
    *value > T::default()
}

/// Whitelist check: the value must equal one of the allowed values.
/// `String` fields compare against `&str` literals directly.
pub fn one_of<T, U, const N: usize>(allowed: [U; N]) -> impl Fn(&T) -> bool
where
    T: PartialEq<U>,
{
    move |value| allowed.iter().any(|candidate| value == candidate)
}

fn char_class_check(class: &'static str, len: Option<usize>) -> impl Fn(&str) -> bool {
    let pattern = match len {
        Some(n) => format!("^[{class}]{{{n}}}$"),
        None => format!("^[{class}]*$"),
    };
    let regex = Regex::new(&pattern).expect("hard-coded character class");
    move |value| regex.is_match(value)
}

pub fn uppercase_letters(len: Option<usize>) -> impl Fn(&str) -> bool {
    char_class_check("A-Z", len)
}

pub fn uppercase_wchars(len: Option<usize>) -> impl Fn(&str) -> bool {
    char_class_check("A-Z0-9_", len)
}

pub fn uppercase_hex(len: Option<usize>) -> impl Fn(&str) -> bool {
    char_class_check("0-9A-F", len)
}

pub fn lowercase_letters(len: Option<usize>) -> impl Fn(&str) -> bool {
    char_class_check("a-z", len)
}

pub fn lowercase_wchars(len: Option<usize>) -> impl Fn(&str) -> bool {
    char_class_check("a-z0-9_", len)
}

pub fn lowercase_hex(len: Option<usize>) -> impl Fn(&str) -> bool {
    char_class_check("0-9a-f", len)
}

pub fn digits_str(len: Option<usize>) -> impl Fn(&str) -> bool {
    char_class_check("0-9", len)
}

pub fn absolute_http_url() -> impl Fn(&str) -> bool {
    let regex = Regex::new(r"^https?://.{1,2000}$").expect("hard-coded pattern");
    move |value| regex.is_match(value)
}
