//! Generated identifiers: class names and tag helper fields.

use camino::{Utf8Component, Utf8Path};
use smol_str::SmolStr;

const DEFAULT_CLASS_NAME: &str = "Template";

/// Derives a class name from a document path.
///
/// Directory segments are kept so `Views/Home/Index.cshtml` and
/// `Views/Shared/Index.cshtml` do not collide: the result is
/// `Views_Home_Index`. Characters that cannot appear in an identifier become
/// `_`, and a leading digit is prefixed with `_`.
pub fn class_name_from_path(path: Option<&str>) -> SmolStr {
    let Some(path) = path else {
        return SmolStr::new_static(DEFAULT_CLASS_NAME);
    };

    let path = Utf8Path::new(path).with_extension("");
    let segments: Vec<&str> = path
        .components()
        .filter_map(|component| match component {
            Utf8Component::Normal(segment) => Some(segment),
            _ => None,
        })
        .collect();

    if segments.is_empty() {
        return SmolStr::new_static(DEFAULT_CLASS_NAME);
    }

    sanitize_identifier(&segments.join("_"))
}

/// Replaces characters that are not valid in a C# identifier.
pub fn sanitize_identifier(name: &str) -> SmolStr {
    let mut result = String::with_capacity(name.len() + 1);
    for (i, c) in name.chars().enumerate() {
        if i == 0 && !(c.is_alphabetic() || c == '_') {
            result.push('_');
            if c.is_alphanumeric() {
                result.push(c);
            }
            continue;
        }
        if c.is_alphanumeric() || c == '_' {
            result.push(c);
        } else {
            result.push('_');
        }
    }

    if result.is_empty() {
        SmolStr::new_static(DEFAULT_CLASS_NAME)
    } else {
        SmolStr::from(result)
    }
}

/// The field that holds instances of a tag helper type:
/// `Acme.Forms.InputTagHelper` becomes `__Acme_Forms_InputTagHelper`.
pub fn tag_helper_field_name(type_name: &str) -> SmolStr {
    let mut name = String::with_capacity(type_name.len() + 2);
    name.push_str("__");
    for c in type_name.chars() {
        name.push(if c.is_alphanumeric() || c == '_' { c } else { '_' });
    }
    SmolStr::from(name)
}
