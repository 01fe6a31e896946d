//! Type keys of the built-in processors.
//!
//! ```text
//! string    UTF-8 string
//! u8?       boxed (nullable) scalar
//! [u8]      primitive array
//! [u8?]     array of boxed scalars
//! ```

use solidify_core::{ScalarKind, TypeKey};

pub const STRING: TypeKey = TypeKey::from_static("string");

/// Key of the nullable scalar of `kind`.
pub const fn boxed(kind: ScalarKind) -> TypeKey {
    TypeKey::from_static(boxed_name(kind))
}

pub(crate) const fn boxed_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "bool?",
        ScalarKind::Byte => "u8?",
        ScalarKind::Short => "i16?",
        ScalarKind::Int => "i32?",
        ScalarKind::Long => "i64?",
        ScalarKind::Float => "f32?",
        ScalarKind::Double => "f64?",
        ScalarKind::Char => "char?",
    }
}

/// Key of the primitive array of `kind`.
pub const fn primitive_array(kind: ScalarKind) -> TypeKey {
    TypeKey::from_static(primitive_array_name(kind))
}

pub(crate) const fn primitive_array_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "[bool]",
        ScalarKind::Byte => "[u8]",
        ScalarKind::Short => "[i16]",
        ScalarKind::Int => "[i32]",
        ScalarKind::Long => "[i64]",
        ScalarKind::Float => "[f32]",
        ScalarKind::Double => "[f64]",
        ScalarKind::Char => "[char]",
    }
}

/// Key of the array of nullable scalars of `kind`.
pub const fn boxed_array(kind: ScalarKind) -> TypeKey {
    TypeKey::from_static(boxed_array_name(kind))
}

pub(crate) const fn boxed_array_name(kind: ScalarKind) -> &'static str {
    match kind {
        ScalarKind::Bool => "[bool?]",
        ScalarKind::Byte => "[u8?]",
        ScalarKind::Short => "[i16?]",
        ScalarKind::Int => "[i32?]",
        ScalarKind::Long => "[i64?]",
        ScalarKind::Float => "[f32?]",
        ScalarKind::Double => "[f64?]",
        ScalarKind::Char => "[char?]",
    }
}

/// Conventional key for an array of objects of type `element`.
pub fn object_array(element: &TypeKey) -> TypeKey {
    TypeKey::new(format!("[{element}]"))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn keys_follow_scalar_names() {
        for kind in ScalarKind::ALL {
            let name = kind.name();
            assert_eq!(boxed(kind).as_str(), format!("{name}?"));
            assert_eq!(primitive_array(kind).as_str(), format!("[{name}]"));
            assert_eq!(boxed_array(kind).as_str(), format!("[{name}?]"));
        }
    }

    #[test]
    fn keys_are_distinct() {
        let mut all = HashSet::new();
        all.insert(STRING);
        for kind in ScalarKind::ALL {
            assert!(all.insert(boxed(kind)));
            assert!(all.insert(primitive_array(kind)));
            assert!(all.insert(boxed_array(kind)));
        }
        assert_eq!(all.len(), 25);
        assert_eq!(object_array(&"node".into()).as_str(), "[node]");
    }
}
