//! Key encoding between wire names and field names
//!
//! Field names are snake_case; JSON keys are lowerCamelCase when a class
//! camelizes its keys. Reference keys name the stored id(s) of a local-key
//! relationship field: `author` → `author_id`, `tags` → `tag_ids`.

use heck::{ToLowerCamelCase, ToSnakeCase};

/// `created_at` → `createdAt`
#[inline]
#[must_use]
pub fn camelize(key: &str) -> String {
    key.to_lower_camel_case()
}

/// `createdAt` → `created_at`
#[inline]
#[must_use]
pub fn underscore(key: &str) -> String {
    key.to_snake_case()
}

/// Reference key of a relationship field
///
/// Single references append `_id`. List references singularize a trailing
/// `s` and append `_ids`.
#[must_use]
pub fn reference_key(field_name: &str, many: bool) -> String {
    if many {
        let stem = field_name.strip_suffix('s').unwrap_or(field_name);
        format!("{stem}_ids")
    } else {
        format!("{field_name}_id")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camelize_and_back() {
        assert_eq!(camelize("updated_at"), "updatedAt");
        assert_eq!(camelize("name"), "name");
        assert_eq!(underscore("hexColor"), "hex_color");
        assert_eq!(underscore("name"), "name");
    }

    #[test]
    fn reference_keys() {
        assert_eq!(reference_key("author", false), "author_id");
        assert_eq!(reference_key("products", true), "product_ids");
        assert_eq!(camelize(&reference_key("products", true)), "productIds");
    }
}
