//! Name derivation for mapped classes.
//!
//! A table without an `AS "Name"` attribute gets its class name by
//! pascal-casing the singular form of the table name.

/// Pascal-cases a snake_case or kebab-case name, preserving interior
/// capitalization of each segment (`userAccounts` → `UserAccounts`).
#[must_use]
pub fn pascal_case(name: &str) -> String {
    name.split(['_', '-'])
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            let mut chars = segment.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// A best-effort English singular of a table name.
///
/// Handles the regular plural suffixes; irregular nouns pass through
/// unchanged, which is what `AS "Name"` exists for.
#[must_use]
pub fn singularize(name: &str) -> String {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with("ies") && name.len() > 3 {
        let mut out = String::from(&name[..name.len() - 3]);
        out.push('y');
        return out;
    }
    if lower.ends_with("ss") {
        return String::from(name);
    }
    for suffix in ["ches", "shes", "ses", "xes", "zes"] {
        if lower.ends_with(suffix) && name.len() > suffix.len() {
            return String::from(&name[..name.len() - 2]);
        }
    }
    if lower.ends_with('s') && name.len() > 1 {
        return String::from(&name[..name.len() - 1]);
    }
    String::from(name)
}

/// The derived class name for a table: pascal-cased singular.
#[must_use]
pub fn derived_class_name(table_name: &str) -> String {
    pascal_case(&singularize(table_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pascal_case() {
        assert_eq!(pascal_case("config"), "Config");
        assert_eq!(pascal_case("with_defaults"), "WithDefaults");
        assert_eq!(pascal_case("user-accounts"), "UserAccounts");
        assert_eq!(pascal_case("__edge__"), "Edge");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("users"), "user");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("branches"), "branch");
        assert_eq!(singularize("address"), "address");
        assert_eq!(singularize("config"), "config");
    }

    #[test]
    fn test_derived_class_name() {
        assert_eq!(derived_class_name("users"), "User");
        assert_eq!(derived_class_name("with_defaults"), "WithDefault");
        assert_eq!(derived_class_name("config"), "Config");
    }
}
