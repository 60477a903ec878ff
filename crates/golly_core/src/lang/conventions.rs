//! Shared compiler conventions (well-known identifiers).

/// Entry point function name.
pub const ENTRYPOINT_NAME: &str = "main";

/// Package name that marks a program (as opposed to a library) package.
pub const MAIN_PACKAGE_NAME: &str = "main";

/// Import path of the intrinsic package that exposes the raw-code primitives.
pub const INTRINSIC_PACKAGE: &str = "golly/js";

/// Intrinsic that replaces every call site with a template.
pub const REWRITE_FN: &str = "Rewrite";

/// Intrinsic that replaces the declaration body with a template.
pub const RAW_FN: &str = "Raw";

/// Key of the struct-tag style annotation in doc comments (`js:"name,omit"`).
pub const ANNOTATION_KEY: &str = "js";

/// Annotation flag excluding a declaration from emitted output.
pub const OMIT_FLAG: &str = "omit";

/// Separator between the package path and the declared name in definition IDs.
pub const ID_SEPARATOR: char = ' ';

/// Separator between a package path and a name in emitted global identifiers.
pub const MANGLE_SEPARATOR: char = '$';

/// Exported identifiers start with an upper-case letter.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Build the definition ID of a package-level declaration.
pub fn definition_id(package: &str, name: &str) -> String {
    format!("{package}{ID_SEPARATOR}{name}")
}

/// Build the definition ID of a method declared on `recv`.
pub fn method_id(package: &str, recv: &str, name: &str) -> String {
    format!("{package}{ID_SEPARATOR}{recv}.{name}")
}

/// Turn a package path into a JavaScript identifier fragment.
///
/// Every character outside `[A-Za-z0-9_]` becomes `_`; a leading digit is prefixed with `_`.
pub fn sanitize_path(path: &str) -> String {
    let mut out: String = path
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Global JavaScript name of a package-level declaration.
pub fn mangle(package: &str, name: &str) -> String {
    format!("{}{MANGLE_SEPARATOR}{name}", sanitize_path(package))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exported_follows_leading_capital() {
        assert!(is_exported("Circle"));
        assert!(!is_exported("circle"));
        assert!(!is_exported("_Circle"));
        assert!(!is_exported(""));
    }

    #[test]
    fn ids_are_stable_and_distinct_for_methods() {
        assert_eq!(definition_id("app/shapes", "Circle"), "app/shapes Circle");
        assert_eq!(method_id("app/shapes", "Circle", "Area"), "app/shapes Circle.Area");
    }

    #[test]
    fn mangle_sanitizes_paths() {
        assert_eq!(mangle("github.com/x/shapes", "Circle"), "github_com_x_shapes$Circle");
        assert_eq!(mangle("9lives", "main"), "_9lives$main");
    }
}
