//! JavaScript reserved-word vocabulary (for codegen identifier escaping).

/// Reserved words, strict-mode reserved words and literals that cannot be used as binding names.
pub const JS_RESERVED: &[&str] = &[
    "arguments", "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete",
    "do", "else", "enum", "eval", "export", "extends", "false", "finally", "for", "function", "if", "implements",
    "import", "in", "instanceof", "interface", "let", "new", "null", "package", "private", "protected", "public",
    "return", "static", "super", "switch", "this", "throw", "true", "try", "typeof", "undefined", "var", "void",
    "while", "with", "yield",
];

/// Host globals that emitted code refers to by name; a local binding must not shadow them.
pub const JS_HOST_GLOBALS: &[&str] = &["Array", "Error", "Math", "Object", "console", "globalThis"];

/// Check whether an identifier is reserved in JavaScript.
pub fn is_reserved(name: &str) -> bool {
    JS_RESERVED.contains(&name)
}

/// Escape a local binding name so it is a legal JavaScript identifier.
///
/// Reserved words and host globals get a trailing `$`, which can never collide with a source identifier.
pub fn escape_ident(name: &str) -> String {
    if is_reserved(name) || JS_HOST_GLOBALS.contains(&name) {
        format!("{name}$")
    } else {
        name.to_string()
    }
}
