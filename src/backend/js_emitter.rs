//! JavaScript code emitter - builds JavaScript source strings
//!
//! Line-oriented: callers write whole lines at the current indentation and open/close brace blocks. The emitter also
//! tracks which locals are declared in each lexical block, which decides between `let x = ...` and `x = ...` for
//! Go's `:=`.

use std::collections::HashSet;
use std::fmt::Write;

const INDENT: &str = "  ";

/// A buffer for building JavaScript source with consistent indentation.
#[derive(Debug, Default)]
pub struct JsEmitter {
    buffer: String,
    indent_level: usize,
    /// One set of declared local names per open lexical block.
    scope_stack: Vec<HashSet<String>>,
}

impl JsEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty emitter whose lines start at `indent_level`.
    pub fn at_level(indent_level: usize) -> Self {
        Self {
            indent_level,
            ..Self::default()
        }
    }

    pub fn finish(self) -> String {
        self.buffer
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn level(&self) -> usize {
        self.indent_level
    }

    /// Indentation prefix for `level`.
    pub fn indent_for(level: usize) -> String {
        INDENT.repeat(level)
    }

    /// Write a line with current indentation
    pub fn line(&mut self, s: &str) {
        self.write_indent();
        self.buffer.push_str(s);
        self.buffer.push('\n');
    }

    pub fn linef(&mut self, args: std::fmt::Arguments<'_>) {
        self.write_indent();
        let _ = self.buffer.write_fmt(args);
        self.buffer.push('\n');
    }

    /// Write possibly multi-line text, indenting every line.
    pub fn raw_lines(&mut self, text: &str) {
        for line in text.lines() {
            if line.trim().is_empty() {
                self.blank_line();
            } else {
                self.line(line);
            }
        }
    }

    /// Append text verbatim, without indentation.
    pub fn write(&mut self, s: &str) {
        self.buffer.push_str(s);
    }

    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.buffer.push_str(INDENT);
        }
    }

    pub fn indent(&mut self) {
        self.indent_level += 1;
    }

    pub fn dedent(&mut self) {
        if self.indent_level > 0 {
            self.indent_level -= 1;
        }
    }

    /// Enter a new lexical block.
    pub fn push_scope(&mut self) {
        self.scope_stack.push(HashSet::new());
    }

    pub fn pop_scope(&mut self) {
        self.scope_stack.pop();
    }

    /// Declare a local in the innermost block.
    pub fn declare_var(&mut self, name: &str) {
        if let Some(scope) = self.scope_stack.last_mut() {
            scope.insert(name.to_string());
        }
    }

    /// Whether the innermost block already declares `name`.
    pub fn declared_here(&self, name: &str) -> bool {
        self.scope_stack.last().is_some_and(|scope| scope.contains(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_blocks_indent_by_two_spaces() {
        let mut out = JsEmitter::new();
        out.line("function f() {");
        out.indent();
        out.line("return 1;");
        out.dedent();
        out.line("}");
        assert_eq!(out.finish(), "function f() {\n  return 1;\n}\n");
    }

    #[test]
    fn raw_lines_reindents_each_line() {
        let mut out = JsEmitter::at_level(1);
        out.raw_lines("a();\n\nb();");
        assert_eq!(out.as_str(), "  a();\n\n  b();\n");
    }

    #[test]
    fn declarations_are_per_block() {
        let mut out = JsEmitter::new();
        out.push_scope();
        out.declare_var("x");
        out.push_scope();
        assert!(!out.declared_here("x"));
        out.declare_var("x");
        assert!(out.declared_here("x"));
        out.pop_scope();
        assert!(out.declared_here("x"));
    }
}
