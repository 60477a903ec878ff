//! JavaScript code generation from reachable definitions.
//!
//! ## Module Organization
//!
//! - `mod.rs` - [`JsCodegen`], precedence-aware expression text, naming and zero values
//! - `decls.rs` - function, method, class and variable declarations
//! - `statements.rs` - statement emission
//! - `expressions.rs` - expression emission, calls, builtins and intrinsic expansion

mod decls;
mod expressions;
mod statements;

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use golly_core::lang::conventions;
use golly_syntax::types::{Basic, Type};

use super::errors::EmitError;
use super::js_emitter::JsEmitter;
use crate::index::{DefId, DefKind, Definition, Index, IndexError, MAX_NAMED_DEPTH, TemplateMode};
use crate::resolve::Resolutions;

/// JavaScript operator precedence, loosest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Prec {
    /// Anything that needs parentheses in operand position: templates, function expressions.
    Lowest,
    Or,
    And,
    BitOr,
    BitXor,
    BitAnd,
    Equality,
    Relational,
    Shift,
    Additive,
    Multiplicative,
    Unary,
    /// Member access, calls, `new`, literals and names.
    Member,
}

/// Rendered expression text and how tightly it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Js {
    pub text: String,
    pub prec: Prec,
}

impl Js {
    pub fn new(text: impl Into<String>, prec: Prec) -> Self {
        Self {
            text: text.into(),
            prec,
        }
    }

    pub fn member(text: impl Into<String>) -> Self {
        Self::new(text, Prec::Member)
    }

    /// Text usable as a left (or only) operand of an operator binding at `min`.
    pub fn at(&self, min: Prec) -> String {
        if self.prec < min { format!("({})", self.text) } else { self.text.clone() }
    }

    /// Text usable as the right operand of a left-associative operator binding at `min`.
    pub fn right_of(&self, min: Prec) -> String {
        if self.prec <= min { format!("({})", self.text) } else { self.text.clone() }
    }
}

/// Emits JavaScript for definitions of one Index.
pub struct JsCodegen<'a, 'f> {
    index: &'a Index<'f>,
    resolutions: &'a Resolutions,
    out: JsEmitter,
    /// Definition being emitted, for error context.
    current: Option<DefId>,
    /// Parameter bindings of the call templates being expanded, innermost last.
    bindings: Vec<HashMap<String, Js>>,
    /// Global names declared so far, and the definition that declared each.
    globals: HashMap<String, DefId>,
}

impl<'a, 'f> JsCodegen<'a, 'f> {
    pub fn new(index: &'a Index<'f>, resolutions: &'a Resolutions) -> Self {
        Self {
            index,
            resolutions,
            out: JsEmitter::new(),
            current: None,
            bindings: Vec::new(),
            globals: HashMap::new(),
        }
    }

    /// Render each definition at `level`, skipping those that produce no text.
    #[tracing::instrument(skip_all, fields(definitions = order.len()))]
    pub fn declarations(&mut self, order: &[DefId], level: usize) -> Result<Vec<String>, EmitError> {
        let mut sections = Vec::with_capacity(order.len());
        for &id in order {
            if let Some(text) = self.emit_definition(id, level)? {
                sections.push(text);
            }
        }
        Ok(sections)
    }

    /// Record the global `id` declares, failing if another definition already took the name.
    fn claim_global(&mut self, id: DefId, name: String) -> Result<(), EmitError> {
        match self.globals.entry(name) {
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(())
            }
            Entry::Occupied(slot) if *slot.get() == id => Ok(()),
            Entry::Occupied(slot) => Err(EmitError::NameCollision {
                name: slot.key().clone(),
                first: self.index.def(*slot.get()).id().to_string(),
                second: self.index.def(id).id().to_string(),
            }),
        }
    }

    fn current_id(&self) -> String {
        self.current
            .map(|id| self.index.def(id).id().to_string())
            .unwrap_or_default()
    }

    fn unsupported(&self, message: impl Into<String>) -> EmitError {
        EmitError::Unsupported {
            id: self.current_id(),
            message: message.into(),
        }
    }

    fn lookup(&self, id: &str) -> Result<&'a Definition<'f>, EmitError> {
        let index = self.index;
        index.get(id).ok_or_else(|| {
            EmitError::Index(IndexError::UnknownReference {
                from: self.current_id(),
                id: id.to_string(),
            })
        })
    }

    /// Function name of a method whose receiver type has no class, or `None` for prototype methods.
    ///
    /// Values of `type Celsius float64` are plain JavaScript numbers, so their methods become free functions taking
    /// the receiver as the first argument.
    fn free_method_name(&self, def: &Definition<'f>) -> Result<Option<String>, EmitError> {
        let DefKind::Method(m) = def.kind() else {
            return Ok(None);
        };
        let receiver = self.lookup(&m.receiver.id())?;
        if has_prototype(receiver) {
            return Ok(None);
        }
        Ok(Some(format!("{}${}", global_name(receiver), property_name(def))))
    }

    /// JavaScript zero value of `ty`.
    fn zero_value(&self, ty: &Type) -> String {
        let mut ty = ty;
        for _ in 0..MAX_NAMED_DEPTH {
            match ty {
                Type::Basic(Basic::Bool) => return "false".into(),
                Type::Basic(Basic::String) => return "\"\"".into(),
                Type::Basic(b) if b.is_numeric() => return "0".into(),
                Type::Slice(_) => return "[]".into(),
                Type::Map { .. } => return "{}".into(),
                Type::Named(name) => {
                    if let Some(id) = self.index.zero_value_struct(ty) {
                        return format!("new {}()", global_name(self.index.def(id)));
                    }
                    match self.index.get(&name.id()).and_then(Definition::as_struct).and_then(|s| s.underlying()) {
                        Some(underlying) => ty = underlying,
                        None => break,
                    }
                }
                _ => break,
            }
        }
        "null".into()
    }
}

/// Global JavaScript name of a package-level definition.
pub(crate) fn global_name(def: &Definition<'_>) -> String {
    match def.rename() {
        Some(rename) => rename.to_string(),
        None => conventions::mangle(def.path(), def.name()),
    }
}

/// Whether `def` is emitted as a class, so methods on it live on its prototype.
pub(crate) fn has_prototype(def: &Definition<'_>) -> bool {
    def.as_struct().is_some_and(|s| s.fields().is_some())
}

/// Property name of a method on its class prototype.
pub(crate) fn property_name(def: &Definition<'_>) -> String {
    def.rename().unwrap_or(def.name()).to_string()
}

/// Whether calls to `def` are replaced by its template.
pub(crate) fn is_call_template(def: &Definition<'_>) -> bool {
    def.intrinsic().is_some_and(|i| i.mode == TemplateMode::Call)
}

/// Whether `def` is declared under a global name in emitted output.
pub(crate) fn has_global(def: &Definition<'_>) -> bool {
    if def.omitted() || is_call_template(def) {
        return false;
    }
    match def.kind() {
        DefKind::Function(_) | DefKind::Variable(_) => true,
        DefKind::Struct(s) => s.fields().is_some(),
        DefKind::Method(_) | DefKind::Interface(_) => false,
    }
}
