//! Statement emission for code generation
//!
//! Handles emitting all statement types to JavaScript. Go blocks map to JavaScript blocks one to one, so every block
//! opens a scope in the emitter; `:=` declares with `let` unless the name already lives in the innermost block.

use golly_core::lang::js_keywords::escape_ident;
use golly_syntax::ast::{AssignOp, Block, Callee, Expr, ExprKind, Stmt};
use golly_syntax::types::{Basic, Type};

use super::{JsCodegen, Prec};
use crate::backend::errors::EmitError;

const BLANK: &str = "_";

impl<'a, 'f> JsCodegen<'a, 'f> {
    pub(crate) fn emit_stmts(&mut self, stmts: &[Stmt]) -> Result<(), EmitError> {
        for stmt in stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), EmitError> {
        match stmt {
            Stmt::Expr(Expr {
                kind: ExprKind::Call(call),
                ..
            }) if matches!(&call.callee, Callee::Builtin(name) if name == "panic") && call.args.len() == 1 => {
                let value = self.expr(&call.args[0])?;
                self.out.linef(format_args!("throw new Error({});", value.text));
            }
            Stmt::Expr(_) | Stmt::Define { .. } | Stmt::Var { .. } | Stmt::Assign { .. } | Stmt::IncDec { .. } => {
                let text = self.simple_stmt(stmt)?;
                self.out.linef(format_args!("{text};"));
            }
            Stmt::Return(values) => match values.as_slice() {
                [] => self.out.line("return;"),
                [value] => {
                    let value = self.expr(value)?;
                    self.out.linef(format_args!("return {};", value.text));
                }
                values => {
                    let values = self.list(values)?;
                    self.out.linef(format_args!("return [{values}];"));
                }
            },
            Stmt::If {
                init,
                cond,
                then,
                otherwise,
            } => match init {
                Some(init) => {
                    // Go scopes the init statement to the whole if/else chain.
                    self.out.line("{");
                    self.out.indent();
                    self.out.push_scope();
                    let init = self.simple_stmt(init)?;
                    self.out.linef(format_args!("{init};"));
                    self.emit_if_chain(cond, then, otherwise.as_deref())?;
                    self.out.pop_scope();
                    self.out.dedent();
                    self.out.line("}");
                }
                None => self.emit_if_chain(cond, then, otherwise.as_deref())?,
            },
            Stmt::For { init, cond, post, body } => {
                self.out.push_scope();
                let init = init.as_deref().map(|s| self.simple_stmt(s)).transpose()?;
                let cond = cond.as_ref().map(|c| self.expr(c)).transpose()?;
                let post = post.as_deref().map(|s| self.simple_stmt(s)).transpose()?;
                let header = match (init, cond, post) {
                    (None, None, None) => "for (;;) {".to_string(),
                    (None, Some(cond), None) => format!("while ({}) {{", cond.text),
                    (init, cond, post) => format!(
                        "for ({}; {}; {}) {{",
                        init.unwrap_or_default(),
                        cond.map(|c| c.text).unwrap_or_default(),
                        post.unwrap_or_default()
                    ),
                };
                self.out.line(&header);
                self.emit_block_body(body)?;
                self.out.line("}");
                self.out.pop_scope();
            }
            Stmt::Range { key, value, expr, body } => self.emit_range(key.as_deref(), value.as_deref(), expr, body)?,
            Stmt::Block(block) => {
                self.out.line("{");
                self.emit_block_body(block)?;
                self.out.line("}");
            }
            Stmt::Break => self.out.line("break;"),
            Stmt::Continue => self.out.line("continue;"),
        }
        Ok(())
    }

    /// Indented statements of a block in a fresh scope; the caller writes the braces.
    fn emit_block_body(&mut self, block: &Block) -> Result<(), EmitError> {
        self.out.indent();
        self.out.push_scope();
        let result = self.emit_stmts(&block.stmts);
        self.out.pop_scope();
        self.out.dedent();
        result
    }

    fn emit_if_chain(&mut self, cond: &Expr, then: &Block, otherwise: Option<&Stmt>) -> Result<(), EmitError> {
        let cond = self.expr(cond)?;
        self.out.linef(format_args!("if ({}) {{", cond.text));
        self.emit_block_body(then)?;

        let mut next = otherwise;
        loop {
            match next {
                None => {
                    self.out.line("}");
                    return Ok(());
                }
                Some(Stmt::If {
                    init: None,
                    cond,
                    then,
                    otherwise,
                }) => {
                    let cond = self.expr(cond)?;
                    self.out.linef(format_args!("}} else if ({}) {{", cond.text));
                    self.emit_block_body(then)?;
                    next = otherwise.as_deref();
                }
                Some(Stmt::Block(block)) => {
                    self.out.line("} else {");
                    self.emit_block_body(block)?;
                    self.out.line("}");
                    return Ok(());
                }
                Some(other) => {
                    self.out.line("} else {");
                    self.out.indent();
                    self.out.push_scope();
                    let result = self.emit_stmt(other);
                    self.out.pop_scope();
                    self.out.dedent();
                    result?;
                    self.out.line("}");
                    return Ok(());
                }
            }
        }
    }

    /// A statement as a single clause without the trailing `;` (also used in `for` headers).
    fn simple_stmt(&mut self, stmt: &Stmt) -> Result<String, EmitError> {
        match stmt {
            Stmt::Expr(expr) => Ok(self.expr(expr)?.text),
            Stmt::Define { names, values } => self.define(names, values),
            Stmt::Var { name, ty, value } => {
                let init = match value {
                    Some(value) => self.expr(value)?.text,
                    None => self.zero_value(ty),
                };
                let name = escape_ident(name);
                self.out.declare_var(&name);
                Ok(format!("let {name} = {init}"))
            }
            Stmt::Assign { targets, op, values } => self.assign(targets, *op, values),
            Stmt::IncDec { target, inc } => {
                let target = self.expr(target)?;
                Ok(format!("{}{}", target.text, if *inc { "++" } else { "--" }))
            }
            _ => Err(self.unsupported("only simple statements may appear in a for clause or if initializer")),
        }
    }

    /// Right-hand side of `:=` or `=`: one value, or an array of several.
    fn rhs(&mut self, values: &[Expr]) -> Result<String, EmitError> {
        match values {
            [value] => Ok(self.expr(value)?.text),
            values => Ok(format!("[{}]", self.list(values)?)),
        }
    }

    fn define(&mut self, names: &[String], values: &[Expr]) -> Result<String, EmitError> {
        let rhs = self.rhs(values)?;
        if let [name] = names {
            if name == BLANK {
                return Ok(rhs);
            }
        }

        let bound: Vec<String> = names.iter().filter(|n| *n != BLANK).map(|n| escape_ident(n)).collect();
        let fresh: Vec<String> = bound.iter().filter(|n| !self.out.declared_here(n)).cloned().collect();
        let target = match names {
            [name] => escape_ident(name),
            names => destructure(names),
        };
        for name in &fresh {
            self.out.declare_var(name);
        }

        if fresh.len() == bound.len() {
            return Ok(format!("let {target} = {rhs}"));
        }
        if !fresh.is_empty() {
            self.out.linef(format_args!("let {};", fresh.join(", ")));
        }
        Ok(format!("{target} = {rhs}"))
    }

    fn assign(&mut self, targets: &[Expr], op: AssignOp, values: &[Expr]) -> Result<String, EmitError> {
        if op == AssignOp::Assign {
            let rhs = self.rhs(values)?;
            return match targets {
                [target] if is_blank(target) => Ok(rhs),
                [target] => Ok(format!("{} = {rhs}", self.expr(target)?.text)),
                targets => {
                    let mut slots = Vec::with_capacity(targets.len());
                    for target in targets {
                        slots.push(if is_blank(target) { String::new() } else { self.expr(target)?.text });
                    }
                    Ok(format!("[{}] = {rhs}", slots.join(", ")))
                }
            };
        }

        let ([target], [value]) = (targets, values) else {
            return Err(self.unsupported("compound assignment with several operands"));
        };
        let lhs = self.expr(target)?;
        let rhs = self.expr(value)?;
        let basic = target.ty.basic();
        if op == AssignOp::Div && basic.is_some_and(Basic::is_integer) {
            return Ok(format!(
                "{0} = Math.trunc({0} / {1})",
                lhs.text,
                rhs.right_of(Prec::Multiplicative)
            ));
        }
        let unsigned = matches!(
            basic,
            Some(Basic::Uint | Basic::Uint8 | Basic::Uint16 | Basic::Uint32 | Basic::Uint64 | Basic::Uintptr)
        );
        let symbol = match op {
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Rem => "%=",
            AssignOp::BitAnd => "&=",
            AssignOp::BitOr => "|=",
            AssignOp::BitXor => "^=",
            AssignOp::Shl => "<<=",
            AssignOp::Shr if unsigned => ">>>=",
            AssignOp::Shr => ">>=",
            AssignOp::Assign => "=",
        };
        Ok(format!("{} {symbol} {}", lhs.text, rhs.text))
    }

    fn emit_range(
        &mut self,
        key: Option<&str>,
        value: Option<&str>,
        expr: &Expr,
        body: &Block,
    ) -> Result<(), EmitError> {
        let subject = self.expr(expr)?;
        let key = key.filter(|k| *k != BLANK).map(escape_ident);
        let value = value.filter(|v| *v != BLANK).map(escape_ident);
        let s = subject.at(Prec::Member);
        let t = &subject.text;

        let header = match (&expr.ty, key.as_deref(), value.as_deref()) {
            (Type::Slice(_), Some(k), Some(v)) => format!("for (const [{k}, {v}] of {s}.entries()) {{"),
            (Type::Slice(_), Some(k), None) => format!("for (let {k} = 0; {k} < {s}.length; {k}++) {{"),
            (Type::Slice(_) | Type::Basic(Basic::String), None, Some(v)) => format!("for (const {v} of {s}) {{"),
            (Type::Slice(_) | Type::Basic(Basic::String), None, None) => format!("for (const _ of {s}) {{"),
            (Type::Basic(Basic::String), Some(k), Some(v)) => {
                format!("for (const [{k}, {v}] of Array.from({t}).entries()) {{")
            }
            (Type::Basic(Basic::String), Some(k), None) => format!("for (const {k} of Array.from({t}).keys()) {{"),
            (Type::Map { .. }, Some(k), Some(v)) => format!("for (const [{k}, {v}] of Object.entries({t})) {{"),
            (Type::Map { .. }, k, None) => format!("for (const {} of Object.keys({t})) {{", k.unwrap_or(BLANK)),
            (Type::Map { .. }, None, Some(v)) => format!("for (const {v} of Object.values({t})) {{"),
            (Type::Basic(b), k, None) if b.is_integer() => {
                let k = k.unwrap_or("_i");
                let n = subject.right_of(Prec::Relational);
                format!("for (let {k} = 0; {k} < {n}; {k}++) {{")
            }
            (ty, _, _) => return Err(self.unsupported(format!("range over {ty}"))),
        };

        self.out.line(&header);
        self.out.indent();
        self.out.push_scope();
        for name in key.iter().chain(value.iter()) {
            self.out.declare_var(name);
        }
        let result = self.emit_stmts(&body.stmts);
        self.out.pop_scope();
        self.out.dedent();
        result?;
        self.out.line("}");
        Ok(())
    }
}

fn is_blank(expr: &Expr) -> bool {
    matches!(&expr.kind, ExprKind::Local(name) if name == BLANK)
}

/// `[a, , c]` for `a, _, c`.
fn destructure(names: &[String]) -> String {
    let slots: Vec<String> = names
        .iter()
        .map(|n| if n == BLANK { String::new() } else { escape_ident(n) })
        .collect();
    format!("[{}]", slots.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_names_leave_holes() {
        assert_eq!(destructure(&["_".into(), "err".into()]), "[, err]");
        assert_eq!(destructure(&["q".into(), "new".into()]), "[q, new$]");
    }
}
