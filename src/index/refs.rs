//! Walk typed syntax and report what it references.
//!
//! The walker is shared by dependency computation (what must be emitted before a definition) and call-site discovery
//! (which interface method calls need resolving). It reports references in first-appearance order and does not
//! deduplicate; callers decide what a repeated reference means to them.

use golly_core::lang::conventions;
use golly_syntax::ast::{Block, Callee, Expr, ExprKind, Pos, Ref, Stmt};
use golly_syntax::types::Type;

#[derive(Debug, Clone)]
pub(crate) enum Reference<'f> {
    /// A package-level declaration, by definition ID.
    Def(String),
    /// A method call on an interface-typed receiver.
    Interface {
        interface: &'f Ref,
        method: &'f str,
        pos: &'f Pos,
    },
    /// A zero value of this type is materialized (`var x T`, struct field defaults).
    ZeroValue(&'f Type),
}

pub(crate) fn walk_block<'f>(block: &'f Block, out: &mut impl FnMut(Reference<'f>)) {
    for stmt in &block.stmts {
        walk_stmt(stmt, out);
    }
}

pub(crate) fn walk_stmt<'f>(stmt: &'f Stmt, out: &mut impl FnMut(Reference<'f>)) {
    match stmt {
        Stmt::Expr(expr) => walk_expr(expr, out),
        Stmt::Define { values, .. } | Stmt::Return(values) => {
            for value in values {
                walk_expr(value, out);
            }
        }
        Stmt::Var { ty, value, .. } => match value {
            Some(value) => walk_expr(value, out),
            None => out(Reference::ZeroValue(ty)),
        },
        Stmt::Assign { targets, values, .. } => {
            for expr in targets.iter().chain(values) {
                walk_expr(expr, out);
            }
        }
        Stmt::IncDec { target, .. } => walk_expr(target, out),
        Stmt::If {
            init,
            cond,
            then,
            otherwise,
        } => {
            if let Some(init) = init {
                walk_stmt(init, out);
            }
            walk_expr(cond, out);
            walk_block(then, out);
            if let Some(otherwise) = otherwise {
                walk_stmt(otherwise, out);
            }
        }
        Stmt::For { init, cond, post, body } => {
            if let Some(init) = init {
                walk_stmt(init, out);
            }
            if let Some(cond) = cond {
                walk_expr(cond, out);
            }
            if let Some(post) = post {
                walk_stmt(post, out);
            }
            walk_block(body, out);
        }
        Stmt::Range { expr, body, .. } => {
            walk_expr(expr, out);
            walk_block(body, out);
        }
        Stmt::Block(block) => walk_block(block, out),
        Stmt::Break | Stmt::Continue => {}
    }
}

pub(crate) fn walk_expr<'f>(expr: &'f Expr, out: &mut impl FnMut(Reference<'f>)) {
    match &expr.kind {
        ExprKind::Lit(_) | ExprKind::Local(_) => {}
        ExprKind::Global(r) => out(Reference::Def(r.id())),
        ExprKind::Field { base, .. } => walk_expr(base, out),
        ExprKind::Index { base, index } => {
            walk_expr(base, out);
            walk_expr(index, out);
        }
        ExprKind::Call(call) => {
            match &call.callee {
                // The raw-code primitives are not declarations of the program.
                Callee::Func(target) if target.package == conventions::INTRINSIC_PACKAGE => {}
                Callee::Func(target) => out(Reference::Def(target.id())),
                Callee::Method { recv, method } => {
                    walk_expr(recv, out);
                    out(Reference::Def(method.id()));
                }
                Callee::Interface { recv, interface, name } => {
                    walk_expr(recv, out);
                    out(Reference::Interface {
                        interface,
                        method: name,
                        pos: &call.pos,
                    });
                }
                Callee::Builtin(_) => {}
                Callee::Value(f) => walk_expr(f, out),
            }
            for arg in &call.args {
                walk_expr(arg, out);
            }
        }
        ExprKind::Unary { expr, .. } | ExprKind::AddrOf(expr) | ExprKind::Deref(expr) => walk_expr(expr, out),
        ExprKind::Binary { lhs, rhs, .. } => {
            walk_expr(lhs, out);
            walk_expr(rhs, out);
        }
        ExprKind::Composite { ty, fields } => {
            out(Reference::Def(ty.id()));
            for field in fields {
                walk_expr(&field.value, out);
            }
        }
        ExprKind::SliceLit(items) => {
            for item in items {
                walk_expr(item, out);
            }
        }
        ExprKind::FuncLit { body, .. } => walk_block(body, out),
    }
}
