//! Expression emission for code generation
//!
//! Every expression renders to a [`Js`] value carrying its text and precedence; parents parenthesize children only
//! where JavaScript's grammar needs it.

use golly_core::lang::conventions;
use golly_core::lang::js_keywords::escape_ident;
use golly_syntax::ast::{BinaryOp, Block, Call, Callee, Expr, ExprKind, FieldInit, Lit, Param, Pos, Ref, UnaryOp};
use golly_syntax::types::{Basic, Type};

use super::decls::param_list;
use super::{Js, JsCodegen, Prec, global_name, is_call_template, property_name};
use crate::backend::errors::EmitError;
use crate::backend::intrinsic;
use crate::backend::js_emitter::JsEmitter;
use crate::index::{DefKind, Definition, TypedNode};

impl<'a, 'f> JsCodegen<'a, 'f> {
    pub(crate) fn expr(&mut self, expr: &Expr) -> Result<Js, EmitError> {
        match &expr.kind {
            ExprKind::Lit(lit) => Ok(literal(lit)),
            ExprKind::Local(name) => {
                let name = escape_ident(name);
                if let Some(bound) = self.bindings.last().and_then(|frame| frame.get(&name)) {
                    return Ok(bound.clone());
                }
                Ok(Js::member(name))
            }
            ExprKind::Global(r) => self.global_value(r).map(Js::member),
            ExprKind::Field { base, name } => {
                let base = self.expr(base)?;
                Ok(Js::member(format!("{}.{name}", base.at(Prec::Member))))
            }
            ExprKind::Index { base, index } => {
                let base = self.expr(base)?;
                let index = self.expr(index)?;
                Ok(Js::member(format!("{}[{}]", base.at(Prec::Member), index.text)))
            }
            ExprKind::Call(call) => self.call(call),
            ExprKind::Unary { op, expr } => self.unary(*op, expr),
            ExprKind::Binary { op, lhs, rhs } => self.binary(*op, lhs, rhs, &expr.ty),
            ExprKind::Composite { ty, fields } => self.composite(ty, fields),
            ExprKind::SliceLit(items) => {
                let items = self.list(items)?;
                Ok(Js::member(format!("[{items}]")))
            }
            ExprKind::FuncLit {
                params, variadic, body, ..
            } => self.func_lit(params, *variadic, body),
            // Pointers are JavaScript references already.
            ExprKind::AddrOf(inner) | ExprKind::Deref(inner) => self.expr(inner),
        }
    }

    /// Comma-separated rendered expressions.
    pub(super) fn list(&mut self, exprs: &[Expr]) -> Result<String, EmitError> {
        let mut parts = Vec::with_capacity(exprs.len());
        for expr in exprs {
            parts.push(self.expr(expr)?.text);
        }
        Ok(parts.join(", "))
    }

    fn global_value(&self, r: &Ref) -> Result<String, EmitError> {
        let def = self.lookup(&r.id())?;
        match def.kind() {
            DefKind::Function(_) if is_call_template(def) => Err(self.unsupported(format!(
                "`{}` is a call template and cannot be used as a value",
                def.id()
            ))),
            DefKind::Function(_) | DefKind::Variable(_) => Ok(global_name(def)),
            DefKind::Method(_) | DefKind::Struct(_) | DefKind::Interface(_) => Err(self.unsupported(format!(
                "{} `{}` cannot be used as a value",
                def.kind_label(),
                def.id()
            ))),
        }
    }

    fn call(&mut self, call: &Call) -> Result<Js, EmitError> {
        match &call.callee {
            Callee::Func(target) if target.package == conventions::INTRINSIC_PACKAGE => Err(self.unsupported(format!(
                "js.{} may only be the first statement of a function body",
                target.name
            ))),
            Callee::Func(target) => {
                let def = self.lookup(&target.id())?;
                let args = self.rendered_args(&call.args)?;
                if is_call_template(def) {
                    return self.expand(def, None, args, &call.pos);
                }
                let callee = self.global_value(target)?;
                Ok(Js::member(format!("{callee}({})", join(args))))
            }
            Callee::Method { recv, method } => {
                let def = self.lookup(&method.id())?;
                let recv = self.expr(recv)?;
                let args = self.rendered_args(&call.args)?;
                if is_call_template(def) {
                    return self.expand(def, Some(recv), args, &call.pos);
                }
                if let Some(function) = self.free_method_name(def)? {
                    let mut all = vec![recv];
                    all.extend(args);
                    return Ok(Js::member(format!("{function}({})", join(all))));
                }
                Ok(Js::member(format!(
                    "{}.{}({})",
                    recv.at(Prec::Member),
                    property_name(def),
                    join(args)
                )))
            }
            Callee::Interface { recv, interface, name } => {
                let property = self.dispatch_property(interface, name, &call.pos)?;
                let recv = self.expr(recv)?;
                let args = self.rendered_args(&call.args)?;
                Ok(Js::member(format!("{}.{property}({})", recv.at(Prec::Member), join(args))))
            }
            Callee::Builtin(name) => self.builtin(name, &call.args),
            Callee::Value(f) => {
                let f = self.expr(f)?;
                let args = self.rendered_args(&call.args)?;
                Ok(Js::member(format!("{}({})", f.at(Prec::Member), join(args))))
            }
        }
    }

    fn rendered_args(&mut self, args: &[Expr]) -> Result<Vec<Js>, EmitError> {
        args.iter().map(|arg| self.expr(arg)).collect()
    }

    /// Expand a call template at one call site.
    fn expand(
        &mut self,
        def: &Definition<'f>,
        receiver: Option<Js>,
        args: Vec<Js>,
        pos: &Pos,
    ) -> Result<Js, EmitError> {
        let (TypedNode::Func(decl), Some(raw)) = (def.typed_node(), def.intrinsic()) else {
            return Err(self.unsupported(format!("`{}` is not a function template", def.id())));
        };
        let receiver_text = receiver.as_ref().map(|r| r.at(Prec::Member)).unwrap_or_default();

        self.bindings.push(intrinsic::bind(decl, receiver, args));
        let rendered: Result<Vec<String>, EmitError> =
            raw.args.iter().map(|arg| self.expr(arg).map(|js| js.text)).collect();
        self.bindings.pop();

        let text = intrinsic::render(def.id(), pos, &raw.template, &receiver_text, &rendered?)?;
        Ok(Js::new(text, Prec::Lowest))
    }

    /// Property every implementation of `interface.name` answers to.
    fn dispatch_property(&self, interface: &Ref, name: &str, pos: &Pos) -> Result<String, EmitError> {
        let index = self.index;
        let iface = index.interface_handle(&self.current_id(), &interface.id(), name)?;
        let implementations = self.resolutions.implementations(iface, name);
        if implementations.is_empty() {
            return Err(EmitError::UnresolvedInterfaceCall {
                interface: interface.id(),
                method: name.to_string(),
                caller: self.current_id(),
                pos: pos.clone(),
            });
        }

        let mut property: Option<String> = None;
        for &implementation in implementations {
            let def = index.def(implementation);
            if is_call_template(def) {
                return Err(self.unsupported(format!(
                    "`{}` implements `{}` with a call template, which cannot be dispatched dynamically",
                    def.id(),
                    interface.id()
                )));
            }
            if self.free_method_name(def)?.is_some() {
                return Err(self.unsupported(format!(
                    "`{}` implements `{}` on a non-struct type, whose values have no prototype to dispatch through",
                    def.id(),
                    interface.id()
                )));
            }
            let candidate = property_name(def);
            match &property {
                Some(existing) if *existing != candidate => {
                    return Err(self.unsupported(format!(
                        "implementations of `{}.{name}` are emitted under different names (`{existing}` and `{candidate}`)",
                        interface.id()
                    )));
                }
                Some(_) => {}
                None => property = Some(candidate),
            }
        }
        Ok(property.unwrap_or_else(|| name.to_string()))
    }

    fn builtin(&mut self, name: &str, args: &[Expr]) -> Result<Js, EmitError> {
        match (name, args) {
            ("len" | "cap", [subject]) => {
                let rendered = self.expr(subject)?;
                Ok(match subject.ty {
                    Type::Map { .. } => Js::member(format!("Object.keys({}).length", rendered.text)),
                    _ => Js::member(format!("{}.length", rendered.at(Prec::Member))),
                })
            }
            ("append", [slice, items @ ..]) => {
                let slice = self.expr(slice)?;
                if items.is_empty() {
                    return Ok(slice);
                }
                let items = self.list(items)?;
                Ok(Js::member(format!("{}.concat([{items}])", slice.at(Prec::Member))))
            }
            ("print" | "println", _) => {
                let args = self.list(args)?;
                Ok(Js::member(format!("console.log({args})")))
            }
            ("panic", [value]) => {
                let value = self.expr(value)?;
                Ok(Js::member(format!("(() => {{ throw new Error({}); }})()", value.text)))
            }
            ("delete", [map, key]) => {
                let map = self.expr(map)?;
                let key = self.expr(key)?;
                Ok(Js::new(format!("delete {}[{}]", map.at(Prec::Member), key.text), Prec::Unary))
            }
            _ => Err(self.unsupported(format!("builtin `{name}` with {} argument(s)", args.len()))),
        }
    }

    fn unary(&mut self, op: UnaryOp, operand: &Expr) -> Result<Js, EmitError> {
        let operand = self.expr(operand)?;
        let sign = match op {
            UnaryOp::Neg => "-",
            UnaryOp::Plus => "+",
            UnaryOp::Not => "!",
            UnaryOp::BitNot => "~",
        };
        let mut text = operand.at(Prec::Unary);
        // `- -x` must not become the decrement operator.
        if text.starts_with(sign) && matches!(op, UnaryOp::Neg | UnaryOp::Plus) {
            text = format!("({text})");
        }
        Ok(Js::new(format!("{sign}{text}"), Prec::Unary))
    }

    fn binary(&mut self, op: BinaryOp, lhs: &Expr, rhs: &Expr, ty: &Type) -> Result<Js, EmitError> {
        let unsigned = matches!(
            lhs.ty.basic(),
            Some(Basic::Uint | Basic::Uint8 | Basic::Uint16 | Basic::Uint32 | Basic::Uint64 | Basic::Uintptr)
        );
        let l = self.expr(lhs)?;
        let r = self.expr(rhs)?;

        if op == BinaryOp::AndNot {
            let inverted = format!("~{}", r.at(Prec::Unary));
            return Ok(Js::new(format!("{} & {inverted}", l.at(Prec::BitAnd)), Prec::BitAnd));
        }

        let (symbol, prec) = match op {
            BinaryOp::Add => ("+", Prec::Additive),
            BinaryOp::Sub => ("-", Prec::Additive),
            BinaryOp::Mul => ("*", Prec::Multiplicative),
            BinaryOp::Div => ("/", Prec::Multiplicative),
            BinaryOp::Rem => ("%", Prec::Multiplicative),
            BinaryOp::Eq => ("===", Prec::Equality),
            BinaryOp::Ne => ("!==", Prec::Equality),
            BinaryOp::Lt => ("<", Prec::Relational),
            BinaryOp::Le => ("<=", Prec::Relational),
            BinaryOp::Gt => (">", Prec::Relational),
            BinaryOp::Ge => (">=", Prec::Relational),
            BinaryOp::And => ("&&", Prec::And),
            BinaryOp::Or => ("||", Prec::Or),
            BinaryOp::BitAnd => ("&", Prec::BitAnd),
            BinaryOp::BitOr => ("|", Prec::BitOr),
            BinaryOp::BitXor => ("^", Prec::BitXor),
            BinaryOp::Shl => ("<<", Prec::Shift),
            BinaryOp::Shr if unsigned => (">>>", Prec::Shift),
            BinaryOp::Shr => (">>", Prec::Shift),
            BinaryOp::AndNot => ("&", Prec::BitAnd),
        };
        let text = format!("{} {symbol} {}", l.at(prec), r.right_of(prec));

        if op == BinaryOp::Div && ty.basic().is_some_and(Basic::is_integer) {
            return Ok(Js::member(format!("Math.trunc({text})")));
        }
        Ok(Js::new(text, prec))
    }

    fn composite(&mut self, ty: &Ref, fields: &[FieldInit]) -> Result<Js, EmitError> {
        let def = self.lookup(&ty.id())?;
        if def.as_struct().and_then(|s| s.fields()).is_none() {
            return Err(self.unsupported(format!("`{}` is not a struct type", def.id())));
        }
        let class = global_name(def);
        if fields.is_empty() {
            return Ok(Js::member(format!("new {class}()")));
        }
        let mut inits = Vec::with_capacity(fields.len());
        for field in fields {
            inits.push(format!("{}: {}", field.name, self.expr(&field.value)?.text));
        }
        Ok(Js::member(format!("new {class}({{ {} }})", inits.join(", "))))
    }

    /// `function(params) { ... }` rendered out of line at the current indentation.
    fn func_lit(&mut self, params: &[Param], variadic: bool, body: &Block) -> Result<Js, EmitError> {
        let level = self.out.level();
        let saved = std::mem::replace(&mut self.out, JsEmitter::at_level(level + 1));
        self.out.push_scope();
        for param in params {
            self.out.declare_var(&escape_ident(&param.name));
        }
        let result = self.emit_stmts(&body.stmts);
        let inner = std::mem::replace(&mut self.out, saved);
        result?;

        let text = format!(
            "function({}) {{\n{}{}}}",
            param_list(params, variadic),
            inner.finish(),
            JsEmitter::indent_for(level)
        );
        Ok(Js::new(text, Prec::Lowest))
    }
}

fn join(args: Vec<Js>) -> String {
    args.into_iter().map(|a| a.text).collect::<Vec<_>>().join(", ")
}

fn literal(lit: &Lit) -> Js {
    match lit {
        Lit::Int(v) if *v < 0 => Js::new(v.to_string(), Prec::Unary),
        Lit::Int(v) => Js::member(v.to_string()),
        Lit::Float(v) if v.is_nan() => Js::member("NaN"),
        Lit::Float(v) if v.is_infinite() && *v > 0.0 => Js::member("Infinity"),
        Lit::Float(v) if v.is_infinite() => Js::new("-Infinity", Prec::Unary),
        Lit::Float(v) if *v < 0.0 => Js::new(format!("{v:?}"), Prec::Unary),
        Lit::Float(v) => Js::member(format!("{v:?}")),
        Lit::Str(s) => Js::member(serde_json::Value::String(s.clone()).to_string()),
        Lit::Bool(b) => Js::member(b.to_string()),
        Lit::Nil => Js::member("null"),
    }
}
