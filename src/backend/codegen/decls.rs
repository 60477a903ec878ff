//! Declaration emission: functions, methods, struct classes and package variables.

use golly_core::lang::js_keywords::escape_ident;
use golly_syntax::ast::{FuncDecl, Param};

use super::{JsCodegen, global_name, has_global, property_name};
use crate::backend::errors::EmitError;
use crate::backend::intrinsic;
use crate::backend::js_emitter::JsEmitter;
use crate::index::{
    DefId, DefKind, Definition, FunctionDef, Intrinsic, MethodDef, StructDef, TemplateMode, VariableDef,
};

impl<'a, 'f> JsCodegen<'a, 'f> {
    /// Render one definition, or `None` when it has no declaration text.
    pub(crate) fn emit_definition(&mut self, id: DefId, level: usize) -> Result<Option<String>, EmitError> {
        let index = self.index;
        let def = index.def(id);
        if def.omitted() {
            return Ok(None);
        }
        self.current = Some(id);
        self.out = JsEmitter::at_level(level);

        let emitted = match def.kind() {
            DefKind::Function(f) => self.emit_function(def, f)?,
            DefKind::Method(m) => self.emit_method(def, m)?,
            DefKind::Struct(s) => self.emit_struct(def, s),
            DefKind::Interface(_) => false,
            DefKind::Variable(v) => self.emit_variable(def, v)?,
        };

        if emitted {
            let global = match def.kind() {
                DefKind::Method(_) => self.free_method_name(def)?,
                _ => has_global(def).then(|| global_name(def)),
            };
            if let Some(name) = global {
                self.claim_global(id, name)?;
            }
        }

        let text = std::mem::take(&mut self.out).finish();
        self.current = None;
        Ok(emitted.then_some(text))
    }

    fn emit_function(&mut self, def: &Definition<'f>, f: &FunctionDef<'f>) -> Result<bool, EmitError> {
        if matches!(&f.intrinsic, Some(i) if i.mode == TemplateMode::Call) {
            return Ok(false);
        }
        let params = self.params(f.decl);
        self.out.linef(format_args!("function {}({params}) {{", global_name(def)));
        self.emit_function_body(def, f.decl, f.intrinsic.as_ref(), "")?;
        self.out.line("}");
        Ok(true)
    }

    fn emit_method(&mut self, def: &Definition<'f>, m: &MethodDef<'f>) -> Result<bool, EmitError> {
        if matches!(&m.intrinsic, Some(i) if i.mode == TemplateMode::Call) {
            return Ok(false);
        }
        let params = self.params(m.decl);
        if let Some(name) = self.free_method_name(def)? {
            let recv = free_receiver(m.decl);
            let params = if params.is_empty() {
                recv.clone()
            } else {
                format!("{recv}, {params}")
            };
            self.out.linef(format_args!("function {name}({params}) {{"));
            self.emit_function_body(def, m.decl, m.intrinsic.as_ref(), &recv)?;
            self.out.line("}");
            return Ok(true);
        }

        let receiver = self.lookup(&m.receiver.id())?;
        self.out.linef(format_args!(
            "{}.prototype.{} = function({params}) {{",
            global_name(receiver),
            property_name(def)
        ));
        self.emit_function_body(def, m.decl, m.intrinsic.as_ref(), "this")?;
        self.out.line("};");
        Ok(true)
    }

    /// Indented body of a function or method, with parameters in scope.
    fn emit_function_body(
        &mut self,
        def: &Definition<'f>,
        decl: &FuncDecl,
        intrinsic: Option<&Intrinsic<'f>>,
        receiver: &str,
    ) -> Result<(), EmitError> {
        self.out.indent();
        self.out.push_scope();
        for param in &decl.params {
            self.out.declare_var(&escape_ident(&param.name));
        }

        if receiver == "this" {
            if let Some(recv) = decl.recv.as_ref().and_then(|r| r.name.as_deref()).filter(|n| *n != "_") {
                let name = escape_ident(recv);
                self.out.linef(format_args!("const {name} = this;"));
                self.out.declare_var(&name);
            }
        } else if !receiver.is_empty() {
            self.out.declare_var(receiver);
        }

        let result = match (intrinsic, &decl.body) {
            (Some(intrinsic), _) => self.emit_raw_body(def, intrinsic, receiver),
            (None, Some(body)) => self.emit_stmts(&body.stmts),
            (None, None) => Err(self.unsupported(format!("`{}` has no body", def.name()))),
        };

        self.out.pop_scope();
        self.out.dedent();
        result
    }

    /// Body replaced by a `js.Raw` template; parameters and the receiver stay plain locals.
    fn emit_raw_body(
        &mut self,
        def: &Definition<'f>,
        intrinsic: &Intrinsic<'f>,
        receiver: &str,
    ) -> Result<(), EmitError> {
        let mut args = Vec::with_capacity(intrinsic.args.len());
        for arg in intrinsic.args {
            args.push(self.expr(arg)?.text);
        }
        let text = intrinsic::render(def.id(), &intrinsic.pos, &intrinsic.template, receiver, &args)?;
        self.out.raw_lines(&text);
        Ok(())
    }

    fn emit_struct(&mut self, def: &Definition<'f>, s: &StructDef<'f>) -> bool {
        let Some(fields) = s.fields() else {
            // `type Celsius float64` has no runtime representation of its own.
            return false;
        };
        let name = global_name(def);
        if fields.is_empty() {
            self.out.linef(format_args!("class {name} {{}}"));
            return true;
        }
        self.out.linef(format_args!("class {name} {{"));
        self.out.indent();
        self.out.line("constructor(o = {}) {");
        self.out.indent();
        for field in fields {
            let zero = self.zero_value(&field.ty);
            self.out.linef(format_args!("this.{0} = o.{0} || {zero};", field.name));
        }
        self.out.dedent();
        self.out.line("}");
        self.out.dedent();
        self.out.line("}");
        true
    }

    fn emit_variable(&mut self, def: &Definition<'f>, v: &VariableDef<'f>) -> Result<bool, EmitError> {
        let init = match &v.decl.value {
            Some(value) => self.expr(value)?.text,
            None => self.zero_value(&v.decl.ty),
        };
        self.out.linef(format_args!("var {} = {init};", global_name(def)));
        Ok(true)
    }

    /// Parameter list; the variadic tail becomes a rest parameter.
    pub(super) fn params(&self, decl: &FuncDecl) -> String {
        param_list(&decl.params, decl.variadic)
    }
}

/// Leading parameter that carries the receiver of a free-function method.
fn free_receiver(decl: &FuncDecl) -> String {
    match decl.recv.as_ref().and_then(|r| r.name.as_deref()) {
        Some(name) if !name.is_empty() && name != "_" => escape_ident(name),
        _ => "recv$".to_string(),
    }
}

pub(super) fn param_list(params: &[Param], variadic: bool) -> String {
    let last = params.len().saturating_sub(1);
    params
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let name = if p.name.is_empty() || p.name == "_" {
                format!("_{i}")
            } else {
                escape_ident(&p.name)
            };
            if variadic && i == last { format!("...{name}") } else { name }
        })
        .collect::<Vec<_>>()
        .join(", ")
}
