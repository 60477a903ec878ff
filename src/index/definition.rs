//! Definitions: one entry per top-level declaration of the program.
//!
//! [`Definition`] is a closed tagged union over the declaration variants ([`DefKind`]). Consumers match on the kind
//! exhaustively; adding a variant is a compile error at every site that has to learn about it.
//!
//! Definitions borrow their typed syntax node from the forest (`'f`) and never own one another: edges between them
//! are [`DefId`] handles into the [`Index`](super::Index) arena.

use std::cell::OnceCell;

use golly_core::Template;
use golly_core::lang::conventions;
use golly_syntax::ast::{Expr, Field, FuncDecl, Pos, TypeDecl, TypeSpec, VarDecl};
use golly_syntax::types::{InterfaceType, Signature, Type, TypeName};

/// Stable handle of a definition: its position in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DefId(u32);

impl DefId {
    pub(crate) fn from_index(index: usize) -> Self {
        // The arena never holds more than u32::MAX definitions; a forest that large would not fit in memory.
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether an intrinsic replaces call sites or the declaration body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateMode {
    /// `js.Rewrite(...)`: every call site becomes the template text.
    Call,
    /// `js.Raw(...)`: the declaration is emitted with the template as its body.
    Body,
}

/// A raw-code override attached to a function or method.
#[derive(Debug, Clone)]
pub struct Intrinsic<'f> {
    pub template: Template,
    /// Expressions bound to `$1..$n`, written in terms of the declaration's parameters.
    pub args: &'f [Expr],
    pub mode: TemplateMode,
    pub pos: Pos,
}

#[derive(Debug)]
pub struct FunctionDef<'f> {
    pub decl: &'f FuncDecl,
    pub intrinsic: Option<Intrinsic<'f>>,
}

#[derive(Debug)]
pub struct MethodDef<'f> {
    pub decl: &'f FuncDecl,
    /// Base type the method is declared on.
    pub receiver: TypeName,
    /// `T` or `*T`, depending on the receiver kind.
    pub receiver_type: Type,
    pub intrinsic: Option<Intrinsic<'f>>,
}

/// A named type declaration; structs and `type X Y` alike.
#[derive(Debug)]
pub struct StructDef<'f> {
    pub decl: &'f TypeDecl,
}

impl<'f> StructDef<'f> {
    /// Fields when the declaration is a struct, `None` for other named types.
    pub fn fields(&self) -> Option<&'f [Field]> {
        match &self.decl.spec {
            TypeSpec::Struct { fields } => Some(fields),
            _ => None,
        }
    }

    /// Underlying type of a non-struct named type.
    pub fn underlying(&self) -> Option<&'f Type> {
        match &self.decl.spec {
            TypeSpec::Named(ty) => Some(ty),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct InterfaceDef<'f> {
    pub decl: &'f TypeDecl,
    pub kind: InterfaceType,
}

impl InterfaceDef<'_> {
    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.kind.method_names()
    }
}

#[derive(Debug)]
pub struct VariableDef<'f> {
    pub decl: &'f VarDecl,
}

#[derive(Debug)]
pub enum DefKind<'f> {
    Function(FunctionDef<'f>),
    Method(MethodDef<'f>),
    Struct(StructDef<'f>),
    Interface(InterfaceDef<'f>),
    Variable(VariableDef<'f>),
}

/// Read-only view of the syntax node a definition was built from.
#[derive(Debug, Clone, Copy)]
pub enum TypedNode<'f> {
    Func(&'f FuncDecl),
    Type(&'f TypeDecl),
    Var(&'f VarDecl),
}

#[derive(Debug)]
pub struct Definition<'f> {
    id: String,
    name: String,
    path: String,
    exported: bool,
    omitted: bool,
    rename: Option<String>,
    pos: Pos,
    kind: DefKind<'f>,
    pub(crate) dependencies: OnceCell<Vec<DefId>>,
}

impl<'f> Definition<'f> {
    pub fn new(path: &str, name: &str, pos: Pos, kind: DefKind<'f>) -> Self {
        let id = match &kind {
            DefKind::Method(m) => conventions::method_id(path, &m.receiver.name, name),
            _ => conventions::definition_id(path, name),
        };
        Self {
            id,
            name: name.to_string(),
            path: path.to_string(),
            exported: conventions::is_exported(name),
            omitted: false,
            rename: None,
            pos,
            kind,
            dependencies: OnceCell::new(),
        }
    }

    pub fn with_rename(mut self, rename: Option<String>) -> Self {
        self.rename = rename;
        self
    }

    pub fn with_omitted(mut self, omitted: bool) -> Self {
        self.omitted = omitted;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Import path of the owning package.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn exported(&self) -> bool {
        self.exported
    }

    pub fn omitted(&self) -> bool {
        self.omitted
    }

    pub fn rename(&self) -> Option<&str> {
        self.rename.as_deref()
    }

    pub fn pos(&self) -> &Pos {
        &self.pos
    }

    pub fn kind(&self) -> &DefKind<'f> {
        &self.kind
    }

    pub fn typed_node(&self) -> TypedNode<'f> {
        match &self.kind {
            DefKind::Function(f) => TypedNode::Func(f.decl),
            DefKind::Method(m) => TypedNode::Func(m.decl),
            DefKind::Struct(s) => TypedNode::Type(s.decl),
            DefKind::Interface(i) => TypedNode::Type(i.decl),
            DefKind::Variable(v) => TypedNode::Var(v.decl),
        }
    }

    /// Resolved static type. Methods include their receiver as the leading parameter.
    pub fn ty(&self) -> Type {
        match &self.kind {
            DefKind::Function(f) => Type::Func(f.decl.signature()),
            DefKind::Method(m) => {
                let sig = m.decl.signature();
                let mut params = Vec::with_capacity(sig.params.len() + 1);
                params.push(m.receiver_type.clone());
                params.extend(sig.params);
                Type::Func(Signature::new(params, sig.results))
            }
            DefKind::Struct(_) => Type::named(&self.path, &self.name),
            DefKind::Interface(i) => Type::Interface(i.kind.clone()),
            DefKind::Variable(v) => v.decl.ty.clone(),
        }
    }

    pub fn intrinsic(&self) -> Option<&Intrinsic<'f>> {
        match &self.kind {
            DefKind::Function(f) => f.intrinsic.as_ref(),
            DefKind::Method(m) => m.intrinsic.as_ref(),
            DefKind::Struct(_) | DefKind::Interface(_) | DefKind::Variable(_) => None,
        }
    }

    pub fn as_method(&self) -> Option<&MethodDef<'f>> {
        match &self.kind {
            DefKind::Method(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_interface(&self) -> Option<&InterfaceDef<'f>> {
        match &self.kind {
            DefKind::Interface(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&StructDef<'f>> {
        match &self.kind {
            DefKind::Struct(s) => Some(s),
            _ => None,
        }
    }

    /// Short label used in logs and error messages.
    pub fn kind_label(&self) -> &'static str {
        match &self.kind {
            DefKind::Function(_) => "function",
            DefKind::Method(_) => "method",
            DefKind::Struct(_) => "type",
            DefKind::Interface(_) => "interface",
            DefKind::Variable(v) if v.decl.constant => "constant",
            DefKind::Variable(_) => "variable",
        }
    }
}
