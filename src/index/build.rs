//! Index construction: one walk over the forest's top-level declarations.

use golly_core::Template;
use golly_core::lang::{annotations, conventions};
use golly_syntax::ast::{Callee, Decl, ExprKind, FuncDecl, Lit, Package, Pos, Stmt, TypeDecl, TypeSpec};
use golly_syntax::forest::TypedForest;
use golly_syntax::types::{InterfaceType, Type, TypeName};

use super::definition::{
    DefId, DefKind, Definition, FunctionDef, InterfaceDef, Intrinsic, MethodDef, StructDef, TemplateMode, VariableDef,
};
use super::errors::IndexError;
use super::refs::{self, Reference};
use super::Index;

/// A method call on an interface-typed receiver, found while indexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceCallSite {
    pub interface: DefId,
    pub method: String,
    /// Definition whose code contains the call.
    pub caller: DefId,
    pub pos: Pos,
}

/// Output of the Index stage.
#[derive(Debug)]
pub struct Indexed<'f> {
    pub index: Index<'f>,
    /// Interface call sites in discovery order.
    pub call_sites: Vec<InterfaceCallSite>,
}

/// Register every top-level declaration of `forest`, in package order then source order.
#[tracing::instrument(skip_all, fields(package_count = forest.packages.len()))]
pub fn build_index(forest: &TypedForest) -> Result<Indexed<'_>, IndexError> {
    let mut index = Index::new();
    for package in &forest.packages {
        for decl in &package.decls {
            index.register(definition_for(package, decl)?)?;
        }
    }

    let call_sites = collect_call_sites(&index)?;
    tracing::debug!(
        definitions = index.len(),
        call_sites = call_sites.len(),
        "index built"
    );
    Ok(Indexed { index, call_sites })
}

fn definition_for<'f>(package: &'f Package, decl: &'f Decl) -> Result<Definition<'f>, IndexError> {
    let path = package.path.as_str();
    let kind = match decl {
        Decl::Func(func) => func_kind(path, func)?,
        Decl::Type(ty) => type_kind(ty),
        Decl::Var(var) => DefKind::Variable(VariableDef { decl: var }),
    };
    let def = Definition::new(path, decl.name(), decl.pos().clone(), kind);

    let Some(annotation) = decl.doc().and_then(annotations::parse) else {
        return Ok(def);
    };
    for flag in &annotation.unknown_flags {
        tracing::warn!(id = def.id(), flag = flag.as_str(), "ignoring unknown annotation flag");
    }
    Ok(def.with_rename(annotation.rename).with_omitted(annotation.omit))
}

fn func_kind<'f>(path: &str, func: &'f FuncDecl) -> Result<DefKind<'f>, IndexError> {
    let intrinsic = detect_intrinsic(path, func)?;
    Ok(match &func.recv {
        Some(recv) => {
            let receiver = TypeName::new(path, &recv.type_name);
            let named = Type::Named(receiver.clone());
            DefKind::Method(MethodDef {
                decl: func,
                receiver,
                receiver_type: if recv.pointer { Type::pointer(named) } else { named },
                intrinsic,
            })
        }
        None => DefKind::Function(FunctionDef { decl: func, intrinsic }),
    })
}

fn type_kind(ty: &TypeDecl) -> DefKind<'_> {
    match &ty.spec {
        TypeSpec::Interface { methods } => DefKind::Interface(InterfaceDef {
            decl: ty,
            kind: InterfaceType::new(methods.clone()),
        }),
        TypeSpec::Struct { .. } | TypeSpec::Named(_) => DefKind::Struct(StructDef { decl: ty }),
    }
}

/// Recognize `js.Rewrite("...", args...)` / `js.Raw("...", args...)` as the first statement of a body.
fn detect_intrinsic<'f>(path: &str, func: &'f FuncDecl) -> Result<Option<Intrinsic<'f>>, IndexError> {
    let Some(Stmt::Expr(first)) = func.body.as_ref().and_then(|b| b.stmts.first()) else {
        return Ok(None);
    };
    let ExprKind::Call(call) = &first.kind else {
        return Ok(None);
    };
    let Callee::Func(target) = &call.callee else {
        return Ok(None);
    };
    if target.package != conventions::INTRINSIC_PACKAGE {
        return Ok(None);
    }
    let mode = match target.name.as_str() {
        conventions::REWRITE_FN => TemplateMode::Call,
        conventions::RAW_FN => TemplateMode::Body,
        _ => return Ok(None),
    };

    let id = match &func.recv {
        Some(recv) => conventions::method_id(path, &recv.type_name, &func.name),
        None => conventions::definition_id(path, &func.name),
    };
    let malformed = |reason: &str| IndexError::MalformedIntrinsic {
        id: id.clone(),
        pos: call.pos.clone(),
        reason: reason.to_string(),
    };
    let (template, args) = call
        .args
        .split_first()
        .ok_or_else(|| malformed("missing template argument"))?;
    let ExprKind::Lit(Lit::Str(text)) = &template.kind else {
        return Err(malformed("template is not a string literal"));
    };

    Ok(Some(Intrinsic {
        template: Template::parse(text),
        args,
        mode,
        pos: call.pos.clone(),
    }))
}

/// Find every interface method call in function, method and variable code.
fn collect_call_sites<'f>(index: &Index<'f>) -> Result<Vec<InterfaceCallSite>, IndexError> {
    let mut sites = Vec::new();
    for (caller, def) in index.all() {
        let mut found = Vec::new();
        let mut push = |r: Reference<'f>| found.push(r);
        match def.kind() {
            DefKind::Function(FunctionDef { decl, intrinsic }) | DefKind::Method(MethodDef { decl, intrinsic, .. }) => {
                match intrinsic {
                    Some(intrinsic) => intrinsic.args.iter().for_each(|a| refs::walk_expr(a, &mut push)),
                    None => {
                        if let Some(body) = &decl.body {
                            refs::walk_block(body, &mut push);
                        }
                    }
                }
            }
            DefKind::Variable(v) => {
                if let Some(value) = &v.decl.value {
                    refs::walk_expr(value, &mut push);
                }
            }
            DefKind::Struct(_) | DefKind::Interface(_) => {}
        }

        for reference in found {
            if let Reference::Interface { interface, method, pos } = reference {
                let interface = index.interface_handle(def.id(), &interface.id(), method)?;
                sites.push(InterfaceCallSite {
                    interface,
                    method: method.to_string(),
                    caller,
                    pos: pos.clone(),
                });
            }
        }
    }
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use golly_syntax::ast::{Block, Expr, Field, MethodRef, Receiver, Ref, VarDecl};
    use golly_syntax::types::{Basic, MethodSig, Signature};

    fn func(name: &str, recv: Option<(&str, bool)>, doc: Option<&str>, stmts: Vec<Stmt>) -> Decl {
        Decl::Func(FuncDecl {
            name: name.into(),
            doc: doc.map(str::to_string),
            recv: recv.map(|(type_name, pointer)| Receiver {
                name: Some("p".into()),
                type_name: type_name.into(),
                pointer,
            }),
            params: vec![],
            results: vec![],
            variadic: false,
            body: Some(Block::new(stmts)),
            pos: Pos::new("dom.go", 3, 1),
        })
    }

    fn rewrite(template: Expr, rest: Vec<Expr>) -> Stmt {
        let mut args = vec![template];
        args.extend(rest);
        Stmt::Expr(Expr::call(
            Callee::Func(Ref::new(conventions::INTRINSIC_PACKAGE, conventions::REWRITE_FN)),
            args,
            Type::default(),
        ))
    }

    fn str_lit(s: &str) -> Expr {
        Expr::lit(Lit::Str(s.into()), Type::Basic(Basic::String))
    }

    fn package(decls: Vec<Decl>) -> TypedForest {
        TypedForest::new(vec![Package {
            path: "dom".into(),
            name: "dom".into(),
            imports: vec![conventions::INTRINSIC_PACKAGE.into()],
            decls,
        }])
    }

    #[test]
    fn annotations_rename_and_omit() {
        let forest = package(vec![
            Decl::Type(TypeDecl {
                name: "WebKitPoint".into(),
                doc: Some("WebKitPoint struct\njs:\"WebKitPoint,omit\"".into()),
                spec: TypeSpec::Struct {
                    fields: vec![Field::new("X", Type::Basic(Basic::Float64))],
                },
                pos: Pos::default(),
            }),
            Decl::Var(VarDecl {
                name: "document".into(),
                doc: Some("js:\"document\"".into()),
                constant: false,
                ty: Type::named("dom", "Document"),
                value: None,
                pos: Pos::default(),
            }),
        ]);
        let indexed = build_index(&forest).unwrap();
        let point = indexed.index.get("dom WebKitPoint").unwrap();
        assert!(point.omitted());
        assert!(point.exported());
        assert_eq!(point.rename(), Some("WebKitPoint"));
        let document = indexed.index.get("dom document").unwrap();
        assert!(!document.omitted());
        assert!(!document.exported());
        assert_eq!(document.rename(), Some("document"));
    }

    #[test]
    fn rewrite_body_becomes_call_template() {
        let x = Expr::local("x", Type::Basic(Basic::Float64));
        let forest = package(vec![func(
            "SetX",
            Some(("WebKitPoint", true)),
            None,
            vec![rewrite(str_lit("$_.x = $1"), vec![x.clone()])],
        )]);
        let indexed = build_index(&forest).unwrap();
        let def = indexed.index.get("dom WebKitPoint.SetX").unwrap();
        let intrinsic = def.intrinsic().unwrap();
        assert_eq!(intrinsic.mode, TemplateMode::Call);
        assert_eq!(intrinsic.template.source(), "$_.x = $1");
        assert_eq!(intrinsic.args, &[x][..]);
        assert_eq!(def.kind_label(), "method");
    }

    #[test]
    fn non_literal_template_is_malformed() {
        let forest = package(vec![func(
            "Alert",
            None,
            None,
            vec![rewrite(Expr::local("s", Type::Basic(Basic::String)), vec![])],
        )]);
        let err = build_index(&forest).unwrap_err();
        assert!(matches!(err, IndexError::MalformedIntrinsic { ref id, .. } if id == "dom Alert"));
    }

    #[test]
    fn interface_calls_are_recorded_as_call_sites() {
        let shape = Decl::Type(TypeDecl {
            name: "Shape".into(),
            doc: None,
            spec: TypeSpec::Interface {
                methods: vec![MethodSig::new("Area", Signature::default())],
            },
            pos: Pos::default(),
        });
        let call = Stmt::Expr(Expr::call(
            Callee::Interface {
                recv: Box::new(Expr::local("s", Type::named("dom", "Shape"))),
                interface: Ref::new("dom", "Shape"),
                name: "Area".into(),
            },
            vec![],
            Type::default(),
        ));
        let forest = package(vec![shape, func("measure", None, None, vec![call])]);
        let indexed = build_index(&forest).unwrap();
        assert_eq!(indexed.call_sites.len(), 1);
        let site = &indexed.call_sites[0];
        assert_eq!(indexed.index.def(site.interface).id(), "dom Shape");
        assert_eq!(indexed.index.def(site.caller).id(), "dom measure");
        assert_eq!(site.method, "Area");
    }

    #[test]
    fn interface_call_on_a_struct_is_rejected() {
        let call = Stmt::Expr(Expr::call(
            Callee::Interface {
                recv: Box::new(Expr::local("s", Type::named("dom", "Point"))),
                interface: Ref::new("dom", "Point"),
                name: "Area".into(),
            },
            vec![],
            Type::default(),
        ));
        let point = Decl::Type(TypeDecl {
            name: "Point".into(),
            doc: None,
            spec: TypeSpec::Struct { fields: vec![] },
            pos: Pos::default(),
        });
        let forest = package(vec![point, func("measure", None, None, vec![call])]);
        assert!(matches!(
            build_index(&forest).unwrap_err(),
            IndexError::NotAnInterface { ref id, .. } if id == "dom Point"
        ));
    }

    #[test]
    fn methods_are_bucketed_by_name() {
        let call = |name: &str| {
            Stmt::Expr(Expr::call(
                Callee::Method {
                    recv: Box::new(Expr::local("p", Type::named("dom", "A"))),
                    method: MethodRef::new("dom", "A", name),
                },
                vec![],
                Type::default(),
            ))
        };
        let forest = package(vec![
            func("Area", Some(("A", false)), None, vec![]),
            func("Len", Some(("A", false)), None, vec![call("Area")]),
            func("Area", Some(("B", true)), None, vec![]),
        ]);
        let indexed = build_index(&forest).unwrap();
        let areas: Vec<_> = indexed
            .index
            .methods_named("Area")
            .iter()
            .map(|&m| indexed.index.def(m).id())
            .collect();
        assert_eq!(areas, vec!["dom A.Area", "dom B.Area"]);
    }
}
