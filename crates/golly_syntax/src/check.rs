//! Structural-compatibility judgment.
//!
//! The compiler core never decides on its own whether a type satisfies an interface; it asks a [`TypeOracle`].
//! [`MethodSets`] is the oracle derived from a typed forest, following Go's method-set rules:
//!
//! - the method set of a named type `T` holds the methods declared with a value receiver,
//! - the method set of `*T` holds the methods declared with either receiver kind,
//! - an interface type's method set is its list of required methods.
//!
//! A type implements an interface when its method set contains every required method with an identical signature.

use std::collections::HashMap;

use crate::ast::{Decl, TypeSpec};
use crate::forest::TypedForest;
use crate::types::{InterfaceType, MethodSig, Type, TypeName};

/// Answers "does `ty` structurally satisfy `iface`?".
pub trait TypeOracle {
    fn implements(&self, ty: &Type, iface: &InterfaceType) -> bool;
}

#[derive(Debug, Clone)]
struct DeclaredMethod {
    sig: MethodSig,
    pointer: bool,
}

/// Method sets of every named type in a forest.
#[derive(Debug, Clone, Default)]
pub struct MethodSets {
    methods: HashMap<TypeName, Vec<DeclaredMethod>>,
    interfaces: HashMap<TypeName, InterfaceType>,
}

impl MethodSets {
    #[tracing::instrument(skip_all, fields(package_count = forest.packages.len()))]
    pub fn from_forest(forest: &TypedForest) -> Self {
        let mut sets = Self::default();
        for package in &forest.packages {
            for decl in &package.decls {
                match decl {
                    Decl::Func(func) => {
                        let Some(recv) = &func.recv else { continue };
                        sets.methods
                            .entry(TypeName::new(&package.path, &recv.type_name))
                            .or_default()
                            .push(DeclaredMethod {
                                sig: MethodSig::new(&func.name, func.signature()),
                                pointer: recv.pointer,
                            });
                    }
                    Decl::Type(ty) => {
                        if let TypeSpec::Interface { methods } = &ty.spec {
                            sets.interfaces.insert(
                                TypeName::new(&package.path, &ty.name),
                                InterfaceType::new(methods.clone()),
                            );
                        }
                    }
                    Decl::Var(_) => {}
                }
            }
        }
        sets
    }

    /// Methods available on `ty`, or `None` for types that carry no methods of their own.
    fn method_set<'a>(&'a self, ty: &'a Type) -> Option<Vec<&'a MethodSig>> {
        match ty {
            Type::Interface(iface) => Some(iface.methods.iter().collect()),
            Type::Named(name) => {
                if let Some(iface) = self.interfaces.get(name) {
                    return Some(iface.methods.iter().collect());
                }
                Some(self.declared(name, false))
            }
            Type::Pointer(inner) => match inner.as_ref() {
                Type::Named(name) if !self.interfaces.contains_key(name) => Some(self.declared(name, true)),
                _ => None,
            },
            _ => None,
        }
    }

    fn declared(&self, name: &TypeName, include_pointer: bool) -> Vec<&MethodSig> {
        self.methods
            .get(name)
            .map(|methods| {
                methods
                    .iter()
                    .filter(|m| include_pointer || !m.pointer)
                    .map(|m| &m.sig)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TypeOracle for MethodSets {
    fn implements(&self, ty: &Type, iface: &InterfaceType) -> bool {
        if iface.methods.is_empty() {
            return true;
        }
        let Some(set) = self.method_set(ty) else {
            return false;
        };
        iface
            .methods
            .iter()
            .all(|required| set.iter().any(|have| have.name == required.name && have.sig == required.sig))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{FuncDecl, Package, Param, Pos, Receiver, TypeDecl};
    use crate::types::{Basic, Signature};

    fn float() -> Type {
        Type::Basic(Basic::Float64)
    }

    fn area_sig() -> Signature {
        Signature::new(vec![], vec![float()])
    }

    fn method(recv: &str, pointer: bool, name: &str, sig: Signature) -> Decl {
        Decl::Func(FuncDecl {
            name: name.into(),
            doc: None,
            recv: Some(Receiver {
                name: Some("r".into()),
                type_name: recv.into(),
                pointer,
            }),
            params: sig
                .params
                .iter()
                .enumerate()
                .map(|(i, t)| Param::new(format!("p{i}"), t.clone()))
                .collect(),
            results: sig.results,
            variadic: false,
            body: None,
            pos: Pos::default(),
        })
    }

    fn struct_decl(name: &str) -> Decl {
        Decl::Type(TypeDecl {
            name: name.into(),
            doc: None,
            spec: TypeSpec::Struct { fields: vec![] },
            pos: Pos::default(),
        })
    }

    fn shape() -> InterfaceType {
        InterfaceType::new(vec![MethodSig::new("Area", area_sig())])
    }

    fn forest() -> TypedForest {
        TypedForest {
            packages: vec![Package {
                path: "app".into(),
                name: "main".into(),
                imports: vec![],
                decls: vec![
                    struct_decl("Circle"),
                    struct_decl("Square"),
                    struct_decl("Label"),
                    method("Circle", false, "Area", area_sig()),
                    method("Square", true, "Area", area_sig()),
                    // Same name, different signature: must not satisfy Shape.
                    method("Label", false, "Area", Signature::new(vec![], vec![Type::Basic(Basic::String)])),
                ],
            }],
        }
    }

    #[test]
    fn value_receiver_methods_belong_to_both_value_and_pointer() {
        let sets = MethodSets::from_forest(&forest());
        assert!(sets.implements(&Type::named("app", "Circle"), &shape()));
        assert!(sets.implements(&Type::pointer(Type::named("app", "Circle")), &shape()));
    }

    #[test]
    fn pointer_receiver_methods_only_belong_to_pointer() {
        let sets = MethodSets::from_forest(&forest());
        assert!(!sets.implements(&Type::named("app", "Square"), &shape()));
        assert!(sets.implements(&Type::pointer(Type::named("app", "Square")), &shape()));
    }

    #[test]
    fn signature_mismatch_is_rejected() {
        let sets = MethodSets::from_forest(&forest());
        assert!(!sets.implements(&Type::named("app", "Label"), &shape()));
    }

    #[test]
    fn empty_interface_is_satisfied_by_anything() {
        let sets = MethodSets::from_forest(&forest());
        assert!(sets.implements(&Type::Basic(Basic::Int), &InterfaceType::default()));
    }

    #[test]
    fn interfaces_satisfy_subsets_of_themselves() {
        let sets = MethodSets::from_forest(&forest());
        let wide = Type::Interface(InterfaceType::new(vec![
            MethodSig::new("Area", area_sig()),
            MethodSig::new("Perimeter", area_sig()),
        ]));
        assert!(sets.implements(&wide, &shape()));
        assert!(!sets.implements(&Type::Basic(Basic::Int), &shape()));
    }
}
