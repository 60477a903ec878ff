//! Static types as resolved by the front end.
//!
//! The model covers what the compiler core needs to reason about: named types (for method sets and interface
//! satisfaction), pointers (for pointer-receiver method sets), function signatures (for exact method matching) and
//! enough of the remaining shapes to pick zero values during emission.

use std::fmt;

use golly_core::lang::conventions;
use serde::{Deserialize, Serialize};

/// Predeclared basic types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Basic {
    Bool,
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Uintptr,
    Float32,
    Float64,
    String,
    /// Type of the untyped `nil` literal.
    Nil,
}

impl Basic {
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Basic::Int
                | Basic::Int8
                | Basic::Int16
                | Basic::Int32
                | Basic::Int64
                | Basic::Uint
                | Basic::Uint8
                | Basic::Uint16
                | Basic::Uint32
                | Basic::Uint64
                | Basic::Uintptr
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Basic::Float32 | Basic::Float64)
    }

    pub fn is_numeric(self) -> bool {
        self.is_integer() || self.is_float()
    }
}

/// A package-qualified type name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeName {
    pub package: String,
    pub name: String,
}

impl TypeName {
    pub fn new(package: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package: package.into(),
            name: name.into(),
        }
    }

    /// Definition ID of the declaring type.
    pub fn id(&self) -> String {
        conventions::definition_id(&self.package, &self.name)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.package, self.name)
    }
}

/// Function or method signature (receiver excluded).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    #[serde(default)]
    pub params: Vec<Type>,
    #[serde(default)]
    pub results: Vec<Type>,
    #[serde(default)]
    pub variadic: bool,
}

impl Signature {
    pub fn new(params: Vec<Type>, results: Vec<Type>) -> Self {
        Self {
            params,
            results,
            variadic: false,
        }
    }
}

/// A method requirement of an interface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodSig {
    pub name: String,
    #[serde(default)]
    pub sig: Signature,
}

impl MethodSig {
    pub fn new(name: impl Into<String>, sig: Signature) -> Self {
        Self { name: name.into(), sig }
    }
}

/// Structural interface type: a set of required methods.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceType {
    #[serde(default)]
    pub methods: Vec<MethodSig>,
}

impl InterfaceType {
    pub fn new(methods: Vec<MethodSig>) -> Self {
        Self { methods }
    }

    pub fn method(&self, name: &str) -> Option<&MethodSig> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn method_names(&self) -> impl Iterator<Item = &str> {
        self.methods.iter().map(|m| m.name.as_str())
    }
}

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Type {
    Basic(Basic),
    Named(TypeName),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Map { key: Box<Type>, value: Box<Type> },
    Func(Signature),
    Interface(InterfaceType),
    /// Multiple results of a call; the empty tuple is "no value".
    Tuple(Vec<Type>),
}

impl Default for Type {
    fn default() -> Self {
        Type::Tuple(Vec::new())
    }
}

impl Type {
    pub fn named(package: impl Into<String>, name: impl Into<String>) -> Self {
        Type::Named(TypeName::new(package, name))
    }

    pub fn pointer(inner: Type) -> Self {
        Type::Pointer(Box::new(inner))
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn basic(&self) -> Option<Basic> {
        match self {
            Type::Basic(b) => Some(*b),
            _ => None,
        }
    }

    /// The named type behind `T` or `*T`.
    pub fn named_base(&self) -> Option<&TypeName> {
        match self {
            Type::Named(n) => Some(n),
            Type::Pointer(inner) => match inner.as_ref() {
                Type::Named(n) => Some(n),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Basic(b) => write!(f, "{}", format!("{b:?}").to_lowercase()),
            Type::Named(n) => write!(f, "{n}"),
            Type::Pointer(inner) => write!(f, "*{inner}"),
            Type::Slice(elem) => write!(f, "[]{elem}"),
            Type::Map { key, value } => write!(f, "map[{key}]{value}"),
            Type::Func(sig) => {
                write!(f, "func(")?;
                write_list(f, &sig.params)?;
                write!(f, ")")?;
                if !sig.results.is_empty() {
                    write!(f, " (")?;
                    write_list(f, &sig.results)?;
                    write!(f, ")")?;
                }
                Ok(())
            }
            Type::Interface(iface) => {
                write!(f, "interface {{ ")?;
                for m in &iface.methods {
                    write!(f, "{}(); ", m.name)?;
                }
                write!(f, "}}")
            }
            Type::Tuple(items) => {
                write!(f, "(")?;
                write_list(f, items)?;
                write!(f, ")")
            }
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Type]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_base_sees_through_one_pointer() {
        let circle = Type::named("app", "Circle");
        assert_eq!(circle.named_base().map(|n| n.name.as_str()), Some("Circle"));
        assert_eq!(
            Type::pointer(circle.clone()).named_base().map(|n| n.name.as_str()),
            Some("Circle")
        );
        assert_eq!(Type::pointer(Type::pointer(circle)).named_base(), None);
    }

    #[test]
    fn display_is_go_like() {
        let ty = Type::Map {
            key: Box::new(Type::Basic(Basic::String)),
            value: Box::new(Type::slice(Type::pointer(Type::named("app", "Circle")))),
        };
        assert_eq!(ty.to_string(), "map[string][]*app.Circle");
    }

    #[test]
    fn composite_types_display() {
        let types = [
            Type::Func(Signature::new(
                vec![Type::Basic(Basic::Int), Type::Basic(Basic::String)],
                vec![Type::Basic(Basic::Bool)],
            )),
            Type::Interface(InterfaceType::new(vec![MethodSig::new("Area", Signature::default())])),
            Type::Tuple(vec![Type::Basic(Basic::Int), Type::Basic(Basic::Nil)]),
            Type::slice(Type::Basic(Basic::Uint8)),
        ];
        let rendered: Vec<String> = types.iter().map(Type::to_string).collect();
        insta::assert_snapshot!(rendered.join("\n"), @r"
        func(int, string) (bool)
        interface { Area(); }
        (int, nil)
        []uint8
        ");
    }

    #[test]
    fn json_shape_is_snake_case() {
        let json = serde_json::to_string(&Type::pointer(Type::Basic(Basic::Float64))).unwrap();
        assert_eq!(json, r#"{"pointer":{"basic":"float64"}}"#);
    }
}
