//! The Definition Index: every top-level declaration of one compile, keyed by definition ID.
//!
//! The Index is an arena. Definitions are stored in registration order and addressed by [`DefId`]; edges between
//! definitions (dependencies, interface implementations) are handles into this arena, never references between
//! definitions. It is built by a single writer ([`build_index`]) and read-only afterwards; only the per-definition
//! dependency cache is filled on demand.
//!
//! ## Example
//!
//! ```rust,ignore
//! let indexed = build_index(&forest)?;
//! let main = indexed.index.lookup("app main").ok_or(...)?;
//! for dep in indexed.index.dependencies(main, &resolutions)? {
//!     println!("{}", indexed.index.def(*dep).id());
//! }
//! ```

mod build;
mod definition;
mod errors;
pub(crate) mod refs;

use std::collections::{HashMap, HashSet};

use golly_syntax::types::Type;
use indexmap::IndexMap;

pub use build::{Indexed, InterfaceCallSite, build_index};
pub use definition::{
    DefId, DefKind, Definition, FunctionDef, InterfaceDef, Intrinsic, MethodDef, StructDef, TemplateMode, TypedNode,
    VariableDef,
};
pub use errors::IndexError;

use crate::resolve::Resolutions;
use refs::Reference;

/// How many `type A B` hops are followed before a named type is treated as opaque.
pub(crate) const MAX_NAMED_DEPTH: usize = 16;

#[derive(Debug, Default)]
pub struct Index<'f> {
    defs: IndexMap<String, Definition<'f>>,
    /// Method definitions bucketed by method name, in registration order.
    methods_by_name: HashMap<String, Vec<DefId>>,
}

impl<'f> Index<'f> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a definition. Fails if its ID is already taken.
    pub fn register(&mut self, def: Definition<'f>) -> Result<DefId, IndexError> {
        if self.defs.contains_key(def.id()) {
            return Err(IndexError::DuplicateId {
                id: def.id().to_string(),
                pos: def.pos().clone(),
            });
        }
        let handle = DefId::from_index(self.defs.len());
        if let DefKind::Method(_) = def.kind() {
            self.methods_by_name.entry(def.name().to_string()).or_default().push(handle);
        }
        self.defs.insert(def.id().to_string(), def);
        Ok(handle)
    }

    pub fn get(&self, id: &str) -> Option<&Definition<'f>> {
        self.defs.get(id)
    }

    /// Handle of the definition with this ID.
    pub fn lookup(&self, id: &str) -> Option<DefId> {
        self.defs.get_index_of(id).map(DefId::from_index)
    }

    /// Definition behind a handle issued by this index.
    ///
    /// Handles are only minted by [`Index::register`], so an out-of-range handle is a caller bug and panics.
    pub fn def(&self, id: DefId) -> &Definition<'f> {
        &self.defs[id.index()]
    }

    /// Every definition, in registration order.
    pub fn all(&self) -> impl Iterator<Item = (DefId, &Definition<'f>)> {
        self.defs.values().enumerate().map(|(i, def)| (DefId::from_index(i), def))
    }

    /// Methods with this name, in registration order.
    pub fn methods_named(&self, name: &str) -> &[DefId] {
        self.methods_by_name.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Definitions `id` references, in first-appearance order without duplicates.
    ///
    /// Computed on first request and cached on the definition. Interface calls contribute every implementation
    /// recorded in `resolutions`.
    pub fn dependencies(&self, id: DefId, resolutions: &Resolutions) -> Result<&[DefId], IndexError> {
        let def = self.def(id);
        if let Some(deps) = def.dependencies.get() {
            return Ok(deps);
        }
        let deps = self.compute_dependencies(def, resolutions)?;
        Ok(def.dependencies.get_or_init(|| deps))
    }

    fn compute_dependencies(&self, def: &Definition<'f>, resolutions: &Resolutions) -> Result<Vec<DefId>, IndexError> {
        let mut found: Vec<Reference<'f>> = Vec::new();
        let mut push = |r: Reference<'f>| found.push(r);

        match def.kind() {
            DefKind::Function(f) => match &f.intrinsic {
                Some(intrinsic) => intrinsic.args.iter().for_each(|a| refs::walk_expr(a, &mut push)),
                None => {
                    if let Some(body) = &f.decl.body {
                        refs::walk_block(body, &mut push);
                    }
                }
            },
            DefKind::Method(m) => {
                push(Reference::Def(m.receiver.id()));
                match &m.intrinsic {
                    Some(intrinsic) => intrinsic.args.iter().for_each(|a| refs::walk_expr(a, &mut push)),
                    None => {
                        if let Some(body) = &m.decl.body {
                            refs::walk_block(body, &mut push);
                        }
                    }
                }
            }
            DefKind::Struct(s) => {
                for field in s.fields().unwrap_or_default() {
                    push(Reference::ZeroValue(&field.ty));
                }
            }
            DefKind::Interface(_) => {}
            DefKind::Variable(v) => match &v.decl.value {
                Some(value) => refs::walk_expr(value, &mut push),
                None => push(Reference::ZeroValue(&v.decl.ty)),
            },
        }

        let mut seen = HashSet::new();
        let mut deps = Vec::new();
        let mut add = |dep: DefId| {
            if seen.insert(dep) {
                deps.push(dep);
            }
        };
        for reference in found {
            match reference {
                Reference::Def(target) => {
                    let dep = self.lookup(&target).ok_or_else(|| IndexError::UnknownReference {
                        from: def.id().to_string(),
                        id: target,
                    })?;
                    add(dep);
                }
                Reference::Interface { interface, method, .. } => {
                    let iface = self.interface_handle(def.id(), &interface.id(), method)?;
                    for &implementation in resolutions.implementations(iface, method) {
                        add(implementation);
                    }
                }
                Reference::ZeroValue(ty) => {
                    if let Some(dep) = self.zero_value_struct(ty) {
                        add(dep);
                    }
                }
            }
        }
        Ok(deps)
    }

    /// Handle of the interface an interface call site names.
    pub(crate) fn interface_handle(&self, from: &str, id: &str, method: &str) -> Result<DefId, IndexError> {
        let handle = self.lookup(id).ok_or_else(|| IndexError::UnknownReference {
            from: from.to_string(),
            id: id.to_string(),
        })?;
        match self.def(handle).kind() {
            DefKind::Interface(_) => Ok(handle),
            _ => Err(IndexError::NotAnInterface {
                from: from.to_string(),
                id: id.to_string(),
                method: method.to_string(),
            }),
        }
    }

    /// The struct whose constructor a zero value of `ty` calls, if any.
    ///
    /// Named types over named types are followed to the struct underneath; `type Alias Inner` constructs an `Inner`.
    /// Named types that are not in the index (the host-binding package) have no zero-value constructor.
    pub fn zero_value_struct(&self, ty: &Type) -> Option<DefId> {
        let mut ty = ty;
        // The bound only guards against malformed cyclic declarations.
        for _ in 0..MAX_NAMED_DEPTH {
            let Type::Named(name) = ty else { return None };
            let handle = self.lookup(&name.id())?;
            let s = self.def(handle).as_struct()?;
            if s.fields().is_some() {
                return Some(handle);
            }
            ty = s.underlying()?;
        }
        None
    }
}
