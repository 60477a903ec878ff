//! Interface resolution: which concrete methods an interface method call may dispatch to.
//!
//! JavaScript has no structural interfaces, so every interface-typed call site is resolved at compile time to the
//! set of methods that could answer it. The Index keeps methods bucketed by name; a query only inspects methods that
//! share the requested name and asks the [`TypeOracle`] whether their receiver type satisfies the interface.

use std::collections::HashMap;

use golly_syntax::check::TypeOracle;

use crate::index::{DefId, DefKind, Index, InterfaceCallSite};

/// Answers `ImplementedBy` queries over one Index.
pub struct InterfaceResolver<'a, 'f> {
    index: &'a Index<'f>,
    oracle: &'a dyn TypeOracle,
}

impl<'a, 'f> InterfaceResolver<'a, 'f> {
    pub fn new(index: &'a Index<'f>, oracle: &'a dyn TypeOracle) -> Self {
        Self { index, oracle }
    }

    /// Methods named `method` whose receiver type satisfies `interface`, in Index order.
    ///
    /// A name nobody declares yields an empty list; reporting that is up to the caller. A handle that does not name
    /// an interface also yields an empty list.
    pub fn implemented_by(&self, interface: DefId, method: &str) -> Vec<DefId> {
        let Some(iface) = self.index.def(interface).as_interface() else {
            return Vec::new();
        };
        self.index
            .methods_named(method)
            .iter()
            .copied()
            .filter(|&candidate| match self.index.def(candidate).kind() {
                DefKind::Method(m) => self.oracle.implements(&m.receiver_type, &iface.kind),
                _ => false,
            })
            .collect()
    }
}

/// Resolved implementations per `(interface, method name)`.
#[derive(Debug, Default)]
pub struct Resolutions {
    by_site: HashMap<(DefId, String), Vec<DefId>>,
}

impl Resolutions {
    /// Implementations recorded for `(interface, method)`; empty when the pair was never resolved.
    pub fn implementations(&self, interface: DefId, method: &str) -> &[DefId] {
        self.by_site
            .get(&(interface, method.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn is_resolved(&self, interface: DefId, method: &str) -> bool {
        self.by_site.contains_key(&(interface, method.to_string()))
    }

    pub fn len(&self) -> usize {
        self.by_site.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_site.is_empty()
    }
}

/// Resolve every call site once per distinct `(interface, method)` pair.
#[tracing::instrument(skip_all, fields(call_sites = call_sites.len()))]
pub fn resolve_call_sites(resolver: &InterfaceResolver<'_, '_>, call_sites: &[InterfaceCallSite]) -> Resolutions {
    let mut resolutions = Resolutions::default();
    for site in call_sites {
        let key = (site.interface, site.method.clone());
        if resolutions.by_site.contains_key(&key) {
            continue;
        }
        let implementations = resolver.implemented_by(site.interface, &site.method);
        tracing::debug!(
            interface = resolver.index.def(site.interface).id(),
            method = site.method.as_str(),
            implementations = implementations.len(),
            "resolved interface call"
        );
        resolutions.by_site.insert(key, implementations);
    }
    resolutions
}
