//! Free-variable resolution against the host environment.
//!
//! The compiler driver binds a resolver at compile time; each free
//! identifier is looked up through a host-side callback. The callback runs
//! under the host boundary lock because it re-enters the dynamic host
//! runtime, and it must not fail: returning `None` is the explicit
//! "no binding" sentinel, which leaves the name unresolved (the driver
//! decides whether that is an error).

use std::rc::Rc;

use tracing::trace;

use crate::host::{HostObject, HostRuntime};
use crate::resolved::{EscapeValue, ResolvedValue};

/// Host-side lookup: name to host object, `None` for no binding.
pub type ResolutionCallback = dyn Fn(&str) -> Option<HostObject>;

/// A free-variable resolver backed by a host callback.
pub struct Resolver {
    callback: Option<Box<ResolutionCallback>>,
}

impl Resolver {
    /// A resolver over a host callback.
    pub fn from_callback<F>(callback: F) -> Self
    where
        F: Fn(&str) -> Option<HostObject> + 'static,
    {
        Resolver {
            callback: Some(Box::new(callback)),
        }
    }

    /// A resolver that never binds anything (free compilation against no
    /// host scope).
    pub fn empty() -> Self {
        Resolver { callback: None }
    }

    /// Resolve a name. A bound host object comes back wrapped as a plain
    /// escape value; `None` means unresolved.
    pub fn resolve(&self, name: &str) -> Option<Rc<dyn ResolvedValue>> {
        let callback = self.callback.as_ref()?;
        let object = {
            let _guard = HostRuntime::lock();
            callback(name)?
        };
        trace!(name, kind = object.type_name(), "resolved free variable");
        Some(Rc::new(EscapeValue::new(object)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn bound_name_becomes_escape_value() {
        let resolver = Resolver::from_callback(|name| {
            (name == "relu").then(|| HostObject::callable("relu"))
        });
        let resolved = resolver.resolve("relu");
        assert_eq!(
            resolved.map(|r| r.kind()),
            Some("host value of type 'function'".to_string())
        );
    }

    #[test]
    fn sentinel_is_distinguishable_from_binding() {
        // The callback itself must not fail; `None` falls over quietly.
        let resolver = Resolver::from_callback(|_| None);
        assert!(resolver.resolve("anything").is_none());
    }

    #[test]
    fn empty_resolver_never_binds() {
        assert!(Resolver::empty().resolve("x").is_none());
    }
}
