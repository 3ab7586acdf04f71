//! The dynamically-typed host-object model and the boundary lock.
//!
//! Compiled script code lives in a statically-typed graph, but identifiers
//! can resolve into a surrounding dynamic host runtime holding scalars,
//! callables, and nested namespaces. `HostObject` is the compiler's view of
//! one such value. The core never executes host callables; it only captures
//! them into escape-call nodes.
//!
//! # Boundary lock
//!
//! The host runtime is assumed non-reentrant from arbitrary compiler call
//! sites. Every single host interaction (resolver callback, attribute read,
//! allowlist check) runs under one scoped [`HostGuard`], released
//! immediately after. The guard is never held across IR construction.

use parking_lot::{Mutex, MutexGuard};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::Arc;

use weft_diagnostic::{no_attribute, ResolutionResult};
use weft_ir::Span;

use crate::module::Module;

static HOST_LOCK: Mutex<()> = Mutex::new(());

/// The host-boundary lock.
pub struct HostRuntime;

impl HostRuntime {
    /// Acquire the exclusive host lock for one host interaction.
    pub fn lock() -> HostGuard {
        HostGuard {
            _guard: HOST_LOCK.lock(),
        }
    }
}

/// Scoped guard over the host runtime; drop releases the lock.
pub struct HostGuard {
    _guard: MutexGuard<'static, ()>,
}

/// An opaque host callable. Identity-bearing; never invoked by this core.
pub struct HostCallable {
    name: String,
}

impl HostCallable {
    pub fn new(name: impl Into<String>) -> Self {
        HostCallable { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for HostCallable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostCallable({})", self.name)
    }
}

/// A nested host module/namespace: named attributes plus a marker for the
/// small allowlist of "builtin" namespaces whose callables resolve to
/// builtin functions instead of escape calls.
#[derive(Debug)]
pub struct Namespace {
    name: String,
    builtin: bool,
    attrs: FxHashMap<String, HostObject>,
}

impl Namespace {
    /// An ordinary (non-builtin) namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Namespace {
            name: name.into(),
            builtin: false,
            attrs: FxHashMap::default(),
        }
    }

    /// A namespace on the builtin allowlist.
    pub fn builtin(name: impl Into<String>) -> Self {
        Namespace {
            builtin: true,
            ..Namespace::new(name)
        }
    }

    /// Builder-style attribute insertion.
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: HostObject) -> Self {
        self.attrs.insert(name.into(), value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_builtin(&self) -> bool {
        self.builtin
    }

    /// Attribute lookup. Callers hold the host lock.
    pub fn get(&self, name: &str) -> Option<&HostObject> {
        self.attrs.get(name)
    }
}

/// One value in the dynamic host runtime, as seen by the compiler.
#[derive(Clone, Debug)]
pub enum HostObject {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
    /// Fixed-size ordered collection; unrollable when declared constant.
    Tuple(Vec<HostObject>),
    /// An opaque callable, captured into escape-call nodes.
    Callable(Arc<HostCallable>),
    /// A nested host module/namespace.
    Namespace(Arc<Namespace>),
    /// A compiled script module appearing as a host value.
    Module(Arc<Module>),
}

impl HostObject {
    /// Convenience constructor for a callable.
    pub fn callable(name: impl Into<String>) -> Self {
        HostObject::Callable(Arc::new(HostCallable::new(name)))
    }

    /// Convenience constructor for a namespace.
    pub fn namespace(ns: Namespace) -> Self {
        HostObject::Namespace(Arc::new(ns))
    }

    /// Host type name, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            HostObject::Int(_) => "int",
            HostObject::Float(_) => "float",
            HostObject::Bool(_) => "bool",
            HostObject::Str(_) => "str",
            HostObject::Tuple(_) => "tuple",
            HostObject::Callable(_) => "function",
            HostObject::Namespace(_) => "namespace",
            HostObject::Module(_) => "module",
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, HostObject::Callable(_))
    }

    pub fn is_namespace(&self) -> bool {
        matches!(self, HostObject::Namespace(_))
    }

    /// Read an attribute of this host object.
    ///
    /// One host interaction: acquires and releases the boundary lock. A
    /// lookup the host itself cannot satisfy reports "object has no
    /// attribute".
    pub fn attr(&self, span: Span, name: &str) -> ResolutionResult<HostObject> {
        let _guard = HostRuntime::lock();
        match self {
            HostObject::Namespace(ns) => ns
                .get(name)
                .cloned()
                .ok_or_else(|| no_attribute(span, name)),
            _ => Err(no_attribute(span, name)),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use weft_diagnostic::ResolutionErrorKind;

    #[test]
    fn type_names() {
        assert_eq!(HostObject::Int(1).type_name(), "int");
        assert_eq!(HostObject::Float(1.0).type_name(), "float");
        assert_eq!(HostObject::Bool(true).type_name(), "bool");
        assert_eq!(HostObject::Str("s".into()).type_name(), "str");
        assert_eq!(HostObject::Tuple(vec![]).type_name(), "tuple");
        assert_eq!(HostObject::callable("relu").type_name(), "function");
    }

    #[test]
    fn namespace_attr_found() {
        let ns = HostObject::namespace(
            Namespace::new("host.nn").with_attr("relu", HostObject::callable("relu")),
        );
        let member = ns.attr(Span::DUMMY, "relu");
        assert!(matches!(member, Ok(HostObject::Callable(_))));
    }

    #[test]
    fn namespace_attr_missing_reports_no_attribute() {
        let ns = HostObject::namespace(Namespace::new("host"));
        let err = ns.attr(Span::new(2, 5), "missing").unwrap_err();
        assert_eq!(
            err.kind,
            ResolutionErrorKind::NoAttribute {
                field: "missing".into()
            }
        );
        assert_eq!(err.span, Span::new(2, 5));
        assert_eq!(err.message, "object has no attribute missing");
    }

    #[test]
    fn scalar_attr_fails() {
        let err = HostObject::Int(3).attr(Span::DUMMY, "real").unwrap_err();
        assert!(matches!(err.kind, ResolutionErrorKind::NoAttribute { .. }));
    }

    #[test]
    fn lock_is_reacquirable() {
        // Per-interaction scoped locking: two sequential interactions each
        // take and release the guard.
        drop(HostRuntime::lock());
        drop(HostRuntime::lock());
    }
}
