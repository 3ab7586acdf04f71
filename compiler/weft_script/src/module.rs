//! The script module data model.
//!
//! A [`Module`] is a hierarchical container of named submodules, named
//! parameters (tensor slots with a buffer flag), and named compiled
//! methods. Modules are `Arc`-shared: method bindings and the `self`
//! binding hold counted handles so the backing graphs outlive the
//! triggering lookup for the rest of the compilation. Submodules are owned
//! top-down; bindings never hold back-references, so no ownership cycles
//! arise.
//!
//! The interior tables are `RwLock`-guarded: multiple in-flight method
//! compilations may read them concurrently, but registration must be
//! serialized externally relative to any compilation reading the same
//! module.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::sync::Arc;

use weft_ir::Graph;

use crate::host::{HostObject, HostRuntime};

/// Reference-counted opaque tensor storage.
///
/// The numeric engine owning the actual storage is external; the compiler
/// only needs allocation identity, so that repeated references to one slot
/// within a method map to one graph value.
#[derive(Clone)]
pub struct TensorSlot(Arc<SlotInner>);

struct SlotInner {
    label: String,
}

impl TensorSlot {
    /// Allocate a fresh slot. The label is for diagnostics only.
    pub fn new(label: impl Into<String>) -> Self {
        TensorSlot(Arc::new(SlotInner {
            label: label.into(),
        }))
    }

    pub fn label(&self) -> &str {
        &self.0.label
    }

    /// Whether two handles name the same storage.
    pub fn same_slot(&self, other: &TensorSlot) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Identity key for dedup tables.
    pub(crate) fn key(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for TensorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TensorSlot({})", self.0.label)
    }
}

/// A named parameter. Parameters and buffers share one table; `is_buffer`
/// is the only distinction.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub name: String,
    pub slot: TensorSlot,
    pub is_buffer: bool,
}

/// A compiled method: a frozen graph plus its calling signature.
///
/// Graph inputs are the declared inputs followed by the captured parameter
/// slots (`member_slots`), in first-use order. Direct invocation (by the
/// external executor) and inlining both validate against `input_count` and
/// `output_count`.
pub struct Method {
    name: String,
    graph: Graph,
    input_count: usize,
    member_slots: Vec<TensorSlot>,
}

impl Method {
    pub(crate) fn new(
        name: impl Into<String>,
        graph: Graph,
        input_count: usize,
        member_slots: Vec<TensorSlot>,
    ) -> Self {
        debug_assert_eq!(graph.inputs().len(), input_count + member_slots.len());
        Method {
            name: name.into(),
            graph,
            input_count,
            member_slots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Declared input count (excludes captured parameter slots).
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Declared output count.
    pub fn output_count(&self) -> usize {
        self.graph.outputs().len()
    }

    /// Captured parameter slots, in graph-input order after the declared
    /// inputs.
    pub fn member_slots(&self) -> &[TensorSlot] {
        &self.member_slots
    }
}

impl fmt::Debug for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("inputs", &self.input_count)
            .field("outputs", &self.output_count())
            .field("member_slots", &self.member_slots.len())
            .finish()
    }
}

/// Registration failure: names are unique across all categories of one
/// module (parameters and buffers included — the flag does not split the
/// namespace).
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum RegisterError {
    DuplicateName {
        name: String,
        existing: &'static str,
    },
}

impl fmt::Display for RegisterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterError::DuplicateName { name, existing } => {
                write!(f, "name '{name}' is already registered as a {existing}")
            }
        }
    }
}

impl std::error::Error for RegisterError {}

/// A hierarchical script module.
#[derive(Default)]
pub struct Module {
    params: RwLock<Vec<Parameter>>,
    submodules: RwLock<Vec<(String, Arc<Module>)>>,
    methods: RwLock<Vec<Arc<Method>>>,
    /// Host-side fallback attribute source (functions, nested non-script
    /// modules, plain host values).
    host_attrs: RwLock<FxHashMap<String, HostObject>>,
    /// Names explicitly declared constant; only these may fold.
    constants: RwLock<FxHashSet<String>>,
    /// Set when this module is a specially tagged constant module list.
    const_module_list: RwLock<Option<Vec<HostObject>>>,
}

impl Module {
    /// Create a fresh shared module.
    pub fn new() -> Arc<Module> {
        Arc::new(Module::default())
    }

    fn category_of(&self, name: &str) -> Option<&'static str> {
        if self.params.read().iter().any(|p| p.name == name) {
            return Some("parameter");
        }
        if self.submodules.read().iter().any(|(n, _)| n == name) {
            return Some("submodule");
        }
        if self.methods.read().iter().any(|m| m.name() == name) {
            return Some("method");
        }
        None
    }

    fn check_free(&self, name: &str) -> Result<(), RegisterError> {
        match self.category_of(name) {
            Some(existing) => Err(RegisterError::DuplicateName {
                name: name.to_string(),
                existing,
            }),
            None => Ok(()),
        }
    }

    /// Register a parameter or buffer.
    pub fn register_parameter(
        &self,
        name: impl Into<String>,
        slot: TensorSlot,
        is_buffer: bool,
    ) -> Result<(), RegisterError> {
        let name = name.into();
        self.check_free(&name)?;
        self.params.write().push(Parameter {
            name,
            slot,
            is_buffer,
        });
        Ok(())
    }

    /// Register a named submodule.
    pub fn register_submodule(
        &self,
        name: impl Into<String>,
        module: Arc<Module>,
    ) -> Result<(), RegisterError> {
        let name = name.into();
        self.check_free(&name)?;
        self.submodules.write().push((name, module));
        Ok(())
    }

    /// Register a compiled method, returning the shared handle.
    pub fn register_method(&self, method: Method) -> Result<Arc<Method>, RegisterError> {
        self.check_free(method.name())?;
        let method = Arc::new(method);
        self.methods.write().push(Arc::clone(&method));
        Ok(method)
    }

    /// Declare a host fallback attribute name constant (immutable).
    pub fn declare_constant(&self, name: impl Into<String>) {
        self.constants.write().insert(name.into());
    }

    /// Allowlist check for a declared-constant name. One host interaction.
    pub fn is_declared_constant(&self, name: &str) -> bool {
        let _guard = HostRuntime::lock();
        self.constants.read().contains(name)
    }

    /// Install a host-side fallback attribute.
    pub fn set_host_attr(&self, name: impl Into<String>, value: HostObject) {
        self.host_attrs.write().insert(name.into(), value);
    }

    /// Read a host-side fallback attribute. One host interaction.
    pub fn host_attr(&self, name: &str) -> Option<HostObject> {
        let _guard = HostRuntime::lock();
        self.host_attrs.read().get(name).cloned()
    }

    /// Tag this module as a constant module list with the given elements.
    pub fn set_const_module_list(&self, elements: Vec<HostObject>) {
        *self.const_module_list.write() = Some(elements);
    }

    /// Elements of the constant module list, if this module is tagged.
    pub fn const_module_list(&self) -> Option<Vec<HostObject>> {
        self.const_module_list.read().clone()
    }

    /// Find a parameter or buffer by name.
    pub fn find_parameter(&self, name: &str) -> Option<Parameter> {
        self.params.read().iter().find(|p| p.name == name).cloned()
    }

    /// Find a submodule by name.
    pub fn find_submodule(&self, name: &str) -> Option<Arc<Module>> {
        self.submodules
            .read()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, m)| Arc::clone(m))
    }

    /// Find a compiled method by name.
    pub fn find_method(&self, name: &str) -> Option<Arc<Method>> {
        self.methods
            .read()
            .iter()
            .find(|m| m.name() == name)
            .map(Arc::clone)
    }

    /// Whether `name` is a non-buffer parameter.
    pub fn has_parameter(&self, name: &str) -> bool {
        self.find_parameter(name).is_some_and(|p| !p.is_buffer)
    }

    /// Whether `name` is a buffer.
    pub fn has_buffer(&self, name: &str) -> bool {
        self.find_parameter(name).is_some_and(|p| p.is_buffer)
    }

    /// Whether `name` is a submodule.
    pub fn has_module(&self, name: &str) -> bool {
        self.find_submodule(name).is_some()
    }

    /// Whether `name` is a compiled method.
    pub fn has_method(&self, name: &str) -> bool {
        self.find_method(name).is_some()
    }

    /// Names of all compiled methods, in registration order.
    pub fn method_names(&self) -> Vec<String> {
        self.methods
            .read()
            .iter()
            .map(|m| m.name().to_string())
            .collect()
    }

    /// All parameters and buffers, in registration order.
    pub fn parameters(&self) -> Vec<Parameter> {
        self.params.read().clone()
    }

    /// All submodules, in registration order.
    pub fn modules(&self) -> Vec<(String, Arc<Module>)> {
        self.submodules.read().clone()
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module")
            .field("parameters", &self.params.read().len())
            .field("submodules", &self.submodules.read().len())
            .field("methods", &self.methods.read().len())
            .finish()
    }
}
