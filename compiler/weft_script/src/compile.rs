//! Method compilation: the builder for the graph under construction and
//! the entry points the external driver calls.
//!
//! The parser and AST are external collaborators; the driver walks its own
//! AST and emits through a [`MethodBuilder`], resolving identifiers via a
//! [`CompileEnv`]. The `body` closures on [`compile_method`] and
//! [`compile_function`] stand in for that walk.

use rustc_hash::FxHashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use weft_diagnostic::{arity_mismatch, ArityWhat, ResolutionError, ResolutionResult};
use weft_ir::{Graph, Span, ValueId};

use crate::module::{Method, Module, RegisterError, TensorSlot};
use crate::resolved::{ModuleValue, ResolvedValue};
use crate::resolver::Resolver;

/// The method being compiled: its graph, declared inputs, and the table of
/// captured parameter slots.
pub struct MethodBuilder {
    name: String,
    graph: Graph,
    input_count: usize,
    member_slots: Vec<TensorSlot>,
    member_values: FxHashMap<usize, ValueId>,
}

impl MethodBuilder {
    /// Start a method with `input_count` declared tensor inputs.
    pub fn new(name: impl Into<String>, input_count: usize) -> Self {
        let mut graph = Graph::new();
        for _ in 0..input_count {
            graph.add_input();
        }
        MethodBuilder {
            name: name.into(),
            graph,
            input_count,
            member_slots: Vec::new(),
            member_values: FxHashMap::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared input values, in order.
    pub fn inputs(&self) -> &[ValueId] {
        &self.graph.inputs()[..self.input_count]
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// The graph value for a parameter slot, created on first use.
    ///
    /// Repeated references to the same slot within one method map to the
    /// same value; the slot becomes a captured graph input after the
    /// declared inputs.
    pub fn get_or_add_parameter(&mut self, slot: &TensorSlot) -> ValueId {
        if let Some(value) = self.member_values.get(&slot.key()) {
            return *value;
        }
        let value = self.graph.add_input();
        self.member_slots.push(slot.clone());
        self.member_values.insert(slot.key(), value);
        value
    }

    /// Inline `callee` into this method's graph.
    ///
    /// Validates the supplied input count against the callee's declared
    /// inputs; the callee's captured slots are remapped through this
    /// builder's own parameter table. Returns the callee's output values.
    pub fn emit_call_to(
        &mut self,
        span: Span,
        callee: &Method,
        inputs: &[ValueId],
    ) -> ResolutionResult<Vec<ValueId>> {
        if inputs.len() != callee.input_count() {
            return Err(arity_mismatch(
                span,
                ArityWhat::Inputs,
                callee.input_count(),
                inputs.len(),
            ));
        }
        let mut args = inputs.to_vec();
        for slot in callee.member_slots() {
            args.push(self.get_or_add_parameter(slot));
        }
        Ok(self.graph.inline(callee.graph(), &args))
    }

    /// Freeze the builder into a method with the given outputs.
    pub fn finish(mut self, outputs: &[ValueId]) -> Method {
        for output in outputs {
            self.graph.register_output(*output);
        }
        Method::new(self.name, self.graph, self.input_count, self.member_slots)
    }
}

/// Identifier resolution for one compilation: the `self` binding first,
/// then the free-variable resolver.
pub struct CompileEnv {
    self_binding: Option<Rc<ModuleValue>>,
    resolver: Resolver,
}

impl CompileEnv {
    /// Free-function environment: no `self`.
    pub fn new(resolver: Resolver) -> Self {
        CompileEnv {
            self_binding: None,
            resolver,
        }
    }

    /// Instance-method environment: `self` binds the given module.
    pub fn with_self(resolver: Resolver, module: Arc<Module>) -> Self {
        CompileEnv {
            self_binding: Some(Rc::new(ModuleValue::new(module))),
            resolver,
        }
    }

    /// The `self` module binding, if compiling an instance method.
    pub fn self_binding(&self) -> Option<Rc<ModuleValue>> {
        self.self_binding.clone()
    }

    /// Resolve a free identifier.
    ///
    /// `self` hits the module binding; everything else falls back to the
    /// resolver. `None` means unresolved — the driver decides whether that
    /// is an error.
    pub fn resolve_ident(&self, name: &str) -> Option<Rc<dyn ResolvedValue>> {
        if name == "self" {
            if let Some(binding) = &self.self_binding {
                return Some(Rc::clone(binding) as Rc<dyn ResolvedValue>);
            }
        }
        self.resolver.resolve(name)
    }
}

/// Failure while defining a method on a module.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum DefineError {
    /// Resolution failed inside the body.
    Resolution(ResolutionError),
    /// The finished method could not be registered.
    Register(RegisterError),
}

impl fmt::Display for DefineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefineError::Resolution(e) => write!(f, "{e}"),
            DefineError::Register(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for DefineError {}

impl From<ResolutionError> for DefineError {
    fn from(e: ResolutionError) -> Self {
        DefineError::Resolution(e)
    }
}

impl From<RegisterError> for DefineError {
    fn from(e: RegisterError) -> Self {
        DefineError::Register(e)
    }
}

/// Compile one method body and register it on `module`.
///
/// `body` receives the builder and the environment and returns the output
/// values; it stands in for the external AST walk.
pub fn compile_method<F>(
    module: &Arc<Module>,
    name: &str,
    input_count: usize,
    env: &CompileEnv,
    body: F,
) -> Result<Arc<Method>, DefineError>
where
    F: FnOnce(&mut MethodBuilder, &CompileEnv) -> ResolutionResult<Vec<ValueId>>,
{
    debug!(name, input_count, "compiling method");
    let mut builder = MethodBuilder::new(name, input_count);
    let outputs = body(&mut builder, env)?;
    let method = builder.finish(&outputs);
    Ok(module.register_method(method)?)
}

/// Compile a free function: no module, no `self` binding.
pub fn compile_function<F>(
    name: &str,
    input_count: usize,
    resolver: Resolver,
    body: F,
) -> ResolutionResult<Method>
where
    F: FnOnce(&mut MethodBuilder, &CompileEnv) -> ResolutionResult<Vec<ValueId>>,
{
    debug!(name, input_count, "compiling free function");
    let env = CompileEnv::new(resolver);
    let mut builder = MethodBuilder::new(name, input_count);
    let outputs = body(&mut builder, &env)?;
    Ok(builder.finish(&outputs))
}

#[cfg(test)]
mod tests;
