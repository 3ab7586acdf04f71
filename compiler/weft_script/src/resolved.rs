//! Resolved values: the polymorphic compile-time handles produced by
//! symbol resolution.
//!
//! Every variant answers a fixed query set — `call`, `attr`, `as_value`,
//! `unrolled_for` — and unsupported queries fail with a descriptive error
//! naming the variant (`kind`), never silently no-op. Handles are
//! immutable after construction and shared as `Rc<dyn ResolvedValue>`;
//! compilation is single-threaded, so `Rc` is the intentional choice.
//!
//! Keyword arguments are rejected once, centrally, in the provided
//! [`ResolvedValue::call`]: no variant supports them and the message is
//! uniform. Variants implement `call_impl`.

use std::rc::Rc;
use std::sync::Arc;

use tracing::trace;

use weft_diagnostic::{
    arity_mismatch, keyword_args_unsupported, no_module_attribute, not_callable, not_foldable,
    not_scriptable, not_unrollable, unsupported_attr, ArityWhat, ResolutionResult,
};
use weft_ir::{HostHandle, ScalarConstant, Span, ValueId};

use crate::compile::MethodBuilder;
use crate::host::HostObject;
use crate::module::{Method, Module};

/// A keyword argument at a call site. Present only to be rejected.
#[derive(Clone, Debug)]
pub struct Kwarg {
    pub name: String,
    pub span: Span,
}

/// The capability interface every resolved value answers.
pub trait ResolvedValue {
    /// Names the concrete variant and, where relevant, the wrapped host
    /// type. Diagnostics only.
    fn kind(&self) -> String;

    /// Invoke as a function: `outputs = value(inputs)`.
    ///
    /// Central keyword-argument rejection, then variant dispatch.
    fn call(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        inputs: &[ValueId],
        kwargs: &[Kwarg],
        n_outputs: usize,
    ) -> ResolutionResult<Vec<ValueId>> {
        if let Some(kw) = kwargs.first() {
            return Err(keyword_args_unsupported(kw.span));
        }
        self.call_impl(span, builder, inputs, n_outputs)
    }

    /// Variant call behavior. Default: not callable.
    fn call_impl(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        inputs: &[ValueId],
        n_outputs: usize,
    ) -> ResolutionResult<Vec<ValueId>> {
        let _ = (builder, inputs, n_outputs);
        Err(not_callable(span, self.kind()))
    }

    /// Attribute traversal: `value.field`. Default: unsupported.
    fn attr(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        field: &str,
    ) -> ResolutionResult<Rc<dyn ResolvedValue>> {
        let _ = builder;
        Err(unsupported_attr(span, self.kind(), field))
    }

    /// Fold into a graph value usable in value position. Default: fails.
    fn as_value(&self, span: Span, builder: &mut MethodBuilder) -> ResolutionResult<ValueId> {
        let _ = builder;
        Err(not_foldable(span, self.kind()))
    }

    /// Expand into a fixed list for static loop unrolling. Default: fails.
    fn unrolled_for(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
    ) -> ResolutionResult<Vec<Rc<dyn ResolvedValue>>> {
        let _ = builder;
        Err(not_unrollable(span, self.kind()))
    }
}

/// A bare graph value.
#[derive(Copy, Clone, Debug)]
pub struct SimpleValue(ValueId);

impl SimpleValue {
    pub fn new(value: ValueId) -> Self {
        SimpleValue(value)
    }
}

impl ResolvedValue for SimpleValue {
    fn kind(&self) -> String {
        "value".to_string()
    }

    fn as_value(&self, _span: Span, _builder: &mut MethodBuilder) -> ResolutionResult<ValueId> {
        Ok(self.0)
    }
}

/// An escape value: wraps an opaque host object or callable.
pub struct EscapeValue {
    object: HostObject,
}

impl EscapeValue {
    pub fn new(object: HostObject) -> Self {
        EscapeValue { object }
    }

    pub fn object(&self) -> &HostObject {
        &self.object
    }
}

fn escape_kind(object: &HostObject) -> String {
    format!("host value of type '{}'", object.type_name())
}

/// Escape-call construction: one opaque host-call node, arity-correct by
/// construction. All inputs are plain positional values; the node gets
/// exactly `n_outputs` outputs. Downstream specialization is external.
fn escape_call(
    object: &HostObject,
    span: Span,
    builder: &mut MethodBuilder,
    inputs: &[ValueId],
    n_outputs: usize,
) -> ResolutionResult<Vec<ValueId>> {
    let handle = HostHandle::new(object.clone());
    Ok(builder
        .graph_mut()
        .insert_host_call(span, handle, inputs, n_outputs))
}

/// Escape attribute traversal: deliberately restricted so escape values do
/// not become an unconstrained interop backdoor. Exactly two cases pass:
/// builtin-namespace callables become builtin functions, and namespace
/// members that are themselves namespaces stay escape values.
fn escape_attr(
    object: &HostObject,
    span: Span,
    field: &str,
) -> ResolutionResult<Rc<dyn ResolvedValue>> {
    let member = object.attr(span, field)?;
    if let HostObject::Namespace(ns) = object {
        if ns.is_builtin() && member.is_callable() {
            return Ok(Rc::new(BuiltinFunction::new(field)));
        }
        if member.is_namespace() {
            return Ok(Rc::new(EscapeValue::new(member)));
        }
    }
    Err(unsupported_attr(span, escape_kind(object), field))
}

impl ResolvedValue for EscapeValue {
    fn kind(&self) -> String {
        escape_kind(&self.object)
    }

    fn call_impl(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        inputs: &[ValueId],
        n_outputs: usize,
    ) -> ResolutionResult<Vec<ValueId>> {
        escape_call(&self.object, span, builder, inputs, n_outputs)
    }

    fn attr(
        &self,
        span: Span,
        _builder: &mut MethodBuilder,
        field: &str,
    ) -> ResolutionResult<Rc<dyn ResolvedValue>> {
        escape_attr(&self.object, span, field)
    }
}

/// A constant value: an escape value whose host object the enclosing
/// module declared immutable. Declaring a value constant enables
/// conversion to a constant tensor via `as_value` and for-loop unrolling
/// of tuples.
pub struct ConstantValue {
    object: HostObject,
}

impl ConstantValue {
    pub fn new(object: HostObject) -> Self {
        ConstantValue { object }
    }
}

impl ResolvedValue for ConstantValue {
    fn kind(&self) -> String {
        escape_kind(&self.object)
    }

    fn call_impl(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        inputs: &[ValueId],
        n_outputs: usize,
    ) -> ResolutionResult<Vec<ValueId>> {
        escape_call(&self.object, span, builder, inputs, n_outputs)
    }

    fn attr(
        &self,
        span: Span,
        _builder: &mut MethodBuilder,
        field: &str,
    ) -> ResolutionResult<Rc<dyn ResolvedValue>> {
        escape_attr(&self.object, span, field)
    }

    fn as_value(&self, span: Span, builder: &mut MethodBuilder) -> ResolutionResult<ValueId> {
        let constant = match self.object {
            HostObject::Int(v) => {
                ScalarConstant::I32(i32::try_from(v).map_err(|_| not_foldable(span, self.kind()))?)
            }
            HostObject::Float(v) => ScalarConstant::F32(v as f32),
            HostObject::Bool(v) => ScalarConstant::U8(u8::from(v)),
            // Any other host kind has no constant tensor form.
            _ => return Err(not_foldable(span, self.kind())),
        };
        Ok(builder.graph_mut().insert_constant(span, constant))
    }

    fn unrolled_for(
        &self,
        span: Span,
        _builder: &mut MethodBuilder,
    ) -> ResolutionResult<Vec<Rc<dyn ResolvedValue>>> {
        match &self.object {
            HostObject::Tuple(elements) => Ok(elements
                .iter()
                .map(|e| Rc::new(ConstantValue::new(e.clone())) as Rc<dyn ResolvedValue>)
                .collect()),
            _ => Err(not_unrollable(span, self.kind())),
        }
    }
}

/// A callable from a builtin host namespace. Specialized downstream; here
/// it only emits an arity-correct builtin node.
pub struct BuiltinFunction {
    name: String,
}

impl BuiltinFunction {
    pub fn new(name: impl Into<String>) -> Self {
        BuiltinFunction { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl ResolvedValue for BuiltinFunction {
    fn kind(&self) -> String {
        format!("builtin function '{}'", self.name)
    }

    fn call_impl(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        inputs: &[ValueId],
        n_outputs: usize,
    ) -> ResolutionResult<Vec<ValueId>> {
        Ok(builder
            .graph_mut()
            .insert_builtin(span, &self.name, inputs, n_outputs))
    }
}

/// A method binding: one compiled sub-method, inlinable into a caller.
pub struct MethodValue {
    /// Keeps the method's backing graph alive for the compilation.
    #[allow(dead_code)]
    module: Arc<Module>,
    method: Arc<Method>,
}

impl MethodValue {
    pub fn new(module: Arc<Module>, method: Arc<Method>) -> Self {
        MethodValue { module, method }
    }
}

impl ResolvedValue for MethodValue {
    fn kind(&self) -> String {
        "method".to_string()
    }

    fn call_impl(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        inputs: &[ValueId],
        n_outputs: usize,
    ) -> ResolutionResult<Vec<ValueId>> {
        let outputs = builder.emit_call_to(span, &self.method, inputs)?;
        if outputs.len() != n_outputs {
            return Err(arity_mismatch(
                span,
                ArityWhat::Outputs,
                outputs.len(),
                n_outputs,
            ));
        }
        Ok(outputs)
    }
}

/// A module binding: a submodule or the module under compilation (the
/// `self` binding for instance methods).
pub struct ModuleValue {
    module: Arc<Module>,
}

impl ModuleValue {
    pub fn new(module: Arc<Module>) -> Self {
        ModuleValue { module }
    }

    pub fn module(&self) -> &Arc<Module> {
        &self.module
    }
}

impl ResolvedValue for ModuleValue {
    fn kind(&self) -> String {
        "module".to_string()
    }

    /// Attribute resolution order, first match wins:
    /// submodule > method > parameter/buffer > host fallback > failure.
    /// Within the host fallback, callables and nested modules precede the
    /// declared-constant allowlist, so a constant-declared name that is
    /// also callable resolves as a callable.
    fn attr(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        field: &str,
    ) -> ResolutionResult<Rc<dyn ResolvedValue>> {
        trace!(field, "module attr lookup");
        if let Some(sub) = self.module.find_submodule(field) {
            return Ok(Rc::new(ModuleValue::new(sub)));
        }
        if let Some(method) = self.module.find_method(field) {
            return Ok(Rc::new(MethodValue::new(Arc::clone(&self.module), method)));
        }
        if let Some(param) = self.module.find_parameter(field) {
            // Through the builder's parameter table: repeated references to
            // one slot within a method share one graph value.
            let value = builder.get_or_add_parameter(&param.slot);
            return Ok(Rc::new(SimpleValue::new(value)));
        }
        if let Some(attr) = self.module.host_attr(field) {
            if attr.is_callable() || attr.is_namespace() || matches!(attr, HostObject::Module(_)) {
                return Ok(Rc::new(EscapeValue::new(attr)));
            }
            if self.module.is_declared_constant(field) {
                return Ok(Rc::new(ConstantValue::new(attr)));
            }
            return Err(not_scriptable(span, field, attr.type_name()));
        }
        Err(no_module_attribute(span, field))
    }

    /// Calling a module calls its `forward` method.
    fn call_impl(
        &self,
        span: Span,
        builder: &mut MethodBuilder,
        inputs: &[ValueId],
        n_outputs: usize,
    ) -> ResolutionResult<Vec<ValueId>> {
        self.attr(span, builder, "forward")?
            .call(span, builder, inputs, &[], n_outputs)
    }

    /// Only a module tagged as a constant module list unrolls: compiled
    /// modules become module bindings, anything else a constant value, in
    /// list order.
    fn unrolled_for(
        &self,
        span: Span,
        _builder: &mut MethodBuilder,
    ) -> ResolutionResult<Vec<Rc<dyn ResolvedValue>>> {
        let Some(elements) = self.module.const_module_list() else {
            return Err(not_unrollable(span, self.kind()));
        };
        Ok(elements
            .into_iter()
            .map(|e| match e {
                HostObject::Module(m) => Rc::new(ModuleValue::new(m)) as Rc<dyn ResolvedValue>,
                other => Rc::new(ConstantValue::new(other)) as Rc<dyn ResolvedValue>,
            })
            .collect())
    }
}
