//! Weft script - symbol resolution and call binding for the weft compiler.
//!
//! The compiler front end builds a statically-typed graph from a scripted
//! subset, but identifiers can reach into a surrounding dynamically-typed
//! host runtime holding tensors, callables, and hierarchical modules. This
//! crate is the resolution core sitting on that boundary:
//!
//! - `Module`/`Method`: the hierarchical container of submodules,
//!   parameters, and compiled methods (`module`)
//! - `ResolvedValue` and its variants: the polymorphic compile-time
//!   handles answering `call`/`attr`/`as_value`/`unrolled_for` (`resolved`)
//! - `Resolver`: free-variable lookup through a host callback (`resolver`)
//! - `MethodBuilder` and the compile entry points (`compile`)
//! - `HostObject` and the host boundary lock (`host`)
//!
//! The parser/AST, the numeric executor, the tracer, and the downstream
//! specialization of escape-call nodes are external collaborators.
//!
//! Fixed invariants enforced here: fixed call arity (inputs and outputs,
//! checked, never inferred), no keyword arguments anywhere, and a source
//! span on every inserted node and every error.

mod compile;
mod host;
mod module;
mod resolved;
mod resolver;

pub use compile::{compile_function, compile_method, CompileEnv, DefineError, MethodBuilder};
pub use host::{HostCallable, HostGuard, HostObject, HostRuntime, Namespace};
pub use module::{Method, Module, Parameter, RegisterError, TensorSlot};
pub use resolved::{
    BuiltinFunction, ConstantValue, EscapeValue, Kwarg, MethodValue, ModuleValue, ResolvedValue,
    SimpleValue,
};
pub use resolver::{ResolutionCallback, Resolver};

// The error surface is re-exported so drivers depend on one crate.
pub use weft_diagnostic::{ArityWhat, ResolutionError, ResolutionErrorKind, ResolutionResult};
