//! Resolution error reporting.
//!
//! Compilation resolution produces exactly one error kind:
//! [`ResolutionError`] — a structured category, a human-readable message,
//! and the source span where resolution failed. There is no recovery: any
//! resolution failure aborts compilation of the current definition and
//! propagates to the driver.
//!
//! Factory functions (e.g. [`arity_mismatch`], [`not_callable`]) populate
//! both the structured kind and the message; match on
//! [`ResolutionErrorKind`] rather than parsing message strings.

mod error;

pub use error::{
    arity_mismatch, keyword_args_unsupported, no_attribute, no_module_attribute, not_callable,
    not_foldable, not_scriptable, not_unrollable, unsupported_attr, ArityWhat, ResolutionError,
    ResolutionErrorKind, ResolutionResult,
};
