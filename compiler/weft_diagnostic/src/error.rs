//! The compilation resolution error.

use std::fmt;

use weft_ir::Span;

/// Result of a resolution step.
pub type ResolutionResult<T> = Result<T, ResolutionError>;

/// Which side of a call signature an arity mismatch names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ArityWhat {
    Inputs,
    Outputs,
}

impl fmt::Display for ArityWhat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArityWhat::Inputs => write!(f, "inputs"),
            ArityWhat::Outputs => write!(f, "outputs"),
        }
    }
}

/// Structured category for a resolution failure.
///
/// Every condition the resolution core reports has its own variant; the
/// `Display` impl produces the message text stored on [`ResolutionError`].
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ResolutionErrorKind {
    /// Keyword arguments at any call site, regardless of callee.
    KeywordArgsUnsupported,
    /// Wrong number of inputs or outputs at a call site.
    ArityMismatch {
        what: ArityWhat,
        expected: usize,
        actual: usize,
    },
    /// `call` on a resolved value that is not callable.
    NotCallable { kind: String },
    /// Attribute traversal outside the allowed cases on an escape value.
    UnsupportedAttr { kind: String, field: String },
    /// The host runtime itself has no such attribute.
    NoAttribute { field: String },
    /// A module fallback attribute that is neither callable, a nested
    /// module, nor declared constant.
    NotScriptable { field: String, type_name: String },
    /// A module attribute that resolves to nothing at all.
    NoModuleAttribute { field: String },
    /// `as_value` on a variant with no compile-time value.
    NotFoldable { kind: String },
    /// `unrolled_for` on a variant that is not iterable at compile time.
    NotUnrollable { kind: String },
}

impl fmt::Display for ResolutionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeywordArgsUnsupported => {
                write!(f, "keyword arguments in script calls aren't supported")
            }
            Self::ArityMismatch {
                what,
                expected,
                actual,
            } => write!(f, "expected {expected} {what} but found {actual}"),
            Self::NotCallable { kind } => write!(f, "cannot call a {kind}"),
            Self::UnsupportedAttr { kind, field } => {
                write!(f, "unsupported attribute lookup '{field}' on {kind}")
            }
            Self::NoAttribute { field } => write!(f, "object has no attribute {field}"),
            Self::NotScriptable { field, type_name } => write!(
                f,
                "attribute '{field}' of type '{type_name}' is not usable in a script method \
                 (did you forget to declare it constant?)"
            ),
            Self::NoModuleAttribute { field } => write!(f, "module has no attribute '{field}'"),
            Self::NotFoldable { kind } => {
                write!(f, "a {kind} cannot be used as a value in a script method")
            }
            Self::NotUnrollable { kind } => {
                write!(f, "a {kind} is not iterable at compile time")
            }
        }
    }
}

/// A compilation resolution error: structured kind, message, source span.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct ResolutionError {
    /// Structured category, for programmatic matching.
    pub kind: ResolutionErrorKind,
    /// Human-readable message; equals `kind.to_string()`.
    pub message: String,
    /// Where in the script source resolution failed.
    pub span: Span,
}

impl ResolutionError {
    /// Create an error from a structured kind at a source location.
    pub fn new(kind: ResolutionErrorKind, span: Span) -> Self {
        let message = kind.to_string();
        ResolutionError {
            kind,
            message,
            span,
        }
    }
}

impl fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.span, self.message)
    }
}

impl std::error::Error for ResolutionError {}

/// Keyword arguments were supplied to a call.
pub fn keyword_args_unsupported(span: Span) -> ResolutionError {
    ResolutionError::new(ResolutionErrorKind::KeywordArgsUnsupported, span)
}

/// A call site supplied or expected the wrong number of values.
pub fn arity_mismatch(
    span: Span,
    what: ArityWhat,
    expected: usize,
    actual: usize,
) -> ResolutionError {
    ResolutionError::new(
        ResolutionErrorKind::ArityMismatch {
            what,
            expected,
            actual,
        },
        span,
    )
}

/// The resolved value cannot be called.
pub fn not_callable(span: Span, kind: impl Into<String>) -> ResolutionError {
    ResolutionError::new(ResolutionErrorKind::NotCallable { kind: kind.into() }, span)
}

/// Attribute traversal outside the allowed cases.
pub fn unsupported_attr(
    span: Span,
    kind: impl Into<String>,
    field: impl Into<String>,
) -> ResolutionError {
    ResolutionError::new(
        ResolutionErrorKind::UnsupportedAttr {
            kind: kind.into(),
            field: field.into(),
        },
        span,
    )
}

/// The host object has no such attribute.
pub fn no_attribute(span: Span, field: impl Into<String>) -> ResolutionError {
    ResolutionError::new(
        ResolutionErrorKind::NoAttribute {
            field: field.into(),
        },
        span,
    )
}

/// A module fallback attribute exists but cannot be used in a script method.
pub fn not_scriptable(
    span: Span,
    field: impl Into<String>,
    type_name: impl Into<String>,
) -> ResolutionError {
    ResolutionError::new(
        ResolutionErrorKind::NotScriptable {
            field: field.into(),
            type_name: type_name.into(),
        },
        span,
    )
}

/// Nothing on the module resolves the name.
pub fn no_module_attribute(span: Span, field: impl Into<String>) -> ResolutionError {
    ResolutionError::new(
        ResolutionErrorKind::NoModuleAttribute {
            field: field.into(),
        },
        span,
    )
}

/// The resolved value has no compile-time value form.
pub fn not_foldable(span: Span, kind: impl Into<String>) -> ResolutionError {
    ResolutionError::new(ResolutionErrorKind::NotFoldable { kind: kind.into() }, span)
}

/// The resolved value cannot be unrolled.
pub fn not_unrollable(span: Span, kind: impl Into<String>) -> ResolutionError {
    ResolutionError::new(
        ResolutionErrorKind::NotUnrollable { kind: kind.into() },
        span,
    )
}
