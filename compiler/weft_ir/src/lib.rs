//! Weft IR - graph intermediate representation for the weft compiler.
//!
//! This crate provides:
//! - `Span`: compact source location attached to nodes and errors
//! - `Graph`: the arena graph built during method compilation
//! - `ScalarConstant`: 0-dimensional constant tensor payloads
//! - `HostHandle`: opaque captured host objects carried by escape-call nodes
//!
//! The graph is deliberately small: the resolution core only needs to insert
//! constants, escape calls, builtin calls, and to inline one graph into
//! another. Execution and specialization of these nodes belong to external
//! collaborators (the numeric engine and the host-call specializer).

mod graph;
mod span;

pub use graph::{Graph, HostHandle, Node, NodeId, NodeKind, ScalarConstant, ValueId};
pub use span::Span;
