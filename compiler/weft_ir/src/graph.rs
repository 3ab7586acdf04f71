//! The arena graph built during method compilation.
//!
//! A `Graph` owns its nodes; `ValueId` and `NodeId` are index newtypes into
//! the owning graph. Values are produced by graph inputs and node outputs
//! and consumed as node operands.
//!
//! Node arity is always explicit: a node has exactly the operands it was
//! inserted with and exactly the number of outputs requested at insertion.
//! Nothing here infers arity.

use smallvec::SmallVec;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::Span;

/// Identifier for a value inside one graph.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct ValueId(u32);

impl ValueId {
    /// Index into the owning graph's value space.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// Identifier for a node inside one graph.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct NodeId(u32);

impl NodeId {
    /// Index into the owning graph's node list.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a 0-dimensional constant tensor node.
///
/// Element types are fixed by the folding rules: host integers fold to
/// 32-bit signed, host floats to 32-bit float, host booleans to 8-bit
/// unsigned (0 or 1).
#[derive(Copy, Clone, PartialEq, Debug)]
pub enum ScalarConstant {
    I32(i32),
    F32(f32),
    U8(u8),
}

impl ScalarConstant {
    /// Element type name, for diagnostics and tests.
    pub fn element_type(&self) -> &'static str {
        match self {
            ScalarConstant::I32(_) => "i32",
            ScalarConstant::F32(_) => "f32",
            ScalarConstant::U8(_) => "u8",
        }
    }
}

/// Opaque captured host object attached to an escape-call node.
///
/// The IR never inspects the payload; it exists so that a downstream
/// specializer can recover the host callable when it lowers the node.
/// Equality is allocation identity.
#[derive(Clone)]
pub struct HostHandle(Arc<dyn Any + Send + Sync>);

impl HostHandle {
    /// Capture a host object.
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        HostHandle(Arc::new(object))
    }

    /// Recover the captured object, if it has the expected type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Whether two handles capture the same allocation.
    pub fn ptr_eq(&self, other: &HostHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for HostHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for HostHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HostHandle(..)")
    }
}

/// What a node does.
#[derive(Clone, PartialEq, Debug)]
pub enum NodeKind {
    /// A 0-dimensional constant tensor.
    Constant(ScalarConstant),
    /// An opaque call into the host runtime (escape call).
    ///
    /// `conventions` holds one marker byte per operand. Every operand is a
    /// plain positional value (`'v'`); the string exists so a downstream
    /// specializer can extend the convention set without reshaping the node.
    HostCall {
        handle: HostHandle,
        conventions: String,
    },
    /// A named builtin invocation, specialized downstream.
    Builtin { name: String },
}

/// One node: a kind, a source span, operands, and outputs.
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    inputs: SmallVec<[ValueId; 4]>,
    outputs: SmallVec<[ValueId; 2]>,
}

impl Node {
    /// Operand values consumed by this node.
    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    /// Values produced by this node.
    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }
}

/// A graph under construction (or frozen inside a compiled method).
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    inputs: Vec<ValueId>,
    outputs: Vec<ValueId>,
    next_value: u32,
}

impl Graph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Graph::default()
    }

    #[inline]
    fn fresh_value(&mut self) -> ValueId {
        let id = ValueId(self.next_value);
        self.next_value += 1;
        id
    }

    /// Add a graph input and return its value.
    pub fn add_input(&mut self) -> ValueId {
        let v = self.fresh_value();
        self.inputs.push(v);
        v
    }

    /// Graph input values, in declaration order.
    pub fn inputs(&self) -> &[ValueId] {
        &self.inputs
    }

    /// Register a value as a graph output.
    pub fn register_output(&mut self, value: ValueId) {
        self.outputs.push(value);
    }

    /// Graph output values, in registration order.
    pub fn outputs(&self) -> &[ValueId] {
        &self.outputs
    }

    /// All nodes, in insertion order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Look up a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn insert_node(
        &mut self,
        kind: NodeKind,
        span: Span,
        operands: &[ValueId],
        n_outputs: usize,
    ) -> NodeId {
        let outputs: SmallVec<[ValueId; 2]> = (0..n_outputs).map(|_| self.fresh_value()).collect();
        let id = NodeId(u32::try_from(self.nodes.len()).unwrap_or(u32::MAX));
        self.nodes.push(Node {
            kind,
            span,
            inputs: operands.iter().copied().collect(),
            outputs,
        });
        id
    }

    /// Insert a constant node and return its single output value.
    pub fn insert_constant(&mut self, span: Span, constant: ScalarConstant) -> ValueId {
        let id = self.insert_node(NodeKind::Constant(constant), span, &[], 1);
        self.nodes[id.index()].outputs[0]
    }

    /// Insert an escape-call node.
    ///
    /// The node captures `handle`, consumes `operands` in order, and
    /// produces exactly `n_outputs` values.
    pub fn insert_host_call(
        &mut self,
        span: Span,
        handle: HostHandle,
        operands: &[ValueId],
        n_outputs: usize,
    ) -> Vec<ValueId> {
        let conventions = "v".repeat(operands.len());
        let id = self.insert_node(
            NodeKind::HostCall {
                handle,
                conventions,
            },
            span,
            operands,
            n_outputs,
        );
        self.nodes[id.index()].outputs.to_vec()
    }

    /// Insert a builtin-call node with explicit arity.
    pub fn insert_builtin(
        &mut self,
        span: Span,
        name: impl Into<String>,
        operands: &[ValueId],
        n_outputs: usize,
    ) -> Vec<ValueId> {
        let id = self.insert_node(
            NodeKind::Builtin { name: name.into() },
            span,
            operands,
            n_outputs,
        );
        self.nodes[id.index()].outputs.to_vec()
    }

    /// Inline `callee` into this graph.
    ///
    /// `args` supplies one value per callee graph input (declared inputs
    /// followed by captured parameter inputs; the caller concatenates).
    /// Callee nodes are copied in order with operands remapped; returns the
    /// values corresponding to the callee's registered outputs.
    ///
    /// Arity is the caller's responsibility: `args.len()` must equal the
    /// callee's input count. The call binder checks this before inlining.
    pub fn inline(&mut self, callee: &Graph, args: &[ValueId]) -> Vec<ValueId> {
        debug_assert_eq!(args.len(), callee.inputs.len(), "inline input mismatch");
        let mut map: Vec<Option<ValueId>> = vec![None; callee.next_value as usize];
        for (input, arg) in callee.inputs.iter().zip(args) {
            map[input.index()] = Some(*arg);
        }
        for node in &callee.nodes {
            let operands: Vec<ValueId> = node.inputs.iter().map(|v| mapped(&map, *v)).collect();
            let id = self.insert_node(node.kind.clone(), node.span, &operands, node.outputs.len());
            for (theirs, ours) in node.outputs.iter().zip(self.nodes[id.index()].outputs.clone()) {
                map[theirs.index()] = Some(ours);
            }
        }
        callee.outputs.iter().map(|v| mapped(&map, *v)).collect()
    }
}

fn mapped(map: &[Option<ValueId>], value: ValueId) -> ValueId {
    match map[value.index()] {
        Some(v) => v,
        // A callee operand is always a graph input or an earlier node output.
        None => unreachable!("inline: operand {value} has no mapping"),
    }
}

#[cfg(test)]
mod tests;
