use super::*;
use pretty_assertions::assert_eq;

#[test]
fn constant_node_has_one_output() {
    let mut g = Graph::new();
    let v = g.insert_constant(Span::new(1, 2), ScalarConstant::I32(7));
    assert_eq!(g.nodes().len(), 1);
    let node = &g.nodes()[0];
    assert_eq!(node.kind, NodeKind::Constant(ScalarConstant::I32(7)));
    assert_eq!(node.span, Span::new(1, 2));
    assert!(node.inputs().is_empty());
    assert_eq!(node.outputs(), &[v][..]);
}

#[test]
fn host_call_arity_is_explicit() {
    let mut g = Graph::new();
    let a = g.add_input();
    let b = g.add_input();
    let outs = g.insert_host_call(Span::DUMMY, HostHandle::new("callable"), &[a, b], 3);
    assert_eq!(outs.len(), 3);
    let node = &g.nodes()[0];
    assert_eq!(node.inputs(), &[a, b][..]);
    match &node.kind {
        NodeKind::HostCall { conventions, .. } => assert_eq!(conventions, "vv"),
        other => panic!("expected host call, got {other:?}"),
    }
}

#[test]
fn host_call_zero_outputs() {
    let mut g = Graph::new();
    let outs = g.insert_host_call(Span::DUMMY, HostHandle::new(0u8), &[], 0);
    assert!(outs.is_empty());
    assert!(g.nodes()[0].outputs().is_empty());
}

#[test]
fn host_handle_identity() {
    let a = HostHandle::new(41i64);
    let b = a.clone();
    let c = HostHandle::new(41i64);
    assert!(a.ptr_eq(&b));
    assert!(!a.ptr_eq(&c));
    assert_eq!(a.downcast_ref::<i64>(), Some(&41));
    assert_eq!(a.downcast_ref::<u8>(), None);
}

#[test]
fn scalar_element_types() {
    assert_eq!(ScalarConstant::I32(1).element_type(), "i32");
    assert_eq!(ScalarConstant::F32(1.0).element_type(), "f32");
    assert_eq!(ScalarConstant::U8(1).element_type(), "u8");
}

#[test]
fn inline_remaps_operands_and_outputs() {
    // callee: out = builtin(in0, in1)
    let mut callee = Graph::new();
    let i0 = callee.add_input();
    let i1 = callee.add_input();
    let outs = callee.insert_builtin(Span::new(3, 9), "add", &[i0, i1], 1);
    callee.register_output(outs[0]);

    let mut caller = Graph::new();
    let x = caller.add_input();
    let c = caller.insert_constant(Span::DUMMY, ScalarConstant::I32(1));
    let result = caller.inline(&callee, &[x, c]);

    assert_eq!(result.len(), 1);
    let inlined = caller.nodes().last().map(|n| (n.inputs().to_vec(), n.span));
    assert_eq!(inlined, Some((vec![x, c], Span::new(3, 9))));
}

#[test]
fn inline_chains_node_outputs() {
    // callee: t = add(in0, in0); out = neg(t)
    let mut callee = Graph::new();
    let i0 = callee.add_input();
    let t = callee.insert_builtin(Span::DUMMY, "add", &[i0, i0], 1);
    let out = callee.insert_builtin(Span::DUMMY, "neg", &[t[0]], 1);
    callee.register_output(out[0]);

    let mut caller = Graph::new();
    let x = caller.add_input();
    let result = caller.inline(&callee, &[x]);

    assert_eq!(caller.nodes().len(), 2);
    // The second inlined node consumes the first inlined node's output.
    let first_out = caller.nodes()[0].outputs()[0];
    assert_eq!(caller.nodes()[1].inputs(), &[first_out][..]);
    assert_eq!(result, vec![caller.nodes()[1].outputs()[0]]);
}
