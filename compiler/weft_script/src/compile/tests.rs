#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;
use weft_diagnostic::ResolutionErrorKind;

use crate::host::HostObject;
use crate::resolved::ResolvedValue;

#[test]
fn builder_declared_inputs() {
    let b = MethodBuilder::new("forward", 3);
    assert_eq!(b.name(), "forward");
    assert_eq!(b.inputs().len(), 3);
    assert_eq!(b.graph().inputs().len(), 3);
}

#[test]
fn get_or_add_parameter_dedupes_by_slot_identity() {
    let mut b = MethodBuilder::new("m", 1);
    let weight = TensorSlot::new("weight");
    let bias = TensorSlot::new("bias");

    let w1 = b.get_or_add_parameter(&weight);
    let bias_value = b.get_or_add_parameter(&bias);
    let w2 = b.get_or_add_parameter(&weight.clone());

    assert_eq!(w1, w2);
    assert_ne!(w1, bias_value);
    // Captured slots become graph inputs after the declared ones.
    assert_eq!(b.graph().inputs().len(), 3);
}

#[test]
fn finish_freezes_signature() {
    let mut b = MethodBuilder::new("m", 2);
    let slot = TensorSlot::new("w");
    b.get_or_add_parameter(&slot);
    let out = b.inputs()[0];
    let method = b.finish(&[out]);

    assert_eq!(method.input_count(), 2);
    assert_eq!(method.output_count(), 1);
    assert_eq!(method.member_slots().len(), 1);
    assert!(method.member_slots()[0].same_slot(&slot));
}

#[test]
fn emit_call_to_rejects_wrong_input_count() {
    let mut callee_builder = MethodBuilder::new("callee", 2);
    let x = callee_builder.inputs()[0];
    let callee = callee_builder.finish(&[x]);

    let mut b = MethodBuilder::new("caller", 1);
    let arg = b.inputs()[0];
    let err = b.emit_call_to(Span::new(5, 8), &callee, &[arg]).unwrap_err();
    assert_eq!(
        err.kind,
        ResolutionErrorKind::ArityMismatch {
            what: ArityWhat::Inputs,
            expected: 2,
            actual: 1,
        }
    );
    assert_eq!(err.span, Span::new(5, 8));
}

#[test]
fn env_resolves_self_before_free_variables() {
    let module = Module::new();
    let resolver = Resolver::from_callback(|_| Some(HostObject::Int(1)));
    let env = CompileEnv::with_self(resolver, module);

    assert_eq!(env.resolve_ident("self").map(|r| r.kind()), Some("module".into()));
    assert_eq!(
        env.resolve_ident("other").map(|r| r.kind()),
        Some("host value of type 'int'".into())
    );
}

#[test]
fn env_without_self_falls_through_to_resolver() {
    let env = CompileEnv::new(Resolver::empty());
    assert!(env.self_binding().is_none());
    assert!(env.resolve_ident("self").is_none());
    assert!(env.resolve_ident("x").is_none());
}

#[test]
fn compile_method_registers_on_module() {
    let module = Module::new();
    let env = CompileEnv::with_self(Resolver::empty(), Arc::clone(&module));
    let method = compile_method(&module, "forward", 1, &env, |b, _env| {
        Ok(vec![b.inputs()[0]])
    })
    .unwrap();

    assert_eq!(method.name(), "forward");
    assert!(module.has_method("forward"));
}

#[test]
fn compile_method_duplicate_name_is_register_error() {
    let module = Module::new();
    let env = CompileEnv::with_self(Resolver::empty(), Arc::clone(&module));
    compile_method(&module, "forward", 1, &env, |b, _| Ok(vec![b.inputs()[0]])).unwrap();

    let err = compile_method(&module, "forward", 1, &env, |b, _| Ok(vec![b.inputs()[0]]))
        .unwrap_err();
    assert!(matches!(err, DefineError::Register(_)));
}

#[test]
fn compile_method_propagates_resolution_error() {
    let module = Module::new();
    let env = CompileEnv::with_self(Resolver::empty(), Arc::clone(&module));
    let err = compile_method(&module, "broken", 1, &env, |b, env| {
        let this = env.self_binding().ok_or_else(|| {
            weft_diagnostic::no_module_attribute(Span::DUMMY, "self")
        })?;
        // `self.missing` fails and aborts the definition.
        this.attr(Span::new(9, 16), b, "missing")?;
        Ok(vec![])
    })
    .unwrap_err();

    match err {
        DefineError::Resolution(e) => {
            assert_eq!(
                e.kind,
                ResolutionErrorKind::NoModuleAttribute {
                    field: "missing".into()
                }
            );
            assert_eq!(e.span, Span::new(9, 16));
        }
        DefineError::Register(e) => panic!("unexpected register error: {e}"),
    }
    assert!(!module.has_method("broken"));
}

#[test]
fn compile_function_has_no_self() {
    let method = compile_function("id", 1, Resolver::empty(), |b, env| {
        assert!(env.resolve_ident("self").is_none());
        Ok(vec![b.inputs()[0]])
    })
    .unwrap();
    assert_eq!(method.input_count(), 1);
    assert_eq!(method.output_count(), 1);
}
