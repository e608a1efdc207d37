//! Integration tests for executable overload resolution
//!
//! First-match declaration-order scanning, the integral/floating widening
//! rules, varargs folding, functional-interface arguments and the
//! diagnostics carried by dispatch failures.

use std::rc::Rc;

use ponte_bridge::{Bridge, BridgeError, CallableRegistry, Value};
use ponte_host::{
    CtorSpec, FieldSpec, HostError, HostValue, MethodSpec, ParamType, TypeRegistry, TypeSpec,
};

fn text_value(recv: Option<&ponte_host::ObjectRef>) -> Result<String, HostError> {
    let recv = recv.ok_or_else(|| HostError::Raised("missing receiver".to_string()))?;
    let obj = recv.borrow();
    obj.fields[0]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| HostError::Raised("text value unset".to_string()))
}

fn fixture() -> (Bridge, Rc<CallableRegistry>) {
    let registry = Rc::new(TypeRegistry::new());

    registry
        .declare(
            TypeSpec::class("demo.Overloads")
                .method(
                    MethodSpec::new("pick", vec![ParamType::I32], Some(ParamType::Str), {
                        |_, _, _| Ok(HostValue::str("int"))
                    })
                    .as_static(),
                )
                .method(
                    MethodSpec::new("pick", vec![ParamType::I64], Some(ParamType::Str), {
                        |_, _, _| Ok(HostValue::str("long"))
                    })
                    .as_static(),
                )
                // Declared wide-first: first-match resolution must take it
                // even though the narrower overload would fit better.
                .method(
                    MethodSpec::new("wideFirst", vec![ParamType::I64], Some(ParamType::Str), {
                        |_, _, _| Ok(HostValue::str("long"))
                    })
                    .as_static(),
                )
                .method(
                    MethodSpec::new("wideFirst", vec![ParamType::I32], Some(ParamType::Str), {
                        |_, _, _| Ok(HostValue::str("int"))
                    })
                    .as_static(),
                )
                .method(
                    MethodSpec::new("byteOnly", vec![ParamType::I8], Some(ParamType::Str), {
                        |_, _, _| Ok(HostValue::str("byte"))
                    })
                    .as_static(),
                )
                .method(
                    MethodSpec::new("fl", vec![ParamType::F32], Some(ParamType::Str), {
                        |_, _, _| Ok(HostValue::str("float"))
                    })
                    .as_static(),
                )
                .method(
                    MethodSpec::new("fl", vec![ParamType::F64], Some(ParamType::Str), {
                        |_, _, _| Ok(HostValue::str("double"))
                    })
                    .as_static(),
                )
                .method(
                    MethodSpec::new("echo", vec![ParamType::Str], Some(ParamType::Str), {
                        |_, _, args| match &args[0] {
                            HostValue::Null => Ok(HostValue::str("<null>")),
                            other => Ok(other.clone()),
                        }
                    })
                    .as_static(),
                ),
        )
        .unwrap();

    registry
        .declare(
            TypeSpec::class("text.Text")
                .field(FieldSpec::new("value", ParamType::Str).as_final())
                .ctor(CtorSpec::new(vec![ParamType::Str], |_, slots, args| {
                    slots[0] = args[0].clone();
                    Ok(())
                }))
                .method(MethodSpec::new(
                    "substring",
                    vec![ParamType::I32],
                    Some(ParamType::Str),
                    |_, recv, args| {
                        let s = text_value(recv)?;
                        let start = args[0].as_i64().unwrap_or(-1);
                        let start = usize::try_from(start)
                            .ok()
                            .filter(|i| *i <= s.len())
                            .ok_or_else(|| {
                                HostError::Raised(format!("start index {start} out of range"))
                            })?;
                        Ok(HostValue::str(&s[start..]))
                    },
                ))
                .method(MethodSpec::new(
                    "substring",
                    vec![ParamType::I32, ParamType::I32],
                    Some(ParamType::Str),
                    |_, recv, args| {
                        let s = text_value(recv)?;
                        let start = args[0].as_i64().unwrap_or(-1);
                        let end = args[1].as_i64().unwrap_or(-1);
                        let range = usize::try_from(start)
                            .ok()
                            .zip(usize::try_from(end).ok())
                            .filter(|(a, b)| a <= b && *b <= s.len())
                            .ok_or_else(|| {
                                HostError::Raised(format!("range {start}..{end} out of range"))
                            })?;
                        Ok(HostValue::str(&s[range.0..range.1]))
                    },
                )),
        )
        .unwrap();

    registry
        .declare(
            TypeSpec::class("text.Joiner").method(
                MethodSpec::new(
                    "join",
                    vec![ParamType::Str, ParamType::array(ParamType::I32)],
                    Some(ParamType::Str),
                    |_, _, args| {
                        let head = args[0].as_str().unwrap_or_default().to_string();
                        let tail = args[1]
                            .as_array()
                            .ok_or_else(|| HostError::Raised("expected varargs array".to_string()))?;
                        let parts: Vec<String> = tail
                            .items
                            .borrow()
                            .iter()
                            .map(|v| v.as_i64().unwrap_or_default().to_string())
                            .collect();
                        Ok(HostValue::str(format!("{head}|{}", parts.join(","))))
                    },
                )
                .varargs()
                .as_static(),
            ),
        )
        .unwrap();

    let transformer = registry
        .declare(
            TypeSpec::interface("demo.Transformer").method(MethodSpec::abstract_method(
                "apply",
                vec![ParamType::Str],
                Some(ParamType::Str),
            )),
        )
        .unwrap();
    registry
        .declare(
            TypeSpec::class("demo.Mapper").method(
                MethodSpec::new(
                    "mapWith",
                    vec![ParamType::Str, ParamType::Object(transformer)],
                    Some(ParamType::Str),
                    move |reg, _, args| {
                        let sam = reg
                            .sam_method(transformer)
                            .ok_or_else(|| HostError::Raised("not functional".to_string()))?;
                        reg.invoke(sam, Some(&args[1]), &[args[0].clone()])
                    },
                )
                .as_static(),
            ),
        )
        .unwrap();

    let runtime = Rc::new(CallableRegistry::new());
    let bridge = Bridge::new(registry, runtime.clone());
    (bridge, runtime)
}

fn call_static(bridge: &Bridge, ty: &str, method: &str, args: &[Value]) -> Result<Value, BridgeError> {
    let wrapper = bridge.lookup(ty).unwrap();
    let dispatcher = bridge.member(&wrapper, method)?;
    bridge.call(&dispatcher, args)
}

// ============================================================================
// First-match overload resolution
// ============================================================================

mod first_match {
    use super::*;

    #[test]
    fn test_int_argument_selects_int_overload() {
        let (bridge, _) = fixture();
        let out = call_static(&bridge, "demo.Overloads", "pick", &[Value::Int(5)]).unwrap();
        assert_eq!(out, Value::str("int"));
    }

    #[test]
    fn test_long_only_value_selects_long_overload() {
        let (bridge, _) = fixture();
        let out =
            call_static(&bridge, "demo.Overloads", "pick", &[Value::Int(1 << 40)]).unwrap();
        assert_eq!(out, Value::str("long"));
    }

    #[test]
    fn test_incompatible_argument_lists_all_candidates() {
        let (bridge, _) = fixture();
        let err = call_static(&bridge, "demo.Overloads", "pick", &[Value::str("s")]).unwrap_err();
        match &err {
            BridgeError::NoMatch {
                requested,
                candidates,
            } => {
                assert!(requested.contains("demo.Overloads.pick(string)"));
                assert_eq!(candidates.len(), 2);
                assert!(candidates[0].contains("pick(int)"));
                assert!(candidates[1].contains("pick(long)"));
            }
            other => panic!("expected NoMatch, got {other:?}"),
        }
        // The rendered message carries every signature.
        let msg = err.to_string();
        assert!(msg.contains("pick(int)"));
        assert!(msg.contains("pick(long)"));
    }

    #[test]
    fn test_first_match_is_declaration_order_not_best_match() {
        let (bridge, _) = fixture();
        // wideFirst(long) is declared before wideFirst(int): a small value
        // fits both, and the linear scan keeps the wide candidate.
        let out = call_static(&bridge, "demo.Overloads", "wideFirst", &[Value::Int(5)]).unwrap();
        assert_eq!(out, Value::str("long"));
    }
}

// ============================================================================
// Widening rules
// ============================================================================

mod widening {
    use super::*;

    #[test]
    fn test_small_int_fits_byte_parameter() {
        let (bridge, _) = fixture();
        let out = call_static(&bridge, "demo.Overloads", "byteOnly", &[Value::Int(100)]).unwrap();
        assert_eq!(out, Value::str("byte"));
    }

    #[test]
    fn test_large_int_does_not_fit_byte_parameter() {
        let (bridge, _) = fixture();
        let err =
            call_static(&bridge, "demo.Overloads", "byteOnly", &[Value::Int(300)]).unwrap_err();
        assert!(matches!(err, BridgeError::NoMatch { .. }));
    }

    #[test]
    fn test_float_matches_first_floating_overload() {
        let (bridge, _) = fixture();
        let out = call_static(&bridge, "demo.Overloads", "fl", &[Value::Float(1.5)]).unwrap();
        assert_eq!(out, Value::str("float"));
    }

    #[test]
    fn test_int_does_not_match_floating_parameter() {
        let (bridge, _) = fixture();
        let err = call_static(&bridge, "demo.Overloads", "fl", &[Value::Int(1)]).unwrap_err();
        assert!(matches!(err, BridgeError::NoMatch { .. }));
    }

    #[test]
    fn test_null_matches_reference_parameter() {
        let (bridge, _) = fixture();
        let out = call_static(&bridge, "demo.Overloads", "echo", &[Value::Null]).unwrap();
        assert_eq!(out, Value::str("<null>"));
    }

    #[test]
    fn test_null_does_not_match_primitive_parameter() {
        let (bridge, _) = fixture();
        let err = call_static(&bridge, "demo.Overloads", "byteOnly", &[Value::Null]).unwrap_err();
        assert!(matches!(err, BridgeError::NoMatch { .. }));
    }
}

// ============================================================================
// Varargs folding
// ============================================================================

mod varargs {
    use super::*;

    #[test]
    fn test_zero_trailing_arguments_yield_empty_array() {
        let (bridge, _) = fixture();
        let out = call_static(&bridge, "text.Joiner", "join", &[Value::str("a")]).unwrap();
        assert_eq!(out, Value::str("a|"));
    }

    #[test]
    fn test_trailing_arguments_fold_into_array() {
        let (bridge, _) = fixture();
        let out = call_static(
            &bridge,
            "text.Joiner",
            "join",
            &[Value::str("a"), Value::Int(1), Value::Int(2)],
        )
        .unwrap();
        assert_eq!(out, Value::str("a|1,2"));
    }

    #[test]
    fn test_single_compatible_array_passes_through_unfolded() {
        let (bridge, _) = fixture();
        // An int element is not itself an int[], so this only matches via
        // the pass-through rule.
        let out = call_static(
            &bridge,
            "text.Joiner",
            "join",
            &[Value::str("a"), Value::array(vec![Value::Int(1), Value::Int(2)])],
        )
        .unwrap();
        assert_eq!(out, Value::str("a|1,2"));
    }

    #[test]
    fn test_incompatible_trailing_argument_fails() {
        let (bridge, _) = fixture();
        let err = call_static(
            &bridge,
            "text.Joiner",
            "join",
            &[Value::str("a"), Value::str("b")],
        )
        .unwrap_err();
        assert!(matches!(err, BridgeError::NoMatch { .. }));
    }
}

// ============================================================================
// Constructors and instance dispatch — the substring scenario
// ============================================================================

mod substring_scenario {
    use super::*;

    fn make_text(bridge: &Bridge, s: &str) -> Value {
        let text = bridge.lookup("text.Text").unwrap();
        let construct = bridge.member(&text, "construct").unwrap();
        bridge.call(&construct, &[Value::str(s)]).unwrap()
    }

    #[test]
    fn test_one_argument_overload_returns_tail() {
        let (bridge, _) = fixture();
        let doc = make_text(&bridge, "hello world");
        let substring = bridge.member(&doc, "substring").unwrap();
        let out = bridge.call(&substring, &[doc.clone(), Value::Int(6)]).unwrap();
        assert_eq!(out, Value::str("world"));
    }

    #[test]
    fn test_two_argument_overload_returns_bounded() {
        let (bridge, _) = fixture();
        let doc = make_text(&bridge, "hello world");
        let substring = bridge.member(&doc, "substring").unwrap();
        let out = bridge
            .call(&substring, &[doc.clone(), Value::Int(0), Value::Int(5)])
            .unwrap();
        assert_eq!(out, Value::str("hello"));
    }

    #[test]
    fn test_out_of_range_wraps_host_failure() {
        let (bridge, _) = fixture();
        let doc = make_text(&bridge, "short");
        let substring = bridge.member(&doc, "substring").unwrap();
        let err = bridge
            .call(&substring, &[doc.clone(), Value::Int(99)])
            .unwrap_err();
        match &err {
            BridgeError::Invocation { source } => {
                assert!(source.to_string().contains("out of range"));
            }
            other => panic!("expected Invocation, got {other:?}"),
        }
    }

    #[test]
    fn test_constructor_mismatch_reports_candidates() {
        let (bridge, _) = fixture();
        let text = bridge.lookup("text.Text").unwrap();
        let construct = bridge.member(&text, "construct").unwrap();
        let err = bridge.call(&construct, &[Value::Int(3)]).unwrap_err();
        match err {
            BridgeError::NoMatch { candidates, .. } => {
                assert_eq!(candidates, vec!["text.Text(string)".to_string()]);
            }
            other => panic!("expected NoMatch, got {other:?}"),
        }
    }

    #[test]
    fn test_field_read_on_instance() {
        let (bridge, _) = fixture();
        let doc = make_text(&bridge, "abc");
        assert_eq!(bridge.member(&doc, "value").unwrap(), Value::str("abc"));
    }
}

// ============================================================================
// Functional-interface arguments
// ============================================================================

mod functional_arguments {
    use super::*;

    #[test]
    fn test_callable_satisfies_sam_parameter() {
        let (bridge, runtime) = fixture();
        // Guest transformer: receives (receiver, s), uppercases s.
        let upper = runtime.register(|args| {
            let s = args[1].as_str().unwrap_or_default().to_uppercase();
            Ok(Value::str(s))
        });
        let out = call_static(
            &bridge,
            "demo.Mapper",
            "mapWith",
            &[Value::str("abc"), Value::Callable(upper)],
        )
        .unwrap();
        assert_eq!(out, Value::str("ABC"));
    }

    #[test]
    fn test_callable_does_not_match_non_sam_parameter() {
        let (bridge, runtime) = fixture();
        let f = runtime.register(|_| Ok(Value::Null));
        let err =
            call_static(&bridge, "demo.Overloads", "echo", &[Value::Callable(f)]).unwrap_err();
        assert!(matches!(err, BridgeError::NoMatch { .. }));
    }

    #[test]
    fn test_guest_failure_crosses_as_invocation_error() {
        let (bridge, runtime) = fixture();
        let boom = runtime.register(|_| Err(ponte_bridge::ScriptError::new("boom")));
        let err = call_static(
            &bridge,
            "demo.Mapper",
            "mapWith",
            &[Value::str("abc"), Value::Callable(boom)],
        )
        .unwrap_err();
        match &err {
            BridgeError::Invocation { source } => {
                assert!(source.to_string().contains("boom"));
            }
            other => panic!("expected Invocation, got {other:?}"),
        }
    }
}
