//! Executable overload resolution and invocation
//!
//! Given a name's candidate methods (or a type's constructors) and the
//! guest arguments, pick the first matching candidate **in declaration
//! order** — a linear, order-dependent scan, not best-overload selection.
//! Candidate order is part of the observable contract and is preserved
//! exactly as introspected from the registry.
//!
//! Matching rules per position: integral parameters accept a guest Int
//! that fits their range (the byte→short→int→long widening table over the
//! guest's single Int64 representation), floating parameters accept Float,
//! null matches reference parameters only, objects match by subtype, and a
//! guest callable matches only a single-abstract-method interface
//! parameter (kept pending and materialized into an adapter once a
//! candidate is chosen). A trailing-varargs candidate folds surplus
//! arguments into one array of the component type — unless exactly one
//! surplus argument is already a compatible array, which passes through
//! unfolded.

use std::rc::Rc;

use ponte_host::{HostArray, HostValue, MethodRef, ParamType, TypeId};

use crate::adapter;
use crate::coerce::{int_fits, to_guest, to_host_as};
use crate::error::{BridgeError, BridgeResult, ScriptError};
use crate::value::{CallableId, Value};
use crate::wrapper::InstanceWrapper;
use crate::BridgeInner;

/// How a dispatcher carries its receiver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecKind {
    /// No receiver
    Static,
    /// arg[0] is the receiver, removed before matching
    Instance,
}

/// Ordered candidate set for one method name. Never empty: absence of a
/// member yields no dispatcher at all, not an empty one.
pub(crate) struct MethodSet {
    pub owner: TypeId,
    pub name: String,
    pub kind: ExecKind,
    pub candidates: Vec<MethodRef>,
}

/// A guest argument, classified before matching. Callables stay pending
/// until a candidate fixes their interface type.
enum Arg<'a> {
    Plain(&'a Value),
    Pending(CallableId),
}

/// Register a dispatcher callable for a method set with the runtime.
pub(crate) fn make_method_dispatcher(inner: &Rc<BridgeInner>, set: MethodSet) -> Value {
    let weak = Rc::downgrade(inner);
    let set = Rc::new(set);
    let id = inner.runtime.create_function(Rc::new(move |args: &[Value]| {
        let inner = weak
            .upgrade()
            .ok_or_else(|| ScriptError::new("bridge was dropped"))?;
        invoke_methods(&inner, &set, args).map_err(ScriptError::from)
    }));
    Value::Callable(id)
}

/// Register the `construct` dispatcher for a type with the runtime.
pub(crate) fn make_ctor_dispatcher(inner: &Rc<BridgeInner>, ty: TypeId) -> Value {
    let weak = Rc::downgrade(inner);
    let id = inner.runtime.create_function(Rc::new(move |args: &[Value]| {
        let inner = weak
            .upgrade()
            .ok_or_else(|| ScriptError::new("bridge was dropped"))?;
        invoke_ctor(&inner, ty, args).map_err(ScriptError::from)
    }));
    Value::Callable(id)
}

/// Resolve and invoke a method from its candidate set.
pub(crate) fn invoke_methods(
    inner: &Rc<BridgeInner>,
    set: &MethodSet,
    raw_args: &[Value],
) -> BridgeResult<Value> {
    let (receiver, call_args) = match set.kind {
        ExecKind::Static => (None, raw_args),
        ExecKind::Instance => {
            let recv = raw_args.first().and_then(|v| v.as_opaque()).ok_or_else(|| {
                BridgeError::Coercion {
                    tag: raw_args.first().map(|v| v.type_name()).unwrap_or("null"),
                    detail: format!("method '{}' requires an object receiver", set.name),
                }
            })?;
            (
                Some(HostValue::Object(recv.object().clone())),
                &raw_args[1..],
            )
        }
    };

    let args = classify(inner, call_args);
    for mref in &set.candidates {
        let def = inner.registry.method(*mref).map_err(BridgeError::from_host)?;
        if !signature_matches(inner, &def.params, def.varargs, &args) {
            continue;
        }
        let host_args = materialize_args(inner, &def.params, def.varargs, &args)?;
        let result = inner
            .registry
            .invoke(*mref, receiver.as_ref(), &host_args)
            .map_err(BridgeError::from_host)?;
        return Ok(to_guest(&result));
    }

    Err(BridgeError::NoMatch {
        requested: format!(
            "{}.{}({})",
            inner.registry.type_name(set.owner),
            set.name,
            render_args(inner, &args)
        ),
        candidates: set
            .candidates
            .iter()
            .map(|m| inner.registry.method_signature(*m))
            .collect(),
    })
}

/// Resolve and run a constructor, returning the new instance wrapped as an
/// opaque value.
pub(crate) fn invoke_ctor(
    inner: &Rc<BridgeInner>,
    ty: TypeId,
    raw_args: &[Value],
) -> BridgeResult<Value> {
    let t = inner.registry.get(ty).map_err(BridgeError::from_host)?;
    if t.is_interface() {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("cannot instantiate interface {}", t.name),
        });
    }
    if t.is_abstract {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("cannot instantiate abstract type {}", t.name),
        });
    }
    let candidates = inner.registry.constructors(ty);
    if candidates.is_empty() {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("{} has no accessible constructor", t.name),
        });
    }

    let args = classify(inner, raw_args);
    for cref in &candidates {
        let def = inner.registry.ctor(*cref).map_err(BridgeError::from_host)?;
        if !signature_matches(inner, &def.params, def.varargs, &args) {
            continue;
        }
        let host_args = materialize_args(inner, &def.params, def.varargs, &args)?;
        let obj = inner
            .registry
            .construct(*cref, &host_args)
            .map_err(BridgeError::from_host)?;
        return Ok(Value::Opaque(Rc::new(InstanceWrapper::new(obj))));
    }

    Err(BridgeError::NoMatch {
        requested: format!("{}({})", t.name, render_args(inner, &args)),
        candidates: candidates
            .iter()
            .map(|c| inner.registry.ctor_signature(*c))
            .collect(),
    })
}

fn classify<'a>(inner: &Rc<BridgeInner>, args: &'a [Value]) -> Vec<Arg<'a>> {
    args.iter()
        .map(|v| match v {
            Value::Callable(id) if inner.runtime.is_callable(v) => Arg::Pending(*id),
            other => Arg::Plain(other),
        })
        .collect()
}

// ============================================================================
// Matching
// ============================================================================

fn signature_matches(
    inner: &Rc<BridgeInner>,
    params: &[ParamType],
    varargs: bool,
    args: &[Arg<'_>],
) -> bool {
    if !varargs {
        return params.len() == args.len()
            && params.iter().zip(args).all(|(p, a)| compatible(inner, p, a));
    }

    let fixed = params.len() - 1;
    if args.len() < fixed {
        return false;
    }
    if !params[..fixed]
        .iter()
        .zip(args)
        .all(|(p, a)| compatible(inner, p, a))
    {
        return false;
    }
    let component = varargs_component(&params[fixed]);
    // Exactly one trailing argument that already is a compatible array (or
    // null) passes through unfolded.
    if args.len() == fixed + 1 {
        let array_ty = ParamType::Array(Box::new(component.clone()));
        if compatible(inner, &array_ty, &args[fixed]) {
            return true;
        }
    }
    args[fixed..].iter().all(|a| compatible(inner, &component, a))
}

fn varargs_component(last: &ParamType) -> ParamType {
    match last {
        ParamType::Array(c) => (**c).clone(),
        other => other.clone(),
    }
}

fn compatible(inner: &Rc<BridgeInner>, param: &ParamType, arg: &Arg<'_>) -> bool {
    match arg {
        // A pending callable matches only a single-abstract-method
        // interface parameter; no other type matches it.
        Arg::Pending(_) => match param {
            ParamType::Object(t) => inner.registry.sam_method(*t).is_some(),
            _ => false,
        },
        Arg::Plain(v) => value_compatible(inner, param, v),
    }
}

fn value_compatible(inner: &Rc<BridgeInner>, param: &ParamType, v: &Value) -> bool {
    match param {
        ParamType::Any => !matches!(v, Value::Map(_) | Value::Callable(_)),
        ParamType::Bool => matches!(v, Value::Bool(_)),
        ParamType::I8 | ParamType::I16 | ParamType::I32 | ParamType::I64 => match v {
            Value::Int(i) => int_fits(*i, param),
            _ => false,
        },
        ParamType::F32 | ParamType::F64 => matches!(v, Value::Float(_)),
        ParamType::Str => matches!(v, Value::Str(_) | Value::Null),
        ParamType::Array(component) => match v {
            Value::Null => true,
            Value::Array(items) => items
                .borrow()
                .iter()
                .all(|item| value_compatible(inner, component, item)),
            _ => false,
        },
        ParamType::Object(target) => match v {
            Value::Null => true,
            Value::Opaque(w) => inner.registry.is_subtype(w.type_id(), *target),
            Value::Type(_) => match inner.registry.mirror_type_id() {
                Ok(mirror_ty) => inner.registry.is_subtype(mirror_ty, *target),
                Err(_) => false,
            },
            _ => false,
        },
    }
}

// ============================================================================
// Materialization
// ============================================================================

fn materialize_args(
    inner: &Rc<BridgeInner>,
    params: &[ParamType],
    varargs: bool,
    args: &[Arg<'_>],
) -> BridgeResult<Vec<HostValue>> {
    if !varargs {
        return params
            .iter()
            .zip(args)
            .map(|(p, a)| materialize(inner, p, a))
            .collect();
    }

    let fixed = params.len() - 1;
    let mut out = Vec::with_capacity(params.len());
    for (p, a) in params[..fixed].iter().zip(args) {
        out.push(materialize(inner, p, a)?);
    }
    let component = varargs_component(&params[fixed]);
    let array_ty = ParamType::Array(Box::new(component.clone()));
    if args.len() == fixed + 1 {
        if let Arg::Plain(v) = &args[fixed] {
            if value_compatible(inner, &array_ty, v) {
                out.push(to_host_as(inner, v, &array_ty)?);
                return Ok(out);
            }
        }
    }
    // Fold the trailing arguments into one array of the component type;
    // zero trailing arguments yield a zero-length array.
    let mut folded = Vec::with_capacity(args.len() - fixed);
    for a in &args[fixed..] {
        folded.push(materialize(inner, &component, a)?);
    }
    out.push(HostValue::Array(HostArray::new(component, folded)));
    Ok(out)
}

fn materialize(inner: &Rc<BridgeInner>, param: &ParamType, arg: &Arg<'_>) -> BridgeResult<HostValue> {
    match arg {
        Arg::Plain(v) => to_host_as(inner, v, param),
        Arg::Pending(callable) => match param {
            ParamType::Object(iface) => {
                let obj = adapter::adapt_callable(inner, *callable, *iface)?;
                Ok(HostValue::Object(obj))
            }
            _ => Err(BridgeError::Coercion {
                tag: "function",
                detail: "callable argument outside functional-interface position".to_string(),
            }),
        },
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

fn render_args(inner: &Rc<BridgeInner>, args: &[Arg<'_>]) -> String {
    args.iter()
        .map(|a| match a {
            Arg::Pending(_) => "function".to_string(),
            Arg::Plain(Value::Opaque(w)) => inner.registry.type_name(w.type_id()),
            Arg::Plain(v) => v.type_name().to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
