//! Value coercion between guest and host representations
//!
//! The single chokepoint for boundary crossings. `to_guest` is total;
//! `to_host` is partial (maps and bare callables have no host
//! representation — callables are materialized only at call sites, where
//! the target parameter type is known). `to_host_as` is the contextual
//! variant dispatch uses once a candidate has been chosen.

use std::rc::Rc;

use ponte_host::{HostArray, HostValue, ParamType, TypeId};

use crate::error::{BridgeError, BridgeResult};
use crate::value::Value;
use crate::wrapper::{InstanceWrapper, StaticWrapper};
use crate::BridgeInner;

/// Convert a host value into its guest representation. Total: every host
/// value has a guest form, and a host null becomes `Value::Null` (never a
/// null reference on the guest side).
pub(crate) fn to_guest(v: &HostValue) -> Value {
    match v {
        HostValue::Null => Value::Null,
        HostValue::Bool(b) => Value::Bool(*b),
        HostValue::I8(i) => Value::Int(*i as i64),
        HostValue::I16(i) => Value::Int(*i as i64),
        HostValue::I32(i) => Value::Int(*i as i64),
        HostValue::I64(i) => Value::Int(*i),
        HostValue::F32(f) => Value::Float(*f as f64),
        HostValue::F64(f) => Value::Float(*f),
        HostValue::Str(s) => Value::Str(s.clone()),
        // Eager, order-preserving, 0-based — same indexing as the host.
        HostValue::Array(arr) => {
            let items = arr.items.borrow().iter().map(to_guest).collect();
            Value::array(items)
        }
        HostValue::Object(obj) => Value::Opaque(Rc::new(InstanceWrapper::new(obj.clone()))),
    }
}

/// Wrap a host type as its static surface. Identity-cached per bridge:
/// wrapping the same type twice returns the same `Rc`.
pub(crate) fn wrap_type(inner: &Rc<BridgeInner>, ty: TypeId) -> Rc<StaticWrapper> {
    if let Some(existing) = inner.statics.borrow().get(&ty) {
        return existing.clone();
    }
    let wrapper = Rc::new(StaticWrapper::new(ty));
    inner.statics.borrow_mut().insert(ty, wrapper.clone());
    wrapper
}

/// Convert a guest value into a host value without a target type. Partial:
/// maps and callables fail with a `Coercion` error naming the guest tag.
pub(crate) fn to_host(inner: &Rc<BridgeInner>, v: &Value) -> BridgeResult<HostValue> {
    match v {
        Value::Null => Ok(HostValue::Null),
        Value::Bool(b) => Ok(HostValue::Bool(*b)),
        Value::Int(i) => Ok(HostValue::I64(*i)),
        Value::Float(f) => Ok(HostValue::F64(*f)),
        Value::Str(s) => Ok(HostValue::Str(s.clone())),
        Value::Array(items) => {
            let items = items.borrow();
            let mut out = Vec::with_capacity(items.len());
            for item in items.iter() {
                out.push(to_host(inner, item)?);
            }
            let component = infer_component(&out);
            Ok(HostValue::Array(HostArray::new(component, out)))
        }
        Value::Opaque(w) => Ok(HostValue::Object(w.object().clone())),
        Value::Type(w) => {
            let mirror = inner
                .registry
                .mirror(w.type_id())
                .map_err(BridgeError::from_host)?;
            Ok(HostValue::Object(mirror))
        }
        Value::Map(_) => Err(BridgeError::Coercion {
            tag: "map",
            detail: "no host representation".to_string(),
        }),
        Value::Callable(_) => Err(BridgeError::Coercion {
            tag: "function",
            detail: "callables are only convertible in functional-interface position".to_string(),
        }),
    }
}

/// Convert a guest value into a host value of the given parameter type.
/// Assumes compatibility was established by dispatch, but still validates
/// so the public coercion surface stays safe on its own.
pub(crate) fn to_host_as(
    inner: &Rc<BridgeInner>,
    v: &Value,
    ty: &ParamType,
) -> BridgeResult<HostValue> {
    match ty {
        ParamType::Any => to_host(inner, v),
        ParamType::Bool => match v {
            Value::Bool(b) => Ok(HostValue::Bool(*b)),
            _ => Err(mismatch(v, "bool")),
        },
        ParamType::I8 | ParamType::I16 | ParamType::I32 | ParamType::I64 => match v {
            Value::Int(i) if int_fits(*i, ty) => Ok(narrow_int(*i, ty)),
            _ => Err(mismatch(v, "integer")),
        },
        ParamType::F32 => match v {
            Value::Float(f) => Ok(HostValue::F32(*f as f32)),
            _ => Err(mismatch(v, "float")),
        },
        ParamType::F64 => match v {
            Value::Float(f) => Ok(HostValue::F64(*f)),
            _ => Err(mismatch(v, "double")),
        },
        ParamType::Str => match v {
            Value::Str(s) => Ok(HostValue::Str(s.clone())),
            Value::Null => Ok(HostValue::Null),
            _ => Err(mismatch(v, "string")),
        },
        ParamType::Array(component) => match v {
            Value::Null => Ok(HostValue::Null),
            Value::Array(items) => {
                let items = items.borrow();
                let mut out = Vec::with_capacity(items.len());
                for item in items.iter() {
                    out.push(to_host_as(inner, item, component)?);
                }
                Ok(HostValue::Array(HostArray::new((**component).clone(), out)))
            }
            _ => Err(mismatch(v, "array")),
        },
        ParamType::Object(target) => match v {
            Value::Null => Ok(HostValue::Null),
            Value::Opaque(w) => {
                if inner.registry.is_subtype(w.type_id(), *target) {
                    Ok(HostValue::Object(w.object().clone()))
                } else {
                    Err(BridgeError::Coercion {
                        tag: "object",
                        detail: format!(
                            "{} is not a subtype of {}",
                            inner.registry.type_name(w.type_id()),
                            inner.registry.type_name(*target)
                        ),
                    })
                }
            }
            Value::Type(w) => {
                let mirror_ty = inner
                    .registry
                    .mirror_type_id()
                    .map_err(BridgeError::from_host)?;
                if inner.registry.is_subtype(mirror_ty, *target) {
                    let mirror = inner
                        .registry
                        .mirror(w.type_id())
                        .map_err(BridgeError::from_host)?;
                    Ok(HostValue::Object(mirror))
                } else {
                    Err(mismatch(v, "object"))
                }
            }
            _ => Err(mismatch(v, "object")),
        },
    }
}

/// Range-fit check realizing the integral widening table over the guest's
/// single Int64 representation.
pub(crate) fn int_fits(i: i64, ty: &ParamType) -> bool {
    match ty {
        ParamType::I8 => i64::from(i8::MIN) <= i && i <= i64::from(i8::MAX),
        ParamType::I16 => i64::from(i16::MIN) <= i && i <= i64::from(i16::MAX),
        ParamType::I32 => i64::from(i32::MIN) <= i && i <= i64::from(i32::MAX),
        ParamType::I64 => true,
        _ => false,
    }
}

fn narrow_int(i: i64, ty: &ParamType) -> HostValue {
    match ty {
        ParamType::I8 => HostValue::I8(i as i8),
        ParamType::I16 => HostValue::I16(i as i16),
        ParamType::I32 => HostValue::I32(i as i32),
        _ => HostValue::I64(i),
    }
}

fn mismatch(v: &Value, expected: &str) -> BridgeError {
    BridgeError::Coercion {
        tag: v.type_name(),
        detail: format!("expected {expected}"),
    }
}

/// Component type for a host array built from an untyped guest array: the
/// common kind of the elements, `Any` when mixed or empty.
fn infer_component(items: &[HostValue]) -> ParamType {
    let mut component: Option<ParamType> = None;
    for item in items {
        let kind = match item {
            HostValue::Bool(_) => ParamType::Bool,
            HostValue::I64(_) => ParamType::I64,
            HostValue::F64(_) => ParamType::F64,
            HostValue::Str(_) => ParamType::Str,
            _ => return ParamType::Any,
        };
        match &component {
            None => component = Some(kind),
            Some(c) if *c == kind => {}
            Some(_) => return ParamType::Any,
        }
    }
    component.unwrap_or(ParamType::Any)
}
