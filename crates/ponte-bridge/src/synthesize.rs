//! Dynamic type synthesis
//!
//! Creates new host types (or anonymous proxy instances) whose overridable
//! methods route back into guest callables. The guest supplies either a
//! single callable — every intercepted call goes through it — or a table
//! mapping method names to callables, where a miss falls back to the
//! inherited implementation.

use std::rc::Rc;

use ponte_host::{HostError, HostValue, InterceptHook, TypeId};
use rustc_hash::FxHashMap;

use crate::coerce::{to_guest, to_host_as, wrap_type};
use crate::error::{BridgeError, BridgeResult};
use crate::value::{CallableId, Value};
use crate::wrapper::InstanceWrapper;
use crate::BridgeInner;

/// Guest-side dispatch for a synthesized type.
pub(crate) enum GuestImpl {
    /// Every intercepted call routes through this callable
    Single(CallableId),
    /// Per-method-name callables; miss falls back to the inherited body
    Table(FxHashMap<String, CallableId>),
}

/// Interpret a guest value as a dispatch table.
pub(crate) fn parse_impl(inner: &Rc<BridgeInner>, v: &Value) -> BridgeResult<GuestImpl> {
    match v {
        Value::Callable(id) if inner.runtime.is_callable(v) => Ok(GuestImpl::Single(*id)),
        Value::Map(entries) => {
            let entries = entries.borrow();
            let mut table = FxHashMap::default();
            for (name, entry) in entries.iter() {
                match entry {
                    Value::Callable(id) if inner.runtime.is_callable(entry) => {
                        table.insert(name.clone(), *id);
                    }
                    other => {
                        return Err(BridgeError::Coercion {
                            tag: other.type_name(),
                            detail: format!("dispatch table entry '{name}' is not a function"),
                        });
                    }
                }
            }
            Ok(GuestImpl::Table(table))
        }
        other => Err(BridgeError::IllegalSynthesis {
            reason: format!(
                "dispatch table must be a function or a map of functions, got {}",
                other.type_name()
            ),
        }),
    }
}

/// Synthesize a subclass of `base` and return its static wrapper.
pub(crate) fn extend(inner: &Rc<BridgeInner>, base: TypeId, impl_v: &Value) -> BridgeResult<Value> {
    let base_ty = inner.registry.get(base).map_err(BridgeError::from_host)?;
    if base_ty.is_interface() {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("{} is an interface; use implementWith", base_ty.name),
        });
    }
    if base_ty.is_final {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("{} is final and cannot be extended", base_ty.name),
        });
    }
    let gimpl = parse_impl(inner, impl_v)?;
    let hook = make_hook(inner, base, gimpl);
    let id = inner
        .registry
        .define_subtype(base, hook, None)
        .map_err(BridgeError::from_host)?;
    Ok(Value::Type(wrap_type(inner, id)))
}

/// Synthesize an implementation of interface `iface` and return its static
/// wrapper.
pub(crate) fn implement(
    inner: &Rc<BridgeInner>,
    iface: TypeId,
    impl_v: &Value,
) -> BridgeResult<Value> {
    let iface_ty = inner.registry.get(iface).map_err(BridgeError::from_host)?;
    if !iface_ty.is_interface() {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("{} is not an interface", iface_ty.name),
        });
    }
    let gimpl = parse_impl(inner, impl_v)?;
    let hook = make_hook(inner, iface, gimpl);
    let id = inner
        .registry
        .define_subtype(iface, hook, None)
        .map_err(BridgeError::from_host)?;
    Ok(Value::Type(wrap_type(inner, id)))
}

/// Same mechanism without a reusable named type: synthesize an anonymous
/// type and return one instance of it.
pub(crate) fn proxy_instance(
    inner: &Rc<BridgeInner>,
    target: TypeId,
    impl_v: &Value,
) -> BridgeResult<Value> {
    let target_ty = inner.registry.get(target).map_err(BridgeError::from_host)?;
    if target_ty.is_final {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("{} is final and cannot be proxied", target_ty.name),
        });
    }
    let gimpl = parse_impl(inner, impl_v)?;
    let hook = make_hook(inner, target, gimpl);
    let id = inner
        .registry
        .define_subtype(target, hook, None)
        .map_err(BridgeError::from_host)?;
    let obj = inner.registry.instantiate(id).map_err(|err| match err {
        HostError::NoAccessibleConstructor { type_name } => BridgeError::IllegalSynthesis {
            reason: format!("{type_name} has no accessible constructor"),
        },
        other => BridgeError::from_host(other),
    })?;
    Ok(Value::Opaque(Rc::new(InstanceWrapper::new(obj))))
}

/// Build the interception hook for a synthesized type: look up the guest
/// callable (by method name for tables), coerce the receiver and arguments
/// out, invoke, coerce the declared return type back. On a table miss,
/// fall back to the inherited implementation starting at `base`.
pub(crate) fn make_hook(inner: &Rc<BridgeInner>, base: TypeId, gimpl: GuestImpl) -> InterceptHook {
    let weak = Rc::downgrade(inner);
    Rc::new(move |reg, target, recv, args| {
        let inner = weak
            .upgrade()
            .ok_or_else(|| HostError::Raised("bridge was dropped".to_string()))?;
        let callable = match &gimpl {
            GuestImpl::Single(id) => Some(*id),
            GuestImpl::Table(table) => table.get(&target.name).copied(),
        };
        match callable {
            Some(id) => {
                let mut guest_args = Vec::with_capacity(args.len() + 1);
                guest_args.push(to_guest(&HostValue::Object(recv.clone())));
                guest_args.extend(args.iter().map(to_guest));
                let mut out = inner
                    .runtime
                    .invoke(id, &guest_args)
                    .map_err(|e| HostError::Raised(format!("script error: {e}")))?;
                let result = if out.is_empty() {
                    Value::Null
                } else {
                    out.remove(0)
                };
                match &target.ret {
                    Some(ret) => to_host_as(&inner, &result, ret)
                        .map_err(|e| HostError::Raised(e.to_string())),
                    None => Ok(HostValue::Null),
                }
            }
            None => reg.call_inherited(base, &target.name, &target.params, recv, args),
        }
    })
}
