//! Reflective member resolution
//!
//! One introspection pass per (wrapper, name): field first, then method
//! group, then a permanent "absent" marker. Fields cache their value only
//! when final; mutable fields cache the handle and re-read the host field
//! on every access, so host-side writes between guest reads stay
//! observable. Method groups become one dispatcher callable, cached
//! permanently.
//!
//! Static wrappers answer four synthesized pseudo-members ahead of real
//! members: `asClass`, `construct`, `extendWith`, `implementWith`. A host
//! type's own static member of one of those names is shadowed.

use std::rc::Rc;

use ponte_host::{ObjectRef, TypeId};

use crate::coerce::{to_guest, to_host_as};
use crate::dispatch::{make_ctor_dispatcher, make_method_dispatcher, ExecKind, MethodSet};
use crate::error::{BridgeError, BridgeResult, ScriptError};
use crate::synthesize;
use crate::value::Value;
use crate::wrapper::{InstanceWrapper, MemberSlot, StaticWrapper};
use crate::BridgeInner;

/// Resolve a member on a type's static surface.
pub(crate) fn static_member(
    inner: &Rc<BridgeInner>,
    wrapper: &Rc<StaticWrapper>,
    name: &str,
) -> BridgeResult<Value> {
    if let Some(slot) = wrapper.members.borrow().get(name).cloned() {
        return slot_value(inner, &slot, None);
    }
    let slot = match pseudo_member(inner, wrapper.type_id(), name)? {
        Some(slot) => slot,
        None => resolve(inner, wrapper.type_id(), name, true, None)?,
    };
    wrapper
        .members
        .borrow_mut()
        .insert(name.to_string(), slot.clone());
    slot_value(inner, &slot, None)
}

/// Resolve a member on an object's instance surface.
pub(crate) fn instance_member(
    inner: &Rc<BridgeInner>,
    wrapper: &Rc<InstanceWrapper>,
    name: &str,
) -> BridgeResult<Value> {
    if let Some(slot) = wrapper.members.borrow().get(name).cloned() {
        return slot_value(inner, &slot, Some(wrapper.object()));
    }
    let slot = resolve(inner, wrapper.type_id(), name, false, Some(wrapper.object()))?;
    wrapper
        .members
        .borrow_mut()
        .insert(name.to_string(), slot.clone());
    slot_value(inner, &slot, Some(wrapper.object()))
}

/// Write a static field through the wrapper.
pub(crate) fn set_static_member(
    inner: &Rc<BridgeInner>,
    wrapper: &Rc<StaticWrapper>,
    name: &str,
    value: &Value,
) -> BridgeResult<()> {
    write_field(inner, wrapper.type_id(), name, true, None, value)
}

/// Write an instance field through the wrapper.
pub(crate) fn set_instance_member(
    inner: &Rc<BridgeInner>,
    wrapper: &Rc<InstanceWrapper>,
    name: &str,
    value: &Value,
) -> BridgeResult<()> {
    write_field(
        inner,
        wrapper.type_id(),
        name,
        false,
        Some(wrapper.object()),
        value,
    )
}

fn write_field(
    inner: &Rc<BridgeInner>,
    ty: TypeId,
    name: &str,
    want_static: bool,
    receiver: Option<&ObjectRef>,
    value: &Value,
) -> BridgeResult<()> {
    let fref = inner
        .registry
        .resolve_field(ty, name, want_static)
        .ok_or_else(|| {
            BridgeError::from_host(ponte_host::HostError::UnknownMember {
                type_name: inner.registry.type_name(ty),
                member: name.to_string(),
            })
        })?;
    let def = inner.registry.field(fref).map_err(BridgeError::from_host)?;
    let coerced = to_host_as(inner, value, &def.ty)?;
    inner
        .registry
        .write_field(fref, receiver, coerced)
        .map_err(BridgeError::from_host)
}

fn slot_value(
    inner: &Rc<BridgeInner>,
    slot: &MemberSlot,
    receiver: Option<&ObjectRef>,
) -> BridgeResult<Value> {
    match slot {
        MemberSlot::FieldConst(v) => Ok(v.clone()),
        MemberSlot::Field(fref) => {
            let value = inner
                .registry
                .read_field(*fref, receiver)
                .map_err(BridgeError::from_host)?;
            Ok(to_guest(&value))
        }
        MemberSlot::Methods(v) => Ok(v.clone()),
        MemberSlot::Absent => Ok(Value::Null),
    }
}

/// One introspection pass: field, then method group, then absent.
fn resolve(
    inner: &Rc<BridgeInner>,
    ty: TypeId,
    name: &str,
    want_static: bool,
    receiver: Option<&ObjectRef>,
) -> BridgeResult<MemberSlot> {
    if let Some(fref) = inner.registry.resolve_field(ty, name, want_static) {
        let def = inner.registry.field(fref).map_err(BridgeError::from_host)?;
        if def.is_final {
            let value = inner
                .registry
                .read_field(fref, receiver)
                .map_err(BridgeError::from_host)?;
            return Ok(MemberSlot::FieldConst(to_guest(&value)));
        }
        return Ok(MemberSlot::Field(fref));
    }

    let candidates = inner.registry.methods_named(ty, name, want_static);
    if !candidates.is_empty() {
        let kind = if want_static {
            ExecKind::Static
        } else {
            ExecKind::Instance
        };
        let dispatcher = make_method_dispatcher(
            inner,
            MethodSet {
                owner: ty,
                name: name.to_string(),
                kind,
                candidates,
            },
        );
        return Ok(MemberSlot::Methods(dispatcher));
    }

    Ok(MemberSlot::Absent)
}

/// The four synthesized pseudo-members of a static wrapper.
fn pseudo_member(
    inner: &Rc<BridgeInner>,
    ty: TypeId,
    name: &str,
) -> BridgeResult<Option<MemberSlot>> {
    match name {
        "asClass" => {
            let mirror = inner.registry.mirror(ty).map_err(BridgeError::from_host)?;
            Ok(Some(MemberSlot::FieldConst(Value::Opaque(Rc::new(
                InstanceWrapper::new(mirror),
            )))))
        }
        "construct" => Ok(Some(MemberSlot::Methods(make_ctor_dispatcher(inner, ty)))),
        "extendWith" => Ok(Some(MemberSlot::Methods(make_synthesis_fn(
            inner,
            ty,
            SynthesisOp::Extend,
        )))),
        "implementWith" => Ok(Some(MemberSlot::Methods(make_synthesis_fn(
            inner,
            ty,
            SynthesisOp::Implement,
        )))),
        _ => Ok(None),
    }
}

#[derive(Clone, Copy)]
enum SynthesisOp {
    Extend,
    Implement,
}

fn make_synthesis_fn(inner: &Rc<BridgeInner>, ty: TypeId, op: SynthesisOp) -> Value {
    let weak = Rc::downgrade(inner);
    let id = inner.runtime.create_function(Rc::new(move |args: &[Value]| {
        let inner = weak
            .upgrade()
            .ok_or_else(|| ScriptError::new("bridge was dropped"))?;
        let table = args.first().ok_or_else(|| {
            ScriptError::new("expected a dispatch table (function or map of functions)")
        })?;
        let result = match op {
            SynthesisOp::Extend => synthesize::extend(&inner, ty, table),
            SynthesisOp::Implement => synthesize::implement(&inner, ty, table),
        };
        result.map_err(ScriptError::from)
    }));
    Value::Callable(id)
}
