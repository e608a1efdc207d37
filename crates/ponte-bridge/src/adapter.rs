//! Callback adaptation
//!
//! Wraps a single guest callable behind a host functional-interface shape:
//! the adapter is an anonymous synthesized instance whose sole abstract
//! method routes to the callable. Used to satisfy functional-interface
//! parameters during dispatch, and to build ForEach/iterator bridges over
//! collections.

use std::cell::Cell;
use std::rc::Rc;

use ponte_host::{ObjectRef, TypeId};

use crate::error::{BridgeError, BridgeResult};
use crate::synthesize::{make_hook, GuestImpl};
use crate::value::{CallableId, Value};
use crate::BridgeInner;

/// Materialize a guest callable as an instance of the given
/// single-abstract-method interface.
pub(crate) fn adapt_callable(
    inner: &Rc<BridgeInner>,
    callable: CallableId,
    iface: TypeId,
) -> BridgeResult<ObjectRef> {
    let iface_ty = inner.registry.get(iface).map_err(BridgeError::from_host)?;
    if !iface_ty.is_interface() {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("{} is not an interface", iface_ty.name),
        });
    }
    if inner.registry.sam_method(iface).is_none() {
        return Err(BridgeError::IllegalSynthesis {
            reason: format!("{} is not a single-method interface", iface_ty.name),
        });
    }
    let hook = make_hook(inner, iface, GuestImpl::Single(callable));
    let id = inner
        .registry
        .define_subtype(iface, hook, None)
        .map_err(BridgeError::from_host)?;
    inner.registry.instantiate(id).map_err(BridgeError::from_host)
}

/// Drive a guest callable once per element of an array value, passing
/// `(element, index)`.
pub(crate) fn each(
    inner: &Rc<BridgeInner>,
    collection: &Value,
    callable: CallableId,
) -> BridgeResult<()> {
    let items = match collection {
        Value::Array(items) => items,
        other => {
            return Err(BridgeError::Coercion {
                tag: other.type_name(),
                detail: "iteration requires an array".to_string(),
            });
        }
    };
    // Snapshot the elements so the callback may mutate the array.
    let snapshot: Vec<Value> = items.borrow().clone();
    for (index, element) in snapshot.into_iter().enumerate() {
        inner
            .runtime
            .invoke(callable, &[element, Value::Int(index as i64)])
            .map_err(|source| BridgeError::Script { source })?;
    }
    Ok(())
}

/// Build a guest-side cursor over an array value: each invocation yields
/// the next element, then `Null` once exhausted.
pub(crate) fn iterator(inner: &Rc<BridgeInner>, collection: &Value) -> BridgeResult<Value> {
    let items = match collection {
        Value::Array(items) => items.clone(),
        other => {
            return Err(BridgeError::Coercion {
                tag: other.type_name(),
                detail: "iteration requires an array".to_string(),
            });
        }
    };
    let cursor = Cell::new(0usize);
    let id = inner.runtime.create_function(Rc::new(move |_args: &[Value]| {
        let index = cursor.get();
        let items = items.borrow();
        if index < items.len() {
            cursor.set(index + 1);
            Ok(items[index].clone())
        } else {
            Ok(Value::Null)
        }
    }));
    Ok(Value::Callable(id))
}
