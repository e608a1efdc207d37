//! Ponte bridge — reflective coercion and dynamic dispatch between an
//! embedded script runtime and the Ponte host model.
//!
//! The bridge lets guest code wrap host types, read members lazily (with
//! per-name caching), call overloaded methods and constructors (first
//! matching candidate in declaration order, varargs folding, widening),
//! and synthesize new host subtypes or proxy instances whose methods are
//! implemented by guest callables.
//!
//! The bridge is single-threaded and non-reentrant-safe: all caches are
//! plain shared mutable state with no synchronization. Callers needing
//! multi-threaded access must serialize externally — one bridge per
//! worker, or an external lock.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use ponte_bridge::{Bridge, CallableRegistry, Value};
//! use ponte_host::TypeRegistry;
//!
//! let registry = Rc::new(TypeRegistry::new());
//! // ... declare host types ...
//! let runtime = Rc::new(CallableRegistry::new());
//! let bridge = Bridge::new(registry, runtime);
//!
//! let doc = bridge.lookup("demo.Document").unwrap();
//! let construct = bridge.member(&doc, "construct")?;
//! let instance = bridge.call(&construct, &[Value::str("hello")])?;
//! ```

#![warn(missing_docs)]

use std::cell::RefCell;
use std::rc::Rc;

use ponte_host::{HostValue, TypeId, TypeRegistry};
use rustc_hash::FxHashMap;

mod adapter;
mod coerce;
mod dispatch;
mod error;
mod members;
mod runtime;
mod synthesize;
mod value;
mod wrapper;

pub use error::{BridgeError, BridgeResult, ScriptError};
pub use runtime::{CallableRegistry, NativeFn, ScriptRuntime};
pub use value::{CallableId, GuestArray, GuestMap, Value};
pub use wrapper::{InstanceWrapper, StaticWrapper};

/// Shared bridge state. Dispatchers and hooks registered with the runtime
/// capture this weakly, so dropping the bridge severs them instead of
/// leaking an Rc cycle through the runtime.
pub(crate) struct BridgeInner {
    pub(crate) registry: Rc<TypeRegistry>,
    pub(crate) runtime: Rc<dyn ScriptRuntime>,
    pub(crate) statics: RefCell<FxHashMap<TypeId, Rc<StaticWrapper>>>,
}

/// The interop bridge. One instance per embedded runtime; owns the
/// identity cache for static wrappers (no process-global state).
pub struct Bridge {
    inner: Rc<BridgeInner>,
}

impl Bridge {
    /// Create a bridge over a host registry and a script runtime.
    pub fn new(registry: Rc<TypeRegistry>, runtime: Rc<dyn ScriptRuntime>) -> Self {
        Self {
            inner: Rc::new(BridgeInner {
                registry,
                runtime,
                statics: RefCell::new(FxHashMap::default()),
            }),
        }
    }

    /// The host registry this bridge exposes
    pub fn registry(&self) -> &Rc<TypeRegistry> {
        &self.inner.registry
    }

    /// The script runtime this bridge dispatches into
    pub fn runtime(&self) -> &Rc<dyn ScriptRuntime> {
        &self.inner.runtime
    }

    // ========================================================================
    // Coercion
    // ========================================================================

    /// Wrap a host type as its static surface. Identity-stable: the same
    /// type always yields the same wrapper instance for this bridge.
    pub fn wrap_type(&self, ty: TypeId) -> Rc<StaticWrapper> {
        coerce::wrap_type(&self.inner, ty)
    }

    /// Look up a host type by name and wrap it; `None` when unregistered.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let ty = self.inner.registry.find(name)?;
        Some(Value::Type(self.wrap_type(ty)))
    }

    /// Convert a host value into its guest representation.
    pub fn to_guest(&self, value: &HostValue) -> Value {
        coerce::to_guest(value)
    }

    /// Convert a guest value into a host value. Partial: maps and bare
    /// callables have no host representation.
    pub fn to_host(&self, value: &Value) -> BridgeResult<HostValue> {
        coerce::to_host(&self.inner, value)
    }

    // ========================================================================
    // Members
    // ========================================================================

    /// Read a member off a wrapper (static surface for `Type` values,
    /// instance surface for `Opaque` values). Absent members resolve to
    /// `Null`.
    pub fn member(&self, target: &Value, name: &str) -> BridgeResult<Value> {
        match target {
            Value::Type(w) => members::static_member(&self.inner, w, name),
            Value::Opaque(w) => members::instance_member(&self.inner, w, name),
            other => Err(BridgeError::Coercion {
                tag: other.type_name(),
                detail: "value has no members".to_string(),
            }),
        }
    }

    /// Write a public non-final field through a wrapper.
    pub fn set_member(&self, target: &Value, name: &str, value: &Value) -> BridgeResult<()> {
        match target {
            Value::Type(w) => members::set_static_member(&self.inner, w, name, value),
            Value::Opaque(w) => members::set_instance_member(&self.inner, w, name, value),
            other => Err(BridgeError::Coercion {
                tag: other.type_name(),
                detail: "value has no members".to_string(),
            }),
        }
    }

    // ========================================================================
    // Calls
    // ========================================================================

    /// Invoke a guest callable (including bridge-installed dispatchers)
    /// and return the first result slot.
    pub fn call(&self, callable: &Value, args: &[Value]) -> BridgeResult<Value> {
        let id = callable
            .as_callable()
            .filter(|_| self.inner.runtime.is_callable(callable))
            .ok_or_else(|| BridgeError::Coercion {
                tag: callable.type_name(),
                detail: "value is not callable".to_string(),
            })?;
        let mut out = self
            .inner
            .runtime
            .invoke(id, args)
            .map_err(|source| BridgeError::Script { source })?;
        Ok(if out.is_empty() {
            Value::Null
        } else {
            out.remove(0)
        })
    }

    // ========================================================================
    // Synthesis
    // ========================================================================

    /// Synthesize a subclass of a wrapped class, dispatching overridable
    /// methods to the guest implementation (single callable or name→callable
    /// map). Each call produces a new distinct type.
    pub fn extend(&self, base: &Value, implementation: &Value) -> BridgeResult<Value> {
        synthesize::extend(&self.inner, type_id_of(base)?, implementation)
    }

    /// Synthesize an implementation of a wrapped interface.
    pub fn implement(&self, iface: &Value, implementation: &Value) -> BridgeResult<Value> {
        synthesize::implement(&self.inner, type_id_of(iface)?, implementation)
    }

    /// Synthesize an anonymous subtype and return one instance of it.
    pub fn proxy(&self, target: &Value, implementation: &Value) -> BridgeResult<Value> {
        synthesize::proxy_instance(&self.inner, type_id_of(target)?, implementation)
    }

    // ========================================================================
    // Adapters
    // ========================================================================

    /// Materialize a guest callable as an instance of a wrapped
    /// single-abstract-method interface.
    pub fn adapt(&self, callable: &Value, iface: &Value) -> BridgeResult<Value> {
        let id = callable
            .as_callable()
            .filter(|_| self.inner.runtime.is_callable(callable))
            .ok_or_else(|| BridgeError::Coercion {
                tag: callable.type_name(),
                detail: "expected a callable".to_string(),
            })?;
        let obj = adapter::adapt_callable(&self.inner, id, type_id_of(iface)?)?;
        Ok(Value::Opaque(Rc::new(InstanceWrapper::new(obj))))
    }

    /// Drive a guest callable once per element of an array value, passing
    /// `(element, index)`.
    pub fn each(&self, collection: &Value, callable: &Value) -> BridgeResult<()> {
        let id = callable
            .as_callable()
            .filter(|_| self.inner.runtime.is_callable(callable))
            .ok_or_else(|| BridgeError::Coercion {
                tag: callable.type_name(),
                detail: "expected a callable".to_string(),
            })?;
        adapter::each(&self.inner, collection, id)
    }

    /// Build a guest-side cursor over an array value: each invocation
    /// yields the next element, then `Null` once exhausted.
    pub fn iterator(&self, collection: &Value) -> BridgeResult<Value> {
        adapter::iterator(&self.inner, collection)
    }
}

fn type_id_of(v: &Value) -> BridgeResult<TypeId> {
    v.as_type()
        .map(|w| w.type_id())
        .ok_or_else(|| BridgeError::Coercion {
            tag: v.type_name(),
            detail: "expected a wrapped host type".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ponte_host::{FieldSpec, MethodSpec, ParamType, TypeSpec};

    fn fixture() -> (Bridge, Rc<CallableRegistry>) {
        let registry = Rc::new(TypeRegistry::new());
        registry
            .declare(
                TypeSpec::class("demo.Counter")
                    .field(
                        FieldSpec::new("limit", ParamType::I32)
                            .as_static()
                            .init(HostValue::I32(10)),
                    )
                    .field(
                        FieldSpec::new("NAME", ParamType::Str)
                            .as_static()
                            .as_final()
                            .init(HostValue::str("counter")),
                    )
                    .method(MethodSpec::new(
                        "twice",
                        vec![ParamType::I32],
                        Some(ParamType::I32),
                        |_, _, args| Ok(HostValue::I32(args[0].as_i64().unwrap() as i32 * 2)),
                    )
                    .as_static()),
            )
            .unwrap();
        let runtime = Rc::new(CallableRegistry::new());
        let bridge = Bridge::new(registry, runtime.clone());
        (bridge, runtime)
    }

    #[test]
    fn test_wrap_type_identity_stable() {
        let (bridge, _) = fixture();
        let ty = bridge.registry().find("demo.Counter").unwrap();
        let a = bridge.wrap_type(ty);
        let b = bridge.wrap_type(ty);
        assert!(Rc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_lookup_unknown_is_none() {
        let (bridge, _) = fixture();
        assert!(bridge.lookup("demo.Missing").is_none());
    }

    #[test]
    fn test_static_method_member_dispatch() {
        let (bridge, _) = fixture();
        let counter = bridge.lookup("demo.Counter").unwrap();
        let twice = bridge.member(&counter, "twice").unwrap();
        let out = bridge.call(&twice, &[Value::Int(21)]).unwrap();
        assert_eq!(out, Value::Int(42));
    }

    #[test]
    fn test_mutable_static_field_reread() {
        let (bridge, _) = fixture();
        let counter = bridge.lookup("demo.Counter").unwrap();
        assert_eq!(bridge.member(&counter, "limit").unwrap(), Value::Int(10));

        // Host-side write after the first resolution must be observed.
        let registry = bridge.registry().clone();
        let ty = registry.find("demo.Counter").unwrap();
        let fref = registry.resolve_field(ty, "limit", true).unwrap();
        registry
            .write_field(fref, None, HostValue::I32(77))
            .unwrap();
        assert_eq!(bridge.member(&counter, "limit").unwrap(), Value::Int(77));
    }

    #[test]
    fn test_final_field_cached_and_absent_is_null() {
        let (bridge, _) = fixture();
        let counter = bridge.lookup("demo.Counter").unwrap();
        assert_eq!(
            bridge.member(&counter, "NAME").unwrap(),
            Value::str("counter")
        );
        assert_eq!(bridge.member(&counter, "nothing").unwrap(), Value::Null);
        // Second read comes from the absent cache, same answer.
        assert_eq!(bridge.member(&counter, "nothing").unwrap(), Value::Null);
    }

    #[test]
    fn test_set_member_writes_and_rejects_final() {
        let (bridge, _) = fixture();
        let counter = bridge.lookup("demo.Counter").unwrap();
        bridge
            .set_member(&counter, "limit", &Value::Int(5))
            .unwrap();
        assert_eq!(bridge.member(&counter, "limit").unwrap(), Value::Int(5));

        let err = bridge
            .set_member(&counter, "NAME", &Value::str("x"))
            .unwrap_err();
        assert!(matches!(err, BridgeError::Invocation { .. }));
    }

    #[test]
    fn test_member_on_primitive_fails() {
        let (bridge, _) = fixture();
        let err = bridge.member(&Value::Int(1), "x").unwrap_err();
        assert!(matches!(err, BridgeError::Coercion { .. }));
    }

    #[test]
    fn test_nil_symmetry() {
        let (bridge, _) = fixture();
        assert_eq!(bridge.to_guest(&HostValue::Null), Value::Null);
        assert_eq!(bridge.to_host(&Value::Null).unwrap(), HostValue::Null);
    }
}
