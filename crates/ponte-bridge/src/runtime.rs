//! Script runtime contract
//!
//! The bridge consumes the guest runtime through this trait alone: invoke
//! a callable with values, ask whether a value is callable, and mint
//! native-function objects the bridge installs as members (dispatchers,
//! pseudo-members, iterator cursors).
//!
//! `CallableRegistry` is the default implementation for embedders whose
//! guest functions are Rust closures, and the backbone of the test suite.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ScriptError;
use crate::value::{CallableId, Value};

/// A native function installed into the runtime by the bridge (or by an
/// embedder standing in for script code).
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, ScriptError>>;

/// Abstract guest runtime.
///
/// `invoke` returns at least one slot; slot 0 is *the* result. The bridge
/// never needs a parsing or compilation contract.
pub trait ScriptRuntime {
    /// Invoke a guest callable with the given arguments
    fn invoke(&self, callable: CallableId, args: &[Value]) -> Result<Vec<Value>, ScriptError>;

    /// Check whether a value is callable in this runtime
    fn is_callable(&self, value: &Value) -> bool;

    /// Wrap a native function as a runtime-owned callable
    fn create_function(&self, f: NativeFn) -> CallableId;
}

/// Slab-backed runtime: callables are Rust closures, ids are slab indices.
pub struct CallableRegistry {
    fns: RefCell<Vec<NativeFn>>,
}

impl CallableRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            fns: RefCell::new(Vec::new()),
        }
    }

    /// Register a closure as a callable (alias for `create_function` that
    /// avoids boxing at the call site)
    pub fn register(
        &self,
        f: impl Fn(&[Value]) -> Result<Value, ScriptError> + 'static,
    ) -> CallableId {
        self.create_function(Rc::new(f))
    }

    /// Number of registered callables
    pub fn len(&self) -> usize {
        self.fns.borrow().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.fns.borrow().is_empty()
    }
}

impl ScriptRuntime for CallableRegistry {
    fn invoke(&self, callable: CallableId, args: &[Value]) -> Result<Vec<Value>, ScriptError> {
        // Clone the closure out before calling: callables re-enter the
        // registry (dispatchers invoking adapters invoking guest code).
        let f = self
            .fns
            .borrow()
            .get(callable.0 as usize)
            .cloned()
            .ok_or_else(|| ScriptError::new(format!("unknown callable #{}", callable.0)))?;
        Ok(vec![f(args)?])
    }

    fn is_callable(&self, value: &Value) -> bool {
        match value {
            Value::Callable(id) => (id.0 as usize) < self.fns.borrow().len(),
            _ => false,
        }
    }

    fn create_function(&self, f: NativeFn) -> CallableId {
        let mut fns = self.fns.borrow_mut();
        fns.push(f);
        CallableId((fns.len() - 1) as u64)
    }
}

impl Default for CallableRegistry {
    fn default() -> Self {
        Self::new()
    }
}
