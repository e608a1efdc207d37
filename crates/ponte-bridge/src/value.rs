//! Guest value model
//!
//! `Value` is the tagged union the bridge exchanges with the script
//! runtime. Primitives are inline; strings, arrays and maps are shared
//! handles; host objects and host types surface as wrappers; guest
//! functions are opaque callable ids owned by the runtime.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::wrapper::{InstanceWrapper, StaticWrapper};

/// Handle to a guest callable, owned by the script runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallableId(pub u64);

/// Shared guest array storage
pub type GuestArray = Rc<RefCell<Vec<Value>>>;

/// Shared guest map (table) storage
pub type GuestMap = Rc<RefCell<FxHashMap<String, Value>>>;

/// Guest value — the bridge's view of a script-runtime value.
#[derive(Debug, Clone)]
pub enum Value {
    /// Absence of a value; coerces to and from the host null
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit integer (the guest's single integral representation)
    Int(i64),
    /// 64-bit float (the guest's single floating representation)
    Float(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Array of values
    Array(GuestArray),
    /// Table of named values (dispatch tables; has no host representation)
    Map(GuestMap),
    /// Wrapped host object (instance surface)
    Opaque(Rc<InstanceWrapper>),
    /// Wrapped host type (static surface)
    Type(Rc<StaticWrapper>),
    /// Guest callable handle
    Callable(CallableId),
}

impl Value {
    /// Create a string value
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Create an array value
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    /// Create a map value
    pub fn map(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Value::Map(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    /// Check for null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Integer value, if this is an Int
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Float value, if this is a Float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Boolean value, if this is a Bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String contents, if this is a Str
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Array handle, if this is an Array
    pub fn as_array(&self) -> Option<&GuestArray> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Instance wrapper, if this is an Opaque
    pub fn as_opaque(&self) -> Option<&Rc<InstanceWrapper>> {
        match self {
            Value::Opaque(w) => Some(w),
            _ => None,
        }
    }

    /// Static wrapper, if this is a Type
    pub fn as_type(&self) -> Option<&Rc<StaticWrapper>> {
        match self {
            Value::Type(w) => Some(w),
            _ => None,
        }
    }

    /// Callable handle, if this is a Callable
    pub fn as_callable(&self) -> Option<CallableId> {
        match self {
            Value::Callable(id) => Some(*id),
            _ => None,
        }
    }

    /// Guest type tag for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Opaque(_) => "object",
            Value::Type(_) => "class",
            Value::Callable(_) => "function",
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

// Primitives and strings compare by value, arrays and maps element-wise,
// wrappers by the identity of what they wrap.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        use Value::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Int(a), Int(b)) => a == b,
            (Float(a), Float(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Array(a), Array(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            (Map(a), Map(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let a = a.borrow();
                let b = b.borrow();
                a.len() == b.len()
                    && a.iter().all(|(k, v)| b.get(k).map_or(false, |w| v == w))
            }
            (Opaque(a), Opaque(b)) => Rc::ptr_eq(a.object(), b.object()),
            (Type(a), Type(b)) => a.type_id() == b.type_id(),
            (Callable(a), Callable(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::str(s)
    }
}
