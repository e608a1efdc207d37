//! Host value model
//!
//! `HostValue` is the tagged union of everything the host side of the bridge
//! can hold: primitives are stored inline, strings/arrays/objects are
//! reference-counted handles. Objects are field-slot vectors tagged with
//! their type id, same shape as a class-instance record.

use std::cell::RefCell;
use std::rc::Rc;

/// Index of a type in the registry arena
pub type TypeId = usize;

/// A host object: dynamic type id plus field slots for the whole
/// inheritance chain (base fields first).
#[derive(Debug)]
pub struct HostObject {
    /// Dynamic type of this object
    pub type_id: TypeId,
    /// Field values, indexed by absolute slot
    pub fields: Vec<HostValue>,
}

/// Shared handle to a host object. The bridge borrows these; it never owns
/// the underlying object's lifecycle.
pub type ObjectRef = Rc<RefCell<HostObject>>;

/// A host array: element storage plus the component type used for
/// parameter matching.
#[derive(Debug, Clone)]
pub struct HostArray {
    /// Component type of the elements
    pub component: ParamType,
    /// Element storage
    pub items: Rc<RefCell<Vec<HostValue>>>,
}

impl HostArray {
    /// Create an array from a component type and elements
    pub fn new(component: ParamType, items: Vec<HostValue>) -> Self {
        Self {
            component,
            items: Rc::new(RefCell::new(items)),
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.items.borrow().len()
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.items.borrow().is_empty()
    }

    /// Clone out the element at `index`
    pub fn get(&self, index: usize) -> Option<HostValue> {
        self.items.borrow().get(index).cloned()
    }
}

/// Host value — tagged union of the host's runtime representations.
#[derive(Debug, Clone)]
pub enum HostValue {
    /// Absence of a value (the host's null reference)
    Null,
    /// Boolean
    Bool(bool),
    /// 8-bit signed integer
    I8(i8),
    /// 16-bit signed integer
    I16(i16),
    /// 32-bit signed integer
    I32(i32),
    /// 64-bit signed integer
    I64(i64),
    /// 32-bit float
    F32(f32),
    /// 64-bit float
    F64(f64),
    /// Immutable string
    Str(Rc<str>),
    /// Array with a component type
    Array(HostArray),
    /// Object reference
    Object(ObjectRef),
}

impl HostValue {
    /// Create a string value
    pub fn str(s: impl Into<Rc<str>>) -> Self {
        HostValue::Str(s.into())
    }

    /// Check if this is the null value
    pub fn is_null(&self) -> bool {
        matches!(self, HostValue::Null)
    }

    /// Integral value widened to i64, if this is an integral kind
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            HostValue::I8(v) => Some(*v as i64),
            HostValue::I16(v) => Some(*v as i64),
            HostValue::I32(v) => Some(*v as i64),
            HostValue::I64(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating value widened to f64, if this is a floating kind
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HostValue::F32(v) => Some(*v as f64),
            HostValue::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean value, if this is a bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// String contents, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HostValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Object handle, if this is an object
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            HostValue::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Array handle, if this is an array
    pub fn as_array(&self) -> Option<&HostArray> {
        match self {
            HostValue::Array(a) => Some(a),
            _ => None,
        }
    }

    /// Kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostValue::Null => "null",
            HostValue::Bool(_) => "bool",
            HostValue::I8(_) => "byte",
            HostValue::I16(_) => "short",
            HostValue::I32(_) => "int",
            HostValue::I64(_) => "long",
            HostValue::F32(_) => "float",
            HostValue::F64(_) => "double",
            HostValue::Str(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Object(_) => "object",
        }
    }
}

impl Default for HostValue {
    fn default() -> Self {
        HostValue::Null
    }
}

// Numeric equality is kind-insensitive: I8(5) == I64(5) and F32(1.5) ==
// F64(1.5). Objects compare by handle identity, arrays element-wise.
impl PartialEq for HostValue {
    fn eq(&self, other: &Self) -> bool {
        use HostValue::*;
        match (self, other) {
            (Null, Null) => true,
            (Bool(a), Bool(b)) => a == b,
            (Str(a), Str(b)) => a == b,
            (Object(a), Object(b)) => Rc::ptr_eq(a, b),
            (Array(a), Array(b)) => {
                let a = a.items.borrow();
                let b = b.items.borrow();
                a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x == y)
            }
            _ => match (self.as_i64(), other.as_i64()) {
                (Some(a), Some(b)) => a == b,
                _ => match (self.as_f64(), other.as_f64()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
            },
        }
    }
}

/// Parameter/field type — the matching algebra for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    /// Boolean
    Bool,
    /// 8-bit signed integer
    I8,
    /// 16-bit signed integer
    I16,
    /// 32-bit signed integer
    I32,
    /// 64-bit signed integer
    I64,
    /// 32-bit float
    F32,
    /// 64-bit float
    F64,
    /// String
    Str,
    /// Array of a component type
    Array(Box<ParamType>),
    /// Instance of a registered type (or any subtype)
    Object(TypeId),
    /// The reference root: matches any argument
    Any,
}

impl ParamType {
    /// Default value for a field slot of this type
    pub fn default_value(&self) -> HostValue {
        match self {
            ParamType::Bool => HostValue::Bool(false),
            ParamType::I8 => HostValue::I8(0),
            ParamType::I16 => HostValue::I16(0),
            ParamType::I32 => HostValue::I32(0),
            ParamType::I64 => HostValue::I64(0),
            ParamType::F32 => HostValue::F32(0.0),
            ParamType::F64 => HostValue::F64(0.0),
            // Reference kinds default to null
            _ => HostValue::Null,
        }
    }

    /// True for the primitive (non-reference) kinds
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            ParamType::Str | ParamType::Array(_) | ParamType::Object(_) | ParamType::Any
        )
    }

    /// Array convenience constructor
    pub fn array(component: ParamType) -> Self {
        ParamType::Array(Box::new(component))
    }
}
