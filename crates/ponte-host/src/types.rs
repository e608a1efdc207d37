//! Type descriptors and declaration builders
//!
//! Host types are declared up front through builder-style specs
//! (`TypeSpec`, `FieldSpec`, `MethodSpec`, `CtorSpec`) and resolved by the
//! registry into immutable `HostType` records. Method and constructor
//! bodies are Rust closures receiving the registry, so they can allocate
//! objects or call other members while executing.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::HostResult;
use crate::registry::TypeRegistry;
use crate::value::{HostValue, ObjectRef, ParamType, TypeId};

// ============================================================================
// Bodies and hooks
// ============================================================================

/// A method implementation. Receives the registry, the receiver (None for
/// static methods) and the already-matched argument values.
pub type MethodBody =
    Rc<dyn Fn(&TypeRegistry, Option<&ObjectRef>, &[HostValue]) -> HostResult<HostValue>>;

/// A constructor implementation. Receives the registry, the object's field
/// slots (absolute indexing, defaults pre-filled) and the argument values.
pub type CtorBody = Rc<dyn Fn(&TypeRegistry, &mut Vec<HostValue>, &[HostValue]) -> HostResult<()>>;

/// Identity of the method a hook invocation is standing in for.
#[derive(Debug, Clone)]
pub struct HookTarget {
    /// Method name
    pub name: String,
    /// Declared parameter types
    pub params: Vec<ParamType>,
    /// Declared return type (None for void)
    pub ret: Option<ParamType>,
}

/// Interception hook installed on a synthesized type: every overridable
/// method of the type routes its calls through this single closure.
pub type InterceptHook =
    Rc<dyn Fn(&TypeRegistry, &HookTarget, &ObjectRef, &[HostValue]) -> HostResult<HostValue>>;

// ============================================================================
// Declaration specs (builders)
// ============================================================================

/// Kind of a host type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Concrete or abstract class
    Class,
    /// Interface (abstract methods, optional default bodies, no fields)
    Interface,
}

/// Field declaration
pub struct FieldSpec {
    pub(crate) name: String,
    pub(crate) ty: ParamType,
    pub(crate) is_static: bool,
    pub(crate) is_final: bool,
    pub(crate) is_public: bool,
    pub(crate) init: Option<HostValue>,
}

impl FieldSpec {
    /// Declare a public instance field
    pub fn new(name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            name: name.into(),
            ty,
            is_static: false,
            is_final: false,
            is_public: true,
            init: None,
        }
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as final (immutable after initialization)
    pub fn as_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Mark as non-public (invisible to the bridge)
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Set the initial value (statics: the stored value; instance fields:
    /// the slot default used at allocation)
    pub fn init(mut self, value: HostValue) -> Self {
        self.init = Some(value);
        self
    }
}

/// Method declaration
pub struct MethodSpec {
    pub(crate) name: String,
    pub(crate) params: Vec<ParamType>,
    pub(crate) varargs: bool,
    pub(crate) ret: Option<ParamType>,
    pub(crate) is_static: bool,
    pub(crate) is_final: bool,
    pub(crate) is_abstract: bool,
    pub(crate) is_public: bool,
    pub(crate) body: Option<MethodBody>,
}

impl MethodSpec {
    /// Declare a public instance method with a body
    pub fn new(
        name: impl Into<String>,
        params: Vec<ParamType>,
        ret: Option<ParamType>,
        body: impl Fn(&TypeRegistry, Option<&ObjectRef>, &[HostValue]) -> HostResult<HostValue>
            + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            varargs: false,
            ret,
            is_static: false,
            is_final: false,
            is_abstract: false,
            is_public: true,
            body: Some(Rc::new(body)),
        }
    }

    /// Declare an abstract method (no body; interfaces and abstract classes)
    pub fn abstract_method(
        name: impl Into<String>,
        params: Vec<ParamType>,
        ret: Option<ParamType>,
    ) -> Self {
        Self {
            name: name.into(),
            params,
            varargs: false,
            ret,
            is_static: false,
            is_final: false,
            is_abstract: true,
            is_public: true,
            body: None,
        }
    }

    /// Mark the trailing parameter as variadic. The last declared parameter
    /// type must be an array; its component is the varargs component type.
    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as final (not overridable, never intercepted)
    pub fn as_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Mark as non-public (invisible to the bridge)
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }
}

/// Constructor declaration
pub struct CtorSpec {
    pub(crate) params: Vec<ParamType>,
    pub(crate) varargs: bool,
    pub(crate) is_public: bool,
    pub(crate) body: CtorBody,
}

impl CtorSpec {
    /// Declare a public constructor
    pub fn new(
        params: Vec<ParamType>,
        body: impl Fn(&TypeRegistry, &mut Vec<HostValue>, &[HostValue]) -> HostResult<()> + 'static,
    ) -> Self {
        Self {
            params,
            varargs: false,
            is_public: true,
            body: Rc::new(body),
        }
    }

    /// Mark the trailing parameter as variadic
    pub fn varargs(mut self) -> Self {
        self.varargs = true;
        self
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }
}

/// Complete declaration for a host type
pub struct TypeSpec {
    pub(crate) name: String,
    pub(crate) kind: TypeKind,
    pub(crate) is_final: bool,
    pub(crate) is_abstract: bool,
    pub(crate) parent: Option<TypeId>,
    pub(crate) interfaces: Vec<TypeId>,
    pub(crate) fields: Vec<FieldSpec>,
    pub(crate) methods: Vec<MethodSpec>,
    pub(crate) ctors: Vec<CtorSpec>,
}

impl TypeSpec {
    /// Declare a class
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            is_final: false,
            is_abstract: false,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            ctors: Vec::new(),
        }
    }

    /// Declare an interface
    pub fn interface(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Interface,
            is_final: false,
            is_abstract: true,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            ctors: Vec::new(),
        }
    }

    /// Mark the type as final (not extensible)
    pub fn sealed(mut self) -> Self {
        self.is_final = true;
        self
    }

    /// Mark the class as abstract (not instantiable)
    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Set the parent class
    pub fn extends(mut self, parent: TypeId) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Add an implemented interface
    pub fn implements(mut self, iface: TypeId) -> Self {
        self.interfaces.push(iface);
        self
    }

    /// Add a field
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Add a method (declaration order of same-named methods is preserved
    /// and observable through overload resolution)
    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// Add a constructor
    pub fn ctor(mut self, ctor: CtorSpec) -> Self {
        self.ctors.push(ctor);
        self
    }
}

// ============================================================================
// Resolved definitions
// ============================================================================

/// Resolved field definition
#[derive(Clone)]
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Field type
    pub ty: ParamType,
    /// Static flag
    pub is_static: bool,
    /// Final flag (immutable after initialization)
    pub is_final: bool,
    /// Visibility
    pub is_public: bool,
    /// Absolute slot: instance fields index the object's slot vector,
    /// static fields index the owning type's static storage
    pub slot: usize,
    /// Initial value (statics) / allocation default (instance)
    pub init: Option<HostValue>,
}

impl std::fmt::Debug for FieldDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDef")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("is_static", &self.is_static)
            .field("is_final", &self.is_final)
            .field("slot", &self.slot)
            .finish()
    }
}

/// Resolved method definition
#[derive(Clone)]
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Declared parameter types (for varargs, the last is the array type)
    pub params: Vec<ParamType>,
    /// Trailing-varargs flag
    pub varargs: bool,
    /// Declared return type (None for void)
    pub ret: Option<ParamType>,
    /// Static flag
    pub is_static: bool,
    /// Final flag (not overridable, never intercepted)
    pub is_final: bool,
    /// Abstract flag (no body)
    pub is_abstract: bool,
    /// Visibility
    pub is_public: bool,
    /// Implementation (None for abstract methods)
    pub body: Option<MethodBody>,
}

impl MethodDef {
    /// True when `other` declares the same signature (name + parameters) —
    /// the override relation used for deduplication and virtual dispatch.
    pub fn same_signature(&self, name: &str, params: &[ParamType]) -> bool {
        self.name == name && self.params == params
    }

    /// The hook-target view of this method
    pub fn hook_target(&self) -> HookTarget {
        HookTarget {
            name: self.name.clone(),
            params: self.params.clone(),
            ret: self.ret.clone(),
        }
    }
}

impl std::fmt::Debug for MethodDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MethodDef")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("varargs", &self.varargs)
            .field("is_static", &self.is_static)
            .field("is_final", &self.is_final)
            .field("is_abstract", &self.is_abstract)
            .finish()
    }
}

/// Resolved constructor definition
#[derive(Clone)]
pub struct CtorDef {
    /// Declared parameter types
    pub params: Vec<ParamType>,
    /// Trailing-varargs flag
    pub varargs: bool,
    /// Visibility
    pub is_public: bool,
    /// Implementation
    pub body: CtorBody,
}

impl std::fmt::Debug for CtorDef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CtorDef")
            .field("params", &self.params)
            .field("varargs", &self.varargs)
            .field("is_public", &self.is_public)
            .finish()
    }
}

/// Resolved host type. Immutable once registered (static field storage is
/// the only interior-mutable part).
pub struct HostType {
    /// Type id (index into the registry arena)
    pub id: TypeId,
    /// Fully qualified name
    pub name: String,
    /// Class or interface
    pub kind: TypeKind,
    /// Final flag (not extensible)
    pub is_final: bool,
    /// Abstract flag (not instantiable)
    pub is_abstract: bool,
    /// Parent class
    pub parent: Option<TypeId>,
    /// Implemented interfaces
    pub interfaces: Vec<TypeId>,
    /// Declared fields
    pub fields: Vec<FieldDef>,
    /// Declared methods, in declaration order
    pub methods: Vec<MethodDef>,
    /// Declared constructors, in declaration order
    pub ctors: Vec<CtorDef>,
    /// Static field storage
    pub statics: RefCell<Vec<HostValue>>,
    /// First absolute slot of this type's own instance fields
    pub field_base: usize,
    /// Total instance slots including inherited fields
    pub total_slots: usize,
}

impl HostType {
    /// True for interfaces
    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }
}

impl std::fmt::Debug for HostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostType")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("is_final", &self.is_final)
            .field("is_abstract", &self.is_abstract)
            .field("parent", &self.parent)
            .field("fields", &self.fields.len())
            .field("methods", &self.methods.len())
            .field("ctors", &self.ctors.len())
            .finish()
    }
}

// ============================================================================
// Member handles
// ============================================================================

/// Stable handle to a field: owning type + index into its field list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef {
    /// Owning type
    pub owner: TypeId,
    /// Index into the owner's `fields`
    pub index: usize,
}

/// Stable handle to a method: owning type + index into its method list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MethodRef {
    /// Owning type
    pub owner: TypeId,
    /// Index into the owner's `methods`
    pub index: usize,
}

/// Stable handle to a constructor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CtorRef {
    /// Owning type
    pub owner: TypeId,
    /// Index into the owner's `ctors`
    pub index: usize,
}
