//! Ponte host model — explicit type registry standing in for platform
//! reflection.
//!
//! Rust has no runtime reflection, so the "host platform" side of the
//! bridge is an owned registry: types are declared up front with their
//! fields, methods (Rust closures) and constructors, and the registry
//! answers introspection queries, invokes members by handle, and
//! synthesizes new subtypes whose overridable methods route through an
//! interception hook.
//!
//! # Example
//!
//! ```ignore
//! use ponte_host::{TypeRegistry, TypeSpec, MethodSpec, ParamType, HostValue};
//!
//! let reg = TypeRegistry::new();
//! let greeter = reg.declare(
//!     TypeSpec::class("demo.Greeter").method(MethodSpec::new(
//!         "greet",
//!         vec![ParamType::Str],
//!         Some(ParamType::Str),
//!         |_, _, args| Ok(HostValue::str(format!("hello {}", args[0].as_str().unwrap()))),
//!     )),
//! )?;
//! ```

#![warn(missing_docs)]

mod error;
mod registry;
mod types;
mod value;

pub use error::{HostError, HostResult};
pub use registry::TypeRegistry;
pub use types::{
    CtorBody, CtorDef, CtorRef, CtorSpec, FieldDef, FieldRef, FieldSpec, HookTarget, HostType,
    InterceptHook, MethodBody, MethodDef, MethodRef, MethodSpec, TypeKind, TypeSpec,
};
pub use value::{HostArray, HostObject, HostValue, ObjectRef, ParamType, TypeId};
