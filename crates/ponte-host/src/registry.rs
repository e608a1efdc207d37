//! Host type registry
//!
//! The registry is the explicit stand-in for platform reflection: host
//! types are declared up front (arena + index), and the registry answers
//! the introspection queries the bridge needs — member enumeration in
//! declaration order, subtype walks, invocation by handle — and provides
//! the dynamic type facility (`define_subtype`) plus per-type mirror
//! objects for class-level introspection from scripts.
//!
//! The registry is single-threaded shared state: interior mutability via
//! `RefCell`/`Cell`, no synchronization. Borrows are scoped so member
//! bodies can re-enter the registry while executing.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use rustc_hash::FxHashMap;

use crate::error::{HostError, HostResult};
use crate::types::{
    CtorDef, CtorRef, FieldDef, FieldRef, HostType, InterceptHook, MethodDef, MethodRef,
    MethodSpec, TypeKind, TypeSpec,
};
use crate::value::{HostObject, HostValue, ObjectRef, ParamType, TypeId};

/// Arena of host types with name lookup, introspection, invocation and
/// dynamic subtype creation.
pub struct TypeRegistry {
    types: RefCell<Vec<Rc<HostType>>>,
    by_name: RefCell<FxHashMap<String, TypeId>>,
    mirror_type: OnceCell<TypeId>,
    mirrors: RefCell<FxHashMap<TypeId, ObjectRef>>,
    synth_counter: Cell<usize>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            types: RefCell::new(Vec::new()),
            by_name: RefCell::new(FxHashMap::default()),
            mirror_type: OnceCell::new(),
            mirrors: RefCell::new(FxHashMap::default()),
            synth_counter: Cell::new(0),
        }
    }

    /// The id the next declared type will receive
    pub fn next_id(&self) -> TypeId {
        self.types.borrow().len()
    }

    /// Number of registered types
    pub fn len(&self) -> usize {
        self.types.borrow().len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.types.borrow().is_empty()
    }

    // ========================================================================
    // Declaration
    // ========================================================================

    /// Register a type from a declaration spec.
    ///
    /// Classes with no declared constructor get an implicit public no-arg
    /// constructor. Same-named methods keep their declaration order — that
    /// order is observable through overload resolution.
    pub fn declare(&self, spec: TypeSpec) -> HostResult<TypeId> {
        if self.by_name.borrow().contains_key(&spec.name) {
            return Err(HostError::DuplicateType(spec.name));
        }

        let parent = match spec.parent {
            Some(p) => {
                let parent_ty = self.get(p)?;
                if parent_ty.is_interface() {
                    return Err(HostError::TypeMismatch {
                        expected: "class parent".to_string(),
                        got: format!("interface {}", parent_ty.name),
                    });
                }
                if parent_ty.is_final {
                    return Err(HostError::FinalType {
                        type_name: parent_ty.name.clone(),
                    });
                }
                Some(parent_ty)
            }
            None => None,
        };
        for iface in &spec.interfaces {
            let ty = self.get(*iface)?;
            if !ty.is_interface() {
                return Err(HostError::TypeMismatch {
                    expected: "interface".to_string(),
                    got: format!("class {}", ty.name),
                });
            }
        }
        for m in &spec.methods {
            if m.varargs && !matches!(m.params.last(), Some(ParamType::Array(_))) {
                return Err(HostError::TypeMismatch {
                    expected: "array-typed trailing varargs parameter".to_string(),
                    got: format!("method '{}'", m.name),
                });
            }
        }
        for c in &spec.ctors {
            if c.varargs && !matches!(c.params.last(), Some(ParamType::Array(_))) {
                return Err(HostError::TypeMismatch {
                    expected: "array-typed trailing varargs parameter".to_string(),
                    got: "constructor".to_string(),
                });
            }
        }
        if spec.kind == TypeKind::Interface {
            if spec.fields.iter().any(|f| !f.is_static) {
                return Err(HostError::TypeMismatch {
                    expected: "static interface fields".to_string(),
                    got: "instance field".to_string(),
                });
            }
            if !spec.ctors.is_empty() {
                return Err(HostError::TypeMismatch {
                    expected: "no interface constructors".to_string(),
                    got: "constructor".to_string(),
                });
            }
        }

        let id = self.next_id();
        let field_base = parent.as_ref().map(|p| p.total_slots).unwrap_or(0);

        let mut fields = Vec::with_capacity(spec.fields.len());
        let mut statics = Vec::new();
        let mut instance_count = 0usize;
        for f in spec.fields {
            let slot = if f.is_static {
                statics.push(f.init.clone().unwrap_or_else(|| f.ty.default_value()));
                statics.len() - 1
            } else {
                instance_count += 1;
                field_base + instance_count - 1
            };
            fields.push(FieldDef {
                name: f.name,
                ty: f.ty,
                is_static: f.is_static,
                is_final: f.is_final,
                is_public: f.is_public,
                slot,
                init: f.init,
            });
        }

        let methods = spec
            .methods
            .into_iter()
            .map(|m| MethodDef {
                name: m.name,
                params: m.params,
                varargs: m.varargs,
                ret: m.ret,
                is_static: m.is_static,
                is_final: m.is_final,
                is_abstract: m.is_abstract,
                is_public: m.is_public,
                body: m.body,
            })
            .collect();

        let mut ctors: Vec<CtorDef> = spec
            .ctors
            .into_iter()
            .map(|c| CtorDef {
                params: c.params,
                varargs: c.varargs,
                is_public: c.is_public,
                body: c.body,
            })
            .collect();
        if spec.kind == TypeKind::Class && ctors.is_empty() {
            // Implicit default constructor: slots keep their defaults.
            ctors.push(CtorDef {
                params: Vec::new(),
                varargs: false,
                is_public: true,
                body: Rc::new(|_, _, _| Ok(())),
            });
        }

        let ty = HostType {
            id,
            name: spec.name.clone(),
            kind: spec.kind,
            is_final: spec.is_final,
            is_abstract: spec.is_abstract,
            parent: parent.map(|p| p.id),
            interfaces: spec.interfaces,
            fields,
            methods,
            ctors,
            statics: RefCell::new(statics),
            field_base,
            total_slots: field_base + instance_count,
        };
        self.types.borrow_mut().push(Rc::new(ty));
        self.by_name.borrow_mut().insert(spec.name, id);
        Ok(id)
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Get a type by id
    pub fn get(&self, id: TypeId) -> HostResult<Rc<HostType>> {
        self.types
            .borrow()
            .get(id)
            .cloned()
            .ok_or_else(|| HostError::UnknownType(format!("#{id}")))
    }

    /// Find a type id by name
    pub fn find(&self, name: &str) -> Option<TypeId> {
        self.by_name.borrow().get(name).copied()
    }

    /// Fully qualified name of a type (placeholder for unknown ids)
    pub fn type_name(&self, id: TypeId) -> String {
        self.types
            .borrow()
            .get(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("<unknown #{id}>"))
    }

    /// Check whether `sub` is `sup` or a subtype of it (class chain plus
    /// implemented interfaces, transitively).
    pub fn is_subtype(&self, sub: TypeId, sup: TypeId) -> bool {
        if sub == sup {
            return true;
        }
        let Ok(ty) = self.get(sub) else {
            return false;
        };
        if let Some(parent) = ty.parent {
            if self.is_subtype(parent, sup) {
                return true;
            }
        }
        ty.interfaces.iter().any(|i| self.is_subtype(*i, sup))
    }

    /// Member-resolution order: the type itself, its class chain, then
    /// implemented interfaces depth-first; first occurrence wins.
    pub fn linearize(&self, ty: TypeId) -> Vec<TypeId> {
        let mut out = Vec::new();
        self.linearize_into(ty, &mut out);
        out
    }

    fn linearize_into(&self, ty: TypeId, out: &mut Vec<TypeId>) {
        if out.contains(&ty) {
            return;
        }
        out.push(ty);
        let Ok(t) = self.get(ty) else { return };
        if let Some(parent) = t.parent {
            self.linearize_into(parent, out);
        }
        for iface in &t.interfaces {
            self.linearize_into(*iface, out);
        }
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Clone out a field definition
    pub fn field(&self, f: FieldRef) -> HostResult<FieldDef> {
        let ty = self.get(f.owner)?;
        ty.fields.get(f.index).cloned().ok_or_else(|| {
            HostError::UnknownMember {
                type_name: ty.name.clone(),
                member: format!("field #{}", f.index),
            }
        })
    }

    /// Clone out a method definition
    pub fn method(&self, m: MethodRef) -> HostResult<MethodDef> {
        let ty = self.get(m.owner)?;
        ty.methods.get(m.index).cloned().ok_or_else(|| {
            HostError::UnknownMember {
                type_name: ty.name.clone(),
                member: format!("method #{}", m.index),
            }
        })
    }

    /// Clone out a constructor definition
    pub fn ctor(&self, c: CtorRef) -> HostResult<CtorDef> {
        let ty = self.get(c.owner)?;
        ty.ctors.get(c.index).cloned().ok_or_else(|| {
            HostError::UnknownMember {
                type_name: ty.name.clone(),
                member: format!("constructor #{}", c.index),
            }
        })
    }

    /// Resolve a public field by name, walking the member-resolution order.
    pub fn resolve_field(&self, ty: TypeId, name: &str, want_static: bool) -> Option<FieldRef> {
        for owner in self.linearize(ty) {
            let Ok(t) = self.get(owner) else { continue };
            for (index, f) in t.fields.iter().enumerate() {
                if f.name == name && f.is_public && f.is_static == want_static {
                    return Some(FieldRef { owner, index });
                }
            }
        }
        None
    }

    /// All public methods with the given name and staticness, walking the
    /// member-resolution order. Declaration order is preserved; overrides
    /// (same signature further down the order) are deduplicated, keeping
    /// the most-derived occurrence.
    pub fn methods_named(&self, ty: TypeId, name: &str, want_static: bool) -> Vec<MethodRef> {
        let mut out: Vec<MethodRef> = Vec::new();
        let mut seen: Vec<(String, Vec<ParamType>)> = Vec::new();
        for owner in self.linearize(ty) {
            let Ok(t) = self.get(owner) else { continue };
            for (index, m) in t.methods.iter().enumerate() {
                if m.name != name || !m.is_public || m.is_static != want_static {
                    continue;
                }
                if seen.iter().any(|(n, p)| m.same_signature(n, p)) {
                    continue;
                }
                seen.push((m.name.clone(), m.params.clone()));
                out.push(MethodRef { owner, index });
            }
        }
        out
    }

    /// Public constructors of a type, in declaration order.
    pub fn constructors(&self, ty: TypeId) -> Vec<CtorRef> {
        let Ok(t) = self.get(ty) else {
            return Vec::new();
        };
        t.ctors
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_public)
            .map(|(index, _)| CtorRef { owner: ty, index })
            .collect()
    }

    /// The single abstract method of an interface, if it has exactly one
    /// (the functional-interface shape).
    pub fn sam_method(&self, iface: TypeId) -> Option<MethodRef> {
        let ty = self.get(iface).ok()?;
        if !ty.is_interface() {
            return None;
        }
        let mut sam = None;
        let mut seen: Vec<(String, Vec<ParamType>)> = Vec::new();
        for owner in self.linearize(iface) {
            let Ok(t) = self.get(owner) else { continue };
            for (index, m) in t.methods.iter().enumerate() {
                if m.is_static || !m.is_public {
                    continue;
                }
                if seen.iter().any(|(n, p)| m.same_signature(n, p)) {
                    continue;
                }
                seen.push((m.name.clone(), m.params.clone()));
                if m.is_abstract {
                    if sam.is_some() {
                        return None;
                    }
                    sam = Some(MethodRef { owner, index });
                }
            }
        }
        sam
    }

    // ========================================================================
    // Invocation
    // ========================================================================

    /// Invoke a method by handle. Instance methods re-dispatch on the
    /// receiver's dynamic type unless declared final, so overrides on
    /// synthesized subtypes are honored even when the handle was resolved
    /// from a base type or interface.
    pub fn invoke(
        &self,
        m: MethodRef,
        receiver: Option<&HostValue>,
        args: &[HostValue],
    ) -> HostResult<HostValue> {
        let def = self.method(m)?;
        if def.is_static {
            let body = def.body.as_ref().ok_or_else(|| HostError::Unimplemented {
                method: def.name.clone(),
            })?;
            return body(self, None, args);
        }

        let recv = receiver
            .and_then(|r| r.as_object())
            .ok_or_else(|| HostError::MissingReceiver {
                member: def.name.clone(),
            })?;
        let target = if def.is_final {
            def
        } else {
            let dynamic_ty = recv.borrow().type_id;
            self.select_override(dynamic_ty, &def.name, &def.params)
                .unwrap_or(def)
        };
        let body = target.body.as_ref().ok_or_else(|| HostError::Unimplemented {
            method: target.name.clone(),
        })?;
        body(self, Some(recv), args)
    }

    /// Most-derived declaration with the given signature, starting at the
    /// receiver's dynamic type.
    fn select_override(&self, ty: TypeId, name: &str, params: &[ParamType]) -> Option<MethodDef> {
        for owner in self.linearize(ty) {
            let Ok(t) = self.get(owner) else { continue };
            for m in &t.methods {
                if !m.is_static && m.is_public && m.same_signature(name, params) {
                    return Some(m.clone());
                }
            }
        }
        None
    }

    /// Invoke the inherited implementation of a signature, starting the
    /// search at `from` and skipping virtual re-dispatch. Used by
    /// interception hooks to fall back to the superclass body.
    pub fn call_inherited(
        &self,
        from: TypeId,
        name: &str,
        params: &[ParamType],
        receiver: &ObjectRef,
        args: &[HostValue],
    ) -> HostResult<HostValue> {
        for owner in self.linearize(from) {
            let Ok(t) = self.get(owner) else { continue };
            for m in &t.methods {
                if !m.is_static && m.is_public && m.same_signature(name, params) {
                    if let Some(body) = &m.body {
                        let body = body.clone();
                        return body(self, Some(receiver), args);
                    }
                }
            }
        }
        Err(HostError::Unimplemented {
            method: name.to_string(),
        })
    }

    /// Run a constructor, producing a fresh object of the handle's owner
    /// type with default-initialized field slots.
    pub fn construct(&self, c: CtorRef, args: &[HostValue]) -> HostResult<ObjectRef> {
        let def = self.ctor(c)?;
        let mut slots = self.default_slots(c.owner)?;
        let body = def.body.clone();
        body(self, &mut slots, args)?;
        Ok(Rc::new(RefCell::new(HostObject {
            type_id: c.owner,
            fields: slots,
        })))
    }

    /// Instantiate through the first public no-arg-callable constructor.
    pub fn instantiate(&self, ty: TypeId) -> HostResult<ObjectRef> {
        let t = self.get(ty)?;
        if t.is_interface() || t.is_abstract {
            return Err(HostError::NoAccessibleConstructor {
                type_name: t.name.clone(),
            });
        }
        for c in self.constructors(ty) {
            let def = self.ctor(c)?;
            let callable_with_no_args =
                def.params.is_empty() || (def.varargs && def.params.len() == 1);
            if callable_with_no_args {
                let args: Vec<HostValue> = if def.varargs {
                    let component = match &def.params[0] {
                        ParamType::Array(c) => (**c).clone(),
                        other => other.clone(),
                    };
                    vec![HostValue::Array(crate::value::HostArray::new(
                        component,
                        Vec::new(),
                    ))]
                } else {
                    Vec::new()
                };
                return self.construct(c, &args);
            }
        }
        Err(HostError::NoAccessibleConstructor {
            type_name: t.name.clone(),
        })
    }

    /// Field slots for a fresh instance: the whole chain's instance fields
    /// at their absolute slots, initialized to declared defaults.
    fn default_slots(&self, ty: TypeId) -> HostResult<Vec<HostValue>> {
        let t = self.get(ty)?;
        let mut slots = vec![HostValue::Null; t.total_slots];
        let mut current = Some(ty);
        while let Some(id) = current {
            let ct = self.get(id)?;
            for f in &ct.fields {
                if !f.is_static {
                    slots[f.slot] = f.init.clone().unwrap_or_else(|| f.ty.default_value());
                }
            }
            current = ct.parent;
        }
        Ok(slots)
    }

    /// Read a field through its handle
    pub fn read_field(&self, f: FieldRef, receiver: Option<&ObjectRef>) -> HostResult<HostValue> {
        let def = self.field(f)?;
        if def.is_static {
            let ty = self.get(f.owner)?;
            let statics = ty.statics.borrow();
            Ok(statics.get(def.slot).cloned().unwrap_or(HostValue::Null))
        } else {
            let recv = receiver.ok_or_else(|| HostError::MissingReceiver {
                member: def.name.clone(),
            })?;
            let obj = recv.borrow();
            Ok(obj.fields.get(def.slot).cloned().unwrap_or(HostValue::Null))
        }
    }

    /// Write a field through its handle. Final fields reject the write.
    pub fn write_field(
        &self,
        f: FieldRef,
        receiver: Option<&ObjectRef>,
        value: HostValue,
    ) -> HostResult<()> {
        let def = self.field(f)?;
        if def.is_final {
            return Err(HostError::ImmutableField {
                type_name: self.type_name(f.owner),
                field: def.name.clone(),
            });
        }
        if def.is_static {
            let ty = self.get(f.owner)?;
            let mut statics = ty.statics.borrow_mut();
            if def.slot < statics.len() {
                statics[def.slot] = value;
            }
            Ok(())
        } else {
            let recv = receiver.ok_or_else(|| HostError::MissingReceiver {
                member: def.name.clone(),
            })?;
            let mut obj = recv.borrow_mut();
            if def.slot < obj.fields.len() {
                obj.fields[def.slot] = value;
            }
            Ok(())
        }
    }

    // ========================================================================
    // Dynamic subtype facility
    // ========================================================================

    /// Create a new type extending `base` (class) or implementing it
    /// (interface), routing every overridable method through `hook`.
    ///
    /// Every call produces a distinct type. Final methods are left
    /// untouched; only public non-final instance methods are intercepted.
    /// Class bases contribute delegating constructors for each public
    /// constructor; interface bases (and classes without an accessible
    /// constructor) get a no-op no-arg constructor.
    pub fn define_subtype(
        &self,
        base: TypeId,
        hook: InterceptHook,
        name_hint: Option<&str>,
    ) -> HostResult<TypeId> {
        let base_ty = self.get(base)?;
        if base_ty.is_final {
            return Err(HostError::FinalType {
                type_name: base_ty.name.clone(),
            });
        }

        let n = self.synth_counter.get() + 1;
        self.synth_counter.set(n);
        let name = match name_hint {
            Some(hint) => format!("{}${}", hint, n),
            None => format!("{}${}", base_ty.name, n),
        };

        let id = self.next_id();
        let (parent, interfaces) = if base_ty.is_interface() {
            (None, vec![base])
        } else {
            (Some(base), Vec::new())
        };

        // One override per inherited overridable signature, all routed
        // through the hook.
        let mut methods = Vec::new();
        let mut seen: Vec<(String, Vec<ParamType>)> = Vec::new();
        for owner in self.linearize(base) {
            let t = self.get(owner)?;
            for m in &t.methods {
                if m.is_static || !m.is_public || m.is_final {
                    continue;
                }
                if seen.iter().any(|(nm, p)| m.same_signature(nm, p)) {
                    continue;
                }
                seen.push((m.name.clone(), m.params.clone()));
                let hook = hook.clone();
                let target = m.hook_target();
                methods.push(MethodDef {
                    name: m.name.clone(),
                    params: m.params.clone(),
                    varargs: m.varargs,
                    ret: m.ret.clone(),
                    is_static: false,
                    is_final: false,
                    is_abstract: false,
                    is_public: true,
                    body: Some(Rc::new(move |reg, recv, args| {
                        let recv = recv.ok_or_else(|| HostError::MissingReceiver {
                            member: target.name.clone(),
                        })?;
                        hook(reg, &target, recv, args)
                    })),
                });
            }
        }

        let mut ctors = Vec::new();
        if !base_ty.is_interface() {
            for c in self.constructors(base) {
                let def = self.ctor(c)?;
                let base_body = def.body.clone();
                ctors.push(CtorDef {
                    params: def.params.clone(),
                    varargs: def.varargs,
                    is_public: true,
                    body: Rc::new(move |reg, slots, args| base_body(reg, slots, args)),
                });
            }
        }
        if ctors.is_empty() {
            ctors.push(CtorDef {
                params: Vec::new(),
                varargs: false,
                is_public: true,
                body: Rc::new(|_, _, _| Ok(())),
            });
        }

        let ty = HostType {
            id,
            name: name.clone(),
            kind: TypeKind::Class,
            is_final: false,
            is_abstract: false,
            parent,
            interfaces,
            fields: Vec::new(),
            methods,
            ctors,
            statics: RefCell::new(Vec::new()),
            field_base: base_ty.total_slots,
            total_slots: base_ty.total_slots,
        };
        self.types.borrow_mut().push(Rc::new(ty));
        self.by_name.borrow_mut().insert(name, id);
        Ok(id)
    }

    // ========================================================================
    // Type mirrors
    // ========================================================================

    /// The builtin mirror type (`ponte.Type`), bootstrapped lazily.
    pub fn mirror_type_id(&self) -> HostResult<TypeId> {
        self.mirror_type.get_or_try_init(|| {
            let expected = self.next_id();
            let spec = TypeSpec::class("ponte.Type")
                .sealed()
                .field(
                    crate::types::FieldSpec::new("id", ParamType::I64)
                        .as_final()
                        .non_public(),
                )
                .method(MethodSpec::new("name", vec![], Some(ParamType::Str), {
                    |reg, recv, _| {
                        let target = mirror_target(recv)?;
                        Ok(HostValue::str(reg.type_name(target)))
                    }
                }))
                .method(MethodSpec::new(
                    "isInterface",
                    vec![],
                    Some(ParamType::Bool),
                    |reg, recv, _| {
                        let target = mirror_target(recv)?;
                        Ok(HostValue::Bool(reg.get(target)?.is_interface()))
                    },
                ))
                .method(MethodSpec::new(
                    "isFinal",
                    vec![],
                    Some(ParamType::Bool),
                    |reg, recv, _| {
                        let target = mirror_target(recv)?;
                        Ok(HostValue::Bool(reg.get(target)?.is_final))
                    },
                ))
                .method(MethodSpec::new(
                    "superclass",
                    vec![],
                    Some(ParamType::Object(expected)),
                    |reg, recv, _| {
                        let target = mirror_target(recv)?;
                        match reg.get(target)?.parent {
                            Some(parent) => Ok(HostValue::Object(reg.mirror(parent)?)),
                            None => Ok(HostValue::Null),
                        }
                    },
                ));
            self.declare(spec)
        }).copied()
    }

    /// The mirror object for a type — one per type, cached.
    pub fn mirror(&self, ty: TypeId) -> HostResult<ObjectRef> {
        // Resolve the target before taking the cache borrow; the first call
        // may bootstrap the mirror type, which re-enters the registry.
        self.get(ty)?;
        let mirror_ty = self.mirror_type_id()?;
        if let Some(obj) = self.mirrors.borrow().get(&ty) {
            return Ok(obj.clone());
        }
        let obj = Rc::new(RefCell::new(HostObject {
            type_id: mirror_ty,
            fields: vec![HostValue::I64(ty as i64)],
        }));
        self.mirrors.borrow_mut().insert(ty, obj.clone());
        Ok(obj)
    }

    // ========================================================================
    // Signature rendering (diagnostics)
    // ========================================================================

    /// Human-readable name of a parameter type
    pub fn render_param(&self, ty: &ParamType) -> String {
        match ty {
            ParamType::Bool => "bool".to_string(),
            ParamType::I8 => "byte".to_string(),
            ParamType::I16 => "short".to_string(),
            ParamType::I32 => "int".to_string(),
            ParamType::I64 => "long".to_string(),
            ParamType::F32 => "float".to_string(),
            ParamType::F64 => "double".to_string(),
            ParamType::Str => "string".to_string(),
            ParamType::Array(c) => format!("{}[]", self.render_param(c)),
            ParamType::Object(id) => self.type_name(*id),
            ParamType::Any => "any".to_string(),
        }
    }

    fn render_params(&self, params: &[ParamType], varargs: bool) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(params.len());
        for (i, p) in params.iter().enumerate() {
            if varargs && i == params.len() - 1 {
                let component = match p {
                    ParamType::Array(c) => self.render_param(c),
                    other => self.render_param(other),
                };
                parts.push(format!("{}...", component));
            } else {
                parts.push(self.render_param(p));
            }
        }
        parts.join(", ")
    }

    /// Fully qualified textual signature of a method
    pub fn method_signature(&self, m: MethodRef) -> String {
        match self.method(m) {
            Ok(def) => format!(
                "{}.{}({})",
                self.type_name(m.owner),
                def.name,
                self.render_params(&def.params, def.varargs)
            ),
            Err(_) => format!("{}.<unknown>", self.type_name(m.owner)),
        }
    }

    /// Fully qualified textual signature of a constructor
    pub fn ctor_signature(&self, c: CtorRef) -> String {
        match self.ctor(c) {
            Ok(def) => format!(
                "{}({})",
                self.type_name(c.owner),
                self.render_params(&def.params, def.varargs)
            ),
            Err(_) => format!("{}(<unknown>)", self.type_name(c.owner)),
        }
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn mirror_target(recv: Option<&ObjectRef>) -> HostResult<TypeId> {
    let recv = recv.ok_or_else(|| HostError::MissingReceiver {
        member: "mirror".to_string(),
    })?;
    let obj = recv.borrow();
    obj.fields
        .first()
        .and_then(|f| f.as_i64())
        .map(|id| id as TypeId)
        .ok_or_else(|| HostError::Raised("corrupt type mirror".to_string()))
}
