//! Static and instance wrappers
//!
//! A `StaticWrapper` exposes a host type's class-level surface to the
//! guest, an `InstanceWrapper` one object's instance-level surface. Both
//! carry the same lazy member cache: name → resolved slot, filled on first
//! access and never invalidated (mutable fields cache the handle, not the
//! value, so external host-side writes stay observable).

use std::cell::RefCell;

use ponte_host::{FieldRef, ObjectRef, TypeId};
use rustc_hash::FxHashMap;

use crate::value::Value;

/// Resolution state of one member name.
///
/// Transitions are one-way: `Unresolved` (absent from the cache map) moves
/// to exactly one of these and stays there.
#[derive(Debug, Clone)]
pub(crate) enum MemberSlot {
    /// Immutable field — the value itself is cached permanently
    FieldConst(Value),
    /// Mutable field — the handle is cached, the value re-read per access
    Field(FieldRef),
    /// Method group — the cached dispatcher callable
    Methods(Value),
    /// No member of this name; resolves to `Null` forever
    Absent,
}

/// Class-level surface of a host type.
///
/// Exactly one instance exists per type per bridge (identity-keyed cache),
/// so guest-side identity comparisons on wrapped types are stable.
pub struct StaticWrapper {
    type_id: TypeId,
    pub(crate) members: RefCell<FxHashMap<String, MemberSlot>>,
}

impl StaticWrapper {
    pub(crate) fn new(type_id: TypeId) -> Self {
        Self {
            type_id,
            members: RefCell::new(FxHashMap::default()),
        }
    }

    /// The wrapped type's id
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }
}

impl std::fmt::Debug for StaticWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticWrapper")
            .field("type_id", &self.type_id)
            .field("cached_members", &self.members.borrow().len())
            .finish()
    }
}

/// Instance-level surface of one host object.
///
/// The backing object is shared, not owned — the bridge never controls its
/// lifecycle.
pub struct InstanceWrapper {
    object: ObjectRef,
    pub(crate) members: RefCell<FxHashMap<String, MemberSlot>>,
}

impl InstanceWrapper {
    /// Wrap a host object
    pub fn new(object: ObjectRef) -> Self {
        Self {
            object,
            members: RefCell::new(FxHashMap::default()),
        }
    }

    /// The backing host object
    pub fn object(&self) -> &ObjectRef {
        &self.object
    }

    /// Dynamic type of the backing object
    pub fn type_id(&self) -> TypeId {
        self.object.borrow().type_id
    }
}

impl std::fmt::Debug for InstanceWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceWrapper")
            .field("type_id", &self.type_id())
            .field("cached_members", &self.members.borrow().len())
            .finish()
    }
}
