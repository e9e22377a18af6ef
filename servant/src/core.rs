//! Core identity types shared by every part of the container.

use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// The identity of a type or an interface (`dyn Trait`).
///
/// Equality and hashing only consider the `TypeId`; the name is carried along
/// for error messages and logs.
#[derive(Clone, Copy)]
pub struct TypeKey {
  id: TypeId,
  name: &'static str,
}

impl TypeKey {
  /// Returns the key for `T`. Works for unsized types such as `dyn Trait`.
  pub fn of<T: ?Sized + Any>() -> Self {
    Self {
      id: TypeId::of::<T>(),
      name: std::any::type_name::<T>(),
    }
  }

  pub fn type_id(&self) -> TypeId {
    self.id
  }

  pub fn name(&self) -> &'static str {
    self.name
  }
}

impl PartialEq for TypeKey {
  fn eq(&self, other: &Self) -> bool {
    self.id == other.id
  }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
  fn hash<H: Hasher>(&self, state: &mut H) {
    self.id.hash(state);
  }
}

impl fmt::Debug for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "TypeKey({})", self.name)
  }
}

impl fmt::Display for TypeKey {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name)
  }
}

/// A type-erased, shared object produced or consumed by the container.
///
/// Cloning an `Instance` clones the handle, not the object, so clones compare
/// equal under [`Instance::ptr_eq`].
#[derive(Clone)]
pub struct Instance {
  ty: TypeKey,
  object: Arc<dyn Any + Send + Sync>,
}

impl Instance {
  /// Wraps a value. The instance's concrete type is `T`.
  pub fn new<T: Any + Send + Sync>(value: T) -> Self {
    Self::from_arc(Arc::new(value))
  }

  /// Wraps an already shared value without re-allocating it.
  pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
    Self {
      ty: TypeKey::of::<T>(),
      object: value,
    }
  }

  pub(crate) fn from_erased(ty: TypeKey, object: Arc<dyn Any + Send + Sync>) -> Self {
    Self { ty, object }
  }

  /// The instance's concrete type.
  pub fn type_key(&self) -> TypeKey {
    self.ty
  }

  /// Downcasts to the concrete type. Use the container's typed helpers or
  /// [`crate::CallArgs::service`] to view an instance through an interface.
  pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
    self.object.clone().downcast::<T>().ok()
  }

  pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
    self.object.downcast_ref::<T>()
  }

  /// Whether both handles refer to the very same object.
  pub fn ptr_eq(a: &Instance, b: &Instance) -> bool {
    Arc::ptr_eq(&a.object, &b.object)
  }

  pub(crate) fn object(&self) -> &Arc<dyn Any + Send + Sync> {
    &self.object
  }
}

impl fmt::Debug for Instance {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Instance({} @ {:p})", self.ty.name, Arc::as_ptr(&self.object))
  }
}

// Identity tokens for callables and recipes. Zero is never handed out.
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_token() -> u64 {
  NEXT_TOKEN.fetch_add(1, Ordering::Relaxed)
}
