//! The reflective capabilities the container consumes.
//!
//! Rust has no runtime reflection, so everything the container needs to know
//! about a type goes through these three traits. [`crate::TypeCatalog`] is the
//! implementation shipped with the crate.

use crate::args::CallArgs;
use crate::callable::{Callable, ParameterDescriptor};
use crate::core::{Instance, TypeKey};
use crate::error::Result;
use std::any::Any;
use std::sync::Arc;

/// Enumerates the parameters of callables, constructors and methods.
pub trait Introspector: Send + Sync {
  fn describe_callable(&self, callable: &Callable) -> Vec<ParameterDescriptor>;

  /// `Ok(None)` when the type has no explicit constructor.
  fn describe_constructor(&self, ty: &TypeKey) -> Result<Option<Vec<ParameterDescriptor>>>;

  fn describe_method(&self, ty: &TypeKey, method: &str) -> Result<Vec<ParameterDescriptor>>;
}

/// Creates instances and invokes methods on them.
pub trait Construction: Send + Sync {
  fn is_instantiable(&self, ty: &TypeKey) -> bool;

  fn construct(&self, ty: &TypeKey, args: &CallArgs<'_>) -> Result<Instance>;

  fn invoke_method(&self, receiver: &Instance, method: &str, args: &CallArgs<'_>)
    -> Result<Instance>;
}

/// Answers assignability questions and performs the matching up-casts.
pub trait Compatibility: Send + Sync {
  /// Whether a `ty` can be used wherever a `target` is expected.
  fn is_compatible(&self, ty: &TypeKey, target: &TypeKey) -> bool;

  /// Views `instance` as `target`. The returned box holds an `Arc<Target>`.
  fn cast(&self, instance: &Instance, target: &TypeKey) -> Option<Box<dyn Any + Send + Sync>>;
}

/// All three capabilities together, as held by a container.
pub trait Reflection: Introspector + Construction + Compatibility {
  fn as_compatibility(&self) -> &dyn Compatibility;
}

impl<R: Introspector + Construction + Compatibility> Reflection for R {
  fn as_compatibility(&self) -> &dyn Compatibility {
    self
  }
}

/// Views an instance through `I` using the given compatibility capability.
pub(crate) fn view<I: ?Sized + Send + Sync + 'static>(
  casts: &dyn Compatibility,
  instance: &Instance,
) -> Option<Arc<I>> {
  casts
    .cast(instance, &TypeKey::of::<I>())
    .and_then(|boxed| boxed.downcast::<Arc<I>>().ok())
    .map(|arc| *arc)
}
