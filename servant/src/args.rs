//! Explicit caller arguments and the marshaled argument list handed to callees.

use crate::callable::ParameterDescriptor;
use crate::core::{Instance, TypeKey};
use crate::error::{Error, Result};
use crate::reflect::{view, Compatibility};
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Turns any value into an [`Instance`]. An `Instance` passed in is kept as is
/// instead of being wrapped a second time.
pub(crate) fn into_instance<T: Any + Send + Sync>(value: T) -> Instance {
  let boxed: Box<dyn Any + Send + Sync> = Box::new(value);
  match boxed.downcast::<Instance>() {
    Ok(instance) => *instance,
    Err(other) => Instance::from_erased(TypeKey::of::<T>(), Arc::from(other)),
  }
}

/// Arguments supplied explicitly by the caller of `make`, `call` or
/// `call_method`, addressed by position and/or by parameter name.
///
/// A positional argument wins over a named one for the same parameter.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
  positional: BTreeMap<usize, Instance>,
  named: HashMap<String, Instance>,
}

impl Arguments {
  pub fn new() -> Self {
    Self::default()
  }

  /// Supplies the argument for the parameter at `position`.
  pub fn at<T: Any + Send + Sync>(mut self, position: usize, value: T) -> Self {
    self.positional.insert(position, into_instance(value));
    self
  }

  /// Supplies the argument for the parameter called `name`.
  pub fn named<T: Any + Send + Sync>(mut self, name: &str, value: T) -> Self {
    self.named.insert(name.to_owned(), into_instance(value));
    self
  }

  pub fn is_empty(&self) -> bool {
    self.positional.is_empty() && self.named.is_empty()
  }

  pub(crate) fn by_position(&self, position: usize) -> Option<&Instance> {
    self.positional.get(&position)
  }

  pub(crate) fn by_name(&self, name: &str) -> Option<&Instance> {
    self.named.get(name)
  }
}

/// The positional argument list a constructor, factory, initializer or method
/// receives once the container has marshaled its parameters.
///
/// An empty slot means nothing was supplied or autowired; the callee applies
/// its own default there.
pub struct CallArgs<'a> {
  slots: Vec<Option<Instance>>,
  parameters: &'a [ParameterDescriptor],
  casts: &'a dyn Compatibility,
}

impl<'a> CallArgs<'a> {
  pub fn new(
    slots: Vec<Option<Instance>>,
    parameters: &'a [ParameterDescriptor],
    casts: &'a dyn Compatibility,
  ) -> Self {
    Self {
      slots,
      parameters,
      casts,
    }
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// The raw instance at `position`, if one was supplied or autowired.
  pub fn instance(&self, position: usize) -> Option<&Instance> {
    self.slots.get(position).and_then(Option::as_ref)
  }

  /// The concrete value at `position`.
  pub fn arg<T: Any + Send + Sync>(&self, position: usize) -> Result<Arc<T>> {
    self
      .opt_arg(position)?
      .ok_or_else(|| self.missing(position))
  }

  /// The concrete value at `position`, or `None` when the slot is empty.
  ///
  /// A value supplied as an `Arc<T>` is handed back as that same `Arc`.
  pub fn opt_arg<T: Any + Send + Sync>(&self, position: usize) -> Result<Option<Arc<T>>> {
    match self.instance(position) {
      None => Ok(None),
      Some(instance) => instance
        .downcast::<T>()
        .or_else(|| instance.downcast_ref::<Arc<T>>().cloned())
        .map(Some)
        .ok_or_else(|| mismatch(position, TypeKey::of::<T>(), instance)),
    }
  }

  /// The value at `position` viewed through the interface (or class) `I`.
  pub fn service<I: ?Sized + Send + Sync + 'static>(&self, position: usize) -> Result<Arc<I>> {
    self
      .opt_service(position)?
      .ok_or_else(|| self.missing(position))
  }

  /// Like [`CallArgs::service`], but `None` when the slot is empty. A value
  /// supplied as an `Arc<I>`, e.g. one returned by `make_as`, is accepted as is.
  pub fn opt_service<I: ?Sized + Send + Sync + 'static>(
    &self,
    position: usize,
  ) -> Result<Option<Arc<I>>> {
    match self.instance(position) {
      None => Ok(None),
      Some(instance) => view::<I>(self.casts, instance)
        .or_else(|| instance.downcast_ref::<Arc<I>>().cloned())
        .map(Some)
        .ok_or_else(|| mismatch(position, TypeKey::of::<I>(), instance)),
    }
  }

  fn missing(&self, position: usize) -> Error {
    let name = self
      .parameters
      .get(position)
      .map(|p| p.name.clone())
      .unwrap_or_default();
    Error::MissingArgument { position, name }
  }
}

fn mismatch(position: usize, expected: TypeKey, found: &Instance) -> Error {
  Error::ArgumentType {
    position,
    expected: expected.name(),
    found: found.type_key().name(),
  }
}
