//! Parameter descriptors, signatures and the `Callable` invocable.

use crate::args::CallArgs;
use crate::core::{next_token, Instance, TypeKey};
use crate::error::Result;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclaredType {
  /// An object or interface type. Required parameters of this kind are
  /// autowired by the container.
  Service(TypeKey),
  /// Plain data (numbers, strings, settings). Never autowired.
  Value(TypeKey),
}

impl DeclaredType {
  pub fn key(&self) -> TypeKey {
    match self {
      DeclaredType::Service(key) | DeclaredType::Value(key) => *key,
    }
  }

  pub fn is_service(&self) -> bool {
    matches!(self, DeclaredType::Service(_))
  }
}

/// Describes one parameter of a constructor, factory, initializer or method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
  pub position: usize,
  pub name: String,
  pub declared: Option<DeclaredType>,
  pub optional: bool,
}

/// An ordered parameter list plus an optional declared return type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
  parameters: Vec<ParameterDescriptor>,
  returns: Option<TypeKey>,
}

impl Signature {
  pub fn new() -> Self {
    Self::default()
  }

  fn push(mut self, name: &str, declared: Option<DeclaredType>, optional: bool) -> Self {
    let position = self.parameters.len();
    self.parameters.push(ParameterDescriptor {
      position,
      name: name.to_owned(),
      declared,
      optional,
    });
    self
  }

  /// A required parameter of an object or interface type.
  pub fn service<T: ?Sized + Any>(self, name: &str) -> Self {
    self.push(name, Some(DeclaredType::Service(TypeKey::of::<T>())), false)
  }

  /// An object or interface parameter that falls back to the callee's default.
  pub fn optional_service<T: ?Sized + Any>(self, name: &str) -> Self {
    self.push(name, Some(DeclaredType::Service(TypeKey::of::<T>())), true)
  }

  pub fn value<T: Any>(self, name: &str) -> Self {
    self.push(name, Some(DeclaredType::Value(TypeKey::of::<T>())), false)
  }

  pub fn optional_value<T: Any>(self, name: &str) -> Self {
    self.push(name, Some(DeclaredType::Value(TypeKey::of::<T>())), true)
  }

  /// A parameter without a declared type.
  pub fn untyped(self, name: &str) -> Self {
    self.push(name, None, false)
  }

  pub fn returns<T: ?Sized + Any>(mut self) -> Self {
    self.returns = Some(TypeKey::of::<T>());
    self
  }

  pub fn parameters(&self) -> &[ParameterDescriptor] {
    &self.parameters
  }

  pub fn return_type(&self) -> Option<TypeKey> {
    self.returns
  }
}

/// Identity token of a [`Callable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallableId(u64);

type Body = dyn Fn(&CallArgs<'_>) -> Result<Instance> + Send + Sync;

/// A shared closure together with the signature describing it.
///
/// Clones share identity. Two callables built separately never do, even when
/// they wrap the same function.
#[derive(Clone)]
pub struct Callable {
  id: CallableId,
  signature: Arc<Signature>,
  body: Arc<Body>,
}

impl Callable {
  /// Creates a callable whose body produces an [`Instance`] directly. The
  /// signature's return type is taken as given, including when it is absent.
  pub fn new(
    signature: Signature,
    body: impl Fn(&CallArgs<'_>) -> Result<Instance> + Send + Sync + 'static,
  ) -> Self {
    Self {
      id: CallableId(next_token()),
      signature: Arc::new(signature),
      body: Arc::new(body),
    }
  }

  /// Creates a callable returning `R`, recording `R` as its declared return type.
  pub fn returning<R: Any + Send + Sync>(
    signature: Signature,
    body: impl Fn(&CallArgs<'_>) -> Result<R> + Send + Sync + 'static,
  ) -> Self {
    Self::new(signature.returns::<R>(), move |args| body(args).map(Instance::new))
  }

  pub fn id(&self) -> CallableId {
    self.id
  }

  pub fn signature(&self) -> &Signature {
    &self.signature
  }

  pub fn return_type(&self) -> Option<TypeKey> {
    self.signature.returns
  }

  pub(crate) fn invoke(&self, args: &CallArgs<'_>) -> Result<Instance> {
    (self.body)(args)
  }
}

impl fmt::Debug for Callable {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Callable")
      .field("id", &self.id)
      .field("signature", &self.signature)
      .finish()
  }
}
