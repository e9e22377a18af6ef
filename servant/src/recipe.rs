//! Service recipes: how to produce an instance for one interface.

use crate::callable::Callable;
use crate::core::{next_token, TypeKey};
use crate::error::{Error, Result};
use crate::introspection::IntrospectionCache;
use crate::reflect::Reflection;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// Identity token of a [`Recipe`]; singleton instances are cached under it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecipeId(u64);

struct RecipeState {
  concrete: TypeKey,
  factory: Option<Callable>,
  initializer: Option<Callable>,
  singleton: bool,
}

/// A snapshot of a recipe taken when a build starts, so no lock is held
/// while constructors run.
#[derive(Clone)]
pub(crate) struct Plan {
  pub(crate) concrete: TypeKey,
  pub(crate) factory: Option<Callable>,
  pub(crate) initializer: Option<Callable>,
  pub(crate) singleton: bool,
}

struct RecipeInner {
  id: RecipeId,
  interface: TypeKey,
  state: RwLock<RecipeState>,
  reflection: Arc<dyn Reflection>,
  introspection: Arc<IntrospectionCache>,
}

/// Describes how the container produces an object for a service interface:
/// a concrete type or a factory, an optional initializer, and whether the
/// result is cached as a singleton.
///
/// `Recipe` is a shared handle. The copy returned by `compose`/`wire` and the
/// one stored in the container are the same recipe, so configuring either
/// affects later resolutions.
///
/// The concrete type and the factory's return type are checked against the
/// interface when they are assigned; a rejected assignment leaves the recipe
/// untouched.
#[derive(Clone)]
pub struct Recipe {
  inner: Arc<RecipeInner>,
}

impl Recipe {
  pub(crate) fn new(
    interface: TypeKey,
    reflection: Arc<dyn Reflection>,
    introspection: Arc<IntrospectionCache>,
  ) -> Self {
    Self {
      inner: Arc::new(RecipeInner {
        id: RecipeId(next_token()),
        interface,
        state: RwLock::new(RecipeState {
          concrete: interface,
          factory: None,
          initializer: None,
          singleton: false,
        }),
        reflection,
        introspection,
      }),
    }
  }

  pub fn id(&self) -> RecipeId {
    self.inner.id
  }

  pub fn interface(&self) -> TypeKey {
    self.inner.interface
  }

  /// The type that will be instantiated. Defaults to the interface itself.
  pub fn concrete(&self) -> TypeKey {
    self.inner.state.read().concrete
  }

  pub fn factory(&self) -> Option<Callable> {
    self.inner.state.read().factory.clone()
  }

  pub fn has_factory(&self) -> bool {
    self.inner.state.read().factory.is_some()
  }

  pub fn initializer(&self) -> Option<Callable> {
    self.inner.state.read().initializer.clone()
  }

  pub fn has_initializer(&self) -> bool {
    self.inner.state.read().initializer.is_some()
  }

  pub fn is_singleton(&self) -> bool {
    self.inner.state.read().singleton
  }

  pub fn with_concrete(&self, ty: TypeKey) -> Result<&Self> {
    self.ensure_compatible(ty)?;
    self.inner.state.write().concrete = ty;
    Ok(self)
  }

  /// Builds instances through `factory` instead of a constructor.
  ///
  /// The return type comes from the factory's [`crate::Signature`], which is
  /// fixed when the callable is created; it becomes the recipe's concrete
  /// type. Parameters are still described through the introspector when the
  /// factory runs.
  pub fn with_factory(&self, factory: Callable) -> Result<&Self> {
    let returns = factory.return_type().ok_or(Error::IncompatibleType {
      given: "<undeclared return type>",
      interface: self.inner.interface.name(),
    })?;
    self.ensure_compatible(returns)?;

    let mut state = self.inner.state.write();
    state.factory = Some(factory);
    state.concrete = returns;
    Ok(self)
  }

  /// Runs `initializer` after every construction. The new object is passed at
  /// position 0; the remaining parameters are autowired.
  pub fn with_initializer(&self, initializer: Callable) -> Result<&Self> {
    let interface = self.inner.interface;
    let parameters = self.inner.introspection.describe_callable(&initializer);

    let first = parameters.first().ok_or_else(|| Error::InvalidInitializer {
      interface: interface.name(),
      reason: "it must declare at least one parameter receiving the service".to_string(),
    })?;
    let declared = first.declared.ok_or_else(|| Error::InvalidInitializer {
      interface: interface.name(),
      reason: format!("its first parameter `{}` has no declared type", first.name),
    })?;
    if !self.inner.reflection.is_compatible(&declared.key(), &interface) {
      return Err(Error::InvalidInitializer {
        interface: interface.name(),
        reason: format!(
          "its first parameter `{}` is a `{}`, which is not compatible",
          first.name,
          declared.key().name()
        ),
      });
    }

    self.inner.state.write().initializer = Some(initializer);
    Ok(self)
  }

  pub fn singleton(&self, flag: bool) -> &Self {
    self.inner.state.write().singleton = flag;
    self
  }

  pub(crate) fn plan(&self) -> Plan {
    let state = self.inner.state.read();
    Plan {
      concrete: state.concrete,
      factory: state.factory.clone(),
      initializer: state.initializer.clone(),
      singleton: state.singleton,
    }
  }

  fn ensure_compatible(&self, ty: TypeKey) -> Result<()> {
    let interface = self.inner.interface;
    if self.inner.reflection.is_compatible(&ty, &interface) {
      Ok(())
    } else {
      Err(Error::IncompatibleType {
        given: ty.name(),
        interface: interface.name(),
      })
    }
  }
}

impl fmt::Debug for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let state = self.inner.state.read();
    f.debug_struct("Recipe")
      .field("id", &self.inner.id)
      .field("interface", &self.inner.interface)
      .field("concrete", &state.concrete)
      .field("factory", &state.factory.is_some())
      .field("initializer", &state.initializer.is_some())
      .field("singleton", &state.singleton)
      .finish()
  }
}
