//! The main `Container` struct and its associated methods.

use crate::args::{Arguments, CallArgs};
use crate::callable::{Callable, DeclaredType};
use crate::config::ContainerConfig;
use crate::core::{Instance, TypeKey};
use crate::error::{Error, Result};
use crate::introspection::{IntrospectionCache, Parameters};
use crate::recipe::{Plan, Recipe, RecipeId};
use crate::reflect::{view, Compatibility, Construction, Introspector, Reflection};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

// Where the recipe being resolved came from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Origin {
  Named,
  Wired,
}

struct Inner {
  parent: Option<Container>,
  services: DashMap<String, Recipe>,
  interfaces: DashMap<TypeKey, Recipe>,
  instances: DashMap<RecipeId, Instance>,
  reflection: Arc<dyn Reflection>,
  introspection: Arc<IntrospectionCache>,
  config: ContainerConfig,
}

/// The Inversion of Control (IoC) container.
///
/// Holds named services (`compose`), interface wiring used for autowiring
/// (`wire`) and the singleton instances it has built. `Container` is a cheap
/// handle; clones refer to the same container.
///
/// A fork (see [`Container::fork`]) keeps a live reference to its parent:
/// named services it does not define itself are resolved by the parent, and
/// anything registered on the fork stays invisible to the parent.
#[derive(Clone)]
pub struct Container {
  inner: Arc<Inner>,
}

impl Container {
  /// Creates a new, empty root container backed by `reflection`.
  pub fn new<R>(reflection: Arc<R>) -> Self
  where
    R: Introspector + Construction + Compatibility + 'static,
  {
    Self::with_config(reflection, ContainerConfig::default())
  }

  pub fn with_config<R>(reflection: Arc<R>, config: ContainerConfig) -> Self
  where
    R: Introspector + Construction + Compatibility + 'static,
  {
    let introspection = Arc::new(IntrospectionCache::new(reflection.clone()));
    Self::with_introspection_cache(reflection, introspection, config)
  }

  /// Creates a root container sharing an existing introspection cache, e.g.
  /// with other root containers over the same catalog.
  pub fn with_introspection_cache(
    reflection: Arc<dyn Reflection>,
    introspection: Arc<IntrospectionCache>,
    config: ContainerConfig,
  ) -> Self {
    Self::from_parts(None, reflection, introspection, config)
  }

  fn from_parts(
    parent: Option<Container>,
    reflection: Arc<dyn Reflection>,
    introspection: Arc<IntrospectionCache>,
    config: ContainerConfig,
  ) -> Self {
    Self {
      inner: Arc::new(Inner {
        parent,
        services: DashMap::new(),
        interfaces: DashMap::new(),
        instances: DashMap::new(),
        reflection,
        introspection,
        config,
      }),
    }
  }

  // --- Named services ---

  /// Resolves the service registered under `key`.
  ///
  /// A fork hands keys it does not know itself to its parent chain.
  pub fn get(&self, key: &str) -> Result<Instance> {
    let local = self.inner.services.get(key).map(|r| r.value().clone());
    let recipe = match local {
      Some(recipe) => recipe,
      None => return self.get_from_parent(key),
    };

    tracing::trace!(key, "resolving named service");
    self.resolve(&recipe, &Arguments::new(), 0, Origin::Named)
  }

  fn get_from_parent(&self, key: &str) -> Result<Instance> {
    match &self.inner.parent {
      Some(parent) if parent.knows(key) => {
        tracing::trace!(key, "delegating named service to parent container");
        parent.get(key)
      }
      _ => Err(Error::UnknownService(key.to_owned())),
    }
  }

  /// Resolves `key` and views the result as `I`.
  pub fn get_as<I: ?Sized + Send + Sync + 'static>(&self, key: &str) -> Result<Arc<I>> {
    let instance = self.get(key)?;
    self.view(&instance)
  }

  /// Whether `key` is registered on this container. Parents are not consulted.
  pub fn has(&self, key: &str) -> bool {
    self.inner.services.contains_key(key)
  }

  fn knows(&self, key: &str) -> bool {
    self.has(key)
      || self
        .inner
        .parent
        .as_ref()
        .map_or(false, |parent| parent.knows(key))
  }

  /// Registers a new recipe for `interface` under `key`, replacing any
  /// previous one, and returns it for configuration.
  ///
  /// Named services are never used for autowiring.
  pub fn compose(&self, key: &str, interface: TypeKey) -> Recipe {
    let recipe = self.new_recipe(interface);
    self.inner.services.insert(key.to_owned(), recipe.clone());
    tracing::debug!(key, interface = interface.name(), "composed service");
    recipe
  }

  /// Like [`Container::compose`], but runs `configure` first. Nothing is
  /// registered if it fails.
  pub fn compose_with(
    &self,
    key: &str,
    interface: TypeKey,
    configure: impl FnOnce(&Recipe) -> Result<()>,
  ) -> Result<Recipe> {
    let recipe = self.new_recipe(interface);
    configure(&recipe)?;
    self.inner.services.insert(key.to_owned(), recipe.clone());
    tracing::debug!(key, interface = interface.name(), "composed service");
    Ok(recipe)
  }

  /// Removes `key` from this container only.
  pub fn remove(&self, key: &str) {
    self.inner.services.remove(key);
  }

  /// Evicts the cached singleton of the local service `key`, if any.
  pub fn drop_instance_of_service(&self, key: &str) {
    let recipe = self.inner.services.get(key).map(|r| r.value().clone());
    if let Some(recipe) = recipe {
      self.evict(&recipe);
    }
  }

  // --- Interface wiring ---

  /// Registers a new recipe for `interface`, replacing any previous one. Wired
  /// interfaces are used by `make` and for autowiring.
  pub fn wire(&self, interface: TypeKey) -> Recipe {
    let recipe = self.new_recipe(interface);
    self.inner.interfaces.insert(interface, recipe.clone());
    tracing::debug!(interface = interface.name(), "wired interface");
    recipe
  }

  /// Like [`Container::wire`], but runs `configure` first. Nothing is wired if
  /// it fails.
  pub fn wire_with(
    &self,
    interface: TypeKey,
    configure: impl FnOnce(&Recipe) -> Result<()>,
  ) -> Result<Recipe> {
    let recipe = self.new_recipe(interface);
    configure(&recipe)?;
    self.inner.interfaces.insert(interface, recipe.clone());
    tracing::debug!(interface = interface.name(), "wired interface");
    Ok(recipe)
  }

  /// Whether `interface` is wired on this container. Parents are not consulted.
  pub fn supports(&self, interface: &TypeKey) -> bool {
    self.inner.interfaces.contains_key(interface)
  }

  /// Removes the wiring of `interface` from this container only.
  pub fn forget(&self, interface: &TypeKey) {
    self.inner.interfaces.remove(interface);
  }

  /// Evicts the cached singleton of the locally wired `interface`, if any.
  pub fn drop_instance_of_interface(&self, interface: &TypeKey) {
    let recipe = self.inner.interfaces.get(interface).map(|r| r.value().clone());
    if let Some(recipe) = recipe {
      self.evict(&recipe);
    }
  }

  /// Produces an object for `interface`, passing `args` to its constructor or
  /// factory.
  ///
  /// Uses the local wiring of `interface` when there is one. Otherwise an
  /// instantiable concrete type is built directly, without caching. Wiring on
  /// parent containers is only considered when
  /// [`ContainerConfig::inherit_wiring`] is set.
  pub fn make(&self, interface: &TypeKey, args: Arguments) -> Result<Instance> {
    self.make_at(interface, &args, 0)
  }

  /// Makes `I` with `args` and views the result as `I`.
  pub fn make_as<I: ?Sized + Send + Sync + 'static>(&self, args: Arguments) -> Result<Arc<I>> {
    let instance = self.make(&TypeKey::of::<I>(), args)?;
    self.view(&instance)
  }

  fn make_at(&self, interface: &TypeKey, args: &Arguments, depth: usize) -> Result<Instance> {
    if let Some(limit) = self.inner.config.max_resolution_depth {
      if depth > limit {
        return Err(Error::RecursionLimit(interface.name(), limit));
      }
    }

    let local = self.inner.interfaces.get(interface).map(|r| r.value().clone());
    let recipe = match local {
      Some(recipe) => recipe,
      None => {
        if self.inner.config.inherit_wiring {
          if let Some(owner) = self.ancestor_supporting(interface) {
            tracing::trace!(
              interface = interface.name(),
              "delegating interface to parent container"
            );
            return owner.make_at(interface, args, depth);
          }
        }
        if !self.inner.reflection.is_instantiable(interface) {
          return Err(Error::UnsupportedInterface(interface.name()));
        }
        self.new_recipe(*interface)
      }
    };

    tracing::trace!(interface = interface.name(), depth, "making interface");
    self.resolve(&recipe, args, depth, Origin::Wired)
  }

  fn ancestor_supporting(&self, interface: &TypeKey) -> Option<Container> {
    let mut current = self.inner.parent.clone();
    while let Some(container) = current {
      if container.supports(interface) {
        return Some(container);
      }
      current = container.inner.parent.clone();
    }
    None
  }

  // --- Forking ---

  /// Creates a child container that shares this container's catalog,
  /// introspection cache and settings, and delegates unknown named services to
  /// it.
  pub fn fork(&self) -> Container {
    tracing::debug!("forking container");
    Self::from_parts(
      Some(self.clone()),
      self.inner.reflection.clone(),
      self.inner.introspection.clone(),
      self.inner.config.clone(),
    )
  }

  pub fn is_fork(&self) -> bool {
    self.inner.parent.is_some()
  }

  pub fn parent(&self) -> Option<&Container> {
    self.inner.parent.as_ref()
  }

  // --- Invocation ---

  /// Invokes `callable`, supplying explicit `args` first and autowiring the
  /// rest.
  pub fn call(&self, callable: &Callable, args: Arguments) -> Result<Instance> {
    let parameters = self.inner.introspection.describe_callable(callable);
    let slots = self.marshal(&args, &parameters, 0)?;
    callable.invoke(&CallArgs::new(slots, &parameters, self.casts()))
  }

  /// Invokes the declared method `method` on `receiver` with marshaled
  /// arguments.
  pub fn call_method(&self, receiver: &Instance, method: &str, args: Arguments) -> Result<Instance> {
    let parameters = self
      .inner
      .introspection
      .describe_method(&receiver.type_key(), method)?;
    let slots = self.marshal(&args, &parameters, 0)?;
    self
      .inner
      .reflection
      .invoke_method(receiver, method, &CallArgs::new(slots, &parameters, self.casts()))
  }

  /// Views `instance` as `I`.
  pub fn view<I: ?Sized + Send + Sync + 'static>(&self, instance: &Instance) -> Result<Arc<I>> {
    view::<I>(self.casts(), instance).ok_or(Error::Cast {
      from: instance.type_key().name(),
      to: std::any::type_name::<I>(),
    })
  }

  // --- Accessors ---

  pub fn introspection_cache(&self) -> &Arc<IntrospectionCache> {
    &self.inner.introspection
  }

  pub fn reflection(&self) -> &Arc<dyn Reflection> {
    &self.inner.reflection
  }

  pub fn config(&self) -> &ContainerConfig {
    &self.inner.config
  }

  // --- PRIVATE HELPERS ---

  fn new_recipe(&self, interface: TypeKey) -> Recipe {
    Recipe::new(
      interface,
      self.inner.reflection.clone(),
      self.inner.introspection.clone(),
    )
  }

  fn casts(&self) -> &dyn Compatibility {
    self.inner.reflection.as_compatibility()
  }

  fn evict(&self, recipe: &Recipe) {
    if self.inner.instances.remove(&recipe.id()).is_some() {
      tracing::debug!(
        interface = recipe.interface().name(),
        "dropped singleton instance"
      );
    }
  }

  // Singleton lookup, build, and singleton store. Nothing is stored when the
  // build fails.
  fn resolve(
    &self,
    recipe: &Recipe,
    args: &Arguments,
    depth: usize,
    origin: Origin,
  ) -> Result<Instance> {
    let plan = recipe.plan();

    if plan.singleton {
      if let Some(cached) = self.inner.instances.get(&recipe.id()) {
        return Ok(cached.value().clone());
      }
    }

    let object = self.build(&plan, args, depth, origin)?;

    if plan.singleton {
      // First stored instance wins if another thread built one meanwhile.
      let stored = self
        .inner
        .instances
        .entry(recipe.id())
        .or_insert(object)
        .value()
        .clone();
      tracing::debug!(
        interface = recipe.interface().name(),
        "cached singleton instance"
      );
      return Ok(stored);
    }

    Ok(object)
  }

  fn build(&self, plan: &Plan, args: &Arguments, depth: usize, origin: Origin) -> Result<Instance> {
    let concrete = &plan.concrete;
    let object = match &plan.factory {
      Some(factory) => {
        let parameters = self.inner.introspection.describe_callable(factory);
        let slots = self.marshal(args, &parameters, depth)?;
        factory.invoke(&CallArgs::new(slots, &parameters, self.casts()))?
      }
      // A named service for an abstract interface is served by the wiring of
      // that interface.
      None if origin == Origin::Named && !self.inner.reflection.is_instantiable(concrete) => {
        self.make_at(concrete, args, depth + 1)?
      }
      None => {
        if !self.inner.reflection.is_instantiable(concrete) {
          return Err(Error::NotInstantiable(concrete.name()));
        }
        let parameters: Parameters = self
          .inner
          .introspection
          .describe_constructor(concrete)?
          .unwrap_or_else(|| Arc::from(Vec::new()));
        let slots = self.marshal(args, &parameters, depth)?;
        self
          .inner
          .reflection
          .construct(concrete, &CallArgs::new(slots, &parameters, self.casts()))?
      }
    };

    if let Some(initializer) = &plan.initializer {
      let parameters = self.inner.introspection.describe_callable(initializer);
      let supplied = Arguments::new().at(0, object.clone());
      let slots = self.marshal(&supplied, &parameters, depth)?;
      // The initializer's result is discarded; the built object stays canonical.
      initializer.invoke(&CallArgs::new(slots, &parameters, self.casts()))?;
    }

    Ok(object)
  }

  // Positional argument, then named argument, then autowiring of required
  // service parameters. Anything else stays empty for the callee's default.
  fn marshal(
    &self,
    args: &Arguments,
    parameters: &Parameters,
    depth: usize,
  ) -> Result<Vec<Option<Instance>>> {
    let len = parameters
      .iter()
      .map(|p| p.position + 1)
      .max()
      .unwrap_or(0);
    let mut slots: Vec<Option<Instance>> = vec![None; len];

    for parameter in parameters.iter() {
      let supplied = args
        .by_position(parameter.position)
        .or_else(|| args.by_name(&parameter.name))
        .cloned();

      let value = match (supplied, parameter.declared) {
        (Some(value), _) => Some(value),
        (None, Some(DeclaredType::Service(ty))) if !parameter.optional => {
          tracing::trace!(
            parameter = parameter.name.as_str(),
            interface = ty.name(),
            "autowiring parameter"
          );
          Some(self.make_at(&ty, &Arguments::new(), depth + 1)?)
        }
        _ => None,
      };
      slots[parameter.position] = value;
    }

    Ok(slots)
  }
}

impl fmt::Debug for Container {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("Container")
      .field("fork", &self.is_fork())
      .field("services", &self.inner.services.len())
      .field("interfaces", &self.inner.interfaces.len())
      .field("instances", &self.inner.instances.len())
      .field("config", &self.inner.config)
      .finish()
  }
}
