//! `TypeCatalog`: the reflective capabilities backed by explicit declarations.

use crate::args::CallArgs;
use crate::callable::{Callable, ParameterDescriptor, Signature};
use crate::core::{Instance, TypeKey};
use crate::error::{Error, Result};
use crate::reflect::{Compatibility, Construction, Introspector};
use dashmap::DashMap;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

type Upcast =
  Arc<dyn Fn(&Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any + Send + Sync>> + Send + Sync>;
type ConstructorBody = Arc<dyn Fn(&CallArgs<'_>) -> Result<Instance> + Send + Sync>;
type MethodBody = Arc<dyn Fn(&Instance, &CallArgs<'_>) -> Result<Instance> + Send + Sync>;

struct ConstructorEntry {
  // `None` for an implicit (argument-less) constructor.
  parameters: Option<Vec<ParameterDescriptor>>,
  body: ConstructorBody,
}

struct MethodEntry {
  parameters: Vec<ParameterDescriptor>,
  body: MethodBody,
}

#[derive(Default)]
struct ClassEntry {
  constructor: Option<ConstructorEntry>,
  casts: HashMap<TypeKey, Upcast>,
  methods: HashMap<String, MethodEntry>,
}

/// The declaration of a class `T`: how to construct it, which interfaces it
/// implements and which methods the container may call on it.
///
/// A class is always compatible with itself. A class declared without any
/// constructor is known to the catalog but can not be instantiated.
pub struct ClassDef<T> {
  entry: ClassEntry,
  _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> Default for ClassDef<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Any + Send + Sync> ClassDef<T> {
  pub fn new() -> Self {
    let def = Self {
      entry: ClassEntry::default(),
      _marker: PhantomData,
    };
    def.implements::<T>(|this| this)
  }

  /// Declares an explicit constructor with the given parameters.
  pub fn constructor(
    mut self,
    signature: Signature,
    body: impl Fn(&CallArgs<'_>) -> Result<T> + Send + Sync + 'static,
  ) -> Self {
    self.entry.constructor = Some(ConstructorEntry {
      parameters: Some(signature.parameters().to_vec()),
      body: Arc::new(move |args| body(args).map(Instance::new)),
    });
    self
  }

  /// Makes the class instantiable without declaring a constructor.
  pub fn implicit_constructor(mut self, body: impl Fn() -> T + Send + Sync + 'static) -> Self {
    self.entry.constructor = Some(ConstructorEntry {
      parameters: None,
      body: Arc::new(move |_| Ok(Instance::new(body()))),
    });
    self
  }

  /// Declares that `T` can be used as `I`, with the coercion to perform.
  pub fn implements<I: ?Sized + Send + Sync + 'static>(
    mut self,
    upcast: impl Fn(Arc<T>) -> Arc<I> + Send + Sync + 'static,
  ) -> Self {
    let upcast: Upcast = Arc::new(move |object| {
      object
        .clone()
        .downcast::<T>()
        .ok()
        .map(|this| Box::new(upcast(this)) as Box<dyn Any + Send + Sync>)
    });
    self.entry.casts.insert(TypeKey::of::<I>(), upcast);
    self
  }

  /// Declares a method the container can invoke with marshaled arguments.
  pub fn method<R: Any + Send + Sync>(
    mut self,
    name: &str,
    signature: Signature,
    body: impl Fn(&T, &CallArgs<'_>) -> Result<R> + Send + Sync + 'static,
  ) -> Self {
    let body: MethodBody = Arc::new(move |receiver, args| {
      let this = receiver.downcast_ref::<T>().ok_or(Error::Cast {
        from: receiver.type_key().name(),
        to: std::any::type_name::<T>(),
      })?;
      body(this, args).map(Instance::new)
    });
    self.entry.methods.insert(
      name.to_owned(),
      MethodEntry {
        parameters: signature.parameters().to_vec(),
        body,
      },
    );
    self
  }
}

/// A thread-safe registry of class declarations implementing
/// [`Introspector`], [`Construction`] and [`Compatibility`].
///
/// Declarations may be added at any time, also after containers using the
/// catalog have been created.
#[derive(Default)]
pub struct TypeCatalog {
  classes: DashMap<TypeKey, Arc<ClassEntry>>,
}

impl TypeCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  /// Declares `T`. A later declaration of the same type replaces the earlier one.
  pub fn register<T: Any + Send + Sync>(&self, def: ClassDef<T>) -> &Self {
    let key = TypeKey::of::<T>();
    tracing::debug!(class = key.name(), "declaring class");
    self.classes.insert(key, Arc::new(def.entry));
    self
  }

  pub fn contains(&self, ty: &TypeKey) -> bool {
    self.classes.contains_key(ty)
  }

  pub fn len(&self) -> usize {
    self.classes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.classes.is_empty()
  }

  // Clones the entry out so no map guard is held while user code runs.
  fn entry(&self, ty: &TypeKey) -> Option<Arc<ClassEntry>> {
    self.classes.get(ty).map(|entry| entry.value().clone())
  }
}

impl Introspector for TypeCatalog {
  fn describe_callable(&self, callable: &Callable) -> Vec<ParameterDescriptor> {
    callable.signature().parameters().to_vec()
  }

  fn describe_constructor(&self, ty: &TypeKey) -> Result<Option<Vec<ParameterDescriptor>>> {
    let entry = self.entry(ty).ok_or(Error::UnknownType(ty.name()))?;
    Ok(
      entry
        .constructor
        .as_ref()
        .and_then(|ctor| ctor.parameters.clone()),
    )
  }

  fn describe_method(&self, ty: &TypeKey, method: &str) -> Result<Vec<ParameterDescriptor>> {
    let entry = self.entry(ty).ok_or(Error::UnknownType(ty.name()))?;
    entry
      .methods
      .get(method)
      .map(|m| m.parameters.clone())
      .ok_or_else(|| Error::UnknownMethod {
        ty: ty.name(),
        method: method.to_owned(),
      })
  }
}

impl Construction for TypeCatalog {
  fn is_instantiable(&self, ty: &TypeKey) -> bool {
    self
      .classes
      .get(ty)
      .map_or(false, |entry| entry.constructor.is_some())
  }

  fn construct(&self, ty: &TypeKey, args: &CallArgs<'_>) -> Result<Instance> {
    let entry = self.entry(ty).ok_or(Error::NotInstantiable(ty.name()))?;
    let ctor = entry
      .constructor
      .as_ref()
      .ok_or(Error::NotInstantiable(ty.name()))?;
    (ctor.body)(args)
  }

  fn invoke_method(
    &self,
    receiver: &Instance,
    method: &str,
    args: &CallArgs<'_>,
  ) -> Result<Instance> {
    let ty = receiver.type_key();
    let entry = self.entry(&ty).ok_or(Error::UnknownType(ty.name()))?;
    let found = entry.methods.get(method).ok_or_else(|| Error::UnknownMethod {
      ty: ty.name(),
      method: method.to_owned(),
    })?;
    (found.body)(receiver, args)
  }
}

impl Compatibility for TypeCatalog {
  fn is_compatible(&self, ty: &TypeKey, target: &TypeKey) -> bool {
    ty == target
      || self
        .classes
        .get(ty)
        .map_or(false, |entry| entry.casts.contains_key(target))
  }

  fn cast(&self, instance: &Instance, target: &TypeKey) -> Option<Box<dyn Any + Send + Sync>> {
    let entry = self.entry(&instance.type_key())?;
    let upcast = entry.casts.get(target)?;
    upcast(instance.object())
  }
}
