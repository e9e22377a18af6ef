mod common;

use common::*;
use pretty_assertions::assert_eq;
use servant::{
  Arguments, CallArgs, Callable, ClassDef, Compatibility, Construction, Container, Error, Instance,
  IntrospectionCache, Introspector, ParameterDescriptor, Signature, TypeCatalog, TypeKey,
};
use std::any::Any;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

// A catalog wrapper counting how often each kind of introspection happens.
#[derive(Default)]
struct CountingCatalog {
  catalog: TypeCatalog,
  callables: AtomicUsize,
  constructors: AtomicUsize,
  methods: AtomicUsize,
}

impl CountingCatalog {
  fn wrapping(catalog: TypeCatalog) -> Arc<Self> {
    Arc::new(Self {
      catalog,
      ..Default::default()
    })
  }
}

impl Introspector for CountingCatalog {
  fn describe_callable(&self, callable: &Callable) -> Vec<ParameterDescriptor> {
    self.callables.fetch_add(1, Ordering::SeqCst);
    self.catalog.describe_callable(callable)
  }

  fn describe_constructor(&self, ty: &TypeKey) -> servant::Result<Option<Vec<ParameterDescriptor>>> {
    self.constructors.fetch_add(1, Ordering::SeqCst);
    self.catalog.describe_constructor(ty)
  }

  fn describe_method(&self, ty: &TypeKey, method: &str) -> servant::Result<Vec<ParameterDescriptor>> {
    self.methods.fetch_add(1, Ordering::SeqCst);
    self.catalog.describe_method(ty, method)
  }
}

impl Construction for CountingCatalog {
  fn is_instantiable(&self, ty: &TypeKey) -> bool {
    self.catalog.is_instantiable(ty)
  }

  fn construct(&self, ty: &TypeKey, args: &CallArgs<'_>) -> servant::Result<Instance> {
    self.catalog.construct(ty, args)
  }

  fn invoke_method(
    &self,
    receiver: &Instance,
    method: &str,
    args: &CallArgs<'_>,
  ) -> servant::Result<Instance> {
    self.catalog.invoke_method(receiver, method, args)
  }
}

impl Compatibility for CountingCatalog {
  fn is_compatible(&self, ty: &TypeKey, target: &TypeKey) -> bool {
    self.catalog.is_compatible(ty, target)
  }

  fn cast(&self, instance: &Instance, target: &TypeKey) -> Option<Box<dyn Any + Send + Sync>> {
    self.catalog.cast(instance, target)
  }
}

fn counting() -> Arc<CountingCatalog> {
  // Reuse the shared fixtures by moving them out of their Arc.
  let shared = catalog();
  let catalog = Arc::try_unwrap(shared).unwrap_or_else(|_| panic!("fixture catalog is shared"));
  CountingCatalog::wrapping(catalog)
}

// --- Introspection Cache Tests ---

#[test]
fn test_constructor_is_introspected_once() {
  // Arrange
  let reflection = counting();
  let container = Container::new(reflection.clone());
  container
    .wire(clock())
    .with_concrete(TypeKey::of::<SystemClock>())
    .unwrap();

  // Act
  for _ in 0..5 {
    container.make_as::<Report>(Arguments::new()).unwrap();
  }

  // Assert: Report and SystemClock, once each.
  assert_eq!(reflection.constructors.load(Ordering::SeqCst), 2);
  assert_eq!(container.introspection_cache().len(), 2);
}

#[test]
fn test_callable_is_introspected_once_per_identity() {
  // Arrange
  let reflection = counting();
  let container = Container::new(reflection.clone());
  let callable = Callable::returning(Signature::new(), |_| Ok(1_u32));
  let same_code = Callable::returning(Signature::new(), |_| Ok(1_u32));

  // Act
  container.call(&callable, Arguments::new()).unwrap();
  container.call(&callable.clone(), Arguments::new()).unwrap();
  container.call(&callable, Arguments::new()).unwrap();
  container.call(&same_code, Arguments::new()).unwrap();

  // Assert
  assert_eq!(reflection.callables.load(Ordering::SeqCst), 2);
}

#[test]
fn test_initializer_is_introspected_once_across_configuration_and_builds() {
  let reflection = counting();
  let container = Container::new(reflection.clone());
  let initializer = Callable::returning(Signature::new().service::<dyn Clock>("clock"), |_| Ok(()));
  container
    .wire(clock())
    .with_concrete(TypeKey::of::<SystemClock>())
    .unwrap()
    .with_initializer(initializer)
    .unwrap();

  for _ in 0..3 {
    container.make(&clock(), Arguments::new()).unwrap();
  }

  // Validation and every build share one cached description.
  assert_eq!(reflection.callables.load(Ordering::SeqCst), 1);
}

#[test]
fn test_method_is_introspected_once_and_unknown_methods_fail() {
  struct Greeter;

  let catalog = TypeCatalog::new();
  catalog.register(ClassDef::<Greeter>::new().implicit_constructor(|| Greeter).method(
    "greet",
    Signature::new().value::<String>("name"),
    |_: &Greeter, args| Ok(format!("Hello, {}!", args.arg::<String>(0)?)),
  ));
  let reflection = CountingCatalog::wrapping(catalog);
  let cache = IntrospectionCache::new(reflection.clone());
  let greeter = TypeKey::of::<Greeter>();

  let first = cache.describe_method(&greeter, "greet").unwrap();
  let second = cache.describe_method(&greeter, "greet").unwrap();
  assert!(Arc::ptr_eq(&first, &second));
  assert_eq!(first[0].name, "name");
  assert_eq!(reflection.methods.load(Ordering::SeqCst), 1);

  assert_eq!(
    cache.describe_method(&greeter, "wave").unwrap_err(),
    Error::UnknownMethod {
      ty: greeter.name(),
      method: "wave".to_string()
    }
  );
  // Failures are not cached.
  assert!(cache.describe_method(&greeter, "wave").is_err());
  assert_eq!(reflection.methods.load(Ordering::SeqCst), 3);
}

#[test]
fn test_constructor_absence_is_cached() {
  let reflection = counting();
  let cache = IntrospectionCache::new(reflection.clone());

  assert_eq!(cache.describe_constructor(&TypeKey::of::<Widget>()).unwrap(), None);
  assert_eq!(cache.describe_constructor(&TypeKey::of::<Widget>()).unwrap(), None);
  assert_eq!(reflection.constructors.load(Ordering::SeqCst), 1);

  let report = cache
    .describe_constructor(&TypeKey::of::<Report>())
    .unwrap()
    .unwrap();
  assert_eq!(report.len(), 1);
  assert_eq!(report[0].name, "dep");
}

#[test]
fn test_concurrent_lookups_introspect_once() {
  let reflection = counting();
  let cache = Arc::new(IntrospectionCache::new(reflection.clone()));
  let callable = Callable::returning(Signature::new().value::<u8>("x"), |_| Ok(()));

  thread::scope(|s| {
    for _ in 0..16 {
      s.spawn(|| {
        for _ in 0..100 {
          assert_eq!(cache.describe_callable(&callable).len(), 1);
          cache.describe_constructor(&TypeKey::of::<Report>()).unwrap();
        }
      });
    }
  });

  assert_eq!(reflection.callables.load(Ordering::SeqCst), 1);
  assert_eq!(reflection.constructors.load(Ordering::SeqCst), 1);
}

#[test]
fn test_root_containers_can_share_a_cache() {
  let reflection = counting();
  let cache = Arc::new(IntrospectionCache::new(reflection.clone()));
  let first = Container::with_introspection_cache(reflection.clone(), cache.clone(), Default::default());
  let second = Container::with_introspection_cache(reflection.clone(), cache.clone(), Default::default());

  first.make_as::<Widget>(Arguments::new()).unwrap();
  second.make_as::<Widget>(Arguments::new()).unwrap();

  assert!(Arc::ptr_eq(first.introspection_cache(), second.introspection_cache()));
  assert_eq!(reflection.constructors.load(Ordering::SeqCst), 1);
}
