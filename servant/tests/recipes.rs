mod common;

use common::*;
use pretty_assertions::assert_eq;
use servant::{Callable, Container, Error, Instance, Signature, TypeKey};

// --- Recipe Configuration Tests ---

#[test]
fn test_new_recipe_defaults_to_its_interface() {
  let container = Container::new(catalog());
  let recipe = container.wire(clock());

  assert_eq!(recipe.interface(), clock());
  assert_eq!(recipe.concrete(), clock());
  assert!(!recipe.has_factory());
  assert!(!recipe.has_initializer());
  assert!(!recipe.is_singleton());
}

#[test]
fn test_incompatible_concrete_is_rejected_and_recipe_unchanged() {
  // Arrange
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  recipe.with_concrete(TypeKey::of::<SystemClock>()).unwrap();

  // Act
  let result = recipe.with_concrete(TypeKey::of::<Widget>());

  // Assert
  assert_eq!(
    result.unwrap_err(),
    Error::IncompatibleType {
      given: TypeKey::of::<Widget>().name(),
      interface: clock().name(),
    }
  );
  assert_eq!(recipe.concrete(), TypeKey::of::<SystemClock>());
}

#[test]
fn test_recipe_handle_and_registered_recipe_are_the_same() {
  let container = Container::new(catalog());
  let recipe = container.compose("clock", clock());

  // Configured after registration, through the returned handle.
  recipe.with_concrete(TypeKey::of::<FrozenClock>()).unwrap();

  assert_eq!(container.get_as::<dyn Clock>("clock").unwrap().name(), "frozen");
}

#[test]
fn test_factory_with_incompatible_return_type_is_rejected() {
  // Arrange
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  let good = Callable::returning(Signature::new(), |_| Ok(FrozenClock));
  recipe.with_factory(good.clone()).unwrap();

  // Act
  let bad = Callable::returning(Signature::new(), |_| {
    Ok(Widget {
      label: "not a clock".to_string(),
    })
  });
  let result = recipe.with_factory(bad);

  // Assert
  assert!(matches!(result, Err(Error::IncompatibleType { .. })));
  assert_eq!(recipe.factory().unwrap().id(), good.id());
  assert_eq!(recipe.concrete(), TypeKey::of::<FrozenClock>());
}

#[test]
fn test_factory_without_declared_return_type_is_rejected() {
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  let untyped = Callable::new(Signature::new(), |_| Ok(Instance::new(SystemClock)));

  assert!(matches!(
    recipe.with_factory(untyped),
    Err(Error::IncompatibleType { .. })
  ));
  assert!(!recipe.has_factory());
  assert_eq!(recipe.concrete(), clock());
}

#[test]
fn test_factory_declared_with_explicit_return_type_is_accepted() {
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  let factory = Callable::new(Signature::new().returns::<SystemClock>(), |_| {
    Ok(Instance::new(SystemClock))
  });

  recipe.with_factory(factory).unwrap();

  assert_eq!(recipe.concrete(), TypeKey::of::<SystemClock>());
}

#[test]
fn test_initializer_without_parameters_is_rejected() {
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  let initializer = Callable::returning(Signature::new(), |_| Ok(()));

  assert!(matches!(
    recipe.with_initializer(initializer),
    Err(Error::InvalidInitializer { .. })
  ));
  assert!(!recipe.has_initializer());
}

#[test]
fn test_initializer_with_untyped_first_parameter_is_rejected() {
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  let initializer = Callable::returning(Signature::new().untyped("object"), |_| Ok(()));

  assert!(matches!(
    recipe.with_initializer(initializer),
    Err(Error::InvalidInitializer { .. })
  ));
}

#[test]
fn test_initializer_with_incompatible_first_parameter_is_rejected() {
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  let initializer = Callable::returning(Signature::new().service::<Widget>("widget"), |_| Ok(()));

  assert!(matches!(
    recipe.with_initializer(initializer),
    Err(Error::InvalidInitializer { .. })
  ));
}

#[test]
fn test_initializer_with_compatible_first_parameter_is_accepted() {
  let container = Container::new(catalog());
  let recipe = container.wire(clock());
  let initializer = Callable::returning(
    Signature::new()
      .service::<dyn Clock>("clock")
      .service::<Widget>("widget"),
    |_| Ok(()),
  );

  recipe.with_initializer(initializer.clone()).unwrap();

  assert_eq!(recipe.initializer().unwrap().id(), initializer.id());
}
