use servant::{ClassDef, Container, TypeCatalog, TypeKey};
use std::sync::Arc;

trait Greeter: Send + Sync {
  fn greet(&self) -> String;
}

struct English;
impl Greeter for English {
  fn greet(&self) -> String {
    "Hello!".to_string()
  }
}

struct French;
impl Greeter for French {
  fn greet(&self) -> String {
    "Bonjour !".to_string()
  }
}

fn main() -> servant::Result<()> {
  let catalog = Arc::new(TypeCatalog::new());
  catalog
    .register(
      ClassDef::<English>::new()
        .implicit_constructor(|| English)
        .implements::<dyn Greeter>(|g| g as Arc<dyn Greeter>),
    )
    .register(
      ClassDef::<French>::new()
        .implicit_constructor(|| French)
        .implements::<dyn Greeter>(|g| g as Arc<dyn Greeter>),
    );

  let root = Container::new(catalog);
  root
    .compose("greeter", TypeKey::of::<dyn Greeter>())
    .with_concrete(TypeKey::of::<English>())?
    .singleton(true);

  // A fork sees everything its parent knows, including later registrations.
  let request = root.fork();
  println!("fork before override: {}", request.get_as::<dyn Greeter>("greeter")?.greet());

  // Overrides stay inside the fork.
  request
    .compose("greeter", TypeKey::of::<dyn Greeter>())
    .with_concrete(TypeKey::of::<French>())?;
  println!("fork after override:  {}", request.get_as::<dyn Greeter>("greeter")?.greet());
  println!("root is unchanged:    {}", root.get_as::<dyn Greeter>("greeter")?.greet());

  assert!(request.is_fork());
  assert!(!root.is_fork());
  Ok(())
}
