#![allow(dead_code)]

use servant::{ClassDef, Signature, TypeCatalog, TypeKey};
use std::sync::{Arc, Mutex};

// --- Test Fixtures ---

// Interfaces must be Send + Sync for the container to hand them out.
pub trait Clock: Send + Sync {
  fn name(&self) -> &'static str;
}

pub struct SystemClock;
impl Clock for SystemClock {
  fn name(&self) -> &'static str {
    "system"
  }
}

pub struct FrozenClock;
impl Clock for FrozenClock {
  fn name(&self) -> &'static str {
    "frozen"
  }
}

pub trait Logger: Send + Sync {
  fn log(&self, line: &str);
  fn lines(&self) -> Vec<String>;
}

// Only ever built by a factory.
pub struct FileLogger {
  pub path: String,
  lines: Mutex<Vec<String>>,
}

impl FileLogger {
  pub fn new(path: &str) -> Self {
    Self {
      path: path.to_string(),
      lines: Mutex::new(Vec::new()),
    }
  }
}

impl Logger for FileLogger {
  fn log(&self, line: &str) {
    self.lines.lock().unwrap().push(line.to_string());
  }

  fn lines(&self) -> Vec<String> {
    self.lines.lock().unwrap().clone()
  }
}

// A plain class without any interface.
pub struct Widget {
  pub label: String,
}

pub struct Report {
  pub clock: Arc<dyn Clock>,
}

pub struct Dashboard {
  pub clock: Arc<dyn Clock>,
  pub widget: Arc<Widget>,
  pub footer: Option<Arc<Widget>>,
  pub title: String,
}

pub fn clock() -> TypeKey {
  TypeKey::of::<dyn Clock>()
}

pub fn logger() -> TypeKey {
  TypeKey::of::<dyn Logger>()
}

/// A catalog declaring every fixture above.
pub fn catalog() -> Arc<TypeCatalog> {
  let catalog = Arc::new(TypeCatalog::new());
  catalog
    .register(
      ClassDef::<SystemClock>::new()
        .implicit_constructor(|| SystemClock)
        .implements::<dyn Clock>(|c| c as Arc<dyn Clock>),
    )
    .register(
      ClassDef::<FrozenClock>::new()
        .implicit_constructor(|| FrozenClock)
        .implements::<dyn Clock>(|c| c as Arc<dyn Clock>),
    )
    .register(ClassDef::<FileLogger>::new().implements::<dyn Logger>(|l| l as Arc<dyn Logger>))
    .register(ClassDef::<Widget>::new().implicit_constructor(|| Widget {
      label: "default".to_string(),
    }))
    .register(ClassDef::<Report>::new().constructor(
      Signature::new().service::<dyn Clock>("dep"),
      |args| {
        Ok(Report {
          clock: args.service::<dyn Clock>(0)?,
        })
      },
    ))
    .register(ClassDef::<Dashboard>::new().constructor(
      Signature::new()
        .service::<dyn Clock>("clock")
        .service::<Widget>("widget")
        .optional_service::<Widget>("footer")
        .optional_value::<String>("title"),
      |args| {
        Ok(Dashboard {
          clock: args.service::<dyn Clock>(0)?,
          widget: args.service::<Widget>(1)?,
          footer: args.opt_service::<Widget>(2)?,
          title: args
            .opt_arg::<String>(3)?
            .map_or_else(|| "untitled".to_string(), |t| (*t).clone()),
        })
      },
    ));
  catalog
}
