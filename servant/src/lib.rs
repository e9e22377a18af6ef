//! # Servant
//!
//! An autowiring Inversion of Control (IoC) container for Rust.
//!
//! Services are described by recipes: which concrete type (or factory) to use
//! for an interface, an optional initializer to run afterwards, and whether the
//! result is a singleton. When a constructor or factory needs another service,
//! the container resolves it from the parameter's declared type.
//!
//! ## Core Concepts
//!
//! - **Catalog**: Rust has no runtime reflection, so types are declared once in a
//!   [`TypeCatalog`]: their constructor signature, the interfaces they implement
//!   and the methods the container may call.
//! - **Named services**: `compose` registers a recipe under a string key;
//!   resolved with `get`.
//! - **Wired interfaces**: `wire` registers a recipe for an interface; used by
//!   `make` and by autowiring.
//! - **Forks**: `fork` creates a child scope that resolves unknown keys through
//!   its parent and can override anything locally.
//!
//! ## Quick Start
//!
//! ```
//! use servant::{arguments, Callable, ClassDef, Container, Signature, TypeCatalog, TypeKey};
//! use std::sync::Arc;
//!
//! trait Clock: Send + Sync {
//!   fn now(&self) -> u64;
//! }
//!
//! struct FixedClock;
//! impl Clock for FixedClock {
//!   fn now(&self) -> u64 {
//!     42
//!   }
//! }
//!
//! struct Report {
//!   clock: Arc<dyn Clock>,
//!   title: String,
//! }
//!
//! let catalog = Arc::new(TypeCatalog::new());
//! catalog
//!   .register(
//!     ClassDef::<FixedClock>::new()
//!       .implicit_constructor(|| FixedClock)
//!       .implements::<dyn Clock>(|c| c as Arc<dyn Clock>),
//!   )
//!   .register(ClassDef::<Report>::new().constructor(
//!     Signature::new().service::<dyn Clock>("clock").value::<String>("title"),
//!     |args| {
//!       Ok(Report {
//!         clock: args.service::<dyn Clock>(0)?,
//!         title: (*args.arg::<String>(1)?).clone(),
//!       })
//!     },
//!   ));
//!
//! let container = Container::new(catalog);
//! container
//!   .wire(TypeKey::of::<dyn Clock>())
//!   .with_concrete(TypeKey::of::<FixedClock>())
//!   .unwrap()
//!   .singleton(true);
//!
//! // `clock` is autowired, `title` is supplied by name.
//! let report = container
//!   .make_as::<Report>(arguments![title = String::from("daily")])
//!   .unwrap();
//! assert_eq!(report.clock.now(), 42);
//! assert_eq!(report.title, "daily");
//! ```

mod args;
mod callable;
mod catalog;
mod config;
mod container;
mod core;
mod error;
mod introspection;
mod macros;
mod recipe;
mod reflect;

pub use args::{Arguments, CallArgs};
pub use callable::{Callable, CallableId, DeclaredType, ParameterDescriptor, Signature};
pub use catalog::{ClassDef, TypeCatalog};
pub use config::ContainerConfig;
pub use container::Container;
pub use core::{Instance, TypeKey};
pub use error::{Error, Result};
pub use introspection::{IntrospectionCache, Parameters};
pub use recipe::{Recipe, RecipeId};
pub use reflect::{Compatibility, Construction, Introspector, Reflection};
