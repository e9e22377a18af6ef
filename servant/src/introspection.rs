//! Memoization of introspection results.

use crate::callable::{Callable, CallableId, ParameterDescriptor};
use crate::core::TypeKey;
use crate::error::Result;
use crate::reflect::Introspector;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// A shared, ordered parameter list.
pub type Parameters = Arc<[ParameterDescriptor]>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CacheKey {
  Callable(CallableId),
  Constructor(TypeKey),
  Method(TypeKey, String),
}

/// Caches what an [`Introspector`] reports, keyed by callable identity, by
/// type identity, or by type and method name.
///
/// Each key is introspected at most once per cache, also when several threads
/// ask at the same time. Failures are not cached. Entries live as long as the
/// cache does. The introspector must not call back into the cache.
pub struct IntrospectionCache {
  introspector: Arc<dyn Introspector>,
  entries: DashMap<CacheKey, Option<Parameters>>,
}

impl IntrospectionCache {
  pub fn new(introspector: Arc<dyn Introspector>) -> Self {
    Self {
      introspector,
      entries: DashMap::new(),
    }
  }

  pub fn describe_callable(&self, callable: &Callable) -> Parameters {
    let described = self.dispense(CacheKey::Callable(callable.id()), || {
      Ok(Some(self.introspector.describe_callable(callable)))
    });
    // The callable arm never fails and never reports an absent parameter list.
    match described {
      Ok(Some(parameters)) => parameters,
      _ => Arc::from(Vec::new()),
    }
  }

  /// `Ok(None)` when the type has no explicit constructor.
  pub fn describe_constructor(&self, ty: &TypeKey) -> Result<Option<Parameters>> {
    self.dispense(CacheKey::Constructor(*ty), || {
      self.introspector.describe_constructor(ty)
    })
  }

  pub fn describe_method(&self, ty: &TypeKey, method: &str) -> Result<Parameters> {
    let described = self.dispense(CacheKey::Method(*ty, method.to_owned()), || {
      self.introspector.describe_method(ty, method).map(Some)
    })?;
    Ok(described.unwrap_or_else(|| Arc::from(Vec::new())))
  }

  /// Number of cached entries.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  fn dispense(
    &self,
    key: CacheKey,
    describe: impl FnOnce() -> Result<Option<Vec<ParameterDescriptor>>>,
  ) -> Result<Option<Parameters>> {
    if let Some(hit) = self.entries.get(&key) {
      return Ok(hit.value().clone());
    }

    match self.entries.entry(key) {
      Entry::Occupied(hit) => Ok(hit.get().clone()),
      Entry::Vacant(slot) => {
        tracing::trace!(key = ?slot.key(), "introspection cache miss");
        let described: Option<Parameters> = describe()?.map(Arc::from);
        slot.insert(described.clone());
        Ok(described)
      }
    }
  }
}
