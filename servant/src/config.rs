//! Container settings.

use serde::Deserialize;

/// Settings of a [`crate::Container`]. Forks inherit their parent's settings.
///
/// Deserializable so it can live in an application's configuration file;
/// every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
  /// Maximum nesting of autowired resolutions. `None` means unbounded, in which
  /// case a dependency cycle recurses until the stack is exhausted.
  pub max_resolution_depth: Option<usize>,

  /// Lets `make` on a fork fall back to interfaces wired on its ancestors.
  /// Off by default: interface wiring is local to each container.
  pub inherit_wiring: bool,
}

impl ContainerConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
    self.max_resolution_depth = Some(depth);
    self
  }

  pub fn with_inherited_wiring(mut self, inherit: bool) -> Self {
    self.inherit_wiring = inherit;
    self
  }
}
