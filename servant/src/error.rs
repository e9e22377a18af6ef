use thiserror::Error;

/// The main error type for the `servant` container.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
  #[error("Unknown service key: {0}")]
  UnknownService(String),

  #[error("Interface `{0}` is not wired and is not an instantiable type")]
  UnsupportedInterface(&'static str),

  #[error("Type `{given}` is not compatible with the service interface `{interface}`")]
  IncompatibleType {
    given: &'static str,
    interface: &'static str,
  },

  #[error("Invalid initializer for `{interface}`: {reason}")]
  InvalidInitializer {
    interface: &'static str,
    reason: String,
  },

  #[error("Type `{ty}` has no method named `{method}`")]
  UnknownMethod { ty: &'static str, method: String },

  #[error("Type `{0}` is not known to the catalog")]
  UnknownType(&'static str),

  #[error("Type `{0}` can not be instantiated")]
  NotInstantiable(&'static str),

  #[error("Missing argument `{name}` at position {position}")]
  MissingArgument { position: usize, name: String },

  #[error("Argument at position {position} is a `{found}`, expected `{expected}`")]
  ArgumentType {
    position: usize,
    expected: &'static str,
    found: &'static str,
  },

  #[error("Instance of `{from}` can not be viewed as `{to}`")]
  Cast {
    from: &'static str,
    to: &'static str,
  },

  #[error("Construction failed: {0}")]
  Construction(String),

  #[error("Resolution of `{0}` exceeded the configured depth limit of {1}")]
  RecursionLimit(&'static str, usize),
}

/// A specialized `Result` type for `servant` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;
