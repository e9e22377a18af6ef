//! Public macros for ergonomic argument lists.

/// Builds an [`Arguments`](crate::Arguments) list.
///
/// `position => value` supplies a positional argument, `name = value` a named
/// one. Both forms can be mixed in any order.
///
/// # Examples
///
/// ```
/// use servant::arguments;
///
/// let args = arguments![0 => String::from("report.csv"), retries = 3_u32];
/// assert!(!args.is_empty());
///
/// let none = arguments![];
/// assert!(none.is_empty());
/// ```
#[macro_export]
macro_rules! arguments {
  (@acc $args:expr ;) => {
    $args
  };

  // Named argument: arguments![name = value]
  (@acc $args:expr ; $name:ident = $value:expr $(, $($rest:tt)*)?) => {
    $crate::arguments!(@acc $args.named(stringify!($name), $value) ; $($($rest)*)?)
  };

  // Positional argument: arguments![0 => value]
  (@acc $args:expr ; $position:literal => $value:expr $(, $($rest:tt)*)?) => {
    $crate::arguments!(@acc $args.at($position, $value) ; $($($rest)*)?)
  };

  ($($rest:tt)*) => {
    $crate::arguments!(@acc $crate::Arguments::new() ; $($rest)*)
  };
}
