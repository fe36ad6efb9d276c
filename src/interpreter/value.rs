/// The tagged universe of runtime values.
///
/// Declares the `Value` enum, its conversions and truthiness rules, the
/// callable variants, and deep cloning for the `clone` built-in.
pub mod core;
/// Hashable map keys.
///
/// Map keys are restricted to the hashable scalars: numbers, strings, and
/// booleans. Numbers are wrapped in `OrderedFloat` to make them usable in a
/// `HashMap`.
pub mod key;
