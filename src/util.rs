/// Safe numeric conversion helpers.
///
/// Conversion routines between `f64` and machine integers used for array
/// indexing, sizes, and lengths. All conversions are checked so that
/// precision loss or range overflow surfaces as a runtime error instead of
/// silent truncation.
pub mod num;
