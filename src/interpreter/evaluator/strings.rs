/// The string-method registry and its dispatch table.
pub mod core;
/// The `template` method: `${path.method(args)}` interpolation.
pub mod template;
