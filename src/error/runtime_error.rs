#[derive(Debug)]
/// Represents all errors that can occur during evaluation and runtime.
pub enum RuntimeError {
    /// Tried to read or assign an undefined variable.
    UndefinedVariable {
        /// The name of the variable.
        name: String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to call a value that is not callable.
    NotCallable {
        /// The source line where the error occurred.
        line: usize,
    },
    /// The wrong number of arguments was supplied to a callable.
    ArityMismatch {
        /// The number of arguments expected.
        expected: usize,
        /// The number of arguments found.
        found:    usize,
        /// The source line where the error occurred.
        line:     usize,
    },
    /// A value had an unexpected or incompatible type.
    TypeError {
        /// Details about the type mismatch.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A numeric value was expected, but not found.
    ExpectedNumber {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A string value was expected, but not found.
    ExpectedString {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A selector index had a fractional part.
    FractionalIndex {
        /// The source line where the error occurred.
        line: usize,
    },
    /// A number was too large to be used where an integer was required.
    NumberTooLarge {
        /// The source line where the error occurred.
        line: usize,
    },
    /// Tried to access an array element outside the allowed bounds.
    IndexOutOfBounds {
        /// The length of the array.
        len:   usize,
        /// The index that was actually requested.
        found: i64,
        /// The source line where the error occurred.
        line:  usize,
    },
    /// A value cannot be used as a map key.
    InvalidKey {
        /// Details about why the key is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// A nested assignment descended through a key that does not exist.
    MissingKey {
        /// The missing key.
        key:  String,
        /// The source line where the error occurred.
        line: usize,
    },
    /// A selector path could not be walked.
    BadSelectorPath {
        /// Details describing the bad path.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
    /// An argument was invalid or out of range.
    InvalidArgument {
        /// Details about why the argument is invalid.
        details: String,
        /// The source line where the error occurred.
        line:    usize,
    },
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UndefinedVariable { name, line } => {
                write!(f, "[line {line}] Error: Undefined variable '{name}'.")
            },
            Self::NotCallable { line } => {
                write!(f, "[line {line}] Error: Can only call functions and methods.")
            },
            Self::ArityMismatch { expected, found, line } => {
                write!(f, "[line {line}] Error: Expected {expected} arguments but got {found}.")
            },
            Self::TypeError { details, line } => {
                write!(f, "[line {line}] Error: Type error: {details}.")
            },
            Self::ExpectedNumber { line } => write!(f, "[line {line}] Error: Expected number."),
            Self::ExpectedString { line } => write!(f, "[line {line}] Error: Expected string."),
            Self::FractionalIndex { line } => {
                write!(f, "[line {line}] Error: Index must be an integer.")
            },
            Self::NumberTooLarge { line } => {
                write!(f, "[line {line}] Error: Number is too large.")
            },
            Self::IndexOutOfBounds { len, found, line } => {
                write!(
                    f,
                    "[line {line}] Error: Index {found} out of bounds for array of length {len}."
                )
            },
            Self::InvalidKey { details, line } => {
                write!(f, "[line {line}] Error: Invalid map key: {details}.")
            },
            Self::MissingKey { key, line } => {
                write!(f, "[line {line}] Error: Key '{key}' not found.")
            },
            Self::BadSelectorPath { details, line } => {
                write!(f, "[line {line}] Error: Bad selector path: {details}.")
            },
            Self::InvalidArgument { details, line } => {
                write!(f, "[line {line}] Error: Invalid argument: {details}.")
            },
        }
    }
}

impl std::error::Error for RuntimeError {}
