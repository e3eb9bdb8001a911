/// The stable error-code namespace shared by all engine errors.
pub mod code;
/// Parsing errors.
///
/// Defines all error types that can occur during lexing and parsing of source
/// code. Parse errors include syntax mistakes, unexpected tokens, malformed
/// literals, and unmatched brackets detected before evaluation.
pub mod parse_error;
/// Runtime errors.
///
/// Contains all error types that can be raised during evaluation: type
/// mismatches, failed casts, bad arguments, unresolved symbols, failed
/// imports and the rest of the [`code::ErrorCode`] namespace.
pub mod runtime_error;

pub use code::ErrorCode;
pub use parse_error::ParseError;
pub use runtime_error::RuntimeError;

/// Either kind of engine error, as returned by whole-program entry points.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A lexing or parsing failure.
    Parse(ParseError),
    /// An evaluation failure.
    Runtime(RuntimeError),
}

impl Error {
    /// The stable error code of the underlying failure.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Parse(e) => e.code(),
            Self::Runtime(e) => e.code(),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

impl From<RuntimeError> for Error {
    fn from(e: RuntimeError) -> Self {
        Self::Runtime(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(e) => e.fmt(f),
            Self::Runtime(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(e) => Some(e),
            Self::Runtime(e) => Some(e),
        }
    }
}
