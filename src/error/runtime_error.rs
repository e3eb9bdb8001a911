use crate::error::code::ErrorCode;

/// Errors produced while evaluating a parsed program.
///
/// Variants map one-to-one onto the stable [`ErrorCode`] namespace via
/// [`RuntimeError::code`]. All variants except [`RuntimeError::Context`]
/// carry the line of the expression that failed; `Context` wraps another
/// runtime error with a call-site note, producing a short chain in the
/// `Display` rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// An operator applied to operand types that do not support it.
    Type {
        /// What was attempted, e.g. `cannot apply '+' to set and real`.
        details: String,
        /// Line of the expression.
        line:    usize,
    },
    /// An argument of acceptable type but unacceptable value.
    BadArgument {
        /// What was wrong with the value.
        details: String,
        /// Line of the call.
        line:    usize,
    },
    /// A failed type conversion.
    Cast {
        /// Type name of the source value.
        from:  String,
        /// Requested target type name.
        to:    String,
        /// Display rendering of the value.
        value: String,
        /// Line of the cast.
        line:  usize,
    },
    /// Property access on a type without properties.
    Property {
        /// Type name of the accessed value.
        type_name: String,
        /// The property that was requested.
        property:  String,
        /// Line of the access.
        line:      usize,
    },
    /// Call syntax applied to a value that is not a function or map.
    NotCallable {
        /// Type name of the called value.
        type_name: String,
        /// Line of the call.
        line:      usize,
    },
    /// An undefined value where a defined one is required; also raised for
    /// unresolved symbols.
    NullReference {
        /// What was undefined.
        details: String,
        /// Line of the use.
        line:    usize,
    },
    /// `copy` applied to a value that cannot be deep-copied.
    CannotCopy {
        /// Type name of the value, or a cycle note.
        details: String,
        /// Line of the call.
        line:    usize,
    },
    /// A deletion that the target does not support.
    Delete {
        /// What could not be deleted.
        details: String,
        /// Line of the deletion.
        line:    usize,
    },
    /// Wrong number of arguments in a call.
    ArgumentCount {
        /// Name of the called function.
        name:     String,
        /// Acceptable count, rendered for the user (`2` or `1..=2`).
        expected: String,
        /// Number of arguments received after spread expansion.
        received: usize,
        /// Line of the call.
        line:     usize,
    },
    /// An import unit that could not be located or initialized.
    BadImport {
        /// Name of the unit.
        name:    String,
        /// Why it failed.
        details: String,
        /// Line of the import.
        line:    usize,
    },
    /// Anything else: host failures, malformed interpolation spans,
    /// assignment to constants.
    General {
        /// Description of the failure.
        details: String,
        /// Line of the expression.
        line:    usize,
    },
    /// Another runtime error wrapped with a call-site note.
    Context {
        /// The note, e.g. `in function 'f' called on line 3`.
        context: String,
        /// The underlying error.
        source:  Box<RuntimeError>,
    },
}

impl RuntimeError {
    /// The stable error code this variant belongs to.
    ///
    /// A [`RuntimeError::Context`] wrapper reports the code of the error it
    /// wraps.
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Type { .. } => ErrorCode::TypeError,
            Self::BadArgument { .. } => ErrorCode::BadArg,
            Self::Cast { .. } => ErrorCode::CastError,
            Self::Property { .. } => ErrorCode::Prop,
            Self::NotCallable { .. } => ErrorCode::NotCallable,
            Self::NullReference { .. } => ErrorCode::NullRef,
            Self::CannotCopy { .. } => ErrorCode::CantCopy,
            Self::Delete { .. } => ErrorCode::Del,
            Self::ArgumentCount { .. } => ErrorCode::ArgCount,
            Self::BadImport { .. } => ErrorCode::BadImport,
            Self::General { .. } => ErrorCode::General,
            Self::Context { source, .. } => source.code(),
        }
    }

    /// Wraps `self` with a call-site note.
    #[must_use]
    pub fn with_context(self, context: String) -> Self {
        Self::Context { context,
                        source: Box::new(self) }
    }
}

impl std::fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code();
        match self {
            Self::Type { details, line } => {
                write!(f, "Error on line {line}: [{code}] {details}")
            },
            Self::BadArgument { details, line } => {
                write!(f, "Error on line {line}: [{code}] {details}")
            },
            Self::Cast { from, to, value, line } => {
                write!(f, "Error on line {line}: [{code}] Cannot cast {from} '{value}' to {to}")
            },
            Self::Property { type_name, property, line } => {
                write!(f, "Error on line {line}: [{code}] Type {type_name} has no property '{property}'")
            },
            Self::NotCallable { type_name, line } => {
                write!(f, "Error on line {line}: [{code}] Value of type {type_name} is not callable")
            },
            Self::NullReference { details, line } => {
                write!(f, "Error on line {line}: [{code}] {details}")
            },
            Self::CannotCopy { details, line } => {
                write!(f, "Error on line {line}: [{code}] Cannot copy {details}")
            },
            Self::Delete { details, line } => {
                write!(f, "Error on line {line}: [{code}] Cannot delete {details}")
            },
            Self::ArgumentCount { name, expected, received, line } => {
                write!(f,
                       "Error on line {line}: [{code}] Function '{name}' expects {expected} argument(s), received {received}")
            },
            Self::BadImport { name, details, line } => {
                write!(f, "Error on line {line}: [{code}] Cannot import '{name}': {details}")
            },
            Self::General { details, line } => {
                write!(f, "Error on line {line}: [{code}] {details}")
            },
            Self::Context { context, source } => {
                write!(f, "{source}\n  {context}")
            },
        }
    }
}

impl std::error::Error for RuntimeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Context { source, .. } => Some(source),
            _ => None,
        }
    }
}
