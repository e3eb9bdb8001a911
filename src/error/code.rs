/// Stable, machine-readable error codes.
///
/// Every error the engine can raise belongs to exactly one code. The codes
/// are part of the embedding contract: hosts may match on them, and their
/// textual form never changes between releases. Each `Display` rendering of
/// an engine error includes its code in square brackets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Malformed source text.
    Syntax,
    /// An operator or operation was applied to operands that do not support
    /// it.
    TypeError,
    /// An argument value was of an acceptable type but outside the accepted
    /// domain.
    BadArg,
    /// A value could not be converted to the requested type.
    CastError,
    /// A property was accessed on a value whose type has no properties.
    Prop,
    /// A call was made on a value that is not callable.
    NotCallable,
    /// An undefined value was used where a defined one is required.
    NullRef,
    /// A value that cannot be deep-copied was passed to `copy`.
    CantCopy,
    /// An element could not be deleted.
    Del,
    /// A function was called with an unacceptable number of arguments.
    ArgCount,
    /// An import unit could not be located or initialized.
    BadImport,
    /// Any other runtime failure.
    General,
    /// A bracket with no matching partner.
    UnmatchedBracket,
}

impl ErrorCode {
    /// The stable textual code, e.g. `"TYPE_ERROR"`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Syntax => "SYNTAX",
            Self::TypeError => "TYPE_ERROR",
            Self::BadArg => "BAD_ARG",
            Self::CastError => "CAST_ERROR",
            Self::Prop => "PROP",
            Self::NotCallable => "NOT_CALLABLE",
            Self::NullRef => "NULL_REF",
            Self::CantCopy => "CANT_COPY",
            Self::Del => "DEL",
            Self::ArgCount => "ARG_COUNT",
            Self::BadImport => "BAD_IMPORT",
            Self::General => "GENERAL",
            Self::UnmatchedBracket => "UNMATCHED_BRACKET",
        }
    }

    /// One-line human description, for host help surfaces.
    #[must_use]
    pub const fn describe(self) -> &'static str {
        match self {
            Self::Syntax => "the source text is malformed",
            Self::TypeError => "an operation was applied to operands that do not support it",
            Self::BadArg => "an argument was outside the accepted domain",
            Self::CastError => "a value could not be converted to the requested type",
            Self::Prop => "a property was accessed on a type that has none",
            Self::NotCallable => "a call was made on a value that is not callable",
            Self::NullRef => "an undefined value was used where a defined one is required",
            Self::CantCopy => "the value cannot be deep-copied",
            Self::Del => "the element could not be deleted",
            Self::ArgCount => "a function received an unacceptable number of arguments",
            Self::BadImport => "the import unit could not be located or initialized",
            Self::General => "a runtime failure",
            Self::UnmatchedBracket => "a bracket has no matching partner",
        }
    }

    /// Every code, in a fixed order. Read-only introspection for hosts.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Syntax,
          Self::TypeError,
          Self::BadArg,
          Self::CastError,
          Self::Prop,
          Self::NotCallable,
          Self::NullRef,
          Self::CantCopy,
          Self::Del,
          Self::ArgCount,
          Self::BadImport,
          Self::General,
          Self::UnmatchedBracket]
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorCode;

    #[test]
    fn tags_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for code in ErrorCode::all() {
            assert!(seen.insert(code.tag()), "duplicate tag {}", code.tag());
        }
    }

    #[test]
    fn every_code_has_a_description() {
        for code in ErrorCode::all() {
            assert!(!code.describe().is_empty());
        }
    }
}
