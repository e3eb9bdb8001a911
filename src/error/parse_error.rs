use crate::error::code::ErrorCode;

/// Errors produced while lexing or parsing source text.
///
/// Every variant carries the source line on which it was detected so the
/// host can point the user at the offending statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// A token that does not fit the grammar at its position.
    UnexpectedToken {
        /// Description of what was found and, where helpful, what was
        /// expected instead.
        token: String,
        /// Line on which the token appeared.
        line:  usize,
    },
    /// The token stream ended in the middle of a construct.
    UnexpectedEndOfInput {
        /// Line of the last token seen.
        line: usize,
    },
    /// Text the lexer could not turn into any token.
    UnknownToken {
        /// The offending source fragment.
        slice: String,
        /// Line on which it appeared.
        line:  usize,
    },
    /// A malformed numeric literal (misplaced separator, empty exponent,
    /// digit invalid for the radix).
    InvalidNumber {
        /// What was wrong with the literal.
        details: String,
        /// Line of the literal.
        line:    usize,
    },
    /// A bracket with no matching partner.
    UnmatchedBracket {
        /// The bracket symbol, e.g. `"("`.
        bracket: String,
        /// Line of the unmatched bracket.
        line:    usize,
    },
    /// `break` or `continue` outside any loop body.
    BreakOutsideLoop {
        /// The keyword used.
        keyword: String,
        /// Line of the keyword.
        line:    usize,
    },
    /// `return` outside any function body.
    ReturnOutsideFunction {
        /// Line of the keyword.
        line: usize,
    },
    /// A function parameter that is not `name` or `name: type`.
    InvalidParameter {
        /// What was wrong with the parameter.
        details: String,
        /// Line of the parameter list.
        line:    usize,
    },
}

impl ParseError {
    /// The stable error code this variant belongs to.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnmatchedBracket { .. } => ErrorCode::UnmatchedBracket,
            _ => ErrorCode::Syntax,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let code = self.code();
        match self {
            Self::UnexpectedToken { token, line } => {
                write!(f, "Error on line {line}: [{code}] Unexpected token: {token}")
            },
            Self::UnexpectedEndOfInput { line } => {
                write!(f, "Error on line {line}: [{code}] Unexpected end of input")
            },
            Self::UnknownToken { slice, line } => {
                write!(f, "Error on line {line}: [{code}] Unrecognized text '{slice}'")
            },
            Self::InvalidNumber { details, line } => {
                write!(f, "Error on line {line}: [{code}] Invalid numeric literal: {details}")
            },
            Self::UnmatchedBracket { bracket, line } => {
                write!(f, "Error on line {line}: [{code}] Bracket '{bracket}' has no matching partner")
            },
            Self::BreakOutsideLoop { keyword, line } => {
                write!(f, "Error on line {line}: [{code}] '{keyword}' outside of a loop body")
            },
            Self::ReturnOutsideFunction { line } => {
                write!(f, "Error on line {line}: [{code}] 'return' outside of a function body")
            },
            Self::InvalidParameter { details, line } => {
                write!(f, "Error on line {line}: [{code}] Invalid parameter: {details}")
            },
        }
    }
}

impl std::error::Error for ParseError {}
