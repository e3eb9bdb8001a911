use logos::Logos;

use crate::{
    error::ParseError,
    interpreter::lexer::number::{ScannedNumber, scan_number},
};

/// The numeric literal scanner.
pub mod number;

/// One interpolation span inside a string literal.
///
/// The embedded source is not parsed at lex time; it is evaluated when the
/// string itself is evaluated, and its rendering spliced back in at
/// `offset` (adjusted for the length drift of earlier splices).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterpSpan {
    /// Byte offset into the processed literal text where the span sits.
    pub offset: usize,
    /// The embedded source text, without the wrapping braces.
    pub source: String,
}

/// The payload of a string literal token: the literal text with escapes
/// resolved and interpolation spans removed, plus the spans themselves.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StringTemplate {
    /// Literal text with every `{...}` span excised.
    pub text:  String,
    /// The excised spans, in source order.
    pub spans: Vec<InterpSpan>,
}

/// Represents a lexical token in the source input.
///
/// Operator symbols mirror the operator table in
/// [`crate::interpreter::operators`]; longest-match disambiguation between
/// overlapping symbols (`?` / `?.` / `??`) is handled by the lexer itself.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(error = String)]
pub enum Token {
    /// Numeric literal: radix prefixes, `_` separators, fraction, decimal
    /// exponent, `i` suffix. The regex only anchors the scan; the real
    /// grammar lives in [`number::scan_number`], which extends the token.
    #[regex(r"[0-9]", scan_number_token)]
    #[regex(r"\.[0-9]", scan_number_token)]
    Number(ScannedNumber),
    /// String literal with interpolation spans, e.g. `"x = {x}"`.
    #[regex(r#""([^"\\]|\\.)*""#, scan_string_token)]
    Str(StringTemplate),
    /// Character literal, e.g. `'a'` or `'\n'`.
    #[regex(r"'([^'\\]|\\.)'", scan_char_token)]
    CharLit(u32),
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `while`
    #[token("while")]
    While,
    /// `do`
    #[token("do")]
    Do,
    /// `until`
    #[token("until")]
    Until,
    /// `for`
    #[token("for")]
    For,
    /// `func`
    #[token("func")]
    Func,
    /// `break`
    #[token("break")]
    Break,
    /// `continue`
    #[token("continue")]
    Continue,
    /// `return`
    #[token("return")]
    Return,
    /// `in`
    #[token("in")]
    In,
    /// Names to resolve in the runspace, such as `x` or `square`.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Symbol(String),
    /// `// Comments.`
    #[regex(r"//[^\n\r]*", logos::skip, allow_greedy = true)]
    Comment,
    /// `/* Multi line comments. */`
    #[regex(r"/\*([^*]|\*[^/])*\*/", |lex| {
        let comment      = lex.slice();
        let newlines     = comment.chars().filter(|&c| c == '\n').count();
        lex.extras.line += newlines;
        logos::Skip
    })]
    MultiLineComment,
    /// `...` (argument spread)
    #[token("...")]
    Ellipsis,
    /// `.`
    #[token(".")]
    Dot,
    /// `?.`
    #[token("?.")]
    QuestionDot,
    /// `??`
    #[token("??")]
    QuestionQuestion,
    /// `?`
    #[token("?")]
    Question,
    /// `:`
    #[token(":")]
    Colon,
    /// `!=`
    #[token("!=")]
    NotEqual,
    /// `!`
    #[token("!")]
    Bang,
    /// `~`
    #[token("~")]
    Tilde,
    /// `**`
    #[token("**")]
    DoubleStar,
    /// `*=`
    #[token("*=")]
    StarAssign,
    /// `*`
    #[token("*")]
    Star,
    /// `/=`
    #[token("/=")]
    SlashAssign,
    /// `/`
    #[token("/")]
    Slash,
    /// `%=`
    #[token("%=")]
    PercentAssign,
    /// `%`
    #[token("%")]
    Percent,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `+`
    #[token("+")]
    Plus,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `-`
    #[token("-")]
    Minus,
    /// `<<`
    #[token("<<")]
    Shl,
    /// `>>`
    #[token(">>")]
    Shr,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `>`
    #[token(">")]
    Greater,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `&&`
    #[token("&&")]
    AmpAmp,
    /// `&`
    #[token("&")]
    Amp,
    /// `^`
    #[token("^")]
    Caret,
    /// `||`
    #[token("||")]
    PipePipe,
    /// `|`
    #[token("|")]
    Pipe,
    /// `=`
    #[token("=")]
    Assign,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,
    /// `,`
    #[token(",")]
    Comma,
    /// `;`
    #[token(";")]
    Semicolon,
    /// Statement-terminating newline.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        Token::NewLine
    })]
    NewLine,
    /// Tabs and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

impl Token {
    /// Whether this token opens a bracket pair.
    #[must_use]
    pub const fn is_open_bracket(&self) -> bool {
        matches!(self, Self::LParen | Self::LBracket | Self::LBrace)
    }

    /// Whether this token closes a bracket pair.
    #[must_use]
    pub const fn is_close_bracket(&self) -> bool {
        matches!(self, Self::RParen | Self::RBracket | Self::RBrace)
    }

    /// The partner of a bracket token.
    #[must_use]
    pub const fn bracket_partner(&self) -> Option<Self> {
        match self {
            Self::LParen => Some(Self::RParen),
            Self::RParen => Some(Self::LParen),
            Self::LBracket => Some(Self::RBracket),
            Self::RBracket => Some(Self::LBracket),
            Self::LBrace => Some(Self::RBrace),
            Self::RBrace => Some(Self::LBrace),
            _ => None,
        }
    }

    /// The surface symbol of a bracket token, for error messages.
    #[must_use]
    pub const fn bracket_symbol(&self) -> &'static str {
        match self {
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            _ => "?",
        }
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number for error reporting and diagnostics.
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line: 1 }
    }
}

/// Runs the lexer over a whole source string, pairing each token with its
/// line number.
///
/// # Errors
/// Returns [`ParseError::UnknownToken`] for text no token matches and
/// [`ParseError::InvalidNumber`] for malformed numeric literals.
pub fn tokenize(source: &str) -> Result<Vec<(Token, usize)>, ParseError> {
    let mut lexer = Token::lexer_with_extras(source, LexerExtras::default());
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let line = lexer.extras.line;
        match result {
            Ok(token) => tokens.push((token, line)),
            Err(message) if message.is_empty() => {
                return Err(ParseError::UnknownToken { slice: lexer.slice().to_string(),
                                                      line });
            },
            Err(message) => {
                return Err(ParseError::InvalidNumber { details: message,
                                                       line });
            },
        }
    }
    Ok(tokens)
}

/// Resolves the partner of the bracket at `index` in a single pass, without
/// a bracket stack: a depth counter over tokens of the same pair suffices
/// because the parser has not yet imposed any structure.
///
/// Scans forward from an opening bracket and backward from a closing one.
///
/// # Errors
/// [`ParseError::UnexpectedToken`] when `index` does not hold a bracket;
/// [`ParseError::UnmatchedBracket`] when the stream ends first.
///
/// # Example
/// ```
/// use argand::interpreter::lexer::{find_matching_bracket, tokenize};
///
/// let tokens = tokenize("f(a, g(b))").unwrap();
/// assert_eq!(find_matching_bracket(&tokens, 1).unwrap(), 8);
/// assert_eq!(find_matching_bracket(&tokens, 8).unwrap(), 1);
/// ```
pub fn find_matching_bracket(tokens: &[(Token, usize)], index: usize) -> Result<usize, ParseError> {
    let Some((bracket, line)) = tokens.get(index) else {
        return Err(ParseError::UnexpectedEndOfInput { line: 0 });
    };
    let Some(partner) = bracket.bracket_partner() else {
        return Err(ParseError::UnexpectedToken { token: format!("Expected a bracket, found {bracket:?}"),
                                                 line:  *line, });
    };

    let forward = bracket.is_open_bracket();
    let mut depth = 0usize;
    let mut pos = index;
    loop {
        let current = &tokens[pos].0;
        if *current == *bracket {
            depth += 1;
        } else if *current == partner {
            depth -= 1;
            if depth == 0 {
                return Ok(pos);
            }
        }
        if forward {
            pos += 1;
            if pos >= tokens.len() {
                break;
            }
        } else {
            if pos == 0 {
                break;
            }
            pos -= 1;
        }
    }
    Err(ParseError::UnmatchedBracket { bracket: bracket.bracket_symbol().to_string(),
                                       line:    *line, })
}

/// Validates that every bracket in the stream has a partner of the right
/// kind, reporting the first violation with its line.
///
/// # Errors
/// [`ParseError::UnmatchedBracket`] naming the offending bracket.
pub fn check_brackets(tokens: &[(Token, usize)]) -> Result<(), ParseError> {
    let mut open: Vec<(&Token, usize)> = Vec::new();
    for (token, line) in tokens {
        if token.is_open_bracket() {
            open.push((token, *line));
        } else if token.is_close_bracket() {
            match open.pop() {
                Some((opener, _)) if opener.bracket_partner().as_ref() == Some(token) => {},
                _ => {
                    return Err(ParseError::UnmatchedBracket { bracket: token.bracket_symbol().to_string(),
                                                              line:    *line, });
                },
            }
        }
    }
    if let Some((opener, line)) = open.pop() {
        return Err(ParseError::UnmatchedBracket { bracket: opener.bracket_symbol().to_string(),
                                                  line });
    }
    Ok(())
}

/// Extends the regex-anchored number token to the full literal via
/// [`scan_number`], bumping the lexer past what the scanner consumed.
fn scan_number_token(lex: &mut logos::Lexer<Token>) -> Result<ScannedNumber, String> {
    let anchored = lex.slice().len();
    let full: String = format!("{}{}", lex.slice(), lex.remainder());
    let (number, consumed) = scan_number(&full)?;
    lex.bump(consumed - anchored);
    Ok(number)
}

/// Resolves escapes and extracts `{...}` interpolation spans from a string
/// literal.
fn scan_string_token(lex: &mut logos::Lexer<Token>) -> Result<StringTemplate, String> {
    let slice = lex.slice();
    lex.extras.line += slice.chars().filter(|&c| c == '\n').count();

    let inner = &slice[1..slice.len() - 1];
    let mut template = StringTemplate::default();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next().ok_or_else(|| "dangling escape".to_string())?;
                template.text.push(resolve_escape(escaped));
            },
            '{' => {
                let mut depth = 1usize;
                let mut source = String::new();
                for inner_char in chars.by_ref() {
                    match inner_char {
                        '{' => depth += 1,
                        '}' => {
                            depth -= 1;
                            if depth == 0 {
                                break;
                            }
                        },
                        _ => {},
                    }
                    source.push(inner_char);
                }
                if depth != 0 {
                    return Err("unterminated '{' interpolation span in string".to_string());
                }
                template.spans.push(InterpSpan { offset: template.text.len(),
                                                 source });
            },
            _ => template.text.push(c),
        }
    }
    Ok(template)
}

fn scan_char_token(lex: &logos::Lexer<Token>) -> Option<u32> {
    let slice = lex.slice();
    let inner = &slice[1..slice.len() - 1];
    let mut chars = inner.chars();
    let c = match chars.next()? {
        '\\' => resolve_escape(chars.next()?),
        c => c,
    };
    Some(c as u32)
}

const fn resolve_escape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        '0' => '\0',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::{Token, check_brackets, tokenize};

    #[test]
    fn lines_are_tracked() {
        let tokens = tokenize("1\n2\n3").unwrap();
        let lines: Vec<usize> = tokens.iter()
                                      .filter(|(t, _)| !matches!(t, Token::NewLine))
                                      .map(|(_, l)| *l)
                                      .collect();
        assert_eq!(lines, vec![1, 2, 3]);
    }

    #[test]
    fn operators_longest_match() {
        let tokens = tokenize("a ?. b ?? c ? d : e").unwrap();
        let kinds: Vec<&Token> = tokens.iter().map(|(t, _)| t).collect();
        assert!(matches!(kinds[1], Token::QuestionDot));
        assert!(matches!(kinds[3], Token::QuestionQuestion));
        assert!(matches!(kinds[5], Token::Question));
    }

    #[test]
    fn string_interpolation_spans() {
        let tokens = tokenize(r#""x = {x + 1}!""#).unwrap();
        let Token::Str(template) = &tokens[0].0 else {
            panic!("expected a string token");
        };
        assert_eq!(template.text, "x = !");
        assert_eq!(template.spans.len(), 1);
        assert_eq!(template.spans[0].offset, 4);
        assert_eq!(template.spans[0].source, "x + 1");
    }

    #[test]
    fn escaped_brace_is_literal() {
        let tokens = tokenize(r#""\{not a span}""#).unwrap();
        let Token::Str(template) = &tokens[0].0 else {
            panic!("expected a string token");
        };
        assert_eq!(template.text, "{not a span}");
        assert!(template.spans.is_empty());
    }

    #[test]
    fn malformed_number_is_rejected() {
        assert!(tokenize("1__0").is_err());
    }

    #[test]
    fn keywords_beat_symbols() {
        let tokens = tokenize("integer in intervals").unwrap();
        assert!(matches!(tokens[0].0, Token::Symbol(_)));
        assert!(matches!(tokens[1].0, Token::In));
        assert!(matches!(tokens[2].0, Token::Symbol(_)));
    }

    #[test]
    fn bracket_validation() {
        assert!(check_brackets(&tokenize("(a + [b])").unwrap()).is_ok());
        assert!(check_brackets(&tokenize("(a + [b)]").unwrap()).is_err());
        assert!(check_brackets(&tokenize("f(1").unwrap()).is_err());
    }
}
