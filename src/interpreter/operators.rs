use std::sync::LazyLock;

use crate::{
    ast::{BinaryOperator, UnaryOperator},
    interpreter::lexer::Token,
};

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    /// Left-to-right: `a - b - c` is `(a - b) - c`.
    Left,
    /// Right-to-left: `a ** b ** c` is `a ** (b ** c)`.
    Right,
}

/// One entry of the operator table.
///
/// The table is the single source of truth for operator metadata: the lexer
/// mirrors the symbols, the parser reads precedence and associativity from
/// here, and hosts may list the table for help surfaces via [`all`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    /// Surface symbol, e.g. `"**"`. Hidden operators use bracket notation.
    pub symbol:      &'static str,
    /// Stable internal name, e.g. `"pow"`.
    pub name:        &'static str,
    /// Binding strength; higher binds tighter.
    pub precedence:  u8,
    /// Grouping for chains at equal precedence.
    pub assoc:       Assoc,
    /// Operand count of the primary (infix) form.
    pub arity:       u8,
    /// Name of the unary variant selected in prefix position, if any.
    pub unary_name:  Option<&'static str>,
    /// Whether the parser constructs this operator itself (it cannot be
    /// typed as an infix symbol).
    pub hidden:      bool,
    /// One-line description for help surfaces.
    pub description: &'static str,
    /// Usage sketch, e.g. `"a ** b"`.
    pub syntax:      &'static str,
}

/// Precedence of the ternary `?:`; the parser builds ternaries itself,
/// so this level lives outside the table lookup.
pub const TERNARY_PRECEDENCE: u8 = 4;
/// Precedence of the comma operator; argument and element lists parse one
/// notch above it so `,` separates rather than combines.
pub const COMMA_PRECEDENCE: u8 = 1;

/// The operator table, ordered longest-symbol-first so that symbol lookup
/// by prefix agrees with the lexer's longest-match rule.
static TABLE: LazyLock<Vec<Descriptor>> = LazyLock::new(|| {
    let mut table = vec![
        entry(".", "access", 20, Assoc::Left, 2, None, false,
              "Member access", "a.b"),
        entry("?.", "optional_access", 20, Assoc::Left, 2, None, false,
              "Member access, undefined when the object is undefined", "a?.b"),
        entry("[]", "computed_access", 20, Assoc::Left, 2, None, true,
              "Computed member access", "a[b]"),
        entry("()", "call", 20, Assoc::Left, 1, None, true,
              "Function call", "f(...)"),
        entry("!", "not", 17, Assoc::Right, 1, Some("not"), false,
              "Logical not", "!a"),
        entry("~", "bitwise_not", 17, Assoc::Right, 1, Some("bitwise_not"), false,
              "Bitwise not", "~a"),
        entry("**", "pow", 16, Assoc::Right, 2, None, false,
              "Exponentiation", "a ** b"),
        entry(":", "seq", 16, Assoc::Right, 2, None, false,
              "Integer sequence, exclusive of the endpoint", "a : b"),
        entry("*", "mul", 15, Assoc::Left, 2, None, false,
              "Multiplication; repetition; set intersection", "a * b"),
        entry("/", "div", 15, Assoc::Left, 2, None, false,
              "Division", "a / b"),
        entry("%", "modulo", 15, Assoc::Left, 2, None, false,
              "Remainder", "a % b"),
        entry("+", "add", 14, Assoc::Left, 2, Some("unary_plus"), false,
              "Addition; concatenation; set union", "a + b"),
        entry("-", "sub", 14, Assoc::Left, 2, Some("neg"), false,
              "Subtraction", "a - b"),
        entry("<<", "shl", 13, Assoc::Left, 2, None, false,
              "Bitwise left shift", "a << b"),
        entry(">>", "shr", 13, Assoc::Left, 2, None, false,
              "Bitwise right shift", "a >> b"),
        entry("<=", "le", 12, Assoc::Left, 2, None, false,
              "Less than or equal", "a <= b"),
        entry("<", "lt", 12, Assoc::Left, 2, None, false,
              "Less than", "a < b"),
        entry(">=", "ge", 12, Assoc::Left, 2, None, false,
              "Greater than or equal", "a >= b"),
        entry(">", "gt", 12, Assoc::Left, 2, None, false,
              "Greater than", "a > b"),
        entry("in", "membership", 12, Assoc::Left, 2, None, false,
              "Membership test", "a in b"),
        entry("==", "eq", 11, Assoc::Left, 2, None, false,
              "Equality", "a == b"),
        entry("!=", "ne", 11, Assoc::Left, 2, None, false,
              "Inequality", "a != b"),
        entry("&", "bitwise_and", 10, Assoc::Left, 2, None, false,
              "Bitwise and", "a & b"),
        entry("^", "bitwise_xor", 9, Assoc::Left, 2, None, false,
              "Bitwise xor", "a ^ b"),
        entry("|", "bitwise_or", 8, Assoc::Left, 2, None, false,
              "Bitwise or", "a | b"),
        entry("&&", "and", 7, Assoc::Left, 2, None, false,
              "Logical and, short-circuiting", "a && b"),
        entry("||", "or", 6, Assoc::Left, 2, None, false,
              "Logical or, short-circuiting", "a || b"),
        entry("??", "nullish", 5, Assoc::Left, 2, None, false,
              "Right operand when the left is undefined", "a ?? b"),
        entry("?:", "ternary", 4, Assoc::Right, 3, None, true,
              "Conditional choice", "cond ? a : b"),
        entry("=", "assign", 3, Assoc::Right, 2, None, false,
              "Assignment", "lvalue = b"),
        entry("+=", "add_assign", 3, Assoc::Right, 2, None, false,
              "Compound addition", "lvalue += b"),
        entry("-=", "sub_assign", 3, Assoc::Right, 2, None, false,
              "Compound subtraction", "lvalue -= b"),
        entry("*=", "mul_assign", 3, Assoc::Right, 2, None, false,
              "Compound multiplication", "lvalue *= b"),
        entry("/=", "div_assign", 3, Assoc::Right, 2, None, false,
              "Compound division", "lvalue /= b"),
        entry("%=", "mod_assign", 3, Assoc::Right, 2, None, false,
              "Compound remainder", "lvalue %= b"),
        entry(",", "comma", 1, Assoc::Left, 2, None, false,
              "Evaluate both, keep the right", "a, b"),
    ];
    table.sort_by(|a, b| b.symbol.len().cmp(&a.symbol.len()));
    table
});

#[allow(clippy::too_many_arguments)]
const fn entry(symbol: &'static str,
               name: &'static str,
               precedence: u8,
               assoc: Assoc,
               arity: u8,
               unary_name: Option<&'static str>,
               hidden: bool,
               description: &'static str,
               syntax: &'static str)
               -> Descriptor {
    Descriptor { symbol,
                 name,
                 precedence,
                 assoc,
                 arity,
                 unary_name,
                 hidden,
                 description,
                 syntax }
}

/// The whole table, longest symbol first. Read-only introspection.
#[must_use]
pub fn all() -> &'static [Descriptor] {
    &TABLE
}

/// Looks up the descriptor of a surface symbol.
#[must_use]
pub fn find(symbol: &str) -> Option<&'static Descriptor> {
    TABLE.iter().find(|d| d.symbol == symbol)
}

/// Maps an operator token to its descriptor and the [`BinaryOperator`] the
/// evaluator dispatches on. `None` for tokens that are not infix operators.
#[must_use]
pub fn binary_for_token(token: &Token) -> Option<(&'static Descriptor, BinaryOperator)> {
    use BinaryOperator as Op;
    let (symbol, op) = match token {
        Token::DoubleStar => ("**", Op::Pow),
        Token::Colon => (":", Op::Seq),
        Token::Star => ("*", Op::Mul),
        Token::Slash => ("/", Op::Div),
        Token::Percent => ("%", Op::Mod),
        Token::Plus => ("+", Op::Add),
        Token::Minus => ("-", Op::Sub),
        Token::Shl => ("<<", Op::Shl),
        Token::Shr => (">>", Op::Shr),
        Token::LessEqual => ("<=", Op::Le),
        Token::Less => ("<", Op::Lt),
        Token::GreaterEqual => (">=", Op::Ge),
        Token::Greater => (">", Op::Gt),
        Token::In => ("in", Op::In),
        Token::EqualEqual => ("==", Op::Eq),
        Token::NotEqual => ("!=", Op::Ne),
        Token::Amp => ("&", Op::BitAnd),
        Token::Caret => ("^", Op::BitXor),
        Token::Pipe => ("|", Op::BitOr),
        Token::AmpAmp => ("&&", Op::And),
        Token::PipePipe => ("||", Op::Or),
        Token::QuestionQuestion => ("??", Op::Nullish),
        Token::Assign => ("=", Op::Assign),
        Token::PlusAssign => ("+=", Op::AddAssign),
        Token::MinusAssign => ("-=", Op::SubAssign),
        Token::StarAssign => ("*=", Op::MulAssign),
        Token::SlashAssign => ("/=", Op::DivAssign),
        Token::PercentAssign => ("%=", Op::ModAssign),
        Token::Comma => (",", Op::Comma),
        _ => return None,
    };
    find(symbol).map(|d| (d, op))
}

/// Maps a token in prefix position to its unary operator, if the table
/// declares a unary variant (or the token is unary-only).
#[must_use]
pub const fn unary_for_token(token: &Token) -> Option<UnaryOperator> {
    match token {
        Token::Bang => Some(UnaryOperator::Not),
        Token::Tilde => Some(UnaryOperator::BitNot),
        Token::Plus => Some(UnaryOperator::Plus),
        Token::Minus => Some(UnaryOperator::Neg),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{Assoc, all, binary_for_token, find};
    use crate::interpreter::lexer::Token;

    #[test]
    fn table_is_longest_first() {
        let lengths: Vec<usize> = all().iter().map(|d| d.symbol.len()).collect();
        let mut sorted = lengths.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(lengths, sorted);
    }

    #[test]
    fn symbols_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for descriptor in all() {
            assert!(seen.insert(descriptor.symbol), "duplicate {}", descriptor.symbol);
        }
    }

    #[test]
    fn precedence_shape() {
        assert!(find("**").unwrap().precedence > find("*").unwrap().precedence);
        assert!(find("*").unwrap().precedence > find("+").unwrap().precedence);
        assert!(find("+").unwrap().precedence > find("==").unwrap().precedence);
        assert!(find("==").unwrap().precedence > find("&&").unwrap().precedence);
        assert!(find("&&").unwrap().precedence > find("=").unwrap().precedence);
        assert_eq!(find("**").unwrap().assoc, Assoc::Right);
        assert_eq!(find("=").unwrap().assoc, Assoc::Right);
    }

    #[test]
    fn hidden_operators_are_flagged() {
        assert!(find("()").unwrap().hidden);
        assert!(find("[]").unwrap().hidden);
        assert!(find("?:").unwrap().hidden);
        assert!(!find("+").unwrap().hidden);
    }

    #[test]
    fn unary_variants_share_tokens() {
        let (descriptor, _) = binary_for_token(&Token::Minus).unwrap();
        assert_eq!(descriptor.unary_name, Some("neg"));
    }
}
