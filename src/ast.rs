use crate::interpreter::{lexer::StringTemplate, value::complex::Complex};

/// A binary operator, as dispatched by the evaluator.
///
/// The parser maps operator tokens onto these via the operator table, which
/// is also where precedence and associativity live; this enum carries only
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    /// `**`
    Pow,
    /// `:` (integer sequence)
    Seq,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `+`
    Add,
    /// `-`
    Sub,
    /// `<<`
    Shl,
    /// `>>`
    Shr,
    /// `<=`
    Le,
    /// `<`
    Lt,
    /// `>=`
    Ge,
    /// `>`
    Gt,
    /// `in` (membership)
    In,
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `&`
    BitAnd,
    /// `^`
    BitXor,
    /// `|`
    BitOr,
    /// `&&`
    And,
    /// `||`
    Or,
    /// `??`
    Nullish,
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    ModAssign,
    /// `,` (evaluate both, keep the right)
    Comma,
}

impl BinaryOperator {
    /// The compound-assignment operators' underlying arithmetic operator,
    /// `None` for everything else (including plain `=`).
    #[must_use]
    pub const fn compound_base(self) -> Option<Self> {
        match self {
            Self::AddAssign => Some(Self::Add),
            Self::SubAssign => Some(Self::Sub),
            Self::MulAssign => Some(Self::Mul),
            Self::DivAssign => Some(Self::Div),
            Self::ModAssign => Some(Self::Mod),
            _ => None,
        }
    }

    /// Whether this operator writes through an lvalue.
    #[must_use]
    pub const fn is_assignment(self) -> bool {
        matches!(self,
                 Self::Assign
                 | Self::AddAssign
                 | Self::SubAssign
                 | Self::MulAssign
                 | Self::DivAssign
                 | Self::ModAssign)
    }

    /// The surface symbol, for error messages.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Pow => "**",
            Self::Seq => ":",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Le => "<=",
            Self::Lt => "<",
            Self::Ge => ">=",
            Self::Gt => ">",
            Self::In => "in",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
            Self::And => "&&",
            Self::Or => "||",
            Self::Nullish => "??",
            Self::Assign => "=",
            Self::AddAssign => "+=",
            Self::SubAssign => "-=",
            Self::MulAssign => "*=",
            Self::DivAssign => "/=",
            Self::ModAssign => "%=",
            Self::Comma => ",",
        }
    }
}

impl std::fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A unary (prefix) operator.
///
/// `+` and `-` share their tokens with the binary forms; the parser selects
/// the unary variant purely by syntactic position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    /// `!` (logical not)
    Not,
    /// `~` (bitwise not)
    BitNot,
    /// `+` (numeric identity)
    Plus,
    /// `-` (negation)
    Neg,
}

impl UnaryOperator {
    /// The surface symbol, for error messages.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::BitNot => "~",
            Self::Plus => "+",
            Self::Neg => "-",
        }
    }
}

impl std::fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// A function parameter: a name with an optional type constraint.
///
/// Arguments are cast to `type_name` at call time. Optional parameters may
/// be omitted by the caller and bind to `undefined`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    /// Name bound in the call frame.
    pub name:      String,
    /// Public type name the argument is cast to (`any` accepts everything).
    pub type_name: String,
    /// Whether the caller may omit this argument.
    pub optional:  bool,
}

/// One argument in a call expression.
#[derive(Debug, Clone, PartialEq)]
pub struct CallArg {
    /// The argument expression.
    pub expr:   Expr,
    /// Whether the argument was written with a leading `...`; the evaluated
    /// value must then be an array, expanded in place.
    pub spread: bool,
}

/// An expression node.
///
/// Every variant carries the source line it started on, retrievable via
/// [`Expr::line_number`].
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Numeric literal (real or imaginary component, from one token).
    Number { value: Complex, line: usize },
    /// String literal, possibly with interpolation spans evaluated at
    /// string-evaluation time.
    Str { template: StringTemplate, line: usize },
    /// Character literal.
    CharLit { code: u32, line: usize },
    /// A name to resolve in the runspace.
    Symbol { name: String, line: usize },
    /// Prefix operator application.
    Unary {
        op:      UnaryOperator,
        operand: Box<Expr>,
        line:    usize,
    },
    /// Infix operator application, including assignments and the comma
    /// operator.
    Binary {
        op:    BinaryOperator,
        left:  Box<Expr>,
        right: Box<Expr>,
        line:  usize,
    },
    /// `cond ? then : else`.
    Ternary {
        condition:   Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
        line:        usize,
    },
    /// `object.name` or `object?.name`.
    Member {
        object:   Box<Expr>,
        property: String,
        /// `?.` yields `undefined` instead of erroring on an undefined
        /// object.
        optional: bool,
        line:     usize,
    },
    /// `object[key]`.
    Index {
        object: Box<Expr>,
        key:    Box<Expr>,
        line:   usize,
    },
    /// `callee(args...)`.
    Call {
        callee: Box<Expr>,
        args:   Vec<CallArg>,
        line:   usize,
    },
    /// `[a, b, c]`.
    ArrayLiteral { elements: Vec<Expr>, line: usize },
    /// `{a, b, c}` — deduplicated by language equality, insertion ordered.
    SetLiteral { elements: Vec<Expr>, line: usize },
    /// `{key: value, ...}` with symbol or string keys.
    MapLiteral {
        entries: Vec<(String, Expr)>,
        line:    usize,
    },
    /// `func name?(params) { ... }` in expression position.
    Function {
        name:   Option<String>,
        params: Vec<Param>,
        body:   Block,
        line:   usize,
    },
}

impl Expr {
    /// The source line this expression started on.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Number { line, .. }
            | Self::Str { line, .. }
            | Self::CharLit { line, .. }
            | Self::Symbol { line, .. }
            | Self::Unary { line, .. }
            | Self::Binary { line, .. }
            | Self::Ternary { line, .. }
            | Self::Member { line, .. }
            | Self::Index { line, .. }
            | Self::Call { line, .. }
            | Self::ArrayLiteral { line, .. }
            | Self::SetLiteral { line, .. }
            | Self::MapLiteral { line, .. }
            | Self::Function { line, .. } => *line,
        }
    }
}

/// A sequence of statements with its control-flow capabilities.
///
/// `breakable` and `returnable` are fixed at parse time: loop bodies are
/// breakable, function bodies are returnable, `if` bodies and plain brace
/// blocks inherit both flags from their surroundings. The flags gate which
/// signal keywords the parser accepts inside the block.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// The statements, in source order.
    pub statements: Vec<Statement>,
    /// Whether `break`/`continue` are legal inside.
    pub breakable:  bool,
    /// Whether `return` is legal inside.
    pub returnable: bool,
    /// Line of the opening brace (or of the single wrapped statement).
    pub line:       usize,
}

/// A statement: an expression, a control structure, or a signal keyword.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// An expression evaluated for its value.
    Expression { expr: Expr, line: usize },
    /// `if (cond) body [else if (cond) body]* [else body]`.
    If {
        /// Condition/body pairs, first match wins.
        branches:   Vec<(Expr, Block)>,
        else_block: Option<Block>,
        line:       usize,
    },
    /// `while`/`until`/`do..while`/`do..until`.
    Loop {
        condition:  Expr,
        body:       Block,
        /// `do` loops run the body before the first test.
        test_after: bool,
        /// `until` loops invert the test.
        negate:     bool,
        line:       usize,
    },
    /// `for (init; cond; step) body`; an absent condition loops forever.
    For {
        init:      Option<Box<Statement>>,
        condition: Option<Expr>,
        step:      Option<Box<Statement>>,
        body:      Block,
        line:      usize,
    },
    /// `func name(params) { ... }` in statement position; binds `name`.
    FuncDef {
        name:   String,
        params: Vec<Param>,
        body:   Block,
        line:   usize,
    },
    /// `break`.
    Break { line: usize },
    /// `continue`.
    Continue { line: usize },
    /// `return [expr]`.
    Return { value: Option<Expr>, line: usize },
}

impl Statement {
    /// The source line this statement started on.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Expression { line, .. }
            | Self::If { line, .. }
            | Self::Loop { line, .. }
            | Self::For { line, .. }
            | Self::FuncDef { line, .. }
            | Self::Break { line }
            | Self::Continue { line }
            | Self::Return { line, .. } => *line,
        }
    }
}
