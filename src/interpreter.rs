/// The evaluator module executes AST nodes and computes results.
///
/// The evaluator traverses the AST, evaluates expressions and statements,
/// resolves assignment targets, and routes control-flow signals. It is the
/// core execution engine of the interpreter.
///
/// # Responsibilities
/// - Evaluates AST nodes, performing all supported operations.
/// - Handles assignment through lvalues, calls, and control flow.
/// - Reports runtime errors with line information.
pub mod evaluator;
/// The lexer module tokenizes source code for further parsing.
///
/// The lexer (tokenizer) reads the raw source text and produces a stream of
/// tokens, each corresponding to meaningful language elements such as
/// numbers, strings, identifiers, operators, delimiters, and keywords. This
/// is the first stage of interpretation.
///
/// # Responsibilities
/// - Converts the input character stream into tokens with line numbers.
/// - Handles numeric literals, string interpolation, and operators.
/// - Reports lexical errors for invalid or malformed input.
pub mod lexer;
/// The shared operator table.
///
/// One row per operator: symbol, precedence, associativity, arity, and a
/// short description. The parser reads precedence and associativity from
/// here; hosts can read the whole table for help surfaces.
pub mod operators;
/// The parser module builds the abstract syntax tree (AST) from tokens.
///
/// The parser processes the token stream produced by the lexer and
/// constructs an AST that represents the syntactic structure of expressions
/// and statements. This enables later phases to analyze and execute user
/// code.
///
/// # Responsibilities
/// - Converts tokens into structured AST nodes (expressions, statements).
/// - Validates grammar, signal placement and parameter shapes at parse
///   time, reporting errors with location info.
pub mod parser;
/// The runspace module holds execution state and the host interface.
///
/// A `Runspace` owns the scope stack, the engine constants, the registered
/// builtins and native modules, and drives top-level execution.
pub mod runspace;
/// The value module defines the runtime data types for evaluation.
///
/// This module declares all the value types used during interpretation and
/// execution, such as complex numbers, booleans, strings, characters,
/// arrays, sets, maps, and functions. It also provides the conversion,
/// comparison and operator semantics between them.
///
/// # Responsibilities
/// - Defines the `Value` enum and all supported value variants.
/// - Implements operators, casts, copying, and equality.
/// - Provides map objects with chain lookup and function binding.
pub mod value;
