//! # argand
//!
//! argand is an embeddable interpreter for a small dynamically-typed
//! scripting language built around complex-number arithmetic and
//! collection types. It lexes, parses, and evaluates scripts with support
//! for variables, functions, maps with inheritance, string interpolation,
//! and a host registration interface for builtins and native modules.

#![warn(
    clippy::redundant_clone,
    clippy::needless_pass_by_value,
    clippy::similar_names,
    clippy::large_enum_variant,
    clippy::string_lit_as_bytes,
    clippy::match_same_arms,
    clippy::cargo,
    clippy::nursery,
    clippy::perf,
    clippy::style,
    clippy::suspicious,
    clippy::correctness,
    clippy::complexity,
    clippy::pedantic,
    //missing_docs,
)]
#![allow(clippy::missing_errors_doc)]

use crate::interpreter::runspace::core::{Outcome, Runspace};

/// Defines the structure of parsed code.
///
/// This module declares the `Expr` enum and related types that represent
/// the syntactic structure of source code as a tree. The AST is built by
/// the parser and traversed by the evaluator.
///
/// # Responsibilities
/// - Defines expression and statement types for all language constructs.
/// - Attaches source lines to AST nodes for error reporting.
pub mod ast;
/// Provides unified error types for parsing and evaluation.
///
/// This module defines all errors that can be raised during lexing,
/// parsing, or evaluating code, each tagged with a stable error code and
/// the source line it was detected on.
///
/// # Responsibilities
/// - Defines error enums for all failure modes (lexer, parser, evaluator).
/// - Attaches line numbers and detailed messages for context.
/// - Exposes the stable code namespace for host help surfaces.
pub mod error;
/// Orchestrates the entire process of code execution.
///
/// This module ties together lexing, parsing, evaluation, value
/// representations, error handling, and all supporting infrastructure to
/// provide a complete runtime for source code evaluation. It exposes the
/// public API for interpreting and executing scripts.
///
/// # Responsibilities
/// - Coordinates all core components: lexer, parser, evaluator, runspace.
/// - Provides entry points for parsing and evaluating user code.
/// - Manages the flow of data and errors between phases.
pub mod interpreter;
/// General utilities for safe numeric conversion and helpers.
///
/// # Responsibilities
/// - Safely convert between `i64`, `usize`, and `f64` without silent data
///   loss.
/// - Resolve possibly-negative collection indices.
pub mod util;

/// Runs a source string in a fresh runspace and reports only success or
/// failure.
///
/// With `auto_print`, the value of the last top-level expression statement
/// is written to standard output.
///
/// # Errors
/// Returns the first parse or runtime error the script raises.
///
/// # Examples
/// ```
/// use argand::get_result;
///
/// // The statements run; the final value is available but not printed.
/// assert!(get_result("x = 3; x * x", false).is_ok());
///
/// // 'y' is never defined, so evaluation fails.
/// assert!(get_result("y + 1", false).is_err());
/// ```
pub fn get_result(source: &str, auto_print: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut runspace = Runspace::new();
    if let Outcome::Finished(Some(value)) = runspace.execute(source)?
       && auto_print
    {
        println!("{value}");
    }
    Ok(())
}
