/// Statement execution and control-flow signals.
///
/// Runs blocks and statements, turning `break`, `continue`, `return` and
/// exit requests into [`block::Flow`] values that travel up to whatever
/// construct absorbs them.
pub mod block;
pub mod core;
/// Call machinery: argument evaluation, spreads, arity and type checks,
/// frames, and map instantiation.
pub mod function;
/// Writable places for assignment: variables, container elements, and
/// string positions.
pub mod lvalue;
