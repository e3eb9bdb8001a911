/// Type conversion between runtime types.
///
/// Implements the `cast` operation shared by the cast operator, typed
/// function parameters, and literal parsing. Every conversion either
/// produces a value of the requested type or fails with a cast error;
/// there are no silent coercions outside the rules defined here.
pub mod cast;
/// Complex number support.
///
/// Defines the `Complex` type used for arithmetic with real and imaginary
/// parts. Includes implementations for basic arithmetic operations,
/// exponentiation, absolute value, and radix formatting of integral reals.
///
/// Every numeric value in the language is a `Complex`; reals are simply
/// complex numbers whose imaginary part is zero.
pub mod complex;
pub mod core;
/// Callable values.
///
/// Defines `FuncRef`, the shared handle behind `Value::Func`, covering
/// both user-defined functions and native builtins, along with optional
/// `self` binding for functions reached through a map.
pub mod func;
/// Map objects with prototype-style inheritance.
///
/// Defines `MapObject`, an insertion-ordered key/value store that can
/// link to an `instance_of` template and any number of `inherits_from`
/// parents. Lookup walks the whole chain with cycle protection, so
/// self-referential hierarchies resolve rather than recurse forever.
pub mod map_object;
/// Operator semantics over runtime values.
///
/// Implements the binary and unary operators for every participating
/// type pairing, plus indexed access, member access, and element
/// deletion. Unsupported pairings produce type errors naming the
/// operator and both operand types.
pub mod ops;
