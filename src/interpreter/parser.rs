/// Expression parsing: precedence climbing over the operator table, with
/// postfix member/index/call chains and the collection literals.
pub mod core;
/// Statement parsing and parse-time placement checks for the signal
/// keywords.
pub mod statement;
