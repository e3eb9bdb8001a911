/// The core builtin registrations.
pub mod builtins;
pub mod core;
/// The binding record stored in each scope frame.
pub mod variable;
