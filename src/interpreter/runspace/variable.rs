use crate::interpreter::value::core::Value;

/// One binding in a runspace frame.
#[derive(Debug, Clone)]
pub struct RunspaceVariable {
    /// The bound value.
    pub value:       Value,
    /// Constants reject reassignment.
    pub constant:    bool,
    /// One-line description for help surfaces, if the binding has one.
    pub description: Option<String>,
}

impl RunspaceVariable {
    /// A plain mutable binding.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self { value,
               constant: false,
               description: None }
    }

    /// A constant binding with a description.
    #[must_use]
    pub fn constant(value: Value, description: &str) -> Self {
        Self { value,
               constant: true,
               description: Some(description.to_string()) }
    }
}
