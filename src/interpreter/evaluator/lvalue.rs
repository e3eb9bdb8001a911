use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        runspace::core::Runspace,
        value::{core::Value, ops},
    },
    util::num::resolve_index,
};

/// A resolved assignment target.
///
/// Assignment and compound assignment evaluate their target expression once
/// into one of these, then read and/or commit through it. Container
/// targets keep a handle to the evaluated container, so aliased writes hit
/// shared data; string targets re-commit the whole rebuilt string through
/// the lvalue of the expression that produced it, since strings are plain
/// values.
#[derive(Debug, Clone)]
pub enum Lvalue {
    /// A bare name. Commit writes the frame that holds the name, or
    /// defines it in the innermost frame if no frame does.
    Variable { name: String, line: usize },
    /// An element or member slot inside an array or map.
    Element {
        container: Value,
        key:       Value,
        line:      usize,
    },
    /// One position of a string that itself sits in a writable place.
    StringIndex {
        target: Box<Lvalue>,
        index:  i64,
        line:   usize,
    },
}

impl Lvalue {
    /// Reads the current value of the target. Compound assignment uses
    /// this for the left-hand operand.
    ///
    /// # Errors
    /// `NULL_REF` for a variable with no binding, plus whatever indexed
    /// access can raise.
    pub fn read(&self, runspace: &Runspace) -> EvalResult<Value> {
        match self {
            Self::Variable { name, line } => {
                runspace.lookup(name).ok_or_else(|| {
                                         RuntimeError::NullReference { details: format!("Variable '{name}' is not defined"),
                                                                       line:    *line, }
                                     })
            },
            Self::Element { container, key, line } => ops::get_element(container, key, *line),
            Self::StringIndex { target, index, line } => {
                let Value::Str(s) = target.read(runspace)? else {
                    return Err(RuntimeError::Type { details: "String index target is no longer a string".to_string(),
                                                    line:    *line, });
                };
                Ok(resolve_index(*index, s.chars().count())
                    .and_then(|i| s.chars().nth(i))
                    .map_or(Value::Undefined, |c| Value::Str(c.to_string())))
            },
        }
    }

    /// Writes `value` through the target.
    ///
    /// # Errors
    /// Constant reassignment, unsupported containers, and out-of-range
    /// string positions.
    pub fn commit(&self, runspace: &mut Runspace, value: Value) -> EvalResult<()> {
        match self {
            Self::Variable { name, line } => runspace.assign(name, value, *line),
            Self::Element { container, key, line } => {
                ops::set_element(container, key, value, *line)
            },
            Self::StringIndex { target, index, line } => {
                let Value::Str(s) = target.read(runspace)? else {
                    return Err(RuntimeError::Type { details: "String index target is no longer a string".to_string(),
                                                    line:    *line, });
                };
                let replacement = match &value {
                    Value::Str(r) if r.chars().count() == 1 => {
                        r.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER)
                    },
                    Value::Char(code) => {
                        char::from_u32(*code).unwrap_or(char::REPLACEMENT_CHARACTER)
                    },
                    other => {
                        return Err(RuntimeError::Type { details: format!("Can only write a single character into a string, got {}",
                                                                         other.type_name()),
                                                        line:    *line, });
                    },
                };
                let length = s.chars().count();
                let Some(position) = resolve_index(*index, length) else {
                    return Err(RuntimeError::BadArgument { details: format!("index {index} is out of range for length {length}"),
                                                           line:    *line, });
                };
                let rebuilt: String = s.chars()
                                       .enumerate()
                                       .map(|(i, c)| if i == position { replacement } else { c })
                                       .collect();
                target.commit(runspace, Value::Str(rebuilt))
            },
        }
    }

    /// The source line of the expression this target came from.
    #[must_use]
    pub const fn line_number(&self) -> usize {
        match self {
            Self::Variable { line, .. }
            | Self::Element { line, .. }
            | Self::StringIndex { line, .. } => *line,
        }
    }
}
