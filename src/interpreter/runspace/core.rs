use std::collections::HashMap;

use tracing::debug;

use crate::{
    error::{Error, RuntimeError},
    interpreter::{
        evaluator::{
            block::{Flow, eval_statement},
            core::EvalResult,
        },
        lexer::{Token, check_brackets, tokenize},
        parser::statement::parse_statement,
        runspace::{builtins, variable::RunspaceVariable},
        value::{
            core::Value,
            func::{BuiltinBody, BuiltinFunction, FuncRef, param_from_spec},
        },
    },
};

/// A native module initializer, run against the runspace on `import`.
pub type NativeModuleInit = fn(&mut Runspace) -> EvalResult<()>;

/// How a top-level execution finished.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// The source ran to the end; the value of its last expression
    /// statement, if any.
    Finished(Option<Value>),
    /// A script or builtin requested exit with this status code.
    Exited(i32),
}

/// The execution context: a stack of scope frames plus host-facing
/// registration state.
///
/// Name resolution walks the frames innermost-out. Assignment writes the
/// frame that already holds the name, so inner frames can update outer
/// variables; a name bound nowhere is created in the innermost frame.
/// Function calls and `for` statements push frames, plain blocks do not.
pub struct Runspace {
    frames:         Vec<HashMap<String, RunspaceVariable>>,
    native_modules: HashMap<String, NativeModuleInit>,
    /// Set by the `exit` builtin; honored at the next statement boundary.
    pub exit_requested: Option<i32>,
    /// Whether top-level statement results update the `ans` binding.
    pub store_ans:      bool,
}

impl Runspace {
    /// A runspace with the engine constants and core builtins installed.
    #[must_use]
    pub fn new() -> Self {
        let mut runspace = Self { frames:         vec![HashMap::new()],
                                  native_modules: HashMap::new(),
                                  exit_requested: None,
                                  store_ans:      false, };
        runspace.define_root_constants();
        builtins::define_core(&mut runspace);
        runspace
    }

    fn define_root_constants(&mut self) {
        // No `i` binding: the imaginary unit is spelled as a literal
        // suffix (`1i`), which keeps `i` free as a loop variable.
        let constants: [(&str, Value, &str); 7] =
            [("true", Value::Bool(true), "Boolean truth."),
             ("false", Value::Bool(false), "Boolean falsehood."),
             ("undefined", Value::Undefined, "The absent value."),
             ("inf", Value::from_real(f64::INFINITY), "Positive infinity."),
             ("nan", Value::from_real(f64::NAN), "Not a number."),
             ("pi", Value::from_real(std::f64::consts::PI), "The circle constant."),
             ("e", Value::from_real(std::f64::consts::E), "Euler's number.")];
        for (name, value, description) in constants {
            self.frames[0].insert(name.to_string(), RunspaceVariable::constant(value, description));
        }
    }

    /// Resolves a name, innermost frame first.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).map(|v| v.value.clone()))
    }

    /// The description of a binding, if it has one.
    #[must_use]
    pub fn describe(&self, name: &str) -> Option<String> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name).and_then(|v| v.description.clone()))
    }

    /// Writes `name`, updating the frame that holds it or creating the
    /// binding in the innermost frame.
    ///
    /// # Errors
    /// `GENERAL` when the binding is constant.
    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> EvalResult<()> {
        for frame in self.frames.iter_mut().rev() {
            if let Some(existing) = frame.get_mut(name) {
                if existing.constant {
                    return Err(RuntimeError::General { details: format!("Cannot reassign the constant '{name}'"),
                                                       line });
                }
                existing.value = value;
                return Ok(());
            }
        }
        self.define(name, value);
        Ok(())
    }

    /// Creates or replaces a binding in the innermost frame.
    pub fn define(&mut self, name: &str, value: Value) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(name.to_string(), RunspaceVariable::new(value));
        }
    }

    /// Registers a builtin function under `name` in the root frame.
    ///
    /// Parameter specs are `"x"`, `"x: real"`, or `"x: ?real"` with the
    /// `?` marking the parameter optional.
    pub fn define_builtin(&mut self, name: &str, params: &[&str], body: BuiltinBody, description: &str) {
        let function = BuiltinFunction { name:        name.to_string(),
                                         params:      params.iter().map(|p| param_from_spec(p)).collect(),
                                         description: description.to_string(),
                                         body, };
        self.frames[0].insert(name.to_string(),
                              RunspaceVariable { value:       Value::Func(FuncRef::builtin(function)),
                                                 constant:    true,
                                                 description: Some(description.to_string()), });
    }

    /// Opens a scope frame.
    pub fn push_frame(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Closes the innermost scope frame. The root frame is never popped.
    pub fn pop_frame(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    /// Asks the top level to stop with `code` at the next statement
    /// boundary.
    pub const fn request_exit(&mut self, code: i32) {
        self.exit_requested = Some(code);
    }

    /// Registers a native module for later `import`.
    pub fn register_native_module(&mut self, name: &str, init: NativeModuleInit) {
        self.native_modules.insert(name.to_string(), init);
    }

    /// Runs the named native module's initializer against this runspace.
    ///
    /// # Errors
    /// `BAD_IMPORT` for unknown modules or failing initializers.
    pub fn import(&mut self, name: &str, line: usize) -> EvalResult<Value> {
        let Some(init) = self.native_modules.get(name).copied() else {
            return Err(RuntimeError::BadImport { name:    name.to_string(),
                                                 details: "no such module is registered".to_string(),
                                                 line });
        };
        debug!(module = name, "importing native module");
        init(self).map_err(|e| {
                      RuntimeError::BadImport { name:    name.to_string(),
                                                details: e.to_string(),
                                                line }
                  })?;
        Ok(Value::Undefined)
    }

    /// Executes script text as an import unit in the current runspace.
    ///
    /// # Errors
    /// `BAD_IMPORT` wrapping whatever the unit raised.
    pub fn import_source(&mut self, name: &str, source: &str) -> EvalResult<Value> {
        match self.execute(source) {
            Ok(_) => Ok(Value::Undefined),
            Err(e) => {
                Err(RuntimeError::BadImport { name:    name.to_string(),
                                              details: e.to_string(),
                                              line:    0, })
            },
        }
    }

    fn set_ans(&mut self, value: Value) {
        self.frames[0].insert("ans".to_string(),
                              RunspaceVariable { value,
                                                 constant: false,
                                                 description: Some("Result of the most recent statement.".to_string()), });
    }

    /// Lexes and parses a whole source text, then runs it statement by
    /// statement. Parsing completes before any evaluation, so a syntax
    /// error anywhere in the unit prevents the whole unit from running.
    ///
    /// # Errors
    /// The first parse error, before anything runs; otherwise the first
    /// runtime error (later statements do not run).
    pub fn execute(&mut self, source: &str) -> Result<Outcome, Error> {
        let tokens = tokenize(source)?;
        check_brackets(&tokens)?;

        let mut iter = tokens.iter().peekable();
        let mut statements = Vec::new();
        loop {
            while let Some((Token::NewLine | Token::Semicolon, _)) = iter.peek() {
                iter.next();
            }
            if iter.peek().is_none() {
                break;
            }
            statements.push(parse_statement(&mut iter, false, false)?);
        }

        let mut last = None;
        for statement in &statements {
            match eval_statement(self, statement)? {
                Flow::Value(Some(value)) => {
                    if self.store_ans {
                        self.set_ans(value.clone());
                    }
                    last = Some(value);
                },
                Flow::Value(None) => {},
                Flow::Exit(code) => return Ok(Outcome::Exited(code)),
                // The parser rejects naked signals at the top level.
                Flow::Break | Flow::Continue | Flow::Return(_) => {},
            }
            if let Some(code) = self.exit_requested {
                return Ok(Outcome::Exited(code));
            }
        }
        Ok(Outcome::Finished(last))
    }
}

impl Default for Runspace {
    fn default() -> Self {
        Self::new()
    }
}
