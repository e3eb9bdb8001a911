use tracing::trace;

use crate::{
    ast::{Block, Expr, Statement},
    interpreter::{
        evaluator::core::{EvalResult, eval_value},
        runspace::core::Runspace,
        value::{
            core::Value,
            func::{FuncRef, UserFunction},
        },
    },
};

/// How a block finished.
///
/// `break`, `continue` and `return` are plain values here, not errors:
/// they travel up through the enclosing blocks until a loop or a call
/// absorbs them. The parser guarantees they cannot escape past the
/// construct that should absorb them. `Exit` travels all the way out.
#[derive(Debug, Clone)]
pub enum Flow {
    /// The block ran to the end; the value of its last expression
    /// statement, if there was one.
    Value(Option<Value>),
    /// A `break` travelling to the nearest loop.
    Break,
    /// A `continue` travelling to the nearest loop.
    Continue,
    /// A `return` travelling to the nearest call.
    Return(Value),
    /// A host-requested exit travelling to the top level.
    Exit(i32),
}

/// Runs the statements of a block in order.
///
/// Any non-`Value` flow from a statement stops the block immediately. A
/// pending exit request on the runspace is honored between statements, so
/// a builtin that requests exit stops the script at the next statement
/// boundary.
///
/// # Errors
/// Any runtime error a statement raises.
pub fn eval_block(runspace: &mut Runspace, block: &Block) -> EvalResult<Flow> {
    let mut last = None;
    for statement in &block.statements {
        match eval_statement(runspace, statement)? {
            Flow::Value(value) => {
                if value.is_some() {
                    last = value;
                }
            },
            other => return Ok(other),
        }
        if let Some(code) = runspace.exit_requested {
            return Ok(Flow::Exit(code));
        }
    }
    Ok(Flow::Value(last))
}

/// Runs one statement.
///
/// # Errors
/// Any runtime error the statement raises.
pub fn eval_statement(runspace: &mut Runspace, statement: &Statement) -> EvalResult<Flow> {
    trace!(line = statement.line_number(), "evaluating statement");
    match statement {
        Statement::Expression { expr, .. } => {
            Ok(Flow::Value(Some(eval_value(runspace, expr)?)))
        },
        Statement::If { branches, else_block, .. } => {
            for (condition, body) in branches {
                if eval_value(runspace, condition)?.truthy() {
                    return eval_block(runspace, body);
                }
            }
            match else_block {
                Some(body) => eval_block(runspace, body),
                None => Ok(Flow::Value(None)),
            }
        },
        Statement::Loop { condition,
                          body,
                          test_after,
                          negate,
                          .. } => {
            let mut last = None;
            loop {
                if !test_after && !loop_test(runspace, condition, *negate)? {
                    break;
                }
                if let Some(code) = runspace.exit_requested {
                    return Ok(Flow::Exit(code));
                }
                match eval_block(runspace, body)? {
                    Flow::Value(Some(value)) => last = Some(value),
                    Flow::Value(None) | Flow::Continue => {},
                    Flow::Break => break,
                    other => return Ok(other),
                }
                if *test_after && !loop_test(runspace, condition, *negate)? {
                    break;
                }
            }
            // A loop's value is its last completed body value, whether it
            // stopped by condition or by break.
            Ok(Flow::Value(last))
        },
        Statement::For { init,
                         condition,
                         step,
                         body,
                         .. } => {
            // The whole for statement gets its own frame so the init
            // variable does not leak.
            runspace.push_frame();
            let result = eval_for(runspace, init.as_deref(), condition.as_ref(), step.as_deref(), body);
            runspace.pop_frame();
            result
        },
        Statement::FuncDef { name, params, body, line } => {
            let function = UserFunction { name:   name.clone(),
                                          params: params.clone(),
                                          body:   body.clone(), };
            runspace.assign(name, Value::Func(FuncRef::user(function)), *line)?;
            Ok(Flow::Value(None))
        },
        Statement::Break { .. } => Ok(Flow::Break),
        Statement::Continue { .. } => Ok(Flow::Continue),
        Statement::Return { value, .. } => {
            let result = match value {
                Some(expr) => eval_value(runspace, expr)?,
                None => Value::Undefined,
            };
            Ok(Flow::Return(result))
        },
    }
}

fn eval_for(runspace: &mut Runspace,
            init: Option<&Statement>,
            condition: Option<&Expr>,
            step: Option<&Statement>,
            body: &Block)
            -> EvalResult<Flow> {
    if let Some(init) = init {
        eval_statement(runspace, init)?;
    }
    let mut last = None;
    loop {
        // An absent condition loops until break or exit.
        if let Some(condition) = condition
           && !eval_value(runspace, condition)?.truthy()
        {
            break;
        }
        if let Some(code) = runspace.exit_requested {
            return Ok(Flow::Exit(code));
        }
        match eval_block(runspace, body)? {
            Flow::Value(Some(value)) => last = Some(value),
            Flow::Value(None) | Flow::Continue => {},
            Flow::Break => break,
            other => return Ok(other),
        }
        if let Some(step) = step {
            eval_statement(runspace, step)?;
        }
    }
    Ok(Flow::Value(last))
}

fn loop_test(runspace: &mut Runspace,
             condition: &Expr,
             negate: bool)
             -> EvalResult<bool> {
    let holds = eval_value(runspace, condition)?.truthy();
    Ok(holds != negate)
}
