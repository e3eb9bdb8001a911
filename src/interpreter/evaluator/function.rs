use tracing::debug;

use crate::{
    ast::CallArg,
    error::RuntimeError,
    interpreter::{
        evaluator::{
            block::{Flow, eval_block},
            core::{EvalResult, eval_value},
        },
        runspace::core::Runspace,
        value::{
            cast::cast,
            core::Value,
            func::{FuncKind, FuncRef},
            map_object::{MapObject, lookup_chain},
        },
    },
};

/// Calls whatever value sits in call position.
///
/// Functions are called directly. Calling a map instantiates it: a fresh
/// map whose `instance_of` link points at the called map, with the chain's
/// `_Construct` function (if any) run against the new instance and the
/// call's arguments. Everything else is not callable.
///
/// # Errors
/// `NOT_CALLABLE`, `NULL_REF`, plus whatever argument evaluation and the
/// call itself raise.
pub fn call_value(runspace: &mut Runspace,
                  callee: &Value,
                  args: &[CallArg],
                  line: usize)
                  -> EvalResult<Value> {
    match callee {
        Value::Func(func) => {
            let arguments = eval_args(runspace, args)?;
            call_func(runspace, func, arguments, line)
        },
        Value::Map(template) => {
            let instance = Value::Map(MapObject::instance_handle(template));
            if let Some(Value::Func(constructor)) = lookup_chain(template, "_Construct") {
                let arguments = eval_args(runspace, args)?;
                call_func(runspace, &constructor.bind(instance.clone()), arguments, line)?;
            }
            Ok(instance)
        },
        Value::Undefined => {
            Err(RuntimeError::NullReference { details: "Cannot call an undefined value".to_string(),
                                              line })
        },
        other => {
            Err(RuntimeError::NotCallable { type_name: other.type_name().to_string(),
                                            line })
        },
    }
}

/// Calls a function value with already-evaluated arguments.
///
/// A bound `self` is prepended first. Arguments are then checked against
/// the declared arity and cast to the declared parameter types; omitted
/// optionals bind to `undefined`.
///
/// # Errors
/// `ARG_COUNT` and cast errors for bad arguments; body errors gain a
/// context line naming the function and the call site.
pub fn call_func(runspace: &mut Runspace,
                 func: &FuncRef,
                 mut args: Vec<Value>,
                 line: usize)
                 -> EvalResult<Value> {
    if let Some(bound) = &func.bound {
        args.insert(0, (**bound).clone());
    }

    let params = func.params();
    let (required, maximum) = func.arity();
    if args.len() < required || args.len() > maximum {
        let expected = if required == maximum {
            required.to_string()
        } else {
            format!("{required} to {maximum}")
        };
        return Err(RuntimeError::ArgumentCount { name: func.signature(),
                                                 expected,
                                                 received: args.len(),
                                                 line });
    }

    let mut bound_args = Vec::with_capacity(params.len());
    for (index, param) in params.iter().enumerate() {
        let value = match args.get(index) {
            Some(value) => cast(value, &param.type_name, line)?,
            None => Value::Undefined,
        };
        bound_args.push((param.name.clone(), value));
    }

    debug!(name = func.name(), args = args.len(), line, "calling function");
    match &*func.kind {
        FuncKind::Builtin(builtin) => {
            let arguments: Vec<Value> = bound_args.into_iter().map(|(_, v)| v).collect();
            (builtin.body)(runspace, &arguments, line)
        },
        FuncKind::User(user) => {
            runspace.push_frame();
            for (name, value) in bound_args {
                runspace.define(&name, value);
            }
            let flow = eval_block(runspace, &user.body);
            runspace.pop_frame();
            match flow.map_err(|e| {
                         e.with_context(format!("In function '{}' called on line {line}", user.name))
                     })? {
                Flow::Return(value) => Ok(value),
                // Falling off the end yields the last statement's value.
                Flow::Value(value) => Ok(value.unwrap_or(Value::Undefined)),
                // Break/Continue cannot reach a function boundary (the
                // parser rejects them); an exit travels outward.
                _ => Ok(Value::Undefined),
            }
        },
    }
}

/// Evaluates call arguments in order, expanding `...` spreads of arrays
/// and sets in place.
fn eval_args(runspace: &mut Runspace, args: &[CallArg]) -> EvalResult<Vec<Value>> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        let value = eval_value(runspace, &arg.expr)?;
        if arg.spread {
            match &value {
                Value::Array(elements) | Value::Set(elements) => {
                    values.extend(elements.borrow().iter().cloned());
                },
                other => {
                    return Err(RuntimeError::BadArgument { details: format!("'...' expects an array or set, got {}",
                                                                           other.type_name()),
                                                           line:    arg.expr.line_number(), });
                },
            }
        } else {
            values.push(value);
        }
    }
    Ok(values)
}
