use crate::{
    ast::{BinaryOperator, Expr},
    error::RuntimeError,
    interpreter::{
        evaluator::{function, lvalue::Lvalue},
        lexer::{StringTemplate, tokenize},
        parser::core::parse_full_expression,
        runspace::core::Runspace,
        value::{
            core::Value,
            func::{FuncRef, UserFunction},
            map_object::MapObject,
            ops,
        },
    },
};

/// The result type of every evaluation step.
pub type EvalResult<T> = Result<T, RuntimeError>;

/// The result of evaluating one expression: the value, plus the place the
/// value came from when that place is writable.
///
/// Assignment operators and indexed string writes are the only consumers
/// of the lvalue half; everything else looks at `value` alone.
#[derive(Debug, Clone)]
pub struct Evaluated {
    pub value:  Value,
    pub lvalue: Option<Lvalue>,
}

impl Evaluated {
    /// A value with no writable origin.
    #[must_use]
    pub const fn plain(value: Value) -> Self {
        Self { value, lvalue: None }
    }

    const fn written_to(value: Value, lvalue: Lvalue) -> Self {
        Self { value, lvalue: Some(lvalue) }
    }
}

/// Evaluates an expression for its value alone.
///
/// # Errors
/// Any runtime error the expression raises.
pub fn eval_value(runspace: &mut Runspace, expr: &Expr) -> EvalResult<Value> {
    Ok(eval_expr(runspace, expr)?.value)
}

/// Evaluates an expression.
///
/// # Errors
/// Any runtime error the expression raises.
pub fn eval_expr(runspace: &mut Runspace, expr: &Expr) -> EvalResult<Evaluated> {
    match expr {
        Expr::Number { value, .. } => Ok(Evaluated::plain(Value::Number(*value))),
        Expr::Str { template, line } => {
            Ok(Evaluated::plain(Value::Str(render_template(runspace, template, *line)?)))
        },
        Expr::CharLit { code, .. } => Ok(Evaluated::plain(Value::Char(*code))),
        Expr::Symbol { name, line } => {
            let value = runspace.lookup(name).ok_or_else(|| {
                                                 RuntimeError::NullReference { details: format!("Variable '{name}' is not defined"),
                                                                               line:    *line, }
                                             })?;
            Ok(Evaluated::written_to(value,
                                     Lvalue::Variable { name: name.clone(),
                                                        line: *line }))
        },
        Expr::Unary { op, operand, line } => {
            let operand = eval_value(runspace, operand)?;
            Ok(Evaluated::plain(ops::eval_unary(*op, &operand, *line)?))
        },
        Expr::Binary { op, left, right, line } => eval_binary_expr(runspace, *op, left, right, *line),
        Expr::Ternary { condition,
                        then_branch,
                        else_branch,
                        .. } => {
            if eval_value(runspace, condition)?.truthy() {
                eval_expr(runspace, then_branch)
            } else {
                eval_expr(runspace, else_branch)
            }
        },
        Expr::Member { object,
                       property,
                       optional,
                       line } => {
            let object = eval_value(runspace, object)?;
            let value = ops::get_member(&object, property, *optional, *line)?;
            let lvalue = matches!(object, Value::Map(_)).then(|| {
                                                            Lvalue::Element { container: object,
                                                                              key:       Value::Str(property.clone()),
                                                                              line:      *line, }
                                                        });
            Ok(Evaluated { value, lvalue })
        },
        Expr::Index { object, key, line } => {
            let Evaluated { value: container,
                            lvalue: origin, } = eval_expr(runspace, object)?;
            let key = eval_value(runspace, key)?;
            let value = ops::get_element(&container, &key, *line)?;
            let lvalue = match container {
                Value::Array(_) | Value::Map(_) => {
                    Some(Lvalue::Element { container,
                                           key,
                                           line: *line })
                },
                // Writing into a string rewrites the string where it lives.
                Value::Str(_) => {
                    match (origin, &key) {
                        (Some(target), Value::Number(z)) if z.is_integral_real() => {
                            #[allow(clippy::cast_possible_truncation)]
                            Some(Lvalue::StringIndex { target: Box::new(target),
                                                       index:  z.re as i64,
                                                       line:   *line, })
                        },
                        _ => None,
                    }
                },
                _ => None,
            };
            Ok(Evaluated { value, lvalue })
        },
        Expr::Call { callee, args, line } => {
            let callee = eval_value(runspace, callee)?;
            let result = function::call_value(runspace, &callee, args, *line)?;
            Ok(Evaluated::plain(result))
        },
        Expr::ArrayLiteral { elements, .. } => {
            let values = elements.iter()
                                 .map(|e| eval_value(runspace, e))
                                 .collect::<EvalResult<Vec<Value>>>()?;
            Ok(Evaluated::plain(Value::new_array(values)))
        },
        Expr::SetLiteral { elements, .. } => {
            let values = elements.iter()
                                 .map(|e| eval_value(runspace, e))
                                 .collect::<EvalResult<Vec<Value>>>()?;
            Ok(Evaluated::plain(Value::new_set(values)))
        },
        Expr::MapLiteral { entries, .. } => {
            let map = MapObject::new_handle();
            for (key, value_expr) in entries {
                let value = eval_value(runspace, value_expr)?;
                map.borrow_mut().set_own(key, value);
            }
            Ok(Evaluated::plain(Value::Map(map)))
        },
        Expr::Function { name, params, body, .. } => {
            let function = UserFunction { name:   name.clone()
                                                      .unwrap_or_else(|| "<anonymous>".to_string()),
                                          params: params.clone(),
                                          body:   body.clone(), };
            Ok(Evaluated::plain(Value::Func(FuncRef::user(function))))
        },
    }
}

fn eval_binary_expr(runspace: &mut Runspace,
                    op: BinaryOperator,
                    left: &Expr,
                    right: &Expr,
                    line: usize)
                    -> EvalResult<Evaluated> {
    if op == BinaryOperator::Assign {
        let target = eval_assignment_target(runspace, left)?;
        let value = eval_value(runspace, right)?;
        target.commit(runspace, value.clone())?;
        return Ok(Evaluated::written_to(value, target));
    }
    if let Some(base) = op.compound_base() {
        let target = eval_assignment_target(runspace, left)?;
        let current = target.read(runspace)?;
        let operand = eval_value(runspace, right)?;
        let value = ops::eval_binary(base, &current, &operand, line)?;
        target.commit(runspace, value.clone())?;
        return Ok(Evaluated::written_to(value, target));
    }
    match op {
        // The logical operators yield an operand, not a fresh bool, so
        // they double as selection operators.
        BinaryOperator::And => {
            let lhs = eval_value(runspace, left)?;
            if lhs.truthy() {
                Ok(Evaluated::plain(eval_value(runspace, right)?))
            } else {
                Ok(Evaluated::plain(lhs))
            }
        },
        BinaryOperator::Or => {
            let lhs = eval_value(runspace, left)?;
            if lhs.truthy() {
                Ok(Evaluated::plain(lhs))
            } else {
                Ok(Evaluated::plain(eval_value(runspace, right)?))
            }
        },
        BinaryOperator::Nullish => {
            let lhs = eval_value(runspace, left)?;
            if lhs.is_defined() {
                Ok(Evaluated::plain(lhs))
            } else {
                Ok(Evaluated::plain(eval_value(runspace, right)?))
            }
        },
        BinaryOperator::Comma => {
            eval_value(runspace, left)?;
            Ok(Evaluated::plain(eval_value(runspace, right)?))
        },
        _ => {
            let lhs = eval_value(runspace, left)?;
            let rhs = eval_value(runspace, right)?;
            Ok(Evaluated::plain(ops::eval_binary(op, &lhs, &rhs, line)?))
        },
    }
}

/// Resolves an expression in assignment position.
///
/// Unlike evaluation, a bare name needs no existing binding here; `x = 1`
/// is how variables come into existence.
fn eval_assignment_target(runspace: &mut Runspace, expr: &Expr) -> EvalResult<Lvalue> {
    match expr {
        Expr::Symbol { name, line } => {
            Ok(Lvalue::Variable { name: name.clone(),
                                  line: *line })
        },
        Expr::Member { object, property, line, .. } => {
            let container = eval_value(runspace, object)?;
            Ok(Lvalue::Element { container,
                                 key: Value::Str(property.clone()),
                                 line: *line })
        },
        Expr::Index { .. } => {
            let evaluated = eval_expr(runspace, expr)?;
            evaluated.lvalue.ok_or_else(|| {
                                RuntimeError::Type { details: "Expression cannot be assigned to".to_string(),
                                                     line:    expr.line_number(), }
                            })
        },
        other => {
            Err(RuntimeError::Type { details: "Expression cannot be assigned to".to_string(),
                                     line:    other.line_number(), })
        },
    }
}

/// Renders a string template by evaluating each interpolation span and
/// splicing the rendering back in at its recorded offset, shifted by the
/// accumulated length drift of earlier splices.
fn render_template(runspace: &mut Runspace,
                   template: &StringTemplate,
                   line: usize)
                   -> EvalResult<String> {
    let mut rendered = template.text.clone();
    let mut drift = 0usize;
    for span in &template.spans {
        let value = eval_embedded(runspace, &span.source, line)?;
        let splice = value.to_string();
        rendered.insert_str(span.offset + drift, &splice);
        drift += splice.len();
    }
    Ok(rendered)
}

/// Lexes, parses and evaluates the source of one interpolation span.
fn eval_embedded(runspace: &mut Runspace, source: &str, line: usize) -> EvalResult<Value> {
    let embed = |details: String| {
        RuntimeError::General { details: format!("In string interpolation '{{{source}}}': {details}"),
                                line }
    };
    let tokens = tokenize(source).map_err(|e| embed(e.to_string()))?;
    let mut iter = tokens.iter().peekable();
    let expr = parse_full_expression(&mut iter).map_err(|e| embed(e.to_string()))?;
    if iter.peek().is_some() {
        return Err(embed("trailing input after the expression".to_string()));
    }
    eval_value(runspace, &expr)
}
