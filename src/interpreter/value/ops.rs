use crate::{
    ast::{BinaryOperator, UnaryOperator},
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            complex::Complex,
            core::Value,
            map_object::lookup_chain,
        },
    },
    util::num::{f64_to_i64_checked, resolve_index},
};

/// Applies an eager binary operator.
///
/// Each operand-shape helper returns `Ok(None)` when the shapes do not
/// support the operator; this function turns that into a `TYPE_ERROR`
/// naming the operator and both operand types. The short-circuiting
/// operators (`&&`, `||`, `??`), assignments and the comma operator never
/// reach here — the evaluator handles them around operand evaluation.
///
/// # Errors
/// `TYPE_ERROR` for unsupported shapes, `BAD_ARG` for supported shapes
/// with out-of-domain values (negative repetition, fractional shift
/// counts).
pub fn eval_binary(op: BinaryOperator, lhs: &Value, rhs: &Value, line: usize) -> EvalResult<Value> {
    use BinaryOperator as Op;
    let result = match op {
        Op::Add => op_add(lhs, rhs, line)?,
        Op::Sub => op_sub(lhs, rhs, line)?,
        Op::Mul => op_mul(lhs, rhs, line)?,
        Op::Div => op_div(lhs, rhs),
        Op::Mod => op_mod(lhs, rhs),
        Op::Pow => op_pow(lhs, rhs),
        Op::Seq => op_seq(lhs, rhs),
        Op::Shl | Op::Shr => op_shift(op, lhs, rhs, line)?,
        Op::BitAnd | Op::BitXor | Op::BitOr => op_bitwise(op, lhs, rhs, line)?,
        Op::Le | Op::Lt | Op::Ge | Op::Gt => op_compare(op, lhs, rhs),
        Op::In => op_membership(lhs, rhs),
        Op::Eq => Some(Value::Bool(lhs.equals(rhs))),
        Op::Ne => Some(Value::Bool(!lhs.equals(rhs))),
        Op::And | Op::Or | Op::Nullish | Op::Comma => None,
        _ if op.is_assignment() => None,
        _ => None,
    };
    result.ok_or_else(|| type_error(op.symbol(), lhs, rhs, line))
}

/// Applies a prefix operator.
///
/// # Errors
/// `TYPE_ERROR` when the operand type does not support the operator.
pub fn eval_unary(op: UnaryOperator, operand: &Value, line: usize) -> EvalResult<Value> {
    let result = match (op, operand) {
        (UnaryOperator::Not, v) => Some(Value::Bool(!v.truthy())),
        (UnaryOperator::BitNot, Value::Number(z)) if z.is_real() => {
            let bits = f64_to_i64_checked(z.re, "operand of '~'", line)?;
            #[allow(clippy::cast_precision_loss)]
            Some(Value::from_real(!bits as f64))
        },
        (UnaryOperator::Plus, Value::Number(z)) => Some(Value::Number(*z)),
        (UnaryOperator::Neg, Value::Number(z)) => Some(Value::Number(-*z)),
        _ => None,
    };
    result.ok_or_else(|| {
              RuntimeError::Type { details: format!("Cannot apply unary '{op}' to {}",
                                                    operand.type_name()),
                                   line }
          })
}

fn type_error(symbol: &str, lhs: &Value, rhs: &Value, line: usize) -> RuntimeError {
    RuntimeError::Type { details: format!("Cannot apply '{symbol}' to {} and {}",
                                          lhs.type_name(),
                                          rhs.type_name()),
                         line }
}

fn op_add(lhs: &Value, rhs: &Value, line: usize) -> EvalResult<Option<Value>> {
    Ok(match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Some(Value::Number(*a + *b)),
        (Value::Str(a), b) => Some(Value::Str(format!("{a}{b}"))),
        (Value::Char(c), Value::Number(n)) => Some(shift_char(*c, n, "+", line)?),
        (Value::Char(a), Value::Char(b)) => {
            let mut combined = String::new();
            combined.push(char::from_u32(*a).unwrap_or(char::REPLACEMENT_CHARACTER));
            combined.push(char::from_u32(*b).unwrap_or(char::REPLACEMENT_CHARACTER));
            Some(Value::Str(combined))
        },
        (Value::Array(a), Value::Array(b)) => {
            let mut joined = a.borrow().clone();
            joined.extend(b.borrow().iter().cloned());
            Some(Value::new_array(joined))
        },
        (Value::Set(a), Value::Set(b)) => {
            let mut union = a.borrow().clone();
            union.extend(b.borrow().iter().cloned());
            Some(Value::new_set(union))
        },
        _ => None,
    })
}

fn op_sub(lhs: &Value, rhs: &Value, line: usize) -> EvalResult<Option<Value>> {
    Ok(match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Some(Value::Number(*a - *b)),
        (Value::Char(c), Value::Number(n)) => Some(shift_char(*c, &-*n, "-", line)?),
        (Value::Char(a), Value::Char(b)) => {
            Some(Value::from_real(f64::from(*a) - f64::from(*b)))
        },
        (Value::Set(a), Value::Set(b)) => {
            // Set difference.
            let difference: Vec<Value> = a.borrow()
                                          .iter()
                                          .filter(|x| !b.borrow().iter().any(|y| x.equals(y)))
                                          .cloned()
                                          .collect();
            Some(Value::new_set(difference))
        },
        _ => None,
    })
}

fn op_mul(lhs: &Value, rhs: &Value, line: usize) -> EvalResult<Option<Value>> {
    Ok(match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Some(Value::Number(*a * *b)),
        (Value::Str(s), Value::Number(n)) => {
            Some(Value::Str(s.repeat(repeat_count(n, line)?)))
        },
        (Value::Array(v), Value::Number(n)) => {
            let count = repeat_count(n, line)?;
            let elements = v.borrow();
            let mut repeated = Vec::with_capacity(elements.len() * count);
            for _ in 0..count {
                repeated.extend(elements.iter().cloned());
            }
            Some(Value::new_array(repeated))
        },
        (Value::Set(a), Value::Set(b)) => {
            // Set intersection.
            let intersection: Vec<Value> = a.borrow()
                                            .iter()
                                            .filter(|x| b.borrow().iter().any(|y| x.equals(y)))
                                            .cloned()
                                            .collect();
            Some(Value::new_set(intersection))
        },
        _ => None,
    })
}

fn op_div(lhs: &Value, rhs: &Value) -> Option<Value> {
    match (lhs, rhs) {
        // Division by zero follows IEEE through the complex kernel.
        (Value::Number(a), Value::Number(b)) => Some(Value::Number(*a / *b)),
        _ => None,
    }
}

fn op_mod(lhs: &Value, rhs: &Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) if a.is_real() && b.is_real() => {
            Some(Value::from_real(a.re % b.re))
        },
        _ => None,
    }
}

fn op_pow(lhs: &Value, rhs: &Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => Some(Value::Number(a.pow(b))),
        _ => None,
    }
}

/// `a : b` — the integer sequence from `a` towards `b`, exclusive of `b`.
/// Equal endpoints collapse to the one-element sequence `[a]`.
fn op_seq(lhs: &Value, rhs: &Value) -> Option<Value> {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b))
            if a.is_integral_real() && b.is_integral_real() =>
        {
            let (from, to) = (a.re, b.re);
            let mut elements = Vec::new();
            if (from - to).abs() < f64::EPSILON {
                elements.push(Value::from_real(from));
            } else {
                let step = if from < to { 1.0 } else { -1.0 };
                let mut current = from;
                while (step > 0.0 && current < to) || (step < 0.0 && current > to) {
                    elements.push(Value::from_real(current));
                    current += step;
                }
            }
            Some(Value::new_array(elements))
        },
        _ => None,
    }
}

fn op_shift(op: BinaryOperator, lhs: &Value, rhs: &Value, line: usize) -> EvalResult<Option<Value>> {
    let (Value::Number(a), Value::Number(b)) = (lhs, rhs) else {
        return Ok(None);
    };
    if !a.is_real() || !b.is_real() {
        return Ok(None);
    }
    let bits = f64_to_i64_checked(a.re, "shift operand", line)?;
    let amount = f64_to_i64_checked(b.re, "shift amount", line)?;
    let amount = u32::try_from(amount).map_err(|_| {
                                          RuntimeError::BadArgument { details: format!("shift amount must be in 0..64, got {amount}"),
                                                                      line }
                                      })?;
    if amount >= 64 {
        return Err(RuntimeError::BadArgument { details: format!("shift amount must be in 0..64, got {amount}"),
                                               line });
    }
    let shifted = match op {
        BinaryOperator::Shl => bits << amount,
        _ => bits >> amount,
    };
    #[allow(clippy::cast_precision_loss)]
    Ok(Some(Value::from_real(shifted as f64)))
}

fn op_bitwise(op: BinaryOperator, lhs: &Value, rhs: &Value, line: usize) -> EvalResult<Option<Value>> {
    match (lhs, rhs) {
        (Value::Bool(a), Value::Bool(b)) => {
            Ok(Some(Value::Bool(match op {
                        BinaryOperator::BitAnd => *a && *b,
                        BinaryOperator::BitXor => *a != *b,
                        _ => *a || *b,
                    })))
        },
        (Value::Number(a), Value::Number(b)) if a.is_real() && b.is_real() => {
            let x = f64_to_i64_checked(a.re, "bitwise operand", line)?;
            let y = f64_to_i64_checked(b.re, "bitwise operand", line)?;
            let combined = match op {
                BinaryOperator::BitAnd => x & y,
                BinaryOperator::BitXor => x ^ y,
                _ => x | y,
            };
            #[allow(clippy::cast_precision_loss)]
            Ok(Some(Value::from_real(combined as f64)))
        },
        _ => Ok(None),
    }
}

fn op_compare(op: BinaryOperator, lhs: &Value, rhs: &Value) -> Option<Value> {
    use std::cmp::Ordering;
    let ordering = match (lhs, rhs) {
        // Complex numbers are unordered; only reals compare.
        (Value::Number(a), Value::Number(b)) if a.is_real() && b.is_real() => {
            a.re.partial_cmp(&b.re)?
        },
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        (Value::Char(a), Value::Char(b)) => a.cmp(b),
        _ => return None,
    };
    let holds = match op {
        BinaryOperator::Le => ordering != Ordering::Greater,
        BinaryOperator::Lt => ordering == Ordering::Less,
        BinaryOperator::Ge => ordering != Ordering::Less,
        _ => ordering == Ordering::Greater,
    };
    Some(Value::Bool(holds))
}

fn op_membership(needle: &Value, haystack: &Value) -> Option<Value> {
    match haystack {
        Value::Array(v) | Value::Set(v) => {
            Some(Value::Bool(v.borrow().iter().any(|e| e.equals(needle))))
        },
        Value::Str(s) => {
            let fragment = match needle {
                Value::Str(f) => f.clone(),
                Value::Char(c) => char::from_u32(*c)?.to_string(),
                _ => return None,
            };
            Some(Value::Bool(s.contains(&fragment)))
        },
        Value::Map(m) => Some(Value::Bool(m.borrow().has_own(&needle.to_string()))),
        _ => None,
    }
}

fn repeat_count(n: &Complex, line: usize) -> EvalResult<usize> {
    if !n.is_integral_real() || n.re < 0.0 {
        return Err(RuntimeError::BadArgument { details: format!("repetition count must be a non-negative whole number, got {n}"),
                                               line });
    }
    usize::try_from(f64_to_i64_checked(n.re, "repetition count", line)?).map_err(|_| {
        RuntimeError::BadArgument { details: "repetition count is out of range".to_string(),
                                    line }
    })
}

fn shift_char(code: u32, offset: &Complex, symbol: &str, line: usize) -> EvalResult<Value> {
    if !offset.is_integral_real() {
        return Err(RuntimeError::BadArgument { details: format!("char {symbol} requires a whole number, got {offset}"),
                                               line });
    }
    let shifted = i64::from(code) + f64_to_i64_checked(offset.re, "char offset", line)?;
    u32::try_from(shifted).map(Value::Char).map_err(|_| {
                              RuntimeError::BadArgument { details: format!("char code {shifted} is out of range"),
                                                          line }
                          })
}

/// Computed access `container[key]`.
///
/// Arrays and strings take integral indices, negative counting from the
/// end; out of range is `undefined`. Maps look the rendered key up through
/// the inheritance chain, binding functions to the map. Sets have no
/// positional access.
///
/// # Errors
/// `NULL_REF` for an undefined container, `TYPE_ERROR` elsewhere.
pub fn get_element(container: &Value, key: &Value, line: usize) -> EvalResult<Value> {
    match container {
        Value::Undefined => {
            Err(RuntimeError::NullReference { details: "Cannot index an undefined value".to_string(),
                                              line })
        },
        Value::Array(v) => {
            let index = index_from(key, line)?;
            Ok(resolve_index(index, v.borrow().len()).map_or(Value::Undefined, |i| v.borrow()[i].clone()))
        },
        Value::Str(s) => {
            let index = index_from(key, line)?;
            Ok(resolve_index(index, s.chars().count())
                .and_then(|i| s.chars().nth(i))
                .map_or(Value::Undefined, |c| Value::Str(c.to_string())))
        },
        Value::Map(m) => Ok(member_of_map(container, m, &key.to_string())),
        other => {
            Err(RuntimeError::Type { details: format!("Type {} does not support indexing",
                                                      other.type_name()),
                                     line })
        },
    }
}

/// Member access `object.name` / `object?.name`.
///
/// # Errors
/// `NULL_REF` for `.` on undefined (`?.` yields undefined instead),
/// `PROP` for types without properties.
pub fn get_member(object: &Value, name: &str, optional: bool, line: usize) -> EvalResult<Value> {
    match object {
        Value::Undefined if optional => Ok(Value::Undefined),
        Value::Undefined => {
            Err(RuntimeError::NullReference { details: format!("Cannot read property '{name}' of undefined"),
                                              line })
        },
        Value::Map(m) => Ok(member_of_map(object, m, name)),
        other => {
            Err(RuntimeError::Property { type_name: other.type_name().to_string(),
                                         property:  name.to_string(),
                                         line })
        },
    }
}

fn member_of_map(object: &Value,
                 handle: &crate::interpreter::value::map_object::MapHandle,
                 key: &str)
                 -> Value {
    match lookup_chain(handle, key) {
        // A function reached through a map binds the map as `self`.
        Some(Value::Func(func)) => Value::Func(func.bind(object.clone())),
        Some(value) => value,
        None => Value::Undefined,
    }
}

/// Element assignment `container[key] = value` (string targets are handled
/// by the lvalue layer, not here).
///
/// Array writes past the end backfill the gap with `undefined`; negative
/// indices must resolve inside the current bounds.
///
/// # Errors
/// `TYPE_ERROR` for unsupported containers, `BAD_ARG` for unresolvable
/// negative indices.
pub fn set_element(container: &Value, key: &Value, value: Value, line: usize) -> EvalResult<()> {
    match container {
        Value::Array(v) => {
            let index = index_from(key, line)?;
            let len = v.borrow().len();
            if let Some(resolved) = resolve_index(index, len) {
                v.borrow_mut()[resolved] = value;
                return Ok(());
            }
            if index < 0 {
                return Err(RuntimeError::BadArgument { details: format!("index {index} is out of range for length {len}"),
                                                       line });
            }
            let target = usize::try_from(index).map_err(|_| {
                                                   RuntimeError::BadArgument { details: format!("index {index} is out of range"),
                                                                               line }
                                               })?;
            let mut elements = v.borrow_mut();
            elements.resize(target, Value::Undefined);
            elements.push(value);
            Ok(())
        },
        Value::Map(m) => {
            m.borrow_mut().set_own(&key.to_string(), value);
            Ok(())
        },
        other => {
            Err(RuntimeError::Type { details: format!("Cannot assign into a value of type {}",
                                                      other.type_name()),
                                     line })
        },
    }
}

/// Element deletion. Removes and returns the element; a missing element is
/// `undefined`, not an error.
///
/// # Errors
/// `DEL` for containers that do not support deletion.
pub fn del_element(container: &Value, key: &Value, line: usize) -> EvalResult<Value> {
    match container {
        Value::Array(v) => {
            let index = index_from(key, line)?;
            let len = v.borrow().len();
            Ok(resolve_index(index, len).map_or(Value::Undefined, |i| v.borrow_mut().remove(i)))
        },
        Value::Set(v) => {
            let position = v.borrow().iter().position(|e| e.equals(key));
            Ok(position.map_or(Value::Undefined, |i| v.borrow_mut().remove(i)))
        },
        Value::Map(m) => {
            Ok(m.borrow_mut()
                .delete_own(&key.to_string())
                .unwrap_or(Value::Undefined))
        },
        other => {
            Err(RuntimeError::Delete { details: format!("from a value of type {}", other.type_name()),
                                       line })
        },
    }
}

fn index_from(key: &Value, line: usize) -> EvalResult<i64> {
    match key {
        Value::Number(z) if z.is_real() => f64_to_i64_checked(z.re, "index", line),
        other => {
            Err(RuntimeError::Type { details: format!("Index must be a whole real number, got {}",
                                                      other.type_name()),
                                     line })
        },
    }
}

#[cfg(test)]
mod tests {
    use super::{del_element, eval_binary, eval_unary, get_element, set_element};
    use crate::{
        ast::{BinaryOperator as Op, UnaryOperator},
        interpreter::value::{complex::Complex, core::Value},
    };

    fn real(x: f64) -> Value {
        Value::from_real(x)
    }

    #[test]
    fn string_repetition() {
        let v = eval_binary(Op::Mul, &Value::Str("ab".to_string()), &real(3.0), 0).unwrap();
        assert!(v.equals(&Value::Str("ababab".to_string())));
        assert!(eval_binary(Op::Mul, &Value::Str("ab".to_string()), &real(-1.0), 0).is_err());
    }

    #[test]
    fn concatenation_casts_the_right_side() {
        let v = eval_binary(Op::Add, &Value::Str("n = ".to_string()), &real(4.0), 0).unwrap();
        assert!(v.equals(&Value::Str("n = 4".to_string())));
    }

    #[test]
    fn sequences() {
        let v = eval_binary(Op::Seq, &real(1.0), &real(5.0), 0).unwrap();
        assert_eq!(v.to_string(), "[1, 2, 3, 4]");
        let v = eval_binary(Op::Seq, &real(5.0), &real(1.0), 0).unwrap();
        assert_eq!(v.to_string(), "[5, 4, 3, 2]");
        let v = eval_binary(Op::Seq, &real(3.0), &real(3.0), 0).unwrap();
        assert_eq!(v.to_string(), "[3]");
        assert!(eval_binary(Op::Seq, &real(1.5), &real(3.0), 0).is_err());
    }

    #[test]
    fn set_algebra() {
        let a = Value::new_set(vec![real(1.0), real(2.0), real(3.0)]);
        let b = Value::new_set(vec![real(2.0), real(3.0), real(4.0)]);
        let union = eval_binary(Op::Add, &a, &b, 0).unwrap();
        assert_eq!(union.length(0).unwrap(), 4);
        let intersection = eval_binary(Op::Mul, &a, &b, 0).unwrap();
        assert_eq!(intersection.length(0).unwrap(), 2);
        let difference = eval_binary(Op::Sub, &a, &b, 0).unwrap();
        assert_eq!(difference.to_string(), "{1}");
    }

    #[test]
    fn complex_numbers_are_unordered() {
        let z = Value::Number(Complex::new(1.0, 1.0));
        assert!(eval_binary(Op::Lt, &z, &real(2.0), 0).is_err());
        let eq = eval_binary(Op::Eq, &z, &real(2.0), 0).unwrap();
        assert!(eq.equals(&Value::Bool(false)));
    }

    #[test]
    fn membership() {
        let array = Value::new_array(vec![real(1.0), real(2.0)]);
        assert!(eval_binary(Op::In, &real(2.0), &array, 0).unwrap().truthy());
        assert!(!eval_binary(Op::In, &real(9.0), &array, 0).unwrap().truthy());
        let s = Value::Str("hello".to_string());
        assert!(eval_binary(Op::In, &Value::Str("ell".to_string()), &s, 0).unwrap().truthy());
    }

    #[test]
    fn bitwise_and_shifts() {
        assert!(eval_binary(Op::BitAnd, &real(6.0), &real(3.0), 0).unwrap().equals(&real(2.0)));
        assert!(eval_binary(Op::Shl, &real(1.0), &real(4.0), 0).unwrap().equals(&real(16.0)));
        assert!(eval_binary(Op::Shl, &real(1.5), &real(1.0), 0).is_err());
        assert!(eval_unary(UnaryOperator::BitNot, &real(0.0), 0).unwrap().equals(&real(-1.0)));
    }

    #[test]
    fn char_arithmetic() {
        let a = Value::Char(u32::from(b'a'));
        let shifted = eval_binary(Op::Add, &a, &real(2.0), 0).unwrap();
        assert!(shifted.equals(&Value::Char(u32::from(b'c'))));
        let diff = eval_binary(Op::Sub, &Value::Char(u32::from(b'c')), &a, 0).unwrap();
        assert!(diff.equals(&real(2.0)));
    }

    #[test]
    fn negative_indices_and_out_of_range() {
        let s = Value::Str("hello".to_string());
        let v = get_element(&s, &real(-1.0), 0).unwrap();
        assert!(v.equals(&Value::Str("o".to_string())));
        assert!(get_element(&s, &real(99.0), 0).unwrap().equals(&Value::Undefined));
    }

    #[test]
    fn array_set_backfills() {
        let array = Value::new_array(vec![real(1.0)]);
        set_element(&array, &real(3.0), real(9.0), 0).unwrap();
        assert_eq!(array.to_string(), "[1, undefined, undefined, 9]");
    }

    #[test]
    fn deletion_returns_the_element() {
        let array = Value::new_array(vec![real(1.0), real(2.0)]);
        let removed = del_element(&array, &real(0.0), 0).unwrap();
        assert!(removed.equals(&real(1.0)));
        assert_eq!(array.to_string(), "[2]");
        assert!(del_element(&array, &real(50.0), 0).unwrap().equals(&Value::Undefined));
    }

    #[test]
    fn type_errors_name_both_operands() {
        let err = eval_binary(Op::Add, &Value::new_set(vec![]), &real(1.0), 0).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("set"));
        assert!(message.contains("real"));
        assert!(message.contains("TYPE_ERROR"));
    }
}
