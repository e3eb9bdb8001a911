use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        lexer::number::scan_number,
        value::{
            complex::Complex,
            core::{TYPE_NAMES, Value},
            map_object::MapObject,
        },
    },
};

/// Converts `value` to the public type `target`.
///
/// `any` is the identity. The `complex_int`/`real_int` targets perform the
/// base cast and then floor each component.
/// Collection-to-collection casts produce fresh handles except the
/// identity casts (`array` of an array, `set` of a set, `map` of a map),
/// which return the same handle.
///
/// # Errors
/// `CAST_ERROR` for edges the graph does not define and for string
/// contents that do not parse as a number; `BAD_ARG` for an unknown
/// `target` name.
pub fn cast(value: &Value, target: &str, line: usize) -> EvalResult<Value> {
    let failure = || {
        RuntimeError::Cast { from: value.type_name().to_string(),
                             to: target.to_string(),
                             value: value.to_string(),
                             line }
    };

    match target {
        "any" => Ok(value.clone()),
        "complex" => to_complex(value).map(Value::Number).ok_or_else(failure),
        "complex_int" => {
            to_complex(value).map(|z| Value::Number(Complex::new(z.re.floor(), z.im.floor())))
                             .ok_or_else(failure)
        },
        "real" => to_complex(value).map(|z| Value::from_real(z.re)).ok_or_else(failure),
        "real_int" => {
            to_complex(value).map(|z| Value::from_real(z.re.floor()))
                             .ok_or_else(failure)
        },
        "string" => Ok(Value::Str(value.to_string())),
        "char" => to_char(value).map(Value::Char).ok_or_else(failure),
        "bool" => Ok(Value::Bool(value.truthy())),
        "array" => to_array(value).ok_or_else(failure),
        "set" => to_set(value).ok_or_else(failure),
        "map" => to_map(value).ok_or_else(failure),
        "func" => {
            match value {
                Value::Func(_) => Ok(value.clone()),
                _ => Err(failure()),
            }
        },
        unknown => {
            Err(RuntimeError::BadArgument { details: format!("Unknown type name '{unknown}', expected one of {}",
                                                             TYPE_NAMES.join(", ")),
                                            line })
        },
    }
}

/// Parses the full numeric grammar out of a string, with an optional sign
/// and the spellings `inf`, `-inf` and `nan`. The whole string must be
/// consumed.
#[must_use]
pub fn parse_number_string(text: &str) -> Option<Complex> {
    let trimmed = text.trim();
    match trimmed {
        "inf" => return Some(Complex::real(f64::INFINITY)),
        "-inf" => return Some(Complex::real(f64::NEG_INFINITY)),
        "nan" => return Some(Complex::real(f64::NAN)),
        _ => {},
    }
    let (sign, digits) = trimmed.strip_prefix('-').map_or((1.0, trimmed), |r| (-1.0, r));
    let (scanned, consumed) = scan_number(digits).ok()?;
    if consumed != digits.len() {
        return None;
    }
    Some(if scanned.imaginary {
             Complex::imaginary(sign * scanned.value)
         } else {
             Complex::real(sign * scanned.value)
         })
}

fn to_complex(value: &Value) -> Option<Complex> {
    match value {
        Value::Number(z) => Some(*z),
        Value::Bool(b) => Some(Complex::real(if *b { 1.0 } else { 0.0 })),
        Value::Char(c) => Some(Complex::real(f64::from(*c))),
        Value::Str(s) => parse_number_string(s),
        _ => None,
    }
}

fn to_char(value: &Value) -> Option<u32> {
    match value {
        Value::Char(c) => Some(*c),
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(only), None) => Some(only as u32),
                _ => None,
            }
        },
        Value::Number(z) if z.is_integral_real() && z.re >= 0.0 && z.re <= f64::from(u32::MAX) => {
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            Some(z.re as u32)
        },
        _ => None,
    }
}

fn to_array(value: &Value) -> Option<Value> {
    match value {
        Value::Array(_) => Some(value.clone()),
        Value::Set(v) => Some(Value::new_array(v.borrow().clone())),
        Value::Str(s) => {
            Some(Value::new_array(s.chars().map(|c| Value::Str(c.to_string())).collect()))
        },
        _ => None,
    }
}

fn to_set(value: &Value) -> Option<Value> {
    match value {
        Value::Set(_) => Some(value.clone()),
        Value::Array(v) => Some(Value::new_set(v.borrow().clone())),
        Value::Str(s) => {
            Some(Value::new_set(s.chars().map(|c| Value::Str(c.to_string())).collect()))
        },
        _ => None,
    }
}

fn to_map(value: &Value) -> Option<Value> {
    match value {
        Value::Map(_) => Some(value.clone()),
        // The empty brace literal is a set; casting it is how script code
        // spells an empty map.
        Value::Set(v) if v.borrow().is_empty() => Some(Value::Map(MapObject::new_handle())),
        Value::Array(v) => {
            // An array of [key, value] pairs.
            let handle = MapObject::new_handle();
            {
                let mut map = handle.borrow_mut();
                for element in v.borrow().iter() {
                    let Value::Array(pair) = element else {
                        return None;
                    };
                    let pair = pair.borrow();
                    let [key, entry] = pair.as_slice() else {
                        return None;
                    };
                    map.set_own(&key.to_string(), entry.clone());
                }
            }
            Some(Value::Map(handle))
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{cast, parse_number_string};
    use crate::interpreter::value::{complex::Complex, core::Value};

    #[test]
    fn numeric_strings() {
        assert_eq!(parse_number_string("42").unwrap(), Complex::real(42.0));
        assert_eq!(parse_number_string("-2.5e1").unwrap(), Complex::real(-25.0));
        assert_eq!(parse_number_string("3i").unwrap(), Complex::imaginary(3.0));
        assert_eq!(parse_number_string("0xFF").unwrap(), Complex::real(255.0));
        assert!(parse_number_string("12abc").is_none());
        assert!(parse_number_string("").is_none());
    }

    #[test]
    fn int_casts_floor() {
        let v = cast(&Value::from_real(2.6), "real_int", 0).unwrap();
        assert!(v.equals(&Value::from_real(2.0)));

        let z = cast(&Value::Number(Complex::new(1.9, -0.5)), "complex_int", 0).unwrap();
        assert!(z.equals(&Value::Number(Complex::new(1.0, -1.0))));
    }

    #[test]
    fn real_cast_takes_the_real_component() {
        let z = Value::Number(Complex::new(2.0, 9.0));
        assert!(cast(&z, "real", 0).unwrap().equals(&Value::from_real(2.0)));
    }

    #[test]
    fn string_renders_display() {
        let v = cast(&Value::new_array(vec![Value::from_real(1.0)]), "string", 0).unwrap();
        assert!(v.equals(&Value::Str("[1]".to_string())));
    }

    #[test]
    fn bool_cast_is_truthiness() {
        assert!(cast(&Value::Str("x".to_string()), "bool", 0).unwrap().equals(&Value::Bool(true)));
        assert!(cast(&Value::Undefined, "bool", 0).unwrap().equals(&Value::Bool(false)));
    }

    #[test]
    fn array_self_cast_keeps_the_handle() {
        let array = Value::new_array(vec![Value::from_real(1.0)]);
        let result = cast(&array, "array", 0).unwrap();
        if let (Value::Array(a), Value::Array(b)) = (&array, &result) {
            assert!(Rc::ptr_eq(a, b));
        } else {
            panic!("expected arrays");
        }
    }

    #[test]
    fn empty_set_becomes_an_empty_map() {
        let result = cast(&Value::new_set(vec![]), "map", 0).unwrap();
        assert!(matches!(result, Value::Map(_)));
        assert!(cast(&Value::new_set(vec![Value::from_real(1.0)]), "map", 0).is_err());
    }

    #[test]
    fn undefined_edges_fail() {
        assert!(cast(&Value::Undefined, "real", 0).is_err());
        assert!(cast(&Value::from_real(1.0), "func", 0).is_err());
    }

    #[test]
    fn unknown_type_is_a_bad_argument() {
        use crate::error::{ErrorCode, RuntimeError};
        let err = cast(&Value::from_real(1.0), "quaternion", 0).unwrap_err();
        assert!(matches!(&err, RuntimeError::BadArgument { .. }));
        assert_eq!(err.code(), ErrorCode::BadArg);
    }
}
