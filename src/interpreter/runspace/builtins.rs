use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        runspace::core::Runspace,
        value::{cast, core::Value, ops},
    },
    util::num::{f64_to_i64_checked, usize_to_f64},
};

/// Registers the core builtins. They are thin wrappers over engine
/// operations; their main job is exercising the registration and
/// argument-casting machinery that host-provided builtins go through.
pub fn define_core(runspace: &mut Runspace) {
    runspace.define_builtin("print", &["value"], print, "Writes a value and a newline to standard output.");
    runspace.define_builtin("type", &["value"], type_name, "The type name of a value.");
    runspace.define_builtin("cast", &["value", "type: string"], cast_value, "Converts a value to the named type.");
    runspace.define_builtin("copy", &["value"], copy, "A deep copy of a value.");
    runspace.define_builtin("len", &["value"], len, "The length of a string or collection.");
    runspace.define_builtin("get", &["container", "key"], get, "Reads an element of a container.");
    runspace.define_builtin("set", &["container", "key", "value"], set, "Writes an element of a container.");
    runspace.define_builtin("del", &["container", "key"], del, "Removes and returns an element of a container.");
    runspace.define_builtin("chr", &["code: real"], chr, "The character with the given code.");
    runspace.define_builtin("ord", &["c: char"], ord, "The code of a character.");
    runspace.define_builtin("exit", &["code: ?real"], exit, "Stops the script with a status code.");
    runspace.define_builtin("import", &["name: string"], import, "Loads a registered native module.");
}

fn print(_runspace: &mut Runspace, args: &[Value], _line: usize) -> EvalResult<Value> {
    println!("{}", args[0]);
    Ok(Value::Undefined)
}

fn type_name(_runspace: &mut Runspace, args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::Str(args[0].type_name().to_string()))
}

fn cast_value(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::Str(target) = &args[1] else {
        return Err(RuntimeError::BadArgument { details: "type must be a string".to_string(),
                                               line });
    };
    cast::cast(&args[0], target, line)
}

fn copy(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    args[0].deep_copy(line)
}

fn len(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(Value::from_real(usize_to_f64(args[0].length(line)?)))
}

fn get(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    ops::get_element(&args[0], &args[1], line)
}

fn set(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    ops::set_element(&args[0], &args[1], args[2].clone(), line)?;
    Ok(args[0].clone())
}

fn del(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    ops::del_element(&args[0], &args[1], line)
}

fn chr(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    cast::cast(&args[0], "char", line)
}

fn ord(_runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::Char(code) = cast::cast(&args[0], "char", line)? else {
        return Err(RuntimeError::BadArgument { details: "expected a character".to_string(),
                                               line });
    };
    Ok(Value::from_real(f64::from(code)))
}

fn exit(runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    let code = match &args[0] {
        Value::Undefined => 0,
        Value::Number(z) => {
            let code = f64_to_i64_checked(z.re, "exit code", line)?;
            i32::try_from(code).map_err(|_| {
                                   RuntimeError::BadArgument { details: format!("exit code {code} is out of range"),
                                                               line }
                               })?
        },
        other => {
            return Err(RuntimeError::BadArgument { details: format!("exit code must be a real number, got {}",
                                                                    other.type_name()),
                                                   line });
        },
    };
    runspace.request_exit(code);
    Ok(Value::Undefined)
}

fn import(runspace: &mut Runspace, args: &[Value], line: usize) -> EvalResult<Value> {
    let Value::Str(name) = &args[0] else {
        return Err(RuntimeError::BadArgument { details: "module name must be a string".to_string(),
                                               line });
    };
    runspace.import(name, line)
}

#[cfg(test)]
mod tests {
    use crate::interpreter::{
        runspace::core::{Outcome, Runspace},
        value::core::Value,
    };

    fn run(source: &str) -> Option<Value> {
        match Runspace::new().execute(source) {
            Ok(Outcome::Finished(value)) => value,
            other => panic!("expected a finished run, got {other:?}"),
        }
    }

    #[test]
    fn core_builtins() {
        assert_eq!(run("type(1)").unwrap().to_string(), "real");
        assert_eq!(run("len(\"hello\")").unwrap().to_string(), "5");
        assert_eq!(run("get(\"hello\", -1)").unwrap().to_string(), "o");
        assert_eq!(run("ord(chr(65))").unwrap().to_string(), "65");
        assert_eq!(run("cast(\"0x10\", \"real\")").unwrap().to_string(), "16");
    }

    #[test]
    fn copy_is_deep() {
        let result = run("a = [[1]]; b = copy(a); b[0][0] = 2; a[0][0]").unwrap();
        assert_eq!(result.to_string(), "1");
    }

    #[test]
    fn exit_stops_execution() {
        match Runspace::new().execute("exit(3); 99").unwrap() {
            Outcome::Exited(code) => assert_eq!(code, 3),
            Outcome::Finished(_) => panic!("expected an exit"),
        }
    }

    #[test]
    fn syntax_errors_prevent_all_evaluation() {
        let mut runspace = Runspace::new();
        assert!(runspace.execute("x = 41\n1 +").is_err());
        assert!(runspace.lookup("x").is_none());
    }

    #[test]
    fn import_requires_registration() {
        let err = Runspace::new().execute("import(\"linalg\")").unwrap_err();
        assert!(err.to_string().contains("BAD_IMPORT"));
    }

    #[test]
    fn native_modules_install_bindings() {
        let mut runspace = Runspace::new();
        runspace.register_native_module("answers", |rs| {
                    rs.define_builtin("answer", &[], |_, _, _| Ok(Value::from_real(42.0)), "The answer.");
                    Ok(())
                });
        match runspace.execute("import(\"answers\"); answer()").unwrap() {
            Outcome::Finished(Some(value)) => assert_eq!(value.to_string(), "42"),
            other => panic!("expected 42, got {other:?}"),
        }
    }
}
