use std::fs;

use argand::{
    get_result,
    interpreter::runspace::core::{Outcome, Runspace},
};
use walkdir::WalkDir;

fn run(src: &str) -> String {
    match Runspace::new().execute(src) {
        Ok(Outcome::Finished(Some(value))) => value.to_string(),
        Ok(other) => panic!("Script produced no value: {other:?}\n{src}"),
        Err(e) => panic!("Script failed: {e}\n{src}"),
    }
}

fn assert_value(src: &str, expected: &str) {
    assert_eq!(run(src), expected, "for script: {src}");
}

fn assert_success(src: &str) {
    if let Err(e) = get_result(src, false) {
        panic!("Script failed: {e}\n{src}");
    }
}

fn assert_error_code(src: &str, code: &str) {
    match Runspace::new().execute(src) {
        Ok(result) => panic!("Script succeeded but was expected to fail: {result:?}\n{src}"),
        Err(e) => {
            assert_eq!(e.code().tag(), code, "for script: {src}\nerror: {e}");
        },
    }
}

#[test]
fn arithmetic_and_precedence() {
    assert_value("1 + 2 * 3", "7");
    assert_value("2 ** 10", "1024");
    assert_value("2 ** 3 ** 2", "512");
    assert_value("10 % 3", "1");
    // Remainder is float remainder, not restricted to integers.
    assert_value("3.5 % 2", "1.5");
    assert_value("7 / 2", "3.5");
    assert_value("1 << 4 | 1", "17");
}

#[test]
fn complex_arithmetic() {
    assert_value("3i * 3i", "-9");
    assert_value("(1 + 2i) * (3 - 1i)", "5 + 5i");
    assert_value("1i * 1i", "-1");
    // `i` is not a binding, so it stays usable as an ordinary variable.
    assert_value("i = 0\nwhile (i < 5) i += 1\ni", "5");
    assert_value("cast(2i + 1, \"real\")", "1");
}

#[test]
fn numeric_literals() {
    assert_value("0x1F", "31");
    assert_value("0b101", "5");
    assert_value("0o17", "15");
    assert_value("1_000_000", "1000000");
    assert_value("2e3", "2000");
    assert_value("1.5e-1", "0.15");
}

#[test]
fn strings_and_chars() {
    assert_value("\"ab\" * 3", "ababab");
    assert_value("\"n = \" + 4", "n = 4");
    assert_value("'a' + 1 == 'b'", "true");
    assert_value("'a' == \"a\"", "true");
    assert_value("x = 7; \"x is {x + 1}!\"", "x is 8!");
    assert_value("s = \"cat\"; s[0] = 'h'; s", "hat");
    assert_value("\"ell\" in \"hello\"", "true");
}

#[test]
fn sequences_and_indexing() {
    assert_value("1:5", "[1, 2, 3, 4]");
    assert_value("3:3", "[3]");
    assert_value("5:1", "[5, 4, 3, 2]");
    assert_value("get(\"hello\", -1)", "o");
    assert_value("a = [1, 2, 3]; a[-1] = 9; a[2]", "9");
    assert_value("a = [1]; a[3] = 4; a", "[1, undefined, undefined, 4]");
    assert_value("a = [1, 2]; a[99]", "undefined");
}

#[test]
fn collections() {
    assert_value("{1, 2, 2, 3}", "{1, 2, 3}");
    assert_value("{1, 2} + {2, 3}", "{1, 2, 3}");
    assert_value("{1, 2} * {2, 3}", "{2}");
    assert_value("[1] + [2, 3]", "[1, 2, 3]");
    assert_value("2 in [1, 2]", "true");
    assert_value("len({1, 2, 3})", "3");
    assert_value("cast({}, \"map\")", "{}");
}

#[test]
fn conditionals() {
    assert_value("if (false) 1; else 2;", "2");
    assert_value("if (true) 1; else 2;", "1");
    assert_value("x = 5\nif (x > 3) \"big\"\nelse if (x > 1) \"mid\"\nelse \"small\"", "big");
    assert_value("true ? 1 : 2", "1");
    assert_value("0 ? 1 : 2", "2");
    assert_value("undefined ?? 5", "5");
    assert_value("0 || 7", "7");
    assert_value("3 && 7", "7");
}

#[test]
fn loops() {
    assert_value("sum = 0; i = 0\nwhile (i < 5) { sum += i; i += 1 }\nsum", "10");
    assert_value("n = 0\nuntil (n >= 3) n += 1\nn", "3");
    assert_value("n = 10\ndo { n += 1 } while (false)\nn", "11");
    assert_value("sum = 0\nfor (i = 0; i < 10; i += 1) { if (i % 2) continue; sum += i }\nsum",
                 "20");
    assert_value("i = 0\nwhile (true) { i += 1; if (i == 4) break }\ni", "4");
    // The step clause is optional.
    assert_value("sum = 0\nfor (i = 0; i < 4) { sum += i; i += 1 }\nsum", "6");
    // A loop's value is its last completed body value.
    assert_value("i = 0\nwhile (i < 3) i += 1", "3");
}

#[test]
fn functions() {
    assert_value("func f(x) { return x * x; } f(4)", "16");
    assert_value("func fib(n: real) { if (n < 2) return n; return fib(n - 1) + fib(n - 2) }\nfib(10)",
                 "55");
    assert_value("square = func (x) return x * x\nsquare(9)", "81");
    assert_value("func add(a, b) return a + b\nargs = [1, 2]\nadd(...args)", "3");
    assert_value("func add(a, b) return a + b\nadd(...{1, 2})", "3");
    assert_value("func pick(a, b) { return a ?? b }\npick(undefined, 7)", "7");
    // Arguments are cast to the declared parameter type.
    assert_value("func hex(n: real) return n\nhex(\"0x10\")", "16");
    // No return: the body's last value is the result.
    assert_value("func inc(x) x + 1\ninc(5)", "6");
}

#[test]
fn maps() {
    assert_value("m = {a: 1, b: 2}; m.a + m.b", "3");
    assert_value("m = {a: 1}; m.b = 5; m.b", "5");
    assert_value("m = {a: 1}; m[\"a\"]", "1");
    assert_value("m = {a: 1}; m.missing", "undefined");
    assert_value("m = {a: 1}; m?.missing", "undefined");
    assert_value("\"a\" in {a: 1}", "true");
    assert_value("m = {value: 3, double: func (self) return self.value * 2}\nm.double()", "6");
}

#[test]
fn map_instantiation() {
    assert_value("Point = {x: 0, _Construct: func (self, x) self.x = x}\np = Point(4)\np.x", "4");
    assert_value("Point = {x: 0, norm: func (self) return self.x}\np = Point()\np.norm()", "0");
}

#[test]
fn casts_and_copies() {
    assert_value("cast(\"0x10\", \"real\")", "16");
    assert_value("cast(3.7, \"real_int\")", "3");
    assert_value("cast(\"abc\", \"array\")", "[a, b, c]");
    assert_value("cast(65, \"char\")", "A");
    assert_value("type(1 + 1i)", "complex");
    assert_value("a = [[1]]; b = copy(a); b[0][0] = 2; a[0][0]", "1");
}

#[test]
fn ans_binding() {
    let mut runspace = Runspace::new();
    runspace.store_ans = true;
    match runspace.execute("1 + 1\nans * 2").unwrap() {
        Outcome::Finished(Some(value)) => assert_eq!(value.to_string(), "4"),
        other => panic!("expected 4, got {other:?}"),
    }
}

#[test]
fn error_codes() {
    assert_error_code("1 + {1}", "TYPE_ERROR");
    assert_error_code("\"ab\" * -1", "BAD_ARG");
    assert_error_code("cast(1, \"func\")", "CAST_ERROR");
    assert_error_code("(5).x", "PROP");
    assert_error_code("(1)(2)", "NOT_CALLABLE");
    assert_error_code("undefined.x", "NULL_REF");
    assert_error_code("a = []; set(a, 0, a); copy(a)", "CANT_COPY");
    assert_error_code("del(5, 0)", "DEL");
    assert_error_code("f = func (x) x\nf(1, 2)", "ARG_COUNT");
    assert_error_code("import(\"missing\")", "BAD_IMPORT");
    assert_error_code("pi = 3", "GENERAL");
    assert_error_code("len(5", "UNMATCHED_BRACKET");
    assert_error_code("1 +", "SYNTAX");
}

#[test]
fn exit_propagates_from_functions() {
    match Runspace::new().execute("func stop() exit(7)\nstop()\n99").unwrap() {
        Outcome::Exited(code) => assert_eq!(code, 7),
        Outcome::Finished(_) => panic!("expected an exit"),
    }
}

#[test]
fn demo_scripts_work() {
    let mut count = 0;
    for entry in WalkDir::new("demos").into_iter()
                                      .filter_map(Result::ok)
                                      .filter(|e| e.path().extension().is_some_and(|ext| ext == "ag"))
    {
        let path = entry.path();
        let content =
            fs::read_to_string(path).unwrap_or_else(|e| panic!("Failed to read {path:?}: {e}"));
        count += 1;
        if let Err(e) = get_result(&content, false) {
            panic!("Demo script {path:?} failed: {e}");
        }
    }
    assert!(count > 0, "No demo scripts found in demos/");
}
