use std::{cell::RefCell, rc::Rc};

use crate::{
    error::RuntimeError,
    interpreter::{
        evaluator::core::EvalResult,
        value::{
            complex::Complex,
            func::FuncRef,
            map_object::{MapHandle, MapObject},
        },
    },
};

/// The public type names, as reported by `type()` and accepted by `cast()`.
pub const TYPE_NAMES: &[&str] = &["any",
                                  "complex",
                                  "complex_int",
                                  "real",
                                  "real_int",
                                  "string",
                                  "char",
                                  "bool",
                                  "array",
                                  "set",
                                  "map",
                                  "func"];

/// A shared handle to the element vector of an array or set.
pub type VecHandle = Rc<RefCell<Vec<Value>>>;

/// A runtime value.
///
/// Scalars (`Number`, `Str`, `Char`, `Bool`, `Undefined`) copy on
/// assignment. Collections (`Array`, `Set`, `Map`) are handles: assignment
/// aliases, and mutation through one handle is visible through all of them.
/// Sets are insertion-ordered vectors deduplicated by [`Value::equals`].
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value.
    Undefined,
    /// A number; purely real values behave as reals.
    Number(Complex),
    /// A string.
    Str(String),
    /// A character, stored as its code point so arithmetic can shift it.
    Char(u32),
    /// A boolean.
    Bool(bool),
    /// An array.
    Array(VecHandle),
    /// A set: insertion-ordered, deduplicated.
    Set(VecHandle),
    /// A map object.
    Map(MapHandle),
    /// A function reference.
    Func(FuncRef),
}

impl Value {
    /// A real number value.
    #[must_use]
    pub const fn from_real(re: f64) -> Self {
        Self::Number(Complex::real(re))
    }

    /// A fresh array handle over `elements`.
    #[must_use]
    pub fn new_array(elements: Vec<Self>) -> Self {
        Self::Array(Rc::new(RefCell::new(elements)))
    }

    /// A fresh set handle over `elements`, deduplicated in insertion
    /// order.
    #[must_use]
    pub fn new_set(elements: Vec<Self>) -> Self {
        let mut deduped: Vec<Self> = Vec::with_capacity(elements.len());
        for element in elements {
            if !deduped.iter().any(|e| e.equals(&element)) {
                deduped.push(element);
            }
        }
        Self::Set(Rc::new(RefCell::new(deduped)))
    }

    /// A fresh empty map handle.
    #[must_use]
    pub fn new_map() -> Self {
        Self::Map(MapObject::new_handle())
    }

    /// The public type name of this value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Number(z) if z.is_real() => "real",
            Self::Number(_) => "complex",
            Self::Str(_) => "string",
            Self::Char(_) => "char",
            Self::Bool(_) => "bool",
            Self::Array(_) => "array",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
            Self::Func(_) => "func",
        }
    }

    /// Whether the value is anything but `undefined`.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// Truthiness, as used by conditions and the logical operators:
    /// numbers are true iff nonzero, collections and strings iff nonempty,
    /// `undefined` is false, functions are true.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Undefined => false,
            Self::Number(z) => {
                // NaN components are falsy.
                (z.re != 0.0 && !z.re.is_nan()) || (z.im != 0.0 && !z.im.is_nan())
            },
            Self::Str(s) => !s.is_empty(),
            Self::Char(c) => *c != 0,
            Self::Bool(b) => *b,
            Self::Array(v) | Self::Set(v) => !v.borrow().is_empty(),
            Self::Map(m) => !m.borrow().entries.is_empty(),
            Self::Func(_) => true,
        }
    }

    /// Language equality.
    ///
    /// Same-type values compare structurally (arrays element-wise, sets
    /// and maps pairwise over their entries, with an identical-handle
    /// fast path); a char and a one-character string compare by scalar;
    /// any other cross-type pair is `false`, never an error.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined) => true,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Char(c), Self::Str(s)) | (Self::Str(s), Self::Char(c)) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(only), None) => only as u32 == *c,
                    _ => false,
                }
            },
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Array(a), Self::Array(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| x.equals(y))
                }
            },
            (Self::Set(a), Self::Set(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.len() == b.len()
                    && a.iter().all(|x| b.iter().any(|y| x.equals(y)))
                }
            },
            (Self::Map(a), Self::Map(b)) => {
                Rc::ptr_eq(a, b) || {
                    let (a, b) = (a.borrow(), b.borrow());
                    a.entries.len() == b.entries.len()
                    && a.entries.iter().all(|(key, value)| {
                                           b.entries
                                            .iter()
                                            .any(|(k, v)| k == key && v.equals(value))
                                       })
                }
            },
            (Self::Func(a), Self::Func(b)) => a.ref_eq(b),
            _ => false,
        }
    }

    /// Number of elements, characters, or entries.
    ///
    /// # Errors
    /// `TYPE_ERROR` for values without a length.
    pub fn length(&self, line: usize) -> EvalResult<usize> {
        match self {
            Self::Str(s) => Ok(s.chars().count()),
            Self::Array(v) | Self::Set(v) => Ok(v.borrow().len()),
            Self::Map(m) => Ok(m.borrow().entries.len()),
            other => Err(RuntimeError::Type { details: format!("Type {} has no length", other.type_name()),
                                              line }),
        }
    }

    /// Deep copy: fresh handles for collections, scalars cloned.
    ///
    /// Map copies keep the same `instance_of`/`inherits_from` links but
    /// copy the own entries.
    ///
    /// # Errors
    /// `CANT_COPY` for functions and for self-referential collections.
    pub fn deep_copy(&self, line: usize) -> EvalResult<Self> {
        self.deep_copy_inner(line, &mut Vec::new())
    }

    fn deep_copy_inner(&self, line: usize, visited: &mut Vec<*const ()>) -> EvalResult<Self> {
        match self {
            Self::Func(_) => Err(RuntimeError::CannotCopy { details: "a function".to_string(),
                                                            line }),
            Self::Array(v) | Self::Set(v) => {
                let pointer = Rc::as_ptr(v).cast::<()>();
                if visited.contains(&pointer) {
                    return Err(RuntimeError::CannotCopy { details: "a self-referential collection".to_string(),
                                                          line });
                }
                visited.push(pointer);
                let mut copied = Vec::with_capacity(v.borrow().len());
                for element in v.borrow().iter() {
                    copied.push(element.deep_copy_inner(line, visited)?);
                }
                visited.pop();
                Ok(match self {
                    Self::Array(_) => Self::new_array(copied),
                    _ => Self::Set(Rc::new(RefCell::new(copied))),
                })
            },
            Self::Map(m) => {
                let pointer = Rc::as_ptr(m).cast::<()>();
                if visited.contains(&pointer) {
                    return Err(RuntimeError::CannotCopy { details: "a self-referential map".to_string(),
                                                          line });
                }
                visited.push(pointer);
                let copy = MapObject::new_handle();
                {
                    let source = m.borrow();
                    let mut target = copy.borrow_mut();
                    target.instance_of = source.instance_of.clone();
                    target.inherits_from = source.inherits_from.clone();
                    for (key, value) in &source.entries {
                        let copied = value.deep_copy_inner(line, visited)?;
                        target.entries.push((key.clone(), copied));
                    }
                }
                visited.pop();
                Ok(Self::Map(copy))
            },
            scalar => Ok(scalar.clone()),
        }
    }
}

impl From<Complex> for Value {
    fn from(z: Complex) -> Self {
        Self::Number(z)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Display with a visited set so cyclic collections render as `[...]` /
/// `{...}` instead of recursing forever.
fn write_value(f: &mut std::fmt::Formatter<'_>,
               value: &Value,
               visited: &mut Vec<*const ()>)
               -> std::fmt::Result {
    match value {
        Value::Undefined => write!(f, "undefined"),
        Value::Number(z) => write!(f, "{z}"),
        Value::Str(s) => write!(f, "{s}"),
        Value::Char(c) => {
            match char::from_u32(*c) {
                Some(c) => write!(f, "{c}"),
                None => write!(f, "\u{fffd}"),
            }
        },
        Value::Bool(b) => write!(f, "{b}"),
        Value::Array(v) | Value::Set(v) => {
            let (open, close) = match value {
                Value::Array(_) => ('[', ']'),
                _ => ('{', '}'),
            };
            let pointer = Rc::as_ptr(v).cast::<()>();
            if visited.contains(&pointer) {
                return write!(f, "{open}...{close}");
            }
            visited.push(pointer);
            write!(f, "{open}")?;
            for (i, element) in v.borrow().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, element, visited)?;
            }
            visited.pop();
            write!(f, "{close}")
        },
        Value::Map(m) => {
            let pointer = Rc::as_ptr(m).cast::<()>();
            if visited.contains(&pointer) {
                return write!(f, "{{...}}");
            }
            visited.push(pointer);
            write!(f, "{{")?;
            for (i, (key, entry)) in m.borrow().entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}: ")?;
                write_value(f, entry, visited)?;
            }
            visited.pop();
            write!(f, "}}")
        },
        Value::Func(func) => write!(f, "<function {}>", func.name()),
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::Value;
    use crate::interpreter::value::complex::Complex;

    #[test]
    fn truthiness() {
        assert!(!Value::Undefined.truthy());
        assert!(!Value::from_real(0.0).truthy());
        assert!(Value::Number(Complex::imaginary(2.0)).truthy());
        assert!(!Value::Str(String::new()).truthy());
        assert!(Value::Str("x".to_string()).truthy());
        assert!(!Value::new_array(vec![]).truthy());
    }

    #[test]
    fn char_string_equality() {
        let c = Value::Char(u32::from(b'o'));
        let s = Value::Str("o".to_string());
        assert!(c.equals(&s));
        assert!(s.equals(&c));
        assert!(!c.equals(&Value::Str("oo".to_string())));
    }

    #[test]
    fn sets_ignore_order_and_duplicates() {
        let a = Value::new_set(vec![Value::from_real(1.0),
                                    Value::from_real(2.0),
                                    Value::from_real(1.0)]);
        let b = Value::new_set(vec![Value::from_real(2.0), Value::from_real(1.0)]);
        assert!(a.equals(&b));
        assert_eq!(a.length(0).unwrap(), 2);
    }

    #[test]
    fn mixed_types_are_unequal_not_errors() {
        assert!(!Value::from_real(1.0).equals(&Value::Str("1".to_string())));
        assert!(!Value::Bool(true).equals(&Value::from_real(1.0)));
    }

    #[test]
    fn aliased_arrays_compare_by_pointer_first() {
        let a = Value::new_array(vec![Value::from_real(1.0)]);
        let b = a.clone();
        assert!(a.equals(&b));
    }

    #[test]
    fn deep_copy_unaliases() {
        let inner = Value::new_array(vec![Value::from_real(1.0)]);
        let outer = Value::new_array(vec![inner.clone()]);
        let copy = outer.deep_copy(0).unwrap();

        if let (Value::Array(original), Value::Array(copied)) = (&outer, &copy) {
            assert!(!std::rc::Rc::ptr_eq(original, copied));
        } else {
            panic!("expected arrays");
        }
        assert!(copy.equals(&outer));
    }

    #[test]
    fn self_referential_copy_is_rejected() {
        let array = Value::new_array(vec![]);
        if let Value::Array(handle) = &array {
            handle.borrow_mut().push(array.clone());
        }
        assert!(array.deep_copy(0).is_err());
    }

    #[test]
    fn cyclic_display_terminates() {
        let array = Value::new_array(vec![Value::from_real(1.0)]);
        if let Value::Array(handle) = &array {
            handle.borrow_mut().push(array.clone());
        }
        assert_eq!(array.to_string(), "[1, [...]]");
    }
}
