use std::rc::Rc;

use crate::{
    ast::{Block, Param},
    interpreter::{
        evaluator::core::EvalResult,
        runspace::core::Runspace,
        value::core::Value,
    },
};

/// The native signature of a builtin. Arguments arrive already cast to the
/// declared parameter constraints, aligned to the parameter list (omitted
/// optionals are `undefined`).
pub type BuiltinBody = fn(&mut Runspace, &[Value], usize) -> EvalResult<Value>;

/// A function defined in script source.
#[derive(Debug, Clone, PartialEq)]
pub struct UserFunction {
    /// Name for diagnostics; `<anonymous>` for function literals.
    pub name:   String,
    /// Declared parameters, in order.
    pub params: Vec<Param>,
    /// The returnable body.
    pub body:   Block,
}

/// A function provided by the host through the registration interface.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltinFunction {
    /// Name the function is bound under.
    pub name:        String,
    /// Declared parameters, in order.
    pub params:      Vec<Param>,
    /// One-line description for help surfaces.
    pub description: String,
    /// The native implementation.
    pub body:        BuiltinBody,
}

/// Either kind of callable.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncKind {
    /// Script-defined.
    User(UserFunction),
    /// Host-defined.
    Builtin(BuiltinFunction),
}

/// A first-class function value: a shared definition plus an optional bound
/// `self`, prepended to the arguments at call time.
///
/// Binding happens when a function is retrieved through a map's member
/// lookup, so `obj.method(x)` sees `obj` as its first argument.
#[derive(Debug, Clone)]
pub struct FuncRef {
    /// The shared definition.
    pub kind:  Rc<FuncKind>,
    /// The value prepended to calls, if any.
    pub bound: Option<Box<Value>>,
}

impl FuncRef {
    /// Wraps a user function.
    #[must_use]
    pub fn user(function: UserFunction) -> Self {
        Self { kind:  Rc::new(FuncKind::User(function)),
               bound: None, }
    }

    /// Wraps a builtin.
    #[must_use]
    pub fn builtin(function: BuiltinFunction) -> Self {
        Self { kind:  Rc::new(FuncKind::Builtin(function)),
               bound: None, }
    }

    /// A copy of this reference with `self_value` prepended to future
    /// calls.
    #[must_use]
    pub fn bind(&self, self_value: Value) -> Self {
        Self { kind:  Rc::clone(&self.kind),
               bound: Some(Box::new(self_value)), }
    }

    /// The function's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self.kind.as_ref() {
            FuncKind::User(f) => &f.name,
            FuncKind::Builtin(f) => &f.name,
        }
    }

    /// The declared parameters.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        match self.kind.as_ref() {
            FuncKind::User(f) => &f.params,
            FuncKind::Builtin(f) => &f.params,
        }
    }

    /// Acceptable argument counts after spread expansion and `self`
    /// binding, as `(min, max)`.
    #[must_use]
    pub fn arity(&self) -> (usize, usize) {
        let params = self.params();
        let required = params.iter().filter(|p| !p.optional).count();
        (required, params.len())
    }

    /// Human-readable signature, e.g. `f(x: real, places: ?real_int)`.
    #[must_use]
    pub fn signature(&self) -> String {
        let params: Vec<String> = self.params()
                                      .iter()
                                      .map(|p| {
                                          let marker = if p.optional { "?" } else { "" };
                                          if p.type_name == "any" && !p.optional {
                                              p.name.clone()
                                          } else {
                                              format!("{}: {marker}{}", p.name, p.type_name)
                                          }
                                      })
                                      .collect();
        format!("{}({})", self.name(), params.join(", "))
    }

    /// Whether both references share a definition and bound value.
    #[must_use]
    pub fn ref_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.kind, &other.kind)
        && match (&self.bound, &other.bound) {
            (None, None) => true,
            (Some(a), Some(b)) => a.equals(b),
            _ => false,
        }
    }
}

/// Parses one builtin parameter spec: `name`, `name: type` or
/// `name: ?type`, with a `?` prefix on the constraint marking the
/// parameter optional.
///
/// Specs are host-supplied constants; a malformed spec is a programming
/// error, so unknown shapes fall back to an `any` constraint rather than
/// failing registration.
#[must_use]
pub fn param_from_spec(spec: &str) -> Param {
    let trimmed = spec.trim();
    let (name, constraint) = match trimmed.split_once(':') {
        Some((name, ty)) => (name.trim(), ty.trim()),
        None => (trimmed, "any"),
    };
    let (optional, type_name) =
        constraint.strip_prefix('?').map_or((false, constraint), |r| (true, r.trim()));
    Param { name:      name.to_string(),
            type_name: type_name.to_string(),
            optional }
}

#[cfg(test)]
mod tests {
    use super::param_from_spec;

    #[test]
    fn specs() {
        let p = param_from_spec("x");
        assert_eq!((p.name.as_str(), p.type_name.as_str(), p.optional), ("x", "any", false));

        let p = param_from_spec("places: ?real_int");
        assert_eq!((p.name.as_str(), p.type_name.as_str(), p.optional),
                   ("places", "real_int", true));
    }
}
