
//! Runtime values.

use crate::eval::EvalError;

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// A value produced by evaluation or supplied through bindings.
/// `Number`, `Bool`, and `Str` are the primitive values; `Func` wraps
/// a caller-supplied operator implementation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
  Number(f64),
  Bool(bool),
  Str(String),
  Func(NativeFn),
}

/// A shared handle to a native operator implementation.
///
/// Cloning copies the handle, not the closure. Equality is pointer
/// identity: two handles compare equal exactly when they share the
/// same underlying allocation.
#[derive(Clone)]
pub struct NativeFn {
  func: Arc<dyn Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync>,
}

impl Value {
  pub fn type_name(&self) -> &'static str {
    match self {
      Value::Number(_) => "number",
      Value::Bool(_) => "boolean",
      Value::Str(_) => "string",
      Value::Func(_) => "function",
    }
  }

  /// Anything is truthy except `false`, zero, NaN, and the empty
  /// string.
  pub fn is_truthy(&self) -> bool {
    match self {
      Value::Number(n) => *n != 0.0 && !n.is_nan(),
      Value::Bool(b) => *b,
      Value::Str(s) => !s.is_empty(),
      Value::Func(_) => true,
    }
  }

  pub fn as_number(&self) -> Option<f64> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }

  /// True for everything except `Func`. Primitive values can be
  /// burned directly into a specialized callable.
  pub fn is_primitive(&self) -> bool {
    !matches!(self, Value::Func(_))
  }
}

impl NativeFn {
  pub fn new<F>(func: F) -> NativeFn
  where F: Fn(&[Value]) -> Result<Value, EvalError> + Send + Sync + 'static {
    NativeFn { func: Arc::new(func) }
  }

  pub fn call(&self, args: &[Value]) -> Result<Value, EvalError> {
    (self.func)(args)
  }
}

impl PartialEq for NativeFn {
  fn eq(&self, other: &NativeFn) -> bool {
    Arc::ptr_eq(&self.func, &other.func)
  }
}

impl fmt::Debug for NativeFn {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    f.write_str("NativeFn(..)")
  }
}

impl Display for Value {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    match self {
      Value::Number(n) => write!(f, "{}", n),
      Value::Bool(b) => write!(f, "{}", b),
      Value::Str(s) => write!(f, "{}", s),
      Value::Func(_) => write!(f, "<function>"),
    }
  }
}

impl From<f64> for Value {
  fn from(n: f64) -> Value {
    Value::Number(n)
  }
}

impl From<i64> for Value {
  fn from(n: i64) -> Value {
    Value::Number(n as f64)
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Value {
    Value::Bool(b)
  }
}

impl From<&str> for Value {
  fn from(s: &str) -> Value {
    Value::Str(s.to_owned())
  }
}

impl From<String> for Value {
  fn from(s: String) -> Value {
    Value::Str(s)
  }
}

impl From<NativeFn> for Value {
  fn from(func: NativeFn) -> Value {
    Value::Func(func)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_function_equality_is_pointer_identity() {
    let f = NativeFn::new(|_| Ok(Value::Number(0.0)));
    let g = NativeFn::new(|_| Ok(Value::Number(0.0)));
    assert_eq!(f, f.clone());
    assert_ne!(f, g);
  }

  #[test]
  fn test_truthiness() {
    assert!(Value::Number(2.0).is_truthy());
    assert!(!Value::Number(0.0).is_truthy());
    assert!(!Value::Number(f64::NAN).is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(Value::from("x").is_truthy());
    assert!(Value::from(NativeFn::new(|_| Ok(Value::Bool(true)))).is_truthy());
  }

  #[test]
  fn test_whole_numbers_display_without_fraction() {
    assert_eq!(Value::Number(3.0).to_string(), "3");
    assert_eq!(Value::Number(2.5).to_string(), "2.5");
  }

  #[test]
  fn test_primitive_values() {
    assert!(Value::Number(1.0).is_primitive());
    assert!(Value::from("s").is_primitive());
    assert!(!Value::from(NativeFn::new(|_| Ok(Value::Bool(true)))).is_primitive());
  }
}
