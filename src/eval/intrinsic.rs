
//! Built-in operator implementations.

use super::EvalError;
use crate::expr::value::{NativeFn, Value};

/// How a registered operator computes: a built-in [`Intrinsic`], a
/// platform float function, or a caller-supplied [`NativeFn`].
#[derive(Debug, Clone, PartialEq)]
pub enum OpImpl {
  Intrinsic(Intrinsic),
  Float(FloatFn),
  Native(NativeFn),
}

impl OpImpl {
  /// Applies the implementation to fully evaluated arguments. `name`
  /// is the operator's registered name, used in diagnostics.
  pub fn apply(&self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match self {
      OpImpl::Intrinsic(intrinsic) => intrinsic.apply(name, args),
      OpImpl::Float(func) => func.apply(name, args),
      OpImpl::Native(func) => func.call(args),
    }
  }
}

/// The built-in operator set: arithmetic on numbers, bitwise logic on
/// integer-truncated numbers, and logical negation on truthiness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intrinsic {
  Add,
  Sub,
  Mul,
  Div,
  Rem,
  And,
  Or,
  Xor,
  Nand,
  Nor,
  Xnor,
  Neg,
  Invert,
  Not,
}

impl Intrinsic {
  pub fn arity(self) -> usize {
    match self {
      Intrinsic::Neg | Intrinsic::Invert | Intrinsic::Not => 1,
      _ => 2,
    }
  }

  /// The value semantics. Division and remainder follow IEEE 754
  /// (zero divisors produce infinities or NaN, never an error).
  pub fn apply(self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    check_arity(name, self.arity(), args)?;
    match self {
      Intrinsic::Add => binary_num(name, args, |a, b| a + b),
      Intrinsic::Sub => binary_num(name, args, |a, b| a - b),
      Intrinsic::Mul => binary_num(name, args, |a, b| a * b),
      Intrinsic::Div => binary_num(name, args, |a, b| a / b),
      Intrinsic::Rem => binary_num(name, args, |a, b| a % b),
      Intrinsic::And => binary_bits(name, args, |a, b| a & b),
      Intrinsic::Or => binary_bits(name, args, |a, b| a | b),
      Intrinsic::Xor => binary_bits(name, args, |a, b| a ^ b),
      Intrinsic::Nand => binary_bits(name, args, |a, b| !(a & b)),
      Intrinsic::Nor => binary_bits(name, args, |a, b| !(a | b)),
      Intrinsic::Xnor => binary_bits(name, args, |a, b| !(a ^ b)),
      Intrinsic::Neg => {
        let n = expect_number(name, &args[0])?;
        Ok(Value::Number(-n))
      }
      Intrinsic::Invert => {
        let n = expect_number(name, &args[0])?;
        Ok(Value::Number(!truncate(n) as f64))
      }
      Intrinsic::Not => Ok(Value::Bool(!args[0].is_truthy())),
    }
  }
}

/// Platform float functions, applied as direct `f64` method calls.
/// These carry no algebraic identity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatFn {
  Sin,
  Cos,
  Tan,
  Sqrt,
  Exp,
  Ln,
  Log10,
  Abs,
  Floor,
  Ceil,
  Pow,
}

impl FloatFn {
  pub fn arity(self) -> usize {
    match self {
      FloatFn::Pow => 2,
      _ => 1,
    }
  }

  pub fn apply(self, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    check_arity(name, self.arity(), args)?;
    let x = expect_number(name, &args[0])?;
    let result = match self {
      FloatFn::Sin => x.sin(),
      FloatFn::Cos => x.cos(),
      FloatFn::Tan => x.tan(),
      FloatFn::Sqrt => x.sqrt(),
      FloatFn::Exp => x.exp(),
      FloatFn::Ln => x.ln(),
      FloatFn::Log10 => x.log10(),
      FloatFn::Abs => x.abs(),
      FloatFn::Floor => x.floor(),
      FloatFn::Ceil => x.ceil(),
      FloatFn::Pow => x.powf(expect_number(name, &args[1])?),
    };
    Ok(Value::Number(result))
  }
}

fn check_arity(name: &str, expected: usize, args: &[Value]) -> Result<(), EvalError> {
  if args.len() != expected {
    return Err(EvalError::ArityMismatch {
      op: name.to_owned(),
      expected,
      got: args.len(),
    });
  }
  Ok(())
}

fn expect_number(name: &str, value: &Value) -> Result<f64, EvalError> {
  value.as_number().ok_or_else(|| EvalError::TypeMismatch {
    op: name.to_owned(),
    expected: "number",
    found: value.type_name(),
  })
}

/// Bitwise operators see their operands truncated toward zero to
/// 64-bit integers (saturating at the representable range).
fn truncate(n: f64) -> i64 {
  n as i64
}

fn binary_num(name: &str, args: &[Value], f: impl Fn(f64, f64) -> f64) -> Result<Value, EvalError> {
  let a = expect_number(name, &args[0])?;
  let b = expect_number(name, &args[1])?;
  Ok(Value::Number(f(a, b)))
}

fn binary_bits(name: &str, args: &[Value], f: impl Fn(i64, i64) -> i64) -> Result<Value, EvalError> {
  let a = expect_number(name, &args[0])?;
  let b = expect_number(name, &args[1])?;
  Ok(Value::Number(f(truncate(a), truncate(b)) as f64))
}
