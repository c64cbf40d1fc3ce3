
pub mod value;
pub mod walker;

use crate::parsing::operator::OpInfo;

use std::fmt::{self, Display, Formatter};

/// An expression tree built from a postfix token stream.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  /// A value already known, either resolved from a literal token or
  /// produced by folding.
  Const(value::Value),
  /// An unresolved name whose value must come from runtime bindings.
  Var(String),
  /// An operator applied to exactly `op.arity()` arguments.
  Apply(OpInfo, Vec<Expr>),
}

impl Expr {
  /// Convenience constructor for [Expr::Const].
  pub fn constant(value: impl Into<value::Value>) -> Expr {
    Expr::Const(value.into())
  }

  /// Convenience constructor for [Expr::Var].
  pub fn var(name: impl Into<String>) -> Expr {
    Expr::Var(name.into())
  }

  /// Convenience constructor for [Expr::Apply].
  pub fn apply(op: impl Into<OpInfo>, args: Vec<Expr>) -> Expr {
    Expr::Apply(op.into(), args)
  }

  pub fn is_const(&self) -> bool {
    matches!(self, Expr::Const(_))
  }

  pub fn as_const(&self) -> Option<&value::Value> {
    match self {
      Expr::Const(value) => Some(value),
      _ => None,
    }
  }
}

impl From<value::Value> for Expr {
  fn from(value: value::Value) -> Expr {
    Expr::Const(value)
  }
}

/// Renders the parenthesized prefix form: `(op arg ...)`.
impl Display for Expr {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    match self {
      Expr::Const(value) => write!(f, "{}", value),
      Expr::Var(name) => write!(f, "{}", name),
      Expr::Apply(op, args) => {
        write!(f, "({}", op.name())?;
        for arg in args {
          write!(f, " {}", arg)?;
        }
        write!(f, ")")
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parsing::operator::{Associativity, FnOp, InfixOp};

  #[test]
  fn test_display_nested() {
    let plus = InfixOp::new("+", Associativity::Left, 1);
    let sin = FnOp::new("sin", 1);
    let expr = Expr::apply(
      plus,
      vec![
        Expr::apply(sin, vec![Expr::var("x")]),
        Expr::constant(3.0),
      ],
    );
    assert_eq!(expr.to_string(), "(+ (sin x) 3)");
  }

  #[test]
  fn test_display_leaves() {
    assert_eq!(Expr::var("a").to_string(), "a");
    assert_eq!(Expr::constant(256.0).to_string(), "256");
  }
}
