
//! Reduction of postfix token streams.
//!
//! A postfix stream folds into any output type over a value stack:
//! value tokens lift into the output type, and each operator consumes
//! its arity in operands. Tree building, rendering, and direct
//! evaluation are all instances of the same fold.

use super::operator::OpInfo;
use super::shunting_yard::ParseError;
use super::token::Token;
use crate::eval::EvalError;

use thiserror::Error;

/// A type implementing this trait directs [`reduce`], folding a
/// postfix token stream into `Self::Output`.
pub trait RpnFold {
  type Output;

  /// Lifts a value token into the output type.
  fn lift_value(&mut self, name: &str) -> Result<Self::Output, EvalError>;

  /// Applies an operator to already-lifted operands, in argument
  /// order. `args.len()` is always exactly `op.arity()`.
  fn apply_op(&mut self, op: &OpInfo, args: Vec<Self::Output>) -> Result<Self::Output, EvalError>;
}

/// Error during reduction. Parse and evaluation failures encountered
/// mid-fold pass through as their own variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ReduceError {
  #[error(transparent)]
  Parse(#[from] ParseError),
  #[error(transparent)]
  Eval(#[from] EvalError),
  /// The stream produced no output at all.
  #[error("empty formula")]
  EmptyFormula,
  /// An operator arrived with too few operands on the stack.
  #[error("missing values for operator {op}")]
  MissingValues { op: String },
  /// More than one operand remained after the final token.
  #[error("missing operators at end of formula")]
  MissingOperators,
}

/// Folds a postfix token stream down to a single output value.
pub fn reduce<F, I>(fold: &mut F, tokens: I) -> Result<F::Output, ReduceError>
where F: RpnFold,
      I: IntoIterator<Item = Result<Token, ParseError>> {
  let mut stack: Vec<F::Output> = Vec::new();
  for token in tokens {
    match token? {
      Token::Value(name) => {
        stack.push(fold.lift_value(&name)?);
      }
      Token::Operator(op) => {
        let arity = op.arity();
        if stack.len() < arity {
          return Err(ReduceError::MissingValues { op: op.name().to_owned() });
        }
        let args = stack.split_off(stack.len() - arity);
        stack.push(fold.apply_op(&op, args)?);
      }
    }
  }
  let result = stack.pop().ok_or(ReduceError::EmptyFormula)?;
  if !stack.is_empty() {
    return Err(ReduceError::MissingOperators);
  }
  Ok(result)
}
