
use crate::eval::EvalError;
use crate::parsing::reduce::ReduceError;
use crate::parsing::shunting_yard::ParseError;

use thiserror::Error;

/// Any failure an [`ExprEngine`](crate::ExprEngine) entry point can
/// produce, tagged with the stage it arose in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
  #[error("{0}")]
  Parse(#[from] ParseError),
  #[error("{0}")]
  Reduce(ReduceError),
  #[error("{0}")]
  Eval(#[from] EvalError),
}

impl From<ReduceError> for Error {
  fn from(err: ReduceError) -> Self {
    // Parse and evaluation failures surfaced through a reduction keep
    // their own stage tag.
    match err {
      ReduceError::Parse(err) => Self::Parse(err),
      ReduceError::Eval(err) => Self::Eval(err),
      err => Self::Reduce(err),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_reduce_errors_normalize_to_their_stage() {
    let err = Error::from(ReduceError::Parse(ParseError::UnexpectedEnd));
    assert_eq!(err, Error::Parse(ParseError::UnexpectedEnd));
    let err = Error::from(ReduceError::Eval(EvalError::custom("boom")));
    assert_eq!(err, Error::Eval(EvalError::custom("boom")));
    let err = Error::from(ReduceError::EmptyFormula);
    assert_eq!(err, Error::Reduce(ReduceError::EmptyFormula));
  }
}
