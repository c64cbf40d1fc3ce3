
use thiserror::Error;

/// Error during evaluation, whether direct, partial, or through a
/// specialized callable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EvalError {
  #[error("no implementation for operator {0}")]
  MissingImplementation(String),
  #[error("unbound variable {0}")]
  UnboundVariable(String),
  #[error("operator {op} expects {expected} argument(s), got {got}")]
  ArityMismatch { op: String, expected: usize, got: usize },
  #[error("operator {op} expected {expected}, found {found}")]
  TypeMismatch { op: String, expected: &'static str, found: &'static str },
  /// Failure reported by a caller-supplied implementation.
  #[error("{0}")]
  Custom(String),
}

impl EvalError {
  pub fn custom(message: impl Into<String>) -> EvalError {
    EvalError::Custom(message.into())
  }
}
