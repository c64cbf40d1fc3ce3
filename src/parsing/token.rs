
use super::operator::OpInfo;

use std::fmt::{self, Display, Formatter};

/// A token in postfix order, as produced by the shunting yard parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
  /// A literal or variable token, exactly as it appeared in the
  /// input. What it denotes is decided later, by a resolver.
  Value(String),
  /// An operator, carrying a clone of its registered descriptor.
  Operator(OpInfo),
}

impl Token {
  pub fn value(text: impl Into<String>) -> Token {
    Token::Value(text.into())
  }

  pub fn operator(op: impl Into<OpInfo>) -> Token {
    Token::Operator(op.into())
  }

  /// The surface text of the token: the value itself, or the
  /// operator's registered name.
  pub fn text(&self) -> &str {
    match self {
      Token::Value(text) => text,
      Token::Operator(op) => op.name(),
    }
  }
}

impl Display for Token {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    write!(f, "{}", self.text())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use super::super::operator::{Associativity, InfixOp};

  #[test]
  fn test_token_display() {
    assert_eq!(Token::value("42").to_string(), "42");
    let op = Token::operator(InfixOp::new("+", Associativity::Left, 1));
    assert_eq!(op.to_string(), "+");
  }
}
