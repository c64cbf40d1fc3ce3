
//! Conversion of infix token streams to postfix order via the
//! shunting yard algorithm.

use super::operator::{InfixOp, OpInfo};
use super::token::Token;
use crate::engine::ExprEngine;

use thiserror::Error;

use std::collections::VecDeque;

/// Error during infix parsing. Variants that point at a particular
/// input token record its zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ParseError {
  #[error("expected value, found {found:?} at position {at}")]
  ExpectedValue { found: String, at: usize },
  #[error("expected operator, found {found:?} at position {at}")]
  ExpectedOperator { found: String, at: usize },
  #[error("expected argument list, found {found:?} at position {at}")]
  ExpectedArgList { found: String, at: usize },
  #[error("comma outside of parentheses at position {at}")]
  CommaOutsideParens { at: usize },
  #[error("mismatched closing parenthesis at position {at}")]
  MismatchedParens { at: usize },
  #[error("unbalanced parentheses at end of input")]
  UnbalancedParens,
  #[error("unexpected end of input")]
  UnexpectedEnd,
}

/// What the parser is prepared to see next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expect {
  Value,
  Operator,
  /// A function requiring call syntax was just read; only `(` is
  /// acceptable here.
  Args,
}

#[derive(Debug, Clone)]
enum StackEntry {
  LeftParen,
  Op(OpInfo),
}

/// Lazy iterator converting an infix token stream to postfix
/// [`Token`]s. Produced by [`ExprEngine::parse_to_rpn`]; yields
/// `Result` items and fuses after the first error.
#[derive(Debug)]
pub struct ShuntingYard<'a, I> {
  engine: &'a ExprEngine,
  input: I,
  /// The implicit operator, resolved against the registry once per
  /// parse.
  implicit: Option<InfixOp>,
  stack: Vec<StackEntry>,
  pending: VecDeque<Token>,
  expect: Expect,
  pos: usize,
  done: bool,
}

impl<'a, I> ShuntingYard<'a, I> {
  pub(crate) fn new(engine: &'a ExprEngine, input: I) -> Self {
    ShuntingYard {
      engine,
      input,
      implicit: engine.implicit_infix(),
      stack: Vec::new(),
      pending: VecDeque::new(),
      expect: Expect::Value,
      pos: 0,
      done: false,
    }
  }

  /// Consumes one input token, updating the stack and the pending
  /// output queue.
  fn step(&mut self, token: &str) -> Result<(), ParseError> {
    match token {
      "(" => {
        if self.expect == Expect::Operator {
          self.insert_implicit(token)?;
        }
        self.stack.push(StackEntry::LeftParen);
        self.expect = Expect::Value;
        return Ok(());
      }
      ")" => {
        if !self.pop_until_paren() {
          return Err(ParseError::MismatchedParens { at: self.pos });
        }
        self.stack.pop();
        // A function call's descriptor sits directly beneath its
        // parens. Note that `expect` stays as-is: a call that closed
        // without arguments still owes us a value.
        match self.stack.pop() {
          Some(StackEntry::Op(op @ OpInfo::Function(_))) => {
            self.pending.push_back(Token::Operator(op));
          }
          Some(entry) => self.stack.push(entry),
          None => {}
        }
        return Ok(());
      }
      "," => {
        if self.expect == Expect::Value {
          return Err(ParseError::ExpectedValue { found: token.to_owned(), at: self.pos });
        }
        if !self.pop_until_paren() {
          return Err(ParseError::CommaOutsideParens { at: self.pos });
        }
        self.expect = Expect::Value;
        return Ok(());
      }
      _ => {}
    }

    // A name registered as infix reads as an operator here, unless we
    // are positioned before a value and the same name also names a
    // function (unary minus alongside binary minus).
    if let Some(op) = self.engine.get_infix(token) {
      if self.expect != Expect::Value {
        let op = op.clone();
        self.push_infix(op);
        self.expect = Expect::Value;
        return Ok(());
      }
      if self.engine.get_function(token).is_none() {
        return Err(ParseError::ExpectedValue { found: token.to_owned(), at: self.pos });
      }
    }

    if self.expect == Expect::Operator {
      self.insert_implicit(token)?;
    }

    if let Some(op) = self.engine.get_function(token) {
      let needs_parens = op.arity() > 1 || !self.engine.prefix_unary_fns();
      let op = op.clone();
      self.stack.push(StackEntry::Op(OpInfo::Function(op)));
      self.expect = if needs_parens { Expect::Args } else { Expect::Value };
      return Ok(());
    }

    if self.expect == Expect::Args {
      return Err(ParseError::ExpectedArgList { found: token.to_owned(), at: self.pos });
    }
    self.pending.push_back(Token::Value(token.to_owned()));
    self.expect = Expect::Operator;
    Ok(())
  }

  /// Inserts the configured implicit operator between two adjacent
  /// value-like tokens, or fails if none is configured.
  fn insert_implicit(&mut self, found: &str) -> Result<(), ParseError> {
    match self.implicit.clone() {
      Some(op) => {
        self.push_infix(op);
        Ok(())
      }
      None => Err(ParseError::ExpectedOperator { found: found.to_owned(), at: self.pos }),
    }
  }

  /// Pops the stack onto the output queue until an opening paren or
  /// an infix operator binding more loosely than `op`, then pushes
  /// `op`. Function descriptors never survive the loop: call syntax
  /// binds tighter than any infix operator.
  fn push_infix(&mut self, op: InfixOp) {
    let target = op.binding_precedence();
    while let Some(entry) = self.stack.last() {
      match entry {
        StackEntry::LeftParen => break,
        StackEntry::Op(OpInfo::Infix(top)) if top.precedence() < target => break,
        StackEntry::Op(_) => {
          if let Some(StackEntry::Op(popped)) = self.stack.pop() {
            self.pending.push_back(Token::Operator(popped));
          }
        }
      }
    }
    self.stack.push(StackEntry::Op(OpInfo::Infix(op)));
  }

  /// Pops operators onto the output queue up to, but not including,
  /// the nearest opening paren. Returns false if there is none.
  fn pop_until_paren(&mut self) -> bool {
    loop {
      match self.stack.pop() {
        None => return false,
        Some(StackEntry::LeftParen) => {
          self.stack.push(StackEntry::LeftParen);
          return true;
        }
        Some(StackEntry::Op(op)) => self.pending.push_back(Token::Operator(op)),
      }
    }
  }

  /// Stops the parse for good. A failing step may already have moved
  /// operators to the output queue; none of them are emitted after an
  /// error.
  fn fuse(&mut self, err: ParseError) -> ParseError {
    self.done = true;
    self.pending.clear();
    err
  }

  /// Drains the operator stack at end of input.
  fn finish(&mut self) -> Result<(), ParseError> {
    if self.expect == Expect::Value {
      return Err(ParseError::UnexpectedEnd);
    }
    while let Some(entry) = self.stack.pop() {
      match entry {
        StackEntry::LeftParen => return Err(ParseError::UnbalancedParens),
        StackEntry::Op(op) => self.pending.push_back(Token::Operator(op)),
      }
    }
    Ok(())
  }
}

impl<'a, I, S> Iterator for ShuntingYard<'a, I>
where I: Iterator<Item = S>,
      S: Into<String> {
  type Item = Result<Token, ParseError>;

  fn next(&mut self) -> Option<Self::Item> {
    loop {
      if let Some(token) = self.pending.pop_front() {
        return Some(Ok(token));
      }
      if self.done {
        return None;
      }
      match self.input.next() {
        Some(raw) => {
          let text = raw.into();
          if let Err(err) = self.step(&text) {
            return Some(Err(self.fuse(err)));
          }
          self.pos += 1;
        }
        None => {
          self.done = true;
          if let Err(err) = self.finish() {
            return Some(Err(self.fuse(err)));
          }
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::ExprEngine;
  use crate::eval::intrinsic::{FloatFn, Intrinsic, OpImpl};
  use crate::parsing::operator::FnOp;

  use once_cell::sync::Lazy;

  static ENGINE: Lazy<ExprEngine> = Lazy::new(|| {
    ExprEngine::common_operators()
      .register(FnOp::new("-", 1).with_impl(OpImpl::Intrinsic(Intrinsic::Neg)))
      .register(FnOp::new("sin", 1).with_impl(OpImpl::Float(FloatFn::Sin)))
      .register(FnOp::new("mul", 2).with_impl(OpImpl::Intrinsic(Intrinsic::Mul)))
  });

  static IMPLICIT_ENGINE: Lazy<ExprEngine> = Lazy::new(|| {
    ExprEngine::common_operators()
      .register(FnOp::new("sin", 1).with_impl(OpImpl::Float(FloatFn::Sin)))
      .set_implicit_op("*")
  });

  static CALL_ONLY_ENGINE: Lazy<ExprEngine> = Lazy::new(|| {
    ExprEngine::common_operators()
      .register(FnOp::new("sin", 1).with_impl(OpImpl::Float(FloatFn::Sin)))
      .unary_fn_as_prefix(false)
  });

  fn rpn(engine: &ExprEngine, input: &[&str]) -> Result<Vec<String>, ParseError> {
    engine
      .parse_to_rpn(input.iter().copied())
      .map(|token| token.map(|t| t.to_string()))
      .collect()
  }

  #[test]
  fn test_parenthesized_expression() {
    let tokens = rpn(&ENGINE, &["3", "*", "(", "2", "+", "1", ")"]).unwrap();
    assert_eq!(tokens, vec!["3", "2", "1", "+", "*"]);
  }

  #[test]
  fn test_precedence_ordering() {
    let tokens = rpn(&ENGINE, &["1", "+", "2", "*", "3"]).unwrap();
    assert_eq!(tokens, vec!["1", "2", "3", "*", "+"]);
  }

  #[test]
  fn test_left_associativity() {
    let tokens = rpn(&ENGINE, &["9", "-", "2", "-", "3"]).unwrap();
    assert_eq!(tokens, vec!["9", "2", "-", "3", "-"]);
  }

  #[test]
  fn test_right_associativity() {
    let tokens = rpn(&ENGINE, &["2", "^", "2", "^", "3"]).unwrap();
    assert_eq!(tokens, vec!["2", "2", "3", "^", "^"]);
  }

  #[test]
  fn test_implicit_operator_between_values() {
    let tokens = rpn(&IMPLICIT_ENGINE, &["2", "b"]).unwrap();
    assert_eq!(tokens, vec!["2", "b", "*"]);
  }

  #[test]
  fn test_implicit_operator_before_paren() {
    let tokens = rpn(&IMPLICIT_ENGINE, &["(", "a", ")", "(", "b", ")"]).unwrap();
    assert_eq!(tokens, vec!["a", "b", "*"]);
  }

  #[test]
  fn test_juxtaposition_without_implicit_operator() {
    let err = rpn(&ENGINE, &["2", "b"]).unwrap_err();
    assert_eq!(err, ParseError::ExpectedOperator { found: "b".to_owned(), at: 1 });
  }

  #[test]
  fn test_trailing_operator() {
    let err = rpn(&ENGINE, &["4", "+"]).unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEnd);
  }

  #[test]
  fn test_empty_input() {
    let err = rpn(&ENGINE, &[]).unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEnd);
  }

  #[test]
  fn test_operator_in_value_position() {
    let err = rpn(&ENGINE, &["*", "3"]).unwrap_err();
    assert_eq!(err, ParseError::ExpectedValue { found: "*".to_owned(), at: 0 });
  }

  #[test]
  fn test_unbalanced_open_paren() {
    let err = rpn(&ENGINE, &["(", "1", "+", "2"]).unwrap_err();
    assert_eq!(err, ParseError::UnbalancedParens);
  }

  #[test]
  fn test_stray_close_paren() {
    let err = rpn(&ENGINE, &["1", ")"]).unwrap_err();
    assert_eq!(err, ParseError::MismatchedParens { at: 1 });
  }

  #[test]
  fn test_comma_outside_parens() {
    let err = rpn(&ENGINE, &["1", ",", "2"]).unwrap_err();
    assert_eq!(err, ParseError::CommaOutsideParens { at: 1 });
  }

  #[test]
  fn test_function_call_syntax() {
    let tokens = rpn(&ENGINE, &["mul", "(", "3", ",", "4", ")"]).unwrap();
    assert_eq!(tokens, vec!["3", "4", "mul"]);
  }

  #[test]
  fn test_nested_call_arguments() {
    let tokens = rpn(&ENGINE, &["mul", "(", "3", ",", "sin", "5", ")"]).unwrap();
    assert_eq!(tokens, vec!["3", "5", "sin", "mul"]);
  }

  #[test]
  fn test_unary_function_prefix_style() {
    let tokens = rpn(&ENGINE, &["sin", "2"]).unwrap();
    assert_eq!(tokens, vec!["2", "sin"]);
  }

  #[test]
  fn test_unary_function_stacks() {
    let tokens = rpn(&ENGINE, &["sin", "sin", "2"]).unwrap();
    assert_eq!(tokens, vec!["2", "sin", "sin"]);
  }

  #[test]
  fn test_function_binds_tighter_than_infix() {
    let tokens = rpn(&ENGINE, &["sin", "2", "+", "3"]).unwrap();
    assert_eq!(tokens, vec!["2", "sin", "3", "+"]);
  }

  #[test]
  fn test_multi_arity_function_requires_parens() {
    let err = rpn(&ENGINE, &["mul", "4", ",", "5"]).unwrap_err();
    assert_eq!(err, ParseError::ExpectedArgList { found: "4".to_owned(), at: 1 });
  }

  #[test]
  fn test_prefix_style_disabled() {
    let err = rpn(&CALL_ONLY_ENGINE, &["sin", "2"]).unwrap_err();
    assert_eq!(err, ParseError::ExpectedArgList { found: "2".to_owned(), at: 1 });
    let tokens = rpn(&CALL_ONLY_ENGINE, &["sin", "(", "2", ")"]).unwrap();
    assert_eq!(tokens, vec!["2", "sin"]);
  }

  #[test]
  fn test_unary_minus_shares_name_with_binary() {
    let tokens = rpn(&ENGINE, &["-", "5"]).unwrap();
    assert_eq!(tokens, vec!["5", "-"]);
    let tokens = rpn(&ENGINE, &["3", "-", "5"]).unwrap();
    assert_eq!(tokens, vec!["3", "5", "-"]);
    let tokens = rpn(&ENGINE, &["3", "-", "-", "5"]).unwrap();
    assert_eq!(tokens, vec!["3", "5", "-", "-"]);
  }

  #[test]
  fn test_empty_call_still_expects_value() {
    let err = rpn(&ENGINE, &["sin", "(", ")", "+", "3"]).unwrap_err();
    assert_eq!(err, ParseError::ExpectedValue { found: "+".to_owned(), at: 3 });
    let err = rpn(&ENGINE, &["sin", "(", ")"]).unwrap_err();
    assert_eq!(err, ParseError::UnexpectedEnd);
  }

  #[test]
  fn test_error_fuses_iterator() {
    let mut iter = ENGINE.parse_to_rpn(["1", ")", "2"]);
    assert_eq!(iter.next(), Some(Ok(Token::value("1"))));
    assert_eq!(iter.next(), Some(Err(ParseError::MismatchedParens { at: 1 })));
    assert_eq!(iter.next(), None);
  }

  #[test]
  fn test_stacked_operators_not_emitted_after_error() {
    // The failing close paren pops `+` toward the output; the fused
    // iterator must swallow it.
    let mut iter = ENGINE.parse_to_rpn(["1", "+", "2", ")"]);
    assert_eq!(iter.next(), Some(Ok(Token::value("1"))));
    assert_eq!(iter.next(), Some(Ok(Token::value("2"))));
    assert_eq!(iter.next(), Some(Err(ParseError::MismatchedParens { at: 3 })));
    assert_eq!(iter.next(), None);
  }
}
