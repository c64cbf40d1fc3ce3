
//! Direct, single-pass evaluation of a postfix token stream.

use super::EvalError;
use super::bindings::Bindings;
use crate::engine::Resolver;
use crate::expr::value::Value;
use crate::parsing::operator::OpInfo;
use crate::parsing::reduce::RpnFold;

/// Fold that evaluates the stream as it arrives. Value tokens resolve
/// through the resolver first, then through the bindings; operators
/// apply their registered implementation, falling back to a function
/// bound under the operator's name. Anything still unresolved is an
/// immediate error.
pub struct Evaluator<'a> {
  resolver: &'a Resolver<'a>,
  env: &'a Bindings,
}

impl<'a> Evaluator<'a> {
  pub fn new(resolver: &'a Resolver<'a>, env: &'a Bindings) -> Evaluator<'a> {
    Evaluator { resolver, env }
  }
}

impl RpnFold for Evaluator<'_> {
  type Output = Value;

  fn lift_value(&mut self, name: &str) -> Result<Value, EvalError> {
    if let Some(value) = (self.resolver)(name) {
      return Ok(value);
    }
    match self.env.get(name) {
      Some(value) => Ok(value.clone()),
      None => Err(EvalError::UnboundVariable(name.to_owned())),
    }
  }

  fn apply_op(&mut self, op: &OpInfo, args: Vec<Value>) -> Result<Value, EvalError> {
    if let Some(implementation) = op.implementation() {
      return implementation.apply(op.name(), &args);
    }
    match self.env.get(op.name()) {
      Some(Value::Func(func)) => func.call(&args),
      Some(other) => Err(EvalError::TypeMismatch {
        op: op.name().to_owned(),
        expected: "function",
        found: other.type_name(),
      }),
      None => Err(EvalError::MissingImplementation(op.name().to_owned())),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::eval::intrinsic::{Intrinsic, OpImpl};
  use crate::expr::value::NativeFn;
  use crate::parsing::operator::{Associativity, InfixOp};
  use crate::parsing::reduce::reduce;
  use crate::parsing::token::Token;

  fn resolver(token: &str) -> Option<Value> {
    token.parse::<f64>().ok().map(Value::Number)
  }

  fn eval(tokens: Vec<Token>, env: &Bindings) -> Result<Value, EvalError> {
    let mut fold = Evaluator::new(&resolver, env);
    reduce(&mut fold, tokens.into_iter().map(Ok)).map_err(|err| match err {
      crate::parsing::reduce::ReduceError::Eval(err) => err,
      other => panic!("unexpected error: {}", other),
    })
  }

  fn plus_token() -> Token {
    Token::operator(InfixOp::new("+", Associativity::Left, 1).with_impl(OpImpl::Intrinsic(Intrinsic::Add)))
  }

  #[test]
  fn test_evaluates_with_implementation() {
    let tokens = vec![Token::value("2"), Token::value("3"), plus_token()];
    assert_eq!(eval(tokens, &Bindings::new()), Ok(Value::Number(5.0)));
  }

  #[test]
  fn test_resolver_wins_over_bindings() {
    let env: Bindings = [("2", Value::Number(99.0))].into_iter().collect();
    let tokens = vec![Token::value("2"), Token::value("3"), plus_token()];
    assert_eq!(eval(tokens, &env), Ok(Value::Number(5.0)));
  }

  #[test]
  fn test_variable_from_bindings() {
    let env: Bindings = [("a", Value::Number(4.0))].into_iter().collect();
    let tokens = vec![Token::value("a"), Token::value("3"), plus_token()];
    assert_eq!(eval(tokens, &env), Ok(Value::Number(7.0)));
  }

  #[test]
  fn test_unbound_variable() {
    let tokens = vec![Token::value("a"), Token::value("3"), plus_token()];
    assert_eq!(
      eval(tokens, &Bindings::new()),
      Err(EvalError::UnboundVariable("a".to_owned())),
    );
  }

  #[test]
  fn test_operator_implementation_from_bindings() {
    let bare = Token::operator(InfixOp::new("+", Associativity::Left, 1));
    let env: Bindings = [(
      "+",
      Value::Func(NativeFn::new(|args| {
        let a = args[0].as_number().unwrap();
        let b = args[1].as_number().unwrap();
        Ok(Value::Number(a + b + 100.0))
      })),
    )]
    .into_iter()
    .collect();
    let tokens = vec![Token::value("2"), Token::value("3"), bare];
    assert_eq!(eval(tokens, &env), Ok(Value::Number(105.0)));
  }

  #[test]
  fn test_missing_implementation() {
    let bare = Token::operator(InfixOp::new("+", Associativity::Left, 1));
    let tokens = vec![Token::value("2"), Token::value("3"), bare];
    assert_eq!(
      eval(tokens, &Bindings::new()),
      Err(EvalError::MissingImplementation("+".to_owned())),
    );
  }

  #[test]
  fn test_non_function_operator_binding() {
    let bare = Token::operator(InfixOp::new("+", Associativity::Left, 1));
    let env: Bindings = [("+", Value::Number(1.0))].into_iter().collect();
    let tokens = vec![Token::value("2"), Token::value("3"), bare];
    assert_eq!(
      eval(tokens, &env),
      Err(EvalError::TypeMismatch { op: "+".to_owned(), expected: "function", found: "number" }),
    );
  }
}
