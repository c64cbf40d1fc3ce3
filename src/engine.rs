
//! The expression engine: operator registry, parser configuration,
//! and the parse, evaluate, and compile entry points.

use crate::error::Error;
use crate::eval::EvalError;
use crate::eval::bindings::Bindings;
use crate::eval::compile::{self, Compiled};
use crate::eval::evaluator::Evaluator;
use crate::eval::intrinsic::{FloatFn, Intrinsic, OpImpl};
use crate::eval::partial::{self, PartialExpr};
use crate::expr::Expr;
use crate::expr::value::Value;
use crate::parsing::operator::{Associativity, FnOp, InfixOp, OpInfo};
use crate::parsing::reduce::{RpnFold, reduce};
use crate::parsing::shunting_yard::ShuntingYard;

use std::collections::HashMap;
use std::fmt::{self, Debug, Formatter};

/// Resolves a raw token to a constant value. Returning `None` marks
/// the token as a free variable rather than an error.
///
/// The lifetime parameter lets the standalone evaluation entry points
/// accept resolvers that borrow from their surroundings; the engine
/// itself stores a `'static` one.
pub type Resolver<'a> = dyn Fn(&str) -> Option<Value> + Send + Sync + 'a;

/// An operator registry plus parser configuration. Engines are built
/// up-front, fluent style, then shared freely: every entry point
/// takes `&self`.
///
/// The same name may be registered as an infix operator and as a
/// function; token position decides which reading applies.
pub struct ExprEngine {
  infix_ops: HashMap<String, InfixOp>,
  functions: HashMap<String, FnOp>,
  resolver: Box<Resolver<'static>>,
  implicit_op: Option<String>,
  unary_fn_as_prefix: bool,
}

impl ExprEngine {
  /// An empty engine: no operators, numeric literal resolution, no
  /// implicit operator, prefix style permitted for unary functions.
  pub fn new() -> ExprEngine {
    ExprEngine {
      infix_ops: HashMap::new(),
      functions: HashMap::new(),
      resolver: Box::new(default_resolver),
      implicit_op: None,
      unary_fn_as_prefix: true,
    }
  }

  /// An engine preloaded with the usual arithmetic operators.
  pub fn common_operators() -> ExprEngine {
    ExprEngine::new()
      .register(InfixOp::new("^", Associativity::Right, 9).with_impl(OpImpl::Float(FloatFn::Pow)))
      .register(InfixOp::new("*", Associativity::Left, 8).with_impl(OpImpl::Intrinsic(Intrinsic::Mul)))
      .register(InfixOp::new("/", Associativity::Left, 8).with_impl(OpImpl::Intrinsic(Intrinsic::Div)))
      .register(InfixOp::new("%", Associativity::Left, 8).with_impl(OpImpl::Intrinsic(Intrinsic::Rem)))
      .register(InfixOp::new("+", Associativity::Left, 7).with_impl(OpImpl::Intrinsic(Intrinsic::Add)))
      .register(InfixOp::new("-", Associativity::Left, 7).with_impl(OpImpl::Intrinsic(Intrinsic::Sub)))
  }

  /// Registers an operator, replacing any previous registration of
  /// the same name and shape.
  pub fn register(mut self, op: impl Into<OpInfo>) -> ExprEngine {
    match op.into() {
      OpInfo::Infix(op) => {
        self.infix_ops.insert(op.name().to_owned(), op);
      }
      OpInfo::Function(op) => {
        self.functions.insert(op.name().to_owned(), op);
      }
    }
    self
  }

  /// Installs the literal resolver consulted for every value token.
  pub fn lookup<F>(mut self, resolver: F) -> ExprEngine
  where F: Fn(&str) -> Option<Value> + Send + Sync + 'static {
    self.resolver = Box::new(resolver);
    self
  }

  /// Names the infix operator inserted between juxtaposed values. A
  /// name with no infix registration behaves as if none were
  /// configured.
  pub fn set_implicit_op(mut self, name: impl Into<String>) -> ExprEngine {
    self.implicit_op = Some(name.into());
    self
  }

  /// Removes the implicit operator; juxtaposed values are a parse
  /// error again.
  pub fn clear_implicit_op(mut self) -> ExprEngine {
    self.implicit_op = None;
    self
  }

  /// Whether arity-1 functions may be applied prefix style, without
  /// parentheses. Defaults to true.
  pub fn unary_fn_as_prefix(mut self, enabled: bool) -> ExprEngine {
    self.unary_fn_as_prefix = enabled;
    self
  }

  pub fn get_infix(&self, name: &str) -> Option<&InfixOp> {
    self.infix_ops.get(name)
  }

  pub fn get_function(&self, name: &str) -> Option<&FnOp> {
    self.functions.get(name)
  }

  pub(crate) fn prefix_unary_fns(&self) -> bool {
    self.unary_fn_as_prefix
  }

  pub(crate) fn implicit_infix(&self) -> Option<InfixOp> {
    self.implicit_op.as_deref().and_then(|name| self.infix_ops.get(name).cloned())
  }

  pub(crate) fn resolver(&self) -> &Resolver<'static> {
    &*self.resolver
  }

  /// Parses an infix token stream to postfix order, lazily. The
  /// returned iterator yields each output token as soon as the input
  /// permits and fuses after the first error.
  pub fn parse_to_rpn<I>(&self, tokens: I) -> ShuntingYard<'_, I::IntoIter>
  where I: IntoIterator,
        I::Item: Into<String> {
    ShuntingYard::new(self, tokens.into_iter())
  }

  /// Parses to an expression tree. Every value token becomes a
  /// variable leaf; resolution is the evaluation layers' concern.
  pub fn parse_to_expr<I>(&self, tokens: I) -> Result<Expr, Error>
  where I: IntoIterator,
        I::Item: Into<String> {
    reduce(&mut TreeFold, self.parse_to_rpn(tokens)).map_err(Error::from)
  }

  /// Parses to the parenthesized prefix rendering, token text kept
  /// verbatim.
  pub fn parse_to_sexpr<I>(&self, tokens: I) -> Result<String, Error>
  where I: IntoIterator,
        I::Item: Into<String> {
    reduce(&mut SexprFold, self.parse_to_rpn(tokens)).map_err(Error::from)
  }

  /// Parses and evaluates in a single pass. Value tokens resolve
  /// through the resolver, then through `env`; operators without an
  /// implementation fall back to a function bound under their name.
  /// Unresolved names fail immediately.
  pub fn evaluate<I>(&self, tokens: I, env: &Bindings) -> Result<Value, Error>
  where I: IntoIterator,
        I::Item: Into<String> {
    let mut fold = Evaluator::new(self.resolver(), env);
    reduce(&mut fold, self.parse_to_rpn(tokens)).map_err(Error::from)
  }

  /// Parses and partially evaluates: constants fold, identities
  /// rewrite, and whatever remains is reported as free names.
  pub fn partial_eval<I>(&self, tokens: I) -> Result<PartialExpr, Error>
  where I: IntoIterator,
        I::Item: Into<String> {
    let expr = self.parse_to_expr(tokens)?;
    partial::partial_eval(expr, self.resolver()).map_err(Error::from)
  }

  /// Parses, partially evaluates, and specializes into a reusable
  /// callable in one step.
  pub fn compile<I>(&self, tokens: I) -> Result<Compiled, Error>
  where I: IntoIterator,
        I::Item: Into<String> {
    let partial = self.partial_eval(tokens)?;
    compile::compile(partial).map_err(Error::from)
  }
}

impl Default for ExprEngine {
  fn default() -> ExprEngine {
    ExprEngine::new()
  }
}

impl Debug for ExprEngine {
  fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
    f.debug_struct("ExprEngine")
      .field("infix_ops", &self.infix_ops)
      .field("functions", &self.functions)
      .field("implicit_op", &self.implicit_op)
      .field("unary_fn_as_prefix", &self.unary_fn_as_prefix)
      .finish_non_exhaustive()
  }
}

fn default_resolver(token: &str) -> Option<Value> {
  token.parse::<f64>().ok().map(Value::Number)
}

/// Fold that builds an [`Expr`] tree.
struct TreeFold;

impl RpnFold for TreeFold {
  type Output = Expr;

  fn lift_value(&mut self, name: &str) -> Result<Expr, EvalError> {
    Ok(Expr::var(name))
  }

  fn apply_op(&mut self, op: &OpInfo, args: Vec<Expr>) -> Result<Expr, EvalError> {
    Ok(Expr::Apply(op.clone(), args))
  }
}

/// Fold that renders `(op arg ...)` text without touching values.
struct SexprFold;

impl RpnFold for SexprFold {
  type Output = String;

  fn lift_value(&mut self, name: &str) -> Result<String, EvalError> {
    Ok(name.to_owned())
  }

  fn apply_op(&mut self, op: &OpInfo, args: Vec<String>) -> Result<String, EvalError> {
    Ok(format!("({} {})", op.name(), args.join(" ")))
  }
}
