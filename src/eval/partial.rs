
//! Partial evaluation of expression trees.
//!
//! Folds every computable subtree to a constant, applies algebraic
//! identity rewrites for the built-in operators, and reports the
//! names the simplified tree still depends on.

use super::{EvalError, FreeNames};
use super::intrinsic::{Intrinsic, OpImpl};
use crate::engine::Resolver;
use crate::expr::Expr;
use crate::expr::value::Value;
use crate::expr::walker::postorder_walk;
use crate::parsing::operator::{FnOp, OpInfo};

use std::collections::HashSet;

/// The outcome of partial evaluation: the simplified tree and its
/// remaining free names.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialExpr {
  pub expr: Expr,
  pub free: FreeNames,
}

/// Partially evaluates `expr`, resolving leaves through `resolver`.
///
/// The pass is idempotent: running the produced tree through again
/// returns it unchanged, since folding and the identity rewrites are
/// exhausted bottom-up on the first pass. The only error source is a
/// native implementation rejecting fully constant arguments.
pub fn partial_eval(expr: Expr, resolver: &Resolver<'_>) -> Result<PartialExpr, EvalError> {
  let mut failed: HashSet<String> = HashSet::new();
  let expr = postorder_walk(expr, |e| simplify(e, resolver, &mut failed))?;
  let free = FreeNames::scan(&expr);
  Ok(PartialExpr { expr, free })
}

fn simplify(expr: Expr, resolver: &Resolver<'_>, failed: &mut HashSet<String>) -> Result<Expr, EvalError> {
  match expr {
    Expr::Var(name) => {
      // Names that already failed to resolve once stay free; the
      // resolver is consulted at most once per distinct name.
      if failed.contains(&name) {
        return Ok(Expr::Var(name));
      }
      match resolver(&name) {
        Some(value) => Ok(Expr::Const(value)),
        None => {
          failed.insert(name.clone());
          Ok(Expr::Var(name))
        }
      }
    }
    Expr::Apply(op, args) => {
      let implementation = match op.implementation() {
        Some(implementation) => implementation.clone(),
        None => return Ok(Expr::Apply(op, args)),
      };
      if args.iter().all(Expr::is_const) {
        let values: Vec<Value> = args.iter().filter_map(|arg| arg.as_const().cloned()).collect();
        let result = implementation.apply(op.name(), &values)?;
        return Ok(Expr::Const(result));
      }
      match implementation {
        OpImpl::Intrinsic(intrinsic) => Ok(fold_identity(intrinsic, op, args)),
        _ => Ok(Expr::Apply(op, args)),
      }
    }
    constant => Ok(constant),
  }
}

/// Algebraic identity rewrites, applied when constant folding could
/// not finish. The interesting operands are `0` and `-1`, the number
/// whose truncation has all bits set.
fn fold_identity(intrinsic: Intrinsic, op: OpInfo, args: Vec<Expr>) -> Expr {
  if args.len() != 2 {
    return Expr::Apply(op, args);
  }
  match intrinsic {
    Intrinsic::Add => {
      if is_num(&args[0], 0.0) {
        return take(args, 1);
      }
      if is_num(&args[1], 0.0) {
        return take(args, 0);
      }
    }
    Intrinsic::Sub => {
      if is_num(&args[1], 0.0) {
        return take(args, 0);
      }
      if is_num(&args[0], 0.0) {
        return negated(take(args, 1));
      }
    }
    Intrinsic::Mul => {
      if is_num(&args[0], 0.0) {
        return take(args, 0);
      }
      if is_num(&args[1], 0.0) {
        return take(args, 1);
      }
      if is_num(&args[0], 1.0) {
        return take(args, 1);
      }
      if is_num(&args[1], 1.0) {
        return take(args, 0);
      }
    }
    Intrinsic::Div => {
      // A zero divisor is left in place: its IEEE result belongs to
      // whoever eventually evaluates it.
      if is_num(&args[0], 0.0) {
        return take(args, 0);
      }
      if is_num(&args[1], 1.0) {
        return take(args, 0);
      }
    }
    Intrinsic::Rem => {}
    Intrinsic::And => {
      if is_num(&args[0], 0.0) {
        return take(args, 0);
      }
      if is_num(&args[1], 0.0) {
        return take(args, 1);
      }
      if is_num(&args[0], -1.0) {
        return take(args, 1);
      }
      if is_num(&args[1], -1.0) {
        return take(args, 0);
      }
    }
    Intrinsic::Or => {
      if is_num(&args[0], -1.0) {
        return take(args, 0);
      }
      if is_num(&args[1], -1.0) {
        return take(args, 1);
      }
      if is_num(&args[0], 0.0) {
        return take(args, 1);
      }
      if is_num(&args[1], 0.0) {
        return take(args, 0);
      }
    }
    Intrinsic::Xor => {
      if is_num(&args[0], 0.0) {
        return take(args, 1);
      }
      if is_num(&args[1], 0.0) {
        return take(args, 0);
      }
    }
    Intrinsic::Xnor => {
      if is_num(&args[0], -1.0) {
        return take(args, 1);
      }
      if is_num(&args[1], -1.0) {
        return take(args, 0);
      }
    }
    Intrinsic::Nand => {
      if is_num(&args[0], 0.0) || is_num(&args[1], 0.0) {
        return Expr::constant(-1.0);
      }
    }
    Intrinsic::Nor => {
      if is_num(&args[0], -1.0) || is_num(&args[1], -1.0) {
        return Expr::constant(0.0);
      }
    }
    Intrinsic::Neg | Intrinsic::Invert | Intrinsic::Not => {}
  }
  Expr::Apply(op, args)
}

fn is_num(expr: &Expr, n: f64) -> bool {
  matches!(expr.as_const(), Some(Value::Number(v)) if *v == n)
}

fn take(mut args: Vec<Expr>, index: usize) -> Expr {
  args.swap_remove(index)
}

/// `0 - x` rewrites to a negation node named `neg`.
fn negated(arg: Expr) -> Expr {
  let neg = FnOp::new("neg", 1).with_impl(OpImpl::Intrinsic(Intrinsic::Neg));
  Expr::apply(neg, vec![arg])
}
