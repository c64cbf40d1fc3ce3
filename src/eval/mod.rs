
//! Evaluation of expression trees: direct, partial, and specialized.

pub mod bindings;
pub mod compile;
mod error;
pub mod evaluator;
pub mod intrinsic;
pub mod partial;

pub use error::EvalError;

use crate::expr::Expr;
use crate::expr::walker::postorder_walk_borrowed;

use std::collections::HashSet;

/// The names a tree still depends on: operators lacking an
/// implementation, and unresolved variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FreeNames {
  pub ops: HashSet<String>,
  pub vars: HashSet<String>,
}

impl FreeNames {
  pub fn new() -> FreeNames {
    FreeNames::default()
  }

  /// Collects the free names of `expr`. Only names surviving in the
  /// tree itself count; anything eliminated by folding or identity
  /// rewrites is not reported.
  pub fn scan(expr: &Expr) -> FreeNames {
    let mut free = FreeNames::new();
    postorder_walk_borrowed(expr, |e| {
      match e {
        Expr::Var(name) => {
          free.vars.insert(name.clone());
        }
        Expr::Apply(op, _) if op.implementation().is_none() => {
          free.ops.insert(op.name().to_owned());
        }
        _ => {}
      }
    });
    free
  }

  pub fn is_empty(&self) -> bool {
    self.ops.is_empty() && self.vars.is_empty()
  }
}
