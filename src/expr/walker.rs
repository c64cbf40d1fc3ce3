
//! Utility functions for walking an expression tree.

use super::Expr;

/// Rebuilds `expr` bottom-up: `f` sees every node after its children
/// have already been transformed.
pub fn postorder_walk<E, F>(expr: Expr, mut f: F) -> Result<Expr, E>
where F: FnMut(Expr) -> Result<Expr, E> {
  postorder_walk_impl(expr, &mut f)
}

fn postorder_walk_impl<E, F>(expr: Expr, f: &mut F) -> Result<Expr, E>
where F: FnMut(Expr) -> Result<Expr, E> {
  let expr = match expr {
    Expr::Apply(op, args) => {
      let args = args.into_iter().map(|x| postorder_walk_impl(x, f)).collect::<Result<Vec<_>, _>>()?;
      Expr::Apply(op, args)
    }
    leaf => leaf,
  };
  f(expr)
}

pub fn postorder_walk_borrowed<F>(expr: &Expr, mut f: F)
where F: FnMut(&Expr) {
  postorder_walk_borrowed_impl(expr, &mut f);
}

fn postorder_walk_borrowed_impl<F>(expr: &Expr, f: &mut F)
where F: FnMut(&Expr) {
  if let Expr::Apply(_, args) = expr {
    for arg in args {
      postorder_walk_borrowed_impl(arg, f);
    }
  }
  f(expr);
}
