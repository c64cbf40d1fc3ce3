
//! Specialization of simplified trees into reusable callables.

use super::{EvalError, FreeNames};
use super::bindings::Bindings;
use super::intrinsic::{FloatFn, Intrinsic, OpImpl};
use super::partial::PartialExpr;
use crate::expr::Expr;
use crate::expr::value::Value;

/// A specialized callable: a thunk tree over a private capture table.
///
/// Everything the source tree pinned down is burned in at
/// specialization time: primitive constants inline in the thunks,
/// non-primitive values and native implementations in the capture
/// table. Only the names in [`free`](Compiled::free) are read from
/// the bindings at call time. Calling never mutates, so one compiled
/// value can serve any number of threads concurrently.
#[derive(Debug, Clone)]
pub struct Compiled {
  thunk: Thunk,
  captures: Vec<Value>,
  free: FreeNames,
}

#[derive(Debug, Clone)]
enum Thunk {
  Const(Value),
  Capture(usize),
  /// Read from the call-time bindings under the variable's name.
  Arg(String),
  CallIntrinsic(String, Intrinsic, Vec<Thunk>),
  CallFloat(String, FloatFn, Vec<Thunk>),
  /// Call a captured native implementation by slot.
  CallNative(String, usize, Vec<Thunk>),
  /// Operator with no implementation: looked up in the call-time
  /// bindings by name.
  CallFree(String, Vec<Thunk>),
}

/// Specializes a partially evaluated tree. The only error source is a
/// native implementation rejecting arguments during specialization
/// time folding.
pub fn compile(partial: PartialExpr) -> Result<Compiled, EvalError> {
  let PartialExpr { expr, free } = partial;
  let mut captures = Captures::new();
  let thunk = lower(expr, &mut captures)?;
  let (thunk, captures) = prune(thunk, captures.table);
  Ok(Compiled { thunk, captures, free })
}

impl Compiled {
  pub fn call(&self, env: &Bindings) -> Result<Value, EvalError> {
    eval_thunk(&self.thunk, &self.captures, env)
  }

  /// The names `call` reads from its bindings: anything else in the
  /// bindings is ignored.
  pub fn free(&self) -> &FreeNames {
    &self.free
  }
}

/// Capture table under construction. Slots are handed out on first
/// use and deduplicated by value equality (pointer identity for
/// functions).
struct Captures {
  table: Vec<Value>,
}

impl Captures {
  fn new() -> Captures {
    Captures { table: Vec::new() }
  }

  fn slot(&mut self, value: Value) -> usize {
    if let Some(index) = self.table.iter().position(|v| v == &value) {
      return index;
    }
    self.table.push(value);
    self.table.len() - 1
  }
}

fn lower(expr: Expr, captures: &mut Captures) -> Result<Thunk, EvalError> {
  match expr {
    Expr::Const(value) => Ok(lower_value(value, captures)),
    Expr::Var(name) => Ok(Thunk::Arg(name)),
    Expr::Apply(op, args) => {
      let name = op.name().to_owned();
      let implementation = op.implementation().cloned();
      let args = args
        .into_iter()
        .map(|arg| lower(arg, captures))
        .collect::<Result<Vec<_>, _>>()?;
      let implementation = match implementation {
        Some(implementation) => implementation,
        None => return Ok(Thunk::CallFree(name, args)),
      };
      // With every argument already pinned down, apply now rather
      // than at every call.
      if let Some(values) = literal_args(&args, &captures.table) {
        let result = implementation.apply(&name, &values)?;
        return Ok(lower_value(result, captures));
      }
      match implementation {
        OpImpl::Intrinsic(intrinsic) => Ok(Thunk::CallIntrinsic(name, intrinsic, args)),
        OpImpl::Float(func) => Ok(Thunk::CallFloat(name, func, args)),
        OpImpl::Native(func) => {
          let slot = captures.slot(Value::Func(func));
          Ok(Thunk::CallNative(name, slot, args))
        }
      }
    }
  }
}

/// Primitive values inline; anything else gets a capture slot.
fn lower_value(value: Value, captures: &mut Captures) -> Thunk {
  if value.is_primitive() {
    Thunk::Const(value)
  } else {
    Thunk::Capture(captures.slot(value))
  }
}

/// The argument values, if every argument is already a literal.
fn literal_args(args: &[Thunk], table: &[Value]) -> Option<Vec<Value>> {
  args
    .iter()
    .map(|thunk| match thunk {
      Thunk::Const(value) => Some(value.clone()),
      Thunk::Capture(index) => table.get(*index).cloned(),
      _ => None,
    })
    .collect()
}

/// Drops capture slots nothing references anymore. Specialization
/// time folding can consume a slotted value after it was allocated,
/// so the table is compacted before it is sealed.
fn prune(thunk: Thunk, table: Vec<Value>) -> (Thunk, Vec<Value>) {
  let mut used = vec![false; table.len()];
  mark_used(&thunk, &mut used);
  if used.iter().all(|flag| *flag) {
    return (thunk, table);
  }
  let mut remap = vec![0usize; table.len()];
  let mut pruned = Vec::new();
  for (index, value) in table.into_iter().enumerate() {
    if used[index] {
      remap[index] = pruned.len();
      pruned.push(value);
    }
  }
  (renumber(thunk, &remap), pruned)
}

fn mark_used(thunk: &Thunk, used: &mut [bool]) {
  match thunk {
    Thunk::Capture(index) => used[*index] = true,
    Thunk::CallNative(_, index, args) => {
      used[*index] = true;
      for arg in args {
        mark_used(arg, used);
      }
    }
    Thunk::CallIntrinsic(_, _, args) | Thunk::CallFloat(_, _, args) | Thunk::CallFree(_, args) => {
      for arg in args {
        mark_used(arg, used);
      }
    }
    Thunk::Const(_) | Thunk::Arg(_) => {}
  }
}

fn renumber(thunk: Thunk, remap: &[usize]) -> Thunk {
  let renumber_all = |args: Vec<Thunk>| args.into_iter().map(|arg| renumber(arg, remap)).collect();
  match thunk {
    Thunk::Capture(index) => Thunk::Capture(remap[index]),
    Thunk::CallNative(name, index, args) => Thunk::CallNative(name, remap[index], renumber_all(args)),
    Thunk::CallIntrinsic(name, intrinsic, args) => Thunk::CallIntrinsic(name, intrinsic, renumber_all(args)),
    Thunk::CallFloat(name, func, args) => Thunk::CallFloat(name, func, renumber_all(args)),
    Thunk::CallFree(name, args) => Thunk::CallFree(name, renumber_all(args)),
    leaf => leaf,
  }
}

fn eval_thunk(thunk: &Thunk, captures: &[Value], env: &Bindings) -> Result<Value, EvalError> {
  match thunk {
    Thunk::Const(value) => Ok(value.clone()),
    Thunk::Capture(index) => Ok(captures[*index].clone()),
    Thunk::Arg(name) => match env.get(name) {
      Some(value) => Ok(value.clone()),
      None => Err(EvalError::UnboundVariable(name.clone())),
    },
    Thunk::CallIntrinsic(name, intrinsic, args) => {
      let values = eval_args(args, captures, env)?;
      intrinsic.apply(name, &values)
    }
    Thunk::CallFloat(name, func, args) => {
      let values = eval_args(args, captures, env)?;
      func.apply(name, &values)
    }
    Thunk::CallNative(name, slot, args) => {
      let values = eval_args(args, captures, env)?;
      match &captures[*slot] {
        Value::Func(func) => func.call(&values),
        other => Err(EvalError::TypeMismatch {
          op: name.clone(),
          expected: "function",
          found: other.type_name(),
        }),
      }
    }
    Thunk::CallFree(name, args) => {
      let values = eval_args(args, captures, env)?;
      match env.get(name) {
        Some(Value::Func(func)) => func.call(&values),
        Some(other) => Err(EvalError::TypeMismatch {
          op: name.clone(),
          expected: "function",
          found: other.type_name(),
        }),
        None => Err(EvalError::MissingImplementation(name.clone())),
      }
    }
  }
}

fn eval_args(args: &[Thunk], captures: &[Value], env: &Bindings) -> Result<Vec<Value>, EvalError> {
  args.iter().map(|thunk| eval_thunk(thunk, captures, env)).collect()
}
