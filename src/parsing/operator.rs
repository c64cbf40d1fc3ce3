
//! Operator descriptors: everything the engine knows statically about
//! a registered name.

use crate::eval::intrinsic::OpImpl;

/// The precedence of an infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Precedence(u64);

/// The associativity of an infix operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Associativity {
  Left,
  Right,
}

/// An infix, binary operator.
#[derive(Debug, Clone, PartialEq)]
pub struct InfixOp {
  name: String,
  assoc: Associativity,
  prec: Precedence,
  implementation: Option<OpImpl>,
}

/// A named function, applied in call syntax or (when permitted and
/// unary) prefix style.
#[derive(Debug, Clone, PartialEq)]
pub struct FnOp {
  name: String,
  arity: usize,
  implementation: Option<OpImpl>,
}

/// A registered operator of either shape, as carried by postfix
/// tokens and tree nodes.
#[derive(Debug, Clone, PartialEq)]
pub enum OpInfo {
  Infix(InfixOp),
  Function(FnOp),
}

impl Precedence {
  /// Internally, we store an operator's precedence as ten times the
  /// input value, so that we can increment to represent associativity
  /// without ever colliding with a neighboring declared level. Both
  /// the scaling and the increment saturate at the top of the `u64`
  /// range.
  ///
  /// Use [`from_raw`](Precedence::from_raw) to bypass the
  /// multiplication and construct a `Precedence` value directly.
  pub fn new(n: u64) -> Precedence {
    Precedence(n.saturating_mul(10))
  }

  pub fn from_raw(n: u64) -> Precedence {
    Precedence(n)
  }

  pub fn incremented(self) -> Precedence {
    Precedence(self.0.saturating_add(1))
  }
}

impl From<u64> for Precedence {
  fn from(n: u64) -> Precedence {
    Precedence::new(n)
  }
}

impl InfixOp {
  pub fn new(name: impl Into<String>, assoc: Associativity, prec: impl Into<Precedence>) -> InfixOp {
    InfixOp {
      name: name.into(),
      assoc,
      prec: prec.into(),
      implementation: None,
    }
  }

  /// Attaches an implementation, builder style.
  pub fn with_impl(mut self, implementation: OpImpl) -> InfixOp {
    self.implementation = Some(implementation);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn associativity(&self) -> Associativity {
    self.assoc
  }

  pub fn precedence(&self) -> Precedence {
    self.prec
  }

  /// The precedence an incoming occurrence of this operator binds
  /// with. A right-associative operator binds one notch above its
  /// declared level, so an equal-precedence occurrence already on the
  /// stack stays put.
  pub fn binding_precedence(&self) -> Precedence {
    match self.assoc {
      Associativity::Left => self.prec,
      Associativity::Right => self.prec.incremented(),
    }
  }

  pub fn implementation(&self) -> Option<&OpImpl> {
    self.implementation.as_ref()
  }
}

impl FnOp {
  /// Constructs a function descriptor. Panics if `arity` is zero;
  /// nullary functions cannot appear in an infix token stream.
  pub fn new(name: impl Into<String>, arity: usize) -> FnOp {
    assert!(arity >= 1, "FnOp requires arity >= 1");
    FnOp {
      name: name.into(),
      arity,
      implementation: None,
    }
  }

  /// Attaches an implementation, builder style.
  pub fn with_impl(mut self, implementation: OpImpl) -> FnOp {
    self.implementation = Some(implementation);
    self
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn arity(&self) -> usize {
    self.arity
  }

  pub fn implementation(&self) -> Option<&OpImpl> {
    self.implementation.as_ref()
  }
}

impl OpInfo {
  pub fn name(&self) -> &str {
    match self {
      OpInfo::Infix(op) => op.name(),
      OpInfo::Function(op) => op.name(),
    }
  }

  /// Number of operands consumed from the value stack. Infix
  /// operators are always binary.
  pub fn arity(&self) -> usize {
    match self {
      OpInfo::Infix(_) => 2,
      OpInfo::Function(op) => op.arity(),
    }
  }

  pub fn implementation(&self) -> Option<&OpImpl> {
    match self {
      OpInfo::Infix(op) => op.implementation(),
      OpInfo::Function(op) => op.implementation(),
    }
  }
}

impl From<InfixOp> for OpInfo {
  fn from(op: InfixOp) -> OpInfo {
    OpInfo::Infix(op)
  }
}

impl From<FnOp> for OpInfo {
  fn from(op: FnOp) -> OpInfo {
    OpInfo::Function(op)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_left_assoc_binding_precedence() {
    let op = InfixOp::new("#", Associativity::Left, 1);
    assert_eq!(op.binding_precedence(), Precedence::from_raw(10));
  }

  #[test]
  fn test_right_assoc_binding_precedence() {
    let op = InfixOp::new("#", Associativity::Right, 1);
    assert_eq!(op.binding_precedence(), Precedence::from_raw(11));
  }

  #[test]
  fn test_adjacent_levels_do_not_collide() {
    let lower = InfixOp::new("#", Associativity::Right, 1);
    let upper = InfixOp::new("##", Associativity::Left, 2);
    assert!(lower.binding_precedence() < upper.precedence());
  }

  #[test]
  fn test_precedence_saturates_instead_of_overflowing() {
    assert_eq!(Precedence::new(u64::MAX), Precedence::from_raw(u64::MAX));
    let top = InfixOp::new("#", Associativity::Right, Precedence::from_raw(u64::MAX));
    assert_eq!(top.binding_precedence(), Precedence::from_raw(u64::MAX));
  }

  #[test]
  fn test_op_info_arity() {
    let infix = OpInfo::from(InfixOp::new("+", Associativity::Left, 1));
    assert_eq!(infix.arity(), 2);
    let function = OpInfo::from(FnOp::new("max", 3));
    assert_eq!(function.arity(), 3);
  }

  #[test]
  #[should_panic]
  fn test_nullary_fn_op_panics() {
    FnOp::new("f", 0);
  }

  #[test]
  fn test_op_info_name() {
    let infix = OpInfo::from(InfixOp::new("+", Associativity::Left, 1));
    assert_eq!(infix.name(), "+");
    let function = OpInfo::from(FnOp::new("sin", 1));
    assert_eq!(function.name(), "sin");
  }
}
