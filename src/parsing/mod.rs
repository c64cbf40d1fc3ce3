
//! Conversion of infix token streams to postfix order, and the
//! generic fold that consumes them.

pub mod operator;
pub mod reduce;
pub mod shunting_yard;
pub mod token;
