
//! Infix expression parsing and evaluation over a configurable
//! operator registry.
//!
//! [`ExprEngine`] is the entry point: register operators, then parse
//! token streams to postfix order or expression trees, evaluate them
//! directly, or specialize them into reusable callables.

pub mod engine;
pub mod error;
pub mod eval;
pub mod expr;
pub mod parsing;

pub use engine::ExprEngine;
pub use error::Error;
pub use eval::bindings::Bindings;
pub use expr::value::Value;
