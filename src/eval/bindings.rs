
use crate::expr::value::Value;

use std::collections::HashMap;

/// A table of runtime bindings, indexed by name. Free variables and
/// free operators draw from the same table; an operator binding must
/// be a [`Value::Func`] at the point of use.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings {
  mapping: HashMap<String, Value>,
}

impl Bindings {
  pub fn new() -> Bindings {
    Bindings::default()
  }

  pub fn with_capacity(capacity: usize) -> Bindings {
    Bindings {
      mapping: HashMap::with_capacity(capacity),
    }
  }

  pub fn insert(&mut self, name: impl Into<String>, value: Value) -> Option<Value> {
    self.mapping.insert(name.into(), value)
  }

  pub fn get(&self, name: &str) -> Option<&Value> {
    self.mapping.get(name)
  }

  pub fn contains_key(&self, name: &str) -> bool {
    self.mapping.contains_key(name)
  }

  pub fn is_empty(&self) -> bool {
    self.mapping.is_empty()
  }

  pub fn len(&self) -> usize {
    self.mapping.len()
  }
}

impl<S: Into<String>> FromIterator<(S, Value)> for Bindings {
  fn from_iter<I>(iter: I) -> Self
  where I: IntoIterator<Item = (S, Value)> {
    let iter = iter.into_iter();
    let (len_bound, _) = iter.size_hint();
    let mut bindings = Bindings::with_capacity(len_bound);
    for (name, value) in iter {
      bindings.insert(name, value);
    }
    bindings
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_insert_and_get() {
    let mut bindings = Bindings::new();
    assert!(bindings.is_empty());
    assert_eq!(bindings.insert("a", Value::Number(1.0)), None);
    assert_eq!(bindings.insert("a", Value::Number(2.0)), Some(Value::Number(1.0)));
    assert_eq!(bindings.get("a"), Some(&Value::Number(2.0)));
    assert!(bindings.contains_key("a"));
    assert!(!bindings.contains_key("b"));
  }

  #[test]
  fn test_from_iterator() {
    let bindings: Bindings = [("a", Value::Number(3.0)), ("b", Value::Number(5.0))]
      .into_iter()
      .collect();
    assert_eq!(bindings.len(), 2);
    assert_eq!(bindings.get("b"), Some(&Value::Number(5.0)));
  }
}
