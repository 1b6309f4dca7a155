//! Lexically scoped, parent-linked environment chain.
//!
//! Each scope's own bindings are stored as a linearly-scanned
//! `SmallVec<[(Identifier, Value); 8]>`: inline storage for the first handful
//! of entries, since a cache-friendly linear scan beats a hash map at this
//! size. Each node also carries an optional link to its parent so that
//! nested blocks, function calls, and closures can form a real chain instead
//! of one flat table.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::Identifier;
use crate::Value;

const INLINE_ENTRIES: usize = 8;

/// A single scope's bindings plus a link to its enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    entries: SmallVec<[(Identifier, Value); INLINE_ENTRIES]>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    /// Builds the root (global) environment. It has no parent.
    #[must_use]
    pub fn new_global() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self { entries: SmallVec::new(), parent: None }))
    }

    /// Builds a new child scope of `parent`, e.g. for a block, loop header,
    /// or function call frame.
    #[must_use]
    pub fn new_child(parent: &Rc<RefCell<Self>>) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self { entries: SmallVec::new(), parent: Some(Rc::clone(parent)) }))
    }

    /// Always writes into this scope, shadowing any outer binding of the
    /// same name (spec §4.5: `let` "never updates a shadowed outer
    /// binding").
    pub fn define(&mut self, name: Identifier, value: Value) {
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Reads `name` from this scope or any ancestor.
    #[must_use]
    pub fn get(this: &Rc<RefCell<Self>>, name: &str) -> Option<Value> {
        let env = this.borrow();
        if let Some((_, value)) = env.entries.iter().find(|(n, _)| n == name) {
            return Some(value.clone());
        }
        match &env.parent {
            Some(parent) => Self::get(parent, name),
            None => None,
        }
    }

    /// Writes to the scope that owns `name`. Returns `false` if `name` is
    /// bound nowhere on the chain.
    pub fn set(this: &Rc<RefCell<Self>>, name: &str, value: Value) -> bool {
        {
            let mut env = this.borrow_mut();
            if let Some(slot) = env.entries.iter_mut().find(|(n, _)| n == name) {
                slot.1 = value;
                return true;
            }
        }
        let parent = this.borrow().parent.clone();
        match parent {
            Some(parent) => Self::set(&parent, name, value),
            None => false,
        }
    }

    /// True if `name` is bound anywhere on the chain.
    #[must_use]
    pub fn exists(this: &Rc<RefCell<Self>>, name: &str) -> bool {
        Self::get(this, name).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_in_child_does_not_leak_into_parent() {
        let root = Environment::new_global();
        let child = Environment::new_child(&root);
        child.borrow_mut().define("x".into(), Value::Integer(1));

        assert!(Environment::exists(&child, "x"));
        assert!(!Environment::exists(&root, "x"));
    }

    #[test]
    fn set_mutates_the_owning_outer_scope() {
        let root = Environment::new_global();
        root.borrow_mut().define("x".into(), Value::Integer(1));
        let child = Environment::new_child(&root);

        assert!(Environment::set(&child, "x", Value::Integer(2)));
        assert_eq!(Environment::get(&root, "x").unwrap().type_name(), "integer");
        match Environment::get(&root, "x") {
            Some(Value::Integer(2)) => {}
            other => panic!("expected Integer(2), got {other:?}"),
        }
    }

    #[test]
    fn set_on_undefined_name_fails() {
        let root = Environment::new_global();
        assert!(!Environment::set(&root, "missing", Value::Null));
    }

    #[test]
    fn redefining_a_name_in_the_same_scope_overwrites_it() {
        let root = Environment::new_global();
        root.borrow_mut().define("x".into(), Value::Integer(1));
        root.borrow_mut().define("x".into(), Value::Integer(2));
        match Environment::get(&root, "x") {
            Some(Value::Integer(2)) => {}
            other => panic!("expected Integer(2), got {other:?}"),
        }
    }
}
