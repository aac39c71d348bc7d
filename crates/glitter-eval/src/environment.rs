//! Environments: the frames that hold variable bindings (spec §4.4).
//!
//! Shared via `Rc<RefCell<_>>` so a closure can keep a live handle to the
//! frame it captured after that frame's defining block has exited. Cycles
//! are possible (a closure stored in the same frame it captured) and
//! accepted, per spec §9's "shared-ownership primitive with interior
//! mutability and accept cycles (small, shell-lifetime-bounded)".

use std::cell::RefCell;
use std::rc::Rc;

use glitter_util::{FxHashMap, RuntimeError, Span};

use crate::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

pub struct Environment {
    values: FxHashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub fn new_root() -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: FxHashMap::default(),
            parent: None,
        }))
    }

    pub fn new_child(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            values: FxHashMap::default(),
            parent: Some(Rc::clone(parent)),
        }))
    }

    /// Unconditionally binds `name` in this frame, overwriting any
    /// existing value (spec §4.4: `define` is allowed to overwrite).
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    fn ancestor(env: &EnvRef, distance: u32) -> EnvRef {
        let mut current = Rc::clone(env);
        for _ in 0..distance {
            let parent = current
                .borrow()
                .parent
                .clone()
                .expect("resolver-computed distance exceeds the live environment chain");
            current = parent;
        }
        current
    }

    /// Walks `distance` parent links from `env`, then looks up `name`.
    pub fn get_at(env: &EnvRef, distance: u32, name: &str, span: &Span) -> Result<Value, RuntimeError> {
        let target = Self::ancestor(env, distance);
        let found = target.borrow().values.get(name).cloned();
        found.ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.to_string(),
            span: span.clone(),
        })
    }

    /// Same walk as `get_at`, but assignment requires the binding already
    /// exist at the target frame (spec §4.4).
    pub fn set_at(
        env: &EnvRef,
        distance: u32,
        name: &str,
        value: Value,
        span: &Span,
    ) -> Result<(), RuntimeError> {
        let target = Self::ancestor(env, distance);
        let mut target = target.borrow_mut();
        if target.values.contains_key(name) {
            target.values.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(RuntimeError::UndefinedVariable {
                name: name.to_string(),
                span: span.clone(),
            })
        }
    }

    /// Walks to the root frame and looks up `name` there, used for
    /// `Resolution::Global` bindings.
    pub fn get_global(env: &EnvRef, name: &str, span: &Span) -> Result<Value, RuntimeError> {
        let root = Self::root(env);
        let found = root.borrow().values.get(name).cloned();
        found.ok_or_else(|| RuntimeError::UndefinedVariable {
            name: name.to_string(),
            span: span.clone(),
        })
    }

    pub fn set_global(env: &EnvRef, name: impl Into<String>, value: Value) {
        let root = Self::root(env);
        root.borrow_mut().values.insert(name.into(), value);
    }

    fn root(env: &EnvRef) -> EnvRef {
        let mut current = Rc::clone(env);
        loop {
            let parent = current.borrow().parent.clone();
            match parent {
                Some(p) => current = p,
                None => return current,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glitter_util::Span;

    #[test]
    fn define_then_get_at_zero_distance() {
        let env = Environment::new_root();
        env.borrow_mut().define("a", Value::Number(1.0));
        let v = Environment::get_at(&env, 0, "a", &Span::dummy()).unwrap();
        assert!(matches!(v, Value::Number(n) if n == 1.0));
    }

    #[test]
    fn get_at_walks_parent_chain() {
        let root = Environment::new_root();
        root.borrow_mut().define("a", Value::Number(1.0));
        let child = Environment::new_child(&root);
        let grandchild = Environment::new_child(&child);
        let v = Environment::get_at(&grandchild, 2, "a", &Span::dummy()).unwrap();
        assert!(matches!(v, Value::Number(n) if n == 1.0));
    }

    #[test]
    fn set_at_requires_existing_binding() {
        let env = Environment::new_root();
        let result = Environment::set_at(&env, 0, "missing", Value::Undefined, &Span::dummy());
        assert!(result.is_err());
    }

    #[test]
    fn global_helpers_bypass_distance() {
        let root = Environment::new_root();
        let child = Environment::new_child(&root);
        Environment::set_global(&child, "g", Value::Number(5.0));
        let v = Environment::get_global(&child, "g", &Span::dummy()).unwrap();
        assert!(matches!(v, Value::Number(n) if n == 5.0));
    }
}
