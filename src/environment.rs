use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::object::Object;
use crate::token::Token;

/// One lexical scope's variable bindings, linked to its enclosing
/// scope. Shared via `Rc<RefCell<_>>` because closures captured by
/// functions keep their defining environment alive after the block
/// that created it returns.
#[derive(Debug)]
pub struct Environment {
    pub enclosing: Option<Rc<RefCell<Environment>>>,
    variables: HashMap<String, Object>,
}

impl Environment {
    pub fn new(enclosing: Option<Rc<RefCell<Environment>>>) -> Self {
        Environment {
            enclosing,
            variables: HashMap::new(),
        }
    }

    /// Introduces a new binding, shadowing one of the same name in
    /// this scope if it exists.
    pub fn define(&mut self, name: &str, value: Object) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn get(&self, name: &Token) -> Result<Object, RuntimeError> {
        if let Some(value) = self.variables.get(&name.lexeme) {
            return Ok(value.clone());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow().get(name);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    pub fn assign(&mut self, name: &Token, value: Object) -> Result<(), RuntimeError> {
        if self.variables.contains_key(&name.lexeme) {
            self.variables.insert(name.lexeme.clone(), value);
            return Ok(());
        }

        if let Some(enclosing) = &self.enclosing {
            return enclosing.borrow_mut().assign(name, value);
        }

        Err(RuntimeError {
            token: name.clone(),
            message: format!("Undefined variable '{}'.", name.lexeme),
        })
    }

    /// Walks `distance` enclosing scopes up from `environment`. Called
    /// only with distances the resolver computed, so a missing
    /// ancestor is a bug in the resolver, not a recoverable condition.
    fn ancestor(environment: &Rc<RefCell<Environment>>, distance: usize) -> Rc<RefCell<Environment>> {
        let mut current = Rc::clone(environment);

        for _ in 0..distance {
            let parent = current
                .borrow()
                .enclosing
                .clone()
                .expect("resolver-reported distance to have a matching enclosing scope");
            current = parent;
        }

        current
    }

    /// Looks up `name` directly in the ancestor `distance` scopes up,
    /// never falling further up the chain. A miss here means the
    /// resolver's distance didn't actually land on a scope defining
    /// `name`, which is a bug in the resolver, not a dynamic fallback
    /// to globals.
    pub fn get_at(environment: &Rc<RefCell<Environment>>, distance: usize, name: &Token) -> Result<Object, RuntimeError> {
        match Self::ancestor(environment, distance).borrow().variables.get(&name.lexeme) {
            Some(value) => Ok(value.clone()),
            None => Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined variable '{}'.", name.lexeme),
            }),
        }
    }

    /// Assigns directly into the ancestor `distance` scopes up,
    /// mirroring `get_at`'s direct-access contract.
    pub fn assign_at(
        environment: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &Token,
        value: Object,
    ) -> Result<(), RuntimeError> {
        let ancestor = Self::ancestor(environment, distance);
        let mut ancestor = ancestor.borrow_mut();

        if !ancestor.variables.contains_key(&name.lexeme) {
            return Err(RuntimeError {
                token: name.clone(),
                message: format!("Undefined variable '{}'.", name.lexeme),
            });
        }

        ancestor.variables.insert(name.lexeme.clone(), value);
        Ok(())
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new(None)
    }
}

#[cfg(test)]
mod tests {
    use crate::token::Type;

    use super::*;

    fn name(lexeme: &str) -> Token {
        Token::synthetic(Type::Identifier, lexeme)
    }

    #[test]
    fn get_and_assign_in_the_same_scope() {
        let mut env = Environment::new(None);
        env.define("a", Object::from(1.0));
        assert_eq!(env.get(&name("a")).unwrap(), Object::from(1.0));

        env.assign(&name("a"), Object::from(2.0)).unwrap();
        assert_eq!(env.get(&name("a")).unwrap(), Object::from(2.0));
    }

    #[test]
    fn get_falls_through_to_an_enclosing_scope() {
        let global = Rc::new(RefCell::new(Environment::new(None)));
        global.borrow_mut().define("a", Object::from(1.0));

        let local = Environment::new(Some(Rc::clone(&global)));
        assert_eq!(local.get(&name("a")).unwrap(), Object::from(1.0));
    }

    #[test]
    fn get_and_assign_of_an_undefined_name_is_a_runtime_error() {
        let env = Environment::new(None);
        assert!(env.get(&name("missing")).is_err());

        let mut env = Environment::new(None);
        assert!(env.assign(&name("missing"), Object::from(1.0)).is_err());
    }

    #[test]
    fn get_at_and_assign_at_index_the_exact_ancestor() {
        let global = Rc::new(RefCell::new(Environment::new(None)));
        global.borrow_mut().define("a", Object::from("outer"));

        let local = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&global)))));
        local.borrow_mut().define("a", Object::from("inner"));

        assert_eq!(Environment::get_at(&local, 0, &name("a")).unwrap(), Object::from("inner"));
        assert_eq!(Environment::get_at(&local, 1, &name("a")).unwrap(), Object::from("outer"));

        Environment::assign_at(&local, 1, &name("a"), Object::from("reassigned")).unwrap();
        assert_eq!(global.borrow().get(&name("a")).unwrap(), Object::from("reassigned"));
        assert_eq!(local.borrow().get(&name("a")).unwrap(), Object::from("inner"));
    }

    #[test]
    fn get_at_does_not_fall_through_past_the_resolved_distance() {
        let global = Rc::new(RefCell::new(Environment::new(None)));
        global.borrow_mut().define("a", Object::from(1.0));

        let local = Rc::new(RefCell::new(Environment::new(Some(Rc::clone(&global)))));

        assert!(Environment::get_at(&local, 0, &name("a")).is_err());
        assert!(Environment::assign_at(&local, 0, &name("a"), Object::from(2.0)).is_err());
    }
}
