use crate::error::RuntimeError;
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to an environment.  Closures, call frames and nested
/// scopes all hold one; the environment lives as long as the longest holder.
pub type EnvRef = Rc<RefCell<Environment>>;

/// One lexical scope: name → value plus an optional enclosing scope.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Wrap a fresh child of `enclosing` in a shared handle.
    pub fn child_of(enclosing: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment::with_enclosing(Rc::clone(enclosing))))
    }

    /// Bind (or rebind) `name` in this scope.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup walking the whole chain.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = self.values.get(&name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// Dynamic assignment walking the whole chain.  Never creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        if let Some(slot) = self.values.get_mut(&name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }

    /// The environment exactly `distance` hops up the chain from `env`.
    pub fn ancestor(env: &EnvRef, distance: usize) -> Result<EnvRef, RuntimeError> {
        let mut current: EnvRef = Rc::clone(env);

        for _ in 0..distance {
            let next: EnvRef = current
                .borrow()
                .enclosing
                .as_ref()
                .map(Rc::clone)
                .ok_or_else(|| {
                    RuntimeError::unexpected(format!(
                        "Resolved distance {} exceeds the environment chain.",
                        distance
                    ))
                })?;
            current = next;
        }

        Ok(current)
    }

    /// Fixed‑hop lookup using a resolver distance.
    pub fn get_at(env: &EnvRef, distance: usize, name: &str) -> Result<Value, RuntimeError> {
        let target: EnvRef = Self::ancestor(env, distance)?;
        let value: Option<Value> = target.borrow().values.get(name).cloned();

        value.ok_or_else(|| {
            RuntimeError::unexpected(format!(
                "Unable to find '{}' at distance {}.",
                name, distance
            ))
        })
    }

    /// Fixed‑hop assignment using a resolver distance.
    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &Token,
        value: Value,
    ) -> Result<(), RuntimeError> {
        let target: EnvRef = Self::ancestor(env, distance)?;
        let mut target = target.borrow_mut();

        match target.values.get_mut(&name.lexeme) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RuntimeError::unexpected(format!(
                "Unable to find '{}' at distance {}.",
                name.lexeme, distance
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenType;

    fn ident(name: &str) -> Token {
        Token::new(TokenType::IDENTIFIER, name, None, 1)
    }

    #[test]
    fn lookup_walks_enclosing_chain() {
        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner: EnvRef = Environment::child_of(&globals);

        assert_eq!(inner.borrow().get(&ident("a")).ok(), Some(Value::Number(1.0)));
        assert!(inner.borrow().get(&ident("b")).is_err());
    }

    #[test]
    fn assign_updates_declaring_scope() {
        let globals: EnvRef = Rc::new(RefCell::new(Environment::new()));
        globals.borrow_mut().define("a", Value::Number(1.0));

        let inner: EnvRef = Environment::child_of(&globals);
        inner
            .borrow_mut()
            .assign(&ident("a"), Value::Number(2.0))
            .unwrap();

        assert_eq!(globals.borrow().get(&ident("a")).ok(), Some(Value::Number(2.0)));
        assert!(inner
            .borrow_mut()
            .assign(&ident("missing"), Value::Nil)
            .is_err());
    }

    #[test]
    fn fixed_hop_access() {
        let outer: EnvRef = Rc::new(RefCell::new(Environment::new()));
        outer.borrow_mut().define("x", Value::Bool(true));

        let middle: EnvRef = Environment::child_of(&outer);
        middle.borrow_mut().define("x", Value::Bool(false));

        let inner: EnvRef = Environment::child_of(&middle);

        assert_eq!(Environment::get_at(&inner, 2, "x").ok(), Some(Value::Bool(true)));
        assert_eq!(Environment::get_at(&inner, 1, "x").ok(), Some(Value::Bool(false)));

        Environment::assign_at(&inner, 2, &ident("x"), Value::Nil).unwrap();
        assert_eq!(Environment::get_at(&outer, 0, "x").ok(), Some(Value::Nil));
    }

    #[test]
    fn fixed_hop_assignment_never_creates_a_binding() {
        let outer: EnvRef = Rc::new(RefCell::new(Environment::new()));
        let inner: EnvRef = Environment::child_of(&outer);

        assert!(matches!(
            Environment::assign_at(&inner, 1, &ident("missing"), Value::Bool(true)),
            Err(RuntimeError::Unexpected(_))
        ));
        assert!(Environment::get_at(&outer, 0, "missing").is_err());
    }

    #[test]
    fn distance_past_root_is_unexpected() {
        let root: EnvRef = Rc::new(RefCell::new(Environment::new()));

        assert!(matches!(
            Environment::get_at(&root, 3, "x"),
            Err(RuntimeError::Unexpected(_))
        ));
    }
}
