use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// One frame of the scope chain.
///
/// Frames are shared as `Rc<RefCell<Environment>>`: a child points at its
/// parent, never the other way round, so the chain stays acyclic and a frame
/// lives exactly as long as some closure or active call still references it.
#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<String, Value<'a>>,
    enclosing: Option<Rc<RefCell<Environment<'a>>>>,
}

impl<'a> Environment<'a> {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment<'a>>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind `name` in this frame, replacing any previous binding here.
    pub fn define(&mut self, name: &str, value: Value<'a>) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup walking outward through the chain.
    pub fn get(&self, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Dynamic assignment walking outward; never creates a binding.
    pub fn assign(&mut self, name: &Token<'a>, value: Value<'a>) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }

    /// The frame exactly `distance` links out from `env`.
    fn ancestor(env: &Rc<RefCell<Self>>, distance: usize) -> Option<Rc<RefCell<Self>>> {
        let mut current: Rc<RefCell<Self>> = Rc::clone(env);

        for _ in 0..distance {
            let next = current.borrow().enclosing.clone()?;
            current = next;
        }

        Some(current)
    }

    /// Read a resolver‑annotated local.  The resolver guarantees the binding
    /// exists at that distance; a miss is still reported rather than panicking.
    pub fn get_at(env: &Rc<RefCell<Self>>, distance: usize, name: &Token<'a>) -> Result<Value<'a>> {
        Self::ancestor(env, distance)
            .and_then(|frame| {
                let value = frame.borrow().values.get(name.lexeme).cloned();
                value
            })
            .ok_or_else(|| undefined(name))
    }

    /// Read a synthetic binding (`this`, `super`) at a known distance.
    pub fn get_named_at(env: &Rc<RefCell<Self>>, distance: usize, name: &str) -> Option<Value<'a>> {
        Self::ancestor(env, distance).and_then(|frame| {
            let value = frame.borrow().values.get(name).cloned();
            value
        })
    }

    /// Write a resolver‑annotated local.
    pub fn assign_at(
        env: &Rc<RefCell<Self>>,
        distance: usize,
        name: &Token<'a>,
        value: Value<'a>,
    ) -> Result<()> {
        let frame = Self::ancestor(env, distance).ok_or_else(|| undefined(name))?;
        frame
            .borrow_mut()
            .values
            .insert(name.lexeme.to_string(), value);
        Ok(())
    }
}

fn undefined(name: &Token<'_>) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
