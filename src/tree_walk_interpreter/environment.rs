use super::{RuntimeError, RuntimeValue};
use crate::scanner::Token;
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type EnvironmentRef = Rc<RefCell<Environment>>;

/// One scope frame. Frames are shared: a closure keeps its defining frame
/// alive for as long as the closure itself is reachable.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, RuntimeValue>,
    parent: Option<EnvironmentRef>,
}
impl Environment {
    pub fn wrap(self) -> EnvironmentRef {
        Rc::new(RefCell::new(self))
    }
    pub fn new() -> Self {
        Self::default()
    }
    pub fn new_with_parent(parent: EnvironmentRef) -> Self {
        Environment {
            values: HashMap::new(),
            parent: Some(parent),
        }
    }
    /// Inserts or overwrites in this frame.
    pub fn define(&mut self, name: &str, value: RuntimeValue) {
        trace!("define {} = {:?}", name, value);
        self.values.insert(name.to_string(), value);
    }
    /// Looks `name` up in this frame, then outward through the parents.
    pub fn get(&self, name: &Token) -> Result<RuntimeValue, RuntimeError> {
        match self.values.get(&name.lexeme) {
            Some(value) => Ok(value.clone()),
            None => match &self.parent {
                Some(parent) => parent.borrow().get(name),
                None => Err(RuntimeError::undefined_variable(name)),
            },
        }
    }
    pub fn assign(&mut self, name: &Token, value: RuntimeValue) -> Result<(), RuntimeError> {
        if let Some(target) = self.values.get_mut(&name.lexeme) {
            *target = value;
            Ok(())
        } else if let Some(parent) = &self.parent {
            parent.borrow_mut().assign(name, value)
        } else {
            Err(RuntimeError::undefined_variable(name))
        }
    }
    /// Reads from exactly the frame `distance` hops out. Never searches
    /// other frames.
    pub fn get_at(&self, distance: usize, name: &Token) -> Result<RuntimeValue, RuntimeError> {
        self.ancestor(distance, |environment| {
            environment.values.get(&name.lexeme).cloned()
        })
        .flatten()
        .ok_or_else(|| RuntimeError::undefined_variable(name))
    }
    /// Writes into exactly the frame `distance` hops out, inserting the name if
    /// that frame does not hold it yet.
    pub fn assign_at(
        &mut self,
        distance: usize,
        name: &Token,
        value: RuntimeValue,
    ) -> Result<(), RuntimeError> {
        self.ancestor_mut(distance, |environment| {
            environment.values.insert(name.lexeme.clone(), value);
        })
        .ok_or_else(|| RuntimeError::undefined_variable(name))
    }
    fn ancestor<T, F: FnOnce(&Self) -> T>(&self, depth: usize, cb: F) -> Option<T> {
        if depth == 0 {
            Some(cb(self))
        } else {
            self.parent
                .as_ref()
                .and_then(|parent| parent.borrow().ancestor(depth - 1, cb))
        }
    }
    fn ancestor_mut<T, F: FnOnce(&mut Self) -> T>(&mut self, depth: usize, cb: F) -> Option<T> {
        if depth == 0 {
            Some(cb(self))
        } else {
            self.parent
                .as_ref()
                .and_then(|parent| parent.borrow_mut().ancestor_mut(depth - 1, cb))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::scan;
    use pretty_assertions::assert_eq;

    fn name(lexeme: &str) -> Token {
        let (mut tokens, _) = scan(lexeme);
        tokens.remove(0)
    }

    fn chain() -> (EnvironmentRef, EnvironmentRef) {
        let mut global = Environment::new();
        global.define("a", 1.0.into());
        global.define("shadowed", String::from("global").into());
        let global = global.wrap();
        let mut local = Environment::new_with_parent(global.clone());
        local.define("shadowed", String::from("local").into());
        (global, local.wrap())
    }

    #[test]
    fn define_overwrites() {
        let mut environment = Environment::new();
        environment.define("a", 1.0.into());
        environment.define("a", 2.0.into());
        assert_eq!(environment.get(&name("a")).unwrap(), 2.0.into());
    }

    #[test]
    fn get_and_assign_walk_the_chain() {
        let (global, local) = chain();
        assert_eq!(local.borrow().get(&name("a")).unwrap(), 1.0.into());
        assert_eq!(
            local.borrow().get(&name("shadowed")).unwrap().to_string(),
            "local"
        );
        local.borrow_mut().assign(&name("a"), 5.0.into()).unwrap();
        assert_eq!(global.borrow().get(&name("a")).unwrap(), 5.0.into());

        let missing = local.borrow().get(&name("missing")).unwrap_err();
        assert_eq!(missing.to_string(), "Undefined variable 'missing'.");
        assert!(local
            .borrow_mut()
            .assign(&name("missing"), RuntimeValue::Nil)
            .is_err());
    }

    #[test]
    fn distance_lookups_use_exactly_one_frame() {
        let (global, local) = chain();
        assert_eq!(
            local.borrow().get_at(1, &name("shadowed")).unwrap().to_string(),
            "global"
        );
        // no fallback to the outer frame
        assert!(local.borrow().get_at(0, &name("a")).is_err());
        assert!(local.borrow().get_at(2, &name("a")).is_err());

        local
            .borrow_mut()
            .assign_at(1, &name("shadowed"), 3.0.into())
            .unwrap();
        assert_eq!(global.borrow().get(&name("shadowed")).unwrap(), 3.0.into());
        assert_eq!(
            local.borrow().get_at(0, &name("shadowed")).unwrap().to_string(),
            "local"
        );
    }
}
