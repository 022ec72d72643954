/// Lexically nested scopes. Each scope holds value bindings, the set of
/// const names, a type table and a module table; lookups walk the parent
/// chain. Closures keep their captured scope alive through `EnvRef`.
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::ast::TypeDef;
use crate::builtins;
use crate::location::Loc;
use crate::value::{RuntimeError, Value};

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    consts: HashSet<String>,
    types: HashMap<String, Rc<TypeDef>>,
    modules: HashMap<String, EnvRef>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> EnvRef {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// Fresh root scope pre-populated with the builtin catalogue.
    pub fn global() -> EnvRef {
        let env = Environment::new();
        builtins::register_all(&mut env.borrow_mut());
        env
    }

    /// Child scope whose parent is `parent`.
    pub fn extend(parent: &EnvRef) -> EnvRef {
        Rc::new(RefCell::new(Environment {
            parent: Some(Rc::clone(parent)),
            ..Environment::default()
        }))
    }

    /// Insert a binding in this scope. Declaring a non-const binding whose
    /// name collides with a const binding in any enclosing scope is an error.
    pub fn define(
        &mut self,
        name: &str,
        value: Value,
        is_const: bool,
        loc: &Loc,
    ) -> Result<(), RuntimeError> {
        if !is_const && self.is_const(name) {
            return Err(RuntimeError::new(
                format!("Cannot redeclare const '{}' with let", name),
                loc,
            ));
        }
        self.bindings.insert(name.to_string(), value);
        if is_const {
            self.consts.insert(name.to_string());
        }
        Ok(())
    }

    /// Used for bindings the core synthesizes itself (builtins, parameters,
    /// pattern bindings) where the const collision rule does not apply.
    pub fn insert(&mut self, name: &str, value: Value) {
        self.bindings.insert(name.to_string(), value);
    }

    /// Reassign the nearest scope that defines `name`.
    pub fn set(&mut self, name: &str, value: Value, loc: &Loc) -> Result<(), RuntimeError> {
        if self.bindings.contains_key(name) {
            if self.consts.contains(name) {
                return Err(RuntimeError::new(
                    format!("Cannot reassign const variable '{}'", name),
                    loc,
                ));
            }
            self.bindings.insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().set(name, value, loc),
            None => Err(RuntimeError::new(
                format!("Undefined variable: {}", name),
                loc,
            )),
        }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    pub fn is_const(&self, name: &str) -> bool {
        if self.consts.contains(name) {
            return true;
        }
        self.parent
            .as_ref()
            .map(|p| p.borrow().is_const(name))
            .unwrap_or(false)
    }

    pub fn define_type(&mut self, def: TypeDef) -> Rc<TypeDef> {
        let def = Rc::new(def);
        self.types.insert(def.name.clone(), Rc::clone(&def));
        def
    }

    pub fn get_type(&self, name: &str) -> Option<Rc<TypeDef>> {
        if let Some(def) = self.types.get(name) {
            return Some(Rc::clone(def));
        }
        self.parent.as_ref().and_then(|p| p.borrow().get_type(name))
    }

    pub fn define_module(&mut self, name: &str, module_env: EnvRef) {
        self.modules.insert(name.to_string(), module_env);
    }

    pub fn get_module(&self, name: &str) -> Option<EnvRef> {
        if let Some(env) = self.modules.get(name) {
            return Some(Rc::clone(env));
        }
        self.parent
            .as_ref()
            .and_then(|p| p.borrow().get_module(name))
    }
}
