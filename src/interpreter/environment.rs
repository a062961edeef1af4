use std::collections::HashMap;

use log::debug;

use super::value::Value;
use crate::error::{Error, Result};

/// Handle to a scope record inside an `Environment`. Besides the arena slot it carries the
/// serial number the scope was opened with, so a handle to a released scope never reaches a
/// scope opened later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId {
    index: usize,
    serial: u64,
}

impl std::fmt::Display for ScopeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.serial)
    }
}

#[derive(Debug, Clone)]
struct Binding {
    value: Value,
    constant: bool,
}

#[derive(Debug)]
struct Scope {
    serial: u64,
    variables: HashMap<String, Binding>,
    parent: Option<ScopeId>,
}

/// Arena of scope records. Scopes form a tree through their parent handles; the global scope is
/// opened first and is never released. Nested scopes are released in the reverse order they
/// were opened, when the evaluation frame that opened them returns. Serial numbers only grow.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
    next_serial: u64,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// A fresh environment whose global scope holds the constants `true`, `false` and `null`.
    pub fn new() -> Self {
        let mut globals = HashMap::new();
        for (name, value) in [
            ("true", Value::Bool(true)),
            ("false", Value::Bool(false)),
            ("null", Value::Null),
        ] {
            globals.insert(
                name.to_string(),
                Binding {
                    value,
                    constant: true,
                },
            );
        }
        Self {
            scopes: vec![Scope {
                serial: 0,
                variables: globals,
                parent: None,
            }],
            next_serial: 1,
        }
    }

    pub fn global(&self) -> ScopeId {
        ScopeId {
            index: 0,
            serial: 0,
        }
    }

    fn scope(&self, id: ScopeId) -> Result<&Scope> {
        self.scopes
            .get(id.index)
            .filter(|scope| scope.serial == id.serial)
            .ok_or(Error::StaleScope(id))
    }

    fn scope_mut(&mut self, id: ScopeId) -> Result<&mut Scope> {
        self.scopes
            .get_mut(id.index)
            .filter(|scope| scope.serial == id.serial)
            .ok_or(Error::StaleScope(id))
    }

    /// Opens a scope nested inside `parent`.
    pub fn child(&mut self, parent: ScopeId) -> Result<ScopeId> {
        self.scope(parent)?;
        let id = ScopeId {
            index: self.scopes.len(),
            serial: self.next_serial,
        };
        self.next_serial += 1;
        self.scopes.push(Scope {
            serial: id.serial,
            variables: HashMap::new(),
            parent: Some(parent),
        });
        debug!("opened scope {id} (parent {parent})");
        Ok(id)
    }

    /// Drops `scope` and every scope opened after it. The global scope and handles that are
    /// already released are left alone.
    pub fn release(&mut self, scope: ScopeId) {
        if scope == self.global() || self.scope(scope).is_err() {
            return;
        }
        debug!("released scope {scope}");
        self.scopes.truncate(scope.index);
    }

    /// The scope `scope` is nested in, `None` for the global scope or a released handle.
    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope(scope).ok().and_then(|s| s.parent)
    }

    /// Number of live scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn declare(
        &mut self,
        scope: ScopeId,
        name: &str,
        value: Value,
        constant: bool,
    ) -> Result<Value> {
        let variables = &mut self.scope_mut(scope)?.variables;
        if variables.contains_key(name) {
            return Err(Error::Redeclaration(name.to_string()));
        }
        debug!(
            "declared {} '{}' = {} in scope {}",
            if constant { "const" } else { "let" },
            name,
            value,
            scope
        );
        variables.insert(
            name.to_string(),
            Binding {
                value: value.clone(),
                constant,
            },
        );
        Ok(value)
    }

    /// Rebinds `name` in the scope that owns it, which may be an ancestor of `scope`.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> Result<Value> {
        let owner = self.resolve(scope, name)?;
        let binding = self
            .scope_mut(owner)?
            .variables
            .get_mut(name)
            .ok_or_else(|| Error::UnresolvedName(name.to_string()))?;
        if binding.constant {
            return Err(Error::ConstAssignment(name.to_string()));
        }
        binding.value = value.clone();
        Ok(value)
    }

    pub fn lookup(&self, scope: ScopeId, name: &str) -> Result<Value> {
        self.binding(scope, name).map(|binding| binding.value.clone())
    }

    /// Nearest scope, starting at `scope` and walking up the parents, that binds `name`.
    pub fn resolve(&self, scope: ScopeId, name: &str) -> Result<ScopeId> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if self.scope(id)?.variables.contains_key(name) {
                return Ok(id);
            }
            current = self.parent(id);
        }
        Err(Error::UnresolvedName(name.to_string()))
    }

    pub fn is_constant(&self, scope: ScopeId, name: &str) -> Result<bool> {
        self.binding(scope, name).map(|binding| binding.constant)
    }

    fn binding(&self, scope: ScopeId, name: &str) -> Result<&Binding> {
        let owner = self.resolve(scope, name)?;
        self.scope(owner)?
            .variables
            .get(name)
            .ok_or_else(|| Error::UnresolvedName(name.to_string()))
    }
}
