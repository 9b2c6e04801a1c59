use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{NetworkError, Result};

/// Stable handle for a variable. The wrapped value is the variable's column
/// index in every sample row, so it never changes once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub usize);

impl VariableId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for VariableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named boolean variable in the network.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Unique name of the variable
    name: String,
    /// Column index into each sample row
    id: VariableId,
    /// Ordered parents; mutated only by the graph's edge operations
    parents: Vec<VariableId>,
}

impl Variable {
    fn new(name: String, id: VariableId) -> Self {
        Variable {
            name,
            id,
            parents: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> VariableId {
        self.id
    }

    pub fn parents(&self) -> &[VariableId] {
        &self.parents
    }

    /// Appends a parent unless it is already listed.
    pub(crate) fn add_parent(&mut self, parent: VariableId) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }

    pub(crate) fn remove_parent(&mut self, parent: VariableId) {
        self.parents.retain(|p| *p != parent);
    }
}

/// Arena of variables addressed by `VariableId`, with a name index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
    by_name: HashMap<String, VariableId>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from names given in column order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut registry = Self::new();
        for name in names {
            registry.register(name)?;
        }
        Ok(registry)
    }

    /// Registers a new variable at the next column index.
    pub fn register(&mut self, name: impl Into<String>) -> Result<VariableId> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(NetworkError::DuplicateVariable(name));
        }
        let id = VariableId(self.variables.len());
        self.by_name.insert(name.clone(), id);
        self.variables.push(Variable::new(name, id));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn get(&self, id: VariableId) -> &Variable {
        &self.variables[id.index()]
    }

    pub(crate) fn get_mut(&mut self, id: VariableId) -> &mut Variable {
        &mut self.variables[id.index()]
    }

    pub fn id_of(&self, name: &str) -> Option<VariableId> {
        self.by_name.get(name).copied()
    }

    /// Looks up a variable by name, failing with `UnknownVariable`.
    pub fn require(&self, name: &str) -> Result<VariableId> {
        self.id_of(name)
            .ok_or_else(|| NetworkError::UnknownVariable(name.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = VariableId> + '_ {
        self.variables.iter().map(|v| v.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.variables.iter()
    }

    pub fn name(&self, id: VariableId) -> &str {
        self.variables[id.index()].name()
    }
}
