use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

use serde_json::{Map, Value};

use crate::error::Error;

/// Wire shape of one remote operation: its endpoint path and the parameters
/// a caller must supply before the request may be dispatched.
#[derive(Debug, Clone)]
pub struct OperationDefinition {
    endpoint: String,
    required_params: Vec<String>,
}

impl OperationDefinition {
    pub fn new(endpoint: impl Into<String>, required_params: &[&str]) -> Self {
        Self {
            endpoint: endpoint.into(),
            required_params: required_params.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Endpoint path, appended to the client's base URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Required parameter names, in declaration order.
    pub fn required_params(&self) -> &[String] {
        &self.required_params
    }

    /// Checks that every required parameter is present and non-blank.
    ///
    /// A parameter fails the check when it is absent, `null`, or a string
    /// that is empty after trimming. The first failure aborts the whole
    /// call; no request is ever issued on partial input.
    pub fn validate(&self, options: &Map<String, Value>) -> Result<(), Error> {
        for name in &self.required_params {
            match options.get(name) {
                None | Some(Value::Null) => return Err(Error::missing_parameter(name)),
                Some(Value::String(s)) if s.trim().is_empty() => {
                    return Err(Error::missing_parameter(name));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

/// Read-only operation table handed to the engine at construction.
///
/// The engine itself is catalog-agnostic: the concrete client decides which
/// operations exist and what they require.
#[derive(Debug, Clone)]
pub struct OperationCatalog<O> {
    entries: HashMap<O, OperationDefinition>,
}

impl<O> OperationCatalog<O>
where
    O: Copy + Eq + Hash + Display,
{
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Register an operation. Re-registering an id replaces its definition.
    pub fn register(mut self, operation: O, definition: OperationDefinition) -> Self {
        self.entries.insert(operation, definition);
        self
    }

    /// Look up the definition for an operation id.
    pub fn resolve(&self, operation: O) -> Result<&OperationDefinition, Error> {
        self.entries
            .get(&operation)
            .ok_or_else(|| Error::UnknownOperation(operation.to_string()))
    }

    pub fn contains(&self, operation: O) -> bool {
        self.entries.contains_key(&operation)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<O> Default for OperationCatalog<O>
where
    O: Copy + Eq + Hash + Display,
{
    fn default() -> Self {
        Self::new()
    }
}
