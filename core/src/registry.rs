//! Declaration-ordered store of specifications with ref and alias indexes.

use std::collections::HashMap;

use crate::error::ArgParseError;
use crate::spec::Specification;
use crate::types::Token;

/// The set of specifications one parser matches against.
///
/// Declaration order is preserved because positional matching fills slots
/// left to right. Refs and aliases are unique across the registry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    specs: Vec<Specification>,
    by_ref: HashMap<String, usize>,
    by_alias: HashMap<String, usize>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a specification.
    ///
    /// # Errors
    ///
    /// Returns [`ArgParseError::DuplicateName`] when one of its aliases is
    /// already declared, or [`ArgParseError::DuplicateRef`] when its ref is.
    /// The registry is unchanged on error.
    pub fn insert(&mut self, spec: Specification) -> Result<(), ArgParseError> {
        if let Some(name) = spec.names().iter().find(|n| self.by_alias.contains_key(*n)) {
            return Err(ArgParseError::DuplicateName(name.clone()));
        }
        if self.by_ref.contains_key(spec.reference()) {
            return Err(ArgParseError::DuplicateRef(spec.reference().to_string()));
        }

        let index = self.specs.len();
        self.by_ref.insert(spec.reference().to_string(), index);
        for name in spec.names() {
            self.by_alias.insert(name.clone(), index);
        }
        self.specs.push(spec);
        Ok(())
    }

    pub fn get(&self, reference: &str) -> Option<&Specification> {
        self.by_ref.get(reference).map(|&i| &self.specs[i])
    }

    /// Resolves the specification a named or flag token refers to.
    ///
    /// Aliases are matched exactly. A bare `name=value` token that matches no
    /// alias falls back to matching a ref.
    pub fn lookup(&self, token: &Token) -> Option<(usize, &Specification)> {
        let index = self.by_alias.get(&token.name).copied().or_else(|| {
            token
                .is_bare()
                .then(|| self.by_ref.get(&token.name).copied())
                .flatten()
        })?;
        Some((index, &self.specs[index]))
    }

    /// Specifications in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Specification> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}
