//! Registry of known token subtypes

use std::collections::HashMap;

use crate::domain::entities::subtype::TokenSubtype;
use crate::errors::{DomainError, DomainResult};

/// Name of the plain access subtype shipped by [`SubtypeRegistry::standard`]
pub const ACCESS_SUBTYPE: &str = "access";

/// Name of the tunnel subtype shipped by [`SubtypeRegistry::standard`]
pub const TUNNEL_SUBTYPE: &str = "tunnel";

/// Lookup table of token subtypes keyed by name
#[derive(Debug, Clone, Default)]
pub struct SubtypeRegistry {
    subtypes: HashMap<String, TokenSubtype>,
}

impl SubtypeRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the two built-in subtypes
    ///
    /// * `access` declares `["access"]`
    /// * `tunnel` declares `["tunnel"]`, inherits from `access` and carries key pairs
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry.insert(TokenSubtype::new(ACCESS_SUBTYPE, [ACCESS_SUBTYPE]));
        registry.insert(
            TokenSubtype::new(TUNNEL_SUBTYPE, [TUNNEL_SUBTYPE])
                .with_parent(ACCESS_SUBTYPE)
                .with_tunnel(),
        );
        registry
    }

    /// Adds a subtype, rejecting duplicate names
    pub fn register(&mut self, subtype: TokenSubtype) -> DomainResult<()> {
        if subtype.name.trim().is_empty() {
            return Err(DomainError::configuration("subtype name must not be empty"));
        }
        if self.subtypes.contains_key(&subtype.name) {
            return Err(DomainError::configuration(format!(
                "subtype '{}' registered twice",
                subtype.name
            )));
        }
        self.insert(subtype);
        Ok(())
    }

    /// Builder-style variant of [`register`](Self::register)
    pub fn with(mut self, subtype: TokenSubtype) -> DomainResult<Self> {
        self.register(subtype)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&TokenSubtype> {
        self.subtypes.get(name)
    }

    /// Looks up a subtype, treating absence as a configuration error
    pub fn require(&self, name: &str) -> DomainResult<&TokenSubtype> {
        self.get(name)
            .ok_or_else(|| DomainError::configuration(format!("unknown token subtype '{}'", name)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.subtypes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.subtypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtypes.is_empty()
    }

    fn insert(&mut self, subtype: TokenSubtype) {
        self.subtypes.insert(subtype.name.clone(), subtype);
    }
}
