//! Effective permission resolution

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use crate::domain::entities::token::normalize_permissions;
use crate::errors::{DomainError, DomainResult};

use super::registry::SubtypeRegistry;

/// Computes the permissions a subtype grants, following its parent chain
#[derive(Debug, Clone)]
pub struct PermissionResolver {
    registry: Arc<SubtypeRegistry>,
}

impl PermissionResolver {
    pub fn new(registry: Arc<SubtypeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &SubtypeRegistry {
        &self.registry
    }

    /// Own permissions merged with every ancestor's, lower-cased and de-duplicated
    ///
    /// # Errors
    ///
    /// `DomainError::Configuration` when the subtype or a parent is unknown,
    /// when a subtype in the chain declares no permission list, or when the
    /// parent chain loops back on itself.
    pub fn effective_permissions(&self, subtype: &str) -> DomainResult<BTreeSet<String>> {
        let mut effective = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut current = Some(subtype.to_string());

        while let Some(name) = current {
            if !visited.insert(name.clone()) {
                return Err(DomainError::configuration(format!(
                    "subtype '{}' has a cyclic parent chain through '{}'",
                    subtype, name
                )));
            }

            let declaration = self.registry.require(&name)?;
            let own = declaration.permissions.as_ref().ok_or_else(|| {
                DomainError::configuration(format!("subtype '{}' declares no permissions", name))
            })?;

            effective.extend(normalize_permissions(own));
            current = declaration.parent.clone();
        }

        Ok(effective)
    }

    /// The subtype's own declared list, without inherited permissions
    pub fn declared_permissions(&self, subtype: &str) -> DomainResult<BTreeSet<String>> {
        let declaration = self.registry.require(subtype)?;
        declaration
            .permissions
            .as_ref()
            .map(normalize_permissions)
            .ok_or_else(|| {
                DomainError::configuration(format!("subtype '{}' declares no permissions", subtype))
            })
    }

    /// Whether tokens of this subtype carry tunnel key material
    pub fn is_tunnel(&self, subtype: &str) -> DomainResult<bool> {
        Ok(self.registry.require(subtype)?.tunnel)
    }
}
