//! Token subtype descriptors.
//!
//! A subtype is a row in a lookup table rather than a type: it names its own
//! permission list, an optional parent, and whether tokens of this subtype
//! carry tunnel key material.

use serde::{Deserialize, Serialize};

/// Describes one token subtype
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSubtype {
    /// Unique subtype name
    pub name: String,

    /// Own declared permissions. `None` means the subtype declares nothing,
    /// which is a configuration error wherever permissions are resolved.
    /// `Some(vec![])` is a valid, empty declaration.
    #[serde(default)]
    pub permissions: Option<Vec<String>>,

    /// Parent subtype whose effective permissions are inherited
    #[serde(default)]
    pub parent: Option<String>,

    /// Whether tokens of this subtype carry tunnel key pairs
    #[serde(default)]
    pub tunnel: bool,
}

impl TokenSubtype {
    /// Creates a subtype with its own permission declaration and no parent
    pub fn new<I, S>(name: impl Into<String>, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            permissions: Some(permissions.into_iter().map(Into::into).collect()),
            parent: None,
            tunnel: false,
        }
    }

    /// Creates a subtype that declares no permission list at all
    pub fn undeclared(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            permissions: None,
            parent: None,
            tunnel: false,
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_tunnel(mut self) -> Self {
        self.tunnel = true;
        self
    }
}
