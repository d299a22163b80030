//! Permission model for token subtypes
//!
//! Subtypes live in a [`SubtypeRegistry`]. The [`PermissionResolver`] walks a
//! subtype's parent chain and merges every declared list into the effective
//! permission set stamped onto new tokens.

mod registry;
mod resolver;


pub use registry::{SubtypeRegistry, ACCESS_SUBTYPE, TUNNEL_SUBTYPE};
pub use resolver::PermissionResolver;
