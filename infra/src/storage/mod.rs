//! Sharded filesystem token store
//!
//! - `fs` - async filesystem seam and its tokio implementation
//! - `layout` - identifier to path mapping
//! - `record` - on-disk JSON document
//! - `token_store` - the `TokenStore` implementation

pub mod fs;
pub mod layout;
pub mod record;
pub mod token_store;

#[cfg(test)]
mod tests;

pub use fs::{Filesystem, LocalFilesystem};
pub use layout::ShardLayout;
pub use record::StoredToken;
pub use token_store::FsTokenStore;
