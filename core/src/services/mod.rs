//! Business services containing domain logic and use cases.

pub mod crypto;
pub mod permission;
pub mod token;

// Re-export commonly used types
pub use crypto::{KeyPair, KeyPairService, PrivateKey, PublicKey, TunnelCodec, TunnelDirection};
pub use permission::{PermissionResolver, SubtypeRegistry, ACCESS_SUBTYPE, TUNNEL_SUBTYPE};
pub use token::{Clock, FixedClock, SystemClock, TokenService, TokenServiceConfig};
