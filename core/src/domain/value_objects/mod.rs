//! Value objects.

pub mod public_id;

pub use public_id::{
    IdentifierDigest, IdentifierGenerator, PublicId, MAX_PUBLIC_ID_LEN, MIN_PUBLIC_ID_LEN,
};
