//! secp256k1 keys.

/// Key types, creation, validation and encodings.
pub(crate) mod core;

/// Constant-time point multiplication for shared secrets.
pub(crate) mod ecdh;

/// Additive and multiplicative key tweaks.
pub(crate) mod tweak;

pub use self::core::*;
pub use ecdh::*;
pub use tweak::*;
