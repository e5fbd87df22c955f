//! Cryptographic adapters.

mod argon2;
mod random;

pub use self::argon2::Argon2PasswordHasher;
pub use self::random::OsRngRandom;
