//! These traits define what the application needs from the outside world.

pub mod clock;
pub mod credential;
pub mod crypto;
pub mod oauth;
pub mod role;
pub mod telemetry;
pub mod token;
pub mod user;
pub mod verification;

pub use clock::*;
pub use credential::*;
pub use crypto::*;
pub use oauth::*;
pub use role::*;
pub use telemetry::*;
pub use token::*;
pub use user::*;
pub use verification::*;
