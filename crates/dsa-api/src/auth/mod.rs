//! Token verification for learners and admins.
//!
//! Tokens are issued by the platform's identity service; this crate only
//! verifies them. A token travels either in `Authorization: Bearer` or in the
//! encrypted `auth_token` cookie.

pub mod jwt;
pub mod middleware;

pub use middleware::{AdminUser, AuthUser};
