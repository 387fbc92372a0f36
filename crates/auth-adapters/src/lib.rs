//! # auth-adapters
//!
//! Bearer-token verification for the `TokenVerifier` port.

#[cfg(feature = "auth-jwt")]
pub mod jwt;

#[cfg(feature = "auth-jwt")]
pub use jwt::{Claims, JwtTokenVerifier};
