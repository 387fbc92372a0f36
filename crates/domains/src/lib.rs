//! # domains
//!
//! Entities, query descriptions, errors and port traits for the
//! streetmarket resale marketplace. Nothing in this crate performs I/O.

pub mod errors;
pub mod filter;
pub mod models;
pub mod ports;
pub mod query;
pub mod session;

// Re-exporting for easier access in other crates
pub use errors::*;
pub use filter::*;
pub use models::*;
pub use ports::*;
pub use query::*;
pub use session::*;
