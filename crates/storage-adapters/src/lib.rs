//! # storage-adapters
//!
//! Implementations of the persistence, media and notification ports.
//! Heavy backends sit behind cargo features:
//!
//! | feature       | adapter              |
//! |---------------|----------------------|
//! | `db-postgres` | `PgStore`            |
//! | `media-local` | `LocalMediaStorage`  |
//! | `notify-http` | `WebhookNotifier`    |
//!
//! The in-memory store and the no-op notifier are always compiled.

pub mod memory;
pub mod notifier;

#[cfg(feature = "media-local")]
pub mod local_media;
#[cfg(feature = "db-postgres")]
pub mod postgres;

#[cfg(feature = "media-local")]
pub use local_media::LocalMediaStorage;
pub use memory::{InMemoryMediaStorage, InMemoryStore};
#[cfg(feature = "notify-http")]
pub use notifier::WebhookNotifier;
pub use notifier::NoopNotifier;
#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
