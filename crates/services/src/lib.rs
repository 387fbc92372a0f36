//! # services
//!
//! Marketplace use cases on top of the `domains` ports: the filter codec
//! and query builder behind the feed, presentation, the upload wizard,
//! pricing, profiles and seller stats. Adapters are injected as trait
//! objects; nothing here knows about HTTP or SQL.

pub mod contact;
pub mod debounce;
pub mod feed;
pub mod filter_codec;
pub mod image_selection;
pub mod listing;
pub mod photo;
pub mod presenter;
pub mod pricing;
pub mod profile;
pub mod query_builder;
pub mod search_gate;
pub mod stats;
pub mod wizard;

pub use feed::{FeedOutcome, FeedService, FeedSettings, ItemDetail, Listing, SellerCard};
pub use listing::{ListingService, PriceSuggestion};
pub use photo::Photo;
pub use presenter::{DisplayItem, OwnedItem};
pub use pricing::{FixedBaseSuggester, RandomMultiplierSuggester};
pub use profile::ProfileService;
pub use stats::{SellerStats, StatsService};
pub use wizard::{ListingDetails, UploadWizard, WizardStep};
