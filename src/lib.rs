// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod api;
pub mod content;
pub mod error;
pub mod feed;
pub mod metrics;
pub mod profile;
pub mod query;
pub mod scoring;

// ---- Re-exports for stable public API ----
// Router construction: `scroll_focus_feed::api::router` or `scroll_focus_feed::router`
pub use crate::api::{router, AppState};

// Common types for bins/tests
pub use crate::content::{ContentItem, ContentSource};
pub use crate::error::FeedError;
pub use crate::profile::{ProfileSource, UserProfile};
pub use crate::query::{QueryEngine, QueryInterpretation, QueryRulesHandle};
