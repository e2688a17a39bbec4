//! Feature flag registry and resolution.
//!
//! Tracks named boolean flags that gate functionality, organizes them
//! into groups, and decides for any flag and calling context whether
//! the flag is currently active, with a traceable reason.
//!
//! # Features
//!
//! - 🚩 **Flag registry** - Register flags at startup, resolve at runtime
//! - 🌍 **Publication** - Durable global activation for stable flags
//! - 🔒 **Enforcement** - Flags that are always on
//! - 🔗 **Query overrides** - One-shot activation from the request context
//! - 👤 **User previews** - Durable per-user opt-ins
//! - 📦 **Groups** - Named, ordered collections of flag keys
//!
//! # Quick Start
//!
//! ```no_run
//! use featuregate::*;
//! use std::sync::Arc;
//!
//! # async fn example() -> FeatureResult<()> {
//! let mut registry = FeatureRegistry::load(
//!     Arc::new(InMemorySettingsStore::new()),
//!     Arc::new(InMemoryPreferenceStore::new()),
//! )
//! .await?;
//!
//! registry.add_flag(
//!     FeatureFlag::new("new-ui")
//!         .with_title("New UI")
//!         .queryable(true),
//! )?;
//!
//! let context = EvaluationContext::new().with_user_id("user-123");
//! let evaluation = registry.is_enabled("new-ui", &context).await?;
//!
//! if evaluation.enabled {
//!     // Show new UI
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Resolution order
//!
//! Signals are checked in strict precedence order and the first match
//! wins. Publication and enforcement are authority overrides that beat
//! any per-request or per-user signal; the query override is a
//! temporary, non-persistent escape hatch and therefore outranks the
//! persistent per-user preference:
//!
//! 1. **Published** - the flag is globally on
//! 2. **Enforced** - the flag is always on
//! 3. **Query override** - the calling context requested it
//! 4. **User preview** - the identified user opted in
//!
//! # Stores
//!
//! Durable state lives behind two adapter traits the embedding
//! application implements: a [`SettingsStore`] for the group
//! collection and the published set, and a [`PreferenceStore`] for
//! per-user overrides. In-memory implementations ship with the crate
//! for tests.

pub mod config;
pub mod context;
pub mod error;
pub mod flag;
pub mod group;
pub mod registry;
pub mod store;

pub use config::{DuplicatePolicy, RegistryConfig};
pub use context::EvaluationContext;
pub use error::{FeatureError, FeatureResult};
pub use flag::FeatureFlag;
pub use group::{FlagGroup, slugify};
pub use registry::{
    Evaluation, FeatureRegistry, GroupOutcome, PreviewOutcome, PublicationOutcome, Reason,
};
pub use store::{InMemoryPreferenceStore, InMemorySettingsStore, PreferenceStore, SettingsStore};
