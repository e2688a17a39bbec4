//! Feature flag registry and resolution.
//!
//! [`FeatureRegistry`] owns the in-memory set of registered flags and
//! the loaded group collection, and decides whether a flag is active
//! for a calling context by combining publication, enforcement, the
//! query override, and the user's preview preference in strict
//! precedence order.

use crate::config::{DuplicatePolicy, RegistryConfig};
use crate::context::EvaluationContext;
use crate::error::{FeatureError, FeatureResult};
use crate::flag::FeatureFlag;
use crate::group::FlagGroup;
use crate::store::{PreferenceStore, SettingsStore};
use log::{debug, info, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// Why a resolution produced its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// The flag is in the global publication set
    Published,
    /// The flag is enforced
    Enforced,
    /// The calling context requested this flag
    QueryOverride,
    /// The identified user opted into a preview
    UserPreview,
    /// No signal matched; the flag is off
    Default,
}

impl Reason {
    /// Human-readable reason text.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Published => "Published",
            Self::Enforced => "Enforced",
            Self::QueryOverride => "Using query string",
            Self::UserPreview => "User preview",
            Self::Default => "",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of resolving one flag for one context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    /// Whether the flag is active
    pub enabled: bool,

    /// The first signal that matched
    pub reason: Reason,
}

impl Evaluation {
    fn enabled(reason: Reason) -> Self {
        Self { enabled: true, reason }
    }

    fn disabled() -> Self {
        Self { enabled: false, reason: Reason::Default }
    }
}

/// Outcome of a group mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// The group was created and the full collection persisted
    Created,
    /// The group was deleted and the remaining collection persisted
    Deleted,
}

impl std::fmt::Display for GroupOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Outcome of a publication toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicationOutcome {
    /// The flag joined the global publication set
    Published,
    /// The flag left the global publication set
    Unpublished,
}

impl std::fmt::Display for PublicationOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Published => write!(f, "published"),
            Self::Unpublished => write!(f, "unpublished"),
        }
    }
}

/// Outcome of a preview toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    /// The user's preview is now on
    Enabled,
    /// The user's preview is now off
    Disabled,
}

impl std::fmt::Display for PreviewOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enabled => write!(f, "enabled"),
            Self::Disabled => write!(f, "disabled"),
        }
    }
}

/// Feature flag registry.
///
/// Flags are registered imperatively at startup and live only in
/// memory for the process lifetime. The group collection is loaded
/// from the [`SettingsStore`] at construction and written back whole
/// on every mutation; the published set is read and written on demand
/// under its own key; user preferences live entirely in the
/// [`PreferenceStore`].
///
/// Mutating operations take `&mut self`. Embedders running concurrent
/// mutators must serialize them: the whole-collection read-modify-write
/// is not safe under unsynchronized concurrent writers.
pub struct FeatureRegistry {
    config: RegistryConfig,
    flags: HashMap<String, FeatureFlag>,
    groups: Vec<FlagGroup>,
    settings: Arc<dyn SettingsStore>,
    preferences: Arc<dyn PreferenceStore>,
}

impl FeatureRegistry {
    /// Load a registry with the default configuration.
    pub async fn load(
        settings: Arc<dyn SettingsStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> FeatureResult<Self> {
        Self::load_with_config(RegistryConfig::default(), settings, preferences).await
    }

    /// Load a registry, reading the group collection from the settings
    /// store.
    pub async fn load_with_config(
        config: RegistryConfig,
        settings: Arc<dyn SettingsStore>,
        preferences: Arc<dyn PreferenceStore>,
    ) -> FeatureResult<Self> {
        let groups: Vec<FlagGroup> = read_collection(settings.as_ref(), &config.groups_key)
            .await?
            .unwrap_or_default();
        info!("Feature registry loaded with {} group(s)", groups.len());

        Ok(Self {
            config,
            flags: HashMap::new(),
            groups,
            settings,
            preferences,
        })
    }

    // ========== Flag registration ==========

    /// Register a flag.
    ///
    /// A key that is already taken is rejected with
    /// [`FeatureError::DuplicateFlag`] under
    /// [`DuplicatePolicy::Reject`], or replaces the existing flag under
    /// [`DuplicatePolicy::Replace`].
    pub fn add_flag(&mut self, flag: FeatureFlag) -> FeatureResult<()> {
        if self.flags.contains_key(&flag.key) {
            match self.config.duplicate_policy {
                DuplicatePolicy::Reject => {
                    return Err(FeatureError::DuplicateFlag(flag.key.clone()));
                }
                DuplicatePolicy::Replace => {
                    warn!("Feature flag '{}' already registered, replacing", flag.key);
                }
            }
        } else {
            debug!("Feature flag '{}' registered", flag.key);
        }
        self.flags.insert(flag.key.clone(), flag);
        Ok(())
    }

    /// Look up a registered flag.
    pub fn find_flag(&self, key: &str) -> Option<&FeatureFlag> {
        self.flags.get(key)
    }

    /// List registered flags whose `enforced` attribute matches, sorted
    /// by key.
    pub fn list_flags(&self, enforced: bool) -> Vec<&FeatureFlag> {
        let mut flags: Vec<_> = self
            .flags
            .values()
            .filter(|flag| flag.enforced == enforced)
            .collect();
        flags.sort_by(|a, b| a.key.cmp(&b.key));
        flags
    }

    // ========== Resolution ==========

    /// Resolve a flag's active state for a calling context.
    ///
    /// Signals are checked in strict precedence order and the first
    /// match wins: publication, enforcement, the query override, then
    /// the identified user's preview preference. Publication and
    /// enforcement are authority overrides; the query override is a
    /// one-shot escape hatch and outranks the persistent per-user
    /// preference.
    ///
    /// A context that requests a non-queryable flag is a caller error
    /// ([`FeatureError::NotQueryable`]) regardless of which flag is
    /// being resolved.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use featuregate::*;
    /// # async fn example(registry: &FeatureRegistry) -> FeatureResult<()> {
    /// let context = EvaluationContext::new().with_user_id("user-123");
    /// let evaluation = registry.is_enabled("new-ui", &context).await?;
    ///
    /// if evaluation.enabled {
    ///     println!("active: {}", evaluation.reason);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn is_enabled(
        &self,
        key: &str,
        context: &EvaluationContext,
    ) -> FeatureResult<Evaluation> {
        let flag = self
            .find_flag(key)
            .ok_or_else(|| FeatureError::UnknownFlag(key.to_string()))?;

        if self.published_set().await?.contains(key) {
            return Ok(Evaluation::enabled(Reason::Published));
        }

        if flag.enforced {
            return Ok(Evaluation::enabled(Reason::Enforced));
        }

        if let Some(requested) = context.requested_flag() {
            let requested_flag = self
                .find_flag(requested)
                .ok_or_else(|| FeatureError::UnknownFlag(requested.to_string()))?;
            if !requested_flag.queryable {
                return Err(FeatureError::NotQueryable(requested.to_string()));
            }
            if requested == key {
                return Ok(Evaluation::enabled(Reason::QueryOverride));
            }
        }

        if let Some(user_id) = context.user_id() {
            let preferences = self
                .preferences
                .get_preferences(user_id)
                .await?
                .unwrap_or_default();
            if preferences.get(key).copied().unwrap_or(false) {
                return Ok(Evaluation::enabled(Reason::UserPreview));
            }
        }

        Ok(Evaluation::disabled())
    }

    /// Boolean shorthand over [`is_enabled`](Self::is_enabled).
    pub async fn is_active(&self, key: &str, context: &EvaluationContext) -> FeatureResult<bool> {
        Ok(self.is_enabled(key, context).await?.enabled)
    }

    /// Whether a flag is currently in the global publication set.
    pub async fn is_published(&self, key: &str) -> FeatureResult<bool> {
        self.find_flag(key)
            .ok_or_else(|| FeatureError::UnknownFlag(key.to_string()))?;
        Ok(self.published_set().await?.contains(key))
    }

    // ========== Toggles ==========

    /// Flip the identified user's preview preference for a flag.
    ///
    /// An absent preference counts as off, so the first toggle turns
    /// the preview on. Without an identified user this is a valid
    /// no-op and returns `None`; callers that rely on persistence must
    /// check for an identified user first.
    pub async fn toggle_feature_preview(
        &self,
        key: &str,
        user_id: Option<&str>,
    ) -> FeatureResult<Option<PreviewOutcome>> {
        self.find_flag(key)
            .ok_or_else(|| FeatureError::UnknownFlag(key.to_string()))?;

        let Some(user_id) = user_id else {
            return Ok(None);
        };

        let mut preferences = self
            .preferences
            .get_preferences(user_id)
            .await?
            .unwrap_or_default();
        let enabled = !preferences.get(key).copied().unwrap_or(false);
        preferences.insert(key.to_string(), enabled);
        self.preferences.set_preferences(user_id, preferences).await?;

        let outcome = if enabled {
            PreviewOutcome::Enabled
        } else {
            PreviewOutcome::Disabled
        };
        debug!("Feature preview '{}' {} for user '{}'", key, outcome, user_id);
        Ok(Some(outcome))
    }

    /// Toggle a flag's membership in the global publication set.
    ///
    /// Publishing requires the flag to be stable; un-publishing is
    /// always permitted. The set is replaced whole on every write, and
    /// a rejected publication leaves it untouched.
    pub async fn toggle_feature_publication(
        &self,
        key: &str,
    ) -> FeatureResult<PublicationOutcome> {
        let flag = self
            .find_flag(key)
            .ok_or_else(|| FeatureError::UnknownFlag(key.to_string()))?;

        let mut published = self.published_set().await?;
        let outcome = if published.remove(key) {
            PublicationOutcome::Unpublished
        } else {
            if !flag.stable {
                return Err(FeatureError::UnstableFlag(key.to_string()));
            }
            published.insert(key.to_string());
            PublicationOutcome::Published
        };

        write_collection(self.settings.as_ref(), &self.config.published_key, &published).await?;
        info!("Feature flag '{}' {}", key, outcome);
        Ok(outcome)
    }

    async fn published_set(&self) -> FeatureResult<BTreeSet<String>> {
        Ok(
            read_collection(self.settings.as_ref(), &self.config.published_key)
                .await?
                .unwrap_or_default(),
        )
    }

    // ========== Group management ==========

    /// Create a group and persist the full group collection.
    ///
    /// The key is slugified. Group keys are unique: an existing slug is
    /// rejected with [`FeatureError::DuplicateGroup`].
    pub async fn create_group(
        &mut self,
        key: &str,
        name: &str,
        description: &str,
        private: bool,
    ) -> FeatureResult<GroupOutcome> {
        let group = FlagGroup::new(key, name, description, private);
        if self.groups.iter().any(|g| g.key == group.key) {
            return Err(FeatureError::DuplicateGroup(group.key));
        }

        let slug = group.key.clone();
        let mut groups = self.groups.clone();
        groups.push(group);
        self.save_groups(groups).await?;

        debug!("Feature group '{}' created", slug);
        Ok(GroupOutcome::Created)
    }

    /// Delete a group by key and persist the remaining collection.
    pub async fn delete_group(&mut self, key: &str) -> FeatureResult<GroupOutcome> {
        let index = self
            .groups
            .iter()
            .position(|g| g.key == key)
            .ok_or_else(|| FeatureError::GroupNotFound(key.to_string()))?;

        let mut groups = self.groups.clone();
        groups.remove(index);
        self.save_groups(groups).await?;

        debug!("Feature group '{}' deleted", key);
        Ok(GroupOutcome::Deleted)
    }

    /// Look up a loaded group.
    pub fn find_group(&self, key: &str) -> Option<&FlagGroup> {
        self.groups.iter().find(|g| g.key == key)
    }

    /// Read the full group collection from the settings store.
    pub async fn get_groups(&self) -> FeatureResult<Vec<FlagGroup>> {
        Ok(
            read_collection(self.settings.as_ref(), &self.config.groups_key)
                .await?
                .unwrap_or_default(),
        )
    }

    /// Replace the full group collection, in the settings store first
    /// and then in memory.
    ///
    /// A failed write leaves the in-memory copy at its previous value.
    pub async fn save_groups(&mut self, groups: Vec<FlagGroup>) -> FeatureResult<()> {
        write_collection(self.settings.as_ref(), &self.config.groups_key, &groups).await?;
        self.groups = groups;
        Ok(())
    }
}

async fn read_collection<T: DeserializeOwned>(
    store: &dyn SettingsStore,
    key: &str,
) -> FeatureResult<Option<T>> {
    if let Some(json) = store.get_json(key).await? {
        let value = serde_json::from_str(&json)
            .map_err(|e| FeatureError::Deserialization(e.to_string()))?;
        Ok(Some(value))
    } else {
        Ok(None)
    }
}

async fn write_collection<T: Serialize>(
    store: &dyn SettingsStore,
    key: &str,
    value: &T,
) -> FeatureResult<()> {
    let json =
        serde_json::to_string(value).map_err(|e| FeatureError::Serialization(e.to_string()))?;
    store.set_json(key, json).await
}
