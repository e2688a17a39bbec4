//! Integration tests for common feature flag workflows.
//!
//! These tests exercise the registry end to end over the in-memory
//! store implementations, plus a failing store to verify that rejected
//! writes never partially apply.

use async_trait::async_trait;
use featuregate::*;
use std::collections::HashMap;
use std::sync::Arc;

async fn registry() -> FeatureRegistry {
    FeatureRegistry::load(
        Arc::new(InMemorySettingsStore::new()),
        Arc::new(InMemoryPreferenceStore::new()),
    )
    .await
    .unwrap()
}

// =============================================================================
// Resolution precedence
// =============================================================================

#[tokio::test]
async fn test_full_precedence_table() {
    let mut registry = registry().await;
    registry
        .add_flag(FeatureFlag::new("everything").enforced(true).queryable(true).stable(true))
        .unwrap();
    registry.toggle_feature_publication("everything").await.unwrap();
    registry
        .toggle_feature_preview("everything", Some("user-1"))
        .await
        .unwrap();

    // Published beats enforced, the query override, and the preview.
    let context = EvaluationContext::new()
        .with_user_id("user-1")
        .with_requested_flag("everything");
    let evaluation = registry.is_enabled("everything", &context).await.unwrap();
    assert_eq!(evaluation.reason, Reason::Published);

    // Un-publish: enforcement takes over.
    registry.toggle_feature_publication("everything").await.unwrap();
    let evaluation = registry.is_enabled("everything", &context).await.unwrap();
    assert_eq!(evaluation.reason, Reason::Enforced);
}

#[tokio::test]
async fn test_query_override_beats_user_preference() {
    let mut registry = registry().await;
    registry.add_flag(FeatureFlag::new("new-ui").queryable(true)).unwrap();

    // The user has explicitly previewed the flag off.
    registry.toggle_feature_preview("new-ui", Some("user-1")).await.unwrap();
    registry.toggle_feature_preview("new-ui", Some("user-1")).await.unwrap();

    let context = EvaluationContext::new()
        .with_user_id("user-1")
        .with_requested_flag("new-ui");
    let evaluation = registry.is_enabled("new-ui", &context).await.unwrap();
    assert!(evaluation.enabled);
    assert_eq!(evaluation.reason, Reason::QueryOverride);
}

#[tokio::test]
async fn test_query_override_for_a_different_flag_falls_through() {
    let mut registry = registry().await;
    registry.add_flag(FeatureFlag::new("new-ui").queryable(true)).unwrap();
    registry.add_flag(FeatureFlag::new("sidebar")).unwrap();

    // The context requests "new-ui"; resolving "sidebar" is unaffected.
    let context = EvaluationContext::new().with_requested_flag("new-ui");
    let evaluation = registry.is_enabled("sidebar", &context).await.unwrap();
    assert!(!evaluation.enabled);
    assert_eq!(evaluation.reason, Reason::Default);
}

// =============================================================================
// Preview and publication toggles
// =============================================================================

#[tokio::test]
async fn test_preview_survives_reload() {
    let settings = Arc::new(InMemorySettingsStore::new());
    let preferences = Arc::new(InMemoryPreferenceStore::new());

    let mut registry = FeatureRegistry::load(settings.clone(), preferences.clone())
        .await
        .unwrap();
    registry.add_flag(FeatureFlag::new("beta-search")).unwrap();
    registry.toggle_feature_preview("beta-search", Some("user-1")).await.unwrap();

    // A fresh registry over the same stores sees the preference; flags
    // are re-registered because they live only in memory.
    let mut reloaded = FeatureRegistry::load(settings, preferences).await.unwrap();
    reloaded.add_flag(FeatureFlag::new("beta-search")).unwrap();

    let context = EvaluationContext::new().with_user_id("user-1");
    assert!(reloaded.is_active("beta-search", &context).await.unwrap());
}

#[tokio::test]
async fn test_publication_survives_reload() {
    let settings = Arc::new(InMemorySettingsStore::new());
    let preferences = Arc::new(InMemoryPreferenceStore::new());

    let mut registry = FeatureRegistry::load(settings.clone(), preferences.clone())
        .await
        .unwrap();
    registry.add_flag(FeatureFlag::new("checkout").stable(true)).unwrap();
    registry.toggle_feature_publication("checkout").await.unwrap();

    let mut reloaded = FeatureRegistry::load(settings, preferences).await.unwrap();
    reloaded.add_flag(FeatureFlag::new("checkout").stable(true)).unwrap();
    assert!(reloaded.is_published("checkout").await.unwrap());
}

// =============================================================================
// Groups
// =============================================================================

#[tokio::test]
async fn test_group_round_trip() {
    let mut registry = registry().await;
    registry.create_group("Beta Users", "", "", true).await.unwrap();

    let groups = registry.get_groups().await.unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].key, "beta-users");
    assert_eq!(groups[0].name, "beta-users");
    assert_eq!(groups[0].description, None);
    assert!(groups[0].flags.is_empty());
    assert!(groups[0].private);
}

#[tokio::test]
async fn test_group_membership_edit_round_trip() {
    let mut registry = registry().await;
    registry.create_group("beta", "Beta", "Early adopters", false).await.unwrap();

    let mut groups = registry.get_groups().await.unwrap();
    assert!(groups[0].add_flag("dark-mode"));
    assert!(!groups[0].add_flag("dark-mode"));
    registry.save_groups(groups).await.unwrap();

    let groups = registry.get_groups().await.unwrap();
    assert_eq!(groups[0].flags, vec!["dark-mode"]);
    assert!(registry.find_group("beta").unwrap().has_flag("dark-mode"));
}

#[tokio::test]
async fn test_delete_missing_group_leaves_store_unchanged() {
    let mut registry = registry().await;
    registry.create_group("beta", "", "", false).await.unwrap();
    let before = registry.get_groups().await.unwrap();

    let result = registry.delete_group("nonexistent").await;
    assert!(matches!(result, Err(FeatureError::GroupNotFound(_))));
    assert_eq!(registry.get_groups().await.unwrap(), before);
}

// =============================================================================
// Store failures
// =============================================================================

/// Settings store whose writes always fail.
struct FailingSettingsStore;

#[async_trait]
impl SettingsStore for FailingSettingsStore {
    async fn get_json(&self, _key: &str) -> FeatureResult<Option<String>> {
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: String) -> FeatureResult<()> {
        Err(FeatureError::Store("write refused".to_string()))
    }
}

#[tokio::test]
async fn test_failed_group_write_leaves_registry_unchanged() {
    let mut registry = FeatureRegistry::load(
        Arc::new(FailingSettingsStore),
        Arc::new(InMemoryPreferenceStore::new()),
    )
    .await
    .unwrap();

    let result = registry.create_group("beta", "", "", false).await;
    assert!(matches!(result, Err(FeatureError::Store(_))));
    assert!(registry.find_group("beta").is_none());
}

#[tokio::test]
async fn test_failed_publication_write_propagates() {
    let mut registry = FeatureRegistry::load(
        Arc::new(FailingSettingsStore),
        Arc::new(InMemoryPreferenceStore::new()),
    )
    .await
    .unwrap();
    registry.add_flag(FeatureFlag::new("checkout").stable(true)).unwrap();

    let result = registry.toggle_feature_publication("checkout").await;
    assert!(matches!(result, Err(FeatureError::Store(_))));
}

/// Preference store whose reads always fail.
struct FailingPreferenceStore;

#[async_trait]
impl PreferenceStore for FailingPreferenceStore {
    async fn get_preferences(
        &self,
        _user_id: &str,
    ) -> FeatureResult<Option<HashMap<String, bool>>> {
        Err(FeatureError::Store("read refused".to_string()))
    }

    async fn set_preferences(
        &self,
        _user_id: &str,
        _preferences: HashMap<String, bool>,
    ) -> FeatureResult<()> {
        Err(FeatureError::Store("write refused".to_string()))
    }
}

#[tokio::test]
async fn test_preference_store_failure_propagates_from_resolution() {
    let mut registry = FeatureRegistry::load(
        Arc::new(InMemorySettingsStore::new()),
        Arc::new(FailingPreferenceStore),
    )
    .await
    .unwrap();
    registry.add_flag(FeatureFlag::new("beta-search")).unwrap();

    // Anonymous resolution never touches the preference store.
    let evaluation = registry
        .is_enabled("beta-search", &EvaluationContext::new())
        .await
        .unwrap();
    assert!(!evaluation.enabled);

    // An identified user does, and the failure surfaces.
    let context = EvaluationContext::new().with_user_id("user-1");
    let result = registry.is_enabled("beta-search", &context).await;
    assert!(matches!(result, Err(FeatureError::Store(_))));
}
