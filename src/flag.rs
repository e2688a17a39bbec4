//! Feature flag value object.

use serde::{Deserialize, Serialize};

/// A named boolean feature gate with the static attributes that control
/// how it may be activated.
///
/// Flags are pure data: whether one is currently active is decided by
/// the registry, which combines these attributes with the publication
/// set, the calling context, and the user's preferences. Publication
/// state is derived at runtime and is deliberately not a field here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlag {
    /// Flag key, the sole lookup identifier
    pub key: String,

    /// Human-readable label
    pub title: String,

    /// Flag description
    pub description: Option<String>,

    /// Unconditionally active regardless of publication or overrides
    pub enforced: bool,

    /// May be force-activated through a query override
    pub queryable: bool,

    /// Visibility attribute; not consulted during resolution
    pub private: bool,

    /// Eligible for publication
    pub stable: bool,
}

impl FeatureFlag {
    /// Create a new flag.
    ///
    /// The title defaults to the key until
    /// [`with_title`](Self::with_title) overrides it; every other
    /// attribute starts off.
    ///
    /// # Examples
    ///
    /// ```
    /// use featuregate::FeatureFlag;
    ///
    /// let flag = FeatureFlag::new("new-ui").with_title("New UI").queryable(true);
    /// ```
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            title: key.clone(),
            key,
            description: None,
            enforced: false,
            queryable: false,
            private: false,
            stable: false,
        }
    }

    /// Set the human-readable title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark the flag as unconditionally active.
    pub fn enforced(mut self, enforced: bool) -> Self {
        self.enforced = enforced;
        self
    }

    /// Allow activation through a query override.
    pub fn queryable(mut self, queryable: bool) -> Self {
        self.queryable = queryable;
        self
    }

    /// Mark the flag as private.
    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    /// Mark the flag as stable enough to publish.
    pub fn stable(mut self, stable: bool) -> Self {
        self.stable = stable;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_defaults_to_key() {
        let flag = FeatureFlag::new("dark-mode");
        assert_eq!(flag.title, "dark-mode");
        assert_eq!(flag.key, "dark-mode");
    }

    #[test]
    fn test_builder_attributes() {
        let flag = FeatureFlag::new("dark-mode")
            .with_title("Dark Mode")
            .with_description("Site-wide dark theme")
            .enforced(true)
            .queryable(true)
            .stable(true);

        assert_eq!(flag.title, "Dark Mode");
        assert_eq!(flag.description.as_deref(), Some("Site-wide dark theme"));
        assert!(flag.enforced);
        assert!(flag.queryable);
        assert!(!flag.private);
        assert!(flag.stable);
    }
}
