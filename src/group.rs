//! Feature flag groups.

use serde::{Deserialize, Serialize};

/// A named, ordered collection of flag keys.
///
/// Groups are organizational only: membership has no effect on
/// resolution. Members are held by key, not by embedded flag objects,
/// so a group stays valid when a member flag is no longer registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagGroup {
    /// Group key, slugified from the caller-supplied value
    pub key: String,

    /// Human-readable label, falls back to the key
    pub name: String,

    /// Group description
    pub description: Option<String>,

    /// Member flag keys, in insertion order, each at most once
    pub flags: Vec<String>,

    /// Visibility attribute; not consulted during resolution
    pub private: bool,
}

impl FlagGroup {
    /// Create a new group.
    ///
    /// The key is slugified; an empty name falls back to the slug and
    /// an empty description is treated as none.
    pub fn new(key: &str, name: &str, description: &str, private: bool) -> Self {
        let key = slugify(key);
        let name = if name.is_empty() {
            key.clone()
        } else {
            name.to_string()
        };
        Self {
            key,
            name,
            description: if description.is_empty() {
                None
            } else {
                Some(description.to_string())
            },
            flags: Vec::new(),
            private,
        }
    }

    /// Append a flag key unless it is already a member.
    ///
    /// Returns whether the key was added.
    pub fn add_flag(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if self.flags.contains(&key) {
            return false;
        }
        self.flags.push(key);
        true
    }

    /// Check whether a flag key is a member.
    pub fn has_flag(&self, key: &str) -> bool {
        self.flags.iter().any(|k| k == key)
    }

    /// Remove a flag key.
    ///
    /// Returns whether a removal occurred.
    pub fn remove_flag(&mut self, key: &str) -> bool {
        match self.flags.iter().position(|k| k == key) {
            Some(index) => {
                self.flags.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Derive a group key from a caller-supplied name.
///
/// ASCII alphanumerics are lowercased; every other run of characters
/// collapses to a single hyphen, with no leading or trailing hyphen.
///
/// # Examples
///
/// ```
/// use featuregate::slugify;
///
/// assert_eq!(slugify("Beta Users"), "beta-users");
/// ```
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    for ch in input.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    if slug.ends_with('-') {
        slug.pop();
    }
    slug
}
