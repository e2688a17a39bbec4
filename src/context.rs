//! Evaluation context.

/// Per-call context for flag resolution.
///
/// Carries the identity of the current user, if any, and the flag key
/// the calling request asked to force on (the query override
/// candidate). Contexts are supplied per resolution call and are never
/// stored.
#[derive(Debug, Clone, Default)]
pub struct EvaluationContext {
    user_id: Option<String>,
    requested_flag: Option<String>,
}

impl EvaluationContext {
    /// Create an empty context (anonymous caller, no override).
    pub fn new() -> Self {
        Self::default()
    }

    /// Identify the current user.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Supply the externally-requested flag key.
    pub fn with_requested_flag(mut self, key: impl Into<String>) -> Self {
        self.requested_flag = Some(key.into());
        self
    }

    /// The identified user, if any.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The requested flag key, if any.
    pub fn requested_flag(&self) -> Option<&str> {
        self.requested_flag.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context() {
        let context = EvaluationContext::new();
        assert_eq!(context.user_id(), None);
        assert_eq!(context.requested_flag(), None);
    }

    #[test]
    fn test_builder() {
        let context = EvaluationContext::new()
            .with_user_id("user-123")
            .with_requested_flag("new-ui");
        assert_eq!(context.user_id(), Some("user-123"));
        assert_eq!(context.requested_flag(), Some("new-ui"));
    }
}
