use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier for an authenticated user.
///
/// This is the key under which the remote per-user progress document is
/// stored. The value is issued by the authentication provider and carries
/// no structure this crate relies on.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    /// Creates a new `UserId`
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the underlying identifier string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_display_and_debug() {
        let id = UserId::new("uid-42");
        assert_eq!(id.to_string(), "uid-42");
        assert_eq!(format!("{id:?}"), "UserId(uid-42)");
    }

    #[test]
    fn user_id_equality() {
        assert_eq!(UserId::from("a"), UserId::new("a"));
        assert_ne!(UserId::from("a"), UserId::new("b"));
    }
}
