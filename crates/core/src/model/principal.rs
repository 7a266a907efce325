use super::ids::UserId;

/// The authenticated identity under which remote reads and writes are scoped.
///
/// Services take an explicit `Option<Principal>` instead of consulting a
/// global "current user", so unauthenticated flows are just `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    id: UserId,
    email: String,
}

impl Principal {
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>) -> Self {
        Self {
            id,
            email: email.into(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Email written alongside remote progress updates as metadata.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }
}
