use payables_core::UserId;

/// Authenticated session for a request.
///
/// Inserted by the session middleware; present on every protected route.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user_id: UserId,
}

impl SessionContext {
    pub fn new(user_id: UserId) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }
}
