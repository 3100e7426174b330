// ABOUTME: Session state markers for the type state pattern.
// ABOUTME: Only an authenticated client can send commands.

use crate::types::SessionToken;

/// No session yet.
/// Available actions: `authenticate()`, `attach_token()`, `login()`
#[derive(Debug, Clone, Copy, Default)]
pub struct Unauthenticated;

/// Holds a session token.
/// Available actions: `execute()`, `execute_request()`
#[derive(Debug, Clone)]
pub struct Authenticated {
    token: SessionToken,
}

impl Authenticated {
    pub(crate) fn new(token: SessionToken) -> Self {
        Self { token }
    }

    pub fn token(&self) -> &SessionToken {
        &self.token
    }
}
