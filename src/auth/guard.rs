//! Session guard: invalidates a stale session at defined trigger points.
//!
//! Tokens can expire silently while a tab is backgrounded. Instead of
//! polling, the guard re-validates the stored access token whenever the
//! session becomes authenticated and whenever the tab regains focus,
//! bounding the staleness window to "time since last focus".
//!
//! The guard raises no user-visible error itself; a forced `logout()` is
//! the whole reaction, and the UI consequences of that belong to the
//! embedding layer. Registration and deregistration of the focus listener
//! are likewise the embedder's concern - it calls [`SessionGuard::on_focus`]
//! from its listener and drops the guard with the owning view.

use tracing::warn;

use crate::auth::session::SessionContext;
use crate::auth::token::is_valid_token;

/// Watching while the session is authenticated, Idle otherwise.
/// Checks only run while Watching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Idle,
    Watching,
}

pub struct SessionGuard {
    state: GuardState,
}

impl Default for SessionGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Idle,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Align the guard with the session's authentication flag. Entering
    /// Watching runs an immediate token check. Returns true when the
    /// check forced a logout.
    pub fn sync_state(&mut self, session: &mut SessionContext) -> bool {
        self.evaluate(session)
    }

    /// Tab-regained-focus trigger. A no-op unless Watching.
    /// Returns true when the check forced a logout.
    pub fn on_focus(&mut self, session: &mut SessionContext) -> bool {
        self.evaluate(session)
    }

    fn evaluate(&mut self, session: &mut SessionContext) -> bool {
        if !session.is_authenticated() {
            self.state = GuardState::Idle;
            return false;
        }
        self.state = GuardState::Watching;

        let token = session.access_token();
        if is_valid_token(token.as_deref()) {
            return false;
        }

        warn!("Stored access token is invalid, forcing logout");
        session.logout();
        self.state = GuardState::Idle;
        true
    }
}
