//! Authentication module for managing the client session.
//!
//! This module provides:
//! - `CredentialStore`: the persisted access token / refresh token /
//!   identity triple over pluggable storage backends
//! - `SessionContext`: tab-lifetime session state with synchronous
//!   `login`/`logout` transitions
//! - `SessionGuard`: re-validation of the stored token on focus and on
//!   authentication changes
//! - token validity checks for JWT access tokens

pub mod credentials;
pub mod guard;
pub mod session;
pub mod token;

pub use credentials::{CredentialRecord, CredentialStore, Storage};
pub use guard::{GuardState, SessionGuard};
pub use session::SessionContext;
pub use token::{is_token_expiring_soon, is_valid_token};
