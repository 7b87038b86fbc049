//! Data models shared across the client core.
//!
//! These mirror the wire shapes of the backend's REST API (camelCase field
//! names), plus the locally held view state the engagement handlers consult.

pub mod comic;
pub mod user;

pub use comic::{ChapterSummary, ComicSummary};
pub use user::{LoginPayload, Role, UserIdentity};
