//! User-engagement state machines.
//!
//! Per-view, ephemeral state driven by the UI: the reading-reward timer
//! (`reward`) and the duplicate-suppression layer for purchase and follow
//! actions (`actions`). Both consume the session context to decide whether
//! the actor is eligible, and reach the backend through [`EngagementOps`].

pub mod actions;
pub mod reward;

use crate::api::{ApiClient, ApiError, Envelope};

pub use actions::{ChapterPurchases, FollowOutcome, FollowState, InFlightActions, PurchaseOutcome};
pub use reward::{EngagementTimer, ReadingSession, RewardState};

/// The backend operations the engagement handlers depend on.
///
/// `ApiClient` is the production implementation; tests substitute
/// recording doubles to assert which calls were (not) made.
#[allow(async_fn_in_trait)]
pub trait EngagementOps {
    async fn grant_reading_reward(&self) -> Result<Envelope<()>, ApiError>;
    async fn purchase_chapter(&self, chapter_id: &str) -> Result<Envelope<()>, ApiError>;
    async fn follow_comic(&self, comic_id: &str) -> Result<Envelope<()>, ApiError>;
    async fn unfollow_comic(&self, comic_id: &str) -> Result<Envelope<()>, ApiError>;
    async fn check_followed(&self, comic_id: &str) -> Result<Envelope<bool>, ApiError>;
}

impl EngagementOps for ApiClient {
    async fn grant_reading_reward(&self) -> Result<Envelope<()>, ApiError> {
        ApiClient::grant_reading_reward(self).await
    }

    async fn purchase_chapter(&self, chapter_id: &str) -> Result<Envelope<()>, ApiError> {
        ApiClient::purchase_chapter(self, chapter_id).await
    }

    async fn follow_comic(&self, comic_id: &str) -> Result<Envelope<()>, ApiError> {
        ApiClient::follow_comic(self, comic_id).await
    }

    async fn unfollow_comic(&self, comic_id: &str) -> Result<Envelope<()>, ApiError> {
        ApiClient::unfollow_comic(self, comic_id).await
    }

    async fn check_followed(&self, comic_id: &str) -> Result<Envelope<bool>, ApiError> {
        ApiClient::check_followed(self, comic_id).await
    }
}
