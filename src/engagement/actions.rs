//! Duplicate suppression for user-triggered backend actions.
//!
//! A double click or repeated key event must not issue the same purchase
//! or follow request twice. Each view keeps an [`InFlightActions`] set of
//! action keys; a key is held only from just before the request goes out
//! until just after it resolves, and re-entry while held is a silent
//! no-op. There is no cross-view or cross-tab sharing - concurrent tabs
//! are covered by backend idempotency, not by this layer.
//!
//! Domain pre-checks run before the set is touched: unauthenticated
//! actors are rejected without a network call, as are purchases of
//! chapters the actor already owns.

use std::collections::HashSet;
use std::hash::Hash;

use tracing::debug;

use crate::api::ApiError;
use crate::auth::SessionContext;
use crate::engagement::EngagementOps;
use crate::models::{ChapterSummary, ComicSummary};

/// Set of action keys currently being submitted.
#[derive(Debug, Default)]
pub struct InFlightActions<K: Eq + Hash> {
    keys: HashSet<K>,
}

impl<K: Eq + Hash> InFlightActions<K> {
    pub fn new() -> Self {
        Self {
            keys: HashSet::new(),
        }
    }

    /// Insert-if-absent. Returns true when the caller may proceed; false
    /// means an identical request is already outstanding.
    pub fn begin_if_idle(&mut self, key: K) -> bool {
        self.keys.insert(key)
    }

    /// Release a key. Must run on success and failure paths alike.
    pub fn end(&mut self, key: &K) {
        self.keys.remove(key);
    }

    pub fn is_in_flight(&self, key: &K) -> bool {
        self.keys.contains(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseOutcome {
    Purchased,
    /// Rejected before the network: actor not logged in.
    AuthRequired,
    /// Rejected before the network: chapter already owned locally.
    AlreadyOwned,
    /// An identical purchase is still outstanding; suppressed silently.
    AlreadyPending,
    /// Backend or network failure; carries user-facing text.
    Failed(String),
}

/// Purchase handler for one comic detail view.
/// Mirrors chapter ownership locally so repeated buys short-circuit.
pub struct ChapterPurchases {
    in_flight: InFlightActions<String>,
    owned: HashSet<String>,
}

impl ChapterPurchases {
    /// Seed ownership from the chapter list the view was rendered with.
    /// Free chapters never need buying and count as owned up front.
    pub fn new(chapters: &[ChapterSummary]) -> Self {
        let owned = chapters
            .iter()
            .filter(|c| c.has_purchased || c.is_free())
            .map(|c| c.id.clone())
            .collect();
        Self {
            in_flight: InFlightActions::new(),
            owned,
        }
    }

    pub fn is_owned(&self, chapter_id: &str) -> bool {
        self.owned.contains(chapter_id)
    }

    pub fn is_purchasing(&self, chapter_id: &str) -> bool {
        self.in_flight.is_in_flight(&chapter_id.to_string())
    }

    /// Attempt to buy a chapter. Pre-checks reject without touching the
    /// network; the in-flight key is released on every path.
    pub async fn purchase<A: EngagementOps>(
        &mut self,
        api: &A,
        session: &SessionContext,
        chapter_id: &str,
    ) -> PurchaseOutcome {
        if !session.is_authenticated() {
            return PurchaseOutcome::AuthRequired;
        }
        if self.owned.contains(chapter_id) {
            return PurchaseOutcome::AlreadyOwned;
        }
        if !self.in_flight.begin_if_idle(chapter_id.to_string()) {
            debug!(chapter_id, "Purchase already in flight, ignoring");
            return PurchaseOutcome::AlreadyPending;
        }

        let result = api.purchase_chapter(chapter_id).await;
        self.in_flight.end(&chapter_id.to_string());

        match result.and_then(|envelope| envelope.into_result()) {
            Ok(_) => {
                self.owned.insert(chapter_id.to_string());
                PurchaseOutcome::Purchased
            }
            Err(e) => PurchaseOutcome::Failed(e.user_message()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowOutcome {
    Followed,
    Unfollowed,
    /// Rejected before the network: actor not logged in.
    AuthRequired,
    /// An identical toggle is still outstanding; suppressed silently.
    AlreadyPending,
    /// Backend or network failure; carries user-facing text.
    Failed(String),
}

/// Follow state for one comic detail view.
///
/// Keeps a locally mirrored follower count, adjusted optimistically on
/// success so the view never refetches the whole comic. On failure both
/// the flag and the count keep their pre-call values.
pub struct FollowState {
    comic_id: String,
    is_following: bool,
    followers_count: u64,
    in_flight: InFlightActions<String>,
}

impl FollowState {
    pub fn new(comic: &ComicSummary) -> Self {
        Self {
            comic_id: comic.id.clone(),
            is_following: false,
            followers_count: comic.followers_count,
            in_flight: InFlightActions::new(),
        }
    }

    pub fn is_following(&self) -> bool {
        self.is_following
    }

    pub fn followers_count(&self) -> u64 {
        self.followers_count
    }

    /// Seed `is_following` from the backend. Only meaningful for an
    /// authenticated actor; otherwise leaves the default (not following).
    pub async fn refresh<A: EngagementOps>(
        &mut self,
        api: &A,
        session: &SessionContext,
    ) -> Result<(), ApiError> {
        if !session.is_authenticated() {
            return Ok(());
        }
        let envelope = api.check_followed(&self.comic_id).await?;
        self.is_following = envelope.into_result()?.unwrap_or(false);
        Ok(())
    }

    /// Follow when not following, unfollow when following. Auth is
    /// checked first; duplicates are suppressed; the counter only moves
    /// when the backend confirmed the flip.
    pub async fn toggle<A: EngagementOps>(
        &mut self,
        api: &A,
        session: &SessionContext,
    ) -> FollowOutcome {
        if !session.is_authenticated() {
            return FollowOutcome::AuthRequired;
        }
        if !self.in_flight.begin_if_idle(self.comic_id.clone()) {
            debug!(comic_id = %self.comic_id, "Follow toggle already in flight, ignoring");
            return FollowOutcome::AlreadyPending;
        }

        let unfollowing = self.is_following;
        let result = if unfollowing {
            api.unfollow_comic(&self.comic_id).await
        } else {
            api.follow_comic(&self.comic_id).await
        };
        let key = self.comic_id.clone();
        self.in_flight.end(&key);

        match result.and_then(|envelope| envelope.into_result()) {
            Ok(_) if unfollowing => {
                self.is_following = false;
                self.followers_count = self.followers_count.saturating_sub(1);
                FollowOutcome::Unfollowed
            }
            Ok(_) => {
                self.is_following = true;
                self.followers_count += 1;
                FollowOutcome::Followed
            }
            Err(e) => FollowOutcome::Failed(e.user_message()),
        }
    }
}
