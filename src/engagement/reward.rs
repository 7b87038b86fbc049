//! Reading-reward state machine.
//!
//! Each chapter view owns one [`ReadingSession`]. The machine moves
//! strictly forward - Loading, Reading, Eligible, Claimed - and the claim
//! fires at most once per view instance. The network outcome of the grant
//! never rewinds the machine: the backend's grant endpoint is idempotent,
//! so a lost response costs at worst one reward, never a double grant.
//!
//! The view drives the machine either by calling [`ReadingSession::poll`]
//! from its own scheduler or by awaiting [`EngagementTimer::tick`] in a
//! select loop. Teardown is the caller's side: stop ticking (view unmount,
//! chapter change) and drop the timer.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use crate::engagement::EngagementOps;
use crate::models::UserIdentity;

/// Continuous reading time required before the reward unlocks.
const REWARD_THRESHOLD_SECS: i64 = 60;

/// Cadence of the eligibility check.
const TICK_INTERVAL_SECS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RewardState {
    /// Chapter content still loading; the clock has not started.
    Loading,
    /// Content loaded, reading time accumulating.
    Reading,
    /// Threshold reached, claim pending an authenticated actor.
    Eligible,
    /// Claim attempted. Terminal for this view instance.
    Claimed,
}

/// Per-chapter-view reward tracking. Ephemeral; never persisted.
#[derive(Debug)]
pub struct ReadingSession {
    state: RewardState,
    started_at: Option<DateTime<Utc>>,
}

impl Default for ReadingSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadingSession {
    pub fn new() -> Self {
        Self {
            state: RewardState::Loading,
            started_at: None,
        }
    }

    pub fn state(&self) -> RewardState {
        self.state
    }

    /// Whether the reward threshold has been reached (including after the
    /// claim fired).
    pub fn reward_eligible(&self) -> bool {
        self.state >= RewardState::Eligible
    }

    pub fn reward_claimed(&self) -> bool {
        self.state == RewardState::Claimed
    }

    /// The chapter's content finished loading; start the clock.
    /// Fires the Loading -> Reading transition exactly once.
    pub fn content_loaded(&mut self, now: DateTime<Utc>) {
        if self.state == RewardState::Loading {
            self.state = RewardState::Reading;
            self.started_at = Some(now);
        }
    }

    /// One eligibility check. Flips Reading -> Eligible on the first call
    /// at or past the threshold; otherwise leaves the state alone.
    pub fn advance(&mut self, now: DateTime<Utc>) -> RewardState {
        if self.state == RewardState::Reading {
            if let Some(started_at) = self.started_at {
                if now - started_at >= Duration::seconds(REWARD_THRESHOLD_SECS) {
                    debug!("Reading reward threshold reached");
                    self.state = RewardState::Eligible;
                }
            }
        }
        self.state
    }

    /// Consume the claim opportunity if Eligible and the actor qualifies.
    /// Marks Claimed before the caller issues the grant, so the attempt
    /// happens at most once whatever the network does.
    fn take_claim(&mut self, actor_present: bool) -> bool {
        if self.state == RewardState::Eligible && actor_present {
            self.state = RewardState::Claimed;
            return true;
        }
        false
    }

    /// One full evaluation: advance the clock check, then claim the
    /// reward if this is the first opportunity with an authenticated
    /// actor. The claim is gated reactively - an actor who logs in after
    /// eligibility still claims on the next poll.
    ///
    /// Grant failures are logged and not retried within this view.
    pub async fn poll<A: EngagementOps>(
        &mut self,
        now: DateTime<Utc>,
        api: &A,
        actor: Option<&UserIdentity>,
    ) -> RewardState {
        self.advance(now);
        if self.take_claim(actor.is_some()) {
            match api.grant_reading_reward().await {
                Ok(envelope) => {
                    if let Err(e) = envelope.into_result() {
                        warn!(error = %e, "Reading reward grant rejected");
                    } else {
                        debug!("Reading reward granted");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Reading reward grant failed");
                }
            }
        }
        self.state
    }
}

/// Async driver: owns the 1-second tick and a [`ReadingSession`].
///
/// Intended use is a `select!` arm in the view's task; dropping the timer
/// cancels the tick. The caller should stop ticking once
/// [`EngagementTimer::is_done`] returns true.
pub struct EngagementTimer {
    session: ReadingSession,
    interval: tokio::time::Interval,
}

impl EngagementTimer {
    pub fn new() -> Self {
        let mut interval =
            tokio::time::interval(std::time::Duration::from_secs(TICK_INTERVAL_SECS));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        Self {
            session: ReadingSession::new(),
            interval,
        }
    }

    pub fn session(&self) -> &ReadingSession {
        &self.session
    }

    /// Start the clock once the chapter content has rendered.
    pub fn content_loaded(&mut self) {
        self.session.content_loaded(Utc::now());
    }

    /// Await the next tick, then evaluate the machine.
    pub async fn tick<A: EngagementOps>(
        &mut self,
        api: &A,
        actor: Option<&UserIdentity>,
    ) -> RewardState {
        self.interval.tick().await;
        self.session.poll(Utc::now(), api, actor).await
    }

    pub fn is_done(&self) -> bool {
        self.session.reward_claimed()
    }
}

impl Default for EngagementTimer {
    fn default() -> Self {
        Self::new()
    }
}
