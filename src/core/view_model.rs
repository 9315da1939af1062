use crate::core::queue::CandidateQueue;
use crate::models::{CardView, Decision, MatchNotification, Profile, ScreenPhase, SessionId, ViewState};
use crate::services::{ApiError, ProfileApi};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// State owner for the candidate deck and the match overlay
///
/// All mutation goes through `&mut self`, so whoever owns the view-model is
/// the single writer. Decisions are optimistic: the top card is removed
/// immediately and the remote call runs detached. A failed submission is
/// logged and never puts the card back.
pub struct CardQueueViewModel {
    api: Arc<dyn ProfileApi>,
    session: SessionId,
    queue: CandidateQueue,
    active_match: Option<MatchNotification>,
    phase: ScreenPhase,
    load_error: Option<String>,
    realtime_connected: bool,
}

impl CardQueueViewModel {
    pub fn new(api: Arc<dyn ProfileApi>, session: SessionId) -> Self {
        Self {
            api,
            session,
            queue: CandidateQueue::new(),
            active_match: None,
            phase: ScreenPhase::Loading,
            load_error: None,
            realtime_connected: false,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Fetch candidates and replace the deck
    pub async fn initialize(&mut self) {
        let result = self.fetch_candidates().await;
        self.apply_candidates(result);
    }

    /// Candidate fetch that does not borrow the view-model, so the owner can
    /// poll it alongside other work and drop it to cancel
    pub fn fetch_candidates(&self) -> impl Future<Output = Result<Vec<Profile>, ApiError>> + Send + 'static {
        let api = Arc::clone(&self.api);
        let session = self.session.clone();
        async move { api.fetch_candidates(&session).await }
    }

    /// Apply the outcome of the initial fetch
    ///
    /// Success overwrites the deck. Failure leaves it empty and records the
    /// error for the view; there is no retry.
    pub fn apply_candidates(&mut self, result: Result<Vec<Profile>, ApiError>) {
        if self.phase == ScreenPhase::LoggedOut {
            return;
        }

        match result {
            Ok(profiles) => {
                let dropped = self.queue.replace(profiles);
                if dropped > 0 {
                    tracing::warn!("Dropped {} duplicate candidates", dropped);
                }
                self.load_error = None;
                tracing::info!("Loaded {} candidates for session {}", self.queue.len(), self.session);
            }
            Err(e) => {
                tracing::warn!("Failed to load candidates for session {}: {}", self.session, e);
                self.queue.replace(Vec::new());
                self.load_error = Some(e.to_string());
            }
        }

        self.phase = ScreenPhase::Active;
    }

    /// Consume the top card
    ///
    /// No-op on an empty deck. Otherwise the top card is removed right away
    /// and the submission is spawned on the current tokio runtime; the
    /// returned handle resolves once the request settles. Outside a runtime
    /// the card is still consumed and the submission is skipped.
    pub fn decide(&mut self, decision: Decision) -> Option<JoinHandle<()>> {
        if self.phase == ScreenPhase::LoggedOut {
            return None;
        }

        let candidate = self.queue.pop_front()?;

        tracing::debug!(
            "{:?} on {} ({} left)",
            decision,
            candidate.id,
            self.queue.len()
        );

        let runtime = match Handle::try_current() {
            Ok(runtime) => runtime,
            Err(e) => {
                tracing::warn!(
                    "Skipping {:?} submission for {}: {}",
                    decision,
                    candidate.id,
                    e
                );
                return None;
            }
        };

        let api = Arc::clone(&self.api);
        let session = self.session.clone();

        Some(runtime.spawn(async move {
            if let Err(e) = api.submit_decision(&session, &candidate.id, decision).await {
                tracing::warn!("Failed to submit {:?} for {}: {}", decision, candidate.id, e);
            }
        }))
    }

    /// Show a match, replacing any match already on screen
    pub fn set_active_match(&mut self, profile: Profile) {
        if let Some(previous) = &self.active_match {
            tracing::debug!("Match {} replaced by {}", previous.profile.id, profile.id);
        }
        tracing::info!("It's a match: {}", profile.id);
        self.active_match = Some(MatchNotification::new(profile));
    }

    pub fn dismiss_match(&mut self) {
        self.active_match = None;
    }

    pub fn set_realtime_connected(&mut self, connected: bool) {
        self.realtime_connected = connected;
    }

    pub fn mark_logged_out(&mut self) {
        self.phase = ScreenPhase::LoggedOut;
    }

    pub fn phase(&self) -> ScreenPhase {
        self.phase
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn queue(&self) -> &CandidateQueue {
        &self.queue
    }

    pub fn visible_stack(&self) -> Vec<CardView> {
        self.queue.visible_stack()
    }

    pub fn active_match(&self) -> Option<&MatchNotification> {
        self.active_match.as_ref()
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Snapshot for rendering
    pub fn view_state(&self) -> ViewState {
        ViewState {
            phase: self.phase,
            cards: self.visible_stack(),
            is_empty: self.is_empty(),
            active_match: self.active_match.clone(),
            load_error: self.load_error.clone(),
            realtime_connected: self.realtime_connected,
        }
    }
}
