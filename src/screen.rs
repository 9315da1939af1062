//! The main screen as a single owner task
//!
//! The view-model lives inside one spawned task. The candidate fetch, the
//! realtime subscription and user intents are all polled from the same
//! `select!` loop, so every mutation happens on that task. Each change is
//! published as a [`ViewState`] snapshot on a watch channel.
//!
//! Dropping or unmounting the handle stops the task, which drops the
//! in-flight fetch and the subscription with it.

use crate::core::CardQueueViewModel;
use crate::models::{Decision, ScreenPhase, ViewState};
use crate::services::{ChannelEvent, MatchSource, SessionGate};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

const INTENT_BUFFER: usize = 32;

/// Something the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Decide(Decision),
    DismissMatch,
    Logout,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScreenError {
    #[error("screen is no longer running")]
    Closed,
}

/// Host-side handle to a running screen
pub struct ScreenHandle {
    intents: mpsc::Sender<Intent>,
    view: watch::Receiver<ViewState>,
    task: JoinHandle<()>,
}

impl ScreenHandle {
    pub async fn send(&self, intent: Intent) -> Result<(), ScreenError> {
        self.intents.send(intent).await.map_err(|_| ScreenError::Closed)
    }

    pub async fn like(&self) -> Result<(), ScreenError> {
        self.send(Intent::Decide(Decision::Like)).await
    }

    pub async fn dislike(&self) -> Result<(), ScreenError> {
        self.send(Intent::Decide(Decision::Dislike)).await
    }

    pub async fn dismiss_match(&self) -> Result<(), ScreenError> {
        self.send(Intent::DismissMatch).await
    }

    pub async fn logout(&self) -> Result<(), ScreenError> {
        self.send(Intent::Logout).await
    }

    /// Latest published snapshot
    pub fn view(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Independent receiver for render loops
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view.clone()
    }

    /// Wait until a snapshot satisfies `predicate`
    pub async fn wait_for<F>(&mut self, predicate: F) -> Result<ViewState, ScreenError>
    where
        F: FnMut(&ViewState) -> bool,
    {
        self.view
            .wait_for(predicate)
            .await
            .map(|state| ViewState::clone(&state))
            .map_err(|_| ScreenError::Closed)
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Tear the screen down, cancelling the fetch and closing the channel
    pub async fn unmount(self) {
        self.task.abort();
        let _ = self.task.await;
    }
}

/// Spawn the screen for the session the view-model was built with
///
/// The realtime channel is opened immediately, concurrently with the
/// candidate fetch.
pub fn mount(
    view_model: CardQueueViewModel,
    matches: Arc<dyn MatchSource>,
    gate: SessionGate,
) -> ScreenHandle {
    let (intent_tx, intent_rx) = mpsc::channel(INTENT_BUFFER);
    let (view_tx, view_rx) = watch::channel(view_model.view_state());

    let task = tokio::spawn(run(view_model, matches, gate, intent_rx, view_tx));

    ScreenHandle {
        intents: intent_tx,
        view: view_rx,
        task,
    }
}

async fn run(
    mut vm: CardQueueViewModel,
    matches: Arc<dyn MatchSource>,
    gate: SessionGate,
    mut intents: mpsc::Receiver<Intent>,
    view: watch::Sender<ViewState>,
) {
    tracing::info!("Mounting main screen for session {}", vm.session());

    let mut subscription = matches.open(vm.session());
    let mut realtime_open = true;

    let fetch = vm.fetch_candidates();
    tokio::pin!(fetch);
    let mut fetching = true;

    loop {
        tokio::select! {
            result = &mut fetch, if fetching => {
                fetching = false;
                vm.apply_candidates(result);
            }
            event = subscription.recv(), if realtime_open => match event {
                Some(ChannelEvent::Connected) => vm.set_realtime_connected(true),
                Some(ChannelEvent::Match(profile)) => vm.set_active_match(profile),
                Some(ChannelEvent::Disconnected(e)) => {
                    tracing::warn!("Match notifications stopped: {}", e);
                    vm.set_realtime_connected(false);
                    realtime_open = false;
                }
                None => {
                    vm.set_realtime_connected(false);
                    realtime_open = false;
                }
            },
            intent = intents.recv() => match intent {
                Some(Intent::Decide(decision)) => {
                    // Detached; the deck has already advanced
                    let _ = vm.decide(decision);
                }
                Some(Intent::DismissMatch) => vm.dismiss_match(),
                Some(Intent::Logout) => match gate.logout().await {
                    Ok(()) => vm.mark_logged_out(),
                    Err(e) => tracing::error!("Logout failed, staying on screen: {}", e),
                },
                None => {
                    tracing::debug!("Screen handle dropped");
                    break;
                }
            },
        }

        view.send_replace(vm.view_state());

        if vm.phase() == ScreenPhase::LoggedOut {
            break;
        }
    }

    subscription.close();
    tracing::info!("Main screen unmounted");
}
