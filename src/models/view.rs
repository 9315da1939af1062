use serde::{Deserialize, Serialize};
use crate::models::domain::{AvatarSource, MatchNotification, Profile};

/// Screen lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenPhase {
    /// Initial fetch has not resolved yet
    Loading,
    /// Queue populated, or legitimately empty after exhaustion or a failed load
    Active,
    /// Session cleared, host navigated away
    LoggedOut,
}

/// A card in the rendered stack
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardView {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub avatar: AvatarSource,
    /// Higher paints above lower; the top of the queue has the highest value
    pub z_index: usize,
}

impl CardView {
    pub fn from_profile(profile: &Profile, z_index: usize) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            avatar: profile.avatar_source(),
            z_index,
        }
    }
}

/// Immutable snapshot of everything the view needs to draw one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub phase: ScreenPhase,
    /// Cards in queue order, front first
    pub cards: Vec<CardView>,
    pub is_empty: bool,
    pub active_match: Option<MatchNotification>,
    pub load_error: Option<String>,
    pub realtime_connected: bool,
}

impl ViewState {
    pub fn loading() -> Self {
        Self {
            phase: ScreenPhase::Loading,
            cards: Vec::new(),
            is_empty: true,
            active_match: None,
            load_error: None,
            realtime_connected: false,
        }
    }

    /// Like/dislike buttons are only offered when there is a card to decide on
    pub fn shows_decision_buttons(&self) -> bool {
        !self.is_empty
    }
}
