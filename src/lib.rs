//! Tindev client - candidate deck and match notifications for the Tindev app
//!
//! This library holds everything behind the main screen: the HTTP client for
//! candidates and decisions, the realtime match channel, the deck
//! view-model, logout, and a text renderer for the resulting view state.

pub mod config;
pub mod core;
pub mod models;
pub mod screen;
pub mod services;
pub mod view;

// Re-export commonly used types
pub use core::{CandidateQueue, CardQueueViewModel};
pub use models::{Decision, MatchNotification, Profile, SessionId, ViewState};
pub use screen::{mount, Intent, ScreenHandle};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let queue = CandidateQueue::new();
        assert!(queue.is_empty());
        assert_eq!(Decision::Like.path_segment(), "likes");
    }
}
