// Model exports
pub mod domain;
pub mod view;

pub use domain::{AvatarSource, Decision, MatchNotification, Profile, SessionId};
pub use view::{CardView, ScreenPhase, ViewState};
