// Service exports
pub mod api;
pub mod realtime;
pub mod session;
pub mod storage;

pub use api::{ApiError, ProfileApi, ProfileClient};
pub use realtime::{ChannelEvent, MatchSource, RealtimeChannel, RealtimeError, Subscription};
pub use session::{Navigator, Route, SessionGate};
pub use storage::{SessionStore, StorageError};
