// Deck state exports
pub mod queue;
pub mod view_model;

pub use queue::CandidateQueue;
pub use view_model::CardQueueViewModel;
