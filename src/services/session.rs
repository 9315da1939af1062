use crate::services::storage::{SessionStore, StorageError};
use std::sync::Arc;

/// Destinations the screen can ask its host to show
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
}

/// Navigation surface provided by whatever hosts the screen
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Ends the session: wipes persisted state, then sends the host to login
#[derive(Clone)]
pub struct SessionGate {
    store: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl SessionGate {
    pub fn new(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    /// Clear everything in the store and navigate to [`Route::Login`]
    ///
    /// Navigation only happens once the store is confirmed empty.
    pub async fn logout(&self) -> Result<(), StorageError> {
        self.store.clear().await?;
        tracing::info!("Session state cleared, navigating to login");
        self.navigator.navigate(Route::Login);
        Ok(())
    }
}
