use std::sync::Arc;

use crate::use_cases::SessionRegistry;

#[derive(Clone)]
pub struct AppState {
    // Every live session, keyed by session id.
    pub registry: Arc<SessionRegistry>,
}
