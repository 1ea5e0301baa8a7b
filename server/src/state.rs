use std::sync::Arc;

use crate::middleware::auth::TokenSigner;
use crate::store::ScheduleStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScheduleStore>,
    pub tokens: TokenSigner,
}

impl AppState {
    pub fn new(store: Arc<dyn ScheduleStore>, tokens: TokenSigner) -> Self {
        Self { store, tokens }
    }
}
