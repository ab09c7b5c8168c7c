use std::sync::Arc;

use crate::services::verifier::BatchVerifier;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<BatchVerifier>,
    pub provider_enabled: bool,
}

impl AppState {
    pub fn new(verifier: BatchVerifier, provider_enabled: bool) -> Self {
        Self {
            verifier: Arc::new(verifier),
            provider_enabled,
        }
    }
}
