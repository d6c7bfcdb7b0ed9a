// App state for Axum server
use std::sync::Arc;

use axum::http::HeaderName;
use votes_service::RatingService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RatingService>,
    /// Header carrying the authenticated caller's user id.
    pub identity_header: HeaderName,
}

impl AppState {
    pub fn new(service: Arc<RatingService>, identity_header: HeaderName) -> Self {
        Self {
            service,
            identity_header,
        }
    }
}
