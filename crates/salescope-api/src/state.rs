//! Shared application state.

use std::sync::Arc;

use salescope_engine::SalesEngine;

/// State handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SalesEngine>,
}

impl AppState {
    pub fn new(engine: Arc<SalesEngine>) -> Self {
        Self { engine }
    }
}
