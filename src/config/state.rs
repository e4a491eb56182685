// Application state module
// Everything a connection task needs, shared read-only behind an Arc

use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use super::types::Config;
use crate::router::Router;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Frozen route table, no registration past this point
    pub router: Arc<Router>,
    pub active_connections: AtomicUsize,
}

impl AppState {
    pub fn new(config: Config, router: Router) -> Self {
        Self {
            config,
            router: Arc::new(router),
            active_connections: AtomicUsize::new(0),
        }
    }
}
