//! rackwatch-api — REST API for Rackwatch.
//!
//! Serves the manual sweep trigger and the inventory interface the
//! dashboard UI consumes. The store and prober are injected as trait
//! objects so the whole router is testable against the in-memory store.
//!
//! # API Routes
//!
//! | Method | Path | Description |
//! |---|---|---|
//! | POST | `/api/v1/sweep` | Run one health sweep (POST only, 405 otherwise) |
//! | GET | `/api/v1/servers` | List all inventory records |
//! | POST | `/api/v1/servers` | Create a record |
//! | PATCH | `/api/v1/servers` | Bulk partial update (`{ids, fields}`) |
//! | GET | `/api/v1/servers/export` | CSV export |
//! | PATCH | `/api/v1/servers/{id}` | Partial update of one record |
//! | DELETE | `/api/v1/servers/{id}` | Delete record(s) (comma-separated ids) |
//! | PATCH | `/api/v1/servers/{id}/autosave` | Debounced per-field autosave |

pub mod autosave;
pub mod export;
pub mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, patch, post};
use axum::Router;

use rackwatch_store::InventoryStore;
use rackwatch_sweep::Prober;

use crate::autosave::Debouncer;

/// Quiet period before a coalesced autosave write.
pub const AUTOSAVE_QUIET_PERIOD: Duration = Duration::from_millis(500);

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn InventoryStore>,
    pub prober: Arc<dyn Prober>,
    pub autosave: Arc<Debouncer>,
}

/// Build the complete API router.
///
/// Also returns the autosave debouncer so the caller can drain pending
/// edits on shutdown via [`Debouncer::flush_all`].
pub fn build_router(
    store: Arc<dyn InventoryStore>,
    prober: Arc<dyn Prober>,
) -> (Router, Arc<Debouncer>) {
    let autosave = Debouncer::new(store.clone(), AUTOSAVE_QUIET_PERIOD);
    let state = ApiState {
        autosave: autosave.clone(),
        store,
        prober,
    };

    let api_routes = Router::new()
        .route("/sweep", post(handlers::trigger_sweep))
        .route(
            "/servers",
            get(handlers::list_servers)
                .post(handlers::create_server)
                .patch(handlers::bulk_update_servers),
        )
        .route("/servers/export", get(handlers::export_servers))
        .route(
            "/servers/{id}",
            patch(handlers::update_server).delete(handlers::delete_servers),
        )
        .route("/servers/{id}/autosave", patch(handlers::autosave_server))
        .with_state(state);

    (Router::new().nest("/api/v1", api_routes), autosave)
}
