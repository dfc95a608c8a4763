use crate::{SharedData, api, logging, routing_utils};
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

/// Assembles every route the service exposes, along with API documentation, panic recovery,
/// and per-request tracing
pub fn build_router(shared_data: Arc<SharedData>) -> Router {
    let router = Router::new()
        .nest("/todos", api::todo::todo_routes())
        .nest("/healthz", api::healthz::healthz_routes())
        .with_state(shared_data)
        .merge(api::swagger_main::build_documentation())
        .layer(CatchPanicLayer::custom(routing_utils::panic_response));

    logging::attach_tracing_http(router)
}
