use crate::SharedData;
use axum::Router;
use axum::routing::get;
use serde::Serialize;
use std::sync::Arc;
use utoipa::{OpenApi, ToSchema};

use crate::routing_utils::Json;

#[derive(OpenApi)]
#[openapi(paths(healthz), components(schemas(HealthzResponse)))]
pub struct HealthzApi;

/// Body returned by the health check
#[derive(Serialize, ToSchema)]
#[cfg_attr(test, derive(serde::Deserialize, Debug))]
pub struct HealthzResponse {
    #[schema(example = "OK")]
    pub message: String,
}

pub fn healthz_routes() -> Router<Arc<SharedData>> {
    Router::new().route("/", get(healthz))
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "Health",
    responses(
        (status = 200, description = "The service is up", body = HealthzResponse),
    ),
)]
#[tracing::instrument]
async fn healthz() -> Json<HealthzResponse> {
    Json(HealthzResponse {
        message: "OK".to_owned(),
    })
}
