//! Health check endpoint

use actix_web::HttpResponse;

/// Liveness probe.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}
