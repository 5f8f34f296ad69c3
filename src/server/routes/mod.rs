//! HTTP route modules

pub mod analyze;
pub mod health;

use actix_web::web;

/// Register every route on the application.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health::health_check))
        .route("/analyze", web::post().to(analyze::analyze));
}
