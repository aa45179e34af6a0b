// server/src/web/routes.rs

use actix_web::{error, web, HttpRequest, HttpResponse};
use serde_json::json;

use super::envelope::{self, Envelope};
use super::handlers::{auth_handlers, dashboard_handlers, notification_handlers, payment_handlers, request_handlers};
use crate::errors::AppError;

async fn health_check_handler() -> HttpResponse {
  envelope::ok(json!({ "status": "ok", "timestamp": chrono::Utc::now() }))
}

/// Envelope for any path no route matches.
pub async fn not_found_handler(req: HttpRequest) -> HttpResponse {
  HttpResponse::NotFound().json(Envelope::<()>::failure(
    "Not found",
    Some(format!("no route for {} {}", req.method(), req.path())),
  ))
}

fn json_error_handler(err: error::JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(err.to_string()).into()
}

fn query_error_handler(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(err.to_string()).into()
}

fn path_error_handler(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
  AppError::Validation(err.to_string()).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(json_error_handler))
    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
    .app_data(web::PathConfig::default().error_handler(path_error_handler))
    .service(
      web::scope("/api")
        .route("/health", web::get().to(health_check_handler))
        .service(web::scope("/auth").route("/login", web::post().to(auth_handlers::login_handler)))
        .service(
          web::scope("/requests")
            .route("", web::get().to(request_handlers::list_requests_handler))
            .route("", web::post().to(request_handlers::create_request_handler))
            .route("/{request_id}", web::get().to(request_handlers::get_request_handler))
            .route("/{request_id}", web::patch().to(request_handlers::update_request_handler))
            .route(
              "/{request_id}/payment-link",
              web::post().to(request_handlers::payment_link_handler),
            )
            .route("/{request_id}/dispatch", web::post().to(request_handlers::dispatch_handler)),
        )
        .service(
          web::scope("/payments")
            .route("/breakdown", web::post().to(payment_handlers::breakdown_handler))
            .route("/session", web::post().to(payment_handlers::create_session_handler)),
        )
        .route(
          "/notifications/send",
          web::post().to(notification_handlers::send_notification_handler),
        )
        .route("/dashboard", web::get().to(dashboard_handlers::dashboard_handler)),
    );
}
