// server/src/web/handlers/mod.rs

pub mod auth_handlers;
pub mod dashboard_handlers;
pub mod notification_handlers;
pub mod payment_handlers;
pub mod request_handlers;
