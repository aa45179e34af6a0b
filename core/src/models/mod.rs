// core/src/models/mod.rs

//! Data structures persisted in, or exchanged with, the record store.

pub mod request;
pub mod status;

pub use request::{NewRequest, RequestUpdate, SparePartRequest};
pub use status::{normalize_status_label, PaymentStatus, RequestStatus};
