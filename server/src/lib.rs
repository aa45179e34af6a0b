// server/src/lib.rs

//! HTTP shell around the `spareparts` lifecycle engine.

pub mod config;
pub mod errors;
pub mod services;
pub mod state;
pub mod web;
