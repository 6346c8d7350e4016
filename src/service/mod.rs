//! Domain services sitting between the HTTP handlers and the stores.

pub mod account_service;
pub mod file_service;
pub mod health_service;
