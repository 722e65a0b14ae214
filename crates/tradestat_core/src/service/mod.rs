//! Caller-facing use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into the API consumed by outer layers.
//! - Keep callers decoupled from SQL details.

pub mod trade_service;
