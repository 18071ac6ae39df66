//! Core use-case services.
//!
//! # Responsibility
//! - Compose entity repositories behind one interface.
//! - Keep callers decoupled from storage details.

pub mod workshop_service;
