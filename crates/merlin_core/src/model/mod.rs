//! Workshop domain model.
//!
//! # Responsibility
//! - Define the records persisted for clients, vehicles and invoices.
//!
//! # Invariants
//! - Every entity is identified by a repository-assigned string id.
//! - Relations are expressed by id references, never by in-memory ownership.
//! - Invoice line items have no identity outside their invoice.

pub mod cliente;
pub mod nota;
pub mod veiculo;
