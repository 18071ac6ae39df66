//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define one capability set per entity (`get/create/update/delete/list`).
//! - Isolate SQLite query details from the service facade.
//!
//! # Invariants
//! - Lookups signal absence with `Ok(None)`, never with an error.
//! - Repositories receive the storage handle by reference; none of them owns
//!   or opens a connection.

pub mod cliente_repo;
pub mod error;
pub mod id_gen;
pub mod memory;
pub mod nota_repo;
mod schema_guard;
pub mod veiculo_repo;
