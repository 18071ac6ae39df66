//! Persistence core for the merlin workshop manager.
//!
//! Clients, vehicles and service invoices ("notas") stored in SQLite. The
//! invoice is an aggregate of a header plus service and part line items and
//! is always written, replaced and deleted as one unit.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, logging_status, LogInitError, LogTarget};
pub use model::cliente::{Cliente, ClienteId};
pub use model::nota::{Nota, NotaId, Parte, Servico, UnstorableDate};
pub use model::veiculo::{Veiculo, VeiculoId};
pub use repo::cliente_repo::{ClienteRepository, SqliteClienteRepository};
pub use repo::error::{ChildTable, RepoError, RepoResult, RepoStep};
pub use repo::id_gen::{IdGenerator, SequentialIdGenerator, UuidIdGenerator};
pub use repo::memory::{
    InMemoryClienteRepository, InMemoryNotaRepository, InMemoryVeiculoRepository,
};
pub use repo::nota_repo::{NotaRepository, SqliteNotaRepository};
pub use repo::veiculo_repo::{SqliteVeiculoRepository, VeiculoRepository};
pub use service::workshop_service::WorkshopService;

/// Minimal health-check API.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
