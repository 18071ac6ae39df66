//! In-memory repository implementations.
//!
//! Same observable contract as the SQLite repositories (generated ids,
//! `None` on lookup miss, `NotFound` on update of a missing row, idempotent
//! delete, wholesale child replacement, rejection of unstorable dates). Used
//! to exercise services without a database.
//!
//! Clones share storage, so one clone can be handed to a service while the
//! test keeps another for inspection. Wrap a stateful generator in `Arc` to
//! keep ids unique across clones.

use crate::model::cliente::{Cliente, ClienteId};
use crate::model::nota::{Nota, NotaId};
use crate::model::veiculo::{Veiculo, VeiculoId};
use crate::repo::cliente_repo::ClienteRepository;
use crate::repo::error::{RepoError, RepoResult};
use crate::repo::id_gen::{IdGenerator, UuidIdGenerator};
use crate::repo::nota_repo::{encode_nota_date, NotaRepository};
use crate::repo::veiculo_repo::VeiculoRepository;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Keyed table guarded by a lock, shared between clones.
#[derive(Debug)]
struct Table<T> {
    entity: &'static str,
    rows: Arc<RwLock<BTreeMap<String, T>>>,
}

impl<T> Clone for Table<T> {
    fn clone(&self) -> Self {
        Self {
            entity: self.entity,
            rows: Arc::clone(&self.rows),
        }
    }
}

impl<T: Clone> Table<T> {
    fn new(entity: &'static str) -> Self {
        Self {
            entity,
            rows: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    fn read(&self) -> RepoResult<RwLockReadGuard<'_, BTreeMap<String, T>>> {
        self.rows
            .read()
            .map_err(|_| RepoError::LockPoisoned(self.entity))
    }

    fn write(&self) -> RepoResult<RwLockWriteGuard<'_, BTreeMap<String, T>>> {
        self.rows
            .write()
            .map_err(|_| RepoError::LockPoisoned(self.entity))
    }

    fn get(&self, id: &str) -> RepoResult<Option<T>> {
        Ok(self.read()?.get(id).cloned())
    }

    fn insert(&self, id: &str, value: T) -> RepoResult<()> {
        self.write()?.insert(id.to_string(), value);
        Ok(())
    }

    fn replace(&self, id: &str, value: T) -> RepoResult<()> {
        let mut rows = self.write()?;
        match rows.get_mut(id) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(RepoError::NotFound {
                entity: self.entity,
                id: id.to_string(),
            }),
        }
    }

    fn remove(&self, id: &str) -> RepoResult<()> {
        self.write()?.remove(id);
        Ok(())
    }

    fn values(&self) -> RepoResult<Vec<T>> {
        Ok(self.read()?.values().cloned().collect())
    }
}

/// In-memory client repository.
#[derive(Debug, Clone)]
pub struct InMemoryClienteRepository<G = UuidIdGenerator> {
    table: Table<Cliente>,
    ids: G,
}

impl InMemoryClienteRepository {
    pub fn new() -> Self {
        Self::with_id_generator(UuidIdGenerator)
    }
}

impl Default for InMemoryClienteRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> InMemoryClienteRepository<G> {
    pub fn with_id_generator(ids: G) -> Self {
        Self {
            table: Table::new("cliente"),
            ids,
        }
    }
}

impl<G: IdGenerator> ClienteRepository for InMemoryClienteRepository<G> {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Cliente>> {
        self.table.get(id)
    }

    fn create(&self, cliente: &mut Cliente) -> RepoResult<ClienteId> {
        cliente.id = self.ids.next_id();
        self.table.insert(&cliente.id, cliente.clone())?;
        Ok(cliente.id.clone())
    }

    fn update(&self, cliente: &Cliente) -> RepoResult<()> {
        self.table.replace(&cliente.id, cliente.clone())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.table.remove(id)
    }

    fn list(&self) -> RepoResult<Vec<Cliente>> {
        self.table.values()
    }
}

/// In-memory vehicle repository.
#[derive(Debug, Clone)]
pub struct InMemoryVeiculoRepository<G = UuidIdGenerator> {
    table: Table<Veiculo>,
    ids: G,
}

impl InMemoryVeiculoRepository {
    pub fn new() -> Self {
        Self::with_id_generator(UuidIdGenerator)
    }
}

impl Default for InMemoryVeiculoRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> InMemoryVeiculoRepository<G> {
    pub fn with_id_generator(ids: G) -> Self {
        Self {
            table: Table::new("veiculo"),
            ids,
        }
    }
}

impl<G: IdGenerator> VeiculoRepository for InMemoryVeiculoRepository<G> {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Veiculo>> {
        self.table.get(id)
    }

    fn create(&self, veiculo: &mut Veiculo) -> RepoResult<VeiculoId> {
        veiculo.id = self.ids.next_id();
        self.table.insert(&veiculo.id, veiculo.clone())?;
        Ok(veiculo.id.clone())
    }

    fn update(&self, veiculo: &Veiculo) -> RepoResult<()> {
        self.table.replace(&veiculo.id, veiculo.clone())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.table.remove(id)
    }

    fn list_by_cliente_id(&self, cliente_id: &str) -> RepoResult<Vec<Veiculo>> {
        Ok(self
            .table
            .values()?
            .into_iter()
            .filter(|veiculo| veiculo.cliente_id == cliente_id)
            .collect())
    }
}

/// In-memory invoice repository. The whole aggregate is stored as one value,
/// so child replacement is atomic by construction.
#[derive(Debug, Clone)]
pub struct InMemoryNotaRepository<G = UuidIdGenerator> {
    table: Table<Nota>,
    ids: G,
}

impl InMemoryNotaRepository {
    pub fn new() -> Self {
        Self::with_id_generator(UuidIdGenerator)
    }
}

impl Default for InMemoryNotaRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl<G: IdGenerator> InMemoryNotaRepository<G> {
    pub fn with_id_generator(ids: G) -> Self {
        Self {
            table: Table::new("nota"),
            ids,
        }
    }
}

impl<G: IdGenerator> NotaRepository for InMemoryNotaRepository<G> {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Nota>> {
        self.table.get(id)
    }

    fn create(&self, nota: &mut Nota) -> RepoResult<NotaId> {
        nota.id = self.ids.next_id();
        encode_nota_date(nota)?;
        self.table.insert(&nota.id, nota.clone())?;
        Ok(nota.id.clone())
    }

    fn update(&self, nota: &Nota) -> RepoResult<()> {
        encode_nota_date(nota)?;
        self.table.replace(&nota.id, nota.clone())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.table.remove(id)
    }

    fn list(&self) -> RepoResult<Vec<Nota>> {
        self.table.values()
    }
}

#[cfg(test)]
mod tests {
    use super::InMemoryNotaRepository;
    use crate::model::nota::{Nota, Parte, Servico};
    use crate::repo::error::RepoError;
    use crate::repo::id_gen::SequentialIdGenerator;
    use crate::repo::nota_repo::NotaRepository;
    use chrono::{DateTime, FixedOffset, TimeZone};
    use std::sync::Arc;

    fn sample_nota() -> Nota {
        let data = DateTime::parse_from_rfc3339("2024-03-01T10:00:00-03:00").unwrap();
        Nota::new("cliente-1", "veiculo-1", data, 150.0)
            .with_servico(Servico::new("Oil change", 50.0))
            .with_parte(Parte::new("Filter", 20.0, 1))
    }

    #[test]
    fn clones_share_storage() {
        let ids = Arc::new(SequentialIdGenerator::new("n"));
        let repo = InMemoryNotaRepository::with_id_generator(ids);
        let observer = repo.clone();

        let mut nota = sample_nota();
        let id = repo.create(&mut nota).unwrap();

        assert_eq!(id, "n-1");
        assert_eq!(observer.get_by_id(&id).unwrap(), Some(nota));
    }

    #[test]
    fn update_of_missing_nota_is_not_found() {
        let repo = InMemoryNotaRepository::new();
        let mut nota = sample_nota();
        nota.id = "missing".to_string();

        let err = repo.update(&nota).unwrap_err();
        assert!(matches!(err, RepoError::NotFound { entity: "nota", ref id } if id == "missing"));
    }

    #[test]
    fn five_digit_year_is_rejected_like_sqlite() {
        let repo = InMemoryNotaRepository::new();
        let mut nota = sample_nota();
        nota.data = FixedOffset::west_opt(3 * 3600)
            .unwrap()
            .with_ymd_and_hms(10000, 1, 1, 8, 0, 0)
            .unwrap();

        let err = repo.create(&mut nota).unwrap_err();
        assert!(matches!(err, RepoError::Encoding { field: "notas.data", .. }));
        assert!(repo.list().unwrap().is_empty());
    }
}
