//! Vehicle repository contract and SQLite implementation.
//!
//! # Invariants
//! - `create` always assigns a fresh id, overwriting any caller value.
//! - The owning client must exist (`foreign_keys=ON`).

use crate::model::veiculo::{Veiculo, VeiculoId};
use crate::repo::error::{RepoError, RepoResult, RepoStep};
use crate::repo::id_gen::{IdGenerator, UuidIdGenerator};
use crate::repo::schema_guard::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "veiculo";

const VEICULO_SELECT_SQL: &str = "SELECT
    id,
    cliente_id,
    marca,
    modelo,
    ano,
    placa
FROM veiculos";

/// Repository interface for vehicle CRUD.
pub trait VeiculoRepository {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Veiculo>>;
    /// Assigns a new id to `veiculo`, persists it and returns the id.
    fn create(&self, veiculo: &mut Veiculo) -> RepoResult<VeiculoId>;
    fn update(&self, veiculo: &Veiculo) -> RepoResult<()>;
    fn delete(&self, id: &str) -> RepoResult<()>;
    fn list_by_cliente_id(&self, cliente_id: &str) -> RepoResult<Vec<Veiculo>>;
}

/// SQLite-backed vehicle repository.
pub struct SqliteVeiculoRepository<'conn, G = UuidIdGenerator> {
    conn: &'conn Connection,
    ids: G,
}

impl<'conn> SqliteVeiculoRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_id_generator(conn, UuidIdGenerator)
    }
}

impl<'conn, G: IdGenerator> SqliteVeiculoRepository<'conn, G> {
    pub fn with_id_generator(conn: &'conn Connection, ids: G) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["veiculos"])?;
        Ok(Self { conn, ids })
    }
}

impl<G: IdGenerator> VeiculoRepository for SqliteVeiculoRepository<'_, G> {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Veiculo>> {
        self.conn
            .query_row(
                &format!("{VEICULO_SELECT_SQL} WHERE id = ?1;"),
                [id],
                map_veiculo_row,
            )
            .optional()
            .map_err(RepoError::storage(ENTITY, RepoStep::HeaderRead, Some(id)))
    }

    fn create(&self, veiculo: &mut Veiculo) -> RepoResult<VeiculoId> {
        veiculo.id = self.ids.next_id();

        self.conn
            .execute(
                "INSERT INTO veiculos (id, cliente_id, marca, modelo, ano, placa)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
                params![
                    veiculo.id,
                    veiculo.cliente_id,
                    veiculo.marca,
                    veiculo.modelo,
                    veiculo.ano,
                    veiculo.placa,
                ],
            )
            .map_err(RepoError::storage(
                ENTITY,
                RepoStep::HeaderWrite,
                Some(veiculo.id.as_str()),
            ))?;

        Ok(veiculo.id.clone())
    }

    fn update(&self, veiculo: &Veiculo) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE veiculos
                 SET
                    cliente_id = ?1,
                    marca = ?2,
                    modelo = ?3,
                    ano = ?4,
                    placa = ?5
                 WHERE id = ?6;",
                params![
                    veiculo.cliente_id,
                    veiculo.marca,
                    veiculo.modelo,
                    veiculo.ano,
                    veiculo.placa,
                    veiculo.id,
                ],
            )
            .map_err(RepoError::storage(
                ENTITY,
                RepoStep::HeaderWrite,
                Some(veiculo.id.as_str()),
            ))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: veiculo.id.clone(),
            });
        }

        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM veiculos WHERE id = ?1;", [id])
            .map_err(RepoError::storage(ENTITY, RepoStep::HeaderWrite, Some(id)))?;
        Ok(())
    }

    fn list_by_cliente_id(&self, cliente_id: &str) -> RepoResult<Vec<Veiculo>> {
        let read_err = || RepoError::storage(ENTITY, RepoStep::HeaderRead, None);
        let mut stmt = self
            .conn
            .prepare(&format!("{VEICULO_SELECT_SQL} WHERE cliente_id = ?1;"))
            .map_err(read_err())?;
        let rows = stmt
            .query_map([cliente_id], map_veiculo_row)
            .map_err(read_err())?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(read_err())
    }
}

fn map_veiculo_row(row: &Row<'_>) -> rusqlite::Result<Veiculo> {
    Ok(Veiculo {
        id: row.get("id")?,
        cliente_id: row.get("cliente_id")?,
        marca: row.get("marca")?,
        modelo: row.get("modelo")?,
        ano: row.get("ano")?,
        placa: row.get("placa")?,
    })
}
