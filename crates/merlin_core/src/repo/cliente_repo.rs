//! Client repository contract and SQLite implementation.
//!
//! # Invariants
//! - `create` always assigns a fresh id, overwriting any caller value.
//! - `delete` of a missing id is a no-op.

use crate::model::cliente::{Cliente, ClienteId};
use crate::repo::error::{RepoError, RepoResult, RepoStep};
use crate::repo::id_gen::{IdGenerator, UuidIdGenerator};
use crate::repo::schema_guard::ensure_connection_ready;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ENTITY: &str = "cliente";

const CLIENTE_SELECT_SQL: &str = "SELECT id, nome, telefone, email FROM clientes";

/// Repository interface for client CRUD.
pub trait ClienteRepository {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Cliente>>;
    /// Assigns a new id to `cliente`, persists it and returns the id.
    fn create(&self, cliente: &mut Cliente) -> RepoResult<ClienteId>;
    fn update(&self, cliente: &Cliente) -> RepoResult<()>;
    fn delete(&self, id: &str) -> RepoResult<()>;
    fn list(&self) -> RepoResult<Vec<Cliente>>;
}

/// SQLite-backed client repository.
pub struct SqliteClienteRepository<'conn, G = UuidIdGenerator> {
    conn: &'conn Connection,
    ids: G,
}

impl<'conn> SqliteClienteRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_id_generator(conn, UuidIdGenerator)
    }
}

impl<'conn, G: IdGenerator> SqliteClienteRepository<'conn, G> {
    pub fn with_id_generator(conn: &'conn Connection, ids: G) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["clientes"])?;
        Ok(Self { conn, ids })
    }
}

impl<G: IdGenerator> ClienteRepository for SqliteClienteRepository<'_, G> {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Cliente>> {
        self.conn
            .query_row(
                &format!("{CLIENTE_SELECT_SQL} WHERE id = ?1;"),
                [id],
                map_cliente_row,
            )
            .optional()
            .map_err(RepoError::storage(ENTITY, RepoStep::HeaderRead, Some(id)))
    }

    fn create(&self, cliente: &mut Cliente) -> RepoResult<ClienteId> {
        cliente.id = self.ids.next_id();

        self.conn
            .execute(
                "INSERT INTO clientes (id, nome, telefone, email) VALUES (?1, ?2, ?3, ?4);",
                params![cliente.id, cliente.nome, cliente.telefone, cliente.email],
            )
            .map_err(RepoError::storage(
                ENTITY,
                RepoStep::HeaderWrite,
                Some(cliente.id.as_str()),
            ))?;

        Ok(cliente.id.clone())
    }

    fn update(&self, cliente: &Cliente) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(
                "UPDATE clientes SET nome = ?1, telefone = ?2, email = ?3 WHERE id = ?4;",
                params![cliente.nome, cliente.telefone, cliente.email, cliente.id],
            )
            .map_err(RepoError::storage(
                ENTITY,
                RepoStep::HeaderWrite,
                Some(cliente.id.as_str()),
            ))?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: ENTITY,
                id: cliente.id.clone(),
            });
        }

        Ok(())
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.conn
            .execute("DELETE FROM clientes WHERE id = ?1;", [id])
            .map_err(RepoError::storage(ENTITY, RepoStep::HeaderWrite, Some(id)))?;
        Ok(())
    }

    fn list(&self) -> RepoResult<Vec<Cliente>> {
        let read_err = || RepoError::storage(ENTITY, RepoStep::HeaderRead, None);
        let mut stmt = self
            .conn
            .prepare(&format!("{CLIENTE_SELECT_SQL};"))
            .map_err(read_err())?;
        let rows = stmt.query_map([], map_cliente_row).map_err(read_err())?;

        rows.collect::<rusqlite::Result<Vec<_>>>()
            .map_err(read_err())
    }
}

fn map_cliente_row(row: &Row<'_>) -> rusqlite::Result<Cliente> {
    Ok(Cliente {
        id: row.get("id")?,
        nome: row.get("nome")?,
        telefone: row.get("telefone")?,
        email: row.get("email")?,
    })
}
