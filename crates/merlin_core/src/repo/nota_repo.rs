//! Invoice aggregate repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist the `Nota` aggregate across `notas`, `servicos` and `partes`.
//! - Hydrate headers with both child collections on every read path.
//!
//! # Invariants
//! - Child rows are only written through this repository.
//! - `create`, `update` and `delete` each run in one `BEGIN IMMEDIATE`
//!   transaction. A failing statement rolls back the whole call, so readers
//!   never see a header without its children or a half-replaced child set.
//! - `update` replaces children wholesale (delete then insert); the stored
//!   set always equals the last written set.
//! - A stored `data` value that is not RFC 3339 is a read error, and writes
//!   refuse dates that cannot be spelled as RFC 3339 before touching storage.

use crate::model::nota::{format_nota_date, parse_nota_date, Nota, NotaId, Parte, Servico};
use crate::repo::error::{ChildTable, RepoError, RepoResult, RepoStep};
use crate::repo::id_gen::{IdGenerator, UuidIdGenerator};
use crate::repo::schema_guard::ensure_connection_ready;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const ENTITY: &str = "nota";

const NOTA_SELECT_SQL: &str = "SELECT
    id,
    cliente_id,
    veiculo_id,
    data,
    custo_total
FROM notas";

/// Repository interface for the invoice aggregate.
pub trait NotaRepository {
    /// Returns the hydrated invoice, or `None` when no header row matches.
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Nota>>;
    /// Assigns a new id to `nota`, persists header and children, returns the id.
    fn create(&self, nota: &mut Nota) -> RepoResult<NotaId>;
    /// Overwrites the header and replaces both child collections.
    fn update(&self, nota: &Nota) -> RepoResult<()>;
    /// Removes children then header. Missing ids are not an error.
    fn delete(&self, id: &str) -> RepoResult<()>;
    /// Returns every invoice, hydrated. Order follows the storage engine.
    fn list(&self) -> RepoResult<Vec<Nota>>;
}

/// SQLite-backed invoice repository.
pub struct SqliteNotaRepository<'conn, G = UuidIdGenerator> {
    conn: &'conn Connection,
    ids: G,
}

impl<'conn> SqliteNotaRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Self::with_id_generator(conn, UuidIdGenerator)
    }
}

impl<'conn, G: IdGenerator> SqliteNotaRepository<'conn, G> {
    /// Constructs a repository that draws new invoice ids from `ids`.
    pub fn with_id_generator(conn: &'conn Connection, ids: G) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["notas", "servicos", "partes"])?;
        Ok(Self { conn, ids })
    }

    fn write_in_transaction(
        &self,
        operation: &'static str,
        id: &str,
        body: impl FnOnce(&Transaction<'_>) -> RepoResult<()>,
    ) -> RepoResult<()> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::storage(ENTITY, RepoStep::Transaction, Some(id)))?;

        if let Err(err) = body(&tx) {
            // Dropping `tx` rolls back every statement issued so far.
            warn!(
                "event=nota_{} module=repo status=rolled_back nota_id={} step={}",
                operation,
                id,
                err.step()
                    .map_or_else(|| "unknown".to_string(), |step| step.to_string())
            );
            return Err(err);
        }

        tx.commit()
            .map_err(RepoError::storage(ENTITY, RepoStep::Transaction, Some(id)))
    }
}

impl<G: IdGenerator> NotaRepository for SqliteNotaRepository<'_, G> {
    fn get_by_id(&self, id: &str) -> RepoResult<Option<Nota>> {
        let header = self
            .conn
            .query_row(
                &format!("{NOTA_SELECT_SQL} WHERE id = ?1;"),
                [id],
                NotaHeaderRow::from_row,
            )
            .optional()
            .map_err(RepoError::storage(ENTITY, RepoStep::HeaderRead, Some(id)))?;

        match header {
            Some(header) => Ok(Some(hydrate(self.conn, header)?)),
            None => Ok(None),
        }
    }

    fn create(&self, nota: &mut Nota) -> RepoResult<NotaId> {
        nota.id = self.ids.next_id();
        let nota: &Nota = nota;
        let data = encode_nota_date(nota)?;

        self.write_in_transaction("create", &nota.id, |tx| {
            tx.execute(
                "INSERT INTO notas (id, cliente_id, veiculo_id, data, custo_total)
                 VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    nota.id,
                    nota.cliente_id,
                    nota.veiculo_id,
                    data,
                    nota.custo_total,
                ],
            )
            .map_err(RepoError::storage(
                ENTITY,
                RepoStep::HeaderWrite,
                Some(nota.id.as_str()),
            ))?;

            insert_servicos(tx, &nota.id, &nota.servicos)?;
            insert_partes(tx, &nota.id, &nota.partes)
        })?;

        Ok(nota.id.clone())
    }

    fn update(&self, nota: &Nota) -> RepoResult<()> {
        let data = encode_nota_date(nota)?;
        self.write_in_transaction("update", &nota.id, |tx| {
            let changed = tx
                .execute(
                    "UPDATE notas
                     SET
                        cliente_id = ?1,
                        veiculo_id = ?2,
                        data = ?3,
                        custo_total = ?4
                     WHERE id = ?5;",
                    params![
                        nota.cliente_id,
                        nota.veiculo_id,
                        data,
                        nota.custo_total,
                        nota.id,
                    ],
                )
                .map_err(RepoError::storage(
                    ENTITY,
                    RepoStep::HeaderWrite,
                    Some(nota.id.as_str()),
                ))?;

            if changed == 0 {
                return Err(RepoError::NotFound {
                    entity: ENTITY,
                    id: nota.id.clone(),
                });
            }

            delete_children(tx, &nota.id, ChildTable::Servicos)?;
            insert_servicos(tx, &nota.id, &nota.servicos)?;
            delete_children(tx, &nota.id, ChildTable::Partes)?;
            insert_partes(tx, &nota.id, &nota.partes)
        })
    }

    fn delete(&self, id: &str) -> RepoResult<()> {
        self.write_in_transaction("delete", id, |tx| {
            delete_children(tx, id, ChildTable::Servicos)?;
            delete_children(tx, id, ChildTable::Partes)?;
            tx.execute("DELETE FROM notas WHERE id = ?1;", [id])
                .map_err(RepoError::storage(ENTITY, RepoStep::HeaderWrite, Some(id)))?;
            Ok(())
        })
    }

    fn list(&self) -> RepoResult<Vec<Nota>> {
        let read_err = || RepoError::storage(ENTITY, RepoStep::HeaderRead, None);
        let headers = {
            let mut stmt = self
                .conn
                .prepare(&format!("{NOTA_SELECT_SQL};"))
                .map_err(read_err())?;
            let rows = stmt
                .query_map([], NotaHeaderRow::from_row)
                .map_err(read_err())?;
            rows.collect::<rusqlite::Result<Vec<_>>>()
                .map_err(read_err())?
        };

        headers
            .into_iter()
            .map(|header| hydrate(self.conn, header))
            .collect()
    }
}

/// Header columns as stored, before the date is decoded.
struct NotaHeaderRow {
    id: String,
    cliente_id: String,
    veiculo_id: String,
    data: String,
    custo_total: f64,
}

impl NotaHeaderRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            cliente_id: row.get("cliente_id")?,
            veiculo_id: row.get("veiculo_id")?,
            data: row.get("data")?,
            custo_total: row.get("custo_total")?,
        })
    }
}

/// Renders `nota.data` for the `notas.data` column, refusing dates that
/// could not be read back.
pub(crate) fn encode_nota_date(nota: &Nota) -> RepoResult<String> {
    format_nota_date(&nota.data).map_err(|source| RepoError::Encoding {
        entity: ENTITY,
        id: nota.id.clone(),
        field: "notas.data",
        value: nota.data.to_string(),
        source,
    })
}

fn hydrate(conn: &Connection, header: NotaHeaderRow) -> RepoResult<Nota> {
    let data = parse_nota_date(&header.data).map_err(|source| RepoError::Decoding {
        entity: ENTITY,
        id: header.id.clone(),
        field: "notas.data",
        value: header.data.clone(),
        source,
    })?;

    let servicos = load_servicos(conn, &header.id)?;
    let partes = load_partes(conn, &header.id)?;

    Ok(Nota {
        id: header.id,
        cliente_id: header.cliente_id,
        veiculo_id: header.veiculo_id,
        data,
        custo_total: header.custo_total,
        servicos,
        partes,
    })
}

fn load_servicos(conn: &Connection, nota_id: &str) -> RepoResult<Vec<Servico>> {
    let read_err = || {
        RepoError::storage(
            ENTITY,
            RepoStep::ChildRead(ChildTable::Servicos),
            Some(nota_id),
        )
    };
    let mut stmt = conn
        .prepare("SELECT descricao, custo FROM servicos WHERE nota_id = ?1 ORDER BY rowid;")
        .map_err(read_err())?;
    let rows = stmt
        .query_map([nota_id], |row| {
            Ok(Servico {
                descricao: row.get("descricao")?,
                custo: row.get("custo")?,
            })
        })
        .map_err(read_err())?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(read_err())
}

fn load_partes(conn: &Connection, nota_id: &str) -> RepoResult<Vec<Parte>> {
    let read_err = || {
        RepoError::storage(
            ENTITY,
            RepoStep::ChildRead(ChildTable::Partes),
            Some(nota_id),
        )
    };
    let mut stmt = conn
        .prepare(
            "SELECT nome, custo, quantidade FROM partes WHERE nota_id = ?1 ORDER BY rowid;",
        )
        .map_err(read_err())?;
    let rows = stmt
        .query_map([nota_id], |row| {
            Ok(Parte {
                nome: row.get("nome")?,
                custo: row.get("custo")?,
                quantidade: row.get("quantidade")?,
            })
        })
        .map_err(read_err())?;

    rows.collect::<rusqlite::Result<Vec<_>>>()
        .map_err(read_err())
}

fn insert_servicos(conn: &Connection, nota_id: &str, servicos: &[Servico]) -> RepoResult<()> {
    let write_err = || {
        RepoError::storage(
            ENTITY,
            RepoStep::ChildWrite(ChildTable::Servicos),
            Some(nota_id),
        )
    };
    let mut stmt = conn
        .prepare_cached("INSERT INTO servicos (nota_id, descricao, custo) VALUES (?1, ?2, ?3);")
        .map_err(write_err())?;
    for servico in servicos {
        stmt.execute(params![nota_id, servico.descricao, servico.custo])
            .map_err(write_err())?;
    }
    Ok(())
}

fn insert_partes(conn: &Connection, nota_id: &str, partes: &[Parte]) -> RepoResult<()> {
    let write_err = || {
        RepoError::storage(
            ENTITY,
            RepoStep::ChildWrite(ChildTable::Partes),
            Some(nota_id),
        )
    };
    let mut stmt = conn
        .prepare_cached(
            "INSERT INTO partes (nota_id, nome, custo, quantidade) VALUES (?1, ?2, ?3, ?4);",
        )
        .map_err(write_err())?;
    for parte in partes {
        stmt.execute(params![nota_id, parte.nome, parte.custo, parte.quantidade])
            .map_err(write_err())?;
    }
    Ok(())
}

fn delete_children(conn: &Connection, nota_id: &str, table: ChildTable) -> RepoResult<()> {
    let sql = match table {
        ChildTable::Servicos => "DELETE FROM servicos WHERE nota_id = ?1;",
        ChildTable::Partes => "DELETE FROM partes WHERE nota_id = ?1;",
    };
    conn.execute(sql, [nota_id])
        .map_err(RepoError::storage(
            ENTITY,
            RepoStep::ChildWrite(table),
            Some(nota_id),
        ))?;
    Ok(())
}
