//! Workshop facade over client, vehicle and invoice repositories.
//!
//! # Responsibility
//! - Expose one operation set per entity kind.
//! - Emit one structured log event per mutating call.
//!
//! # Invariants
//! - Every call is forwarded to exactly one repository; the facade adds no
//!   business rules and never swallows a repository error.
//! - Log events carry ids and counts only, never client contact data.

use crate::model::cliente::{Cliente, ClienteId};
use crate::model::nota::{Nota, NotaId};
use crate::model::veiculo::{Veiculo, VeiculoId};
use crate::repo::cliente_repo::ClienteRepository;
use crate::repo::error::RepoResult;
use crate::repo::nota_repo::NotaRepository;
use crate::repo::veiculo_repo::VeiculoRepository;
use log::{error, info};
use std::fmt::Display;

/// Use-case facade composing the three entity repositories.
pub struct WorkshopService<C, V, N> {
    clientes: C,
    veiculos: V,
    notas: N,
}

impl<C, V, N> WorkshopService<C, V, N>
where
    C: ClienteRepository,
    V: VeiculoRepository,
    N: NotaRepository,
{
    /// Creates a facade over the provided repository implementations.
    pub fn new(clientes: C, veiculos: V, notas: N) -> Self {
        Self {
            clientes,
            veiculos,
            notas,
        }
    }

    pub fn get_cliente(&self, id: &str) -> RepoResult<Option<Cliente>> {
        self.clientes.get_by_id(id)
    }

    pub fn create_cliente(&self, cliente: &mut Cliente) -> RepoResult<ClienteId> {
        let result = self.clientes.create(cliente);
        log_write("cliente_create", &cliente.id, &result, "");
        result
    }

    pub fn update_cliente(&self, cliente: &Cliente) -> RepoResult<()> {
        let result = self.clientes.update(cliente);
        log_write("cliente_update", &cliente.id, &result, "");
        result
    }

    pub fn delete_cliente(&self, id: &str) -> RepoResult<()> {
        let result = self.clientes.delete(id);
        log_write("cliente_delete", id, &result, "");
        result
    }

    pub fn list_clientes(&self) -> RepoResult<Vec<Cliente>> {
        self.clientes.list()
    }

    pub fn get_veiculo(&self, id: &str) -> RepoResult<Option<Veiculo>> {
        self.veiculos.get_by_id(id)
    }

    pub fn create_veiculo(&self, veiculo: &mut Veiculo) -> RepoResult<VeiculoId> {
        let result = self.veiculos.create(veiculo);
        let fields = format!(" cliente_id={}", veiculo.cliente_id);
        log_write("veiculo_create", &veiculo.id, &result, &fields);
        result
    }

    pub fn update_veiculo(&self, veiculo: &Veiculo) -> RepoResult<()> {
        let result = self.veiculos.update(veiculo);
        log_write("veiculo_update", &veiculo.id, &result, "");
        result
    }

    pub fn delete_veiculo(&self, id: &str) -> RepoResult<()> {
        let result = self.veiculos.delete(id);
        log_write("veiculo_delete", id, &result, "");
        result
    }

    /// Lists the vehicles owned by one client.
    pub fn list_veiculos_by_cliente(&self, cliente_id: &str) -> RepoResult<Vec<Veiculo>> {
        self.veiculos.list_by_cliente_id(cliente_id)
    }

    pub fn get_nota(&self, id: &str) -> RepoResult<Option<Nota>> {
        self.notas.get_by_id(id)
    }

    /// Persists a new invoice; `nota.id` holds the generated id afterwards.
    pub fn create_nota(&self, nota: &mut Nota) -> RepoResult<NotaId> {
        let result = self.notas.create(nota);
        log_write("nota_create", &nota.id, &result, &line_item_fields(nota));
        result
    }

    /// Overwrites the invoice header and replaces both line-item lists.
    pub fn update_nota(&self, nota: &Nota) -> RepoResult<()> {
        let result = self.notas.update(nota);
        log_write("nota_update", &nota.id, &result, &line_item_fields(nota));
        result
    }

    pub fn delete_nota(&self, id: &str) -> RepoResult<()> {
        let result = self.notas.delete(id);
        log_write("nota_delete", id, &result, "");
        result
    }

    pub fn list_notas(&self) -> RepoResult<Vec<Nota>> {
        self.notas.list()
    }
}

fn line_item_fields(nota: &Nota) -> String {
    format!(
        " servicos={} partes={}",
        nota.servicos.len(),
        nota.partes.len()
    )
}

fn log_write<T, E: Display>(event: &str, id: &str, result: &Result<T, E>, fields: &str) {
    match result {
        Ok(_) => info!("event={event} module=service status=ok id={id}{fields}"),
        Err(err) => {
            error!("event={event} module=service status=error id={id}{fields} error={err}")
        }
    }
}
