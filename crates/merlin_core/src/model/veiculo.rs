//! Vehicle record.

use crate::model::cliente::ClienteId;
use serde::{Deserialize, Serialize};

/// Stable vehicle identifier assigned on create.
pub type VeiculoId = String;

/// A customer's vehicle. Many-to-one with [`crate::Cliente`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Veiculo {
    pub id: VeiculoId,
    /// Owning client, by reference.
    pub cliente_id: ClienteId,
    pub marca: String,
    pub modelo: String,
    /// Model year.
    pub ano: i32,
    pub placa: String,
}

impl Veiculo {
    /// Builds an unsaved vehicle owned by `cliente_id`.
    pub fn new(
        cliente_id: impl Into<ClienteId>,
        marca: impl Into<String>,
        modelo: impl Into<String>,
        ano: i32,
        placa: impl Into<String>,
    ) -> Self {
        Self {
            id: VeiculoId::new(),
            cliente_id: cliente_id.into(),
            marca: marca.into(),
            modelo: modelo.into(),
            ano,
            placa: placa.into(),
        }
    }
}
