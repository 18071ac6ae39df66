//! Client record.

use serde::{Deserialize, Serialize};

/// Stable client identifier assigned on create.
pub type ClienteId = String;

/// Workshop customer. Root of ownership for vehicles and invoices.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cliente {
    /// Empty until the repository assigns one on create.
    pub id: ClienteId,
    pub nome: String,
    pub telefone: String,
    pub email: String,
}

impl Cliente {
    /// Builds an unsaved client; `id` stays empty until persisted.
    pub fn new(
        nome: impl Into<String>,
        telefone: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: ClienteId::new(),
            nome: nome.into(),
            telefone: telefone.into(),
            email: email.into(),
        }
    }
}
