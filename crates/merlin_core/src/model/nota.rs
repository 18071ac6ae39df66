//! Service invoice ("nota") aggregate.
//!
//! # Responsibility
//! - Define the invoice header and its two owned line-item collections.
//! - Own the textual date encoding used by persistence.
//!
//! # Invariants
//! - `id` is assigned once on create and never changes afterwards.
//! - `servicos` and `partes` belong to exactly one invoice and are always
//!   written, replaced and deleted together with the header.
//! - `custo_total` is caller-supplied; nothing recomputes it from line items.

use crate::model::cliente::ClienteId;
use crate::model::veiculo::VeiculoId;
use chrono::{DateTime, Datelike, FixedOffset, SecondsFormat};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable invoice identifier assigned on create.
pub type NotaId = String;

/// Labour line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Servico {
    pub descricao: String,
    pub custo: f64,
}

impl Servico {
    pub fn new(descricao: impl Into<String>, custo: f64) -> Self {
        Self {
            descricao: descricao.into(),
            custo,
        }
    }
}

/// Part line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parte {
    pub nome: String,
    /// Unit cost.
    pub custo: f64,
    pub quantidade: i64,
}

impl Parte {
    pub fn new(nome: impl Into<String>, custo: f64, quantidade: i64) -> Self {
        Self {
            nome: nome.into(),
            custo,
            quantidade,
        }
    }
}

/// Invoice aggregate root: header fields plus owned line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nota {
    /// Overwritten by the repository on create.
    pub id: NotaId,
    pub cliente_id: ClienteId,
    pub veiculo_id: VeiculoId,
    pub data: DateTime<FixedOffset>,
    pub custo_total: f64,
    pub servicos: Vec<Servico>,
    pub partes: Vec<Parte>,
}

impl Nota {
    /// Builds an unsaved invoice header with empty line-item collections.
    pub fn new(
        cliente_id: impl Into<ClienteId>,
        veiculo_id: impl Into<VeiculoId>,
        data: DateTime<FixedOffset>,
        custo_total: f64,
    ) -> Self {
        Self {
            id: NotaId::new(),
            cliente_id: cliente_id.into(),
            veiculo_id: veiculo_id.into(),
            data,
            custo_total,
            servicos: Vec::new(),
            partes: Vec::new(),
        }
    }

    pub fn with_servico(mut self, servico: Servico) -> Self {
        self.servicos.push(servico);
        self
    }

    pub fn with_parte(mut self, parte: Parte) -> Self {
        self.partes.push(parte);
        self
    }
}

/// Years RFC 3339 can spell with four digits.
const STORABLE_YEARS: std::ops::RangeInclusive<i32> = 0..=9999;

/// Reason a date cannot be written as RFC 3339 text that reads back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnstorableDate {
    /// Local year outside `0..=9999`.
    YearOutOfRange(i32),
    /// Offset with a seconds component, which RFC 3339 cannot express.
    SubMinuteOffset(i32),
}

impl Display for UnstorableDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::YearOutOfRange(year) => {
                write!(f, "year {year} is outside the storable range 0..=9999")
            }
            Self::SubMinuteOffset(seconds) => {
                write!(f, "utc offset of {seconds}s is not a whole number of minutes")
            }
        }
    }
}

impl Error for UnstorableDate {}

/// Encodes an invoice date as RFC 3339 text for the `notas.data` column.
///
/// Sub-second precision is kept so a stored date reads back unchanged.
/// Dates that [`parse_nota_date`] could not read back are rejected.
pub fn format_nota_date(data: &DateTime<FixedOffset>) -> Result<String, UnstorableDate> {
    let year = data.year();
    if !STORABLE_YEARS.contains(&year) {
        return Err(UnstorableDate::YearOutOfRange(year));
    }
    let offset_seconds = data.offset().local_minus_utc();
    if offset_seconds % 60 != 0 {
        return Err(UnstorableDate::SubMinuteOffset(offset_seconds));
    }
    Ok(data.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

/// Parses a stored `notas.data` value. Anything that is not RFC 3339 fails.
pub fn parse_nota_date(value: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(value)
}
