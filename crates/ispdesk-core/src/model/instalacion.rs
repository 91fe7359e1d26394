// ── Installation request ──

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::cliente::DatosCliente;
use super::entity_id::EntityId;

/// Installation lifecycle status.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum EstadoInstalacion {
    #[default]
    Solicitud,
    Programada,
    EnProgreso,
    Completada,
    Cancelada,
}

impl EstadoInstalacion {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completada | Self::Cancelada)
    }
}

/// An installation request for a prospective customer.
///
/// `temp` holds the customer data as typed by the operator. Until
/// activation it is the only customer record; afterwards it is history
/// and the linked contract's customer is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instalacion {
    pub id: EntityId,
    pub numero_instalacion: String,
    /// Set exactly once, by a successful activation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrato_id: Option<EntityId>,
    pub plan_id: EntityId,
    pub fecha_programada: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_completada: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_cancelacion: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tecnico_asignado: Option<String>,
    pub estado: EstadoInstalacion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motivo_cancelacion: Option<String>,
    pub temp: DatosCliente,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Instalacion {
    pub fn is_activated(&self) -> bool {
        self.contrato_id.is_some()
    }
}
