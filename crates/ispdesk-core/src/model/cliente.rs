// ── Customer domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::entity_id::EntityId;

/// The four identification kinds a customer may present.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TipoIdentificacion {
    CedulaFisica,
    CedulaJuridica,
    Dimex,
    Nite,
}

/// Identity, contact and location fields shared by a real customer and the
/// temporary customer block of an installation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatosCliente {
    pub tipo_identificacion: TipoIdentificacion,
    pub numero_identificacion: String,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apellido2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub razon_social: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provincia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canton: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distrito: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direccion_exacta: Option<String>,
}

impl DatosCliente {
    /// Company name when present, otherwise the person's full name.
    pub fn display_name(&self) -> String {
        if let Some(ref razon) = self.razon_social {
            if !razon.trim().is_empty() {
                return razon.clone();
            }
        }
        [
            Some(self.nombre.as_str()),
            self.apellido1.as_deref(),
            self.apellido2.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// A customer. The identification number is unique and never changes.
/// Customers are soft-deactivated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cliente {
    pub id: EntityId,
    #[serde(flatten)]
    pub datos: DatosCliente,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Cliente {
    pub fn numero_identificacion(&self) -> &str {
        &self.datos.numero_identificacion
    }

    pub fn display_name(&self) -> String {
        self.datos.display_name()
    }
}
