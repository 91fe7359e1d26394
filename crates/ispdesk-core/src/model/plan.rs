// ── Service plan ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;

/// A speed tier with its monthly price. Referenced by installation
/// requests and contracts; only active plans can be newly referenced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub id: EntityId,
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    pub velocidad_bajada_mbps: f64,
    pub velocidad_subida_mbps: f64,
    pub precio_mensual: f64,
    pub moneda: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Plan {
    /// Short speed label, e.g. `50/10 Mbps`.
    pub fn speed_label(&self) -> String {
        format!(
            "{}/{} Mbps",
            self.velocidad_bajada_mbps, self.velocidad_subida_mbps
        )
    }
}
