// ── Router (network device) ──

use std::net::Ipv4Addr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entity_id::EntityId;
use crate::cidr::AddressPool;

/// Default RouterOS API port.
pub const DEFAULT_API_PORT: u16 = 8728;

/// A provisioning router: device identity plus the ordered CIDR pool
/// from which customer addresses are drawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Router {
    pub id: EntityId,
    pub nombre: String,
    /// Management address; unique across routers.
    pub ip: Ipv4Addr,
    pub usuario: String,
    pub puerto: u16,
    pub ssl: bool,
    pub is_active: bool,
    /// Never empty: validated on creation.
    pub cidr_disponibles: AddressPool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Router {
    /// Name of the device-side IP pool mirroring `cidr_disponibles`.
    pub fn pool_name(&self) -> String {
        format!("pool-{}", self.nombre.to_lowercase().replace(' ', "-"))
    }
}
