// ── Contract domain types ──
//
// A contract binds one customer to one plan on one router. Its connection
// mode (IPoE or PPPoE) is fixed at creation: the enum variant is chosen
// once and no operation rebuilds it with the other variant.

use std::net::Ipv4Addr;

use chrono::{DateTime, NaiveDate, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use super::entity_id::EntityId;

/// Address-list for contracts whose traffic is allowed.
pub const ADDRESS_LIST_ACTIVE: &str = "ISP-ACTIVOS";
/// Address-list for contracts whose traffic is blocked.
pub const ADDRESS_LIST_SUSPENDED: &str = "ISP-SUSPENDIDOS";

/// Contract lifecycle status.
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
pub enum EstadoContrato {
    #[default]
    Activo,
    Pendiente,
    Suspendido,
    Cancelado,
}

impl EstadoContrato {
    /// Whether a contract in this state keeps its committed address.
    /// Cancelled contracts release it back to the pool.
    pub fn holds_address(self) -> bool {
        !matches!(self, Self::Cancelado)
    }
}

/// Connection mode discriminant, for display and filtering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TipoConexion {
    Ipoe,
    Pppoe,
}

/// Mode-specific connection data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "tipo_conexion", rename_all = "snake_case")]
pub enum Conexion {
    /// Static address enforced through an address-list entry.
    Ipoe { ip_asignada: Ipv4Addr },
    /// Authenticated session. Without `remote_address` the router leases
    /// from its own PPP pool and the address is not tracked here.
    Pppoe {
        usuario: String,
        #[serde(
            serialize_with = "serialize_secret",
            deserialize_with = "deserialize_secret"
        )]
        password: SecretString,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        remote_address: Option<Ipv4Addr>,
    },
}

impl Conexion {
    pub fn tipo(&self) -> TipoConexion {
        match self {
            Self::Ipoe { .. } => TipoConexion::Ipoe,
            Self::Pppoe { .. } => TipoConexion::Pppoe,
        }
    }

    /// The address this connection commits in its router's namespace, if any.
    pub fn committed_address(&self) -> Option<Ipv4Addr> {
        match self {
            Self::Ipoe { ip_asignada } => Some(*ip_asignada),
            Self::Pppoe { remote_address, .. } => *remote_address,
        }
    }

    /// Same mode and credentials, bound to `address`.
    pub(crate) fn with_address(&self, address: Ipv4Addr) -> Self {
        match self {
            Self::Ipoe { .. } => Self::Ipoe {
                ip_asignada: address,
            },
            Self::Pppoe {
                usuario, password, ..
            } => Self::Pppoe {
                usuario: usuario.clone(),
                password: password.clone(),
                remote_address: Some(address),
            },
        }
    }
}

/// A customer contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contrato {
    pub id: EntityId,
    pub numero_contrato: String,
    pub cliente_id: EntityId,
    pub plan_id: EntityId,
    pub router_id: EntityId,
    pub fecha_inicio: NaiveDate,
    /// Day of month for billing, 1-28.
    pub dia_facturacion: u8,
    pub estado: EstadoContrato,
    #[serde(flatten)]
    pub conexion: Conexion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contrato {
    /// Address this contract currently holds on its router, if any.
    pub fn committed_address(&self) -> Option<Ipv4Addr> {
        if self.estado.holds_address() {
            self.conexion.committed_address()
        } else {
            None
        }
    }

    /// Router address-list the contract's address belongs on.
    pub fn address_list(&self) -> Option<&'static str> {
        match self.estado {
            EstadoContrato::Activo | EstadoContrato::Pendiente => Some(ADDRESS_LIST_ACTIVE),
            EstadoContrato::Suspendido => Some(ADDRESS_LIST_SUSPENDED),
            EstadoContrato::Cancelado => None,
        }
    }
}

fn serialize_secret<S: Serializer>(secret: &SecretString, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(secret.expose_secret())
}

fn deserialize_secret<'de, D: Deserializer<'de>>(d: D) -> Result<SecretString, D::Error> {
    String::deserialize(d).map(SecretString::from)
}
