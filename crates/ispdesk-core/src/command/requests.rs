// ── Typed request structs for Command payloads ──

use std::net::Ipv4Addr;

use chrono::NaiveDate;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::cidr::AddressPool;
use crate::model::{DatosCliente, EntityId, EstadoContrato};

// ── Directories ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlanRequest {
    pub nombre: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    pub velocidad_bajada_mbps: f64,
    pub velocidad_subida_mbps: f64,
    pub precio_mensual: f64,
    /// Defaults to `CRC`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moneda: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRouterRequest {
    pub nombre: String,
    pub ip: Ipv4Addr,
    pub usuario: String,
    /// Defaults to the RouterOS API port.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puerto: Option<u16>,
    #[serde(default)]
    pub ssl: bool,
    pub cidr_disponibles: AddressPool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClienteRequest {
    #[serde(flatten)]
    pub datos: DatosCliente,
}

// ── Installations ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSolicitudRequest {
    pub plan_id: EntityId,
    pub fecha_programada: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tecnico_asignado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
    pub temp: DatosCliente,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RescheduleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_programada: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tecnico_asignado: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notas: Option<String>,
}

/// Where the activated contract's customer comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "modo", content = "cliente_id", rename_all = "snake_case")]
pub enum ClienteSource {
    /// Create a new customer from the installation's temporary fields.
    Crear,
    /// Link an existing customer.
    Existente(EntityId),
}

/// Connection mode and its mode-specific input.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "tipo_conexion", rename_all = "snake_case")]
pub enum ConexionRequest {
    /// `ip: None` asks for the next free address.
    Ipoe {
        #[serde(default)]
        ip: Option<Ipv4Addr>,
    },
    /// `remote_address: None` leaves the session on the router's dynamic
    /// PPP pool; nothing is committed here.
    Pppoe {
        usuario: String,
        password: SecretString,
        #[serde(default)]
        remote_address: Option<Ipv4Addr>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActivateInstalacionRequest {
    pub instalacion_id: EntityId,
    pub cliente: ClienteSource,
    pub fecha_inicio: NaiveDate,
    pub dia_facturacion: u8,
    #[serde(default)]
    pub estado_inicial: EstadoContrato,
    pub router_id: EntityId,
    pub conexion: ConexionRequest,
    #[serde(default)]
    pub notas: Option<String>,
}
