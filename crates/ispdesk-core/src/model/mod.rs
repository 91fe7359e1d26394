// ── Domain model ──
//
// Canonical back-office entities. Field names follow the operator-facing
// vocabulary (cliente, contrato, instalacion) so stored JSON and CLI
// output read the same way.

pub mod entity_id;

pub mod cliente;
pub mod contrato;
pub mod instalacion;
pub mod plan;
pub mod router;

// ── Re-exports ──────────────────────────────────────────────────────

pub use entity_id::{EntityId, NumberKind};

pub use cliente::{Cliente, DatosCliente, TipoIdentificacion};
pub use contrato::{
    ADDRESS_LIST_ACTIVE, ADDRESS_LIST_SUSPENDED, Conexion, Contrato, EstadoContrato, TipoConexion,
};
pub use instalacion::{EstadoInstalacion, Instalacion};
pub use plan::Plan;
pub use router::{DEFAULT_API_PORT, Router};
