//! ispdesk-core: installation provisioning and network address
//! allocation for an ISP back-office.
//!
//! The [`Controller`] is the entry point. Writes are [`Command`]s applied
//! one at a time, each as an all-or-nothing store transaction; reads and
//! advisory checks ([`Controller::suggest_next_address`],
//! [`Controller::check_address`], [`Controller::identification_available`])
//! go straight to the store and share their logic with the commit path.

pub mod access;
pub mod allocation;
pub mod cidr;
pub mod command;
pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod model;
pub mod provisioning;
pub mod store;
pub mod validation;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{Access, AccessPolicy, Module, Role, RoleMatrix};
pub use allocation::{Availability, Commitments, PoolSummary};
pub use cidr::{AddressPool, CidrBlock};
pub use command::requests::*;
pub use command::{Command, CommandResult};
pub use config::CoreConfig;
pub use controller::Controller;
pub use error::CoreError;
pub use provisioning::Activation;
pub use store::DataStore;
pub use validation::IdentificationCheck;

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ADDRESS_LIST_ACTIVE, ADDRESS_LIST_SUSPENDED, Cliente, Conexion, Contrato, DEFAULT_API_PORT,
    DatosCliente, EntityId, EstadoContrato, EstadoInstalacion, Instalacion, Plan, Router,
    TipoConexion, TipoIdentificacion,
};
