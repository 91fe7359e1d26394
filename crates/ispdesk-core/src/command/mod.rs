// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller's single processor task runs each one inside a store
// transaction.

pub mod requests;

use std::net::Ipv4Addr;

use crate::access::Module;
use crate::error::CoreError;
use crate::model::{
    Cliente, Contrato, EntityId, EstadoContrato, EstadoInstalacion, Instalacion, Plan, Router,
};
use crate::provisioning::Activation;

pub use requests::{
    ActivateInstalacionRequest, ClienteSource, ConexionRequest, CreateClienteRequest,
    CreatePlanRequest, CreateRouterRequest, CreateSolicitudRequest, RescheduleRequest,
};

/// A command envelope sent through the command channel.
/// Contains the command and a oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<CommandResult, CoreError>>,
}

/// All possible write operations against the back-office store.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Plans ────────────────────────────────────────────────────────
    CreatePlan(CreatePlanRequest),
    DeactivatePlan {
        id: EntityId,
    },

    // ── Routers ──────────────────────────────────────────────────────
    CreateRouter(CreateRouterRequest),
    DeactivateRouter {
        id: EntityId,
    },

    // ── Customers ────────────────────────────────────────────────────
    CreateCliente(CreateClienteRequest),
    DeactivateCliente {
        id: EntityId,
    },

    // ── Installations ────────────────────────────────────────────────
    CreateSolicitud(CreateSolicitudRequest),
    TransitionInstalacion {
        id: EntityId,
        estado: EstadoInstalacion,
    },
    RescheduleInstalacion {
        id: EntityId,
        update: RescheduleRequest,
    },
    CancelInstalacion {
        id: EntityId,
        motivo: String,
    },
    ActivateInstalacion(ActivateInstalacionRequest),

    // ── Contracts ────────────────────────────────────────────────────
    SetContratoEstado {
        id: EntityId,
        estado: EstadoContrato,
    },
    ReassignAddress {
        id: EntityId,
        address: Ipv4Addr,
    },
}

impl Command {
    /// Module whose write permission gates this command.
    pub fn module(&self) -> Module {
        match self {
            Self::CreatePlan(_) | Self::DeactivatePlan { .. } => Module::Planes,
            Self::CreateRouter(_) | Self::DeactivateRouter { .. } => Module::Routers,
            Self::CreateCliente(_) | Self::DeactivateCliente { .. } => Module::Clientes,
            Self::CreateSolicitud(_)
            | Self::TransitionInstalacion { .. }
            | Self::RescheduleInstalacion { .. }
            | Self::CancelInstalacion { .. }
            | Self::ActivateInstalacion(_) => Module::Instalaciones,
            Self::SetContratoEstado { .. } | Self::ReassignAddress { .. } => Module::Contratos,
        }
    }
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Plan(Plan),
    Router(Router),
    Cliente(Cliente),
    Instalacion(Instalacion),
    Contrato(Contrato),
    Activation(Box<Activation>),
}
