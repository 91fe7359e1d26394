// ── Access policy ──
//
// Authorization is an opaque per-module gate. The core asks a policy
// before running a command; it never inspects who the operator is
// beyond their role.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::error::CoreError;

/// Operator roles.
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
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Admin,
    Operador,
    Tecnico,
    Auditor,
    Soporte,
}

/// Back-office modules a role may read or write.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Module {
    Clientes,
    Planes,
    Contratos,
    Instalaciones,
    Routers,
}

/// Read or write access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

impl Access {
    fn verb(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
        }
    }
}

/// Authorization decision function.
pub trait AccessPolicy: Send + Sync {
    fn can_access(&self, role: Role, module: Module) -> bool;

    fn can_write(&self, role: Role, module: Module) -> bool;

    /// `PermissionDenied` unless `role` has `access` on `module`.
    fn authorize(&self, role: Role, module: Module, access: Access) -> Result<(), CoreError> {
        let allowed = match access {
            Access::Read => self.can_access(role, module),
            Access::Write => self.can_write(role, module),
        };
        if allowed {
            Ok(())
        } else {
            Err(CoreError::PermissionDenied {
                role: role.to_string(),
                module: module.to_string(),
                action: access.verb(),
            })
        }
    }
}

/// The stock role matrix.
///
/// | role     | clientes | planes | contratos | instalaciones | routers |
/// |----------|----------|--------|-----------|---------------|---------|
/// | admin    | rw       | rw     | rw        | rw            | rw      |
/// | operador | rw       | rw     | rw        | rw            | r       |
/// | tecnico  | r        | r      | r         | rw            | r       |
/// | auditor  | r        | r      | r         | r             | r       |
/// | soporte  | r        | r      | r         | r             | -       |
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleMatrix;

impl AccessPolicy for RoleMatrix {
    fn can_access(&self, role: Role, module: Module) -> bool {
        !matches!((role, module), (Role::Soporte, Module::Routers))
    }

    fn can_write(&self, role: Role, module: Module) -> bool {
        match role {
            Role::Admin => true,
            Role::Operador => module != Module::Routers,
            Role::Tecnico => module == Module::Instalaciones,
            Role::Auditor | Role::Soporte => false,
        }
    }
}
