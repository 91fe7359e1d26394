//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text.

use std::net::Ipv4Addr;

use miette::Diagnostic;
use thiserror::Error;

use ispdesk_config::ConfigError;
use ispdesk_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Address pool ─────────────────────────────────────────────────

    #[error("Invalid CIDR '{entry}'")]
    #[diagnostic(
        code(ispdesk::invalid_cidr),
        help("Pools are comma-separated a.b.c.d/n entries, e.g. \"10.0.0.0/24,10.0.1.0/24\".")
    )]
    InvalidCidr { entry: String },

    #[error("Address {address} is not part of router '{router}' pool")]
    #[diagnostic(
        code(ispdesk::address_out_of_pool),
        help("Run: ispdesk routers pool \"{router}\" to see the usable ranges")
    )]
    AddressOutOfPool { address: Ipv4Addr, router: String },

    #[error("Address {address} is already assigned to contract {contract_number}")]
    #[diagnostic(
        code(ispdesk::address_conflict),
        help("Pick another address, or omit --ip to take the next free one.")
    )]
    AddressConflict {
        address: Ipv4Addr,
        contract_number: String,
    },

    #[error("No free address left in router '{router}' pool")]
    #[diagnostic(
        code(ispdesk::pool_exhausted),
        help("Extend the router's pool or use another router.")
    )]
    PoolExhausted { router: String },

    // ── Customers ────────────────────────────────────────────────────

    #[error("Identification {number} already belongs to {existing_name}")]
    #[diagnostic(
        code(ispdesk::duplicate_identification),
        help("Link the existing customer with: --client {number}")
    )]
    DuplicateIdentification {
        number: String,
        existing_name: String,
    },

    // ── Provisioning ─────────────────────────────────────────────────

    #[error("PPPoE connections require both a username and a password")]
    #[diagnostic(
        code(ispdesk::missing_credentials),
        help("Pass --pppoe-user and --pppoe-password.")
    )]
    MissingCredentials,

    #[error("Installation {number} was already activated (contract {contract_number})")]
    #[diagnostic(code(ispdesk::already_activated))]
    AlreadyActivated {
        number: String,
        contract_number: String,
    },

    #[error("Cannot move installation from {from} to {to}")]
    #[diagnostic(
        code(ispdesk::invalid_transition),
        help(
            "Allowed: solicitud -> programada, programada -> en_progreso, \
             en_progreso -> programada; any open state may be cancelled."
        )
    )]
    InvalidTransition { from: String, to: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(ispdesk::not_found),
        help("Run: ispdesk {list_command} to see available entries")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{resource_type} '{identifier}' is inactive")]
    #[diagnostic(code(ispdesk::inactive))]
    Inactive {
        resource_type: String,
        identifier: String,
    },

    #[error("Role '{role}' may not {action} module '{module}'")]
    #[diagnostic(
        code(ispdesk::permission_denied),
        help("Use a profile with a suitable role, or pass --role.")
    )]
    PermissionDenied {
        role: String,
        module: String,
        action: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ispdesk::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ispdesk::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: ispdesk config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(ispdesk::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(ispdesk::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Storage / IO ─────────────────────────────────────────────────

    #[error("Store error: {message}")]
    #[diagnostic(code(ispdesk::store))]
    Store { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    #[diagnostic(code(ispdesk::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::AddressConflict { .. }
            | Self::PoolExhausted { .. }
            | Self::DuplicateIdentification { .. }
            | Self::AlreadyActivated { .. }
            | Self::InvalidTransition { .. }
            | Self::Inactive { .. } => exit_code::CONFLICT,
            Self::InvalidCidr { .. }
            | Self::AddressOutOfPool { .. }
            | Self::MissingCredentials
            | Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    pub fn validation(field: &str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

fn list_command(entity_type: &str) -> &'static str {
    match entity_type {
        "Router" => "routers list",
        "Plan" => "plans list",
        "Cliente" => "clients list",
        "Contrato" => "contracts list",
        _ => "installations list",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidCidrFormat { entry } => Self::InvalidCidr { entry },
            CoreError::AddressOutOfPool { address, router } => {
                Self::AddressOutOfPool { address, router }
            }
            CoreError::AddressConflict {
                address,
                contract_number,
            } => Self::AddressConflict {
                address,
                contract_number,
            },
            CoreError::PoolExhausted { router } => Self::PoolExhausted { router },
            CoreError::DuplicateIdentification {
                number,
                existing_name,
            } => Self::DuplicateIdentification {
                number,
                existing_name,
            },
            CoreError::MissingCredentials => Self::MissingCredentials,
            CoreError::AlreadyActivated {
                number,
                contract_number,
            } => Self::AlreadyActivated {
                number,
                contract_number,
            },
            CoreError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                resource_type: entity_type.to_lowercase(),
                identifier,
                list_command: list_command(entity_type).into(),
            },
            CoreError::Inactive {
                entity_type,
                identifier,
            } => Self::Inactive {
                resource_type: entity_type.to_lowercase(),
                identifier,
            },
            CoreError::ValidationFailed { message } => Self::Validation {
                field: "input".into(),
                reason: message,
            },
            CoreError::PermissionDenied {
                role,
                module,
                action,
            } => Self::PermissionDenied {
                role,
                module,
                action: action.into(),
            },
            CoreError::Io(e) => Self::Io(e),
            CoreError::Serialization(e) => Self::Store {
                message: e.to_string(),
            },
            CoreError::ControllerClosed => Self::Store {
                message: "controller is shut down".into(),
            },
            CoreError::Internal(message) => Self::Store { message },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, available } => Self::ProfileNotFound {
                name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_exit_codes() {
        let conflict = CliError::from(CoreError::AddressConflict {
            address: Ipv4Addr::new(10, 0, 0, 5),
            contract_number: "CTR-20261102-0001".into(),
        });
        assert_eq!(conflict.exit_code(), exit_code::CONFLICT);

        let denied = CliError::from(CoreError::PermissionDenied {
            role: "auditor".into(),
            module: "routers".into(),
            action: "write",
        });
        assert_eq!(denied.exit_code(), exit_code::PERMISSION);

        let missing = CliError::from(CoreError::NotFound {
            entity_type: "Router",
            identifier: "nodo-x".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);
        assert!(matches!(
            missing,
            CliError::NotFound { ref list_command, .. } if list_command == "routers list"
        ));

        assert_eq!(
            CliError::from(CoreError::MissingCredentials).exit_code(),
            exit_code::USAGE
        );
        assert_eq!(
            CliError::from(CoreError::ControllerClosed).exit_code(),
            exit_code::GENERAL
        );
    }

    #[test]
    fn missing_profile_lists_alternatives() {
        let err = CliError::from(ConfigError::ProfileNotFound {
            name: "campo".into(),
            available: vec!["default".into(), "oficina".into()],
        });
        match err {
            CliError::ProfileNotFound { available, .. } => assert_eq!(available, "default, oficina"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
