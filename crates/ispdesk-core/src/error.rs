// ── Core error types ──
//
// Business failures are recoverable by the operator: each variant carries
// enough detail (offending address, conflicting contract, existing customer)
// to correct the input and resubmit. Infrastructure failures are wrapped
// as-is and are fatal to the current request only.

use std::net::Ipv4Addr;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Address pool errors ──────────────────────────────────────────
    #[error("Invalid CIDR '{entry}': expected a.b.c.d/n with octets 0-255 and prefix 0-32")]
    InvalidCidrFormat { entry: String },

    #[error("Address {address} is not part of router '{router}' pool")]
    AddressOutOfPool { address: Ipv4Addr, router: String },

    #[error("Address {address} is already assigned to contract {contract_number}")]
    AddressConflict {
        address: Ipv4Addr,
        contract_number: String,
    },

    #[error("No free address left in router '{router}' pool")]
    PoolExhausted { router: String },

    // ── Customer errors ──────────────────────────────────────────────
    #[error("Identification {number} already belongs to customer {existing_name}")]
    DuplicateIdentification {
        number: String,
        existing_name: String,
    },

    // ── Provisioning errors ──────────────────────────────────────────
    #[error("PPPoE connections require both a username and a password")]
    MissingCredentials,

    #[error("Installation {number} was already activated (contract {contract_number})")]
    AlreadyActivated {
        number: String,
        contract_number: String,
    },

    #[error("Invalid installation transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("{entity_type} {identifier} is inactive")]
    Inactive {
        entity_type: &'static str,
        identifier: String,
    },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("Role '{role}' may not {action} module '{module}'")]
    PermissionDenied {
        role: String,
        module: String,
        action: &'static str,
    },

    // ── Infrastructure errors ────────────────────────────────────────
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage format error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Controller is shut down")]
    ControllerClosed,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub(crate) fn not_found(entity_type: &'static str, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn inactive(entity_type: &'static str, identifier: impl ToString) -> Self {
        Self::Inactive {
            entity_type,
            identifier: identifier.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::ValidationFailed {
            message: message.into(),
        }
    }

    /// Whether an operator can fix the input and resubmit.
    ///
    /// Everything except the infrastructure variants.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::Io(_) | Self::Serialization(_) | Self::ControllerClosed | Self::Internal(_)
        )
    }
}
