//! Shared helpers for command handlers.

use chrono::NaiveDate;
use serde::{Serialize, Serializer, ser::Error as _};

use ispdesk_core::{DatosCliente, EstadoContrato, EstadoInstalacion, TipoIdentificacion};

use crate::cli::{ContractStatusArg, CustomerFields, IdTypeArg, InstallationStateArg};
use crate::error::CliError;
use crate::output::Tone;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal the prompt cannot be shown, which is reported as
/// a missing `--yes`.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|_| CliError::NonInteractiveRequiresYes {
            action: action.into(),
        })
}

/// Parse a `YYYY-MM-DD` flag value.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| CliError::validation(field, format!("expected YYYY-MM-DD ({e})")))
}

/// Today's date in UTC, the same calendar the core stamps with.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl From<IdTypeArg> for TipoIdentificacion {
    fn from(arg: IdTypeArg) -> Self {
        match arg {
            IdTypeArg::CedulaFisica => Self::CedulaFisica,
            IdTypeArg::CedulaJuridica => Self::CedulaJuridica,
            IdTypeArg::Dimex => Self::Dimex,
            IdTypeArg::Nite => Self::Nite,
        }
    }
}

impl From<ContractStatusArg> for EstadoContrato {
    fn from(arg: ContractStatusArg) -> Self {
        match arg {
            ContractStatusArg::Activo => Self::Activo,
            ContractStatusArg::Pendiente => Self::Pendiente,
            ContractStatusArg::Suspendido => Self::Suspendido,
            ContractStatusArg::Cancelado => Self::Cancelado,
        }
    }
}

impl From<InstallationStateArg> for EstadoInstalacion {
    fn from(arg: InstallationStateArg) -> Self {
        match arg {
            InstallationStateArg::Solicitud => Self::Solicitud,
            InstallationStateArg::Programada => Self::Programada,
            InstallationStateArg::EnProgreso => Self::EnProgreso,
            InstallationStateArg::Completada => Self::Completada,
            InstallationStateArg::Cancelada => Self::Cancelada,
        }
    }
}

impl From<CustomerFields> for DatosCliente {
    fn from(f: CustomerFields) -> Self {
        Self {
            tipo_identificacion: f.id_type.into(),
            numero_identificacion: f.id_number,
            nombre: f.name,
            apellido1: non_empty(f.surname1),
            apellido2: non_empty(f.surname2),
            razon_social: non_empty(f.company),
            email: non_empty(f.email),
            telefono: non_empty(f.phone),
            provincia: non_empty(f.province),
            canton: non_empty(f.canton),
            distrito: non_empty(f.district),
            direccion_exacta: non_empty(f.address),
        }
    }
}

pub fn contract_tone(estado: EstadoContrato) -> Tone {
    match estado {
        EstadoContrato::Activo => Tone::Good,
        EstadoContrato::Pendiente => Tone::Pending,
        EstadoContrato::Suspendido => Tone::Warn,
        EstadoContrato::Cancelado => Tone::Off,
    }
}

pub fn installation_tone(estado: EstadoInstalacion) -> Tone {
    match estado {
        EstadoInstalacion::Solicitud | EstadoInstalacion::Programada => Tone::Pending,
        EstadoInstalacion::EnProgreso => Tone::Warn,
        EstadoInstalacion::Completada => Tone::Good,
        EstadoInstalacion::Cancelada => Tone::Off,
    }
}

// ── Secret redaction ────────────────────────────────────────────────

/// Serializes the wrapped value with every `password` field masked.
///
/// Contracts carry PPPoE passwords in the store; structured output must
/// never print them.
#[derive(Debug)]
pub struct Redacted<T>(pub T);

impl<T: Serialize> Serialize for Redacted<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = serde_json::to_value(&self.0).map_err(S::Error::custom)?;
        mask_passwords(&mut value);
        value.serialize(serializer)
    }
}

fn mask_passwords(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, v) in map.iter_mut() {
                if key == "password" {
                    *v = serde_json::Value::String("****".into());
                } else {
                    mask_passwords(v);
                }
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(mask_passwords),
        _ => {}
    }
}

/// `-` for missing optional fields in detail views.
pub fn or_dash(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}
