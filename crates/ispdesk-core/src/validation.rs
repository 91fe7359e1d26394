// ── Uniqueness and format validators ──
//
// Every check here is a pure function over values the caller has already
// looked up. The live form hint and the commit-time gate call the same
// function with the same inputs, so they cannot disagree.

use serde::Serialize;

use crate::error::CoreError;
use crate::model::{Cliente, DatosCliente, EntityId, TipoIdentificacion};

/// Minimum length of a cancellation reason, after trimming.
pub const MIN_CANCEL_REASON_LEN: usize = 10;

/// Billing day range; 29-31 are excluded so every month has the day.
pub const BILLING_DAY_RANGE: std::ops::RangeInclusive<u8> = 1..=28;

// ── Identification uniqueness ───────────────────────────────────────

/// Outcome of an identification-number availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentificationCheck {
    pub available: bool,
    pub message: String,
    pub conflicting_name: Option<String>,
}

/// Decide whether `number` is free, given the customer currently holding
/// it (if any). Comparison is literal: the store indexes customers by the
/// number exactly as entered.
///
/// `exclude` lets an edit of customer X ignore X's own record.
pub fn identification_available(
    number: &str,
    holder: Option<&Cliente>,
    exclude: Option<EntityId>,
) -> IdentificationCheck {
    match holder {
        Some(existing) if Some(existing.id) != exclude => {
            let name = existing.display_name();
            IdentificationCheck {
                available: false,
                message: format!("Identification {number} is already registered to {name}"),
                conflicting_name: Some(name),
            }
        }
        _ => IdentificationCheck {
            available: true,
            message: format!("Identification {number} is available"),
            conflicting_name: None,
        },
    }
}

/// Authoritative form of [`identification_available`]: an unavailable
/// number becomes `DuplicateIdentification`.
pub fn ensure_identification_available(
    number: &str,
    holder: Option<&Cliente>,
    exclude: Option<EntityId>,
) -> Result<(), CoreError> {
    let check = identification_available(number, holder, exclude);
    match check.conflicting_name {
        Some(existing_name) if !check.available => Err(CoreError::DuplicateIdentification {
            number: number.to_owned(),
            existing_name,
        }),
        _ => Ok(()),
    }
}

// ── Format rules ────────────────────────────────────────────────────

/// Check an identification number against the digit pattern of its kind.
///
/// Dashes and spaces are accepted as visual separators (`3-101-123456`);
/// only the digits are measured.
pub fn validate_identificacion(tipo: TipoIdentificacion, numero: &str) -> Result<(), CoreError> {
    let trimmed = numero.trim();
    let mut digits = String::with_capacity(trimmed.len());
    for c in trimmed.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '-' | ' ' => {}
            _ => return Err(bad_identificacion(tipo, numero)),
        }
    }

    let ok = match tipo {
        TipoIdentificacion::CedulaFisica => digits.len() == 9,
        TipoIdentificacion::CedulaJuridica => digits.len() == 10 && digits.starts_with('3'),
        TipoIdentificacion::Dimex => matches!(digits.len(), 11 | 12),
        TipoIdentificacion::Nite => digits.len() == 10,
    };
    if ok {
        Ok(())
    } else {
        Err(bad_identificacion(tipo, numero))
    }
}

fn bad_identificacion(tipo: TipoIdentificacion, numero: &str) -> CoreError {
    let rule = match tipo {
        TipoIdentificacion::CedulaFisica => "9 digits",
        TipoIdentificacion::CedulaJuridica => "10 digits starting with 3",
        TipoIdentificacion::Dimex => "11 or 12 digits",
        TipoIdentificacion::Nite => "10 digits",
    };
    CoreError::validation(format!("{tipo} '{numero}' must be {rule}"))
}

/// Costa Rican phone number: 8 digits, first digit 2-8.
pub fn validate_telefono(telefono: &str) -> Result<(), CoreError> {
    let bytes = telefono.as_bytes();
    let ok = bytes.len() == 8
        && bytes.iter().all(u8::is_ascii_digit)
        && (b'2'..=b'8').contains(&bytes[0]);
    if ok {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "phone '{telefono}' must be 8 digits starting with 2-8"
        )))
    }
}

/// Full check of a customer data block: required names, identification
/// format and optional phone.
pub fn validate_datos_cliente(datos: &DatosCliente) -> Result<(), CoreError> {
    if datos.nombre.trim().is_empty() {
        return Err(CoreError::validation("customer name must not be empty"));
    }
    validate_identificacion(datos.tipo_identificacion, &datos.numero_identificacion)?;
    if let Some(ref tel) = datos.telefono {
        validate_telefono(tel)?;
    }
    Ok(())
}

/// Returns the trimmed reason.
pub fn validate_cancel_reason(reason: &str) -> Result<String, CoreError> {
    let trimmed = reason.trim();
    if trimmed.chars().count() < MIN_CANCEL_REASON_LEN {
        return Err(CoreError::validation(format!(
            "cancellation reason must be at least {MIN_CANCEL_REASON_LEN} characters"
        )));
    }
    Ok(trimmed.to_owned())
}

pub fn validate_billing_day(day: u8) -> Result<(), CoreError> {
    if BILLING_DAY_RANGE.contains(&day) {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "billing day {day} must be between 1 and 28"
        )))
    }
}
