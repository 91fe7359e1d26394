// ── Installation lifecycle ──
//
// Plain status writes. Activation is the only transition with side
// effects and lives in `provisioning`; everything here only touches the
// installation record itself.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::CoreError;
use crate::model::{EstadoInstalacion, Instalacion};
use crate::validation::validate_cancel_reason;

/// Whether the lifecycle allows `from -> to` as a plain status write.
///
/// `completada` never appears as a target: only activation reaches it.
pub fn can_transition(from: EstadoInstalacion, to: EstadoInstalacion) -> bool {
    use EstadoInstalacion::{Cancelada, EnProgreso, Programada, Solicitud};
    matches!(
        (from, to),
        (Solicitud, Programada | Cancelada)
            | (Programada, EnProgreso | Cancelada)
            | (EnProgreso, Programada | Cancelada)
    )
}

/// Reject any change to an activated or terminal installation.
///
/// An activated installation reports `AlreadyActivated` even though its
/// state is also terminal; the activation is the more useful detail.
pub fn ensure_mutable(
    inst: &Instalacion,
    target: &str,
    contract_number: impl FnOnce() -> String,
) -> Result<(), CoreError> {
    if inst.is_activated() {
        return Err(CoreError::AlreadyActivated {
            number: inst.numero_instalacion.clone(),
            contract_number: contract_number(),
        });
    }
    if inst.estado.is_terminal() {
        return Err(CoreError::InvalidTransition {
            from: inst.estado.to_string(),
            to: target.to_owned(),
        });
    }
    Ok(())
}

/// Apply a plain status write. The caller has already run
/// [`ensure_mutable`].
pub fn transition(
    inst: &Instalacion,
    to: EstadoInstalacion,
    now: DateTime<Utc>,
) -> Result<Instalacion, CoreError> {
    if to == EstadoInstalacion::Cancelada {
        return Err(CoreError::validation(
            "cancellation requires a reason; use cancel",
        ));
    }
    if !can_transition(inst.estado, to) {
        return Err(CoreError::InvalidTransition {
            from: inst.estado.to_string(),
            to: to.to_string(),
        });
    }
    let mut next = inst.clone();
    next.estado = to;
    next.updated_at = now;
    Ok(next)
}

/// Cancel with a reason of at least ten characters.
pub fn cancel(
    inst: &Instalacion,
    reason: &str,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Result<Instalacion, CoreError> {
    if !can_transition(inst.estado, EstadoInstalacion::Cancelada) {
        return Err(CoreError::InvalidTransition {
            from: inst.estado.to_string(),
            to: EstadoInstalacion::Cancelada.to_string(),
        });
    }
    let reason = validate_cancel_reason(reason)?;
    let mut next = inst.clone();
    next.estado = EstadoInstalacion::Cancelada;
    next.motivo_cancelacion = Some(reason);
    next.fecha_cancelacion = Some(today);
    next.updated_at = now;
    Ok(next)
}

/// Scheduling edits. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct Reschedule {
    pub fecha_programada: Option<NaiveDate>,
    pub tecnico_asignado: Option<String>,
    pub notas: Option<String>,
}

pub fn reschedule(inst: &Instalacion, changes: Reschedule, now: DateTime<Utc>) -> Instalacion {
    let mut next = inst.clone();
    if let Some(fecha) = changes.fecha_programada {
        next.fecha_programada = fecha;
    }
    if let Some(tecnico) = changes.tecnico_asignado {
        next.tecnico_asignado = Some(tecnico);
    }
    if let Some(notas) = changes.notas {
        next.notas = Some(notas);
    }
    next.updated_at = now;
    next
}

/// Final write of a successful activation: link the contract and close
/// the installation as completed today, whatever state it was in.
pub fn mark_activated(
    inst: &Instalacion,
    contrato_id: crate::model::EntityId,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Instalacion {
    let mut next = inst.clone();
    next.contrato_id = Some(contrato_id);
    next.estado = EstadoInstalacion::Completada;
    next.fecha_completada = Some(today);
    next.updated_at = now;
    next
}
