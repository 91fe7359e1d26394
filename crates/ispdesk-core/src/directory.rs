// ── Directory operations ──
//
// Transaction-scoped create/deactivate for plans, routers and customers,
// plus installation request creation and its plain lifecycle writes.
// Each function takes the open transaction and stages its writes there.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::command::requests::{
    CreateClienteRequest, CreatePlanRequest, CreateRouterRequest, CreateSolicitudRequest,
    RescheduleRequest,
};
use crate::error::CoreError;
use crate::lifecycle::{self, Reschedule};
use crate::model::{
    Cliente, DEFAULT_API_PORT, DatosCliente, EntityId, EstadoInstalacion, Instalacion,
    NumberKind, Plan, Router,
};
use crate::store::Transaction;
use crate::validation::{ensure_identification_available, validate_datos_cliente};

const DEFAULT_CURRENCY: &str = "CRC";

// ── Plans ──────────────────────────────────────────────────────────

pub fn create_plan(
    tx: &mut Transaction<'_>,
    req: CreatePlanRequest,
    now: DateTime<Utc>,
) -> Result<Plan, CoreError> {
    let nombre = req.nombre.trim().to_owned();
    if nombre.is_empty() {
        return Err(CoreError::validation("plan name must not be empty"));
    }
    if tx.plan_by_nombre(&nombre).is_some() {
        return Err(CoreError::validation(format!(
            "a plan named '{nombre}' already exists"
        )));
    }
    if req.velocidad_bajada_mbps <= 0.0 || req.velocidad_subida_mbps <= 0.0 {
        return Err(CoreError::validation("plan speeds must be positive"));
    }
    if req.precio_mensual < 0.0 {
        return Err(CoreError::validation("plan price must not be negative"));
    }

    let plan = Plan {
        id: EntityId::new(),
        nombre,
        descripcion: req.descripcion,
        velocidad_bajada_mbps: req.velocidad_bajada_mbps,
        velocidad_subida_mbps: req.velocidad_subida_mbps,
        precio_mensual: req.precio_mensual,
        moneda: req.moneda.unwrap_or_else(|| DEFAULT_CURRENCY.to_owned()),
        is_active: true,
        created_at: now,
    };
    tx.put_plan(plan.clone());
    debug!(plan = %plan.nombre, "plan created");
    Ok(plan)
}

pub fn deactivate_plan(tx: &mut Transaction<'_>, id: EntityId) -> Result<Plan, CoreError> {
    let mut plan = tx.plan(id)?;
    plan.is_active = false;
    tx.put_plan(plan.clone());
    Ok(plan)
}

/// Active plan or `Inactive`.
pub(crate) fn active_plan(tx: &Transaction<'_>, id: EntityId) -> Result<Plan, CoreError> {
    let plan = tx.plan(id)?;
    if !plan.is_active {
        return Err(CoreError::inactive("Plan", &plan.nombre));
    }
    Ok(plan)
}

// ── Routers ────────────────────────────────────────────────────────

pub fn create_router(
    tx: &mut Transaction<'_>,
    req: CreateRouterRequest,
    now: DateTime<Utc>,
) -> Result<Router, CoreError> {
    let nombre = req.nombre.trim().to_owned();
    if nombre.is_empty() {
        return Err(CoreError::validation("router name must not be empty"));
    }
    if let Some(existing) = tx.router_by_ip(req.ip) {
        return Err(CoreError::validation(format!(
            "management address {} already belongs to router '{}'",
            req.ip, existing.nombre
        )));
    }

    let router = Router {
        id: EntityId::new(),
        nombre,
        ip: req.ip,
        usuario: req.usuario,
        puerto: req.puerto.unwrap_or(DEFAULT_API_PORT),
        ssl: req.ssl,
        is_active: true,
        cidr_disponibles: req.cidr_disponibles,
        identity: req.identity,
        created_at: now,
    };
    tx.put_router(router.clone());
    info!(
        router = %router.nombre,
        pool = %router.cidr_disponibles,
        capacity = router.cidr_disponibles.capacity(),
        "router registered"
    );
    Ok(router)
}

pub fn deactivate_router(tx: &mut Transaction<'_>, id: EntityId) -> Result<Router, CoreError> {
    let mut router = tx.router(id)?;
    router.is_active = false;
    tx.put_router(router.clone());
    Ok(router)
}

/// Active router or `Inactive`.
pub(crate) fn active_router(tx: &Transaction<'_>, id: EntityId) -> Result<Router, CoreError> {
    let router = tx.router(id)?;
    ensure_router_active(&router)?;
    Ok(router)
}

/// Allocation on a deactivated router is refused, both when advising and
/// when committing.
pub(crate) fn ensure_router_active(router: &Router) -> Result<(), CoreError> {
    if router.is_active {
        Ok(())
    } else {
        Err(CoreError::inactive("Router", &router.nombre))
    }
}

// ── Customers ──────────────────────────────────────────────────────

pub fn create_cliente(
    tx: &mut Transaction<'_>,
    req: CreateClienteRequest,
    now: DateTime<Utc>,
) -> Result<Cliente, CoreError> {
    let cliente = new_cliente(tx, req.datos, now)?;
    tx.put_cliente(cliente.clone());
    info!(
        cliente = %cliente.display_name(),
        identificacion = %cliente.numero_identificacion(),
        "customer created"
    );
    Ok(cliente)
}

/// Validate format and uniqueness, then build (but do not stage) a
/// customer. Shared by direct creation and activation.
pub(crate) fn new_cliente(
    tx: &Transaction<'_>,
    mut datos: DatosCliente,
    now: DateTime<Utc>,
) -> Result<Cliente, CoreError> {
    datos.numero_identificacion = datos.numero_identificacion.trim().to_owned();
    validate_datos_cliente(&datos)?;
    let holder = tx.cliente_by_identificacion(&datos.numero_identificacion);
    ensure_identification_available(&datos.numero_identificacion, holder.as_ref(), None)?;
    Ok(Cliente {
        id: EntityId::new(),
        datos,
        is_active: true,
        created_at: now,
    })
}

pub fn deactivate_cliente(tx: &mut Transaction<'_>, id: EntityId) -> Result<Cliente, CoreError> {
    let mut cliente = tx.cliente(id)?;
    cliente.is_active = false;
    tx.put_cliente(cliente.clone());
    Ok(cliente)
}

// ── Installation requests ──────────────────────────────────────────

pub fn create_solicitud(
    tx: &mut Transaction<'_>,
    req: CreateSolicitudRequest,
    now: DateTime<Utc>,
) -> Result<Instalacion, CoreError> {
    let plan = active_plan(tx, req.plan_id)?;
    let mut temp = req.temp;
    temp.numero_identificacion = temp.numero_identificacion.trim().to_owned();
    validate_datos_cliente(&temp)?;

    let numero_instalacion = tx.next_number(NumberKind::Instalacion, now.date_naive());
    let inst = Instalacion {
        id: EntityId::new(),
        numero_instalacion,
        contrato_id: None,
        plan_id: plan.id,
        fecha_programada: req.fecha_programada,
        fecha_completada: None,
        fecha_cancelacion: None,
        tecnico_asignado: req.tecnico_asignado,
        estado: EstadoInstalacion::Solicitud,
        notas: req.notas,
        motivo_cancelacion: None,
        temp,
        created_at: now,
        updated_at: now,
    };
    tx.put_instalacion(inst.clone());
    info!(
        instalacion = %inst.numero_instalacion,
        plan = %plan.nombre,
        "installation requested"
    );
    Ok(inst)
}

/// Load an installation and reject it if it is activated or terminal.
pub(crate) fn mutable_instalacion(
    tx: &Transaction<'_>,
    id: EntityId,
    target: &str,
) -> Result<Instalacion, CoreError> {
    let inst = tx.instalacion(id)?;
    lifecycle::ensure_mutable(&inst, target, || contract_number_of(tx, &inst))?;
    Ok(inst)
}

fn contract_number_of(tx: &Transaction<'_>, inst: &Instalacion) -> String {
    inst.contrato_id.map_or_else(String::new, |id| {
        tx.contrato(id)
            .map_or_else(|_| id.to_string(), |c| c.numero_contrato)
    })
}

pub fn transition_instalacion(
    tx: &mut Transaction<'_>,
    id: EntityId,
    to: EstadoInstalacion,
    now: DateTime<Utc>,
) -> Result<Instalacion, CoreError> {
    let inst = mutable_instalacion(tx, id, to.as_ref())?;
    let next = lifecycle::transition(&inst, to, now)?;
    tx.put_instalacion(next.clone());
    debug!(instalacion = %next.numero_instalacion, from = %inst.estado, to = %to, "installation moved");
    Ok(next)
}

pub fn cancel_instalacion(
    tx: &mut Transaction<'_>,
    id: EntityId,
    motivo: &str,
    now: DateTime<Utc>,
) -> Result<Instalacion, CoreError> {
    let inst = mutable_instalacion(tx, id, EstadoInstalacion::Cancelada.as_ref())?;
    let next = lifecycle::cancel(&inst, motivo, now.date_naive(), now)?;
    tx.put_instalacion(next.clone());
    info!(instalacion = %next.numero_instalacion, "installation cancelled");
    Ok(next)
}

pub fn reschedule_instalacion(
    tx: &mut Transaction<'_>,
    id: EntityId,
    req: RescheduleRequest,
    now: DateTime<Utc>,
) -> Result<Instalacion, CoreError> {
    let inst = mutable_instalacion(tx, id, "reprogramada")?;
    let next = lifecycle::reschedule(
        &inst,
        Reschedule {
            fecha_programada: req.fecha_programada,
            tecnico_asignado: req.tecnico_asignado,
            notas: req.notas,
        },
        now,
    );
    tx.put_instalacion(next.clone());
    Ok(next)
}
