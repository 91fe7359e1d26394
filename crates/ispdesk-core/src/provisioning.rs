// ── Provisioning transaction ──
//
// Activation turns an installation request into a customer, a contract
// and a committed address in one transaction. Every step stages its
// writes on the same `Transaction`; any error discards all of them.
//
// The address checks here are the same functions the advisory reads
// use, run against commitments that include this transaction's writes
// and were read under the store's write lock.

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::allocation::{self, Commitments};
use crate::command::requests::{ActivateInstalacionRequest, ClienteSource, ConexionRequest};
use crate::directory::{active_plan, active_router, mutable_instalacion, new_cliente};
use crate::error::CoreError;
use crate::lifecycle;
use crate::model::{
    Cliente, Conexion, Contrato, EntityId, EstadoContrato, EstadoInstalacion, Instalacion,
    NumberKind, Router,
};
use crate::store::Transaction;
use crate::validation::validate_billing_day;

/// Everything a successful activation produced.
#[derive(Debug, Clone, Serialize)]
pub struct Activation {
    pub instalacion: Instalacion,
    pub cliente: Cliente,
    pub cliente_created: bool,
    pub contrato: Contrato,
}

// ── Activation ─────────────────────────────────────────────────────

pub fn activate(
    tx: &mut Transaction<'_>,
    req: ActivateInstalacionRequest,
    now: DateTime<Utc>,
) -> Result<Activation, CoreError> {
    let inst = mutable_instalacion(tx, req.instalacion_id, EstadoInstalacion::Completada.as_ref())?;
    validate_billing_day(req.dia_facturacion)?;
    if req.estado_inicial == EstadoContrato::Cancelado {
        return Err(CoreError::validation(
            "a contract cannot start in state cancelado",
        ));
    }

    // 1. Customer: link or create.
    let (cliente, cliente_created) = resolve_cliente(tx, &inst, req.cliente, now)?;

    // 2. Address commitment, re-validated against live commitments.
    let router = active_router(tx, req.router_id)?;
    let commitments = tx.commitments(router.id, None);
    let conexion = resolve_conexion(&router, &commitments, req.conexion)?;

    // 3. Contract.
    let plan = active_plan(tx, inst.plan_id)?;
    let numero_contrato = tx.next_number(NumberKind::Contrato, now.date_naive());
    let contrato = Contrato {
        id: EntityId::new(),
        numero_contrato,
        cliente_id: cliente.id,
        plan_id: plan.id,
        router_id: router.id,
        fecha_inicio: req.fecha_inicio,
        dia_facturacion: req.dia_facturacion,
        estado: req.estado_inicial,
        conexion,
        notas: req.notas,
        created_at: now,
        updated_at: now,
    };
    tx.put_contrato(contrato.clone());

    // 4. Link and close the installation.
    let instalacion = lifecycle::mark_activated(&inst, contrato.id, now.date_naive(), now);
    tx.put_instalacion(instalacion.clone());

    info!(
        instalacion = %instalacion.numero_instalacion,
        contrato = %contrato.numero_contrato,
        cliente = %cliente.display_name(),
        router = %router.nombre,
        modo = %contrato.conexion.tipo(),
        address = ?contrato.conexion.committed_address(),
        "installation activated"
    );

    Ok(Activation {
        instalacion,
        cliente,
        cliente_created,
        contrato,
    })
}

fn resolve_cliente(
    tx: &mut Transaction<'_>,
    inst: &Instalacion,
    source: ClienteSource,
    now: DateTime<Utc>,
) -> Result<(Cliente, bool), CoreError> {
    match source {
        ClienteSource::Existente(id) => {
            let cliente = tx.cliente(id)?;
            if !cliente.is_active {
                return Err(CoreError::inactive("Cliente", cliente.numero_identificacion()));
            }
            debug!(cliente = %cliente.display_name(), "linking existing customer");
            Ok((cliente, false))
        }
        ClienteSource::Crear => {
            let cliente = new_cliente(tx, inst.temp.clone(), now)?;
            tx.put_cliente(cliente.clone());
            Ok((cliente, true))
        }
    }
}

fn resolve_conexion(
    router: &Router,
    commitments: &Commitments,
    req: ConexionRequest,
) -> Result<Conexion, CoreError> {
    match req {
        ConexionRequest::Ipoe { ip } => {
            let ip_asignada = allocation::resolve(router, commitments, ip).inspect_err(|e| {
                warn!(router = %router.nombre, error = %e, "address commit rejected");
            })?;
            Ok(Conexion::Ipoe { ip_asignada })
        }
        ConexionRequest::Pppoe {
            usuario,
            password,
            remote_address,
        } => {
            let usuario = usuario.trim().to_owned();
            if usuario.is_empty() || password.expose_secret().is_empty() {
                return Err(CoreError::MissingCredentials);
            }
            let remote_address = remote_address
                .map(|addr| allocation::ensure_available(router, commitments, addr))
                .transpose()
                .inspect_err(|e| {
                    warn!(router = %router.nombre, error = %e, "address commit rejected");
                })?;
            Ok(Conexion::Pppoe {
                usuario,
                password,
                remote_address,
            })
        }
    }
}

// ── Contract maintenance ───────────────────────────────────────────

/// Change a contract's status. Reviving a cancelled contract re-checks
/// its address, which may have been handed to someone else meanwhile.
pub fn set_contrato_estado(
    tx: &mut Transaction<'_>,
    id: EntityId,
    estado: EstadoContrato,
    now: DateTime<Utc>,
) -> Result<Contrato, CoreError> {
    let mut contrato = tx.contrato(id)?;
    if contrato.estado == estado {
        return Ok(contrato);
    }

    if !contrato.estado.holds_address() && estado.holds_address() {
        if let Some(addr) = contrato.conexion.committed_address() {
            let router = tx.router(contrato.router_id)?;
            let commitments = tx.commitments(router.id, Some(contrato.id));
            allocation::ensure_available(&router, &commitments, addr)?;
        }
    }

    debug!(contrato = %contrato.numero_contrato, from = %contrato.estado, to = %estado, "contract status changed");
    contrato.estado = estado;
    contrato.updated_at = now;
    tx.put_contrato(contrato.clone());
    Ok(contrato)
}

/// Move a contract to another address on its own router. Connection
/// mode is preserved; dynamic PPPoE contracts become fixed.
pub fn reassign_address(
    tx: &mut Transaction<'_>,
    id: EntityId,
    address: std::net::Ipv4Addr,
    now: DateTime<Utc>,
) -> Result<Contrato, CoreError> {
    let mut contrato = tx.contrato(id)?;
    if contrato.estado == EstadoContrato::Cancelado {
        return Err(CoreError::validation(format!(
            "contract {} is cancelled; revive it before reassigning",
            contrato.numero_contrato
        )));
    }
    let router = tx.router(contrato.router_id)?;
    let commitments = tx.commitments(router.id, Some(contrato.id));
    allocation::ensure_available(&router, &commitments, address)?;

    info!(
        contrato = %contrato.numero_contrato,
        from = ?contrato.conexion.committed_address(),
        to = %address,
        "address reassigned"
    );
    contrato.conexion = contrato.conexion.with_address(address);
    contrato.updated_at = now;
    tx.put_contrato(contrato.clone());
    Ok(contrato)
}
