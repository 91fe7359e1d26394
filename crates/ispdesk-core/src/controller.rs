// ── Controller facade ──
//
// Owns the store and the single command-processor task. Writes are
// serialised through the command channel and each one runs as a store
// transaction; reads go straight to the store and are advisory.

use std::net::Ipv4Addr;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::access::{Access, AccessPolicy, Module, Role, RoleMatrix};
use crate::allocation::{self, Availability, PoolSummary};
use crate::command::{Command, CommandEnvelope, CommandResult};
use crate::config::CoreConfig;
use crate::directory;
use crate::error::CoreError;
use crate::model::{Cliente, Contrato, EntityId, Instalacion, Plan, Router};
use crate::provisioning;
use crate::store::DataStore;
use crate::validation::{self, IdentificationCheck};

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Every clone shares one
/// store and one processor task, so commands from any clone are applied
/// one at a time.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: CoreConfig,
    store: Arc<DataStore>,
    policy: Arc<dyn AccessPolicy>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    cancel: CancellationToken,
    task_handle: Mutex<Option<JoinHandle<()>>>,
}

impl Controller {
    /// Open the store and start the command processor with the stock
    /// role matrix. Must be called inside a Tokio runtime.
    pub fn open(config: CoreConfig) -> Result<Self, CoreError> {
        Self::with_policy(config, Arc::new(RoleMatrix))
    }

    /// As [`open`](Self::open), with a custom authorization policy.
    pub fn with_policy(
        config: CoreConfig,
        policy: Arc<dyn AccessPolicy>,
    ) -> Result<Self, CoreError> {
        let store = match config.data_path {
            Some(ref path) => DataStore::open(path)?,
            None => DataStore::new(),
        };
        let store = Arc::new(store);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(command_processor_task(
            Arc::clone(&store),
            command_rx,
            cancel.clone(),
        ));

        info!(
            role = %config.role,
            store = ?config.data_path,
            "controller ready"
        );

        Ok(Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                policy,
                command_tx,
                cancel,
                task_handle: Mutex::new(Some(handle)),
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.inner.config
    }

    pub fn role(&self) -> Role {
        self.inner.config.role
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    /// Stop the processor. Commands already queued are dropped and their
    /// callers see `ControllerClosed`.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        if let Some(handle) = self.inner.task_handle.lock().await.take() {
            let _ = handle.await;
        }
        debug!("controller shut down");
    }

    // ── Command execution ────────────────────────────────────────

    /// Authorize and run a write command; resolves once the store
    /// transaction has committed or rolled back.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.authorize(cmd.module(), Access::Write)?;

        let (tx, rx) = oneshot::channel();
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::ControllerClosed)?;

        rx.await.map_err(|_| CoreError::ControllerClosed)?
    }

    fn authorize(&self, module: Module, access: Access) -> Result<(), CoreError> {
        self.inner
            .policy
            .authorize(self.inner.config.role, module, access)
    }

    // ── Advisory checks ──────────────────────────────────────────

    /// Next free address on a router as of now. Reserves nothing.
    pub fn suggest_next_address(&self, router_id: EntityId) -> Result<Ipv4Addr, CoreError> {
        self.authorize(Module::Routers, Access::Read)?;
        let router = self.active_router(router_id)?;
        let commitments = self.inner.store.commitments(router.id, None);
        allocation::suggest_next(&router, &commitments)
    }

    /// Whether `address` is free on a router, ignoring `exclude`'s own
    /// address. Same logic as the commit-time check, on possibly stale data.
    pub fn check_address(
        &self,
        router_id: EntityId,
        address: Ipv4Addr,
        exclude: Option<EntityId>,
    ) -> Result<Availability, CoreError> {
        self.authorize(Module::Routers, Access::Read)?;
        let router = self.active_router(router_id)?;
        let commitments = self.inner.store.commitments(router.id, exclude);
        allocation::check_available(&router, &commitments, address)
    }

    pub fn identification_available(
        &self,
        numero: &str,
        exclude: Option<EntityId>,
    ) -> Result<IdentificationCheck, CoreError> {
        self.authorize(Module::Clientes, Access::Read)?;
        let numero = numero.trim();
        let holder = self.inner.store.cliente_by_identificacion(numero);
        Ok(validation::identification_available(
            numero,
            holder.as_deref(),
            exclude,
        ))
    }

    /// Pool ranges, capacity and committed count for the device layer.
    pub fn pool_summary(&self, router_id: EntityId) -> Result<PoolSummary, CoreError> {
        self.authorize(Module::Routers, Access::Read)?;
        let router = self.active_router(router_id)?;
        let commitments = self.inner.store.commitments(router.id, None);
        Ok(PoolSummary::new(&router, &commitments))
    }

    // ── Directory reads ──────────────────────────────────────────

    pub fn planes(&self) -> Result<Vec<Arc<Plan>>, CoreError> {
        self.authorize(Module::Planes, Access::Read)?;
        Ok(self.inner.store.planes_snapshot().to_vec())
    }

    /// Look up a plan by id or exact name.
    pub fn plan(&self, reference: &str) -> Result<Arc<Plan>, CoreError> {
        self.authorize(Module::Planes, Access::Read)?;
        let reference = reference.trim();
        parse_id(reference)
            .and_then(|id| self.inner.store.plan_by_id(&id))
            .or_else(|| {
                self.inner
                    .store
                    .planes_snapshot()
                    .iter()
                    .find(|p| p.nombre == reference)
                    .cloned()
            })
            .ok_or_else(|| CoreError::not_found("Plan", reference))
    }

    pub fn routers(&self) -> Result<Vec<Arc<Router>>, CoreError> {
        self.authorize(Module::Routers, Access::Read)?;
        Ok(self.inner.store.routers_snapshot().to_vec())
    }

    /// Look up a router by id, management address or exact name.
    pub fn router(&self, reference: &str) -> Result<Arc<Router>, CoreError> {
        self.authorize(Module::Routers, Access::Read)?;
        let reference = reference.trim();
        parse_id(reference)
            .and_then(|id| self.inner.store.router_by_id(&id))
            .or_else(|| {
                let ip = reference.parse::<Ipv4Addr>().ok();
                self.inner
                    .store
                    .routers_snapshot()
                    .iter()
                    .find(|r| Some(r.ip) == ip || r.nombre == reference)
                    .cloned()
            })
            .ok_or_else(|| CoreError::not_found("Router", reference))
    }

    fn router_by_id(&self, id: EntityId) -> Result<Arc<Router>, CoreError> {
        self.inner
            .store
            .router_by_id(&id)
            .ok_or_else(|| CoreError::not_found("Router", id))
    }

    fn active_router(&self, id: EntityId) -> Result<Arc<Router>, CoreError> {
        let router = self.router_by_id(id)?;
        directory::ensure_router_active(&router)?;
        Ok(router)
    }

    pub fn clientes(&self) -> Result<Vec<Arc<Cliente>>, CoreError> {
        self.authorize(Module::Clientes, Access::Read)?;
        Ok(self.inner.store.clientes_snapshot().to_vec())
    }

    /// Look up a customer by id or identification number.
    pub fn cliente(&self, reference: &str) -> Result<Arc<Cliente>, CoreError> {
        self.authorize(Module::Clientes, Access::Read)?;
        let reference = reference.trim();
        parse_id(reference)
            .and_then(|id| self.inner.store.cliente_by_id(&id))
            .or_else(|| self.inner.store.cliente_by_identificacion(reference))
            .ok_or_else(|| CoreError::not_found("Cliente", reference))
    }

    /// Contracts, optionally only those on one router.
    pub fn contratos(&self, router_id: Option<EntityId>) -> Result<Vec<Arc<Contrato>>, CoreError> {
        self.authorize(Module::Contratos, Access::Read)?;
        Ok(self
            .inner
            .store
            .contratos_snapshot()
            .iter()
            .filter(|c| router_id.is_none_or(|id| c.router_id == id))
            .cloned()
            .collect())
    }

    /// Look up a contract by id or contract number.
    pub fn contrato(&self, reference: &str) -> Result<Arc<Contrato>, CoreError> {
        self.authorize(Module::Contratos, Access::Read)?;
        let reference = reference.trim();
        parse_id(reference)
            .and_then(|id| self.inner.store.contrato_by_id(&id))
            .or_else(|| self.inner.store.contrato_by_numero(reference))
            .ok_or_else(|| CoreError::not_found("Contrato", reference))
    }

    pub fn instalaciones(&self) -> Result<Vec<Arc<Instalacion>>, CoreError> {
        self.authorize(Module::Instalaciones, Access::Read)?;
        Ok(self.inner.store.instalaciones_snapshot().to_vec())
    }

    /// Look up an installation by id or installation number.
    pub fn instalacion(&self, reference: &str) -> Result<Arc<Instalacion>, CoreError> {
        self.authorize(Module::Instalaciones, Access::Read)?;
        let reference = reference.trim();
        parse_id(reference)
            .and_then(|id| self.inner.store.instalacion_by_id(&id))
            .or_else(|| self.inner.store.instalacion_by_numero(reference))
            .ok_or_else(|| CoreError::not_found("Instalacion", reference))
    }
}

fn parse_id(reference: &str) -> Option<EntityId> {
    reference.parse().ok()
}

// ── Background tasks ─────────────────────────────────────────────

/// Single writer: applies commands one at a time, in arrival order.
async fn command_processor_task(
    store: Arc<DataStore>,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let store = Arc::clone(&store);
                // The transaction holds a std mutex and writes the store file.
                let command = envelope.command;
                let result = tokio::task::spawn_blocking(move || route_command(&store, command))
                    .await
                    .unwrap_or_else(|e| {
                        Err(CoreError::Internal(format!("command task failed: {e}")))
                    });
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Run one command as one store transaction.
fn route_command(store: &DataStore, cmd: Command) -> Result<CommandResult, CoreError> {
    let now = Utc::now();
    store.transaction(|tx| match cmd {
        // ── Plans ────────────────────────────────────────────────
        Command::CreatePlan(req) => directory::create_plan(tx, req, now).map(CommandResult::Plan),
        Command::DeactivatePlan { id } => {
            directory::deactivate_plan(tx, id).map(CommandResult::Plan)
        }

        // ── Routers ──────────────────────────────────────────────
        Command::CreateRouter(req) => {
            directory::create_router(tx, req, now).map(CommandResult::Router)
        }
        Command::DeactivateRouter { id } => {
            directory::deactivate_router(tx, id).map(CommandResult::Router)
        }

        // ── Customers ────────────────────────────────────────────
        Command::CreateCliente(req) => {
            directory::create_cliente(tx, req, now).map(CommandResult::Cliente)
        }
        Command::DeactivateCliente { id } => {
            directory::deactivate_cliente(tx, id).map(CommandResult::Cliente)
        }

        // ── Installations ────────────────────────────────────────
        Command::CreateSolicitud(req) => {
            directory::create_solicitud(tx, req, now).map(CommandResult::Instalacion)
        }
        Command::TransitionInstalacion { id, estado } => {
            directory::transition_instalacion(tx, id, estado, now).map(CommandResult::Instalacion)
        }
        Command::RescheduleInstalacion { id, update } => {
            directory::reschedule_instalacion(tx, id, update, now).map(CommandResult::Instalacion)
        }
        Command::CancelInstalacion { id, motivo } => {
            directory::cancel_instalacion(tx, id, &motivo, now).map(CommandResult::Instalacion)
        }
        Command::ActivateInstalacion(req) => provisioning::activate(tx, req, now)
            .map(|activation| CommandResult::Activation(Box::new(activation))),

        // ── Contracts ────────────────────────────────────────────
        Command::SetContratoEstado { id, estado } => {
            provisioning::set_contrato_estado(tx, id, estado, now).map(CommandResult::Contrato)
        }
        Command::ReassignAddress { id, address } => {
            provisioning::reassign_address(tx, id, address, now).map(CommandResult::Contrato)
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn advisory_reads_are_role_gated() {
        tokio_test::block_on(async {
            let ctrl = Controller::open(CoreConfig::in_memory().role(Role::Soporte)).unwrap();
            assert!(matches!(
                ctrl.suggest_next_address(EntityId::new()),
                Err(CoreError::PermissionDenied { .. })
            ));
            assert!(ctrl.identification_available("112345678", None).is_ok());
        });
    }

    #[test]
    fn unknown_references_are_not_found() {
        tokio_test::block_on(async {
            let ctrl = Controller::open(CoreConfig::in_memory()).unwrap();
            for err in [
                ctrl.check_address(EntityId::new(), Ipv4Addr::new(10, 0, 0, 1), None)
                    .unwrap_err(),
                ctrl.instalacion("INS-20260101-0001").unwrap_err(),
                ctrl.cliente("112345678").unwrap_err(),
            ] {
                assert!(matches!(err, CoreError::NotFound { .. }), "{err:?}");
            }
        });
    }
}
