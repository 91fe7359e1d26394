// ── Central data store ──
//
// Reads are lock-free against the collections. Writes go through
// `transaction`, which serialises writers on one lock, stages every
// change and applies it only when the whole unit of work succeeded.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use super::collection::EntityCollection;
use super::persist::{self, STORE_FORMAT_VERSION, StoreSnapshot};
use super::transaction::Transaction;
use super::{Sequences, Stored};
use crate::allocation::Commitments;
use crate::error::CoreError;
use crate::model::{Cliente, Contrato, EntityId, Instalacion, Plan, Router};

/// Store for all back-office entities, optionally backed by a JSON file.
pub struct DataStore {
    pub(crate) clientes: EntityCollection<Cliente>,
    pub(crate) planes: EntityCollection<Plan>,
    pub(crate) routers: EntityCollection<Router>,
    pub(crate) contratos: EntityCollection<Contrato>,
    pub(crate) instalaciones: EntityCollection<Instalacion>,
    /// Write lock. Also owns the committed document-number counters.
    writer: Mutex<Sequences>,
    path: Option<PathBuf>,
}

impl DataStore {
    /// Empty, memory-only store.
    pub fn new() -> Self {
        Self {
            clientes: EntityCollection::new(),
            planes: EntityCollection::new(),
            routers: EntityCollection::new(),
            contratos: EntityCollection::new(),
            instalaciones: EntityCollection::new(),
            writer: Mutex::new(Sequences::default()),
            path: None,
        }
    }

    /// Store backed by `path`. Loads the file if it exists; every
    /// committed transaction rewrites it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let mut store = Self::new();
        if let Some(snapshot) = persist::load(&path)? {
            store.restore(snapshot);
        }
        debug!(
            path = %path.display(),
            clientes = store.clientes.len(),
            contratos = store.contratos.len(),
            instalaciones = store.instalaciones.len(),
            "store opened"
        );
        store.path = Some(path);
        Ok(store)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn restore(&mut self, snapshot: StoreSnapshot) {
        self.clientes.replace_all(snapshot.clientes);
        self.planes.replace_all(snapshot.planes);
        self.routers.replace_all(snapshot.routers);
        self.contratos.replace_all(snapshot.contratos);
        self.instalaciones.replace_all(snapshot.instalaciones);
        // Exclusive borrow: no other writer can exist yet.
        match self.writer.get_mut() {
            Ok(seq) => *seq = snapshot.sequences,
            Err(poisoned) => *poisoned.into_inner() = snapshot.sequences,
        }
    }

    // ── Transactions ─────────────────────────────────────────────────

    /// Run `f` as one atomic unit of work.
    ///
    /// Holds the write lock for the duration, so concurrent transactions
    /// observe each other's results in full or not at all. If `f` fails,
    /// or the snapshot cannot be written, nothing is applied.
    ///
    /// Lock-free readers are not isolated from a commit in progress: each
    /// collection is published in turn. Referenced entities (customers,
    /// plans, routers) are published before the contracts and installations
    /// that point at them, so a reader that loads contracts first and
    /// customers second never finds a dangling `cliente_id`.
    pub fn transaction<R, F>(&self, f: F) -> Result<R, CoreError>
    where
        F: FnOnce(&mut Transaction<'_>) -> Result<R, CoreError>,
    {
        let mut sequences = self
            .writer
            .lock()
            .map_err(|_| CoreError::Internal("store write lock poisoned".into()))?;

        let mut tx = Transaction::new(self, *sequences);
        let result = match f(&mut tx) {
            Ok(result) => result,
            Err(e) => {
                debug!(error = %e, "transaction rolled back");
                return Err(e);
            }
        };

        if !tx.is_dirty() {
            return Ok(result);
        }

        if let Some(ref path) = self.path {
            if let Err(e) = persist::save(path, &tx.preview()) {
                warn!(error = %e, path = %path.display(), "store write failed, transaction discarded");
                return Err(e);
            }
        }

        *sequences = tx.commit();
        Ok(result)
    }

    /// Current state as a serialisable snapshot.
    pub fn export(&self) -> Result<StoreSnapshot, CoreError> {
        let sequences = *self
            .writer
            .lock()
            .map_err(|_| CoreError::Internal("store write lock poisoned".into()))?;
        Ok(StoreSnapshot {
            version: STORE_FORMAT_VERSION,
            sequences,
            clientes: owned(&self.clientes),
            planes: owned(&self.planes),
            routers: owned(&self.routers),
            contratos: owned(&self.contratos),
            instalaciones: owned(&self.instalaciones),
        })
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn clientes_snapshot(&self) -> Arc<Vec<Arc<Cliente>>> {
        self.clientes.snapshot()
    }

    pub fn planes_snapshot(&self) -> Arc<Vec<Arc<Plan>>> {
        self.planes.snapshot()
    }

    pub fn routers_snapshot(&self) -> Arc<Vec<Arc<Router>>> {
        self.routers.snapshot()
    }

    pub fn contratos_snapshot(&self) -> Arc<Vec<Arc<Contrato>>> {
        self.contratos.snapshot()
    }

    pub fn instalaciones_snapshot(&self) -> Arc<Vec<Arc<Instalacion>>> {
        self.instalaciones.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn cliente_by_id(&self, id: &EntityId) -> Option<Arc<Cliente>> {
        self.clientes.get_by_id(id)
    }

    pub fn cliente_by_identificacion(&self, numero: &str) -> Option<Arc<Cliente>> {
        self.clientes.get_by_key(numero)
    }

    pub fn plan_by_id(&self, id: &EntityId) -> Option<Arc<Plan>> {
        self.planes.get_by_id(id)
    }

    pub fn router_by_id(&self, id: &EntityId) -> Option<Arc<Router>> {
        self.routers.get_by_id(id)
    }

    pub fn contrato_by_id(&self, id: &EntityId) -> Option<Arc<Contrato>> {
        self.contratos.get_by_id(id)
    }

    pub fn contrato_by_numero(&self, numero: &str) -> Option<Arc<Contrato>> {
        self.contratos.get_by_key(numero)
    }

    pub fn instalacion_by_id(&self, id: &EntityId) -> Option<Arc<Instalacion>> {
        self.instalaciones.get_by_id(id)
    }

    pub fn instalacion_by_numero(&self, numero: &str) -> Option<Arc<Instalacion>> {
        self.instalaciones.get_by_key(numero)
    }

    /// Committed addresses on `router_id` as of now. Advisory: may be
    /// stale by the time a transaction runs.
    pub fn commitments(&self, router_id: EntityId, exclude: Option<EntityId>) -> Commitments {
        let contratos = self.contratos.snapshot();
        Commitments::collect(router_id, contratos.iter().map(Arc::as_ref), exclude)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}

fn owned<T: Stored>(collection: &EntityCollection<T>) -> Vec<T> {
    collection.snapshot().iter().map(|e| (**e).clone()).collect()
}
