// ── In-memory store with transactional writes ──

mod collection;
mod data_store;
mod persist;
mod transaction;

pub use data_store::DataStore;
pub use persist::{STORE_FORMAT_VERSION, StoreSnapshot};
pub use transaction::Transaction;

use serde::{Deserialize, Serialize};

use crate::model::{Cliente, Contrato, EntityId, Instalacion, NumberKind, Plan, Router};

/// An entity the store can hold: a surrogate id plus an immutable
/// natural key.
pub trait Stored: Clone + Send + Sync + 'static {
    /// Human name used in `NotFound` errors.
    const ENTITY: &'static str;

    fn id(&self) -> EntityId;

    fn natural_key(&self) -> String;
}

impl Stored for Cliente {
    const ENTITY: &'static str = "Cliente";

    fn id(&self) -> EntityId {
        self.id
    }

    fn natural_key(&self) -> String {
        self.datos.numero_identificacion.clone()
    }
}

impl Stored for Plan {
    const ENTITY: &'static str = "Plan";

    fn id(&self) -> EntityId {
        self.id
    }

    fn natural_key(&self) -> String {
        self.nombre.clone()
    }
}

impl Stored for Router {
    const ENTITY: &'static str = "Router";

    fn id(&self) -> EntityId {
        self.id
    }

    fn natural_key(&self) -> String {
        self.ip.to_string()
    }
}

impl Stored for Contrato {
    const ENTITY: &'static str = "Contrato";

    fn id(&self) -> EntityId {
        self.id
    }

    fn natural_key(&self) -> String {
        self.numero_contrato.clone()
    }
}

impl Stored for Instalacion {
    const ENTITY: &'static str = "Instalacion";

    fn id(&self) -> EntityId {
        self.id
    }

    fn natural_key(&self) -> String {
        self.numero_instalacion.clone()
    }
}

/// Monotonic document-number counters, one per numbered entity type.
/// Persisted with the store so numbers never repeat across restarts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences {
    pub instalacion: u64,
    pub contrato: u64,
}

impl Sequences {
    /// Advance the counter for `kind` and return the new value.
    pub fn advance(&mut self, kind: NumberKind) -> u64 {
        let counter = match kind {
            NumberKind::Instalacion => &mut self.instalacion,
            NumberKind::Contrato => &mut self.contrato,
        };
        *counter += 1;
        *counter
    }
}
