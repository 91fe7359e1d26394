// ── Staged write transaction ──
//
// Reads see staged writes first, then committed state. Nothing reaches
// the collections until `DataStore::transaction` decides to commit, so a
// failed closure leaves no trace.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use chrono::NaiveDate;

use super::collection::EntityCollection;
use super::data_store::DataStore;
use super::persist::{STORE_FORMAT_VERSION, StoreSnapshot};
use super::{Sequences, Stored};
use crate::allocation::Commitments;
use crate::error::CoreError;
use crate::model::{Cliente, Contrato, EntityId, Instalacion, NumberKind, Plan, Router};

// ── Layer ───────────────────────────────────────────────────────────

/// Staged overlay on top of one committed collection.
pub(crate) struct Layer<'a, T: Stored> {
    base: &'a EntityCollection<T>,
    staged: HashMap<EntityId, T>,
}

impl<'a, T: Stored> Layer<'a, T> {
    fn new(base: &'a EntityCollection<T>) -> Self {
        Self {
            base,
            staged: HashMap::new(),
        }
    }

    fn get(&self, id: EntityId) -> Option<T> {
        self.staged
            .get(&id)
            .cloned()
            .or_else(|| self.base.get_by_id(&id).map(|e| (*e).clone()))
    }

    fn get_by_key(&self, key: &str) -> Option<T> {
        self.staged
            .values()
            .find(|e| e.natural_key() == key)
            .cloned()
            .or_else(|| self.base.get_by_key(key).map(|e| (*e).clone()))
    }

    fn put(&mut self, entity: T) {
        self.staged.insert(entity.id(), entity);
    }

    /// Committed values overridden by staged ones, plus new staged values.
    fn merged(&self) -> Vec<T> {
        let mut out: Vec<T> = self
            .base
            .snapshot()
            .iter()
            .map(|e| {
                self.staged
                    .get(&e.id())
                    .cloned()
                    .unwrap_or_else(|| (**e).clone())
            })
            .collect();
        out.extend(
            self.staged
                .values()
                .filter(|e| self.base.get_by_id(&e.id()).is_none())
                .cloned(),
        );
        out
    }

    fn is_dirty(&self) -> bool {
        !self.staged.is_empty()
    }

    fn commit(self) {
        for entity in self.staged.into_values() {
            self.base.upsert(entity);
        }
    }
}

// ── Transaction ─────────────────────────────────────────────────────

/// One unit of work against the store. Obtained only through
/// [`DataStore::transaction`], which holds the store's write lock for the
/// transaction's whole lifetime.
pub struct Transaction<'a> {
    sequences: Sequences,
    clientes: Layer<'a, Cliente>,
    planes: Layer<'a, Plan>,
    routers: Layer<'a, Router>,
    contratos: Layer<'a, Contrato>,
    instalaciones: Layer<'a, Instalacion>,
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(store: &'a DataStore, sequences: Sequences) -> Self {
        Self {
            sequences,
            clientes: Layer::new(&store.clientes),
            planes: Layer::new(&store.planes),
            routers: Layer::new(&store.routers),
            contratos: Layer::new(&store.contratos),
            instalaciones: Layer::new(&store.instalaciones),
        }
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn cliente(&self, id: EntityId) -> Result<Cliente, CoreError> {
        found(self.clientes.get(id), id)
    }

    pub fn cliente_by_identificacion(&self, numero: &str) -> Option<Cliente> {
        self.clientes.get_by_key(numero)
    }

    pub fn plan(&self, id: EntityId) -> Result<Plan, CoreError> {
        found(self.planes.get(id), id)
    }

    pub fn plan_by_nombre(&self, nombre: &str) -> Option<Plan> {
        self.planes.get_by_key(nombre)
    }

    pub fn router(&self, id: EntityId) -> Result<Router, CoreError> {
        found(self.routers.get(id), id)
    }

    pub fn router_by_ip(&self, ip: Ipv4Addr) -> Option<Router> {
        self.routers.get_by_key(&ip.to_string())
    }

    pub fn contrato(&self, id: EntityId) -> Result<Contrato, CoreError> {
        found(self.contratos.get(id), id)
    }

    pub fn instalacion(&self, id: EntityId) -> Result<Instalacion, CoreError> {
        found(self.instalaciones.get(id), id)
    }

    /// Addresses committed on `router_id`, including writes staged in this
    /// transaction.
    pub fn commitments(&self, router_id: EntityId, exclude: Option<EntityId>) -> Commitments {
        Commitments::collect(router_id, &self.contratos.merged(), exclude)
    }

    /// Next document number for `kind`, dated `date`.
    pub fn next_number(&mut self, kind: NumberKind, date: NaiveDate) -> String {
        let seq = self.sequences.advance(kind);
        kind.format(date, seq)
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub fn put_cliente(&mut self, cliente: Cliente) {
        self.clientes.put(cliente);
    }

    pub fn put_plan(&mut self, plan: Plan) {
        self.planes.put(plan);
    }

    pub fn put_router(&mut self, router: Router) {
        self.routers.put(router);
    }

    pub fn put_contrato(&mut self, contrato: Contrato) {
        self.contratos.put(contrato);
    }

    pub fn put_instalacion(&mut self, instalacion: Instalacion) {
        self.instalaciones.put(instalacion);
    }

    // ── Commit support ───────────────────────────────────────────────

    pub(crate) fn is_dirty(&self) -> bool {
        self.clientes.is_dirty()
            || self.planes.is_dirty()
            || self.routers.is_dirty()
            || self.contratos.is_dirty()
            || self.instalaciones.is_dirty()
    }

    /// The store as it will look after commit.
    pub(crate) fn preview(&self) -> StoreSnapshot {
        StoreSnapshot {
            version: STORE_FORMAT_VERSION,
            sequences: self.sequences,
            clientes: self.clientes.merged(),
            planes: self.planes.merged(),
            routers: self.routers.merged(),
            contratos: self.contratos.merged(),
            instalaciones: self.instalaciones.merged(),
        }
    }

    /// Apply staged writes and return the advanced sequences.
    ///
    /// Order matters: referenced collections go first.
    pub(crate) fn commit(self) -> Sequences {
        self.clientes.commit();
        self.planes.commit();
        self.routers.commit();
        self.contratos.commit();
        self.instalaciones.commit();
        self.sequences
    }
}

fn found<T: Stored>(entity: Option<T>, id: EntityId) -> Result<T, CoreError> {
    entity.ok_or_else(|| CoreError::not_found(T::ENTITY, id))
}
