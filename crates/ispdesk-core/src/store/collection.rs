// ── Generic entity collection ──
//
// Concurrent storage with O(1) lookups by natural key and by id, plus a
// sorted snapshot rebuilt on every mutation so list reads never lock.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use super::Stored;
use crate::model::EntityId;

/// A concurrent collection for a single entity type.
///
/// Entities are keyed by their natural key (identification number,
/// contract number, management IP, ...) with a secondary id index.
/// Natural keys never change once an entity is stored.
pub(crate) struct EntityCollection<T: Stored> {
    /// Primary storage: natural key -> entity.
    by_key: DashMap<String, Arc<T>>,

    /// Secondary index: EntityId -> natural key.
    id_to_key: DashMap<EntityId, String>,

    /// Full snapshot ordered by key, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Stored> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            by_key: DashMap::new(),
            id_to_key: DashMap::new(),
            snapshot,
        }
    }

    /// Insert or replace an entity. Returns `true` if the key was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let key = entity.natural_key();
        let id = entity.id();
        let is_new = self.by_key.insert(key.clone(), Arc::new(entity)).is_none();
        self.id_to_key.insert(id, key);
        self.rebuild_snapshot();
        is_new
    }

    /// Replace the whole contents, e.g. when loading from disk.
    pub(crate) fn replace_all(&self, entities: Vec<T>) {
        self.by_key.clear();
        self.id_to_key.clear();
        for entity in entities {
            let key = entity.natural_key();
            self.id_to_key.insert(entity.id(), key.clone());
            self.by_key.insert(key, Arc::new(entity));
        }
        self.rebuild_snapshot();
    }

    pub(crate) fn get_by_key(&self, key: &str) -> Option<Arc<T>> {
        self.by_key.get(key).map(|r| Arc::clone(r.value()))
    }

    pub(crate) fn get_by_id(&self, id: &EntityId) -> Option<Arc<T>> {
        let key = self.id_to_key.get(id)?;
        self.by_key
            .get(key.value().as_str())
            .map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.by_key.len()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn rebuild_snapshot(&self) {
        let mut values: Vec<(String, Arc<T>)> = self
            .by_key
            .iter()
            .map(|r| (r.key().clone(), Arc::clone(r.value())))
            .collect();
        values.sort_by(|a, b| a.0.cmp(&b.0));
        let values: Vec<Arc<T>> = values.into_iter().map(|(_, v)| v).collect();
        // `send_modify` updates unconditionally, even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }
}
