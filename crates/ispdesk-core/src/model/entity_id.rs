// ── Core identity types ──
//
// EntityId is the surrogate key of every stored entity. Natural keys
// (identification numbers, contract numbers, router management IPs)
// live on the entities themselves and are indexed by the store.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical identifier for any back-office entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Mint a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

impl From<Uuid> for EntityId {
    fn from(u: Uuid) -> Self {
        Self(u)
    }
}

// ── Document numbers ────────────────────────────────────────────────

/// Human-facing document number prefix, one per numbered entity type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberKind {
    Instalacion,
    Contrato,
}

impl NumberKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Instalacion => "INS",
            Self::Contrato => "CTR",
        }
    }

    /// Format a document number: `PREFIX-YYYYMMDD-NNNN`.
    ///
    /// `seq` comes from a monotonic per-kind counter, so two numbers of
    /// the same kind never collide even across days.
    pub fn format(self, date: chrono::NaiveDate, seq: u64) -> String {
        format!("{}-{}-{seq:04}", self.prefix(), date.format("%Y%m%d"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn entity_id_round_trips_through_display() {
        let id = EntityId::new();
        let parsed: EntityId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn entity_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<EntityId>().is_err());
    }

    #[test]
    fn entity_id_trims_whitespace() {
        let id: EntityId = " 550e8400-e29b-41d4-a716-446655440000 ".parse().unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn document_numbers_are_prefixed_and_padded() {
        let date = NaiveDate::from_ymd_opt(2026, 2, 5).unwrap();
        assert_eq!(NumberKind::Contrato.format(date, 1), "CTR-20260205-0001");
        assert_eq!(NumberKind::Instalacion.format(date, 12345), "INS-20260205-12345");
    }
}
