// ── Address allocation ──
//
// Allocation is a pure function of (router pool, current commitments).
// Suggesting an address reserves nothing; the provisioning transaction
// re-runs the same checks against fresh commitments before writing.

use std::collections::HashMap;
use std::net::Ipv4Addr;

use serde::Serialize;
use tracing::debug;

use crate::error::CoreError;
use crate::model::{Contrato, EntityId, Router};

// ── Commitments ─────────────────────────────────────────────────────

/// Addresses held by live contracts on one router, with the holder's
/// contract number.
///
/// IPoE `ip_asignada` and fixed PPPoE `remote_address` share this one
/// namespace. Cancelled contracts and dynamic PPPoE sessions contribute
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct Commitments {
    held: HashMap<Ipv4Addr, String>,
}

impl Commitments {
    /// Collect commitments from `contratos`, keeping only those on
    /// `router_id` and skipping `exclude`.
    pub fn collect<'a, I>(router_id: EntityId, contratos: I, exclude: Option<EntityId>) -> Self
    where
        I: IntoIterator<Item = &'a Contrato>,
    {
        let held = contratos
            .into_iter()
            .filter(|c| c.router_id == router_id && Some(c.id) != exclude)
            .filter_map(|c| {
                c.committed_address()
                    .map(|addr| (addr, c.numero_contrato.clone()))
            })
            .collect();
        Self { held }
    }

    /// Contract number holding `address`, if any.
    pub fn holder(&self, address: Ipv4Addr) -> Option<&str> {
        self.held.get(&address).map(String::as_str)
    }

    pub fn is_committed(&self, address: Ipv4Addr) -> bool {
        self.held.contains_key(&address)
    }

    pub fn len(&self) -> usize {
        self.held.len()
    }

    pub fn is_empty(&self) -> bool {
        self.held.is_empty()
    }
}

// ── Operations ──────────────────────────────────────────────────────

/// Result of an availability check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Availability {
    pub address: Ipv4Addr,
    pub available: bool,
    pub conflicting_contract_number: Option<String>,
}

/// First pool host not held by any live contract: CIDR list order, then
/// ascending within each block.
pub fn suggest_next(router: &Router, commitments: &Commitments) -> Result<Ipv4Addr, CoreError> {
    let found = router
        .cidr_disponibles
        .hosts()
        .find(|addr| !commitments.is_committed(*addr));

    match found {
        Some(addr) => {
            debug!(router = %router.nombre, %addr, "suggested next free address");
            Ok(addr)
        }
        None => Err(CoreError::PoolExhausted {
            router: router.nombre.clone(),
        }),
    }
}

/// Whether `address` may be committed on `router`.
///
/// Fails with `AddressOutOfPool` for anything that is not an assignable
/// host of the pool (outside every block, or a network/broadcast address).
pub fn check_available(
    router: &Router,
    commitments: &Commitments,
    address: Ipv4Addr,
) -> Result<Availability, CoreError> {
    if !router.cidr_disponibles.is_host(address) {
        return Err(CoreError::AddressOutOfPool {
            address,
            router: router.nombre.clone(),
        });
    }
    let holder = commitments.holder(address).map(str::to_owned);
    Ok(Availability {
        address,
        available: holder.is_none(),
        conflicting_contract_number: holder,
    })
}

/// Authoritative form of [`check_available`]: a held address becomes
/// `AddressConflict`.
pub fn ensure_available(
    router: &Router,
    commitments: &Commitments,
    address: Ipv4Addr,
) -> Result<Ipv4Addr, CoreError> {
    let availability = check_available(router, commitments, address)?;
    match availability.conflicting_contract_number {
        Some(contract_number) => Err(CoreError::AddressConflict {
            address,
            contract_number,
        }),
        None => Ok(address),
    }
}

/// `requested` if given and free, else the next free address.
pub fn resolve(
    router: &Router,
    commitments: &Commitments,
    requested: Option<Ipv4Addr>,
) -> Result<Ipv4Addr, CoreError> {
    match requested {
        Some(addr) => ensure_available(router, commitments, addr),
        None => suggest_next(router, commitments),
    }
}

// ── Router projection ───────────────────────────────────────────────

/// Read-only summary of a router's pool for the device layer.
#[derive(Debug, Clone, Serialize)]
pub struct PoolSummary {
    pub router: String,
    pub pool_name: String,
    /// One `first-last` host range per CIDR block, in list order.
    pub ranges: Vec<String>,
    pub capacity: u64,
    pub committed: usize,
}

impl PoolSummary {
    pub fn new(router: &Router, commitments: &Commitments) -> Self {
        let ranges = router
            .cidr_disponibles
            .blocks()
            .iter()
            .map(|block| {
                let (first, last) = block.host_range();
                format!("{first}-{last}")
            })
            .collect();
        Self {
            router: router.nombre.clone(),
            pool_name: router.pool_name(),
            ranges,
            capacity: router.cidr_disponibles.capacity(),
            committed: commitments.len(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cidr::AddressPool;
    use crate::model::{Conexion, EstadoContrato};
    use chrono::{NaiveDate, Utc};
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn router(pool: &str) -> Router {
        Router {
            id: EntityId::new(),
            nombre: "Nodo Centro".into(),
            ip: ip("10.255.0.1"),
            usuario: "api".into(),
            puerto: 8728,
            ssl: false,
            is_active: true,
            cidr_disponibles: AddressPool::parse(pool).unwrap(),
            identity: None,
            created_at: Utc::now(),
        }
    }

    fn contrato(router: &Router, numero: &str, conexion: Conexion) -> Contrato {
        Contrato {
            id: EntityId::new(),
            numero_contrato: numero.into(),
            cliente_id: EntityId::new(),
            plan_id: EntityId::new(),
            router_id: router.id,
            fecha_inicio: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            dia_facturacion: 1,
            estado: EstadoContrato::Activo,
            conexion,
            notas: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn ipoe(addr: &str) -> Conexion {
        Conexion::Ipoe {
            ip_asignada: ip(addr),
        }
    }

    fn pppoe(remote: Option<&str>) -> Conexion {
        Conexion::Pppoe {
            usuario: "user".into(),
            password: SecretString::from("pw".to_string()),
            remote_address: remote.map(ip),
        }
    }

    #[test]
    fn suggest_skips_network_broadcast_and_committed() {
        let r = router("192.168.1.0/30");
        let held = [contrato(&r, "CTR-1", ipoe("192.168.1.1"))];
        let commitments = Commitments::collect(r.id, &held, None);
        assert_eq!(suggest_next(&r, &commitments).unwrap(), ip("192.168.1.2"));
    }

    #[test]
    fn exhausted_pool_fails() {
        let r = router("192.168.1.0/30");
        let held = [
            contrato(&r, "CTR-1", ipoe("192.168.1.1")),
            contrato(&r, "CTR-2", pppoe(Some("192.168.1.2"))),
        ];
        let commitments = Commitments::collect(r.id, &held, None);
        assert!(matches!(
            suggest_next(&r, &commitments),
            Err(CoreError::PoolExhausted { .. })
        ));
    }

    #[test]
    fn suggestion_moves_to_next_block_in_list_order() {
        let r = router("10.0.0.0/30,192.168.5.0/24");
        let held = [
            contrato(&r, "CTR-1", ipoe("10.0.0.1")),
            contrato(&r, "CTR-2", ipoe("10.0.0.2")),
        ];
        let commitments = Commitments::collect(r.id, &held, None);
        assert_eq!(suggest_next(&r, &commitments).unwrap(), ip("192.168.5.1"));
    }

    #[test]
    fn ipoe_and_fixed_pppoe_share_namespace() {
        let r = router("10.0.0.0/24");
        let held = [contrato(&r, "CTR-7", pppoe(Some("10.0.0.5")))];
        let commitments = Commitments::collect(r.id, &held, None);

        let err = ensure_available(&r, &commitments, ip("10.0.0.5")).unwrap_err();
        match err {
            CoreError::AddressConflict {
                address,
                contract_number,
            } => {
                assert_eq!(address, ip("10.0.0.5"));
                assert_eq!(contract_number, "CTR-7");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn dynamic_pppoe_and_cancelled_contracts_hold_nothing() {
        let r = router("10.0.0.0/30");
        let mut cancelled = contrato(&r, "CTR-1", ipoe("10.0.0.1"));
        cancelled.estado = EstadoContrato::Cancelado;
        let held = [cancelled, contrato(&r, "CTR-2", pppoe(None))];
        let commitments = Commitments::collect(r.id, &held, None);
        assert!(commitments.is_empty());
        assert_eq!(suggest_next(&r, &commitments).unwrap(), ip("10.0.0.1"));
    }

    #[test]
    fn other_routers_do_not_conflict() {
        let r1 = router("10.0.0.0/24");
        let r2 = router("10.0.0.0/24");
        let held = [contrato(&r2, "CTR-9", ipoe("10.0.0.5"))];
        let commitments = Commitments::collect(r1.id, &held, None);
        assert!(
            check_available(&r1, &commitments, ip("10.0.0.5"))
                .unwrap()
                .available
        );
    }

    #[test]
    fn out_of_pool_and_reserved_addresses_are_rejected() {
        let r = router("192.168.1.0/24");
        let commitments = Commitments::default();
        for addr in ["192.168.2.1", "192.168.1.0", "192.168.1.255"] {
            assert!(matches!(
                check_available(&r, &commitments, ip(addr)),
                Err(CoreError::AddressOutOfPool { .. })
            ));
        }
    }

    #[test]
    fn exclusion_ignores_own_address() {
        let r = router("10.0.0.0/24");
        let own = contrato(&r, "CTR-1", ipoe("10.0.0.5"));
        let held = [own.clone()];
        let commitments = Commitments::collect(r.id, &held, Some(own.id));
        let availability = check_available(&r, &commitments, ip("10.0.0.5")).unwrap();
        assert!(availability.available);
    }

    #[test]
    fn check_is_idempotent() {
        let r = router("10.0.0.0/24");
        let held = [contrato(&r, "CTR-1", ipoe("10.0.0.5"))];
        let commitments = Commitments::collect(r.id, &held, None);
        let first = check_available(&r, &commitments, ip("10.0.0.5")).unwrap();
        let second = check_available(&r, &commitments, ip("10.0.0.5")).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.conflicting_contract_number.as_deref(), Some("CTR-1"));
    }

    #[test]
    fn suggestion_is_always_available() {
        for pool in ["10.0.0.0/29", "10.0.0.0/31", "10.0.0.7/32,10.0.1.0/30"] {
            let r = router(pool);
            let mut held = Vec::new();
            let capacity = r.cidr_disponibles.capacity();
            for n in 0..capacity {
                let commitments = Commitments::collect(r.id, &held, None);
                let next = suggest_next(&r, &commitments).unwrap();
                assert!(check_available(&r, &commitments, next).unwrap().available);
                held.push(contrato(&r, &format!("CTR-{n}"), ipoe(&next.to_string())));
            }
            let commitments = Commitments::collect(r.id, &held, None);
            assert!(suggest_next(&r, &commitments).is_err());
        }
    }

    #[test]
    fn pool_summary_uses_host_ranges() {
        let r = router("192.168.1.0/24,10.0.0.0/30");
        let held = [contrato(&r, "CTR-1", ipoe("10.0.0.1"))];
        let summary = PoolSummary::new(&r, &Commitments::collect(r.id, &held, None));
        assert_eq!(
            summary.ranges,
            vec!["192.168.1.1-192.168.1.254", "10.0.0.1-10.0.0.2"]
        );
        assert_eq!(summary.capacity, 256);
        assert_eq!(summary.committed, 1);
        assert_eq!(summary.pool_name, "pool-nodo-centro");
    }
}
