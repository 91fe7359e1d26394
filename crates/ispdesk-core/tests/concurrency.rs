#![allow(clippy::unwrap_used)]

mod common;

use std::sync::Arc;

use chrono::Utc;
use common::*;

use ispdesk_core::{ClienteSource, CoreError, DataStore, provisioning};

const ATTEMPTS: u32 = 8;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_activations_for_one_address_have_one_winner() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;

    let mut requests = Vec::new();
    for n in 0..ATTEMPTS {
        requests.push(request(&ctrl, &plan, persona(n)).await);
    }

    let mut handles = Vec::new();
    for inst in requests {
        let ctrl = ctrl.clone();
        let router_id = router.id;
        handles.push(tokio::spawn(async move {
            activate(
                &ctrl,
                activation(&inst, ClienteSource::Crear, router_id, ipoe(Some("10.0.0.5"))),
            )
            .await
        }));
    }

    let mut winners = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => winners += 1,
            Err(CoreError::AddressConflict { address, .. }) => {
                assert_eq!(address, ip("10.0.0.5"));
            }
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
    assert_eq!(winners, 1);

    let holders: Vec<_> = ctrl
        .contratos(Some(router.id))
        .unwrap()
        .iter()
        .filter(|c| c.committed_address() == Some(ip("10.0.0.5")))
        .map(|c| c.numero_contrato.clone())
        .collect();
    assert_eq!(holders.len(), 1);
    // Losers left no customers behind.
    assert_eq!(ctrl.clientes().unwrap().len(), 1);
}

#[test]
fn store_transactions_serialise_across_threads() {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let (ctrl, router, requests) = runtime.block_on(async {
        let ctrl = controller();
        let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
        let plan = create_plan(&ctrl, "Hogar 100").await;
        let mut requests = Vec::new();
        for n in 0..ATTEMPTS {
            requests.push(request(&ctrl, &plan, persona(n)).await);
        }
        (ctrl, router, requests)
    });

    // Bypass the command channel: raw transactions racing on OS threads.
    let store: Arc<DataStore> = Arc::clone(ctrl.store());
    let threads: Vec<_> = requests
        .into_iter()
        .map(|inst| {
            let store = Arc::clone(&store);
            let router_id = router.id;
            std::thread::spawn(move || {
                store.transaction(|tx| {
                    provisioning::activate(
                        tx,
                        activation(&inst, ClienteSource::Crear, router_id, ipoe(Some("10.0.0.5"))),
                        Utc::now(),
                    )
                })
            })
        })
        .collect();

    let results: Vec<_> = threads.into_iter().map(|t| t.join().unwrap()).collect();
    let winners = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    assert!(
        results
            .iter()
            .filter_map(|r| r.as_ref().err())
            .all(|e| matches!(e, CoreError::AddressConflict { .. }))
    );
    assert_eq!(store.contratos_snapshot().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_auto_allocation_hands_out_distinct_addresses() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/28").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;

    let mut requests = Vec::new();
    for n in 0..ATTEMPTS {
        requests.push(request(&ctrl, &plan, persona(n)).await);
    }

    let handles: Vec<_> = requests
        .into_iter()
        .map(|inst| {
            let ctrl = ctrl.clone();
            let router_id = router.id;
            tokio::spawn(async move {
                activate(
                    &ctrl,
                    activation(&inst, ClienteSource::Crear, router_id, ipoe(None)),
                )
                .await
            })
        })
        .collect();

    let mut addresses = Vec::new();
    for handle in handles {
        let a = handle.await.unwrap().unwrap();
        addresses.push(a.contrato.committed_address().unwrap());
    }
    addresses.sort();
    addresses.dedup();
    assert_eq!(addresses.len(), usize::try_from(ATTEMPTS).unwrap());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_see_a_contract_before_its_customer() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let mut requests = Vec::new();
    for n in 0..ATTEMPTS {
        requests.push(request(&ctrl, &plan, persona(n)).await);
    }

    let done = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let reader = {
        let store = Arc::clone(ctrl.store());
        let done = Arc::clone(&done);
        std::thread::spawn(move || {
            while !done.load(std::sync::atomic::Ordering::Acquire) {
                let contratos = store.contratos_snapshot();
                let clientes = store.clientes_snapshot();
                for contrato in contratos.iter() {
                    assert!(
                        clientes.iter().any(|c| c.id == contrato.cliente_id),
                        "{} published before its customer",
                        contrato.numero_contrato
                    );
                }
            }
        })
    };

    for inst in requests {
        activate(
            &ctrl,
            activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
        )
        .await
        .unwrap();
    }
    done.store(true, std::sync::atomic::Ordering::Release);
    reader.join().unwrap();
}
