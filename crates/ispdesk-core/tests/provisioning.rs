#![allow(clippy::unwrap_used)]

mod common;

use common::*;
use pretty_assertions::assert_eq;

use ispdesk_core::{
    ClienteSource, Command, CommandResult, Conexion, Controller, CoreConfig, CoreError, EntityId,
    EstadoContrato, EstadoInstalacion, RescheduleRequest, Role, TipoIdentificacion,
};

// ── Activation ──────────────────────────────────────────────────────

#[tokio::test]
async fn ipoe_activation_creates_customer_contract_and_address() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "192.168.1.0/30").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;

    let a = activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap();

    assert!(a.cliente_created);
    assert_eq!(a.cliente.numero_identificacion(), "100000001");
    assert_eq!(a.contrato.cliente_id, a.cliente.id);
    assert_eq!(a.contrato.plan_id, plan.id);
    assert_eq!(a.contrato.committed_address(), Some(ip("192.168.1.1")));
    assert!(a.contrato.numero_contrato.starts_with("CTR-"));
    assert_eq!(a.instalacion.contrato_id, Some(a.contrato.id));
    assert_eq!(a.instalacion.estado, EstadoInstalacion::Completada);
    assert!(a.instalacion.fecha_completada.is_some());

    let stored = ctrl.instalacion(&inst.numero_instalacion).unwrap();
    assert_eq!(stored.contrato_id, Some(a.contrato.id));
    assert_eq!(ctrl.contratos(Some(router.id)).unwrap().len(), 1);
}

#[tokio::test]
async fn suggestion_skips_committed_and_reserved_addresses() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "192.168.1.0/30").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;
    activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(Some("192.168.1.1"))),
    )
    .await
    .unwrap();

    let next = ctrl.suggest_next_address(router.id).unwrap();
    assert_eq!(next, ip("192.168.1.2"));
    assert!(ctrl.check_address(router.id, next, None).unwrap().available);
}

#[tokio::test]
async fn exhausted_pool_leaves_no_trace() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "192.168.1.0/30").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;

    for n in 1..=2 {
        let inst = request(&ctrl, &plan, persona(n)).await;
        activate(
            &ctrl,
            activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
        )
        .await
        .unwrap();
    }

    let third = request(&ctrl, &plan, persona(3)).await;
    let err = activate(
        &ctrl,
        activation(&third, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::PoolExhausted { .. }), "{err:?}");

    assert_eq!(ctrl.clientes().unwrap().len(), 2);
    assert_eq!(ctrl.contratos(None).unwrap().len(), 2);
    let after = ctrl.instalacion(&third.id.to_string()).unwrap();
    assert_eq!(after.contrato_id, None);
    assert_eq!(after.estado, EstadoInstalacion::Solicitud);
}

#[tokio::test]
async fn conflict_after_customer_step_rolls_back_customer() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;

    let first = request(&ctrl, &plan, persona(1)).await;
    let a = activate(
        &ctrl,
        activation(&first, ClienteSource::Crear, router.id, ipoe(Some("10.0.0.5"))),
    )
    .await
    .unwrap();

    let second = request(&ctrl, &plan, persona(2)).await;
    let err = activate(
        &ctrl,
        activation(&second, ClienteSource::Crear, router.id, ipoe(Some("10.0.0.5"))),
    )
    .await
    .unwrap_err();
    match err {
        CoreError::AddressConflict {
            address,
            contract_number,
        } => {
            assert_eq!(address, ip("10.0.0.5"));
            assert_eq!(contract_number, a.contrato.numero_contrato);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The customer built in step 1 was never committed.
    assert!(ctrl.identification_available("100000002", None).unwrap().available);
    assert_eq!(ctrl.clientes().unwrap().len(), 1);
    assert_eq!(ctrl.contratos(None).unwrap().len(), 1);
}

#[tokio::test]
async fn missing_customer_fails_before_any_address_check() {
    let ctrl = controller();
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;

    // Neither the customer nor the router exists; the customer is reported.
    let err = activate(
        &ctrl,
        activation(
            &inst,
            ClienteSource::Existente(EntityId::new()),
            EntityId::new(),
            ipoe(Some("10.0.0.5")),
        ),
    )
    .await
    .unwrap_err();
    match err {
        CoreError::NotFound { entity_type, .. } => assert_eq!(entity_type, "Cliente"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn duplicate_identification_reports_existing_customer() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Empresarial").await;

    let mut x = datos(TipoIdentificacion::CedulaJuridica, "3-101-123456", "Rep");
    x.razon_social = Some("Cable X S.A.".into());
    create_cliente(&ctrl, x.clone()).await.unwrap();

    // Direct creation.
    let err = create_cliente(&ctrl, x.clone()).await.unwrap_err();
    assert!(matches!(err, CoreError::DuplicateIdentification { .. }));

    // Via activation.
    let inst = request(&ctrl, &plan, x).await;
    let err = activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap_err();
    match err {
        CoreError::DuplicateIdentification {
            number,
            existing_name,
        } => {
            assert_eq!(number, "3-101-123456");
            assert_eq!(existing_name, "Cable X S.A.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(ctrl.contratos(None).unwrap().is_empty());

    let check = ctrl.identification_available("3-101-123456", None).unwrap();
    assert!(!check.available);
    assert_eq!(check.conflicting_name.as_deref(), Some("Cable X S.A."));
}

#[tokio::test]
async fn linking_existing_customer_reuses_it() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let cliente = create_cliente(&ctrl, persona(7)).await.unwrap();
    let inst = request(&ctrl, &plan, persona(7)).await;

    let a = activate(
        &ctrl,
        activation(
            &inst,
            ClienteSource::Existente(cliente.id),
            router.id,
            ipoe(None),
        ),
    )
    .await
    .unwrap();
    assert!(!a.cliente_created);
    assert_eq!(a.contrato.cliente_id, cliente.id);
    assert_eq!(ctrl.clientes().unwrap().len(), 1);
}

// ── PPPoE ───────────────────────────────────────────────────────────

#[tokio::test]
async fn pppoe_requires_credentials() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;

    for conexion in [pppoe("", "secret", None), pppoe("ana", "", None)] {
        let err = activate(
            &ctrl,
            activation(&inst, ClienteSource::Crear, router.id, conexion),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, CoreError::MissingCredentials), "{err:?}");
    }
    assert!(ctrl.clientes().unwrap().is_empty());
}

#[tokio::test]
async fn fixed_pppoe_and_ipoe_share_one_namespace() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;

    let first = request(&ctrl, &plan, persona(1)).await;
    let a = activate(
        &ctrl,
        activation(
            &first,
            ClienteSource::Crear,
            router.id,
            pppoe("ana", "secret", Some("10.0.0.1")),
        ),
    )
    .await
    .unwrap();
    assert!(matches!(a.contrato.conexion, Conexion::Pppoe { .. }));

    // Auto allocation for IPoE skips the PPPoE-held address.
    let second = request(&ctrl, &plan, persona(2)).await;
    let b = activate(
        &ctrl,
        activation(&second, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap();
    assert_eq!(b.contrato.committed_address(), Some(ip("10.0.0.2")));

    // And a fixed PPPoE address cannot take the IPoE one.
    let third = request(&ctrl, &plan, persona(3)).await;
    let err = activate(
        &ctrl,
        activation(
            &third,
            ClienteSource::Crear,
            router.id,
            pppoe("luis", "secret", Some("10.0.0.2")),
        ),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::AddressConflict { .. }), "{err:?}");
}

#[tokio::test]
async fn dynamic_pppoe_commits_no_address() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/30").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;

    let a = activate(
        &ctrl,
        activation(
            &inst,
            ClienteSource::Crear,
            router.id,
            pppoe("ana", "secret", None),
        ),
    )
    .await
    .unwrap();
    assert_eq!(a.contrato.committed_address(), None);
    assert_eq!(ctrl.pool_summary(router.id).unwrap().committed, 0);
    assert_eq!(ctrl.suggest_next_address(router.id).unwrap(), ip("10.0.0.1"));
}

#[tokio::test]
async fn out_of_pool_address_is_rejected() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;

    let err = activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(Some("10.0.1.5"))),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::AddressOutOfPool { .. }), "{err:?}");
    assert!(ctrl.check_address(router.id, ip("10.0.0.255"), None).is_err());
}

// ── Lifecycle ───────────────────────────────────────────────────────

async fn transition(
    ctrl: &Controller,
    id: EntityId,
    estado: EstadoInstalacion,
) -> Result<EstadoInstalacion, CoreError> {
    match ctrl
        .execute(Command::TransitionInstalacion { id, estado })
        .await?
    {
        CommandResult::Instalacion(i) => Ok(i.estado),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn lifecycle_moves_and_cancellation() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;
    assert_eq!(inst.estado, EstadoInstalacion::Solicitud);

    assert_eq!(
        transition(&ctrl, inst.id, EstadoInstalacion::Programada).await.unwrap(),
        EstadoInstalacion::Programada
    );
    assert_eq!(
        transition(&ctrl, inst.id, EstadoInstalacion::EnProgreso).await.unwrap(),
        EstadoInstalacion::EnProgreso
    );
    assert!(matches!(
        transition(&ctrl, inst.id, EstadoInstalacion::Completada).await,
        Err(CoreError::InvalidTransition { .. })
    ));

    let short = ctrl
        .execute(Command::CancelInstalacion {
            id: inst.id,
            motivo: "no".into(),
        })
        .await;
    assert!(matches!(short, Err(CoreError::ValidationFailed { .. })));

    ctrl.execute(Command::CancelInstalacion {
        id: inst.id,
        motivo: "Cliente desistió del servicio".into(),
    })
    .await
    .unwrap();
    let cancelled = ctrl.instalacion(&inst.numero_instalacion).unwrap();
    assert_eq!(cancelled.estado, EstadoInstalacion::Cancelada);
    assert!(cancelled.fecha_cancelacion.is_some());

    let err = activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::InvalidTransition { .. }), "{err:?}");
}

#[tokio::test]
async fn activated_installation_is_frozen() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;
    let a = activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap();

    let again = activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap_err();
    match again {
        CoreError::AlreadyActivated {
            contract_number, ..
        } => assert_eq!(contract_number, a.contrato.numero_contrato),
        other => panic!("unexpected error: {other:?}"),
    }

    let cancel = ctrl
        .execute(Command::CancelInstalacion {
            id: inst.id,
            motivo: "Cambio de opinión del cliente".into(),
        })
        .await;
    assert!(matches!(cancel, Err(CoreError::AlreadyActivated { .. })));

    let reschedule = ctrl
        .execute(Command::RescheduleInstalacion {
            id: inst.id,
            update: RescheduleRequest {
                fecha_programada: Some(date(2026, 12, 1)),
                ..RescheduleRequest::default()
            },
        })
        .await;
    assert!(matches!(reschedule, Err(CoreError::AlreadyActivated { .. })));
}

#[tokio::test]
async fn installation_numbers_are_sequential() {
    let ctrl = controller();
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let a = request(&ctrl, &plan, persona(1)).await;
    let b = request(&ctrl, &plan, persona(2)).await;
    assert!(a.numero_instalacion.starts_with("INS-"));
    assert!(a.numero_instalacion.ends_with("-0001"));
    assert!(b.numero_instalacion.ends_with("-0002"));
}

// ── Contracts ───────────────────────────────────────────────────────

#[tokio::test]
async fn cancelled_contract_releases_and_cannot_reclaim_reused_address() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;

    let first = request(&ctrl, &plan, persona(1)).await;
    let a = activate(
        &ctrl,
        activation(&first, ClienteSource::Crear, router.id, ipoe(Some("10.0.0.5"))),
    )
    .await
    .unwrap();

    ctrl.execute(Command::SetContratoEstado {
        id: a.contrato.id,
        estado: EstadoContrato::Cancelado,
    })
    .await
    .unwrap();
    assert!(
        ctrl.check_address(router.id, ip("10.0.0.5"), None)
            .unwrap()
            .available
    );

    let second = request(&ctrl, &plan, persona(2)).await;
    activate(
        &ctrl,
        activation(&second, ClienteSource::Crear, router.id, ipoe(Some("10.0.0.5"))),
    )
    .await
    .unwrap();

    let revive = ctrl
        .execute(Command::SetContratoEstado {
            id: a.contrato.id,
            estado: EstadoContrato::Activo,
        })
        .await;
    assert!(matches!(revive, Err(CoreError::AddressConflict { .. })));
    assert_eq!(
        ctrl.contrato(&a.contrato.numero_contrato).unwrap().estado,
        EstadoContrato::Cancelado
    );
}

#[tokio::test]
async fn reassign_moves_address_and_keeps_mode() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;
    let a = activate(
        &ctrl,
        activation(
            &inst,
            ClienteSource::Crear,
            router.id,
            pppoe("ana", "secret", Some("10.0.0.9")),
        ),
    )
    .await
    .unwrap();

    // Own address is not a conflict.
    let own = ctrl
        .check_address(router.id, ip("10.0.0.9"), Some(a.contrato.id))
        .unwrap();
    assert!(own.available);

    let result = ctrl
        .execute(Command::ReassignAddress {
            id: a.contrato.id,
            address: ip("10.0.0.20"),
        })
        .await
        .unwrap();
    let CommandResult::Contrato(moved) = result else {
        panic!("unexpected result");
    };
    assert!(matches!(
        moved.conexion,
        Conexion::Pppoe {
            remote_address: Some(addr),
            ..
        } if addr == ip("10.0.0.20")
    ));
    assert!(
        ctrl.check_address(router.id, ip("10.0.0.9"), None)
            .unwrap()
            .available
    );
}

// ── Directories and access ──────────────────────────────────────────

#[tokio::test]
async fn inactive_router_and_plan_are_refused() {
    let ctrl = controller();
    let router = create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let plan = create_plan(&ctrl, "Hogar 100").await;
    let inst = request(&ctrl, &plan, persona(1)).await;

    ctrl.execute(Command::DeactivateRouter { id: router.id })
        .await
        .unwrap();
    let err = ctrl.suggest_next_address(router.id).unwrap_err();
    assert!(matches!(err, CoreError::Inactive { .. }), "{err:?}");
    let err = ctrl
        .check_address(router.id, ip("10.0.0.1"), None)
        .unwrap_err();
    assert!(matches!(err, CoreError::Inactive { .. }), "{err:?}");
    let err = ctrl.pool_summary(router.id).unwrap_err();
    assert!(matches!(err, CoreError::Inactive { .. }), "{err:?}");

    let err = activate(
        &ctrl,
        activation(&inst, ClienteSource::Crear, router.id, ipoe(None)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::Inactive { .. }), "{err:?}");

    ctrl.execute(Command::DeactivatePlan { id: plan.id })
        .await
        .unwrap();
    let err = ctrl
        .execute(Command::CreateSolicitud(ispdesk_core::CreateSolicitudRequest {
            plan_id: plan.id,
            fecha_programada: date(2026, 11, 2),
            tecnico_asignado: None,
            notas: None,
            temp: persona(2),
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Inactive { .. }), "{err:?}");
}

#[tokio::test]
async fn roles_gate_commands_and_reads() {
    let auditor = Controller::open(CoreConfig::in_memory().role(Role::Auditor)).unwrap();
    let err = auditor
        .execute(Command::DeactivatePlan { id: EntityId::new() })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::PermissionDenied { .. }));
    assert!(auditor.routers().is_ok());

    let soporte = Controller::open(CoreConfig::in_memory().role(Role::Soporte)).unwrap();
    assert!(matches!(
        soporte.routers(),
        Err(CoreError::PermissionDenied { .. })
    ));
    assert!(soporte.clientes().is_ok());
}

#[tokio::test]
async fn invalid_identification_format_is_rejected() {
    let ctrl = controller();
    let err = create_cliente(
        &ctrl,
        datos(TipoIdentificacion::CedulaFisica, "12345", "Ana"),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
}

#[tokio::test]
async fn duplicate_router_management_address_is_rejected() {
    let ctrl = controller();
    create_router(&ctrl, "Nodo Centro", "10.255.0.1", "10.0.0.0/24").await;
    let err = ctrl
        .execute(Command::CreateRouter(ispdesk_core::CreateRouterRequest {
            nombre: "Nodo Sur".into(),
            ip: ip("10.255.0.1"),
            usuario: "api".into(),
            puerto: None,
            ssl: false,
            cidr_disponibles: ispdesk_core::AddressPool::parse("10.1.0.0/24").unwrap(),
            identity: None,
        }))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    assert_eq!(ctrl.routers().unwrap().len(), 1);
}

#[tokio::test]
async fn shutdown_closes_the_command_channel() {
    let ctrl = controller();
    ctrl.shutdown().await;
    let err = ctrl
        .execute(Command::DeactivatePlan { id: EntityId::new() })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ControllerClosed));
}
