// Shared fixtures for the core integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::net::Ipv4Addr;

use chrono::NaiveDate;
use secrecy::SecretString;

use ispdesk_core::{
    ActivateInstalacionRequest, Activation, AddressPool, Cliente, ClienteSource, Command,
    CommandResult, ConexionRequest, Controller, CoreConfig, CoreError, CreateClienteRequest,
    CreatePlanRequest, CreateRouterRequest, CreateSolicitudRequest, DatosCliente, EntityId,
    EstadoContrato, Instalacion, Plan, Router, TipoIdentificacion,
};

pub fn ip(s: &str) -> Ipv4Addr {
    s.parse().unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn datos(tipo: TipoIdentificacion, numero: &str, nombre: &str) -> DatosCliente {
    DatosCliente {
        tipo_identificacion: tipo,
        numero_identificacion: numero.into(),
        nombre: nombre.into(),
        apellido1: None,
        apellido2: None,
        razon_social: None,
        email: None,
        telefono: Some("22334455".into()),
        provincia: Some("San José".into()),
        canton: None,
        distrito: None,
        direccion_exacta: None,
    }
}

/// A cédula física built from `n`, unique per `n`.
pub fn persona(n: u32) -> DatosCliente {
    datos(
        TipoIdentificacion::CedulaFisica,
        &format!("1{n:08}"),
        &format!("Cliente {n}"),
    )
}

pub async fn create_router(ctrl: &Controller, nombre: &str, mgmt: &str, pool: &str) -> Router {
    let result = ctrl
        .execute(Command::CreateRouter(CreateRouterRequest {
            nombre: nombre.into(),
            ip: ip(mgmt),
            usuario: "api".into(),
            puerto: None,
            ssl: false,
            cidr_disponibles: AddressPool::parse(pool).unwrap(),
            identity: None,
        }))
        .await
        .unwrap();
    match result {
        CommandResult::Router(r) => r,
        other => panic!("unexpected result: {other:?}"),
    }
}

pub async fn create_plan(ctrl: &Controller, nombre: &str) -> Plan {
    let result = ctrl
        .execute(Command::CreatePlan(CreatePlanRequest {
            nombre: nombre.into(),
            descripcion: None,
            velocidad_bajada_mbps: 100.0,
            velocidad_subida_mbps: 20.0,
            precio_mensual: 25_000.0,
            moneda: None,
        }))
        .await
        .unwrap();
    match result {
        CommandResult::Plan(p) => p,
        other => panic!("unexpected result: {other:?}"),
    }
}

pub async fn create_cliente(ctrl: &Controller, datos: DatosCliente) -> Result<Cliente, CoreError> {
    match ctrl
        .execute(Command::CreateCliente(CreateClienteRequest { datos }))
        .await?
    {
        CommandResult::Cliente(c) => Ok(c),
        other => panic!("unexpected result: {other:?}"),
    }
}

pub async fn request(ctrl: &Controller, plan: &Plan, temp: DatosCliente) -> Instalacion {
    let result = ctrl
        .execute(Command::CreateSolicitud(CreateSolicitudRequest {
            plan_id: plan.id,
            fecha_programada: date(2026, 11, 2),
            tecnico_asignado: None,
            notas: None,
            temp,
        }))
        .await
        .unwrap();
    match result {
        CommandResult::Instalacion(i) => i,
        other => panic!("unexpected result: {other:?}"),
    }
}

pub fn ipoe(address: Option<&str>) -> ConexionRequest {
    ConexionRequest::Ipoe {
        ip: address.map(ip),
    }
}

pub fn pppoe(usuario: &str, password: &str, remote: Option<&str>) -> ConexionRequest {
    ConexionRequest::Pppoe {
        usuario: usuario.into(),
        password: SecretString::from(password.to_string()),
        remote_address: remote.map(ip),
    }
}

pub fn activation(
    inst: &Instalacion,
    cliente: ClienteSource,
    router_id: EntityId,
    conexion: ConexionRequest,
) -> ActivateInstalacionRequest {
    ActivateInstalacionRequest {
        instalacion_id: inst.id,
        cliente,
        fecha_inicio: date(2026, 11, 5),
        dia_facturacion: 5,
        estado_inicial: EstadoContrato::Activo,
        router_id,
        conexion,
        notas: None,
    }
}

pub async fn activate(
    ctrl: &Controller,
    req: ActivateInstalacionRequest,
) -> Result<Activation, CoreError> {
    match ctrl.execute(Command::ActivateInstalacion(req)).await? {
        CommandResult::Activation(a) => Ok(*a),
        other => panic!("unexpected result: {other:?}"),
    }
}

/// Admin controller over an in-memory store.
pub fn controller() -> Controller {
    Controller::open(CoreConfig::in_memory()).unwrap()
}
