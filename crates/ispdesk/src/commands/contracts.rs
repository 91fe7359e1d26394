//! Contract command handlers.

use std::sync::Arc;

use tabled::Tabled;

use ispdesk_core::{
    Command as CoreCommand, CommandResult, Conexion, Contrato, Controller, EstadoContrato,
};

use crate::cli::{ContractsArgs, ContractsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, Redacted};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ContratoRow {
    #[tabled(rename = "Number")]
    numero: String,
    #[tabled(rename = "Type")]
    tipo: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Start")]
    inicio: String,
    #[tabled(rename = "Billing day")]
    facturacion: u8,
    #[tabled(rename = "Status")]
    status: String,
}

impl ContratoRow {
    fn new(c: &Contrato, color: bool) -> Self {
        Self {
            numero: c.numero_contrato.clone(),
            tipo: c.conexion.tipo().to_string(),
            address: address_label(&c.conexion),
            inicio: c.fecha_inicio.to_string(),
            facturacion: c.dia_facturacion,
            status: output::paint(c.estado.as_ref(), util::contract_tone(c.estado), color),
        }
    }
}

pub(super) fn address_label(conexion: &Conexion) -> String {
    conexion
        .committed_address()
        .map_or_else(|| "dynamic".into(), |a| a.to_string())
}

pub(super) fn detail(c: &Contrato) -> String {
    let mut lines = vec![
        format!("ID:           {}", c.id),
        format!("Number:       {}", c.numero_contrato),
        format!("Status:       {}", c.estado),
        format!("Start:        {}", c.fecha_inicio),
        format!("Billing day:  {}", c.dia_facturacion),
        format!("Connection:   {}", c.conexion.tipo()),
    ];
    match c.conexion {
        Conexion::Ipoe { ip_asignada } => {
            lines.push(format!("Address:      {ip_asignada}"));
        }
        Conexion::Pppoe {
            ref usuario,
            remote_address,
            ..
        } => {
            lines.push(format!("PPPoE user:   {usuario}"));
            lines.push(format!(
                "Remote addr:  {}",
                remote_address.map_or_else(|| "dynamic".into(), |a| a.to_string())
            ));
        }
    }
    lines.push(format!("Address list: {}", c.address_list().unwrap_or("-")));
    lines.push(format!("Notes:        {}", util::or_dash(c.notas.as_deref())));
    lines.join("\n")
}

fn print_contrato(c: &Contrato, global: &GlobalOpts) {
    let out = output::render_single(
        &global.output,
        &Redacted(c),
        |r| detail(r.0),
        |r| r.0.numero_contrato.clone(),
    );
    output::print_output(&out, global.quiet);
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ContractsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ContractsCommand::List { router } => {
            let router_id = router.map(|r| controller.router(&r).map(|r| r.id)).transpose()?;
            let color = output::should_color(&global.color);
            let contratos: Vec<Redacted<Arc<Contrato>>> = controller
                .contratos(router_id)?
                .into_iter()
                .map(Redacted)
                .collect();
            let out = output::render_list(
                &global.output,
                &contratos,
                |r| ContratoRow::new(&r.0, color),
                |r| r.0.numero_contrato.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ContractsCommand::Get { contract } => {
            let contrato = controller.contrato(&contract)?;
            print_contrato(&contrato, global);
            Ok(())
        }

        ContractsCommand::SetStatus { contract, status } => {
            let contrato = controller.contrato(&contract)?;
            let estado = EstadoContrato::from(status);
            if estado == EstadoContrato::Cancelado
                && !util::confirm(
                    &format!(
                        "Cancel contract {}? Its address goes back to the pool.",
                        contrato.numero_contrato
                    ),
                    "contracts set-status cancelado",
                    global.yes,
                )?
            {
                return Ok(());
            }
            let result = controller
                .execute(CoreCommand::SetContratoEstado {
                    id: contrato.id,
                    estado,
                })
                .await?;
            if let CommandResult::Contrato(updated) = result {
                print_contrato(&updated, global);
            }
            Ok(())
        }

        ContractsCommand::Reassign { contract, ip } => {
            let contrato = controller.contrato(&contract)?;
            let result = controller
                .execute(CoreCommand::ReassignAddress {
                    id: contrato.id,
                    address: ip,
                })
                .await?;
            if let CommandResult::Contrato(updated) = result {
                print_contrato(&updated, global);
            }
            Ok(())
        }
    }
}
