//! Customer command handlers.

use std::sync::Arc;

use tabled::Tabled;

use ispdesk_core::{
    Cliente, Command as CoreCommand, CommandResult, Controller, CreateClienteRequest,
};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClienteRow {
    #[tabled(rename = "Identification")]
    identificacion: String,
    #[tabled(rename = "Type")]
    tipo: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Phone")]
    telefono: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ClienteRow {
    fn new(c: &Cliente, color: bool) -> Self {
        let (label, tone) = if c.is_active {
            ("active", Tone::Good)
        } else {
            ("inactive", Tone::Off)
        };
        Self {
            identificacion: c.numero_identificacion().to_owned(),
            tipo: c.datos.tipo_identificacion.to_string(),
            name: c.display_name(),
            telefono: c.datos.telefono.clone().unwrap_or_default(),
            status: output::paint(label, tone, color),
        }
    }
}

fn detail(c: &Arc<Cliente>) -> String {
    let d = &c.datos;
    let location = [
        d.provincia.as_deref(),
        d.canton.as_deref(),
        d.distrito.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(", ");
    [
        format!("ID:             {}", c.id),
        format!(
            "Identification: {} ({})",
            d.numero_identificacion, d.tipo_identificacion
        ),
        format!("Name:           {}", c.display_name()),
        format!("Email:          {}", util::or_dash(d.email.as_deref())),
        format!("Phone:          {}", util::or_dash(d.telefono.as_deref())),
        format!(
            "Location:       {}",
            if location.is_empty() { "-" } else { &location }
        ),
        format!("Address:        {}", util::or_dash(d.direccion_exacta.as_deref())),
        format!("Active:         {}", c.is_active),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::Add(fields) => {
            let result = controller
                .execute(CoreCommand::CreateCliente(CreateClienteRequest {
                    datos: fields.into(),
                }))
                .await?;
            if let CommandResult::Cliente(cliente) = result {
                let cliente = Arc::new(cliente);
                let out = output::render_single(&global.output, &cliente, detail, |c| {
                    c.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        ClientsCommand::List => {
            let color = output::should_color(&global.color);
            let clientes = controller.clientes()?;
            let out = output::render_list(
                &global.output,
                &clientes,
                |c| ClienteRow::new(c, color),
                |c| c.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Get { client } => {
            let cliente = controller.cliente(&client)?;
            let out =
                output::render_single(&global.output, &cliente, detail, |c| c.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Deactivate { client } => {
            let cliente = controller.cliente(&client)?;
            if !util::confirm(
                &format!("Deactivate customer '{}'?", cliente.display_name()),
                "clients deactivate",
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeactivateCliente { id: cliente.id })
                .await?;
            output::notice(
                &format!("Customer '{}' deactivated", cliente.display_name()),
                global.quiet,
            );
            Ok(())
        }

        ClientsCommand::CheckId { number, exclude } => {
            let exclude = exclude
                .map(|c| controller.cliente(&c).map(|c| c.id))
                .transpose()?;
            let check = controller.identification_available(&number, exclude)?;
            let out = output::render_single(
                &global.output,
                &check,
                |c| c.message.clone(),
                |c| c.available.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
