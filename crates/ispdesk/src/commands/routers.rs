//! Router command handlers.

use std::sync::Arc;

use tabled::Tabled;

use ispdesk_core::{
    AddressPool, Command as CoreCommand, CommandResult, Controller, CreateRouterRequest, Router,
};

use crate::cli::{GlobalOpts, RoutersArgs, RoutersCommand};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct RouterRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Mgmt IP")]
    ip: String,
    #[tabled(rename = "Port")]
    port: String,
    #[tabled(rename = "Pool")]
    pool: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl RouterRow {
    fn new(r: &Router, color: bool) -> Self {
        let (label, tone) = if r.is_active {
            ("active", Tone::Good)
        } else {
            ("inactive", Tone::Off)
        };
        Self {
            name: r.nombre.clone(),
            ip: r.ip.to_string(),
            port: format!("{}{}", r.puerto, if r.ssl { " (ssl)" } else { "" }),
            pool: r.cidr_disponibles.to_string(),
            status: output::paint(label, tone, color),
        }
    }
}

fn detail(r: &Arc<Router>) -> String {
    [
        format!("ID:        {}", r.id),
        format!("Name:      {}", r.nombre),
        format!("Mgmt IP:   {}", r.ip),
        format!("API:       {}@{}:{}", r.usuario, r.ip, r.puerto),
        format!("SSL:       {}", r.ssl),
        format!("Identity:  {}", util::or_dash(r.identity.as_deref())),
        format!("Pool:      {}", r.cidr_disponibles),
        format!("Capacity:  {}", r.cidr_disponibles.capacity()),
        format!("Active:    {}", r.is_active),
    ]
    .join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: RoutersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        RoutersCommand::Add {
            name,
            ip,
            user,
            port,
            ssl,
            pool,
            identity,
        } => {
            let cidr_disponibles = AddressPool::parse(&pool)?;
            let result = controller
                .execute(CoreCommand::CreateRouter(CreateRouterRequest {
                    nombre: name,
                    ip,
                    usuario: user,
                    puerto: port,
                    ssl,
                    cidr_disponibles,
                    identity,
                }))
                .await?;
            if let CommandResult::Router(router) = result {
                let router = Arc::new(router);
                let out = output::render_single(&global.output, &router, detail, |r| {
                    r.id.to_string()
                });
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        RoutersCommand::List => {
            let routers = controller.routers()?;
            let out = output::render_list(
                &global.output,
                &routers,
                |r| RouterRow::new(r, color),
                |r| r.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutersCommand::Get { router } => {
            let router = controller.router(&router)?;
            let out = output::render_single(&global.output, &router, detail, |r| r.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutersCommand::Deactivate { router } => {
            let router = controller.router(&router)?;
            if !util::confirm(
                &format!(
                    "Deactivate router '{}'? No new contracts can be activated on it.",
                    router.nombre
                ),
                "routers deactivate",
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeactivateRouter { id: router.id })
                .await?;
            output::notice(&format!("Router '{}' deactivated", router.nombre), global.quiet);
            Ok(())
        }

        RoutersCommand::Pool { router } => {
            let router = controller.router(&router)?;
            let summary = controller.pool_summary(router.id)?;
            let out = output::render_single(
                &global.output,
                &summary,
                |s| {
                    let mut lines = vec![
                        format!("Router:     {}", s.router),
                        format!("Pool name:  {}", s.pool_name),
                    ];
                    lines.extend(s.ranges.iter().map(|r| format!("Range:      {r}")));
                    lines.push(format!("Capacity:   {}", s.capacity));
                    lines.push(format!("Committed:  {}", s.committed));
                    lines.join("\n")
                },
                |s| s.ranges.join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutersCommand::NextIp { router } => {
            let router = controller.router(&router)?;
            let address = controller.suggest_next_address(router.id)?;
            let out = output::render_single(
                &global.output,
                &address,
                ToString::to_string,
                ToString::to_string,
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RoutersCommand::CheckIp {
            router,
            ip,
            exclude,
        } => {
            let router = controller.router(&router)?;
            let exclude = exclude
                .map(|c| controller.contrato(&c).map(|c| c.id))
                .transpose()?;
            let availability = controller.check_address(router.id, ip, exclude)?;
            let out = output::render_single(
                &global.output,
                &availability,
                |a| match a.conflicting_contract_number {
                    Some(ref numero) => format!("{} is taken by contract {numero}", a.address),
                    None => format!("{} is available", a.address),
                },
                |a| a.available.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
