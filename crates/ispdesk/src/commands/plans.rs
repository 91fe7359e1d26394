//! Plan command handlers.

use std::sync::Arc;

use tabled::Tabled;

use ispdesk_core::{Command as CoreCommand, CommandResult, Controller, CreatePlanRequest, Plan};

use crate::cli::{GlobalOpts, PlansArgs, PlansCommand};
use crate::error::CliError;
use crate::output::{self, Tone};

use super::util;

#[derive(Tabled)]
struct PlanRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Speed")]
    speed: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl PlanRow {
    fn new(p: &Plan, color: bool) -> Self {
        let (label, tone) = if p.is_active {
            ("active", Tone::Good)
        } else {
            ("inactive", Tone::Off)
        };
        Self {
            name: p.nombre.clone(),
            speed: p.speed_label(),
            price: format!("{:.2} {}", p.precio_mensual, p.moneda),
            status: output::paint(label, tone, color),
        }
    }
}

fn detail(p: &Arc<Plan>) -> String {
    [
        format!("ID:          {}", p.id),
        format!("Name:        {}", p.nombre),
        format!("Description: {}", util::or_dash(p.descripcion.as_deref())),
        format!("Speed:       {}", p.speed_label()),
        format!("Price:       {:.2} {}", p.precio_mensual, p.moneda),
        format!("Active:      {}", p.is_active),
    ]
    .join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: PlansArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PlansCommand::Add {
            name,
            download,
            upload,
            price,
            currency,
            description,
        } => {
            let result = controller
                .execute(CoreCommand::CreatePlan(CreatePlanRequest {
                    nombre: name,
                    descripcion: description,
                    velocidad_bajada_mbps: download,
                    velocidad_subida_mbps: upload,
                    precio_mensual: price,
                    moneda: currency,
                }))
                .await?;
            if let CommandResult::Plan(plan) = result {
                let plan = Arc::new(plan);
                let out =
                    output::render_single(&global.output, &plan, detail, |p| p.id.to_string());
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }

        PlansCommand::List => {
            let color = output::should_color(&global.color);
            let planes = controller.planes()?;
            let out = output::render_list(
                &global.output,
                &planes,
                |p| PlanRow::new(p, color),
                |p| p.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlansCommand::Get { plan } => {
            let plan = controller.plan(&plan)?;
            let out = output::render_single(&global.output, &plan, detail, |p| p.id.to_string());
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PlansCommand::Deactivate { plan } => {
            let plan = controller.plan(&plan)?;
            if !util::confirm(
                &format!("Deactivate plan '{}'?", plan.nombre),
                "plans deactivate",
                global.yes,
            )? {
                return Ok(());
            }
            controller
                .execute(CoreCommand::DeactivatePlan { id: plan.id })
                .await?;
            output::notice(&format!("Plan '{}' deactivated", plan.nombre), global.quiet);
            Ok(())
        }
    }
}
