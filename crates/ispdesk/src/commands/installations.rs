//! Installation command handlers, including activation.

use std::net::Ipv4Addr;
use std::sync::Arc;

use secrecy::SecretString;
use tabled::Tabled;

use ispdesk_core::{
    ActivateInstalacionRequest, Activation, ClienteSource, Command as CoreCommand, CommandResult,
    ConexionRequest, Controller, CreateSolicitudRequest, EstadoInstalacion, Instalacion,
    RescheduleRequest,
};

use crate::cli::{ConnectionArg, GlobalOpts, InstallationsArgs, InstallationsCommand};
use crate::error::CliError;
use crate::output;

use super::contracts;
use super::util::{self, Redacted};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct InstalacionRow {
    #[tabled(rename = "Number")]
    numero: String,
    #[tabled(rename = "Customer")]
    cliente: String,
    #[tabled(rename = "Identification")]
    identificacion: String,
    #[tabled(rename = "Scheduled")]
    fecha: String,
    #[tabled(rename = "Technician")]
    tecnico: String,
    #[tabled(rename = "State")]
    estado: String,
}

impl InstalacionRow {
    fn new(i: &Instalacion, color: bool) -> Self {
        Self {
            numero: i.numero_instalacion.clone(),
            cliente: i.temp.display_name(),
            identificacion: i.temp.numero_identificacion.clone(),
            fecha: i.fecha_programada.to_string(),
            tecnico: i.tecnico_asignado.clone().unwrap_or_default(),
            estado: output::paint(i.estado.as_ref(), util::installation_tone(i.estado), color),
        }
    }
}

fn detail(i: &Arc<Instalacion>) -> String {
    let mut lines = vec![
        format!("ID:          {}", i.id),
        format!("Number:      {}", i.numero_instalacion),
        format!("State:       {}", i.estado),
        format!("Customer:    {}", i.temp.display_name()),
        format!(
            "ID number:   {} ({})",
            i.temp.numero_identificacion, i.temp.tipo_identificacion
        ),
        format!("Scheduled:   {}", i.fecha_programada),
        format!("Technician:  {}", util::or_dash(i.tecnico_asignado.as_deref())),
    ];
    if let Some(fecha) = i.fecha_completada {
        lines.push(format!("Completed:   {fecha}"));
    }
    if let Some(fecha) = i.fecha_cancelacion {
        lines.push(format!("Cancelled:   {fecha}"));
        lines.push(format!(
            "Reason:      {}",
            util::or_dash(i.motivo_cancelacion.as_deref())
        ));
    }
    if let Some(ref contrato_id) = i.contrato_id {
        lines.push(format!("Contract ID: {contrato_id}"));
    }
    lines.push(format!("Notes:       {}", util::or_dash(i.notas.as_deref())));
    lines.join("\n")
}

fn activation_detail(a: &Activation) -> String {
    let origin = if a.cliente_created { "new" } else { "existing" };
    [
        format!(
            "Installation {} activated ({})",
            a.instalacion.numero_instalacion, a.instalacion.estado
        ),
        format!(
            "Customer:    {} [{}] ({origin})",
            a.cliente.display_name(),
            a.cliente.numero_identificacion()
        ),
        String::new(),
        contracts::detail(&a.contrato),
    ]
    .join("\n")
}

fn print_instalacion(inst: Instalacion, global: &GlobalOpts) {
    let inst = Arc::new(inst);
    let out = output::render_single(&global.output, &inst, detail, |i| {
        i.numero_instalacion.clone()
    });
    output::print_output(&out, global.quiet);
}

async fn run(
    controller: &Controller,
    cmd: CoreCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    if let CommandResult::Instalacion(inst) = controller.execute(cmd).await? {
        print_instalacion(inst, global);
    }
    Ok(())
}

/// PPPoE credentials from flags, prompting for a missing password.
///
/// Anything still missing is passed through empty; the core rejects it
/// with a credentials error.
fn pppoe_credentials(user: Option<String>, password: Option<String>) -> (String, SecretString) {
    let user = user.unwrap_or_default();
    let password = match password {
        Some(p) => p,
        None if !user.trim().is_empty() => {
            rpassword::prompt_password("PPPoE password: ").unwrap_or_default()
        }
        None => String::new(),
    };
    (user, SecretString::from(password))
}

fn conexion_request(
    connection: ConnectionArg,
    ip: Option<Ipv4Addr>,
    user: Option<String>,
    password: Option<String>,
) -> ConexionRequest {
    match connection {
        ConnectionArg::Ipoe => ConexionRequest::Ipoe { ip },
        ConnectionArg::Pppoe => {
            let (usuario, password) = pppoe_credentials(user, password);
            ConexionRequest::Pppoe {
                usuario,
                password,
                remote_address: ip,
            }
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub async fn handle(
    controller: &Controller,
    args: InstallationsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        InstallationsCommand::Request {
            plan,
            date,
            technician,
            notes,
            customer,
        } => {
            let plan = controller.plan(&plan)?;
            let cmd = CoreCommand::CreateSolicitud(CreateSolicitudRequest {
                plan_id: plan.id,
                fecha_programada: util::parse_date("date", &date)?,
                tecnico_asignado: technician,
                notas: notes,
                temp: customer.into(),
            });
            run(controller, cmd, global).await
        }

        InstallationsCommand::List { state } => {
            let color = output::should_color(&global.color);
            let wanted = state.map(EstadoInstalacion::from);
            let instalaciones: Vec<_> = controller
                .instalaciones()?
                .into_iter()
                .filter(|i| wanted.is_none_or(|w| i.estado == w))
                .collect();
            let out = output::render_list(
                &global.output,
                &instalaciones,
                |i| InstalacionRow::new(i, color),
                |i| i.numero_instalacion.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InstallationsCommand::Get { installation } => {
            let inst = controller.instalacion(&installation)?;
            let out = output::render_single(&global.output, &inst, detail, |i| {
                i.numero_instalacion.clone()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        InstallationsCommand::Schedule { installation } => {
            let inst = controller.instalacion(&installation)?;
            let cmd = CoreCommand::TransitionInstalacion {
                id: inst.id,
                estado: EstadoInstalacion::Programada,
            };
            run(controller, cmd, global).await
        }

        InstallationsCommand::Start { installation } => {
            let inst = controller.instalacion(&installation)?;
            let cmd = CoreCommand::TransitionInstalacion {
                id: inst.id,
                estado: EstadoInstalacion::EnProgreso,
            };
            run(controller, cmd, global).await
        }

        InstallationsCommand::Reschedule {
            installation,
            date,
            technician,
            notes,
        } => {
            let inst = controller.instalacion(&installation)?;
            let update = RescheduleRequest {
                fecha_programada: date.map(|d| util::parse_date("date", &d)).transpose()?,
                tecnico_asignado: technician,
                notas: notes,
            };
            let cmd = CoreCommand::RescheduleInstalacion {
                id: inst.id,
                update,
            };
            run(controller, cmd, global).await
        }

        InstallationsCommand::Cancel {
            installation,
            reason,
        } => {
            let inst = controller.instalacion(&installation)?;
            if !util::confirm(
                &format!("Cancel installation {}?", inst.numero_instalacion),
                "installations cancel",
                global.yes,
            )? {
                return Ok(());
            }
            let cmd = CoreCommand::CancelInstalacion {
                id: inst.id,
                motivo: reason,
            };
            run(controller, cmd, global).await
        }

        InstallationsCommand::Activate {
            installation,
            router,
            client,
            start_date,
            billing_day,
            status,
            connection,
            ip,
            pppoe_user,
            pppoe_password,
            notes,
        } => {
            let inst = controller.instalacion(&installation)?;
            let router = controller.router(&router)?;
            let cliente = match client {
                Some(reference) => ClienteSource::Existente(controller.cliente(&reference)?.id),
                None => ClienteSource::Crear,
            };
            let fecha_inicio = start_date
                .map(|d| util::parse_date("start-date", &d))
                .transpose()?
                .unwrap_or_else(util::today);

            let request = ActivateInstalacionRequest {
                instalacion_id: inst.id,
                cliente,
                fecha_inicio,
                dia_facturacion: billing_day,
                estado_inicial: status.into(),
                router_id: router.id,
                conexion: conexion_request(connection, ip, pppoe_user, pppoe_password),
                notas: notes,
            };

            let result = controller
                .execute(CoreCommand::ActivateInstalacion(request))
                .await?;
            if let CommandResult::Activation(activation) = result {
                let out = output::render_single(
                    &global.output,
                    &Redacted(&*activation),
                    |a| activation_detail(a.0),
                    |a| a.0.contrato.numero_contrato.clone(),
                );
                output::print_output(&out, global.quiet);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    #[test]
    fn ipoe_without_address_requests_auto_allocation() {
        let req = conexion_request(ConnectionArg::Ipoe, None, None, None);
        assert!(matches!(req, ConexionRequest::Ipoe { ip: None }));
    }

    #[test]
    fn pppoe_fixed_address_is_the_remote_address() {
        let ip: Ipv4Addr = "10.0.0.9".parse().unwrap();
        let req = conexion_request(
            ConnectionArg::Pppoe,
            Some(ip),
            Some("ana".into()),
            Some("s3cret".into()),
        );
        match req {
            ConexionRequest::Pppoe {
                usuario,
                password,
                remote_address,
            } => {
                assert_eq!(usuario, "ana");
                assert_eq!(password.expose_secret(), "s3cret");
                assert_eq!(remote_address, Some(ip));
            }
            ConexionRequest::Ipoe { .. } => panic!("expected pppoe"),
        }
    }

    #[test]
    fn pppoe_without_user_is_not_prompted() {
        let (user, password) = pppoe_credentials(None, None);
        assert!(user.is_empty());
        assert!(password.expose_secret().is_empty());
    }
}
