//! Config subcommand handlers.

use std::path::PathBuf;

use dialoguer::{Input, Select};
use strum::IntoEnumIterator;

use ispdesk_core::Role;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, with each profile's resolved store file.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "role = \"{}\"", cfg.defaults.role);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(
            out,
            "data_file = \"{}\"",
            config::data_file_for(p, name).display()
        );
        let _ = writeln!(out, "role = \"{}\"", cfg.role_for(p));
    }

    out.trim_end().to_owned()
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_role() -> Result<Role, CliError> {
    let roles: Vec<Role> = Role::iter().collect();
    let labels: Vec<String> = roles.iter().map(ToString::to_string).collect();
    let selection = Select::new()
        .with_prompt("Operator role")
        .items(&labels)
        .default(0)
        .interact()
        .map_err(prompt_err)?;
    roles
        .get(selection)
        .copied()
        .ok_or_else(|| CliError::validation("role", "no role selected"))
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: create or update a profile ────────────────────────
        ConfigCommand::Init {
            name,
            store,
            profile_role,
        } => {
            let config_path = config::config_path();
            let mut cfg = config::load_config_or_default();

            let profile_name = match name {
                Some(n) => n,
                None => Input::new()
                    .with_prompt("Profile name")
                    .default("default".into())
                    .interact_text()
                    .map_err(prompt_err)?,
            };
            if profile_name.trim().is_empty() {
                return Err(CliError::validation("name", "profile name cannot be empty"));
            }

            let data_file: PathBuf = match store {
                Some(path) => path,
                None => {
                    let suggested = config::data_file_for(&Profile::default(), &profile_name);
                    let answer: String = Input::new()
                        .with_prompt("Store file")
                        .default(suggested.display().to_string())
                        .interact_text()
                        .map_err(prompt_err)?;
                    PathBuf::from(answer)
                }
            };

            let role = match profile_role {
                Some(r) => Role::from(r),
                None => prompt_role()?,
            };

            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    data_file: Some(data_file),
                    role: Some(role),
                },
            );
            if cfg.default_profile.is_none() || cfg.profiles.len() == 1 {
                cfg.default_profile = Some(profile_name.clone());
            }
            config::save_config(&cfg)?;

            output::notice(
                &format!(
                    "✓ Profile '{profile_name}' written to {}",
                    config_path.display()
                ),
                global.quiet,
            );
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, |c| {
                config::active_profile_name(global, c)
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            output::notice(&format!("✓ Default profile set to '{name}'"), global.quiet);
            Ok(())
        }
    }
}
