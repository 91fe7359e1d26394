//! CLI configuration: thin wrapper around `ispdesk_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--profile, --data-file, --role).

use ispdesk_core::{CoreConfig, Role};

use crate::cli::{GlobalOpts, RoleArg};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use ispdesk_config::{
    Config, Profile, config_path, data_file_for, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Admin => Self::Admin,
            RoleArg::Operador => Self::Operador,
            RoleArg::Tecnico => Self::Tecnico,
            RoleArg::Auditor => Self::Auditor,
            RoleArg::Soporte => Self::Soporte,
        }
    }
}

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    config.active_profile_name(global.profile.as_deref())
}

/// Translate the active profile + global flags into a `CoreConfig`.
///
/// Flag overrides take priority over profile values; the profile's own
/// values take priority over `[defaults]`.
pub fn resolve_core_config(global: &GlobalOpts) -> Result<CoreConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    // An explicit data file makes the profile optional.
    let profile = match (&global.data_file, cfg.profile(&profile_name)) {
        (_, Ok(profile)) => profile,
        (Some(_), Err(_)) => Profile::default(),
        (None, Err(e)) => return Err(e.into()),
    };

    let data_path = global
        .data_file
        .clone()
        .unwrap_or_else(|| data_file_for(&profile, &profile_name));
    let role = global.role.map_or_else(|| cfg.role_for(&profile), Role::from);

    tracing::debug!(
        profile = %profile_name,
        data_file = %data_path.display(),
        role = %role,
        "resolved core config"
    );
    Ok(CoreConfig::with_data_path(data_path).role(role))
}
