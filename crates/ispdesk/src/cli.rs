//! Clap derive structures for the `ispdesk` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! Only depends on clap so the build script can include it for man pages.

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// ispdesk -- ISP back-office provisioning from the command line
#[derive(Debug, Parser)]
#[command(
    name = "ispdesk",
    version,
    about = "Provision ISP installations and allocate router addresses",
    long_about = "Back-office tool for an ISP: plans, routers, customers, installation\n\
        requests, and the activation step that turns a completed installation\n\
        into a customer contract with a conflict-free network address.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Profile to use
    #[arg(long, short = 'p', env = "ISPDESK_PROFILE", global = true)]
    pub profile: Option<String>,

    /// JSON store file (overrides profile)
    #[arg(long, env = "ISPDESK_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Operator role (overrides profile)
    #[arg(long, env = "ISPDESK_ROLE", global = true)]
    pub role: Option<RoleArg>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "ISPDESK_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Domain value enums ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    Operador,
    Tecnico,
    Auditor,
    Soporte,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum IdTypeArg {
    /// Cédula física (9 digits)
    CedulaFisica,
    /// Cédula jurídica (3 + 9 digits)
    CedulaJuridica,
    /// DIMEX (11 or 12 digits)
    Dimex,
    /// NITE (10 digits)
    Nite,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ContractStatusArg {
    Activo,
    Pendiente,
    Suspendido,
    Cancelado,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum InstallationStateArg {
    Solicitud,
    Programada,
    EnProgreso,
    Completada,
    Cancelada,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ConnectionArg {
    /// Static address enforced through a router address list
    #[default]
    Ipoe,
    /// Authenticated PPPoE session
    Pppoe,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage routers and their address pools
    #[command(alias = "rt")]
    Routers(RoutersArgs),

    /// Manage service plans
    Plans(PlansArgs),

    /// Manage customers
    #[command(alias = "cl")]
    Clients(ClientsArgs),

    /// Manage installation requests and activate them
    #[command(alias = "inst", alias = "i")]
    Installations(InstallationsArgs),

    /// View and manage customer contracts
    #[command(alias = "ctr")]
    Contracts(ContractsArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROUTERS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoutersArgs {
    #[command(subcommand)]
    pub command: RoutersCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutersCommand {
    /// Register a router
    Add {
        /// Display name
        #[arg(long)]
        name: String,

        /// Management IP address (unique)
        #[arg(long)]
        ip: Ipv4Addr,

        /// API username
        #[arg(long, default_value = "admin")]
        user: String,

        /// API port (defaults to 8728)
        #[arg(long)]
        port: Option<u16>,

        /// Use the TLS API port
        #[arg(long)]
        ssl: bool,

        /// Customer address pool, comma-separated CIDRs (e.g. "10.0.0.0/24,10.0.1.0/24")
        #[arg(long)]
        pool: String,

        /// RouterOS identity
        #[arg(long)]
        identity: Option<String>,
    },

    /// List routers
    #[command(alias = "ls")]
    List,

    /// Show router details
    Get {
        /// Router ID, management IP or name
        router: String,
    },

    /// Deactivate a router (no further activations against it)
    Deactivate {
        /// Router ID, management IP or name
        router: String,
    },

    /// Show pool ranges, capacity and committed addresses
    Pool {
        /// Router ID, management IP or name
        router: String,
    },

    /// Suggest the next free address (advisory, reserves nothing)
    NextIp {
        /// Router ID, management IP or name
        router: String,
    },

    /// Check whether an address is free on a router
    CheckIp {
        /// Router ID, management IP or name
        router: String,

        /// Address to check
        ip: Ipv4Addr,

        /// Ignore this contract's own address (ID or number)
        #[arg(long)]
        exclude: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PLANS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PlansArgs {
    #[command(subcommand)]
    pub command: PlansCommand,
}

#[derive(Debug, Subcommand)]
pub enum PlansCommand {
    /// Create a service plan
    Add {
        /// Plan name (unique)
        #[arg(long)]
        name: String,

        /// Download speed in Mbps
        #[arg(long)]
        download: f64,

        /// Upload speed in Mbps
        #[arg(long)]
        upload: f64,

        /// Monthly price
        #[arg(long)]
        price: f64,

        /// Currency code (defaults to CRC)
        #[arg(long)]
        currency: Option<String>,

        /// Free-form description
        #[arg(long)]
        description: Option<String>,
    },

    /// List plans
    #[command(alias = "ls")]
    List,

    /// Show plan details
    Get {
        /// Plan ID or name
        plan: String,
    },

    /// Deactivate a plan
    Deactivate {
        /// Plan ID or name
        plan: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CLIENTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Identity, contact and location fields of a customer.
#[derive(Debug, Args)]
pub struct CustomerFields {
    /// Identification kind
    #[arg(long = "id-type", default_value = "cedula-fisica")]
    pub id_type: IdTypeArg,

    /// Identification number
    #[arg(long = "id-number")]
    pub id_number: String,

    /// Given name
    #[arg(long)]
    pub name: String,

    /// First surname
    #[arg(long)]
    pub surname1: Option<String>,

    /// Second surname
    #[arg(long)]
    pub surname2: Option<String>,

    /// Registered company name (cédula jurídica)
    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    /// Phone number (8 digits)
    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub province: Option<String>,

    #[arg(long)]
    pub canton: Option<String>,

    #[arg(long)]
    pub district: Option<String>,

    /// Exact address
    #[arg(long)]
    pub address: Option<String>,
}

#[derive(Debug, Args)]
pub struct ClientsArgs {
    #[command(subcommand)]
    pub command: ClientsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ClientsCommand {
    /// Create a customer
    Add(CustomerFields),

    /// List customers
    #[command(alias = "ls")]
    List,

    /// Show customer details
    Get {
        /// Customer ID or identification number
        client: String,
    },

    /// Deactivate a customer
    Deactivate {
        /// Customer ID or identification number
        client: String,
    },

    /// Check whether an identification number is free
    CheckId {
        /// Identification number
        number: String,

        /// Ignore this customer (ID or identification number)
        #[arg(long)]
        exclude: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  INSTALLATIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct InstallationsArgs {
    #[command(subcommand)]
    pub command: InstallationsCommand,
}

#[derive(Debug, Subcommand)]
pub enum InstallationsCommand {
    /// Register an installation request
    Request {
        /// Plan ID or name
        #[arg(long)]
        plan: String,

        /// Scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: String,

        /// Assigned technician
        #[arg(long)]
        technician: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        #[command(flatten)]
        customer: CustomerFields,
    },

    /// List installations
    #[command(alias = "ls")]
    List {
        /// Only installations in this state
        #[arg(long)]
        state: Option<InstallationStateArg>,
    },

    /// Show installation details
    Get {
        /// Installation ID or number
        installation: String,
    },

    /// Move an installation to programada
    Schedule {
        /// Installation ID or number
        installation: String,
    },

    /// Move an installation to en_progreso
    Start {
        /// Installation ID or number
        installation: String,
    },

    /// Change date, technician or notes
    Reschedule {
        /// Installation ID or number
        installation: String,

        /// New scheduled date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[arg(long)]
        technician: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },

    /// Cancel an installation
    Cancel {
        /// Installation ID or number
        installation: String,

        /// Reason (at least 10 characters)
        #[arg(long)]
        reason: String,
    },

    /// Activate a completed installation into a contract
    Activate {
        /// Installation ID or number
        installation: String,

        /// Router ID, management IP or name
        #[arg(long)]
        router: String,

        /// Link an existing customer (ID or identification) instead of creating one
        #[arg(long)]
        client: Option<String>,

        /// Contract start date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        start_date: Option<String>,

        /// Billing day of month (1-28)
        #[arg(long, default_value = "1")]
        billing_day: u8,

        /// Initial contract status
        #[arg(long, default_value = "activo")]
        status: ContractStatusArg,

        /// Connection type
        #[arg(long, default_value = "ipoe")]
        connection: ConnectionArg,

        /// Fixed address (IPoE address or PPPoE remote address).
        /// IPoE without it takes the next free address.
        #[arg(long)]
        ip: Option<Ipv4Addr>,

        /// PPPoE username
        #[arg(long)]
        pppoe_user: Option<String>,

        /// PPPoE password (prompted when omitted)
        #[arg(long, env = "ISPDESK_PPPOE_PASSWORD", hide_env_values = true)]
        pppoe_password: Option<String>,

        #[arg(long)]
        notes: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONTRACTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ContractsArgs {
    #[command(subcommand)]
    pub command: ContractsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ContractsCommand {
    /// List contracts
    #[command(alias = "ls")]
    List {
        /// Only contracts on this router (ID, management IP or name)
        #[arg(long)]
        router: Option<String>,
    },

    /// Show contract details
    Get {
        /// Contract ID or number
        contract: String,
    },

    /// Change a contract's status
    SetStatus {
        /// Contract ID or number
        contract: String,

        status: ContractStatusArg,
    },

    /// Move a contract to another address on its router
    Reassign {
        /// Contract ID or number
        contract: String,

        /// New address
        ip: Ipv4Addr,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or update a profile (prompts for anything not given)
    Init {
        /// Profile name
        #[arg(long)]
        name: Option<String>,

        /// JSON store file for the profile
        #[arg(long = "store")]
        store: Option<PathBuf>,

        /// Operator role for the profile
        #[arg(long = "profile-role")]
        profile_role: Option<RoleArg>,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
