//! Clap derive structures for the `campusflow` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};

use campusflow_core::AlertStatus;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// campusflow -- terminal client for the CampusFlow backend
#[derive(Debug, Parser)]
#[command(
    name = "campusflow",
    version,
    about = "Campus entity resolution and security monitoring from the command line",
    long_about = "Query the CampusFlow backend: entity profiles, cross-source \
        resolution,\nactivity records, security alerts, and occupancy forecasts.",
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
    /// Backend base URL (overrides config file)
    #[arg(long, short = 'u', env = "CAMPUSFLOW_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for authenticated backends
    #[arg(long, env = "CAMPUSFLOW_API_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "CAMPUSFLOW_OUTPUT",
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

/// Alert lifecycle state as accepted on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum AlertStatusArg {
    Active,
    Investigating,
    Resolved,
}

impl From<AlertStatusArg> for AlertStatus {
    fn from(arg: AlertStatusArg) -> Self {
        match arg {
            AlertStatusArg::Active => Self::Active,
            AlertStatusArg::Investigating => Self::Investigating,
            AlertStatusArg::Resolved => Self::Resolved,
        }
    }
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Campus-wide statistics and analytics
    #[command(alias = "dash")]
    Dashboard(DashboardArgs),

    /// Entity profiles, resolution, and timelines
    #[command(alias = "ent", alias = "e")]
    Entities(EntitiesArgs),

    /// Security stats and monitoring views
    #[command(alias = "sec")]
    Security(SecurityArgs),

    /// Security alert feed and lifecycle
    #[command(alias = "al", alias = "a")]
    Alerts(AlertsArgs),

    /// Occupancy forecasts and the campus map
    #[command(alias = "sf")]
    Spaceflow(SpaceflowArgs),

    /// Raw activity records (swipes, wifi, bookings, ...)
    #[command(alias = "act")]
    Activity(ActivityArgs),

    /// Backend liveness check
    Health,

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  DASHBOARD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct DashboardArgs {
    #[command(subcommand)]
    pub command: DashboardCommand,
}

#[derive(Debug, Subcommand)]
pub enum DashboardCommand {
    /// Headline statistics
    Stats,

    /// Hour-by-day activity heatmap
    Heatmap {
        /// Days of history to aggregate
        #[arg(long, default_value = "7")]
        days: u32,
    },

    /// Weekly activity rollup
    Weekly,

    /// Activity volume per data source
    Sources,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ENTITIES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct EntitiesArgs {
    #[command(subcommand)]
    pub command: EntitiesCommand,
}

#[derive(Debug, Subcommand)]
pub enum EntitiesCommand {
    /// List resolved entities
    #[command(alias = "ls")]
    List {
        /// Max results per page
        #[arg(long, short = 'l', default_value = "50")]
        limit: u32,

        /// Pagination offset
        #[arg(long, default_value = "0")]
        offset: u32,
    },

    /// Show one entity in detail
    Show {
        /// Entity id (e.g. E100234)
        entity_id: String,
    },

    /// Every entity bundled with its recent timeline
    Timelines,

    /// Search profiles by name, email, or id
    Search {
        /// Search text
        query: String,

        /// Profile field to match against
        #[arg(long, short = 'f', default_value = "name")]
        field: String,
    },

    /// Cross-source activity timeline for one entity
    Timeline {
        /// Entity id
        entity_id: String,

        /// Days of history
        #[arg(long, short = 'd', default_value = "7")]
        days: u32,
    },

    /// Resolve an entity from partial identifiers
    Resolve {
        /// Card id from a swipe record
        #[arg(long)]
        card_id: Option<String>,

        /// Device hash from a wifi association
        #[arg(long)]
        device_hash: Option<String>,

        /// Face id from a CCTV frame
        #[arg(long)]
        face_id: Option<String>,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SECURITY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SecurityArgs {
    #[command(subcommand)]
    pub command: SecurityCommand,
}

#[derive(Debug, Subcommand)]
pub enum SecurityCommand {
    /// Security posture statistics
    Stats,

    /// Entities with no recent activity
    Inactive,

    /// Movement history for one entity
    History {
        /// Entity id
        entity_id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ALERTS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct AlertsArgs {
    #[command(subcommand)]
    pub command: AlertsCommand,
}

#[derive(Debug, Subcommand)]
pub enum AlertsCommand {
    /// List alerts, optionally filtered by status
    #[command(alias = "ls")]
    List {
        /// Only alerts in this lifecycle state
        #[arg(long, short = 's')]
        status: Option<AlertStatusArg>,

        /// Max alerts to return
        #[arg(long, short = 'l')]
        limit: Option<u32>,
    },

    /// Show one alert with evidence and recommended actions
    Show {
        /// Alert id
        alert_id: String,
    },

    /// Mark an alert resolved
    Resolve {
        /// Alert id
        alert_id: String,
    },

    /// Mark an alert under investigation
    Investigate {
        /// Alert id
        alert_id: String,
    },

    /// Reopen a resolved alert
    Reopen {
        /// Alert id
        alert_id: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SPACEFLOW
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SpaceflowArgs {
    #[command(subcommand)]
    pub command: SpaceflowCommand,
}

#[derive(Debug, Subcommand)]
pub enum SpaceflowCommand {
    /// Raw occupancy forecast for selected zones
    Forecast {
        /// Zone ids (comma separated); empty means every zone
        #[arg(long, short = 'z', value_delimiter = ',')]
        zones: Vec<String>,

        /// Forecast horizon in minutes
        #[arg(long, default_value = "60")]
        horizon: u32,
    },

    /// Campus map with forecasts folded in and zones classified
    Map {
        /// Forecast horizon in minutes
        #[arg(long, default_value = "60")]
        horizon: u32,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ACTIVITY
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ActivityArgs {
    #[command(subcommand)]
    pub command: ActivityCommand,
}

#[derive(Debug, Subcommand)]
pub enum ActivityCommand {
    /// Card swipe records
    Swipes {
        #[arg(long, short = 'l', default_value = "50")]
        limit: u32,

        /// Only records for this entity
        #[arg(long, short = 'e')]
        entity: Option<String>,
    },

    /// WiFi association logs
    Wifi {
        #[arg(long, short = 'l', default_value = "50")]
        limit: u32,

        #[arg(long, short = 'e')]
        entity: Option<String>,
    },

    /// Lab bookings
    Bookings {
        #[arg(long, short = 'e')]
        entity: Option<String>,

        /// Only bookings that have not started yet
        #[arg(long)]
        upcoming: bool,
    },

    /// Library checkouts
    Checkouts {
        #[arg(long, short = 'e')]
        entity: Option<String>,
    },

    /// Free-text observation notes
    Notes {
        #[arg(long, short = 'e')]
        entity: Option<String>,

        /// Only notes from this source system
        #[arg(long, short = 's')]
        source: Option<String>,
    },

    /// CCTV frame metadata
    Cctv {
        /// Only frames from this location
        #[arg(long)]
        location: Option<String>,

        #[arg(long, short = 'l', default_value = "50")]
        limit: u32,
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
    /// Print the effective configuration
    Show,

    /// Print the config file path
    Path,

    /// Write a starter config file with defaults
    Init,
}
