//! CLI argument definitions for the stockroom tracker.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

/// Environment variable for overriding the data directory.
pub const DATA_DIR_ENV_VAR: &str = "STOCKROOM_DATA_DIR";

/// Resolve the data directory: the `STOCKROOM_DATA_DIR` environment
/// variable first, then `stockroom-data` relative to the working directory.
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
        return PathBuf::from(dir);
    }
    PathBuf::from("stockroom-data")
}

#[derive(Parser)]
#[command(
    name = "stockroom",
    version,
    about = "Office supply stockroom - stock levels, requests, and approvals",
    long_about = "Track office supply stock and the request/approval queue.\n\n\
                  Employees raise requests against the material catalog; admins\n\
                  approve, reject, and issue them, with stock decremented exactly\n\
                  once per issued request."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding the store and session files
    /// (default: ./stockroom-data, or $STOCKROOM_DATA_DIR).
    #[arg(long = "data-dir", value_name = "DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Persistence backend (local snapshot file or shared document store).
    #[arg(long = "backend", value_enum, default_value = "local", global = true)]
    pub backend: BackendArg,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Sign in and save the session.
    Login(LoginArgs),

    /// Clear the saved session.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// Overview counts and current stock levels.
    Dashboard,

    /// Manage the material catalog.
    #[command(subcommand)]
    Material(MaterialCommand),

    /// Manage user accounts.
    #[command(subcommand)]
    User(UserCommand),

    /// Raise requests and work the approval queue.
    #[command(subcommand)]
    Request(RequestCommand),

    /// Export a collection as CSV.
    Export(ExportArgs),
}

#[derive(Args)]
pub struct LoginArgs {
    pub username: String,
    pub password: String,
}

#[derive(Subcommand)]
pub enum MaterialCommand {
    /// List materials, with optional per-column filters and sorting.
    List(MaterialListArgs),

    /// Add a material to the catalog.
    Add {
        name: String,
        stock: u32,
        unit: String,
    },

    /// Update a material; omitted fields keep their current value.
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        stock: Option<u32>,
        #[arg(long)]
        unit: Option<String>,
    },

    /// Remove a material from the catalog.
    Delete { id: u64 },
}

#[derive(Args)]
pub struct MaterialListArgs {
    /// Substring filter on the name column (case-insensitive).
    #[arg(long)]
    pub name: Option<String>,

    /// Substring filter on the stock column.
    #[arg(long)]
    pub stock: Option<String>,

    /// Substring filter on the unit column (case-insensitive).
    #[arg(long)]
    pub unit: Option<String>,

    /// Sort by a column.
    #[arg(long, value_enum)]
    pub sort: Option<MaterialSortArg>,

    /// Sort descending instead of ascending.
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

#[derive(Subcommand)]
pub enum UserCommand {
    /// List user accounts.
    List,

    /// Create a user account.
    Add {
        name: String,
        department: String,
        username: String,
        password: String,
        /// Account role.
        #[arg(long, value_enum, default_value = "user")]
        role: RoleArg,
    },

    /// Update a user; omitted fields keep their current value.
    Update {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        department: Option<String>,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        password: Option<String>,
        #[arg(long, value_enum)]
        role: Option<RoleArg>,
    },

    /// Remove a user account (admins are refused).
    Delete { id: u64 },
}

#[derive(Subcommand)]
pub enum RequestCommand {
    /// List the request queue (pending first, newest first).
    List(RequestListArgs),

    /// Raise a request for the signed-in user.
    Create {
        material_id: u64,
        #[arg(value_parser = clap::value_parser!(u32).range(1..))]
        quantity: u32,
    },

    /// Approve a pending request.
    Approve { id: u64 },

    /// Reject a request.
    Reject { id: u64 },

    /// Issue an approved request, consuming stock.
    Issue { id: u64 },
}

#[derive(Args)]
pub struct RequestListArgs {
    /// Only the signed-in user's requests.
    #[arg(long)]
    pub mine: bool,
}

#[derive(Args)]
pub struct ExportArgs {
    /// Which collection to export.
    #[arg(value_enum)]
    pub collection: ExportCollectionArg,

    /// Where to write the CSV file.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum BackendArg {
    /// Single JSON snapshot file.
    Local,
    /// Shared document store with change notifications.
    Shared,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExportCollectionArg {
    Material,
    Request,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MaterialSortArg {
    Id,
    Name,
    Stock,
    Unit,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum RoleArg {
    Admin,
    User,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
