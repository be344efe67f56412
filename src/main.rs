// emsctl - main.rs
//
// Binary entry point. Handles:
// 1. CLI argument parsing
// 2. Config loading and logging initialisation (debug mode support)
// 3. Command dispatch

mod commands;

// Re-export modules from the library crate so that `commands.rs` and other
// binary-side code can still use `crate::app::...`, `crate::core::...` etc.
pub use emsctl::api;
pub use emsctl::app;
pub use emsctl::core;
pub use emsctl::platform;
pub use emsctl::util;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::core::model::LineCount;

/// emsctl - Command-line console for an employee management service.
///
/// Point emsctl at a running service to manage employees and departments,
/// bulk-import rosters from CSV, and inspect the service activity log.
#[derive(Parser, Debug)]
#[command(name = "emsctl", version, about)]
struct Cli {
    /// Base URL of the employee service (overrides config.toml).
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in to the service and persist the session.
    Login {
        /// Account username.
        #[arg(short, long)]
        username: String,

        /// Account password.
        #[arg(short, long)]
        password: String,

        /// Current MFA code, required when the account has MFA enabled.
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Delete the persisted session.
    Logout,

    /// Register a new console account.
    Register {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Reset an account password.
    ResetPassword {
        #[arg(short, long)]
        username: String,

        /// New password to set.
        #[arg(short = 'n', long)]
        new_password: String,

        /// Current MFA code, required when the account has MFA enabled.
        #[arg(short, long)]
        code: Option<String>,
    },

    /// Manage employee records.
    #[command(subcommand)]
    Employees(EmployeeCommand),

    /// Manage departments.
    #[command(subcommand)]
    Departments(DepartmentCommand),

    /// View the service activity log.
    Logs {
        /// Lines to fetch: one of 50, 100, 200, 500, 1000.
        #[arg(short, long)]
        lines: Option<LineCount>,

        /// Only show records whose user contains this text.
        #[arg(short, long)]
        user: Option<String>,

        /// Only show records whose action contains this text.
        #[arg(short, long)]
        action: Option<String>,

        /// Print the raw log text instead of the parsed table.
        #[arg(long)]
        raw: bool,
    },

    /// Aggregate staff statistics.
    Stats,

    /// Manage MFA for the logged-in account.
    #[command(subcommand)]
    Mfa(MfaCommand),

    /// Manage the profile image for the logged-in account.
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand, Debug)]
enum EmployeeCommand {
    /// List employees.
    List {
        /// Case-insensitive substring match on first name, last name or email.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one employee.
    Show { id: u64 },

    /// Create an employee.
    Add {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        /// Age in years. Omit if unknown.
        #[arg(long)]
        age: Option<i32>,

        /// Department the employee belongs to.
        #[arg(long)]
        department_id: u64,
    },

    /// Replace an employee record.
    Update {
        id: u64,

        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        #[arg(long)]
        email: String,

        /// Age in years. Omit if unknown.
        #[arg(long)]
        age: Option<i32>,

        /// Department the employee belongs to.
        #[arg(long)]
        department_id: u64,
    },

    /// Delete one or more employees.
    Delete {
        /// Ids to delete, processed in order.
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Bulk-import employees from a CSV file.
    Import {
        /// CSV file with header firstName,lastName,email,age,departmentId.
        file: PathBuf,
    },

    /// Export all employees as CSV, to a file or stdout.
    Export {
        /// Destination file; omit to write to stdout.
        file: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
enum DepartmentCommand {
    /// List departments.
    List {
        /// Case-insensitive substring match on the department name.
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Create a department.
    Add { name: String },

    /// Rename a department.
    Rename {
        id: u64,

        #[arg(long)]
        name: String,
    },

    /// Delete one or more departments.
    Delete {
        /// Ids to delete, processed in order.
        #[arg(required = true)]
        ids: Vec<u64>,
    },
}

#[derive(Subcommand, Debug)]
enum MfaCommand {
    /// Show whether MFA is enabled for the account.
    Status,

    /// Begin enrolment: prints the shared secret and otpauth URL.
    Setup,

    /// Confirm enrolment with a code from your authenticator.
    Enable {
        #[arg(short, long)]
        code: String,
    },

    /// Turn MFA off.
    Disable,
}

#[derive(Subcommand, Debug)]
enum ProfileCommand {
    /// Print the stored profile image as a data URL.
    Show,

    /// Upload a profile image (png, jpeg, gif or webp).
    Upload { file: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Config is loaded before logging so the configured level can seed the
    // filter; path resolution traces are lost, which is acceptable.
    let paths = platform::config::PlatformPaths::resolve();
    let (config, config_warnings) = platform::config::load_config(&paths.config_dir);

    util::logging::init(cli.debug, config.log_level.as_deref());

    tracing::debug!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        "emsctl starting"
    );

    for warning in &config_warnings {
        tracing::warn!("{warning}");
    }

    if let Err(e) = commands::run(cli, config, paths).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
