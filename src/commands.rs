// emsctl - commands.rs
//
// Binary-side command handlers: build the client from config and session,
// run one command, render the result to stdout. All pipeline logic lives
// in the library; this module is wiring and presentation only.

use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::api::auth::{AuthOutcome, Session};
use crate::api::backend::Backend;
use crate::api::rest::RestClient;
use crate::app::session::{self, SessionData};
use crate::app::{bulk, import, logs};
use crate::core::filter::{self, LogFilter};
use crate::core::model::{DepartmentRef, Employee, LineCount, NewEmployee};
use crate::core::{export, logparse, stats};
use crate::platform::config::{AppConfig, PlatformPaths};
use crate::util::error::{EmsError, ImportError, Result};
use crate::{Cli, Command, DepartmentCommand, EmployeeCommand, MfaCommand, ProfileCommand};

/// Everything a command handler needs: the configured client, the
/// restored session (if any) and where to persist it.
struct Context {
    client: RestClient,
    session: Option<SessionData>,
    session_file: PathBuf,
    default_lines: LineCount,
}

impl Context {
    /// Username of the logged-in account, or an actionable error.
    fn require_username(&self) -> Result<&str> {
        self.session
            .as_ref()
            .map(|s| s.username.as_str())
            .ok_or_else(|| {
                EmsError::Session("not logged in. Run 'emsctl login' first".to_string())
            })
    }
}

/// Dispatch one parsed command line.
pub async fn run(cli: Cli, config: AppConfig, paths: PlatformPaths) -> Result<()> {
    let session_file = session::session_path(&paths.data_dir);
    let session_data = session::load(&session_file);

    let base_url = cli.base_url.as_deref().unwrap_or(&config.base_url);
    let client = RestClient::new(
        base_url,
        Duration::from_secs(config.timeout_secs),
        session_data.as_ref().map(|d| Session {
            username: d.username.clone(),
            token: d.token.clone(),
        }),
    )?;

    let ctx = Context {
        client,
        session: session_data,
        session_file,
        default_lines: config.default_lines,
    };

    match cli.command {
        Command::Login {
            username,
            password,
            code,
        } => login(&ctx, &username, &password, code.as_deref()).await,
        Command::Logout => logout(&ctx),
        Command::Register { username, password } => register(&ctx, &username, &password).await,
        Command::ResetPassword {
            username,
            new_password,
            code,
        } => reset_password(&ctx, &username, &new_password, code.as_deref()).await,
        Command::Employees(cmd) => employees(&ctx, cmd).await,
        Command::Departments(cmd) => departments(&ctx, cmd).await,
        Command::Logs {
            lines,
            user,
            action,
            raw,
        } => show_logs(&ctx, lines, user, action, raw).await,
        Command::Stats => show_stats(&ctx).await,
        Command::Mfa(cmd) => mfa(&ctx, cmd).await,
        Command::Profile(cmd) => profile(&ctx, cmd).await,
    }
}

// =============================================================================
// Authentication
// =============================================================================

async fn login(ctx: &Context, username: &str, password: &str, code: Option<&str>) -> Result<()> {
    match ctx.client.login(username, password, code).await? {
        AuthOutcome::Session(new_session) => {
            session::save(&SessionData::new(&new_session), &ctx.session_file)
                .map_err(EmsError::Session)?;
            println!("Logged in as {}.", new_session.username);
        }
        AuthOutcome::MfaRequired => {
            println!("This account requires an MFA code. Re-run with --code <CODE>.");
        }
    }
    Ok(())
}

fn logout(ctx: &Context) -> Result<()> {
    session::delete(&ctx.session_file).map_err(EmsError::Session)?;
    println!("Logged out.");
    Ok(())
}

async fn register(ctx: &Context, username: &str, password: &str) -> Result<()> {
    ctx.client.register(username, password).await?;
    println!("Account '{username}' registered. Log in with 'emsctl login'.");
    Ok(())
}

async fn reset_password(
    ctx: &Context,
    username: &str,
    new_password: &str,
    code: Option<&str>,
) -> Result<()> {
    ctx.client
        .reset_password(username, new_password, code)
        .await?;
    println!("Password reset for '{username}'.");
    Ok(())
}

// =============================================================================
// Employees
// =============================================================================

async fn employees(ctx: &Context, cmd: EmployeeCommand) -> Result<()> {
    match cmd {
        EmployeeCommand::List { search } => {
            let all = ctx.client.list_employees().await?;
            let shown = filter::filter_employees(&all, search.as_deref().unwrap_or(""));
            print_employee_table(&all, &shown);
            Ok(())
        }

        EmployeeCommand::Show { id } => {
            let e = ctx.client.get_employee(id).await?;
            println!("ID:          {}", e.id);
            println!("Name:        {} {}", e.first_name, e.last_name);
            println!("Email:       {}", e.email);
            println!("Age:         {}", e.age);
            match &e.department {
                Some(d) => println!("Department:  {} ({})", d.name, d.id),
                None => println!("Department:  -"),
            }
            Ok(())
        }

        EmployeeCommand::Add {
            first_name,
            last_name,
            email,
            age,
            department_id,
        } => {
            let payload = NewEmployee {
                first_name,
                last_name,
                email,
                age,
                department: DepartmentRef { id: department_id },
            };
            let created = ctx.client.create_employee(&payload).await?;
            println!(
                "Created employee {} {} ({}).",
                created.first_name, created.last_name, created.id
            );
            Ok(())
        }

        EmployeeCommand::Update {
            id,
            first_name,
            last_name,
            email,
            age,
            department_id,
        } => {
            let payload = NewEmployee {
                first_name,
                last_name,
                email,
                age,
                department: DepartmentRef { id: department_id },
            };
            let updated = ctx.client.update_employee(id, &payload).await?;
            println!(
                "Updated employee {} {} ({}).",
                updated.first_name, updated.last_name, updated.id
            );
            Ok(())
        }

        EmployeeCommand::Delete { ids } => {
            let bar = percent_bar("Deleting");
            let report = bulk::bulk_apply(
                "employee",
                &ids,
                |id| ctx.client.delete_employee(id),
                |p| bar.set_position(u64::from(p)),
            )
            .await;
            bar.finish();

            println!("Deleted {} of {} employees.", report.applied, report.total);
            for error in &report.errors {
                println!("  {error}");
            }

            let remaining = ctx.client.list_employees().await?;
            println!("{} employees remain.", remaining.len());
            Ok(())
        }

        EmployeeCommand::Import { file } => {
            let text = std::fs::read_to_string(&file).map_err(|source| ImportError::File {
                path: file.clone(),
                source,
            })?;

            let bar = percent_bar("Importing");
            let report =
                import::run_import(&ctx.client, &text, &file, |p| bar.set_position(u64::from(p)))
                    .await?;
            bar.finish();

            println!("Imported {} of {} rows.", report.imported, report.total_rows);
            for warning in &report.warnings {
                println!("  {warning}");
            }

            // Refresh from the authoritative list so the final count
            // reflects what the service actually stored.
            let all = ctx.client.list_employees().await?;
            println!("{} employees now on record.", all.len());
            Ok(())
        }

        EmployeeCommand::Export { file } => {
            let all = ctx.client.list_employees().await?;
            match file {
                Some(file) => {
                    let writer = std::fs::File::create(&file).map_err(|source| EmsError::Io {
                        path: file.clone(),
                        operation: "create",
                        source,
                    })?;
                    let count = export::export_csv(&all, writer, &file)?;
                    println!("Exported {count} employees to {}.", file.display());
                }
                None => {
                    // Summary goes to stderr so the CSV stream stays clean.
                    let stdout = std::io::stdout();
                    let count = export::export_csv(&all, stdout.lock(), Path::new("-"))?;
                    eprintln!("Exported {count} employees.");
                }
            }
            Ok(())
        }
    }
}

fn print_employee_table(all: &[Employee], indices: &[usize]) {
    if indices.is_empty() {
        println!("No employees found.");
        return;
    }

    println!(
        "{:<6} {:<24} {:<30} {:>4}  {}",
        "ID", "NAME", "EMAIL", "AGE", "DEPARTMENT"
    );
    for &i in indices {
        let e = &all[i];
        let department = e.department.as_ref().map(|d| d.name.as_str()).unwrap_or("-");
        println!(
            "{:<6} {:<24} {:<30} {:>4}  {}",
            e.id,
            format!("{} {}", e.first_name, e.last_name),
            e.email,
            e.age,
            department
        );
    }
    println!("\n{} of {} employees shown.", indices.len(), all.len());
}

// =============================================================================
// Departments
// =============================================================================

async fn departments(ctx: &Context, cmd: DepartmentCommand) -> Result<()> {
    match cmd {
        DepartmentCommand::List { search } => {
            let all = ctx.client.list_departments().await?;
            let shown = filter::filter_departments(&all, search.as_deref().unwrap_or(""));
            if shown.is_empty() {
                println!("No departments found.");
                return Ok(());
            }
            println!("{:<6} {}", "ID", "NAME");
            for &i in &shown {
                let d = &all[i];
                println!("{:<6} {}", d.id, d.name);
            }
            println!("\n{} of {} departments shown.", shown.len(), all.len());
            Ok(())
        }

        DepartmentCommand::Add { name } => {
            let created = ctx.client.create_department(&name).await?;
            println!("Created department '{}' ({}).", created.name, created.id);
            Ok(())
        }

        DepartmentCommand::Rename { id, name } => {
            let updated = ctx.client.update_department(id, &name).await?;
            println!("Department {} renamed to '{}'.", updated.id, updated.name);
            Ok(())
        }

        DepartmentCommand::Delete { ids } => {
            let bar = percent_bar("Deleting");
            let report = bulk::bulk_apply(
                "department",
                &ids,
                |id| ctx.client.delete_department(id),
                |p| bar.set_position(u64::from(p)),
            )
            .await;
            bar.finish();

            println!(
                "Deleted {} of {} departments.",
                report.applied, report.total
            );
            for error in &report.errors {
                println!("  {error}");
            }

            let remaining = ctx.client.list_departments().await?;
            println!("{} departments remain.", remaining.len());
            Ok(())
        }
    }
}

// =============================================================================
// Activity log
// =============================================================================

async fn show_logs(
    ctx: &Context,
    lines: Option<LineCount>,
    user: Option<String>,
    action: Option<String>,
    raw: bool,
) -> Result<()> {
    let lines = lines.unwrap_or(ctx.default_lines);
    let view = logs::fetch_log_view(&ctx.client, lines).await?;

    if raw {
        print_raw(&view.raw);
        return Ok(());
    }

    if view.is_unstructured() {
        println!("No structured records parsed; raw output follows.\n");
        print_raw(&view.raw);
        return Ok(());
    }

    let log_filter = LogFilter {
        user: user.unwrap_or_default(),
        action: action.unwrap_or_default(),
    };
    let indices = filter::apply_log_filter(&view.records, &log_filter);

    if indices.is_empty() {
        println!(
            "No records match the filter ({} parsed).",
            view.records.len()
        );
        return Ok(());
    }

    println!(
        "{:<23} {:<5} {:<12} {:<14} {:<10} {:>6}  {}",
        "TIME", "LEVEL", "USER", "ACTION", "ENTITY", "ID", "DETAILS"
    );
    for &i in &indices {
        let r = &view.records[i];
        // Width specifiers only pad types that honour them; chrono's
        // DelayedFormat does not, so render the timestamp to a String.
        let time = r.timestamp.format(logparse::TIME_FORMAT).to_string();
        println!(
            "{:<23} {:<5} {:<12} {:<14} {:<10} {:>6}  {}",
            time,
            r.level,
            r.user,
            r.action.as_str(),
            r.entity.as_str(),
            r.id.map(|id| id.to_string()).unwrap_or_else(|| "-".into()),
            r.details.as_deref().unwrap_or("").trim(),
        );
    }
    println!("\n{} of {} records shown.", indices.len(), view.records.len());
    Ok(())
}

fn print_raw(text: &str) {
    if text.is_empty() {
        println!("(no log output)");
        return;
    }
    print!("{text}");
    if !text.ends_with('\n') {
        println!();
    }
}

// =============================================================================
// Statistics
// =============================================================================

async fn show_stats(ctx: &Context) -> Result<()> {
    let employees = ctx.client.list_employees().await?;
    let departments = ctx.client.list_departments().await?;
    let summary = stats::summarize(&employees, &departments);

    println!("Employees:    {}", summary.employee_count);
    println!("Departments:  {}", summary.department_count);
    println!("Average age:  {:.1}", summary.average_age);
    println!();
    println!("Age distribution");
    for band in &summary.age_bands {
        println!(
            "  {:<6} {:>4}  {}",
            band.label,
            band.count,
            "#".repeat(band.count.min(50))
        );
    }
    Ok(())
}

// =============================================================================
// MFA and profile
// =============================================================================

async fn mfa(ctx: &Context, cmd: MfaCommand) -> Result<()> {
    let username = ctx.require_username()?.to_string();
    match cmd {
        MfaCommand::Status => {
            let enabled = ctx.client.mfa_status(&username).await?;
            println!(
                "MFA is {} for {username}.",
                if enabled { "enabled" } else { "disabled" }
            );
        }
        MfaCommand::Setup => {
            let setup = ctx.client.mfa_setup(&username).await?;
            println!("Secret:      {}", setup.secret);
            println!("Otpauth URL: {}", setup.qr_url);
            println!();
            println!(
                "Add the secret to your authenticator, then confirm with \
                 'emsctl mfa enable --code <CODE>'."
            );
        }
        MfaCommand::Enable { code } => {
            ctx.client.mfa_enable(&username, &code).await?;
            println!("MFA enabled for {username}.");
        }
        MfaCommand::Disable => {
            ctx.client.mfa_disable(&username).await?;
            println!("MFA disabled for {username}.");
        }
    }
    Ok(())
}

async fn profile(ctx: &Context, cmd: ProfileCommand) -> Result<()> {
    let username = ctx.require_username()?.to_string();
    match cmd {
        ProfileCommand::Show => match ctx.client.fetch_profile_image(&username).await? {
            Some(data_url) => println!("{data_url}"),
            None => println!("No profile image set."),
        },
        ProfileCommand::Upload { file } => {
            let bytes = std::fs::read(&file).map_err(|source| EmsError::Io {
                path: file.clone(),
                operation: "read",
                source,
            })?;
            let mime = image_mime(&file);
            ctx.client
                .upload_profile_image(&username, mime, &bytes)
                .await?;
            println!("Profile image uploaded ({} bytes).", bytes.len());
        }
    }
    Ok(())
}

/// Content type inferred from the file extension. The service stores the
/// data URL verbatim, so an unrecognised extension degrades to a generic
/// type rather than failing the upload.
fn image_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

// =============================================================================
// Progress rendering
// =============================================================================

/// A 0-100 progress bar fed by the pipeline progress callbacks.
fn percent_bar(label: &str) -> ProgressBar {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    bar.set_message(label.to_string());
    bar
}
