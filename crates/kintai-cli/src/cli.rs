//! Command-line client for the Kintai attendance and expense pages.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kintai_api_models::Punch;
use kintai_config::{ClientConfig, ConfigLoader, validate::validate};
use kintai_telemetry::{CommandSpan, LogFormat, LoggingConfig, init_logging};
use tracing::Instrument;
use url::Url;

use crate::client::{AppContext, CliError, CliResult, parse_url};
use crate::commands::{account, admin, attendance, expense, memo, profile};

/// Parses CLI arguments, resolves configuration, and executes the requested
/// command. Returns the process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let command_name = command_label(&cli.command);

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            return err.exit_code();
        }
    };

    let logging = LoggingConfig {
        level: &config.logging.level,
        format: LogFormat::from_setting(config.logging.format.as_deref()),
        build_sha: option_env!("KINTAI_BUILD_SHA").unwrap_or(env!("CARGO_PKG_VERSION")),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: logging disabled: {err}");
    }

    let span = CommandSpan::new(command_name);
    let result = match AppContext::from_config(&config) {
        Ok(ctx) => {
            let ctx = ctx.with_span(span.clone());
            dispatch(cli.command, cli.output, &ctx)
                .instrument(span.span().clone())
                .await
        }
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

fn resolve_config(cli: &Cli) -> CliResult<ClientConfig> {
    let mut loader = ConfigLoader::from_process_env();
    if let Some(path) = &cli.config {
        loader = loader.with_file(path);
    }
    let mut config = loader
        .load()
        .map_err(|err| CliError::validation(err.describe()))?;

    if let Some(url) = &cli.api_url {
        config.backend.api_url = url.clone();
    }
    if let Some(endpoint) = &cli.identity_endpoint {
        config.identity.endpoint = endpoint.clone();
    }
    if let Some(timeout) = cli.timeout {
        config.http.timeout_secs = timeout;
    }
    validate(&config).map_err(|err| CliError::validation(err.describe()))?;
    Ok(config)
}

async fn dispatch(command: Command, output: OutputFormat, ctx: &AppContext) -> CliResult<()> {
    match command {
        Command::Login(args) => account::handle_login(ctx, args).await,
        Command::Signup(args) => account::handle_signup(ctx, args).await,
        Command::Confirm(args) => account::handle_confirm(ctx, args).await,
        Command::ResendCode(args) => account::handle_resend_code(ctx, args).await,
        Command::Logout => account::handle_logout(ctx),
        Command::Whoami => account::handle_whoami(ctx, output).await,
        Command::Admin => admin::handle_admin(ctx, output).await,
        Command::Memo(command) => match command {
            MemoCommand::List => memo::handle_list(ctx, output).await,
            MemoCommand::Add(args) => memo::handle_add(ctx, args, output).await,
        },
        Command::Attendance(command) => match command {
            AttendanceCommand::List => attendance::handle_list(ctx, output).await,
            AttendanceCommand::Today => attendance::handle_today(ctx, output).await,
            AttendanceCommand::Start => attendance::handle_punch(ctx, Punch::Start, output).await,
            AttendanceCommand::BreakStart => {
                attendance::handle_punch(ctx, Punch::BreakStart, output).await
            }
            AttendanceCommand::BreakEnd => {
                attendance::handle_punch(ctx, Punch::BreakEnd, output).await
            }
            AttendanceCommand::End => attendance::handle_punch(ctx, Punch::End, output).await,
            AttendanceCommand::Edit(args) => attendance::handle_edit(ctx, args).await,
            AttendanceCommand::Delete(args) => attendance::handle_delete(ctx, args).await,
        },
        Command::Expense(command) => match command {
            ExpenseCommand::List => expense::handle_list(ctx, output).await,
            ExpenseCommand::Add(args) => expense::handle_add(ctx, args).await,
            ExpenseCommand::Edit(args) => expense::handle_edit(ctx, args).await,
            ExpenseCommand::Delete(args) => expense::handle_delete(ctx, args).await,
        },
        Command::Profile(command) => match command {
            ProfileCommand::Show => profile::handle_show(ctx, output).await,
            ProfileCommand::Update(args) => profile::handle_update(ctx, args, output).await,
        },
    }
}

#[derive(Parser)]
#[command(name = "kintai", about = "Attendance, expense and profile client for Kintai")]
struct Cli {
    #[arg(long, global = true, help = "JSON configuration file (overrides KINTAI_CONFIG)")]
    config: Option<PathBuf>,
    #[arg(long, global = true, value_parser = parse_url)]
    api_url: Option<Url>,
    #[arg(long, global = true, value_parser = parse_url)]
    identity_endpoint: Option<Url>,
    #[arg(long, global = true, help = "HTTP timeout in seconds")]
    timeout: Option<u64>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
enum Command {
    /// Sign in and store the access token.
    Login(LoginArgs),
    /// Register a new account.
    Signup(SignupArgs),
    /// Confirm a registration with the emailed code.
    Confirm(ConfirmArgs),
    /// Send the confirmation code again.
    ResendCode(EmailArgs),
    /// Forget the stored access token.
    Logout,
    /// Show the signed-in identity.
    Whoami,
    /// Open the administrator page.
    Admin,
    #[command(subcommand)]
    Memo(MemoCommand),
    #[command(subcommand)]
    Attendance(AttendanceCommand),
    #[command(subcommand)]
    Expense(ExpenseCommand),
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand)]
enum MemoCommand {
    List,
    Add(MemoAddArgs),
}

#[derive(Subcommand)]
enum AttendanceCommand {
    List,
    Today,
    /// Clock in.
    Start,
    BreakStart,
    BreakEnd,
    /// Clock out.
    End,
    Edit(AttendanceEditArgs),
    Delete(RecordIdArgs),
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
enum ExpenseCommand {
    List,
    Add(ExpenseAddArgs),
    Edit(ExpenseEditArgs),
    Delete(RecordIdArgs),
}

#[derive(Subcommand)]
#[allow(clippy::large_enum_variant)]
enum ProfileCommand {
    Show,
    Update(ProfileUpdateArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "KINTAI_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct SignupArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long, env = "KINTAI_PASSWORD", hide_env_values = true)]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct ConfirmArgs {
    #[arg(long)]
    pub(crate) email: String,
    #[arg(long)]
    pub(crate) code: String,
}

#[derive(Args)]
pub(crate) struct EmailArgs {
    #[arg(long)]
    pub(crate) email: String,
}

#[derive(Args)]
pub(crate) struct MemoAddArgs {
    #[arg(long)]
    pub(crate) title: String,
    #[arg(long, default_value = "")]
    pub(crate) content: String,
}

#[derive(Args)]
pub(crate) struct RecordIdArgs {
    #[arg(help = "Record identifier")]
    pub(crate) id: i64,
}

#[derive(Args, Default)]
pub(crate) struct AttendanceEditArgs {
    #[arg(help = "Attendance record identifier")]
    pub(crate) id: i64,
    #[arg(long, help = "Clock-in time, HH:MM")]
    pub(crate) start: Option<String>,
    #[arg(long, help = "Break start, HH:MM (empty clears)")]
    pub(crate) break_start: Option<String>,
    #[arg(long, help = "Break end, HH:MM (empty clears)")]
    pub(crate) break_end: Option<String>,
    #[arg(long, help = "Clock-out time, HH:MM (empty clears)")]
    pub(crate) end: Option<String>,
    #[arg(long)]
    pub(crate) status: Option<String>,
}

#[derive(Args, Default)]
pub(crate) struct ExpenseAddArgs {
    #[arg(long, help = "Expense date, YYYY-MM-DD")]
    pub(crate) date: String,
    #[arg(long)]
    pub(crate) from: String,
    #[arg(long)]
    pub(crate) to: String,
    #[arg(long, default_value = "")]
    pub(crate) method: String,
    #[arg(long)]
    pub(crate) purpose: String,
    #[arg(long, help = "Amount in yen")]
    pub(crate) amount: String,
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    #[arg(long)]
    pub(crate) receipt: bool,
}

#[derive(Args, Default)]
pub(crate) struct ExpenseEditArgs {
    #[arg(help = "Expense report identifier")]
    pub(crate) id: i64,
    #[arg(long)]
    pub(crate) date: Option<String>,
    #[arg(long)]
    pub(crate) from: Option<String>,
    #[arg(long)]
    pub(crate) to: Option<String>,
    #[arg(long)]
    pub(crate) method: Option<String>,
    #[arg(long)]
    pub(crate) purpose: Option<String>,
    #[arg(long)]
    pub(crate) amount: Option<String>,
    #[arg(long)]
    pub(crate) description: Option<String>,
    #[arg(long)]
    pub(crate) receipt: Option<bool>,
}

#[derive(Args, Default)]
pub(crate) struct ProfileUpdateArgs {
    #[arg(long)]
    pub(crate) display_name: Option<String>,
    #[arg(long)]
    pub(crate) email: Option<String>,
    #[arg(long)]
    pub(crate) phone: Option<String>,
    #[arg(long)]
    pub(crate) postal_code: Option<String>,
    #[arg(long)]
    pub(crate) prefecture: Option<String>,
    #[arg(long)]
    pub(crate) city: Option<String>,
    #[arg(long)]
    pub(crate) address: Option<String>,
    #[arg(long)]
    pub(crate) building: Option<String>,
    #[arg(long)]
    pub(crate) department: Option<String>,
    #[arg(long)]
    pub(crate) position: Option<String>,
    #[arg(long)]
    pub(crate) employee_number: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub(crate) hire_date: Option<String>,
    #[arg(long, help = "YYYY-MM-DD")]
    pub(crate) birth_date: Option<String>,
    #[arg(long)]
    pub(crate) emergency_contact_name: Option<String>,
    #[arg(long)]
    pub(crate) emergency_contact_phone: Option<String>,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    #[default]
    Table,
    Json,
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Login(_) => "login",
        Command::Signup(_) => "signup",
        Command::Confirm(_) => "confirm",
        Command::ResendCode(_) => "resend_code",
        Command::Logout => "logout",
        Command::Whoami => "whoami",
        Command::Admin => "admin",
        Command::Memo(MemoCommand::List) => "memo_list",
        Command::Memo(MemoCommand::Add(_)) => "memo_add",
        Command::Attendance(command) => match command {
            AttendanceCommand::List => "attendance_list",
            AttendanceCommand::Today => "attendance_today",
            AttendanceCommand::Start => "attendance_start",
            AttendanceCommand::BreakStart => "attendance_break_start",
            AttendanceCommand::BreakEnd => "attendance_break_end",
            AttendanceCommand::End => "attendance_end",
            AttendanceCommand::Edit(_) => "attendance_edit",
            AttendanceCommand::Delete(_) => "attendance_delete",
        },
        Command::Expense(command) => match command {
            ExpenseCommand::List => "expense_list",
            ExpenseCommand::Add(_) => "expense_add",
            ExpenseCommand::Edit(_) => "expense_edit",
            ExpenseCommand::Delete(_) => "expense_delete",
        },
        Command::Profile(ProfileCommand::Show) => "profile_show",
        Command::Profile(ProfileCommand::Update(_)) => "profile_update",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "kintai",
            "attendance",
            "today",
            "--output",
            "json",
            "--api-url",
            "http://127.0.0.1:9000",
        ])
        .expect("arguments parse");
        assert_eq!(cli.output, OutputFormat::Json);
        assert_eq!(
            cli.api_url.as_ref().map(Url::as_str),
            Some("http://127.0.0.1:9000/")
        );
        assert_eq!(command_label(&cli.command), "attendance_today");
    }

    #[test]
    fn invalid_url_flag_is_rejected() {
        let result = Cli::try_parse_from(["kintai", "--api-url", "not a url", "whoami"]);
        assert!(result.is_err());
    }

    #[test]
    fn command_label_matches_variants() {
        assert_eq!(
            command_label(&Command::Expense(ExpenseCommand::Delete(RecordIdArgs { id: 4 }))),
            "expense_delete"
        );
        assert_eq!(
            command_label(&Command::ResendCode(EmailArgs {
                email: "a@example.com".to_string()
            })),
            "resend_code"
        );
    }

    #[test]
    fn flag_overrides_apply_after_environment() {
        let cli = Cli::try_parse_from(["kintai", "--timeout", "0", "whoami"])
            .expect("arguments parse");
        let err = resolve_config(&cli).expect_err("zero timeout is invalid");
        assert!(matches!(err, CliError::Validation(ref message) if message.contains("timeout")));
    }
}
