//! Command-line surface for the Radview report workflow.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use radview_api_models::ReportStatus;
use radview_config::ClientSettings;
use radview_telemetry::{DEFAULT_LOG_LEVEL, LogFormat, LoggingConfig, init_logging};
use tracing::Instrument;
use uuid::Uuid;

use crate::client::{AppContext, CliResult};
use crate::commands::reports::{
    handle_report_edit, handle_report_list, handle_report_predict, handle_report_show,
};
use crate::commands::session::{handle_login, handle_logout, handle_signup, handle_status};
use crate::commands::templates::{
    handle_template_add, handle_template_edit, handle_template_list,
};

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();
    let logging = LoggingConfig {
        level: &cli.log_level,
        format: cli.log_format.unwrap_or_else(LogFormat::infer),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    let trace_id = Uuid::new_v4().to_string();
    let span = radview_telemetry::invocation_span(command_label(&cli.command), &trace_id);

    match dispatch(cli, &trace_id).instrument(span).await {
        Ok(()) => 0,
        Err(err) => {
            let exit_code = err.exit_code();
            eprintln!("error: {}", err.display_message());
            exit_code
        }
    }
}

async fn dispatch(cli: Cli, trace_id: &str) -> CliResult<()> {
    let config = cli.settings().validate()?;
    let mut ctx = AppContext::from_config(&config, trace_id)?;
    let output = cli.output;

    match cli.command {
        Command::Login(args) => handle_login(&mut ctx, args).await,
        Command::Signup(args) => handle_signup(&mut ctx, args).await,
        Command::Logout => {
            handle_logout(&mut ctx);
            Ok(())
        }
        Command::Status => handle_status(&ctx, &config.credential_path, output),
        Command::Reports(reports) => match reports {
            ReportsCommand::Ls(args) => handle_report_list(&ctx, args, output).await,
            ReportsCommand::Show(args) => handle_report_show(&ctx, args, output).await,
            ReportsCommand::Edit(args) => handle_report_edit(&ctx, args, output).await,
            ReportsCommand::Predict(args) => handle_report_predict(&ctx, args, output).await,
        },
        Command::Templates(templates) => match templates {
            TemplatesCommand::Ls => handle_template_list(&ctx, output).await,
            TemplatesCommand::Add(args) => handle_template_add(&ctx, args).await,
            TemplatesCommand::Edit(args) => handle_template_edit(&ctx, args).await,
        },
    }
}

#[derive(Parser)]
#[command(name = "radview", about = "Administrative CLI for X-ray report review")]
pub(crate) struct Cli {
    #[arg(long, global = true, env = "RADVIEW_API_URL", help = "Report service base URL")]
    api_url: Option<String>,
    #[arg(
        long,
        global = true,
        env = "RADVIEW_PREDICT_URL",
        help = "Classifier service base URL"
    )]
    predict_url: Option<String>,
    #[arg(
        long,
        global = true,
        env = "RADVIEW_CREDENTIALS",
        help = "Credential file (defaults to the user config directory)"
    )]
    credentials: Option<PathBuf>,
    #[arg(long, global = true, env = "RADVIEW_HTTP_TIMEOUT_SECS")]
    timeout: Option<u64>,
    #[arg(
        long,
        global = true,
        env = "RADVIEW_PREDICTION_CONCURRENCY",
        help = "Maximum images classified at once"
    )]
    prediction_concurrency: Option<usize>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    output: OutputFormat,
    #[arg(long, global = true, env = "RADVIEW_LOG_LEVEL", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
    #[arg(long, global = true, env = "RADVIEW_LOG_FORMAT")]
    log_format: Option<LogFormat>,
    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn settings(&self) -> ClientSettings {
        ClientSettings {
            api_url: self.api_url.clone(),
            predict_url: self.predict_url.clone(),
            credential_path: self.credentials.clone(),
            timeout_secs: self.timeout,
            prediction_concurrency: self.prediction_concurrency,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Log in and store the session token.
    Login(LoginArgs),
    /// Create an account and store the session token.
    Signup(SignupArgs),
    /// Forget the stored session token.
    Logout,
    /// Show whether a session token is stored.
    Status,
    /// Browse and revise reports.
    #[command(subcommand)]
    Reports(ReportsCommand),
    /// Manage report templates.
    #[command(subcommand)]
    Templates(TemplatesCommand),
}

#[derive(Subcommand)]
pub(crate) enum ReportsCommand {
    /// List one page of reports.
    Ls(ReportListArgs),
    /// Show one report.
    Show(ReportShowArgs),
    /// Change a report and save it.
    Edit(ReportEditArgs),
    /// Classify every image of a report.
    Predict(ReportPredictArgs),
}

#[derive(Subcommand)]
pub(crate) enum TemplatesCommand {
    /// List the template catalog.
    Ls,
    /// Create a template.
    Add(TemplateAddArgs),
    /// Change a template.
    Edit(TemplateEditArgs),
}

#[derive(Args)]
pub(crate) struct LoginArgs {
    #[arg(long, env = "RADVIEW_EMAIL")]
    pub(crate) email: String,
    #[arg(long, env = "RADVIEW_PASSWORD", help = "Prompted for when omitted")]
    pub(crate) password: Option<String>,
}

#[derive(Args)]
pub(crate) struct SignupArgs {
    #[arg(long)]
    pub(crate) username: String,
    #[arg(long, env = "RADVIEW_PASSWORD", help = "Prompted for when omitted")]
    pub(crate) password: Option<String>,
}

#[derive(Args, Default)]
pub(crate) struct ReportListArgs {
    #[arg(long, value_parser = parse_status, help = "Only reports with this status")]
    pub(crate) status: Option<ReportStatus>,
    #[arg(long, help = "Case-insensitive patient name search")]
    pub(crate) search: Option<String>,
    #[arg(long, default_value_t = 1)]
    pub(crate) page: usize,
}

#[derive(Args)]
pub(crate) struct ReportShowArgs {
    #[arg(help = "Report key")]
    pub(crate) id: String,
    #[arg(long, help = "Also classify every image")]
    pub(crate) predict: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct SideEditArg {
    pub(crate) index: usize,
    pub(crate) side: String,
}

#[derive(Args, Default)]
pub(crate) struct ReportEditArgs {
    #[arg(help = "Report key")]
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) history: Option<String>,
    #[arg(
        long = "side",
        value_parser = parse_side_edit,
        help = "Image side label as index=label (repeatable)"
    )]
    pub(crate) sides: Vec<SideEditArg>,
    #[arg(long, help = "Submit a completed report for revision")]
    pub(crate) revise: bool,
    #[arg(long, value_parser = parse_status, requires = "revise")]
    pub(crate) status: Option<ReportStatus>,
    #[arg(long, requires = "revise")]
    pub(crate) feedback: Option<String>,
    #[arg(long, requires = "revise", help = "Apply the template with this heading")]
    pub(crate) template: Option<String>,
}

#[derive(Args)]
pub(crate) struct ReportPredictArgs {
    #[arg(help = "Report key")]
    pub(crate) id: String,
}

#[derive(Args, Default)]
pub(crate) struct TemplateAddArgs {
    #[arg(long)]
    pub(crate) heading: String,
    #[arg(long, default_value = "", help = "Comma-separated findings")]
    pub(crate) findings: String,
    #[arg(long, default_value = "")]
    pub(crate) impression: String,
}

#[derive(Args, Default)]
pub(crate) struct TemplateEditArgs {
    #[arg(help = "Template key")]
    pub(crate) id: String,
    #[arg(long)]
    pub(crate) heading: Option<String>,
    #[arg(long, help = "Comma-separated findings, replacing the current list")]
    pub(crate) findings: Option<String>,
    #[arg(long)]
    pub(crate) impression: Option<String>,
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
        Command::Logout => "logout",
        Command::Status => "status",
        Command::Reports(ReportsCommand::Ls(_)) => "reports_ls",
        Command::Reports(ReportsCommand::Show(_)) => "reports_show",
        Command::Reports(ReportsCommand::Edit(_)) => "reports_edit",
        Command::Reports(ReportsCommand::Predict(_)) => "reports_predict",
        Command::Templates(TemplatesCommand::Ls) => "templates_ls",
        Command::Templates(TemplatesCommand::Add(_)) => "templates_add",
        Command::Templates(TemplatesCommand::Edit(_)) => "templates_edit",
    }
}

fn parse_status(input: &str) -> Result<ReportStatus, String> {
    input.parse().map_err(|err| format!("{err}"))
}

pub(crate) fn parse_side_edit(input: &str) -> Result<SideEditArg, String> {
    let (index, side) = input
        .split_once('=')
        .ok_or_else(|| format!("expected index=label, got '{input}'"))?;
    let index = index
        .trim()
        .parse()
        .map_err(|_| format!("image index must be a non-negative integer, got '{index}'"))?;
    Ok(SideEditArg {
        index,
        side: side.trim().to_string(),
    })
}
