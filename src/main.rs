//! CLI entry point for brecha.

mod cli;
mod cmd;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use std::io;
use std::process::ExitCode;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brecha::views::Envelope;
use brecha::EngineError;

use cli::{Cli, Commands, ItemCommands, ProjectCommands};
use cmd::Output;

/// Environment variable holding the default log filter.
const LOG_ENV: &str = "BRECHA_LOG";

fn init_tracing(level: Option<&str>) {
    let filter = level
        .and_then(|l| EnvFilter::try_new(l).ok())
        .or_else(|| EnvFilter::try_from_env(LOG_ENV).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(io::stderr),
        )
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let out = Output { json: cli.json };
    match run(cli.command, out) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) if err.downcast_ref::<cmd::Reported>().is_some() => ExitCode::FAILURE,
        Err(err) => {
            if out.json {
                let err = match err.downcast::<EngineError>() {
                    Ok(engine_err) => engine_err,
                    Err(other) => EngineError::Storage(other),
                };
                let envelope = Envelope::<()>::failure(&err);
                match serde_json::to_string_pretty(&envelope) {
                    Ok(text) => println!("{}", text),
                    Err(e) => eprintln!("{} {}", "Error:".red(), e),
                }
            } else {
                eprintln!("{} {:#}", "Error:".red(), err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands, out: Output) -> Result<()> {
    match command {
        Commands::Init { org, force } => cmd::init::cmd_init(org, force),
        Commands::Project { command } => match command {
            ProjectCommands::Add(args) => cmd::project::cmd_add(out, args),
            ProjectCommands::List => cmd::project::cmd_list(out),
            ProjectCommands::Show { project } => cmd::project::cmd_show(out, &project),
            ProjectCommands::Start { project } => cmd::project::cmd_start(out, &project),
            ProjectCommands::Suspend { project } => cmd::project::cmd_suspend(out, &project),
            ProjectCommands::Resume { project } => cmd::project::cmd_resume(out, &project),
            ProjectCommands::Cancel { project } => cmd::project::cmd_cancel(out, &project),
            ProjectCommands::Spend { project, amount } => {
                cmd::project::cmd_spend(out, &project, amount)
            }
        },
        Commands::Item { command } => match command {
            ItemCommands::Add(args) => cmd::item::cmd_add(out, args),
            ItemCommands::Update(args) => cmd::item::cmd_update(out, args),
            ItemCommands::Remove { project, numero } => {
                cmd::item::cmd_remove(out, &project, numero)
            }
            ItemCommands::List { project } => cmd::item::cmd_list(out, &project),
        },
        Commands::Request {
            project,
            by,
            comentarios,
            validador,
        } => cmd::approval::cmd_request(out, &project, &by, comentarios, validador),
        Commands::Approve {
            project,
            request,
            by,
            observaciones,
        } => cmd::approval::cmd_approve(out, &project, request, &by, observaciones),
        Commands::Reject {
            project,
            request,
            by,
            observaciones,
        } => cmd::approval::cmd_reject(out, &project, request, &by, &observaciones),
        Commands::Status { project } => cmd::approval::cmd_status(out, &project),
        Commands::Serve => {
            let engine = cmd::open_engine()?;
            brecha::rpc::run_server(&engine)
        }
        Commands::Version { verbose } => cmd_version(verbose),
        Commands::Completion { shell } => cmd_completion(shell),
    }
}

fn cmd_version(verbose: bool) -> Result<()> {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    println!("brecha {}", VERSION);

    if verbose {
        const GIT_SHA: &str = env!("GIT_SHA");
        const BUILD_DATE: &str = env!("BUILD_DATE");
        println!("commit: {}", GIT_SHA);
        println!("built: {}", BUILD_DATE);
    }

    Ok(())
}

fn cmd_completion(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "brecha", &mut io::stdout());
    Ok(())
}
