//! qthrottle CLI - throttled submission of shell commands to a Grid Engine queue

mod console;
mod logging;
mod settings;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use tabled::{Table, Tabled};
use tracing::info;

use qthrottle_core::application::constants::SUBMIT_SETTLE_DELAY;
use qthrottle_core::application::{
    shutdown_channel, AdmissionController, JobSubmitter, QueueInspector,
};
use qthrottle_core::domain::{JobEnvironment, Principal, QueueSnapshot};
use qthrottle_core::port::id_provider::UuidProvider;
use qthrottle_core::port::{QueueBackend, Sleeper, TokioSleeper};
use qthrottle_core::AppError;
use qthrottle_infra_system::{current_principal, FileScriptWriter, SgeBackend};

use console::ConsoleObserver;
use settings::{FileSettings, QueueOptions, Settings};

#[derive(Parser)]
#[command(name = "qthrottle")]
#[command(about = "Submit shell commands to a Grid Engine queue without flooding it", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (TOML); defaults to the per-user config directory
    #[arg(long, global = true, env = "QTHROTTLE_CONFIG")]
    config: Option<PathBuf>,

    #[command(flatten)]
    options: QueueOptions,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit commands (one per line) as jobs sharing one name
    Submit {
        /// Job name given to every command of the batch
        #[arg(short, long)]
        name: String,

        /// Block until no queued job name contains NAME
        #[arg(short, long)]
        wait: bool,

        /// Read commands from FILE instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Block until no queued job name contains NAME
    Wait {
        /// Job name fragment to wait on
        #[arg(short, long)]
        name: String,
    },

    /// Show outstanding job counts
    Status {
        /// Also count jobs whose name contains this fragment
        #[arg(short, long)]
        name: Option<String>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Tabled)]
struct StatusRow {
    principal: String,
    queue: String,
    outstanding: usize,
    matching: String,
}

/// Commands from a reader: one per line, kept verbatim; blank lines and
/// `#` comments skipped
fn read_commands(reader: impl BufRead) -> Result<Vec<String>> {
    let mut commands = Vec::new();
    for line in reader.lines() {
        let line = line.context("Failed to read commands")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        commands.push(line);
    }
    Ok(commands)
}

fn load_commands(file: Option<&PathBuf>) -> Result<Vec<String>> {
    match file {
        Some(path) => {
            let handle = std::fs::File::open(path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            read_commands(std::io::BufReader::new(handle))
        }
        None => read_commands(std::io::stdin().lock()),
    }
}

fn print_status(
    principal: &Principal,
    settings: &Settings,
    snapshot: QueueSnapshot,
    json: bool,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let row = StatusRow {
        principal: principal.to_string(),
        queue: settings
            .submission
            .queue_name()
            .unwrap_or("(default)")
            .to_string(),
        outstanding: snapshot.total_count,
        matching: snapshot
            .matching_count
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string()),
    };
    println!("{}", Table::new(vec![row]));
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init()?;

    let cli = Cli::parse();
    let file_settings = FileSettings::load(cli.config.as_deref())?;
    let settings = Settings::resolve(&cli.options, file_settings)?;

    let principal = current_principal().context("Failed to determine submitting user")?;
    info!(
        principal = %principal,
        queue = ?settings.submission.queue_name(),
        max_jobs = settings.submission.max_outstanding_jobs(),
        "qthrottle v{} starting",
        qthrottle_core::VERSION
    );

    // Dependency wiring
    let backend: Arc<dyn QueueBackend> = Arc::new(SgeBackend::new(settings.commands.clone()));
    let inspector = QueueInspector::new(
        Arc::clone(&backend),
        settings.submission.queue_name().map(str::to_string),
    );

    if let Commands::Status { name, json } = &cli.command {
        let snapshot = inspector.snapshot(&principal, name.as_deref()).await?;
        return print_status(&principal, &settings, snapshot, *json);
    }

    let materializer = Arc::new(FileScriptWriter::new(
        &settings.script_dir,
        Arc::new(UuidProvider),
    ));
    let sleeper: Arc<dyn Sleeper> = Arc::new(TokioSleeper);
    let submitter = JobSubmitter::new(
        Arc::clone(&backend),
        materializer,
        JobEnvironment::from_vars(std::env::vars()),
    )
    .with_settle_delay(Arc::clone(&sleeper), SUBMIT_SETTLE_DELAY);

    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, stopping after the current step");
            shutdown_tx.shutdown();
        }
    });

    let controller = AdmissionController::new(
        settings.submission.clone(),
        principal,
        inspector,
        submitter,
        sleeper,
    )
    .with_observer(Arc::new(ConsoleObserver))
    .with_shutdown(shutdown_rx);

    let outcome = match &cli.command {
        Commands::Submit { name, wait, file } => {
            let commands = load_commands(file.as_ref())?;
            controller.submit_batch(commands.as_slice(), name, *wait).await
        }
        Commands::Wait { name } => controller.wait_for_drain(name).await,
        Commands::Status { .. } => Ok(()),
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(AppError::Cancelled(activity)) => {
            eprintln!("{}", format!("Interrupted while {}", activity).yellow());
            std::process::exit(130);
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_read_commands_skips_blanks_and_comments_keeps_text_verbatim() {
        let input = "# batch\npython a.py\n\n   \n  python b.py --x 1  \n#python c.py\n";
        let commands = read_commands(input.as_bytes()).unwrap();
        assert_eq!(commands, vec!["python a.py", "  python b.py --x 1  "]);
    }

    #[test]
    fn test_parse_submit_with_global_options() {
        let cli = Cli::try_parse_from([
            "qthrottle",
            "submit",
            "--name",
            "nightly",
            "--wait",
            "-m",
            "20",
            "--extra-options",
            "-l h_vmem=4G",
        ])
        .unwrap();

        assert_eq!(cli.options.max_jobs, Some(20));
        assert_eq!(cli.options.extra_options.as_deref(), Some("-l h_vmem=4G"));
        assert!(matches!(
            cli.command,
            Commands::Submit { ref name, wait: true, file: None } if name == "nightly"
        ));
    }
}
