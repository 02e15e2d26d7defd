//! Settings layering: CLI flags / env vars > config file > built-in defaults

use anyhow::{Context, Result};
use clap::Args;
use qthrottle_core::application::constants::{
    DEFAULT_MAX_OUTSTANDING_JOBS, DEFAULT_POLL_INTERVAL,
};
use qthrottle_core::domain::SubmissionConfig;
use qthrottle_infra_system::SgeCommands;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_SCRIPT_DIR: &str = ".";
const CONFIG_FILE_NAME: &str = "config.toml";

/// Queue and submission options shared by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct QueueOptions {
    /// Queue to submit to and list (default queue if omitted)
    #[arg(short, long, global = true, env = "QTHROTTLE_QUEUE")]
    pub queue: Option<String>,

    /// Extra options appended to every qsub call (e.g. "-l h_vmem=4G")
    #[arg(
        long,
        global = true,
        env = "QTHROTTLE_EXTRA_OPTIONS",
        allow_hyphen_values = true
    )]
    pub extra_options: Option<String>,

    /// Maximum number of outstanding jobs before submission pauses
    #[arg(short, long, global = true, env = "QTHROTTLE_MAX_JOBS")]
    pub max_jobs: Option<u32>,

    /// Seconds between queue polls
    #[arg(short, long, global = true, env = "QTHROTTLE_POLL_INTERVAL")]
    pub poll_interval: Option<f64>,

    /// Suppress progress output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Directory for transient job scripts
    #[arg(long, global = true, env = "QTHROTTLE_SCRIPT_DIR")]
    pub script_dir: Option<String>,

    /// qstat executable
    #[arg(long, global = true, env = "QTHROTTLE_QSTAT")]
    pub qstat: Option<String>,

    /// qsub executable
    #[arg(long, global = true, env = "QTHROTTLE_QSUB")]
    pub qsub: Option<String>,
}

/// Keys accepted in the config file (all optional)
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct FileSettings {
    pub queue_name: Option<String>,
    pub extra_options: Option<String>,
    pub max_jobs: Option<u32>,
    pub poll_interval_secs: Option<f64>,
    pub verbose: Option<bool>,
    pub script_dir: Option<String>,
    pub qstat: Option<String>,
    pub qsub: Option<String>,
}

impl FileSettings {
    /// Load the config file.
    ///
    /// An explicit path must exist; the per-user default location is optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let (path, required) = match explicit {
            Some(path) => (path.to_path_buf(), true),
            None => match default_config_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        config::Config::builder()
            .add_source(
                config::File::from(path.as_path())
                    .format(config::FileFormat::Toml)
                    .required(required),
            )
            .build()
            .and_then(|c| c.try_deserialize::<FileSettings>())
            .with_context(|| format!("Failed to load config file {}", path.display()))
    }
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "qthrottle")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    pub submission: SubmissionConfig,
    pub script_dir: String,
    pub commands: SgeCommands,
}

impl Settings {
    pub fn resolve(options: &QueueOptions, file: FileSettings) -> Result<Self> {
        let poll_interval = match options.poll_interval.or(file.poll_interval_secs) {
            Some(secs) => Duration::try_from_secs_f64(secs)
                .with_context(|| format!("Invalid poll interval: {} seconds", secs))?,
            None => DEFAULT_POLL_INTERVAL,
        };

        let verbose = !options.quiet && file.verbose.unwrap_or(true);

        let submission = SubmissionConfig::new(
            options.queue.clone().or(file.queue_name),
            options
                .extra_options
                .clone()
                .or(file.extra_options)
                .unwrap_or_default(),
            options
                .max_jobs
                .or(file.max_jobs)
                .unwrap_or(DEFAULT_MAX_OUTSTANDING_JOBS),
            poll_interval,
            verbose,
        )
        .context("Invalid submission settings")?;

        let defaults = SgeCommands::default();
        let commands = SgeCommands {
            qstat: options.qstat.clone().or(file.qstat).unwrap_or(defaults.qstat),
            qsub: options.qsub.clone().or(file.qsub).unwrap_or(defaults.qsub),
        };

        Ok(Self {
            submission,
            script_dir: options
                .script_dir
                .clone()
                .or(file.script_dir)
                .unwrap_or_else(|| DEFAULT_SCRIPT_DIR.to_string()),
            commands,
        })
    }
}
