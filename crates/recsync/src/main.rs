// # recsync - DNS record reconciliation CLI
//
// This binary is a THIN integration layer over recsync-core:
// 1. Parse arguments and load the JSON configuration
// 2. Apply environment overrides (secrets stay out of config files)
// 3. Initialize logging and the runtime
// 4. Build the Cloudflare client and output lookup, run one mode, report
//
// No reconciliation logic lives here.
//
// ## Commands
//
// - `sync`: create missing records, update drifted ones
// - `update`: overwrite existing records unconditionally
// - `delete`: delete configured records that exist
// - `list`: print every record in the zone
//
// ## Environment
//
// - `RECSYNC_CONFIG`: Config file path (default `recsync.json`)
// - `RECSYNC_API_TOKEN`: Overrides `auth.apiToken`
// - `RECSYNC_MODE`: `dry-run` forces dry-run mode
// - `RECSYNC_LOG_LEVEL`: trace, debug, info, warn, error
//
// ## Example
//
// ```bash
// export RECSYNC_API_TOKEN=your_token
// recsync --config deploy/recsync.json sync
// ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use recsync_core::{Error, RecordSyncEngine, RunResult, SyncConfig, SyncMode};
use recsync_provider_cloudflare::{CloudflareOptions, CloudflareProvider};
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecsyncExitCode {
    /// Every record succeeded, or reconciliation is disabled
    Success = 0,
    /// Configuration error (including missing credentials)
    ConfigError = 1,
    /// Run aborted (zone resolution, runtime startup)
    RuntimeError = 2,
    /// Run completed but at least one record failed
    PartialFailure = 3,
}

impl From<RecsyncExitCode> for ExitCode {
    fn from(code: RecsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

#[derive(Debug, Parser)]
#[command(name = "recsync")]
#[command(version, about = "Reconcile declared DNS records against Cloudflare")]
struct Args {
    /// Path to the JSON configuration
    #[arg(short, long, global = true, env = "RECSYNC_CONFIG", default_value = "recsync.json")]
    config: PathBuf,

    /// Perform lookups only; log mutations instead of sending them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "RECSYNC_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Create missing records and update drifted ones
    Sync,
    /// Overwrite existing records; never create
    Update,
    /// Delete configured records that exist
    Delete,
    /// Print every record in the zone
    List,
}

impl Command {
    fn mode(self) -> Option<SyncMode> {
        match self {
            Command::Sync => Some(SyncMode::Sync),
            Command::Update => Some(SyncMode::Update),
            Command::Delete => Some(SyncMode::Delete),
            Command::List => None,
        }
    }
}

fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "Log level '{}' is not valid. Valid levels: trace, debug, info, warn, error",
            level
        ),
    }
}

/// Apply environment overrides and the `--dry-run` flag
fn apply_overrides(
    config: &mut SyncConfig,
    api_token: Option<String>,
    mode: Option<String>,
    dry_run_flag: bool,
) {
    if let Some(token) = api_token.filter(|t| !t.trim().is_empty()) {
        config.auth.api_token = token;
    }

    let dry_run_env = mode.is_some_and(|m| m.eq_ignore_ascii_case("dry-run"));
    if dry_run_flag || dry_run_env {
        config.engine.dry_run = true;
    }
}

fn load_config(path: &Path, dry_run_flag: bool) -> Result<SyncConfig> {
    let mut config = SyncConfig::from_file(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;

    apply_overrides(
        &mut config,
        env::var("RECSYNC_API_TOKEN").ok(),
        env::var("RECSYNC_MODE").ok(),
        dry_run_flag,
    );

    Ok(config)
}

fn exit_code_for(err: &Error) -> RecsyncExitCode {
    match err {
        Error::AuthCredentialsMissing | Error::Config(_) => RecsyncExitCode::ConfigError,
        _ => RecsyncExitCode::RuntimeError,
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = match parse_log_level(&args.log_level) {
        Ok(level) => level,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return RecsyncExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder().with_max_level(log_level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return RecsyncExitCode::ConfigError.into();
    }

    let config = match load_config(&args.config, args.dry_run) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return RecsyncExitCode::ConfigError.into();
        }
    };

    if !config.enabled {
        warn!("Record reconciliation is disabled in {}", args.config.display());
        return RecsyncExitCode::Success.into();
    }

    if let Err(e) = config.validate() {
        error!("Configuration validation error: {}", e);
        return exit_code_for(&e).into();
    }

    info!(
        "Configuration loaded: {} record(s) for {}",
        config.records.len(),
        config.domain
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return RecsyncExitCode::RuntimeError.into();
        }
    };

    let code = rt.block_on(async {
        match run(args.command, &config).await {
            Ok(code) => code,
            Err(e) => {
                error!("{} failed: {}", config.domain, e);
                exit_code_for(&e)
            }
        }
    });

    code.into()
}

/// Build components and execute one command
async fn run(command: Command, config: &SyncConfig) -> recsync_core::Result<RecsyncExitCode> {
    let provider = CloudflareProvider::new(
        config.auth.api_token.as_str(),
        CloudflareOptions {
            dry_run: config.engine.dry_run,
            timeout: config.engine.request_timeout(),
            ..Default::default()
        },
    )?;
    let outputs = recsync_core::outputs::from_config(&config.outputs);

    let engine = RecordSyncEngine::new(Box::new(provider), outputs, config)?;

    let Some(mode) = command.mode() else {
        let records = engine.list().await?;
        for record in &records {
            println!("{}", record);
        }
        info!("{} record(s) in {}", records.len(), config.domain);
        return Ok(RecsyncExitCode::Success);
    };

    let result = engine.run(mode).await?;
    report(&result);

    if result.is_success() {
        Ok(RecsyncExitCode::Success)
    } else {
        Ok(RecsyncExitCode::PartialFailure)
    }
}

/// Print one line per record and the summary
fn report(result: &RunResult) {
    for outcome in &result.outcomes {
        match &outcome.result {
            Ok(action) => println!("{:<15} {}", action.to_string(), outcome.record),
            Err(e) => println!("{:<15} {}: {}", "failed", outcome.record, e),
        }
    }
    println!("{}: {}", result.mode, result.summary());
}
