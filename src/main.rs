use clap::Parser;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod chain;
mod cli;
mod commands;
mod config;
mod crawler;
mod http;
mod protocol;
mod registry;
mod signals;
mod skill;

use cli::{Cli, Commands, OutputFormat};
use config::{Config, LogLevel};

fn setup_logging(log_level: &LogLevel) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentreg")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("agentreg.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG env var takes precedence, otherwise use config log_level
    let mut builder = env_logger::Builder::new();

    if std::env::var("RUST_LOG").is_ok() {
        builder.parse_default_env();
    } else {
        builder.filter_level(match log_level {
            LogLevel::Trace => log::LevelFilter::Trace,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Off => log::LevelFilter::Off,
        });
    }

    builder.target(env_logger::Target::Pipe(target)).init();

    info!("Logging initialized, writing to: {}", log_file.display());
    info!(
        "Log level: {} (from {})",
        log_level.as_filter(),
        if std::env::var("RUST_LOG").is_ok() { "RUST_LOG env" } else { "config" }
    );
    Ok(())
}

fn run(cli: Cli, config: Config) -> Result<()> {
    // Completions need no registry
    if let Commands::Completions { shell } = cli.command {
        return commands::completions::run(shell);
    }

    let protocol = commands::build_protocol(&config, cli.load.as_deref())?;
    let quiet = cli.quiet;

    match cli.command {
        Commands::Agents { action } => commands::agents::run(action, &protocol, quiet)?,
        Commands::Skills { action } => commands::skills::run(action, &protocol)?,
        Commands::Tasks { action } => commands::tasks::run(action, &protocol, quiet)?,
        Commands::Stats { format } => commands::stats::run(&protocol, OutputFormat::resolve(format))?,
        Commands::Summary => commands::stats::summary(&protocol)?,
        Commands::Crawl { watch, cycles, format } => commands::crawl::run(
            &protocol,
            &config,
            watch,
            cycles,
            OutputFormat::resolve(format),
            quiet,
        )?,
        Commands::Manifest { json } => commands::manifest::run(&protocol, json)?,
        Commands::Snapshot { action } => commands::snapshot::run(action, &protocol, quiet)?,
        Commands::Completions { shell } => commands::completions::run(shell)?,
    }

    if let Some(path) = &cli.save {
        commands::save_snapshot(&protocol, path)?;
    }
    Ok(())
}

fn main() -> Result<()> {
    // Parse CLI arguments first
    let cli = Cli::parse();

    // Load configuration (before logging, so log messages in Config::load are silent)
    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if cli.verbose {
        config.log_level = LogLevel::Debug;
    }

    setup_logging(&config.log_level).context("Failed to setup logging")?;

    info!("Starting agentreg with config from: {:?}", cli.config);

    run(cli, config).context("Command failed")?;

    Ok(())
}
