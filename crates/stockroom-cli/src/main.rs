//! Stockroom CLI.

use std::io::{self, IsTerminal};
use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use tracing::level_filters::LevelFilter;

use stockroom_cli::logging::{LogConfig, LogFormat, init_logging};
use stockroom_cli::session;
use stockroom_core::Store;
use stockroom_persistence::{Backend, LocalBackend, SharedBackend};

mod cli;
mod commands;
mod tables;

use crate::cli::{BackendArg, Cli, Command, LogFormatArg, LogLevelArg};
use crate::commands::{
    App, run_dashboard, run_export, run_login, run_logout, run_material, run_request, run_user,
    run_whoami,
};

fn main() {
    let cli = Cli::parse();
    cli.color.write_global();
    let log_config = log_config_from_cli(&cli);
    if let Err(error) = init_logging(&log_config) {
        eprintln!("error: failed to initialize logging: {error}");
        std::process::exit(1);
    }
    let exit_code = match run(&cli) {
        Ok(()) => 0,
        Err(error) => {
            eprintln!("error: {error:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

fn run(cli: &Cli) -> Result<()> {
    let data_dir = cli.data_dir.clone().unwrap_or_else(cli::default_data_dir);
    let backend: Arc<dyn Backend> = match cli.backend {
        BackendArg::Local => Arc::new(LocalBackend::open(data_dir.join("stockroom.json"))?),
        BackendArg::Shared => Arc::new(SharedBackend::open(data_dir.join("store"))?),
    };
    let mut store = Store::open(backend)?;

    let session_file = session::session_path(&data_dir);
    if let Some(saved) = session::load(&session_file)? {
        // Re-resolve the snapshot so admin edits to the account apply
        // without a fresh login.
        let user = store.state().user(saved.id).cloned().unwrap_or(saved);
        store.restore_session(user);
    }

    let mut app = App {
        store,
        session_file,
    };
    match &cli.command {
        Command::Login(args) => run_login(&mut app, args),
        Command::Logout => run_logout(&mut app),
        Command::Whoami => run_whoami(&app),
        Command::Dashboard => run_dashboard(&app),
        Command::Material(command) => run_material(&mut app, command),
        Command::User(command) => run_user(&mut app, command),
        Command::Request(command) => run_request(&mut app, command),
        Command::Export(args) => run_export(&app, args),
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config.log_file = cli.log_file.clone();
    config.with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    config
}
