mod app;
mod cli;
mod component;
mod error;
mod executor;
mod logging;
mod model;
mod output;
mod plugin;
mod store;

use std::process::ExitCode;
use std::rc::Rc;

use anyhow::Result;
use clap::Parser;

use app::App;
use cli::{Cli, Command};
use executor::ShellExecutor;
use model::config::AppConfig;
use model::system::SystemInfo;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version print to stdout and are not failures
            let failed = err.use_stderr();
            let _ = err.print();
            return if failed {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            output::error(&format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(root) = &cli.root {
        config.general.install_root = root.to_string_lossy().into_owned();
    }
    if let Some(level) = cli.log_level {
        config.logging.level = level.as_str().to_string();
    }
    if let Some(file) = cli.log_file {
        config.logging.file = Some(file);
    }
    if cli.no_color {
        config.logging.color = false;
    }

    let _guard = logging::init(
        &config.logging.level,
        config.logging.file.as_deref(),
        config.logging.color,
    )?;
    output::set_color(config.logging.color);

    if cli.command == Command::Version {
        app::print_version();
        return Ok(ExitCode::SUCCESS);
    }

    tracing::info!("xkl {} starting", app::VERSION);
    let system = SystemInfo::detect();

    let mut app = App::new(config, system, Rc::new(ShellExecutor));
    let outcome = app.dispatch(cli.command);
    app.shutdown();

    Ok(outcome.into())
}
