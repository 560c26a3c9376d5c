use std::fs;
use std::process::ExitCode;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};

use crate::cli::{Command, ComponentCommand, PluginCommand, SceneCommand};
use crate::component::ComponentManager;
use crate::error::{RecordKind, RegistryError};
use crate::executor::PackageExecutor;
use crate::model::config::AppConfig;
use crate::model::scene::{self, SCENES};
use crate::model::system::SystemInfo;
use crate::output;
use crate::plugin::PluginManager;
use crate::plugin::installer::{BUILTIN_INSTALLERS, InstallOutcome};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl From<Outcome> for ExitCode {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Success => ExitCode::SUCCESS,
            Outcome::Failure => ExitCode::FAILURE,
        }
    }
}

/// Everything a command needs: configuration, host facts and both registries.
pub struct App {
    pub config: AppConfig,
    pub system: SystemInfo,
    pub components: ComponentManager,
    pub plugins: PluginManager,
}

impl App {
    pub fn new(config: AppConfig, system: SystemInfo, executor: Rc<dyn PackageExecutor>) -> Self {
        let components = ComponentManager::new(config.components_file(), executor.clone());
        let plugins = PluginManager::new(config.plugins_dir(), executor, config.discovery_mode());

        Self {
            config,
            system,
            components,
            plugins,
        }
    }

    pub fn dispatch(&mut self, command: Command) -> Outcome {
        tracing::debug!(?command, "dispatching");

        let result = match command {
            Command::Status => self.status(),
            Command::Init { quiet } => self.init(quiet),
            Command::Plugin(cmd) => self.handle_plugin(cmd),
            Command::Component(cmd) => self.handle_component(cmd),
            Command::Scene(cmd) => self.handle_scene(cmd),
            Command::Version => {
                print_version();
                Ok(())
            }
        };

        match result {
            Ok(()) => Outcome::Success,
            Err(err) => {
                output::error(&format!("{err:#}"));
                Outcome::Failure
            }
        }
    }

    /// Flush registry state before exit.
    pub fn shutdown(&mut self) {
        self.components.save_if_dirty();
        self.plugins.save_all();
        tracing::debug!("shutdown complete");
    }

    fn status(&self) -> Result<()> {
        let sys = &self.system;

        output::header(&format!("LinuxStudio {VERSION}"));
        output::rule();
        output::field("Install root", &self.config.install_root().display().to_string());
        output::field("OS", &format!("{} {}", sys.os_name, sys.os_version));
        output::field("Architecture", &sys.architecture);
        output::field("CPU cores", &sys.cpu_cores.to_string());
        output::field(
            "Memory",
            &format!(
                "{} MB total, {} MB available",
                sys.total_memory_mb, sys.available_memory_mb
            ),
        );
        output::field(
            "Package manager",
            self.components
                .package_manager()
                .map_or("none detected", |pm| pm.binary()),
        );
        output::field(
            "Plugins",
            &format!(
                "{} installed, {} enabled",
                self.plugins.plugin_count(),
                self.plugins.enabled_count()
            ),
        );
        output::field(
            "Components",
            &format!("{} installed", self.components.list_installed().len()),
        );
        output::field(
            "Registry file",
            &self.components.registry_file().display().to_string(),
        );
        output::rule();
        Ok(())
    }

    fn init(&self, quiet: bool) -> Result<()> {
        for dir in [self.config.components_dir(), self.config.plugins_dir()] {
            fs::create_dir_all(&dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        if !quiet {
            output::success(&format!(
                "Initialized {}",
                self.config.install_root().display()
            ));
        }
        Ok(())
    }

    fn handle_plugin(&mut self, cmd: PluginCommand) -> Result<()> {
        match cmd {
            PluginCommand::List => {
                self.list_plugins();
                Ok(())
            }
            PluginCommand::Install { name } => {
                let report = self.plugins.install(&name)?;
                match report.outcome {
                    InstallOutcome::Installed => {
                        output::success(&format!("Plugin {name} installed"));
                    }
                    InstallOutcome::ManualSteps(steps) => {
                        output::warn(&format!("Plugin {name} registered, manual steps required:"));
                        for step in steps {
                            output::hint(step);
                        }
                    }
                    InstallOutcome::Reserved => {
                        output::success(&format!("Plugin {name} registered"));
                        output::hint(&format!(
                            "no built-in installer; directory reserved at {}",
                            self.plugins.root().join(&name).display()
                        ));
                    }
                }
                output::hint(&format!("installed at {}", report.record.installed_at));
                Ok(())
            }
            PluginCommand::Uninstall { name } => {
                self.plugins.uninstall(&name)?;
                output::success(&format!("Plugin {name} uninstalled"));
                Ok(())
            }
            PluginCommand::Enable { name } => {
                self.plugins.enable(&name)?;
                output::success(&format!("Plugin {name} enabled"));
                Ok(())
            }
            PluginCommand::Disable { name } => {
                self.plugins.disable(&name)?;
                output::success(&format!("Plugin {name} disabled"));
                Ok(())
            }
            PluginCommand::Info { name } => {
                if !self.plugins.is_installed(&name) {
                    return Err(RegistryError::not_found(RecordKind::Plugin, &name).into());
                }
                let record = self.plugins.info(&name);
                output::header(&record.name);
                if !record.description.is_empty() {
                    output::field("Description", &record.description);
                }
                output::field("Version", or_unknown(&record.version));
                output::field("Enabled", if record.enabled { "yes" } else { "no" });
                output::field("Installed at", or_unknown(&record.installed_at));
                output::field(
                    "Directory",
                    &self.plugins.root().join(&record.name).display().to_string(),
                );
                Ok(())
            }
        }
    }

    fn list_plugins(&self) {
        let installed = self.plugins.list_installed();
        if installed.is_empty() {
            output::empty("No plugins installed", Some("xkl plugin install <name>"));
            output::info("Built-in plugins:");
            for installer in BUILTIN_INSTALLERS {
                output::hint(&format!("{:<14}{}", installer.name, installer.description));
            }
            return;
        }

        output::header("Installed plugins");
        output::rule();
        for plugin in installed {
            let state = if plugin.enabled { "enabled" } else { "disabled" };
            output::info(&format!("{:<16}{state}", plugin.name));
        }
    }

    fn handle_component(&mut self, cmd: ComponentCommand) -> Result<()> {
        match cmd {
            ComponentCommand::List => {
                let installed = self.components.list_installed();
                if installed.is_empty() {
                    output::empty(
                        "No components installed",
                        Some("xkl component install <name>"),
                    );
                    return Ok(());
                }
                output::header("Installed components");
                output::rule();
                for component in installed {
                    output::info(&format!(
                        "{:<16}{}",
                        component.name,
                        or_unknown(&component.version)
                    ));
                }
                Ok(())
            }
            ComponentCommand::Search { keyword } => {
                let hits = self.components.search(&keyword);
                if hits.is_empty() {
                    output::empty(&format!("No components match '{keyword}'"), None);
                    return Ok(());
                }
                for component in hits {
                    output::info(&format!("{:<16}{}", component.name, component.description));
                }
                Ok(())
            }
            ComponentCommand::Install { name } => {
                self.components.install(&name)?;
                output::success(&format!("Component {name} installed"));
                Ok(())
            }
            ComponentCommand::Uninstall { name } => {
                self.components.uninstall(&name)?;
                output::success(&format!("Component {name} uninstalled"));
                Ok(())
            }
            ComponentCommand::Info { name } => {
                let record = self.components.info(&name);
                if record.name.is_empty() {
                    return Err(RegistryError::not_found(RecordKind::Component, &name).into());
                }
                output::header(&record.name);
                output::field("Version", or_unknown(&record.version));
                output::field("Description", &record.description);
                output::field("Installed", if record.installed { "yes" } else { "no" });
                if !record.dependencies.is_empty() {
                    output::field("Dependencies", &record.dependencies.join(", "));
                }
                Ok(())
            }
        }
    }

    fn handle_scene(&self, cmd: SceneCommand) -> Result<()> {
        match cmd {
            SceneCommand::List => {
                output::header("Available scenes");
                output::rule();
                for (i, scene) in SCENES.iter().enumerate() {
                    println!("  {}) {:<16} - {}", i + 1, scene.key, scene.title);
                    output::hint(scene.highlights);
                }
                output::rule();
                output::info("Apply a scene: xkl scene apply <scene-name>");
                Ok(())
            }
            SceneCommand::Apply { name } => {
                let Some(scene) = scene::find(&name) else {
                    let message = match scene::suggest(&name) {
                        Some(key) => format!("unknown scene '{name}', did you mean '{key}'?"),
                        None => format!("unknown scene '{name}', see 'xkl scene list'"),
                    };
                    return Err(anyhow!(message));
                };

                output::header(&format!("Scene: {}", scene.title));
                output::rule();
                let mut missing = Vec::new();
                for component in scene.recommendations() {
                    if self.components.is_installed(&component.name) {
                        output::success(&format!("{:<14}{}", component.name, component.description));
                    } else {
                        output::info(&format!("{:<14}{}", component.name, component.description));
                        missing.push(component.name);
                    }
                }
                output::rule();
                if missing.is_empty() {
                    output::success("All components of this scene are installed");
                } else {
                    output::hint(&format!(
                        "{} missing, install with: xkl component install <name>",
                        missing.len()
                    ));
                }
                Ok(())
            }
        }
    }
}

pub fn print_version() {
    println!("xkl (LinuxStudio) {VERSION}");
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() { "unknown" } else { value }
}
