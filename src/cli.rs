use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::LogLevel;

#[derive(Parser, Debug)]
#[command(
    name = "xkl",
    version,
    about = "LinuxStudio: manage development components, plugins and scenes",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Install root (overrides general.install_root)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Configuration file to use instead of the per-user one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Diagnostic log level (RUST_LOG takes precedence)
    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Also append diagnostics to this file
    #[arg(long, global = true, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Disable coloured output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show system information and registry counts
    Status,

    /// Create the install directories
    Init {
        /// Print nothing on success
        #[arg(short, long)]
        quiet: bool,
    },

    /// Manage plugins
    #[command(subcommand)]
    Plugin(PluginCommand),

    /// Manage system components
    #[command(subcommand)]
    Component(ComponentCommand),

    /// Browse and apply development scenes
    #[command(subcommand)]
    Scene(SceneCommand),

    /// Print version information
    Version,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum PluginCommand {
    /// List installed plugins
    List,
    /// Install a plugin
    Install { name: String },
    /// Remove a plugin and its directory
    Uninstall { name: String },
    /// Enable an installed plugin
    Enable { name: String },
    /// Disable an installed plugin
    Disable { name: String },
    /// Show a plugin's record
    Info { name: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ComponentCommand {
    /// List installed components
    List,
    /// Search component names and descriptions
    Search { keyword: String },
    /// Install a component with the system package manager
    Install { name: String },
    /// Remove a component with the system package manager
    Uninstall { name: String },
    /// Show a component's record
    Info { name: String },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SceneCommand {
    /// List available scenes
    List,
    /// Show the components of a scene
    Apply { name: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("xkl").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_plugin_install() {
        let cli = parse(&["plugin", "install", "opencv"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Plugin(PluginCommand::Install {
                name: "opencv".to_string()
            })
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&["component", "list", "--root", "/tmp/ls", "--log-level", "debug", "--no-color"])
            .unwrap();
        assert_eq!(cli.root, Some(PathBuf::from("/tmp/ls")));
        assert_eq!(cli.log_level, Some(LogLevel::Debug));
        assert!(cli.no_color);
    }

    #[test]
    fn test_init_quiet() {
        let cli = parse(&["init", "--quiet"]).unwrap();
        assert_eq!(cli.command, Command::Init { quiet: true });
    }

    #[test]
    fn test_missing_name_is_an_error() {
        let err = parse(&["plugin", "install"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        assert!(err.use_stderr());
    }

    #[test]
    fn test_unknown_subcommand_is_an_error() {
        let err = parse(&["plugin", "explode"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn test_bare_group_shows_help() {
        let err = parse(&["scene"]).unwrap_err();
        assert_eq!(
            err.kind(),
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        );
    }
}
