use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure
#[derive(Parser)]
#[command(name = "filer")]
#[command(about = "Open a hosted site environment in an SFTP client")]
#[command(version)]
pub struct Cli {
    /// Config file (overrides FILER_CONFIG environment variable)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the launch command instead of running it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Verbose logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand)]
pub enum Commands {
    /// Open a site environment with any client
    #[command(visible_alias = "filer")]
    Open(OpenArgs),

    /// Open an interactive sftp session in this terminal
    Sftp(SiteEnvArg),

    /// Open with FileZilla
    #[command(visible_alias = "zilla")]
    Filezilla(SiteEnvArg),

    /// Open with Transmit (macOS)
    #[command(visible_alias = "panic")]
    Transmit(SiteEnvArg),

    /// Open with Cyberduck (macOS, Windows)
    #[command(visible_alias = "duck")]
    Cyberduck(SiteEnvArg),

    /// Open with BitKinex (Windows)
    #[command(visible_alias = "bit")]
    Bitkinex(SiteEnvArg),

    /// Open with WinSCP (Windows)
    #[command(visible_alias = "scp")]
    Winscp(SiteEnvArg),

    /// List the clients known on this platform
    Clients,

    /// Print a default configuration file
    Config,
}

/// Arguments of the general-purpose open command
#[derive(Args, Debug, Clone)]
pub struct OpenArgs {
    /// Site and environment in the format `site-name.env`
    pub site_env: String,

    /// Application to open (executable name or path)
    #[arg(long)]
    pub app: Option<String>,

    /// Bundle identifier of the application (macOS)
    #[arg(long)]
    pub bundle: Option<String>,

    /// Persist the connection as a client bookmark
    #[arg(
        long,
        alias = "persistant",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = false,
        action = ArgAction::Set
    )]
    pub persist: bool,

    /// Extra arguments passed through to the application
    #[arg(long, alias = "app_args", allow_hyphen_values = true)]
    pub app_args: Option<String>,
}

/// Single `site.env` argument shared by the preset commands
#[derive(Args, Debug, Clone)]
pub struct SiteEnvArg {
    /// Site and environment in the format `site-name.env`
    pub site_env: String,
}
