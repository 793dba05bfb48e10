// crates/filer-cli/src/main.rs - CLI Application Entry Point
//
// `filer` opens a hosted site environment in an SFTP client. It resolves the
// connection details for `<site>.<env>`, builds the platform-specific command
// that starts the chosen client, optionally writes a Cyberduck bookmark first,
// and launches it.
//
// FLOW:
//   filer open blog.dev --app=filezilla
//        │
//        ▼
//   Context ── config file + env ──▶ PlatformProfile
//        │
//        ▼
//   commands::open ── SiteDirectory (catalog or terminus) ──▶ ConnectionInfo
//        │
//        ├─ --persist ──▶ bookmark XML ──▶ services::bookmarks
//        ▼
//   CommandSynthesizer ──▶ LaunchPlan ──▶ services::launcher (sh -c / cmd /C)
//
// EXIT CODES:
// - 0: client launched (or dry run printed)
// - 1: any fatal error, reported as one line on stderr
// - n: exit code of a foreground sftp session
//
// EXAMPLE USAGE:
// ```bash
// filer open blog.dev --app=filezilla --app-args="-l ask"
// filer open blog.live --bundle=ch.sudo.cyberduck
// filer cyberduck blog.test                 # persists a bookmark on Windows
// filer sftp blog.dev                       # interactive session in this terminal
// filer --dry-run filezilla blog.dev        # print the command only
// ```

use anyhow::Result;
use clap::Parser;
use console::style;
use tracing_subscriber::EnvFilter;

mod cli; // Command-line interface definitions
mod commands; // Command implementations
mod context; // Loaded configuration and platform profile
mod services; // Terminus, bookmark files, process launching

use cli::{Cli, Commands};
use commands::open::OpenRequest;
use context::Context;
use filer_core::client::{ClientSelection, Preset};
use filer_core::error::FilerError;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{}", report(&err));
            std::process::exit(1);
        }
    }
}

/// One-line error report, labelled by category
///
/// Error messages already embed their cause, so the source chain is not
/// appended again.
fn report(err: &anyhow::Error) -> String {
    let label = err
        .downcast_ref::<FilerError>()
        .map(|e| e.category().to_string())
        .unwrap_or_else(|| "error".to_string());
    format!("{}: {err}", style(label).red().bold())
}

/// Logs go to stderr so dry-run output on stdout stays clean
fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,filer_cli=debug,filer_core=debug"
    } else {
        "warn,filer_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<i32> {
    if let Commands::Config = cli.command {
        return commands::config::handle();
    }

    let ctx = Context::new(cli.config, cli.dry_run)?;

    match cli.command {
        Commands::Open(args) => commands::open::handle(
            &ctx,
            OpenRequest {
                site_env: args.site_env,
                selection: ClientSelection {
                    app: args.app,
                    bundle: args.bundle,
                    app_args: args.app_args,
                },
                persist: args.persist,
            },
        ),
        Commands::Sftp(arg) => commands::presets::handle(&ctx, Preset::Sftp, arg.site_env),
        Commands::Filezilla(arg) => commands::presets::handle(&ctx, Preset::FileZilla, arg.site_env),
        Commands::Transmit(arg) => commands::presets::handle(&ctx, Preset::Transmit, arg.site_env),
        Commands::Cyberduck(arg) => commands::presets::handle(&ctx, Preset::Cyberduck, arg.site_env),
        Commands::Bitkinex(arg) => commands::presets::handle(&ctx, Preset::BitKinex, arg.site_env),
        Commands::Winscp(arg) => commands::presets::handle(&ctx, Preset::WinScp, arg.site_env),
        Commands::Clients => commands::clients::handle(&ctx),
        Commands::Config => commands::config::handle(),
    }
}
