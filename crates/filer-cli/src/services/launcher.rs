// crates/filer-cli/src/services/launcher.rs - Process Launcher Service
//
// Runs a synthesized launch plan through the platform shell. The plans rely
// on shell features (`&`, redirection, `open`, `start`), so they are never
// split into argv by hand.
//
// PROCESS HANDLING:
// - Blocking plans (interactive sftp) inherit stdio and are waited on; the
//   child's exit code is handed back to the caller
// - Detached plans get null stdio and are not waited on; the shell returns as
//   soon as the client is started

use std::io;
use std::process::{Command, Stdio};

use filer_core::command::LaunchPlan;
use filer_core::error::{FilerError, FilerResult};
use filer_core::platform::Platform;

/// Windows: run the shell without flashing a console window
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// How a launch ended, from the caller's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchOutcome {
    /// Foreground session finished with this exit code
    Exited(i32),
    /// Background client started; its fate is not tracked
    Detached,
}

impl LaunchOutcome {
    /// Process exit code the CLI should use
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Exited(code) => *code,
            Self::Detached => 0,
        }
    }
}

/// Carries out a launch plan
pub trait Launch {
    fn launch(&self, plan: &LaunchPlan) -> FilerResult<LaunchOutcome>;
}

/// Starts client processes through the platform shell
pub struct LauncherService {
    platform: Platform,
}

impl LauncherService {
    pub fn new(platform: Platform) -> Self {
        Self { platform }
    }

    /// Wrap a command line in the platform shell
    pub fn shell(&self, line: &str) -> Command {
        match self.platform {
            Platform::Windows => {
                let mut command = Command::new("cmd");
                command.arg("/C").arg(line);
                command
            }
            Platform::MacOs | Platform::Linux => {
                let mut command = Command::new("sh");
                command.arg("-c").arg(line);
                command
            }
        }
    }
}

impl Launch for LauncherService {
    /// Execute the plan
    ///
    /// Terminal signals reach a foreground child directly; nothing here
    /// intercepts or times them out.
    fn launch(&self, plan: &LaunchPlan) -> FilerResult<LaunchOutcome> {
        let mut command = self.shell(plan.command());
        let spawn_error = |source: io::Error| FilerError::Launch {
            command: plan.command().to_string(),
            source,
        };

        if plan.is_blocking() {
            let status = command.status().map_err(spawn_error)?;
            // Killed by a signal: no code, report a generic failure.
            let code = status.code().unwrap_or(1);
            tracing::debug!(code, "interactive session ended");
            return Ok(LaunchOutcome::Exited(code));
        }

        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        detach(&mut command);

        let child = command.spawn().map_err(spawn_error)?;
        tracing::debug!(pid = child.id(), "client started in background");

        Ok(LaunchOutcome::Detached)
    }
}

#[cfg(unix)]
fn detach(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(windows)]
fn detach(command: &mut Command) {
    use std::os::windows::process::CommandExt;
    command.creation_flags(CREATE_NO_WINDOW);
}

#[cfg(not(any(unix, windows)))]
fn detach(_command: &mut Command) {}
