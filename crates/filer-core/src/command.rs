// crates/filer-core/src/command.rs - Command Synthesizer
//
// Builds the exact shell command that starts the chosen client, following
// each platform's conventions:
//
//   macOS    open -a filezilla --args -l ask sftp://user@host:2222
//   Linux    filezilla -l ask sftp://user@host:2222 > /dev/null 2> /dev/null &
//   Windows  start "" /b "\Program Files\WinSCP\WinSCP.exe" sftp://user@host:2222
//
// GUI clients are always detached so the caller gets its terminal back. The
// plain `sftp` binary is the exception: it needs the terminal, so its plan is
// blocking and reuses the connection's ready-made interactive command.

use std::fmt;
use std::path::PathBuf;

use crate::client::ClientDescriptor;
use crate::connection::ConnectionInfo;
use crate::platform::{LaunchStyle, Platform, PlatformProfile};

/// What the client is pointed at
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// `sftp://` URI of the environment
    Url(String),
    /// Persisted bookmark file
    Bookmark(PathBuf),
}

impl LaunchTarget {
    /// Default target for a connection: its URL
    pub fn url(info: &ConnectionInfo) -> Self {
        Self::Url(info.url.clone())
    }
}

/// A fully synthesized command, ready for the process launcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    command: String,
    blocking: bool,
}

impl LaunchPlan {
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Foreground plans inherit the terminal and are waited on
    pub fn is_blocking(&self) -> bool {
        self.blocking
    }
}

impl fmt::Display for LaunchPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command)
    }
}

/// Builds launch plans for one platform
pub struct CommandSynthesizer<'a> {
    profile: &'a PlatformProfile,
}

impl<'a> CommandSynthesizer<'a> {
    pub fn new(profile: &'a PlatformProfile) -> Self {
        Self { profile }
    }

    pub fn build(
        &self,
        descriptor: &ClientDescriptor,
        info: &ConnectionInfo,
        target: &LaunchTarget,
    ) -> LaunchPlan {
        let platform = self.profile.platform();

        let plan = if descriptor.is_interactive_sftp() {
            LaunchPlan {
                command: interactive_command(platform, descriptor, info),
                blocking: true,
            }
        } else {
            LaunchPlan {
                command: detached_command(platform, descriptor, target),
                blocking: false,
            }
        };

        tracing::debug!(command = %plan.command, blocking = plan.blocking, "synthesized launch plan");
        plan
    }
}

/// Foreground `sftp` session
///
/// The connection's command starts with `sftp`; when the client was overridden
/// (e.g. `/opt/openssh/bin/sftp`) that program is used instead. Unix shells
/// fold stderr into stdout so prompts and errors arrive in order.
fn interactive_command(
    platform: Platform,
    descriptor: &ClientDescriptor,
    info: &ConnectionInfo,
) -> String {
    let rest = info
        .interactive_command
        .strip_prefix("sftp")
        .map(str::trim_start)
        .unwrap_or(&info.interactive_command);

    let mut parts = vec![quote(platform, descriptor.name())];
    parts.extend(descriptor.extra_args().map(str::to_string));
    if !rest.is_empty() {
        parts.push(rest.to_string());
    }

    let command = parts.join(" ");
    if platform.is_unix() {
        format!("{command} 2>&1")
    } else {
        command
    }
}

/// Detached GUI launch in the platform's style
fn detached_command(
    platform: Platform,
    descriptor: &ClientDescriptor,
    target: &LaunchTarget,
) -> String {
    let client = quote(platform, descriptor.name());
    let args = descriptor.extra_args().map(str::to_string);
    let target = match target {
        LaunchTarget::Url(url) => quote(platform, url),
        LaunchTarget::Bookmark(path) => quote(platform, &path.to_string_lossy()),
    };

    let mut parts: Vec<String> = Vec::new();
    match platform.launch_style() {
        LaunchStyle::Open => {
            parts.extend(["open".to_string(), descriptor.open_flag().to_string(), client]);
            parts.extend(args.map(|args| format!("--args {args}")));
            parts.push(target);
        }
        LaunchStyle::Background => {
            parts.push(client);
            parts.extend(args);
            parts.push(target);
            parts.push("> /dev/null 2> /dev/null &".to_string());
        }
        LaunchStyle::Start => {
            parts.extend(["start".to_string(), "\"\"".to_string(), "/b".to_string(), client]);
            parts.extend(args);
            parts.push(target);
        }
    }

    parts.join(" ")
}

/// Quote a word for the platform shell when it needs it
///
/// Words that already carry quotes are left alone so callers can pass
/// pre-quoted Windows paths through unchanged.
pub fn quote(platform: Platform, word: &str) -> String {
    let already_quoted = (word.starts_with('"') && word.ends_with('"') && word.len() > 1)
        || (word.starts_with('\'') && word.ends_with('\'') && word.len() > 1);
    if already_quoted {
        return word.to_string();
    }

    if platform.is_unix() {
        let safe = |c: char| c.is_ascii_alphanumeric() || "_-./:@%+=,~".contains(c);
        if !word.is_empty() && word.chars().all(safe) {
            word.to_string()
        } else {
            format!("'{}'", word.replace('\'', "'\\''"))
        }
    } else if word.is_empty() || word.chars().any(|c| c.is_whitespace() || "&()^|<>".contains(c)) {
        format!("\"{word}\"")
    } else {
        word.to_string()
    }
}
