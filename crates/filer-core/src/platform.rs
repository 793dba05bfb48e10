// crates/filer-core/src/platform.rs - Platform Profile
//
// Everything the launcher needs to know about the operating system it runs on:
// where each GUI client is installed by default, how processes are started in
// the foreground or background, which client identities (paths or bundle ids)
// are known to work, and where bookmark files live.
//
// The profile is built once at startup and passed by reference to every
// component that needs it. Nothing in this module reads global state after
// construction; host facts (CPU architecture, roaming profile directory) are
// gathered up front by `HostFacts::detect` so tests can supply their own.
//
// PLATFORM MATRIX:
// ┌──────────┬───────────────────────┬──────────────┬───────────────────┐
// │ Platform │ Launch style          │ Bundle ids   │ Bookmarks         │
// ├──────────┼───────────────────────┼──────────────┼───────────────────┤
// │ macOS    │ open -a/-b (detached) │ yes          │ no                │
// │ Linux    │ cmd ... &  (detached) │ no           │ no                │
// │ Windows  │ start "" /b           │ no           │ Cyberduck (.duck) │
// └──────────┴───────────────────────┴──────────────┴───────────────────┘

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::config::ClientPaths;

/// Errors raised while building the platform profile
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlatformError {
    #[error("Operating system not supported: {0}")]
    Unsupported(String),
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Operating systems the launcher knows how to drive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Unix-like with the native `open` command and bundle identifiers
    MacOs,
    /// Unix-like without `open`; GUI clients are backgrounded with `&`
    Linux,
    /// Path-based executables started through `start`
    Windows,
}

impl Platform {
    /// Detect the platform this binary was compiled for
    pub fn current() -> PlatformResult<Self> {
        Self::from_os(env::consts::OS)
    }

    /// Map a `std::env::consts::OS` value to a supported platform
    pub fn from_os(os: &str) -> PlatformResult<Self> {
        match os {
            "macos" => Ok(Self::MacOs),
            "linux" => Ok(Self::Linux),
            "windows" => Ok(Self::Windows),
            other => Err(PlatformError::Unsupported(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Windows => "Windows",
        }
    }

    /// How GUI clients are started on this platform
    pub fn launch_style(&self) -> LaunchStyle {
        match self {
            Self::MacOs => LaunchStyle::Open,
            Self::Linux => LaunchStyle::Background,
            Self::Windows => LaunchStyle::Start,
        }
    }

    pub fn is_unix(&self) -> bool {
        matches!(self, Self::MacOs | Self::Linux)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Command-line template used for detached GUI launches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStyle {
    /// `open -<a|b> <client> [--args <args>] <target>`
    Open,
    /// `<client> <args> <target> > /dev/null 2> /dev/null &`
    Background,
    /// `start "" /b <client> <args> <target>`
    Start,
}

/// Path-based clients with a default install location
///
/// Transmit is not listed here: it is only ever addressed by bundle id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KnownClient {
    BitKinex,
    Cyberduck,
    FileZilla,
    WinScp,
    Sftp,
}

impl KnownClient {
    pub const ALL: [KnownClient; 5] = [
        KnownClient::BitKinex,
        KnownClient::Cyberduck,
        KnownClient::FileZilla,
        KnownClient::WinScp,
        KnownClient::Sftp,
    ];

    /// Short lowercase key used in config files and listings
    pub fn key(&self) -> &'static str {
        match self {
            Self::BitKinex => "bitkinex",
            Self::Cyberduck => "cyberduck",
            Self::FileZilla => "filezilla",
            Self::WinScp => "winscp",
            Self::Sftp => "sftp",
        }
    }

    /// Environment variable that overrides the install path
    pub fn env_var(&self) -> &'static str {
        match self {
            Self::BitKinex => "TERMINUS_FILER_BITKINEX_LOC",
            Self::Cyberduck => "TERMINUS_FILER_CYBERDUCK_LOC",
            Self::FileZilla => "TERMINUS_FILER_FILEZILLA_LOC",
            Self::WinScp => "TERMINUS_FILER_WINSCP_LOC",
            Self::Sftp => "TERMINUS_FILER_SFTP_LOC",
        }
    }

    /// Clients that are launchable by path on the given platform
    pub fn available_on(platform: Platform) -> &'static [KnownClient] {
        match platform {
            Platform::MacOs | Platform::Linux => &[KnownClient::FileZilla, KnownClient::Sftp],
            Platform::Windows => &KnownClient::ALL,
        }
    }
}

impl fmt::Display for KnownClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Bundle id of Panic's Transmit
pub const TRANSMIT_BUNDLE: &str = "com.panic.transmit";
/// Bundle id of Cyberduck
pub const CYBERDUCK_BUNDLE: &str = "ch.sudo.cyberduck";

/// Facts about the host that influence default paths
///
/// Kept separate from `PlatformProfile` so the profile can be built
/// deterministically in tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostFacts {
    /// 32-bit Windows installs programs under "Program Files (x86)"
    pub x86: bool,
    /// Per-user roaming configuration directory
    pub roaming_dir: Option<PathBuf>,
}

impl HostFacts {
    /// Gather host facts from the environment
    pub fn detect() -> Self {
        Self {
            x86: env::var("PROCESSOR_ARCHITECTURE")
                .map(|arch| arch.eq_ignore_ascii_case("x86"))
                .unwrap_or(false),
            roaming_dir: dirs::config_dir(),
        }
    }
}

/// Immutable description of the current platform
///
/// DESIGN:
/// - Built once, then only read
/// - App install paths already include user overrides (config file or
///   environment variables), so downstream code never consults the
///   environment again
/// - Supported sets are typed tables rather than strings to compare against
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformProfile {
    platform: Platform,
    apps: BTreeMap<KnownClient, String>,
    bundles: &'static [&'static str],
    bookmark_dir: Option<PathBuf>,
}

impl PlatformProfile {
    /// Build the profile for `platform`, applying path overrides on top of
    /// the built-in defaults
    pub fn new(platform: Platform, overrides: &ClientPaths, host: &HostFacts) -> Self {
        let apps = KnownClient::available_on(platform)
            .iter()
            .map(|client| {
                let path = overrides
                    .get(*client)
                    .map(str::to_string)
                    .unwrap_or_else(|| default_app_path(platform, *client, host.x86));
                (*client, path)
            })
            .collect();

        let bundles: &'static [&'static str] = match platform {
            Platform::MacOs => &[TRANSMIT_BUNDLE, CYBERDUCK_BUNDLE],
            Platform::Linux | Platform::Windows => &[],
        };

        let bookmark_dir = match platform {
            Platform::Windows => host
                .roaming_dir
                .as_ref()
                .map(|dir| dir.join("Cyberduck").join("Bookmarks")),
            Platform::MacOs | Platform::Linux => None,
        };

        Self {
            platform,
            apps,
            bundles,
            bookmark_dir,
        }
    }

    /// Detect the running platform and build its profile
    ///
    /// Fails before any other work happens when the OS is unsupported.
    pub fn detect(overrides: &ClientPaths) -> PlatformResult<Self> {
        let platform = Platform::current()?;
        Ok(Self::new(platform, overrides, &HostFacts::detect()))
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Install path (or command name) of a known client on this platform
    pub fn app_path(&self, client: KnownClient) -> Option<&str> {
        self.apps.get(&client).map(String::as_str)
    }

    /// All path-based clients with their resolved install paths
    pub fn apps(&self) -> impl Iterator<Item = (KnownClient, &str)> {
        self.apps.iter().map(|(client, path)| (*client, path.as_str()))
    }

    pub fn bundles(&self) -> &[&'static str] {
        self.bundles
    }

    pub fn supports_bundles(&self) -> bool {
        !self.bundles.is_empty()
    }

    /// Whether `name` matches one of the configured app paths
    ///
    /// Surrounding quotes are ignored so that `"C:\Program Files\..."` and the
    /// bare path compare equal.
    pub fn is_supported_app(&self, name: &str) -> bool {
        let name = unquote(name);
        self.apps.values().any(|path| path == name)
    }

    pub fn is_supported_bundle(&self, bundle: &str) -> bool {
        self.bundles.contains(&bundle)
    }

    /// Directory that holds bookmark files, when the platform has one
    pub fn bookmark_dir(&self) -> Option<&Path> {
        self.bookmark_dir.as_deref()
    }
}

/// Built-in install locations used when no override is configured
fn default_app_path(platform: Platform, client: KnownClient, x86: bool) -> String {
    match platform {
        Platform::MacOs | Platform::Linux => client.key().to_string(),
        Platform::Windows => {
            let program_files = if x86 {
                "Program Files (x86)"
            } else {
                "Program Files"
            };
            match client {
                KnownClient::BitKinex => format!("\\{program_files}\\BitKinex\\bitkinex.exe"),
                KnownClient::Cyberduck => format!("\\{program_files}\\Cyberduck\\Cyberduck.exe"),
                KnownClient::FileZilla => {
                    format!("\\{program_files}\\FileZilla FTP Client\\filezilla.exe")
                }
                KnownClient::WinScp => format!("\\{program_files}\\WinSCP\\WinSCP.exe"),
                KnownClient::Sftp => "sftp".to_string(),
            }
        }
    }
}

/// Strip one pair of surrounding double quotes
pub fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(platform: Platform) -> PlatformProfile {
        PlatformProfile::new(platform, &ClientPaths::default(), &HostFacts::default())
    }

    #[test]
    fn test_platform_from_os() {
        assert_eq!(Platform::from_os("macos").unwrap(), Platform::MacOs);
        assert_eq!(Platform::from_os("linux").unwrap(), Platform::Linux);
        assert_eq!(Platform::from_os("windows").unwrap(), Platform::Windows);
        assert_eq!(
            Platform::from_os("freebsd"),
            Err(PlatformError::Unsupported("freebsd".to_string()))
        );
    }

    #[test]
    fn test_unix_defaults() {
        for platform in [Platform::MacOs, Platform::Linux] {
            let profile = profile(platform);
            assert_eq!(profile.app_path(KnownClient::FileZilla), Some("filezilla"));
            assert_eq!(profile.app_path(KnownClient::Sftp), Some("sftp"));
            assert_eq!(profile.app_path(KnownClient::WinScp), None);
            assert!(profile.bookmark_dir().is_none());
        }
    }

    #[test]
    fn test_windows_defaults_follow_architecture() {
        let x64 = profile(Platform::Windows);
        assert_eq!(
            x64.app_path(KnownClient::WinScp),
            Some("\\Program Files\\WinSCP\\WinSCP.exe")
        );

        let host = HostFacts {
            x86: true,
            roaming_dir: None,
        };
        let x86 = PlatformProfile::new(Platform::Windows, &ClientPaths::default(), &host);
        assert_eq!(
            x86.app_path(KnownClient::FileZilla),
            Some("\\Program Files (x86)\\FileZilla FTP Client\\filezilla.exe")
        );
    }

    #[test]
    fn test_overrides_take_priority() {
        let mut paths = ClientPaths::default();
        paths.filezilla = Some("/opt/filezilla/bin/filezilla".to_string());
        let profile = PlatformProfile::new(Platform::Linux, &paths, &HostFacts::default());

        assert_eq!(
            profile.app_path(KnownClient::FileZilla),
            Some("/opt/filezilla/bin/filezilla")
        );
        assert!(profile.is_supported_app("/opt/filezilla/bin/filezilla"));
        assert!(!profile.is_supported_app("filezilla"));
    }

    #[test]
    fn test_bundles_only_on_macos() {
        assert!(profile(Platform::MacOs).is_supported_bundle(TRANSMIT_BUNDLE));
        assert!(profile(Platform::MacOs).is_supported_bundle(CYBERDUCK_BUNDLE));
        assert!(!profile(Platform::Linux).supports_bundles());
        assert!(!profile(Platform::Windows).supports_bundles());
    }

    #[test]
    fn test_bookmark_dir_on_windows() {
        let host = HostFacts {
            x86: false,
            roaming_dir: Some(PathBuf::from("roaming")),
        };
        let profile = PlatformProfile::new(Platform::Windows, &ClientPaths::default(), &host);
        assert_eq!(
            profile.bookmark_dir(),
            Some(Path::new("roaming").join("Cyberduck").join("Bookmarks").as_path())
        );
    }

    #[test]
    fn test_quoted_app_is_supported() {
        let profile = profile(Platform::Windows);
        assert!(profile.is_supported_app("\"\\Program Files\\Cyberduck\\Cyberduck.exe\""));
        assert_eq!(unquote("\"abc\""), "abc");
        assert_eq!(unquote("\"abc"), "\"abc");
    }
}
