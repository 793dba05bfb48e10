// crates/filer-core/src/client.rs - Client Registry and descriptors
//
// A client is either an executable addressed by path ("app") or, on macOS, an
// application addressed by bundle identifier ("bundle"). Both are carried by a
// single `ClientDescriptor` so the command layer never has to guess which kind
// of string it is holding.
//
// Unknown clients are allowed. The registry only knows which clients have been
// tried and tested; anything else is accepted with a `SupportWarning` so new
// clients work without waiting for a release.

use std::fmt;
use thiserror::Error;

use crate::platform::{
    CYBERDUCK_BUNDLE, KnownClient, Platform, PlatformProfile, TRANSMIT_BUNDLE, unquote,
};

/// Errors raised while selecting a client
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("--app or --bundle flag is required.")]
    MissingSelector,

    #[error("Bundle identifiers are not supported on {0}; use --app instead")]
    BundlesUnsupported(Platform),

    #[error("{preset} is not supported on {platform}")]
    PresetUnsupported { preset: Preset, platform: Platform },
}

/// Result type for client selection
pub type ClientResult<T> = Result<T, ClientError>;

/// How a client is identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientTarget {
    /// Executable path or command name
    App(String),
    /// Platform application bundle identifier
    Bundle(String),
}

/// A launchable client plus the extra arguments to pass it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientDescriptor {
    target: ClientTarget,
    extra_args: Option<String>,
}

impl ClientDescriptor {
    pub fn app<S: Into<String>>(name: S) -> Self {
        Self {
            target: ClientTarget::App(name.into()),
            extra_args: None,
        }
    }

    pub fn bundle<S: Into<String>>(id: S) -> Self {
        Self {
            target: ClientTarget::Bundle(id.into()),
            extra_args: None,
        }
    }

    /// Attach extra arguments; blank strings are dropped
    pub fn with_args<S: Into<String>>(mut self, args: Option<S>) -> Self {
        self.extra_args = args
            .map(Into::<String>::into)
            .map(|args| args.trim().to_string())
            .filter(|args| !args.is_empty());
        self
    }

    /// Raw client string as given by the user or preset
    pub fn name(&self) -> &str {
        match &self.target {
            ClientTarget::App(name) | ClientTarget::Bundle(name) => name,
        }
    }

    pub fn extra_args(&self) -> Option<&str> {
        self.extra_args.as_deref()
    }

    pub fn is_bundle(&self) -> bool {
        matches!(self.target, ClientTarget::Bundle(_))
    }

    /// Flag understood by macOS `open`: `-a` for apps, `-b` for bundles
    pub fn open_flag(&self) -> &'static str {
        match self.target {
            ClientTarget::App(_) => "-a",
            ClientTarget::Bundle(_) => "-b",
        }
    }

    /// Whether this is the plain `sftp` binary
    ///
    /// Matches `sftp`, `/usr/bin/sftp`, `"C:\Tools\sftp.exe"` and similar.
    /// Interactive sessions need the terminal, so they are never detached.
    pub fn is_interactive_sftp(&self) -> bool {
        match &self.target {
            ClientTarget::App(name) => {
                let name = unquote(name.trim());
                let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
                let lower = file.to_ascii_lowercase();
                lower.strip_suffix(".exe").unwrap_or(lower.as_str()) == "sftp"
            }
            ClientTarget::Bundle(_) => false,
        }
    }

    /// Whether the client name refers to `family` (case-insensitive)
    pub fn is_family(&self, family: &str) -> bool {
        self.name()
            .to_ascii_lowercase()
            .contains(&family.to_ascii_lowercase())
    }
}

impl fmt::Display for ClientDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(unquote(self.name()))
    }
}

/// What the user asked for on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSelection {
    pub app: Option<String>,
    pub bundle: Option<String>,
    pub app_args: Option<String>,
}

impl ClientSelection {
    pub fn app<S: Into<String>>(app: S) -> Self {
        Self {
            app: Some(app.into()),
            ..Self::default()
        }
    }

    pub fn bundle<S: Into<String>>(bundle: S) -> Self {
        Self {
            bundle: Some(bundle.into()),
            ..Self::default()
        }
    }

    pub fn with_args<S: Into<String>>(mut self, args: S) -> Self {
        self.app_args = Some(args.into());
        self
    }
}

/// Non-fatal notice that a client has not been verified on this platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SupportWarning {
    UntestedApp(String),
    UntestedBundle(String),
}

impl fmt::Display for SupportWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UntestedApp(app) => write!(f, "App '{app}' not tested."),
            Self::UntestedBundle(bundle) => write!(f, "Bundle '{bundle}' currently not tested."),
        }
    }
}

/// The chosen client and any warnings raised while choosing it
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClient {
    pub descriptor: ClientDescriptor,
    pub warnings: Vec<SupportWarning>,
}

/// Maps a user selection onto a descriptor for the active platform
pub struct ClientRegistry<'a> {
    profile: &'a PlatformProfile,
}

impl<'a> ClientRegistry<'a> {
    pub fn new(profile: &'a PlatformProfile) -> Self {
        Self { profile }
    }

    /// Resolve the selection into a descriptor
    ///
    /// RULES:
    /// - At least one of app or bundle must be non-empty
    /// - An app wins over a bundle when both are given
    /// - Each given name outside the supported set yields a warning
    /// - Bundles require a platform that addresses apps by bundle id
    pub fn resolve(&self, selection: &ClientSelection) -> ClientResult<ResolvedClient> {
        let app = non_empty(selection.app.as_deref());
        let bundle = non_empty(selection.bundle.as_deref());

        let mut warnings = Vec::new();
        if let Some(app) = app
            && !self.profile.is_supported_app(app)
        {
            warnings.push(SupportWarning::UntestedApp(app.to_string()));
        }
        if let Some(bundle) = bundle
            && !self.profile.is_supported_bundle(bundle)
        {
            warnings.push(SupportWarning::UntestedBundle(bundle.to_string()));
        }

        let descriptor = match (app, bundle) {
            (Some(app), _) => ClientDescriptor::app(app),
            (None, Some(bundle)) => {
                if !self.profile.supports_bundles() {
                    return Err(ClientError::BundlesUnsupported(self.profile.platform()));
                }
                ClientDescriptor::bundle(bundle)
            }
            (None, None) => return Err(ClientError::MissingSelector),
        };

        Ok(ResolvedClient {
            descriptor: descriptor.with_args(selection.app_args.clone()),
            warnings,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Fixed client configurations behind the convenience subcommands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Sftp,
    FileZilla,
    Transmit,
    Cyberduck,
    BitKinex,
    WinScp,
}

/// A preset expanded for a specific platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetRequest {
    pub selection: ClientSelection,
    pub persist: bool,
}

impl Preset {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Sftp => "SFTP",
            Self::FileZilla => "FileZilla",
            Self::Transmit => "Transmit",
            Self::Cyberduck => "Cyberduck",
            Self::BitKinex => "BitKinex",
            Self::WinScp => "WinSCP",
        }
    }

    /// Expand the preset for the profile's platform
    ///
    /// Platform restrictions are checked here, before any lookup happens.
    pub fn request(&self, profile: &PlatformProfile) -> ClientResult<PresetRequest> {
        let platform = profile.platform();
        let unsupported = || ClientError::PresetUnsupported {
            preset: *self,
            platform,
        };
        let app = |client: KnownClient| {
            profile
                .app_path(client)
                .map(str::to_string)
                .ok_or_else(unsupported)
        };

        let (selection, persist) = match (self, platform) {
            (Self::Sftp, _) => (ClientSelection::app(app(KnownClient::Sftp)?), false),
            (Self::FileZilla, _) => (
                ClientSelection::app(app(KnownClient::FileZilla)?).with_args("-l ask"),
                false,
            ),
            (Self::Transmit, Platform::MacOs) => (ClientSelection::bundle(TRANSMIT_BUNDLE), false),
            (Self::Cyberduck, Platform::MacOs) => {
                (ClientSelection::bundle(CYBERDUCK_BUNDLE), false)
            }
            (Self::Cyberduck, Platform::Windows) => {
                (ClientSelection::app(app(KnownClient::Cyberduck)?), true)
            }
            (Self::BitKinex, Platform::Windows) => (
                ClientSelection::app(app(KnownClient::BitKinex)?).with_args("browse"),
                false,
            ),
            (Self::WinScp, Platform::Windows) => {
                (ClientSelection::app(app(KnownClient::WinScp)?), false)
            }
            _ => return Err(unsupported()),
        };

        Ok(PresetRequest { selection, persist })
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientPaths;
    use crate::platform::HostFacts;

    fn profile(platform: Platform) -> PlatformProfile {
        PlatformProfile::new(platform, &ClientPaths::default(), &HostFacts::default())
    }

    #[test]
    fn test_supported_app_has_no_warning() {
        for platform in [Platform::MacOs, Platform::Linux, Platform::Windows] {
            let profile = profile(platform);
            let registry = ClientRegistry::new(&profile);
            for (_, path) in profile.apps() {
                let resolved = registry.resolve(&ClientSelection::app(path)).unwrap();
                assert!(resolved.warnings.is_empty(), "{platform}: {path}");
                assert_eq!(resolved.descriptor.name(), path);
            }
        }
    }

    #[test]
    fn test_unknown_app_warns_but_resolves() {
        let profile = profile(Platform::Linux);
        let registry = ClientRegistry::new(&profile);
        let resolved = registry.resolve(&ClientSelection::app("gftp")).unwrap();

        assert_eq!(resolved.descriptor, ClientDescriptor::app("gftp"));
        assert_eq!(
            resolved.warnings,
            vec![SupportWarning::UntestedApp("gftp".to_string())]
        );
    }

    #[test]
    fn test_missing_selector_is_fatal() {
        let profile = profile(Platform::Linux);
        let registry = ClientRegistry::new(&profile);
        assert_eq!(
            registry.resolve(&ClientSelection::default()),
            Err(ClientError::MissingSelector)
        );

        let blank = ClientSelection {
            app: Some("  ".to_string()),
            bundle: Some(String::new()),
            app_args: None,
        };
        assert_eq!(registry.resolve(&blank), Err(ClientError::MissingSelector));
    }

    #[test]
    fn test_app_wins_over_bundle() {
        let profile = profile(Platform::MacOs);
        let registry = ClientRegistry::new(&profile);
        let selection = ClientSelection {
            app: Some("filezilla".to_string()),
            bundle: Some("org.example.unknown".to_string()),
            app_args: None,
        };
        let resolved = registry.resolve(&selection).unwrap();

        assert!(!resolved.descriptor.is_bundle());
        assert_eq!(
            resolved.warnings,
            vec![SupportWarning::UntestedBundle("org.example.unknown".to_string())]
        );
    }

    #[test]
    fn test_bundle_requires_bundle_platform() {
        let mac = profile(Platform::MacOs);
        let resolved = ClientRegistry::new(&mac)
            .resolve(&ClientSelection::bundle(TRANSMIT_BUNDLE))
            .unwrap();
        assert!(resolved.descriptor.is_bundle());
        assert_eq!(resolved.descriptor.open_flag(), "-b");
        assert!(resolved.warnings.is_empty());

        let linux = profile(Platform::Linux);
        assert_eq!(
            ClientRegistry::new(&linux).resolve(&ClientSelection::bundle(TRANSMIT_BUNDLE)),
            Err(ClientError::BundlesUnsupported(Platform::Linux))
        );
    }

    #[test]
    fn test_blank_args_are_dropped() {
        let descriptor = ClientDescriptor::app("filezilla").with_args(Some("   "));
        assert_eq!(descriptor.extra_args(), None);

        let descriptor = ClientDescriptor::app("filezilla").with_args(Some(" -l ask "));
        assert_eq!(descriptor.extra_args(), Some("-l ask"));
    }

    #[test]
    fn test_interactive_sftp_detection() {
        assert!(ClientDescriptor::app("sftp").is_interactive_sftp());
        assert!(ClientDescriptor::app("/usr/bin/sftp").is_interactive_sftp());
        assert!(ClientDescriptor::app("\"C:\\Tools\\SFTP.EXE\"").is_interactive_sftp());
        assert!(!ClientDescriptor::app("filezilla").is_interactive_sftp());
        assert!(!ClientDescriptor::app("sftp-gui").is_interactive_sftp());
        assert!(!ClientDescriptor::bundle("sftp").is_interactive_sftp());
    }

    #[test]
    fn test_presets_per_platform() {
        let linux = profile(Platform::Linux);
        let request = Preset::FileZilla.request(&linux).unwrap();
        assert_eq!(request.selection.app.as_deref(), Some("filezilla"));
        assert_eq!(request.selection.app_args.as_deref(), Some("-l ask"));
        assert!(!request.persist);

        assert!(Preset::Sftp.request(&linux).is_ok());
        for preset in [Preset::Transmit, Preset::Cyberduck, Preset::BitKinex, Preset::WinScp] {
            assert_eq!(
                preset.request(&linux),
                Err(ClientError::PresetUnsupported {
                    preset,
                    platform: Platform::Linux
                })
            );
        }

        let mac = profile(Platform::MacOs);
        let request = Preset::Cyberduck.request(&mac).unwrap();
        assert_eq!(request.selection.bundle.as_deref(), Some(CYBERDUCK_BUNDLE));
        assert!(Preset::WinScp.request(&mac).is_err());

        let windows = profile(Platform::Windows);
        let request = Preset::Cyberduck.request(&windows).unwrap();
        assert!(request.persist);
        assert_eq!(
            request.selection.app.as_deref(),
            Some("\\Program Files\\Cyberduck\\Cyberduck.exe")
        );
        let request = Preset::BitKinex.request(&windows).unwrap();
        assert_eq!(request.selection.app_args.as_deref(), Some("browse"));
        assert!(Preset::Transmit.request(&windows).is_err());
    }
}
