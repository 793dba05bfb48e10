// crates/filer-core/src/validate.rs - Executable Validator
//
// Confirms the client is actually installed before anything is launched.
// Known aliases are first mapped to the binary they stand for (a macOS bundle
// id points at the executable inside its .app), then the path is probed.
//
// The probe is injected, like the ID manager's existence check, so the
// validator is testable without touching real install locations. Bare
// command names are resolved with `which`, which also checks the execute
// permission and PATHEXT.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::client::ClientDescriptor;
use crate::platform::{CYBERDUCK_BUNDLE, Platform, PlatformProfile, TRANSMIT_BUNDLE, unquote};

/// Errors raised while validating a client executable
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("No client executable was given")]
    EmptyClient,

    #[error("{} does not exist.", .0.display())]
    Missing(PathBuf),
}

/// Result type for executable validation
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maps client names to installed binaries and checks they exist
pub struct ExecutableValidator<'a, F>
where
    F: Fn(&Path) -> bool,
{
    profile: &'a PlatformProfile,
    path_var: Option<OsString>,
    probe: F,
}

impl<'a, F> ExecutableValidator<'a, F>
where
    F: Fn(&Path) -> bool,
{
    pub fn new(profile: &'a PlatformProfile, probe: F) -> Self {
        Self {
            profile,
            path_var: None,
            probe,
        }
    }

    /// Search this PATH-style list instead of the process `$PATH`
    pub fn with_path_var<S: Into<OsString>>(mut self, paths: S) -> Self {
        self.path_var = Some(paths.into());
        self
    }

    /// Install location the descriptor stands for, before probing
    pub fn canonical_path(&self, descriptor: &ClientDescriptor) -> ValidationResult<PathBuf> {
        let name = unquote(descriptor.name().trim());
        if name.is_empty() {
            return Err(ValidationError::EmptyClient);
        }

        Ok(canonical_alias(self.profile.platform(), name)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(name)))
    }

    /// Resolve and probe the client executable
    ///
    /// When the canonical path is missing, bare names (no directory part) are
    /// looked up on PATH.
    pub fn validate(&self, descriptor: &ClientDescriptor) -> ValidationResult<PathBuf> {
        let path = self.canonical_path(descriptor)?;

        if (self.probe)(&path) {
            tracing::debug!(path = %path.display(), "client executable found");
            return Ok(path);
        }

        let name = unquote(descriptor.name().trim());
        if is_bare_name(name)
            && let Some(found) = self.search(name)
        {
            tracing::debug!(path = %found.display(), "client executable found on PATH");
            return Ok(found);
        }

        Err(ValidationError::Missing(path))
    }

    fn search(&self, name: &str) -> Option<PathBuf> {
        let found = match &self.path_var {
            Some(paths) => which::which_in(name, Some(paths), "."),
            None => which::which(name),
        };
        found.ok()
    }
}

/// Canonical binaries for names that do not point at the binary themselves
///
/// macOS aliases fall back to the Unix ones, so `sftp` resolves to
/// `/usr/bin/sftp` on both.
fn canonical_alias(platform: Platform, name: &str) -> Option<&'static str> {
    let mac = match (platform, name) {
        (Platform::MacOs, "Cyberduck" | CYBERDUCK_BUNDLE) => {
            Some("/Applications/Cyberduck.app/Contents/MacOS/Cyberduck")
        }
        (Platform::MacOs, "Transmit" | TRANSMIT_BUNDLE) => {
            Some("/Applications/Transmit.app/Contents/MacOS/Transmit")
        }
        (Platform::MacOs, "filezilla") => Some("/Applications/FileZilla.app/Contents/MacOS/filezilla"),
        _ => None,
    };

    mac.or(match (platform, name) {
        (Platform::MacOs | Platform::Linux, "filezilla") => Some("/usr/bin/filezilla"),
        (Platform::MacOs | Platform::Linux, "sftp") => Some("/usr/bin/sftp"),
        _ => None,
    })
}

fn is_bare_name(name: &str) -> bool {
    !name.contains('/') && !name.contains('\\')
}
