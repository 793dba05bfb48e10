// crates/filer-core/src/bookmark.rs - Bookmark Generator
//
// Builds the Cyberduck bookmark (a property-list XML document) for a resolved
// connection and decides where it belongs. Writing the file is an I/O concern
// handled by the CLI's bookmark store; everything here is pure.
//
// Bookmarks are only meaningful for Cyberduck on Windows, where the client
// watches its Bookmarks directory. Any other platform/client combination must
// fail loudly rather than launch without the bookmark the user asked for.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::client::ClientDescriptor;
use crate::connection::{BookmarkIdentity, ConnectionInfo};
use crate::platform::{Platform, PlatformProfile};

/// File extension Cyberduck uses for bookmarks
pub const BOOKMARK_EXTENSION: &str = "duck";

/// Errors raised while planning or writing a bookmark
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Persistent connections are not supported for {client} on {platform}")]
    Unsupported { client: String, platform: Platform },

    #[error("No bookmark directory could be determined for {0}")]
    NoBookmarkDirectory(Platform),

    #[error("Connection has no bookmark identity; persistence was not requested")]
    MissingIdentity,

    #[error("Failed to render bookmark: {0}")]
    Render(String),

    #[error("Failed to write bookmark {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type for bookmark operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Pure bookmark planning and rendering
pub struct BookmarkGenerator;

impl BookmarkGenerator {
    /// Whether the client can consume bookmark files on this platform
    pub fn supports(profile: &PlatformProfile, descriptor: &ClientDescriptor) -> bool {
        profile.platform() == Platform::Windows
            && !descriptor.is_bundle()
            && descriptor.is_family("cyberduck")
            && profile.bookmark_dir().is_some()
    }

    /// Fail unless persistence can be honoured for this client
    ///
    /// Called before the site lookup so an impossible request costs nothing.
    pub fn ensure_supported(
        profile: &PlatformProfile,
        descriptor: &ClientDescriptor,
    ) -> PersistenceResult<()> {
        if Self::supports(profile, descriptor) {
            return Ok(());
        }

        if profile.platform() == Platform::Windows
            && descriptor.is_family("cyberduck")
            && profile.bookmark_dir().is_none()
        {
            return Err(PersistenceError::NoBookmarkDirectory(profile.platform()));
        }

        Err(PersistenceError::Unsupported {
            client: descriptor.to_string(),
            platform: profile.platform(),
        })
    }

    /// Where the bookmark for `info` is stored
    pub fn destination(
        profile: &PlatformProfile,
        info: &ConnectionInfo,
    ) -> PersistenceResult<PathBuf> {
        let identity = Self::identity(info)?;
        let dir = profile
            .bookmark_dir()
            .ok_or(PersistenceError::NoBookmarkDirectory(profile.platform()))?;

        Ok(dir.join(format!("{}.{BOOKMARK_EXTENSION}", identity.id)))
    }

    /// Render the bookmark document
    pub fn generate(info: &ConnectionInfo) -> PersistenceResult<String> {
        let identity = Self::identity(info)?;

        let entries = [
            ("Protocol", "sftp".to_string()),
            ("Nickname", info.domain.clone()),
            ("UUID", identity.id.clone()),
            ("Hostname", info.host.clone()),
            ("Port", info.port.to_string()),
            ("Username", info.username.clone()),
            ("Path", String::new()),
            ("Access Timestamp", identity.timestamp.to_string()),
        ];

        let mut dict = plist::Dictionary::new();
        for (key, value) in entries {
            dict.insert(key.to_string(), plist::Value::String(value));
        }

        let mut buf = Vec::new();
        plist::Value::Dictionary(dict)
            .to_writer_xml(&mut buf)
            .map_err(|e| PersistenceError::Render(e.to_string()))?;
        let mut xml = String::from_utf8(buf).map_err(|e| PersistenceError::Render(e.to_string()))?;
        xml.push('\n');

        Ok(xml)
    }

    fn identity(info: &ConnectionInfo) -> PersistenceResult<&BookmarkIdentity> {
        info.bookmark
            .as_ref()
            .ok_or(PersistenceError::MissingIdentity)
    }
}
