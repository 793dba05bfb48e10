// crates/filer-cli/src/services/bookmarks.rs - Bookmark File Store
//
// Writes rendered bookmarks to disk. The write is all-or-nothing: content goes
// to a temporary file in the destination directory, which is then renamed over
// the final path. Observers see either the old file, the complete new file, or
// nothing; a failed write leaves no partial bookmark behind because the
// temporary file is removed when it is dropped.

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use filer_core::bookmark::{PersistenceError, PersistenceResult};

/// Persists bookmark documents
pub struct BookmarkStore;

impl BookmarkStore {
    /// Atomically write `content` to `path`
    ///
    /// The parent directory is created when missing.
    pub fn write(path: &Path, content: &str) -> PersistenceResult<()> {
        let wrap = |source: io::Error| PersistenceError::Write {
            path: path.to_path_buf(),
            source,
        };

        let dir = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        fs::create_dir_all(dir).map_err(wrap)?;

        let mut file = NamedTempFile::new_in(dir).map_err(wrap)?;
        file.write_all(content.as_bytes()).map_err(wrap)?;
        file.as_file().sync_all().map_err(wrap)?;
        file.persist(path).map_err(|e| wrap(e.error))?;

        tracing::debug!(path = %path.display(), "bookmark written");
        Ok(())
    }
}
