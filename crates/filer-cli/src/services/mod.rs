// crates/filer-cli/src/services/mod.rs - Service layer modules
pub mod bookmarks;
pub mod launcher;
pub mod terminus;

pub use bookmarks::BookmarkStore;
pub use launcher::{Launch, LauncherService};
pub use terminus::TerminusDirectory;
