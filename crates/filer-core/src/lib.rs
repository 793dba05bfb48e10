// crates/filer-core/src/lib.rs - Core library for the filer CLI
//
// filer opens a hosted site environment in an external SFTP client. This crate
// holds every decision the launcher makes; the CLI crate only adds process
// spawning, file writes and the Terminus lookup.
//
// MODULE MAP (leaf-first):
// - platform:   what the current OS looks like (paths, launch style, bundles)
// - config:     config file schema, env overrides, validation
// - client:     client registry, descriptors, presets
// - connection: site directory trait and connection resolution
// - bookmark:   Cyberduck bookmark planning and rendering
// - command:    launch command synthesis
// - validate:   executable existence checks
// - error:      the taxonomy tying the module errors together

pub mod bookmark;
pub mod client;
pub mod command;
pub mod config;
pub mod connection;
pub mod error;
pub mod platform;
pub mod validate;

pub use bookmark::{BookmarkGenerator, PersistenceError};
pub use client::{ClientDescriptor, ClientRegistry, ClientSelection, Preset, SupportWarning};
pub use command::{CommandSynthesizer, LaunchPlan, LaunchTarget};
pub use config::{ConfigManager, FilerConfig};
pub use connection::{ConnectionInfo, ConnectionResolver, SiteDirectory, SiteEnv};
pub use error::{ErrorCategory, FilerError, FilerResult};
pub use platform::{Platform, PlatformProfile};
pub use validate::ExecutableValidator;
