// crates/filer-cli/src/commands/mod.rs - Command Handler Modules
//
// MODULE ORGANIZATION:
// - open: the launcher pipeline behind `filer open`
// - presets: fixed-client shortcuts delegating to open
// - clients: registry listing
// - config: default config output
//
// Every handler returns the process exit code.

pub mod clients;
pub mod config;
pub mod open;
pub mod presets;
