// crates/filer-cli/src/commands/config.rs - Print the default configuration

use anyhow::Result;

use filer_core::config::ConfigManager;

/// Print a commented default config file to stdout
///
/// ```bash
/// filer config > ~/.config/filer/config.toml
/// ```
pub fn handle() -> Result<i32> {
    print!("{}", ConfigManager::generate_default_config());
    Ok(0)
}
