use anyhow::Result;
use std::path::PathBuf;

use filer_core::config::{ConfigManager, FilerConfig};
use filer_core::connection::{CatalogDirectory, SiteDirectory, SiteEnv};
use filer_core::error::FilerError;
use filer_core::platform::PlatformProfile;

use crate::services::TerminusDirectory;

/// Application context that gets passed to command handlers
///
/// Holds the loaded configuration and the platform profile. Both are built
/// once in `new` and only read afterwards.
pub struct Context {
    config: FilerConfig,
    profile: PlatformProfile,
    dry_run: bool,
}

impl Context {
    /// Load configuration and detect the platform
    ///
    /// An unsupported operating system fails here, before any lookup.
    pub fn new(config_path: Option<PathBuf>, dry_run: bool) -> Result<Self> {
        let config =
            ConfigManager::load_config(config_path.as_deref()).map_err(FilerError::from)?;
        let profile = PlatformProfile::detect(&config.clients).map_err(FilerError::from)?;

        tracing::debug!(platform = %profile.platform(), "platform profile ready");

        Ok(Self {
            config,
            profile,
            dry_run,
        })
    }

    /// Site directory able to answer for `target`
    ///
    /// Sites catalogued in the config file are resolved locally; everything
    /// else goes through Terminus.
    pub fn site_directory(&self, target: &SiteEnv) -> Box<dyn SiteDirectory + '_> {
        let catalog = CatalogDirectory::new(&self.config.sites, &self.config.hosting);
        if catalog.contains(&target.site) {
            tracing::debug!(site = %target.site, "using catalogued site");
            Box::new(catalog)
        } else {
            Box::new(TerminusDirectory::new(&self.config.terminus.binary))
        }
    }

    pub fn config(&self) -> &FilerConfig {
        &self.config
    }

    pub fn profile(&self) -> &PlatformProfile {
        &self.profile
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}
