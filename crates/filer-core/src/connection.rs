// crates/filer-core/src/connection.rs - Connection Resolver
//
// Turns a `<site>.<env>` argument into everything needed to open an SFTP
// session: endpoint, credentials user, a ready-to-run `sftp` command, and the
// public domain used for display and bookmark naming.
//
// Site lookup itself belongs to the hosting platform. It is reached through
// the `SiteDirectory` trait so the resolver can be driven by the Terminus CLI
// in production and by a local catalog (or a test double) elsewhere.
//
// FLOW:
//   "blog.dev" ──▶ SiteEnv ──▶ SiteDirectory::lookup ──▶ SiteEnvironment
//                                                          │
//                              ConnectionResolver::resolve ▼
//                                                    ConnectionInfo

use md5::{Digest, Md5};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{ConfigError, HostingConfig, SiteEntry};

/// Errors reported by the site directory
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Could not locate a site your user may access identified by {0}")]
    UnknownSite(String),

    #[error("Could not find an environment identified by {env} on {site}")]
    UnknownEnvironment { site: String, env: String },

    /// Failure reported by the external lookup, passed through verbatim
    #[error("{0}")]
    Lookup(String),
}

/// Result type for connection resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// A parsed `<site>.<env>` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEnv {
    pub site: String,
    pub env: String,
}

impl FromStr for SiteEnv {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidTarget(s.to_string());
        let (site, env) = s.trim().split_once('.').ok_or_else(invalid)?;

        if site.is_empty() || env.is_empty() || env.contains('.') {
            return Err(invalid());
        }

        Ok(Self {
            site: site.to_string(),
            env: env.to_string(),
        })
    }
}

impl fmt::Display for SiteEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.site, self.env)
    }
}

/// SFTP endpoint of one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SftpDetails {
    pub host: String,
    pub port: u16,
    pub username: String,
    /// Full `sftp://` URI
    pub url: String,
    /// Ready-made command for an interactive session
    pub command: String,
}

impl SftpDetails {
    /// Derive the endpoint the way the hosting platform names it
    ///
    /// Only catalogued sites need this; Terminus reports the endpoint itself.
    ///
    /// Without a gateway: user `<env>.<site-id>` on
    /// `appserver.<env>.<site-id>.<appserver_suffix>`.
    /// With `ssh_host` set: user `appserver.<env>.<site-id>` on the gateway.
    pub fn derive(site_id: &str, env_id: &str, hosting: &HostingConfig) -> Self {
        let (username, host) = match &hosting.ssh_host {
            Some(gateway) => (format!("appserver.{env_id}.{site_id}"), gateway.clone()),
            None => (
                format!("{env_id}.{site_id}"),
                format!("appserver.{env_id}.{site_id}.{}", hosting.appserver_suffix),
            ),
        };
        let port = hosting.ssh_port;

        Self {
            url: format!("sftp://{username}@{host}:{port}"),
            command: format!("sftp -o Port={port} {username}@{host}"),
            host,
            port,
            username,
        }
    }
}

/// What the site directory knows about one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteEnvironment {
    pub site_id: String,
    pub site_name: String,
    pub env_id: String,
    pub sftp: SftpDetails,
}

/// Lookup capability owned by the hosting platform
///
/// Implementations must not retry; the first failure is the answer.
pub trait SiteDirectory {
    fn lookup(&self, target: &SiteEnv) -> ResolveResult<SiteEnvironment>;
}

/// Site directory backed by the `[sites]` table of the config file
pub struct CatalogDirectory<'a> {
    sites: &'a BTreeMap<String, SiteEntry>,
    hosting: &'a HostingConfig,
}

impl<'a> CatalogDirectory<'a> {
    pub fn new(sites: &'a BTreeMap<String, SiteEntry>, hosting: &'a HostingConfig) -> Self {
        Self { sites, hosting }
    }

    pub fn contains(&self, site: &str) -> bool {
        self.sites.contains_key(site)
    }
}

impl SiteDirectory for CatalogDirectory<'_> {
    fn lookup(&self, target: &SiteEnv) -> ResolveResult<SiteEnvironment> {
        let entry = self
            .sites
            .get(&target.site)
            .ok_or_else(|| ResolveError::UnknownSite(target.site.clone()))?;

        if !entry.environments.is_empty() && !entry.environments.contains(&target.env) {
            return Err(ResolveError::UnknownEnvironment {
                site: target.site.clone(),
                env: target.env.clone(),
            });
        }

        Ok(SiteEnvironment {
            sftp: SftpDetails::derive(&entry.id, &target.env, self.hosting),
            site_id: entry.id.clone(),
            site_name: target.site.clone(),
            env_id: target.env.clone(),
        })
    }
}

/// Identity of a persisted bookmark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookmarkIdentity {
    /// First 8 hex chars of MD5(domain), a dash, then the site id
    pub id: String,
    /// Creation time in epoch seconds
    pub timestamp: i64,
}

/// Everything the launcher needs about the remote end
///
/// Created fresh for every invocation and never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub url: String,
    pub interactive_command: String,
    /// Public environment hostname, `<env>-<site-name>.<suffix>`
    pub domain: String,
    /// Present only when a persistent bookmark was requested
    pub bookmark: Option<BookmarkIdentity>,
}

/// Resolves a site environment through a `SiteDirectory`
pub struct ConnectionResolver<'a, D: SiteDirectory + ?Sized> {
    directory: &'a D,
    domain_suffix: &'a str,
}

impl<'a, D: SiteDirectory + ?Sized> ConnectionResolver<'a, D> {
    pub fn new(directory: &'a D, domain_suffix: &'a str) -> Self {
        Self {
            directory,
            domain_suffix,
        }
    }

    /// Look up the environment and assemble its connection info
    ///
    /// `now` is only used when `persist` is set, to stamp the bookmark.
    pub fn resolve(&self, target: &SiteEnv, persist: bool, now: i64) -> ResolveResult<ConnectionInfo> {
        let environment = self.directory.lookup(target)?;
        let domain = environment_domain(
            &environment.env_id,
            &environment.site_name,
            self.domain_suffix,
        );

        let bookmark = persist.then(|| BookmarkIdentity {
            id: bookmark_id(&domain, &environment.site_id),
            timestamp: now,
        });

        tracing::debug!(
            domain = %domain,
            host = %environment.sftp.host,
            persist,
            "resolved connection"
        );

        let SftpDetails {
            host,
            port,
            username,
            url,
            command,
        } = environment.sftp;

        Ok(ConnectionInfo {
            host,
            port,
            username,
            url,
            interactive_command: command,
            domain,
            bookmark,
        })
    }
}

/// Public hostname of an environment
pub fn environment_domain(env_id: &str, site_name: &str, suffix: &str) -> String {
    format!("{env_id}-{site_name}.{suffix}")
}

/// Stable bookmark identifier for a (domain, site) pair
pub fn bookmark_id(domain: &str, site_id: &str) -> String {
    let digest = Md5::digest(domain.as_bytes());
    let hex = format!("{digest:x}");
    format!("{}-{site_id}", &hex[..8])
}
