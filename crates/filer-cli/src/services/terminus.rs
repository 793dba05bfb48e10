// crates/filer-cli/src/services/terminus.rs - Terminus Site Directory
//
// Looks sites up through the Terminus CLI, which owns authentication and the
// conversation with the hosting platform's API. Two calls are made:
//
//   terminus site:info <site> --format=json               -> site id and name
//   terminus connection:info <site>.<env> --format=json   -> SFTP endpoint
//
// The endpoint is taken as Terminus reports it, so gateway or port settings
// made in Terminus itself carry over. Failures are not retried; whatever
// Terminus printed on stderr is passed through as the error message.

use serde::Deserialize;
use std::process::Command;

use filer_core::connection::{
    ResolveError, ResolveResult, SftpDetails, SiteDirectory, SiteEnv, SiteEnvironment,
};

/// Subset of `terminus site:info --format=json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SiteInfo {
    pub id: String,
    pub name: String,
}

/// SFTP fields of `terminus connection:info --format=json`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConnectionFields {
    pub sftp_username: String,
    pub sftp_host: String,
    pub sftp_url: String,
    pub sftp_command: String,
    #[serde(default)]
    pub git_port: Option<u16>,
}

impl ConnectionFields {
    /// Port from the `sftp://` URL, else the shared SSH port Terminus reports
    fn port(&self) -> ResolveResult<u16> {
        url_port(&self.sftp_url).or(self.git_port).ok_or_else(|| {
            ResolveError::Lookup(format!("No SFTP port in terminus output: {}", self.sftp_url))
        })
    }

    pub fn into_sftp(self) -> ResolveResult<SftpDetails> {
        let port = self.port()?;
        Ok(SftpDetails {
            host: self.sftp_host,
            port,
            username: self.sftp_username,
            url: self.sftp_url,
            command: self.sftp_command,
        })
    }
}

/// Site directory backed by the Terminus CLI
pub struct TerminusDirectory<'a> {
    binary: &'a str,
}

impl<'a> TerminusDirectory<'a> {
    pub fn new(binary: &'a str) -> Self {
        Self { binary }
    }

    /// Run Terminus and return its trimmed stdout
    fn run(&self, args: &[&str]) -> ResolveResult<String> {
        tracing::debug!(binary = self.binary, ?args, "running terminus");

        let output = Command::new(self.binary).args(args).output().map_err(|e| {
            ResolveError::Lookup(format!(
                "Failed to run '{}': {}\n\nTips:\n- Check that Terminus is installed and in PATH\n- Set FILER_TERMINUS_BIN or terminus.binary in the config file",
                self.binary, e
            ))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("{} {} exited with {}", self.binary, args.join(" "), output.status)
            } else {
                stderr
            };
            return Err(ResolveError::Lookup(message));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

impl SiteDirectory for TerminusDirectory<'_> {
    fn lookup(&self, target: &SiteEnv) -> ResolveResult<SiteEnvironment> {
        let site = parse_site_info(&self.run(&["site:info", &target.site, "--format=json"])?)?;
        let connection = parse_connection_info(&self.run(&[
            "connection:info",
            &target.to_string(),
            "--format=json",
        ])?)?;

        Ok(SiteEnvironment {
            sftp: connection.into_sftp()?,
            site_id: site.id,
            site_name: site.name,
            env_id: target.env.clone(),
        })
    }
}

/// Parse the JSON printed by `terminus site:info --format=json`
pub fn parse_site_info(json: &str) -> ResolveResult<SiteInfo> {
    serde_json::from_str(json)
        .map_err(|e| ResolveError::Lookup(format!("Unexpected output from terminus site:info: {e}")))
}

/// Parse the JSON printed by `terminus connection:info --format=json`
pub fn parse_connection_info(json: &str) -> ResolveResult<ConnectionFields> {
    serde_json::from_str(json).map_err(|e| {
        ResolveError::Lookup(format!("Unexpected output from terminus connection:info: {e}"))
    })
}

/// `sftp://user@host:2222` -> 2222
fn url_port(url: &str) -> Option<u16> {
    let authority = url.split_once("://").map_or(url, |(_, rest)| rest);
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, rest)| rest);
    host_port.rsplit_once(':')?.1.trim_end_matches('/').parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONNECTION_INFO: &str = r#"{
        "sftp_command": "sftp -o Port=2222 dev.abc-123@gw.example.net",
        "sftp_username": "dev.abc-123",
        "sftp_host": "gw.example.net",
        "sftp_password": "Use your account password",
        "sftp_url": "sftp://dev.abc-123@gw.example.net:2222",
        "git_command": "git clone ssh://codeserver.dev.abc-123@gw.example.net:2222/~/repository.git blog",
        "git_port": 2222
    }"#;

    #[test]
    fn test_parse_site_info() {
        let json = r#"{
            "id": "abc-123",
            "name": "blog",
            "label": "Blog",
            "created": "2020-01-01 00:00:00",
            "framework": "wordpress"
        }"#;
        let info = parse_site_info(json).unwrap();
        assert_eq!(
            info,
            SiteInfo {
                id: "abc-123".to_string(),
                name: "blog".to_string()
            }
        );
    }

    #[test]
    fn test_parse_site_info_rejects_garbage() {
        assert!(matches!(
            parse_site_info("Could not find site"),
            Err(ResolveError::Lookup(_))
        ));
        assert!(parse_site_info(r#"{"name": "blog"}"#).is_err());
    }

    #[test]
    fn test_connection_info_is_used_as_reported() {
        let sftp = parse_connection_info(CONNECTION_INFO)
            .unwrap()
            .into_sftp()
            .unwrap();

        assert_eq!(sftp.host, "gw.example.net");
        assert_eq!(sftp.port, 2222);
        assert_eq!(sftp.username, "dev.abc-123");
        assert_eq!(sftp.url, "sftp://dev.abc-123@gw.example.net:2222");
        assert_eq!(sftp.command, "sftp -o Port=2222 dev.abc-123@gw.example.net");
    }

    #[test]
    fn test_port_falls_back_to_git_port() {
        let json = r#"{
            "sftp_command": "sftp -o Port=2022 u@h",
            "sftp_username": "u",
            "sftp_host": "h",
            "sftp_url": "sftp://u@h",
            "git_port": 2022
        }"#;
        let sftp = parse_connection_info(json).unwrap().into_sftp().unwrap();
        assert_eq!(sftp.port, 2022);

        let no_port = r#"{
            "sftp_command": "sftp u@h",
            "sftp_username": "u",
            "sftp_host": "h",
            "sftp_url": "sftp://u@h"
        }"#;
        let err = parse_connection_info(no_port).unwrap().into_sftp().unwrap_err();
        assert!(matches!(err, ResolveError::Lookup(_)));
    }

    #[test]
    fn test_url_port() {
        assert_eq!(url_port("sftp://dev.abc@appserver.dev.abc.drush.in:2222"), Some(2222));
        assert_eq!(url_port("sftp://user@host:22/"), Some(22));
        assert_eq!(url_port("sftp://user@host"), None);
    }

    #[test]
    fn test_missing_binary_is_a_lookup_error() {
        let directory = TerminusDirectory::new("/nonexistent/terminus-binary");
        let err = directory.lookup(&"blog.dev".parse().unwrap()).unwrap_err();

        assert!(matches!(err, ResolveError::Lookup(_)));
        assert!(err.to_string().contains("/nonexistent/terminus-binary"));
    }

    #[cfg(unix)]
    #[test]
    fn test_lookup_through_fake_terminus() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("terminus");
        std::fs::write(
            &script,
            format!(
                r#"#!/bin/sh
case "$1" in
  site:info) echo '{{"id":"abc-123","name":"blog"}}' ;;
  connection:info)
    if [ "$2" = "blog.dev" ]; then
      cat <<'JSON'
{CONNECTION_INFO}
JSON
    else
      echo "Could not find an environment identified by $2." >&2; exit 1
    fi ;;
esac
"#
            ),
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let binary = script.to_string_lossy().to_string();
        let directory = TerminusDirectory::new(&binary);

        let found = directory.lookup(&"blog.dev".parse().unwrap()).unwrap();
        assert_eq!(found.site_id, "abc-123");
        assert_eq!(found.site_name, "blog");
        assert_eq!(found.env_id, "dev");
        assert_eq!(found.sftp.host, "gw.example.net");

        let err = directory.lookup(&"blog.qa".parse().unwrap()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Could not find an environment identified by blog.qa."
        );
    }
}
