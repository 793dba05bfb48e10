// crates/filer-cli/src/commands/open.rs - Open a site environment in a client
//
// This is the whole launcher pipeline. Every fatal condition surfaces as a
// `FilerError` and aborts the invocation; nothing is retried.
//
// ORDER OF OPERATIONS:
// 1. Parse <site>.<env> and pick the client      (no I/O)
// 2. Refuse persistence the client can't honour  (no I/O)
// 3. Resolve the connection                      (site directory)
// 4. Render the bookmark, synthesize the command
// 5. Validate the client executable              (filesystem probe)
// 6. Write the bookmark                          (only after 5 succeeded)
// 7. Launch                                      (only after 6 succeeded)
//
// Steps 5-7 are skipped with --dry-run, which prints the command instead.

use anyhow::Result;
use chrono::Utc;
use std::path::Path;

use filer_core::bookmark::BookmarkGenerator;
use filer_core::client::{ClientRegistry, ClientSelection};
use filer_core::command::{CommandSynthesizer, LaunchTarget};
use filer_core::connection::{ConnectionResolver, SiteDirectory, SiteEnv};
use filer_core::error::{FilerError, FilerResult};
use filer_core::platform::PlatformProfile;
use filer_core::validate::ExecutableValidator;

use crate::context::Context;
use crate::services::{BookmarkStore, Launch, LauncherService};

/// A fully specified open request, from `open` or from a preset
#[derive(Debug, Clone)]
pub struct OpenRequest {
    pub site_env: String,
    pub selection: ClientSelection,
    pub persist: bool,
}

/// Handle the open command, returning the process exit code
pub fn handle(ctx: &Context, request: OpenRequest) -> Result<i32> {
    let target: SiteEnv = request.site_env.parse().map_err(FilerError::from)?;
    let directory = ctx.site_directory(&target);
    let launcher = LauncherService::new(ctx.profile().platform());

    let pipeline = OpenPipeline {
        profile: ctx.profile(),
        directory: directory.as_ref(),
        domain_suffix: &ctx.config().hosting.domain_suffix,
        validator: ExecutableValidator::new(ctx.profile(), Path::is_file),
        launcher: &launcher,
        dry_run: ctx.dry_run(),
    };

    Ok(pipeline.run(&target, &request, Utc::now().timestamp())?)
}

/// Everything one open needs, borrowed from the caller
pub struct OpenPipeline<'a, F>
where
    F: Fn(&Path) -> bool,
{
    pub profile: &'a PlatformProfile,
    pub directory: &'a dyn SiteDirectory,
    pub domain_suffix: &'a str,
    pub validator: ExecutableValidator<'a, F>,
    pub launcher: &'a dyn Launch,
    pub dry_run: bool,
}

impl<F> OpenPipeline<'_, F>
where
    F: Fn(&Path) -> bool,
{
    /// Run the pipeline for `target`; `now` stamps a persisted bookmark
    pub fn run(&self, target: &SiteEnv, request: &OpenRequest, now: i64) -> FilerResult<i32> {
        let resolved = ClientRegistry::new(self.profile).resolve(&request.selection)?;
        for warning in &resolved.warnings {
            tracing::warn!("{warning}");
        }
        let descriptor = resolved.descriptor;

        if request.persist {
            BookmarkGenerator::ensure_supported(self.profile, &descriptor)?;
        }

        let info = ConnectionResolver::new(self.directory, self.domain_suffix).resolve(
            target,
            request.persist,
            now,
        )?;

        let bookmark = if request.persist {
            Some((
                BookmarkGenerator::destination(self.profile, &info)?,
                BookmarkGenerator::generate(&info)?,
            ))
        } else {
            None
        };
        let launch_target = match &bookmark {
            Some((path, _)) => LaunchTarget::Bookmark(path.clone()),
            None => LaunchTarget::url(&info),
        };

        let plan = CommandSynthesizer::new(self.profile).build(&descriptor, &info, &launch_target);

        tracing::info!("Opening {} in {}", info.domain, descriptor);

        if self.dry_run {
            if let Some((path, _)) = &bookmark {
                tracing::info!("Would write bookmark {}", path.display());
            }
            println!("{plan}");
            return Ok(0);
        }

        let executable = self.validator.validate(&descriptor)?;
        tracing::debug!(executable = %executable.display(), "client validated");

        if let Some((path, xml)) = &bookmark {
            BookmarkStore::write(path, xml)?;
        }

        Ok(self.launcher.launch(&plan)?.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::launcher::LaunchOutcome;
    use filer_core::command::LaunchPlan;
    use filer_core::config::{ClientPaths, HostingConfig};
    use filer_core::connection::{ResolveResult, SftpDetails, SiteEnvironment, bookmark_id};
    use filer_core::platform::{HostFacts, KnownClient, Platform};
    use std::cell::{Cell, RefCell};
    use std::fs;
    use std::path::PathBuf;

    struct StubDirectory {
        calls: Cell<usize>,
    }

    impl StubDirectory {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl SiteDirectory for StubDirectory {
        fn lookup(&self, target: &SiteEnv) -> ResolveResult<SiteEnvironment> {
            self.calls.set(self.calls.get() + 1);
            Ok(SiteEnvironment {
                sftp: SftpDetails::derive("abc-123", &target.env, &HostingConfig::default()),
                site_id: "abc-123".to_string(),
                site_name: target.site.clone(),
                env_id: target.env.clone(),
            })
        }
    }

    #[derive(Default)]
    struct RecordingLauncher {
        plans: RefCell<Vec<String>>,
    }

    impl Launch for RecordingLauncher {
        fn launch(&self, plan: &LaunchPlan) -> FilerResult<LaunchOutcome> {
            self.plans.borrow_mut().push(plan.command().to_string());
            Ok(LaunchOutcome::Detached)
        }
    }

    fn windows(roaming: &Path) -> PlatformProfile {
        let host = HostFacts {
            x86: false,
            roaming_dir: Some(roaming.to_path_buf()),
        };
        PlatformProfile::new(Platform::Windows, &ClientPaths::default(), &host)
    }

    fn cyberduck_request(profile: &PlatformProfile) -> OpenRequest {
        OpenRequest {
            site_env: "shop.dev".to_string(),
            selection: ClientSelection::app(profile.app_path(KnownClient::Cyberduck).unwrap()),
            persist: true,
        }
    }

    fn run<F: Fn(&Path) -> bool>(
        profile: &PlatformProfile,
        directory: &StubDirectory,
        launcher: &RecordingLauncher,
        probe: F,
        request: &OpenRequest,
    ) -> FilerResult<i32> {
        let pipeline = OpenPipeline {
            profile,
            directory,
            domain_suffix: "pantheon.io",
            validator: ExecutableValidator::new(profile, probe).with_path_var(""),
            launcher,
            dry_run: false,
        };
        let target = request.site_env.parse().unwrap();
        pipeline.run(&target, request, 1_700_000_000)
    }

    fn expected_bookmark(roaming: &Path) -> PathBuf {
        let id = bookmark_id("dev-shop.pantheon.io", "abc-123");
        roaming
            .join("Cyberduck")
            .join("Bookmarks")
            .join(format!("{id}.duck"))
    }

    #[test]
    fn test_persisted_cyberduck_opens_the_bookmark() {
        let roaming = tempfile::tempdir().unwrap();
        let profile = windows(roaming.path());
        let directory = StubDirectory::new();
        let launcher = RecordingLauncher::default();

        let code = run(&profile, &directory, &launcher, |_| true, &cyberduck_request(&profile))
            .unwrap();
        assert_eq!(code, 0);

        let bookmark = expected_bookmark(roaming.path());
        let xml = fs::read_to_string(&bookmark).unwrap();
        assert!(xml.contains("<string>dev-shop.pantheon.io</string>"));
        assert!(xml.contains("<string>1700000000</string>"));

        let plans = launcher.plans.borrow();
        assert_eq!(plans.len(), 1);
        assert!(plans[0].starts_with("start \"\" /b "));
        assert!(plans[0].ends_with(&bookmark.to_string_lossy().to_string()));
        assert!(!plans[0].contains("sftp://"));
    }

    #[test]
    fn test_missing_executable_writes_no_bookmark() {
        let roaming = tempfile::tempdir().unwrap();
        let profile = windows(roaming.path());
        let directory = StubDirectory::new();
        let launcher = RecordingLauncher::default();

        let err = run(&profile, &directory, &launcher, |_| false, &cyberduck_request(&profile))
            .unwrap_err();

        assert!(matches!(err, FilerError::Validation(_)));
        assert!(!expected_bookmark(roaming.path()).exists());
        assert!(launcher.plans.borrow().is_empty());
    }

    #[test]
    fn test_failed_bookmark_write_prevents_launch() {
        let roaming = tempfile::tempdir().unwrap();
        fs::write(roaming.path().join("Cyberduck"), "not a directory").unwrap();
        let profile = windows(roaming.path());
        let directory = StubDirectory::new();
        let launcher = RecordingLauncher::default();

        let err = run(&profile, &directory, &launcher, |_| true, &cyberduck_request(&profile))
            .unwrap_err();

        assert!(matches!(err, FilerError::Persistence(_)));
        assert!(launcher.plans.borrow().is_empty());
    }

    #[test]
    fn test_persist_with_other_client_fails_before_lookup() {
        let roaming = tempfile::tempdir().unwrap();
        let profile = windows(roaming.path());
        let directory = StubDirectory::new();
        let launcher = RecordingLauncher::default();
        let request = OpenRequest {
            site_env: "shop.dev".to_string(),
            selection: ClientSelection::app(profile.app_path(KnownClient::WinScp).unwrap()),
            persist: true,
        };

        let err = run(&profile, &directory, &launcher, |_| true, &request).unwrap_err();

        assert!(matches!(err, FilerError::Persistence(_)));
        assert_eq!(directory.calls.get(), 0);
        assert!(launcher.plans.borrow().is_empty());
    }

    #[test]
    fn test_without_persist_the_url_is_opened() {
        let roaming = tempfile::tempdir().unwrap();
        let profile = windows(roaming.path());
        let directory = StubDirectory::new();
        let launcher = RecordingLauncher::default();
        let mut request = cyberduck_request(&profile);
        request.persist = false;

        run(&profile, &directory, &launcher, |_| true, &request).unwrap();

        assert_eq!(directory.calls.get(), 1);
        assert!(!roaming.path().join("Cyberduck").exists());
        assert!(
            launcher.plans.borrow()[0]
                .ends_with("sftp://dev.abc-123@appserver.dev.abc-123.drush.in:2222")
        );
    }

    #[test]
    fn test_dry_run_neither_writes_nor_launches() {
        let roaming = tempfile::tempdir().unwrap();
        let profile = windows(roaming.path());
        let directory = StubDirectory::new();
        let launcher = RecordingLauncher::default();
        let request = cyberduck_request(&profile);

        let pipeline = OpenPipeline {
            profile: &profile,
            directory: &directory,
            domain_suffix: "pantheon.io",
            validator: ExecutableValidator::new(&profile, |_| false),
            launcher: &launcher,
            dry_run: true,
        };
        let code = pipeline
            .run(&"shop.dev".parse().unwrap(), &request, 1_700_000_000)
            .unwrap();

        assert_eq!(code, 0);
        assert!(!roaming.path().join("Cyberduck").exists());
        assert!(launcher.plans.borrow().is_empty());
    }
}
