//! Drives one backup run: resolve the manifest, then execute every directive
//! in order, consulting an [`ErrorPolicy`] whenever a directive fails.

use crate::backup::event::{Event, Reporter};
use crate::backup::execute::{CopyExecutor, CopyOutcome};
use crate::backup::manifest::Manifest;
use crate::backup::resolve::resolve;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::{convert_error_vec, Result};
use crate::backup::result_error::{ErrorKind, WithMsg};

use bon::Builder;
use getset::Getters;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyAction {
    /// Report the error and carry on with the next directive.
    Continue,
    /// Stop issuing directives and return the error.
    Abort,
}

/// Per error kind decision on whether a failed directive stops the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Builder)]
pub struct ErrorPolicy {
    #[builder(default = PolicyAction::Continue)]
    on_source_not_found: PolicyAction,
    #[builder(default = PolicyAction::Abort)]
    on_destination_conflict: PolicyAction,
    #[builder(default = PolicyAction::Abort)]
    on_io: PolicyAction,
}

impl Default for ErrorPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ErrorPolicy {
    pub fn action(&self, kind: ErrorKind) -> PolicyAction {
        match kind {
            ErrorKind::SourceNotFound => self.on_source_not_found,
            ErrorKind::DestinationConflict => self.on_destination_conflict,
            ErrorKind::Io => self.on_io,
            ErrorKind::Flag => PolicyAction::Continue,
            ErrorKind::Config => PolicyAction::Abort,
        }
    }
}

/// Result of a run that was not aborted.
#[derive(Debug, Default, Getters)]
#[getset(get = "pub")]
pub struct RunSummary {
    copied: Vec<CopyOutcome>,
    failed: Vec<Error>,
}

impl RunSummary {
    /// Every continued error folded into one, if there was any.
    pub fn into_non_fatal_error(self) -> Option<Error> {
        convert_error_vec(self.failed).err()
    }
}

/// `Init -> CreateDestRoot -> ProcessDirective* -> Done`
///
/// The output folder is created lazily by the first directive that targets
/// it, so an empty manifest leaves the filesystem untouched.
pub fn run<R: Reporter>(
    manifest: &Manifest,
    policy: &ErrorPolicy,
    reporter: &mut R,
) -> Result<RunSummary> {
    let output_dir = manifest.output_dir();
    let directives = resolve(manifest);
    reporter.report(
        Event::info(format!("Backing up {} sources", directives.len())).with_path(&output_dir),
    );

    let mut executor = CopyExecutor::new();
    let mut summary = RunSummary::default();
    for directive in &directives {
        reporter.report(
            Event::info(format!(
                "Copying {:?} into {:?}",
                directive.source(),
                directive.destination_dir()
            ))
            .with_path(directive.source()),
        );

        match executor.execute(directive) {
            Ok(outcome) => {
                reporter.report(Event::info(outcome.to_string()).with_path(outcome.dst()));
                summary.copied.push(outcome);
            }
            Err(e) => match policy.action(e.kind()) {
                PolicyAction::Continue => {
                    reporter.report(Event::error(e.to_string()).with_path(directive.source()));
                    summary.failed.push(e);
                }
                PolicyAction::Abort => {
                    return Err(e.with_msg(format!(
                        "Backup into {:?} aborted at {:?}",
                        output_dir,
                        directive.source()
                    )))
                }
            },
        }
    }

    reporter.report(
        Event::done(format!(
            "{} copied, {} failed",
            summary.copied.len(),
            summary.failed.len()
        ))
        .with_path(&output_dir),
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backup::event::{CollectingReporter, EventClass};
    use crate::backup::ignore::{IgnorePattern, IgnoreSet};
    use crate::backup::manifest::{DestinationKind, Group};
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn manifest(root: &Path, groups: Vec<Group>, patterns: &[&str]) -> Manifest {
        Manifest::builder()
            .destination_root(root)
            .output_name("out")
            .groups(groups)
            .ignore(Arc::new(
                IgnoreSet::new(patterns.iter().map(|p| IgnorePattern::new(p).unwrap())).unwrap(),
            ))
            .build()
    }

    fn path_str(path: PathBuf) -> String {
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_group_routing() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(src.join("f.txt"), "f").unwrap();
        std::fs::write(src.join("log.txt"), "log").unwrap();
        let dest = temp_dir.path().join("dest");

        let m = manifest(
            &dest,
            vec![
                Group::new(DestinationKind::Root, [path_str(src.join("f.txt"))]),
                Group::new(
                    DestinationKind::Named("logs".into()),
                    [path_str(src.join("log.txt"))],
                ),
            ],
            &[],
        );
        let mut reporter = CollectingReporter::default();
        let summary = run(&m, &ErrorPolicy::default(), &mut reporter).unwrap();

        assert_eq!(summary.copied().len(), 2);
        assert!(summary.failed().is_empty());
        assert_eq!(std::fs::read_to_string(dest.join("out/f.txt")).unwrap(), "f");
        assert_eq!(std::fs::read_to_string(dest.join("out/logs/log.txt")).unwrap(), "log");
        assert_eq!(reporter.of_class(EventClass::Done).count(), 1);
        assert_eq!(reporter.events.last().unwrap().class, EventClass::Done);
    }

    #[test]
    fn test_missing_source_is_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        std::fs::create_dir_all(src.join("dir")).unwrap();
        std::fs::write(src.join("dir/inner.txt"), "i").unwrap();
        std::fs::write(src.join("a.txt"), "a").unwrap();
        let dest = temp_dir.path().join("dest");

        let m = manifest(
            &dest,
            vec![Group::new(
                DestinationKind::Root,
                [
                    path_str(src.join("a.txt")),
                    path_str(src.join("missing.txt")),
                    path_str(src.join("dir")),
                ],
            )],
            &[],
        );
        let mut reporter = CollectingReporter::default();
        let summary = run(&m, &ErrorPolicy::default(), &mut reporter).unwrap();

        assert!(dest.join("out/a.txt").is_file());
        assert!(dest.join("out/dir/inner.txt").is_file());
        assert_eq!(summary.copied().len(), 2);
        assert_eq!(summary.failed().len(), 1);

        let errors: Vec<_> = reporter.of_class(EventClass::Error).collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("missing.txt"));
        assert_eq!(errors[0].path.as_deref(), Some(src.join("missing.txt").as_path()));

        let non_fatal = summary.into_non_fatal_error().unwrap();
        assert_eq!(non_fatal.kind(), ErrorKind::SourceNotFound);
    }

    #[test]
    fn test_conflict_aborts_by_default() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("project");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(temp_dir.path().join("after.txt"), "x").unwrap();
        let dest = temp_dir.path().join("dest");
        std::fs::create_dir_all(dest.join("out/project")).unwrap();

        let m = manifest(
            &dest,
            vec![Group::new(
                DestinationKind::Root,
                [path_str(src), path_str(temp_dir.path().join("after.txt"))],
            )],
            &[],
        );
        let mut reporter = CollectingReporter::default();
        let err = run(&m, &ErrorPolicy::default(), &mut reporter).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DestinationConflict);
        assert!(!dest.join("out/after.txt").exists());
        assert_eq!(reporter.of_class(EventClass::Done).count(), 0);
    }

    #[test]
    fn test_conflict_can_be_continued() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("project");
        std::fs::create_dir(&src).unwrap();
        std::fs::write(temp_dir.path().join("after.txt"), "x").unwrap();
        let dest = temp_dir.path().join("dest");
        std::fs::create_dir_all(dest.join("out/project")).unwrap();

        let m = manifest(
            &dest,
            vec![Group::new(
                DestinationKind::Root,
                [path_str(src), path_str(temp_dir.path().join("after.txt"))],
            )],
            &[],
        );
        let policy = ErrorPolicy::builder()
            .on_destination_conflict(PolicyAction::Continue)
            .build();
        let summary = run(&m, &policy, &mut CollectingReporter::default()).unwrap();

        assert!(dest.join("out/after.txt").is_file());
        assert_eq!(summary.failed().len(), 1);
    }

    #[test]
    fn test_root_directory_named_like_a_group_conflicts_in_either_order() {
        let temp_dir = TempDir::new().unwrap();
        let src_logs = temp_dir.path().join("src/logs");
        std::fs::create_dir_all(&src_logs).unwrap();
        std::fs::write(src_logs.join("old.log"), "old").unwrap();
        let new_log = temp_dir.path().join("new.log");
        std::fs::write(&new_log, "new").unwrap();

        let root = Group::new(DestinationKind::Root, [path_str(src_logs.clone())]);
        let logs = Group::new(
            DestinationKind::Named("logs".into()),
            [path_str(new_log.clone())],
        );
        for (name, groups) in [
            ("root_first", vec![root.clone(), logs.clone()]),
            ("group_first", vec![logs, root]),
        ] {
            let dest = temp_dir.path().join(name);
            let m = manifest(&dest, groups, &[]);
            let err = run(&m, &ErrorPolicy::default(), &mut CollectingReporter::default())
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::DestinationConflict, "{name}");
        }
        assert!(!temp_dir.path().join("root_first/out/logs/new.log").exists());
    }

    #[test]
    fn test_missing_source_can_abort() {
        let temp_dir = TempDir::new().unwrap();
        let m = manifest(
            &temp_dir.path().join("dest"),
            vec![Group::new(
                DestinationKind::Root,
                [path_str(temp_dir.path().join("absent"))],
            )],
            &[],
        );
        let policy = ErrorPolicy::builder()
            .on_source_not_found(PolicyAction::Abort)
            .build();
        let err = run(&m, &policy, &mut CollectingReporter::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SourceNotFound);
    }

    #[test]
    fn test_ignore_patterns_apply_to_directory_sources() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("tree");
        std::fs::create_dir_all(src.join("a")).unwrap();
        std::fs::write(src.join("a/b.tmp"), "tmp").unwrap();
        std::fs::write(src.join("a/c.txt"), "c").unwrap();
        let dest = temp_dir.path().join("dest");

        let m = manifest(
            &dest,
            vec![Group::new(
                DestinationKind::Named("trees".into()),
                [path_str(src)],
            )],
            &["*.tmp"],
        );
        run(&m, &ErrorPolicy::default(), &mut CollectingReporter::default()).unwrap();

        assert!(dest.join("out/trees/tree/a/c.txt").is_file());
        assert!(!dest.join("out/trees/tree/a/b.tmp").exists());
    }

    #[test]
    fn test_empty_manifest_creates_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dest = temp_dir.path().join("dest");
        let m = manifest(&dest, vec![], &[]);

        let summary = run(&m, &ErrorPolicy::default(), &mut CollectingReporter::default()).unwrap();
        assert!(summary.copied().is_empty());
        assert!(!dest.exists());
    }

    #[test]
    fn test_default_policy() {
        let policy = ErrorPolicy::default();
        assert_eq!(policy.action(ErrorKind::SourceNotFound), PolicyAction::Continue);
        assert_eq!(policy.action(ErrorKind::DestinationConflict), PolicyAction::Abort);
        assert_eq!(policy.action(ErrorKind::Io), PolicyAction::Abort);
        assert_eq!(policy.action(ErrorKind::Flag), PolicyAction::Continue);
        assert_eq!(policy.action(ErrorKind::Config), PolicyAction::Abort);
    }
}
