use crate::backup::copy_tree::{copy_file, copy_tree, TreeStats};
use crate::backup::function_path;
use crate::backup::resolve::CopyDirective;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::{WithDebugObjectAndFnName, WithMsg};

use derive_more::Display;
use function_name::named;

use std::collections::HashSet;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// What a successful directive produced.
#[derive(Clone, Debug, PartialEq, Eq, Display)]
pub enum CopyOutcome {
    #[display("Copied file {src:?} to {dst:?}")]
    File { src: PathBuf, dst: PathBuf },
    #[display("Copied directory {src:?} to {dst:?} ({stats})")]
    Tree {
        src: PathBuf,
        dst: PathBuf,
        stats: TreeStats,
    },
}

impl CopyOutcome {
    pub fn dst(&self) -> &Path {
        match self {
            CopyOutcome::File { dst, .. } | CopyOutcome::Tree { dst, .. } => dst,
        }
    }
}

/// Runs directives one after another, remembering which destination
/// directories it already made sure of and which ones a directory copy
/// produced.
#[derive(Debug, Default)]
pub struct CopyExecutor {
    created_dirs: HashSet<PathBuf>,
    tree_dsts: HashSet<PathBuf>,
}

impl CopyExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates `dir` and its parents unless this executor already did.
    ///
    /// Returns `true` when the directory was not known yet. An existing
    /// directory is not an error, unless an earlier directory copy of this
    /// run created it.
    pub fn ensure_dir<P: AsRef<Path>>(&mut self, dir: P) -> Result<bool> {
        let dir = dir.as_ref();
        if self.tree_dsts.contains(dir) {
            return Err(Error::DestinationClaimed {
                path: dir.to_path_buf(),
            });
        }
        if self.created_dirs.contains(dir) {
            return Ok(false);
        }

        std::fs::create_dir_all(dir)
            .map_err(Error::from)
            .with_msg(format!("Creating destination directory {:?} failed", dir))?;
        tracing::debug!("Destination directory ready: {:?}", dir);
        self.created_dirs.insert(dir.to_path_buf());
        Ok(true)
    }

    #[named]
    pub fn execute(&mut self, directive: &CopyDirective) -> Result<CopyOutcome> {
        self.ensure_dir(directive.destination_dir())?;

        let src = directive.source();
        let md = match std::fs::metadata(src) {
            Ok(md) => md,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(Error::SourceNotFound {
                    path: src.to_path_buf(),
                })
            }
            Err(e) => {
                return Err(Error::from(e).with_msg(format!("Inspecting source {:?} failed", src)))
            }
        };

        let file_type = md.file_type();
        if file_type.is_dir() {
            let dst = directive.destination_dir().join(base_name(src)?);
            let stats = copy_tree(src, &dst, directive.ignore())
                .with_debug_object_and_fn_name(directive.clone(), function_path!())?;
            self.tree_dsts.insert(dst.clone());
            Ok(CopyOutcome::Tree {
                src: src.to_path_buf(),
                dst,
                stats,
            })
        } else if file_type.is_file() {
            let dst = directive.destination_dir().join(base_name(src)?);
            copy_file(src, &dst)
                .map(|_| CopyOutcome::File {
                    src: src.to_path_buf(),
                    dst,
                })
                .with_debug_object_and_fn_name(directive.clone(), function_path!())
        } else {
            Err(Error::UnsupportedSource {
                path: src.to_path_buf(),
            })
        }
    }
}

/// Final path component, resolving `.` and `..` through the filesystem.
fn base_name(path: &Path) -> Result<OsString> {
    if let Some(name) = path.file_name() {
        return Ok(name.to_os_string());
    }

    path.canonicalize()?
        .file_name()
        .map(|n| n.to_os_string())
        .ok_or_else(|| Error::NoBaseName {
            path: path.to_path_buf(),
        })
}
