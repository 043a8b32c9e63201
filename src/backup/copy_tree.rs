use crate::backup::ignore::IgnoreSet;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::result_error::WithMsg;

use derive_more::Display;
use filetime::FileTime;
use walkdir::WalkDir;

use std::fs::Metadata;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Counts of what a directory copy did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Display)]
#[display("{files} files, {dirs} directories, {ignored} ignored, {skipped} skipped")]
pub struct TreeStats {
    pub files: usize,
    /// Directories created below the copy root.
    pub dirs: usize,
    /// Entries matched by an ignore pattern (an ignored directory counts once).
    pub ignored: usize,
    /// Special files and dangling links.
    pub skipped: usize,
}

fn set_times_from(dst: &Path, md: &Metadata) -> Result<()> {
    filetime::set_file_times(
        dst,
        FileTime::from_last_access_time(md),
        FileTime::from_last_modification_time(md),
    )
    .map_err(Error::from)
    .with_msg(format!("Setting timestamps on {:?} failed", dst))
}

#[cfg(unix)]
fn is_same_file(a: &Metadata, b: &Metadata, _: &Path, _: &Path) -> Result<bool> {
    use std::os::unix::fs::MetadataExt;
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn is_same_file(_: &Metadata, _: &Metadata, a: &Path, b: &Path) -> Result<bool> {
    Ok(a.canonicalize()? == b.canonicalize()?)
}

/// Copies one regular file, replacing `dst` if it exists, and carries the
/// access and modification times over.
///
/// `dst` naming the same file as `src` is refused, the copy would truncate it.
pub fn copy_file<P1: AsRef<Path>, P2: AsRef<Path>>(src: P1, dst: P2) -> Result<()> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    let src_md = std::fs::metadata(src)?;
    match std::fs::metadata(dst) {
        Ok(dst_md) if is_same_file(&src_md, &dst_md, src, dst)? => {
            return Err(Error::SameFile {
                path: dst.to_path_buf(),
            })
        }
        Ok(_) => {}
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => {
            return Err(Error::from(e).with_msg(format!("Inspecting destination {:?} failed", dst)))
        }
    }

    std::fs::copy(src, dst)
        .map_err(Error::from)
        .with_msg(format!("Copying {:?} to {:?} failed", src, dst))?;
    set_times_from(dst, &src_md)
}

fn ensure_not_nested(src: &Path, dst: &Path) -> Result<()> {
    let src_canonical = src.canonicalize()?;
    let dst_parent = match dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.canonicalize()?,
        _ => std::env::current_dir()?,
    };
    if dst_parent.starts_with(&src_canonical) {
        return Err(Error::DestinationInsideSource {
            src: src.to_path_buf(),
            dst: dst.to_path_buf(),
        });
    }
    Ok(())
}

/// Recursively copies the directory `src` to the new directory `dst`.
///
/// Entry names matching `ignore` are left out at every depth and ignored
/// directories are not descended into. `dst` must not exist yet.
pub fn copy_tree<P1: AsRef<Path>, P2: AsRef<Path>>(
    src: P1,
    dst: P2,
    ignore: &IgnoreSet,
) -> Result<TreeStats> {
    let (src, dst) = (src.as_ref(), dst.as_ref());
    ensure_not_nested(src, dst)?;

    match std::fs::create_dir(dst) {
        Ok(()) => {}
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            return Err(Error::DestinationConflict {
                path: dst.to_path_buf(),
            })
        }
        Err(e) => {
            return Err(Error::from(e).with_msg(format!("Creating directory {:?} failed", dst)))
        }
    }

    tracing::debug!("Copying tree {:?} to {:?}", src, dst);
    let mut stats = TreeStats::default();
    let mut ignored = 0;
    let mut dir_times: Vec<(PathBuf, Metadata)> = vec![(dst.to_path_buf(), std::fs::metadata(src)?)];

    let walker = WalkDir::new(src)
        .follow_links(true)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|de| {
            if ignore.is_match(de.file_name()) {
                tracing::trace!("Skipping {:?}, ignored", de.path());
                ignored += 1;
                false
            } else {
                true
            }
        });

    for res in walker {
        let de = match res {
            Ok(de) => de,
            Err(e) if e.io_error().map(|io| io.kind()) == Some(ErrorKind::NotFound) => {
                tracing::warn!("Skipping {:?}, target of link is missing", e.path());
                stats.skipped += 1;
                continue;
            }
            Err(e) => return Err(Error::from(e)),
        };

        let target = dst.join(de.path().strip_prefix(src)?);
        let file_type = de.file_type();
        if file_type.is_dir() {
            std::fs::create_dir(&target)
                .map_err(Error::from)
                .with_msg(format!("Creating directory {:?} failed", target))?;
            dir_times.push((target, de.metadata()?));
            stats.dirs += 1;
        } else if file_type.is_file() {
            copy_file(de.path(), &target)?;
            tracing::trace!("Copied file: {:?} -> {:?}", de.path(), target);
            stats.files += 1;
        } else {
            tracing::warn!("Skipping {:?}, not a regular file or directory", de.path());
            stats.skipped += 1;
        }
    }
    stats.ignored = ignored;

    // Directory times go last, creating children bumps the parent mtime.
    for (dir, md) in dir_times.iter().rev() {
        set_times_from(dir, md)?;
    }

    Ok(stats)
}
