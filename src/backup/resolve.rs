use crate::backup::ignore::IgnoreSet;
use crate::backup::manifest::{DestinationKind, Manifest};

use getset::Getters;

use std::path::PathBuf;
use std::sync::Arc;

/// One unit of work for the copy executor.
#[derive(Clone, Debug, Getters)]
#[getset(get = "pub")]
pub struct CopyDirective {
    /// Source path after shortcut expansion; may not exist.
    source: PathBuf,
    destination_kind: DestinationKind,
    /// Directory the source is copied into.
    destination_dir: PathBuf,
    ignore: Arc<IgnoreSet>,
}

impl CopyDirective {
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(
        source: S,
        destination_kind: DestinationKind,
        destination_dir: D,
        ignore: Arc<IgnoreSet>,
    ) -> Self {
        Self {
            source: source.into(),
            destination_kind,
            destination_dir: destination_dir.into(),
            ignore,
        }
    }
}

/// Flattens the manifest into directives, in group order and then source order.
///
/// Pure, no filesystem access.
pub fn resolve(manifest: &Manifest) -> Vec<CopyDirective> {
    let output_dir = manifest.output_dir();
    manifest
        .groups()
        .iter()
        .flat_map(|group| {
            let destination_dir = group.kind.dir_under(&output_dir);
            group.sources.iter().map(move |raw| {
                let source = manifest.shortcuts().expand(raw);
                tracing::trace!("Resolved {:?} to {:?}", raw, source);
                CopyDirective::new(
                    source,
                    group.kind.clone(),
                    destination_dir.clone(),
                    manifest.ignore().clone(),
                )
            })
        })
        .collect()
}
