//! Manifest loading and the immutable [`Manifest`] the resolver works from.
//!
//! The manifest file is JSON (or YAML, picked by the `.yml` / `.yaml`
//! extension):
//!
//! ```json
//! {
//!   "destination_path": "/mnt/backup",
//!   "source_list": { "root": ["~/notes.txt"], "projects": ["~/code/site"] },
//!   "ignore_list": ["*.tmp", ".git"],
//!   "shortcuts": { "~": "/home/user" }
//! }
//! ```

use crate::backup::ignore::{IgnorePattern, IgnoreSet};
use crate::backup::ordered_map::OrderedMap;
use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::shortcut::Shortcuts;
use crate::backup::validate::{
    validate_destination_path, validate_dir_name, validate_group_names, validate_shortcut_tokens,
};

use bon::Builder;
use derive_more::Display;
use getset::Getters;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Group key whose sources land directly in the output folder.
pub static ROOT_GROUP: &str = "root";

/// Where a group's sources are copied, relative to the output folder.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum DestinationKind {
    #[display("root")]
    Root,
    #[display("{_0}")]
    Named(String),
}

impl DestinationKind {
    pub fn from_group_name<S: Into<String>>(name: S) -> Self {
        let name = name.into();
        if name == ROOT_GROUP {
            Self::Root
        } else {
            Self::Named(name)
        }
    }

    pub fn dir_under<P: AsRef<Path>>(&self, output_dir: P) -> PathBuf {
        match self {
            Self::Root => output_dir.as_ref().to_path_buf(),
            Self::Named(name) => output_dir.as_ref().join(name),
        }
    }
}

/// A bucket of raw source paths sharing one destination directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub kind: DestinationKind,
    pub sources: Vec<String>,
}

impl Group {
    pub fn new<S: Into<String>, I: IntoIterator<Item = S>>(kind: DestinationKind, sources: I) -> Self {
        Self {
            kind,
            sources: sources.into_iter().map(Into::into).collect(),
        }
    }
}

/// `source_list` is either grouped or, as older manifests have it, a flat list
/// of paths that all go to the root group.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SourceList {
    Flat(Vec<String>),
    Grouped(OrderedMap<Vec<String>>),
}

impl SourceList {
    fn into_groups(self) -> Vec<Group> {
        match self {
            SourceList::Flat(sources) if sources.is_empty() => Vec::new(),
            SourceList::Flat(sources) => vec![Group::new(DestinationKind::Root, sources)],
            SourceList::Grouped(groups) => groups
                .into_iter()
                .map(|(name, sources)| Group::new(DestinationKind::from_group_name(name), sources))
                .collect(),
        }
    }
}

fn validate_source_list(source_list: &SourceList) -> std::result::Result<(), ValidationError> {
    match source_list {
        SourceList::Flat(_) => Ok(()),
        SourceList::Grouped(groups) => validate_group_names(groups),
    }
}

fn validate_shortcuts(shortcuts: &Shortcuts) -> std::result::Result<(), ValidationError> {
    validate_shortcut_tokens(shortcuts.as_map())
}

/// On-disk manifest shape.
#[derive(Clone, Debug, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ManifestConfig {
    #[validate(custom(function = validate_destination_path))]
    pub destination_path: PathBuf,
    #[validate(custom(function = validate_source_list))]
    pub source_list: SourceList,
    #[serde(default)]
    pub ignore_list: Vec<IgnorePattern>,
    #[serde(default)]
    #[validate(custom(function = validate_shortcuts))]
    pub shortcuts: Shortcuts,
}

impl ManifestConfig {
    /// Reads and validates a manifest file. Every failure is a config error
    /// naming `path`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        Self::read(path).map_err(|e| Error::config(path, e))
    }

    fn read(path: &Path) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let config: Self = match path.extension().and_then(OsStr::to_str) {
            Some("yml") | Some("yaml") => serde_yml::from_reader(reader)?,
            _ => serde_json::from_reader(reader)?,
        };
        config.validate()?;
        Ok(config)
    }
}

pub fn default_output_name() -> String {
    chrono::Utc::now().timestamp().to_string()
}

/// Everything a run needs, fixed before the first directive is resolved.
#[derive(Clone, Debug, Builder, Getters)]
#[getset(get = "pub")]
pub struct Manifest {
    #[builder(into)]
    destination_root: PathBuf,
    #[builder(default = default_output_name(), into)]
    output_name: String,
    #[builder(default)]
    groups: Vec<Group>,
    #[builder(default)]
    ignore: Arc<IgnoreSet>,
    #[builder(default)]
    shortcuts: Shortcuts,
}

impl Manifest {
    pub fn from_config(config: ManifestConfig, output_name: Option<String>) -> Result<Self> {
        let output_name = output_name.unwrap_or_else(default_output_name);
        validate_dir_name(&output_name).map_err(|e| {
            let mut errors = validator::ValidationErrors::new();
            errors.add("output_name", e);
            Error::from(errors)
        })?;

        Ok(Manifest::builder()
            .destination_root(config.destination_path)
            .output_name(output_name)
            .groups(config.source_list.into_groups())
            .ignore(Arc::new(IgnoreSet::new(config.ignore_list)?))
            .shortcuts(config.shortcuts)
            .build())
    }

    /// Loads the manifest at `path` and fixes the output folder name.
    pub fn load<P: AsRef<Path>>(path: P, output_name: Option<String>) -> Result<Self> {
        let path = path.as_ref();
        let config = ManifestConfig::load(path)?;
        tracing::debug!("Loaded manifest {:?}: {:?}", path, config);
        Self::from_config(config, output_name).map_err(|e| Error::config(path, e))
    }

    /// `destination_root/output_name`
    pub fn output_dir(&self) -> PathBuf {
        self.destination_root.join(&self.output_name)
    }
}
