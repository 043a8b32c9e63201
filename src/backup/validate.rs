//! Validation functions for manifest values.
//!
//! Provides custom validation functions for destination paths, group names,
//! output folder names and shortcut tokens.

use crate::backup::ordered_map::OrderedMap;
use sanitize_filename::{is_sanitized, sanitize};
use validator::ValidationError;

use std::path::Path;

/// Checks that `name` can be used as a single directory name.
pub fn validate_dir_name<S: AsRef<str>>(name: S) -> Result<(), ValidationError> {
    let name = name.as_ref();
    if name.is_empty() {
        return Err(ValidationError::new("InvalidDirName")
            .with_message("Directory name must not be empty".into()));
    }

    if !is_sanitized(name) {
        return Err(ValidationError::new("InvalidDirName").with_message(
            format!(
                "Invalid directory name {:?}, try sanitizing like {:?}",
                name,
                sanitize(name)
            )
            .into(),
        ));
    }

    Ok(())
}

/// Destination may be absent (it is created lazily) but must not be a file.
pub fn validate_destination_path<P: AsRef<Path>>(dir: P) -> Result<(), ValidationError> {
    let dir = dir.as_ref();
    if dir.as_os_str().is_empty() {
        return Err(ValidationError::new("InvalidDestination")
            .with_message("destination_path must not be empty".into()));
    }

    if dir.exists() && !dir.is_dir() {
        return Err(ValidationError::new("InvalidDestination")
            .with_message(format!("{:?} is not a directory", dir).into()));
    }

    Ok(())
}

pub fn validate_group_names<V>(groups: &OrderedMap<V>) -> Result<(), ValidationError> {
    groups.keys().try_for_each(|name| validate_dir_name(name))
}

pub fn validate_shortcut_tokens(shortcuts: &OrderedMap<String>) -> Result<(), ValidationError> {
    if shortcuts.keys().any(str::is_empty) {
        return Err(ValidationError::new("InvalidShortcut")
            .with_message("Shortcut token must not be empty".into()));
    }

    Ok(())
}
