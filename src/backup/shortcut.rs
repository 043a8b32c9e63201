use crate::backup::ordered_map::OrderedMap;
use derive_more::From;
use serde::{Deserialize, Serialize};

/// Literal substring replacements applied to raw source paths.
///
/// Replacements run one after another in manifest order, so a later token can
/// rewrite text produced by an earlier replacement.
#[derive(Clone, Debug, Default, From, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Shortcuts {
    inner: OrderedMap<String>,
}

impl Shortcuts {
    pub fn expand(&self, raw: &str) -> String {
        self.inner
            .iter()
            .fold(raw.to_string(), |path, (token, replacement)| {
                path.replace(token, replacement)
            })
    }

    pub fn as_map(&self) -> &OrderedMap<String> {
        &self.inner
    }
}

impl FromIterator<(String, String)> for Shortcuts {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}
