use crate::backup::result_error::{ErrorKind, WithDebugObjectAndFnName, WithMsg};
use itertools::Itertools;
use std::fmt::Debug;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    ValidationError(#[from] validator::ValidationErrors),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    SerdeYml(#[from] serde_yml::Error),
    #[error(transparent)]
    Glob(#[from] globset::Error),
    #[error(transparent)]
    WalkDir(#[from] walkdir::Error),
    #[error(transparent)]
    StripPrefix(#[from] std::path::StripPrefixError),
    #[error("Failed to load manifest {:?}:\n{}", path, indent::indent_all_with("  ", error.to_string()))]
    Config { path: PathBuf, error: Box<Error> },
    #[error("{flag} expects a value, using default")]
    MissingFlagValue { flag: &'static str },
    #[error("{flag} value {value:?} is invalid, using default: {reason}")]
    InvalidFlagValue {
        flag: &'static str,
        value: String,
        reason: String,
    },
    #[error("Source {path:?} does not exist")]
    SourceNotFound { path: PathBuf },
    #[error("Source {path:?} is neither a regular file nor a directory")]
    UnsupportedSource { path: PathBuf },
    #[error("Cannot determine the base name of {path:?}")]
    NoBaseName { path: PathBuf },
    #[error("Destination {path:?} already exists, refusing to merge into it")]
    DestinationConflict { path: PathBuf },
    #[error("Destination {path:?} is the source file itself")]
    SameFile { path: PathBuf },
    #[error("Destination {path:?} was already filled by a directory copy")]
    DestinationClaimed { path: PathBuf },
    #[error("Destination {dst:?} is inside source {src:?}")]
    DestinationInsideSource { src: PathBuf, dst: PathBuf },
    #[error("{}:\n{}", msg, indent::indent_all_with("  ", error.to_string()))]
    WithMsg { msg: String, error: Box<Error> },
    #[error("{:?} {} failed:\n{}", obj_debug, fn_name, indent::indent_all_with("  ", error.to_string()))]
    WithDebugObjAndFnName {
        error: Box<Error>,
        obj_debug: Box<dyn Debug + Send>,
        fn_name: String,
    },
    #[error("{}", itertools::join(.0, "\n\n"))]
    LotsOfError(Vec<Error>),
}

impl<S: Into<String>, O: Debug + Send + 'static> WithDebugObjectAndFnName<S, O> for Error {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self {
        Error::WithDebugObjAndFnName {
            error: Box::new(self),
            obj_debug: Box::new(obj),
            fn_name: fn_name.into(),
        }
    }
}

impl<S: Into<String>> WithMsg<S> for Error {
    fn with_msg(self, msg: S) -> Self {
        Self::WithMsg {
            msg: msg.into(),
            error: Box::new(self),
        }
    }
}

impl Error {
    pub fn config<P: Into<PathBuf>>(path: P, error: Error) -> Self {
        Self::Config {
            path: path.into(),
            error: Box::new(error),
        }
    }

    /// Classifies the innermost error, looking through context wrappers.
    ///
    /// An aggregate takes the kind of its first error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Config { .. }
            | Error::ValidationError(_)
            | Error::SerdeJson(_)
            | Error::SerdeYml(_)
            | Error::Glob(_) => ErrorKind::Config,
            Error::MissingFlagValue { .. } | Error::InvalidFlagValue { .. } => ErrorKind::Flag,
            Error::SourceNotFound { .. } | Error::UnsupportedSource { .. } => {
                ErrorKind::SourceNotFound
            }
            Error::DestinationConflict { .. }
            | Error::DestinationInsideSource { .. }
            | Error::SameFile { .. }
            | Error::DestinationClaimed { .. } => ErrorKind::DestinationConflict,
            Error::WithMsg { error, .. } | Error::WithDebugObjAndFnName { error, .. } => {
                error.kind()
            }
            Error::LotsOfError(errors) => errors.first().map_or(ErrorKind::Io, Error::kind),
            Error::Io(_) | Error::WalkDir(_) | Error::StripPrefix(_) | Error::NoBaseName { .. } => {
                ErrorKind::Io
            }
        }
    }

    pub fn into_iter(self) -> Box<dyn Iterator<Item = Error>> {
        match self {
            Error::LotsOfError(v) => Box::new(v.into_iter().flat_map(|e| e.into_iter())),
            e => Box::new(std::iter::once(e)),
        }
    }

    pub fn chain(self, other: Error) -> Error {
        Error::LotsOfError(self.into_iter().chain(other.into_iter()).collect_vec())
    }
}
