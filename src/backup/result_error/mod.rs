use std::fmt::Debug;
pub mod error;
pub mod result;

pub trait WithDebugObjectAndFnName<S: Into<String>, O: Debug + 'static> {
    fn with_debug_object_and_fn_name(self, obj: O, fn_name: S) -> Self;
}

pub trait WithMsg<S: Into<String>> {
    fn with_msg(self, msg: S) -> Self;
}

/// How the run driver treats an error, independent of the context it was wrapped in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Manifest file missing, unparsable or invalid.
    Config,
    /// Malformed command line argument.
    Flag,
    /// Source is neither a regular file nor a directory.
    SourceNotFound,
    /// Directory copy target already exists.
    DestinationConflict,
    /// Any other filesystem failure.
    Io,
}
