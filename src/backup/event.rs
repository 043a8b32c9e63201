//! Structured progress events emitted by a run.
//!
//! The copy engine never prints. It hands [`Event`]s to a [`Reporter`], and the
//! binary renders them through `tracing` with [`TracingReporter`].

use derive_more::Display;
use std::path::{Path, PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Display)]
pub enum EventClass {
    /// Start of a phase or of a directive.
    #[display("info")]
    Info,
    /// A directive failed but the run continues.
    #[display("error")]
    Error,
    /// The run completed.
    #[display("done")]
    Done,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub class: EventClass,
    pub message: String,
    pub path: Option<PathBuf>,
}

impl Event {
    pub fn info<S: Into<String>>(message: S) -> Self {
        Self {
            class: EventClass::Info,
            message: message.into(),
            path: None,
        }
    }

    pub fn error<S: Into<String>>(message: S) -> Self {
        Self {
            class: EventClass::Error,
            message: message.into(),
            path: None,
        }
    }

    pub fn done<S: Into<String>>(message: S) -> Self {
        Self {
            class: EventClass::Done,
            message: message.into(),
            path: None,
        }
    }

    pub fn with_path<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }
}

pub trait Reporter {
    fn report(&mut self, event: Event);
}

/// Logs every event as a `tracing` record.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&mut self, event: Event) {
        match (event.class, &event.path) {
            (EventClass::Info, Some(path)) => tracing::info!(path = ?path, "{}", event.message),
            (EventClass::Info, None) => tracing::info!("{}", event.message),
            (EventClass::Error, Some(path)) => tracing::error!(path = ?path, "{}", event.message),
            (EventClass::Error, None) => tracing::error!("{}", event.message),
            (EventClass::Done, Some(path)) => {
                tracing::info!(path = ?path, "Done: {}", event.message)
            }
            (EventClass::Done, None) => tracing::info!("Done: {}", event.message),
        }
    }
}

/// Keeps every event in memory.
#[cfg(test)]
#[derive(Clone, Debug, Default)]
pub struct CollectingReporter {
    pub events: Vec<Event>,
}

#[cfg(test)]
impl CollectingReporter {
    pub fn of_class(&self, class: EventClass) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.class == class)
    }
}

#[cfg(test)]
impl Reporter for CollectingReporter {
    fn report(&mut self, event: Event) {
        self.events.push(event);
    }
}
