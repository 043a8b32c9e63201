//! # snapcopy
//!
//! A manifest driven backup tool that copies a fixed set of files and
//! directories into a fresh, timestamped (or named) folder.
//!
//! ## Features
//!
//! - **Groups**: sources are bucketed into subfolders of the output folder, or
//!   copied straight into it through the `root` group
//! - **Ignore Patterns**: shell globs matched against entry names at every depth
//! - **Shortcuts**: literal path prefixes such as `~` expanded before copying
//! - **Error Policy**: per error kind choice between continuing and aborting
//!
//! ## Quick Start
//!
//! ```no_run
//! use snapcopy::backup::event::TracingReporter;
//! use snapcopy::backup::manifest::Manifest;
//! use snapcopy::backup::run::{run, ErrorPolicy};
//!
//! let manifest = Manifest::load("config.json", None)?;
//! let summary = run(&manifest, &ErrorPolicy::default(), &mut TracingReporter)?;
//! println!("{} items copied", summary.copied().len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backup;
