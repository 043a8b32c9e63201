use crate::backup::result_error::error::Error;
use crate::backup::result_error::result::Result;
use crate::backup::validate::validate_dir_name;

use clap::Parser;
use getset::Getters;

use std::path::PathBuf;

pub static DEFAULT_CONFIG_FILE: &str = "config.json";

/// Copy a manifest's sources into a fresh, timestamped backup folder
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Location of the manifest file [default: config.json next to the executable]
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<Option<PathBuf>>,
    /// Name of the output folder [default: current Unix timestamp]
    #[arg(short, long, value_name = "NAME")]
    pub name: Option<Option<String>>,
}

/// Arguments after defaults are applied, fixed before any copying starts.
#[derive(Debug, Getters)]
pub struct ParsedArgs {
    #[getset(get = "pub")]
    config_path: PathBuf,
    /// `None` means the timestamp default.
    #[getset(get = "pub")]
    output_name: Option<String>,
    warnings: Vec<Error>,
}

impl ParsedArgs {
    pub fn from_args(args: Args) -> Result<Self> {
        let mut warnings = Vec::new();

        let config_path = match args.config {
            Some(Some(path)) => path,
            Some(None) => {
                warnings.push(Error::MissingFlagValue { flag: "--config" });
                default_config_path()?
            }
            None => default_config_path()?,
        };

        let output_name = match args.name {
            Some(Some(name)) => match validate_dir_name(&name) {
                Ok(()) => Some(name),
                Err(e) => {
                    warnings.push(Error::InvalidFlagValue {
                        flag: "--name",
                        value: name,
                        reason: e.to_string(),
                    });
                    None
                }
            },
            Some(None) => {
                warnings.push(Error::MissingFlagValue { flag: "--name" });
                None
            }
            None => None,
        };

        Ok(Self {
            config_path,
            output_name,
            warnings,
        })
    }

    pub fn warnings(&self) -> &[Error] {
        &self.warnings
    }
}

/// `config.json` in the directory holding the running executable.
pub fn default_config_path() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe
        .parent()
        .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)))
}
