use clap::Parser;
use snapcopy::backup::args::{Args, ParsedArgs};
use snapcopy::backup::event::TracingReporter;
use snapcopy::backup::manifest::Manifest;
use snapcopy::backup::run::{run, ErrorPolicy};
use std::process::exit;
use tracing::{error, info, warn};

fn main() {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let res = ParsedArgs::from_args(args)
        .and_then(|parsed| {
            parsed.warnings().iter().for_each(|w| warn!("{w}"));
            Manifest::load(parsed.config_path(), parsed.output_name().clone())
        })
        .and_then(|manifest| run(&manifest, &ErrorPolicy::default(), &mut TracingReporter));

    match res {
        Ok(summary) => {
            if let Some(non_fatal_error) = summary.into_non_fatal_error() {
                warn!("Received non fatal error: {non_fatal_error}")
            }
            info!("Backup finished");
        }
        Err(e) => {
            error!("{e}");
            exit(1);
        }
    }
}
