use crate::store::StoreOptions;
use clap::Parser;
use std::path::PathBuf;

/// Student marks sidecar: JSON-lines requests on stdin, responses on stdout.
#[derive(Debug, Parser)]
#[command(name = "studentd", version, about)]
pub struct Cli {
    /// Marks file to open at startup (otherwise wait for `store.open`)
    #[arg(long, env = "STUDENTD_DATA_FILE")]
    pub data_file: Option<PathBuf>,

    /// Do not create a missing marks file
    #[arg(long)]
    pub no_create: bool,

    /// Accept repeated student codes
    #[arg(long)]
    pub allow_duplicate_codes: bool,

    /// Skip the 0..=20 / 0..=100 score range checks on add and update
    #[arg(long)]
    pub lenient_ranges: bool,
}

impl Cli {
    pub fn store_options(&self) -> StoreOptions {
        StoreOptions {
            create_if_missing: !self.no_create,
            enforce_unique_codes: !self.allow_duplicate_codes,
            strict_ranges: !self.lenient_ranges,
        }
    }
}
