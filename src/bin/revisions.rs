use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use vacvintage::{cli::{finish, month_arg, PathArgs}, logging, pipeline};

/// Revision path of one observation month across releases.
#[derive(Parser)]
#[command(name = "revisions", version)]
struct Args {
    #[command(flatten)]
    paths: PathArgs,

    /// Observation month, YYYY-MM (defaults to the most revised month)
    #[arg(long, value_parser = month_arg)]
    month: Option<NaiveDate>,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    finish(
        args.paths
            .resolve()
            .and_then(|cfg| pipeline::revisions(&cfg, args.month).map(|_| ())),
    )
}
