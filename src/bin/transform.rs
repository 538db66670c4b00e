use std::process::ExitCode;

use clap::Parser;
use vacvintage::{cli::{finish, PathArgs}, diagnostics::TracingDiagnostics, logging, pipeline};

/// Rebuild the long vintage table from every raw CSV.
#[derive(Parser)]
#[command(name = "transform", version)]
struct Args {
    #[command(flatten)]
    paths: PathArgs,

    /// Also export the long table as Parquet
    #[arg(long)]
    parquet: bool,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    finish(args.paths.resolve().and_then(|mut cfg| {
        cfg.write_parquet |= args.parquet;
        pipeline::transform(&cfg, &TracingDiagnostics).map(|_| ())
    }))
}
