use std::process::ExitCode;

use clap::Parser;
use vacvintage::{cli::{finish, PathArgs}, diagnostics::TracingDiagnostics, logging, pipeline};

/// Baseline forecasts from the latest-vintage series.
#[derive(Parser)]
#[command(name = "forecast", version)]
struct Args {
    #[command(flatten)]
    paths: PathArgs,

    /// Forecast horizon in months
    #[arg(long)]
    horizon: Option<usize>,
}

fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    finish(args.paths.resolve().and_then(|cfg| {
        let horizon = args.horizon.unwrap_or(cfg.horizon);
        pipeline::forecast(&cfg, horizon, &TracingDiagnostics).map(|_| ())
    }))
}
