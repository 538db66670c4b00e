use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use tracing::info;
use vacvintage::{
    cli::{finish, month_arg, PathArgs},
    diagnostics::TracingDiagnostics,
    logging, pipeline,
};

/// Download AP2Y vintages, rebuild the long table, forecast and chart revisions.
#[derive(Parser)]
#[command(name = "vacvintage", version)]
struct Args {
    #[command(flatten)]
    paths: PathArgs,

    /// How many CSV editions to download
    #[arg(long)]
    num_files: Option<usize>,

    /// Forecast horizon in months
    #[arg(long)]
    horizon: Option<usize>,

    /// Observation month for the revision path (defaults to the most revised month)
    #[arg(long, value_parser = month_arg)]
    month: Option<NaiveDate>,

    /// Work from the raw files already on disk
    #[arg(long)]
    skip_ingest: bool,

    /// Also export the long table as Parquet
    #[arg(long)]
    parquet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();
    info!("startup");

    finish(run(args).await)
}

async fn run(args: Args) -> anyhow::Result<()> {
    let mut cfg = args.paths.resolve()?;
    if let Some(n) = args.num_files {
        cfg.num_files = n;
    }
    if let Some(h) = args.horizon {
        cfg.horizon = h;
    }
    cfg.write_parquet |= args.parquet;

    pipeline::run_all(&cfg, args.skip_ingest, args.month, &TracingDiagnostics).await
}
