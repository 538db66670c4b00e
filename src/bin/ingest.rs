use std::process::ExitCode;

use clap::Parser;
use tracing::info;
use vacvintage::{cli::{finish, PathArgs}, diagnostics::TracingDiagnostics, logging, pipeline};

/// Download the latest and previous AP2Y CSV editions into the raw directory.
#[derive(Parser)]
#[command(name = "ingest", version)]
struct Args {
    #[command(flatten)]
    paths: PathArgs,

    /// Series path on the publisher's site
    #[arg(long)]
    series_path: Option<String>,

    /// How many CSV editions to download
    #[arg(long)]
    num_files: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();
    let args = Args::parse();

    let result = async {
        let mut cfg = args.paths.resolve()?;
        if let Some(p) = args.series_path {
            cfg.series_path = p;
        }
        if let Some(n) = args.num_files {
            cfg.num_files = n;
        }
        let report = pipeline::ingest(&cfg, &TracingDiagnostics).await?;
        info!(downloaded = report.succeeded.len(), failed = report.failed.len(), "done");
        Ok::<_, anyhow::Error>(())
    }
    .await;
    finish(result)
}
