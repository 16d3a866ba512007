pub mod cli;
pub mod config;
pub mod error;
pub mod nexus;
pub mod util;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, Level};

use crate::cli::Args;
use crate::nexus::repository::Repository;
use crate::util::validating_http_downloader::ValidatingHttpDownloader;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("FAILURE: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let invoked_as = std::env::args().next().unwrap_or_default();
    let request = args.resolution_request(&invoked_as)?;
    let config = args.repository_config();
    debug!("resolving {:?} with {:?}", request, config);

    // listing fetches only print progress when a download follows
    let quiet = args.quiet || args.print_url_only;
    let downloader = Arc::new(ValidatingHttpDownloader::new(&config, quiet)?);
    let repo = Repository::for_request(&config, &request, downloader.clone());

    let artifact = repo.resolve(&request).await?;

    if args.print_url_only {
        println!("{}", artifact.download_uri);
        return Ok(());
    }

    let destination = args.output.clone()
        .unwrap_or_else(|| PathBuf::from(&artifact.display_name));

    tokio::select! {
        result = downloader.download(&artifact.download_uri, &artifact.display_name, &destination) => result,
        _ = tokio::signal::ctrl_c() => {
            // the download future was dropped mid-write, so the file is incomplete
            let _ = tokio::fs::remove_file(&destination).await;
            eprintln!("\nDownload cancelled.");
            Ok(())
        }
    }
}
