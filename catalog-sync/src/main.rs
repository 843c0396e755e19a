// catalog-sync/src/main.rs

mod cli;
mod commands;
mod logging;

use clap::Parser;
use clap::error::ErrorKind;

use cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Setup Logging (Tracing)
    // RUST_LOG=debug catalog-sync metadata.yaml to see every catalog request
    logging::init_tracing();

    // Usage errors exit with 1, like every other fatal start-up condition
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            e.print().ok();
            std::process::exit(1);
        }
    };

    commands::sync::execute(cli.metadata_file, cli.report_json).await
}
