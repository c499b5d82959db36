use anyhow::Result;
use clap::Parser;
use weather_pane::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    weather_pane::logging::init(&cli)?;
    weather_pane::run(cli).await
}
