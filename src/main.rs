use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsreel::app::AppContext;
use newsreel::cli::{commands, Cli, Commands};
use newsreel::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they stay out of command output
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config, cli.db, cli.offline).await?;

    match cli.command {
        Commands::Headlines { mode, pages } => {
            commands::headlines(&ctx, mode, pages).await?;
        }
        Commands::Show { id } => {
            commands::show(&ctx, &id)?;
        }
        Commands::Save { id } => {
            commands::save(&ctx, &id).await?;
        }
        Commands::Clear => {
            commands::clear(&ctx)?;
        }
        Commands::Status => {
            commands::status(&ctx)?;
        }
        Commands::Tui => {
            newsreel::tui::run(Arc::new(ctx)).await?;
        }
    }

    Ok(())
}
