use anyhow::Result;
use clap::Parser;
use tracing::debug;

use canopy_cli::{
    cli::{Cli, Commands},
    commands,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; stdout carries command output only
    let level = cli.level().to_string().to_lowercase();
    let env_filter = format!("canopy_query={},canopy_cli={}", level, level);
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .init();

    let output = match &cli.command {
        Commands::Translate {
            describe,
            config,
            sql,
        } => {
            debug!(sql = %sql, "Translating");
            commands::translate(describe, config.as_deref(), sql, cli.format)?
        }
        Commands::Reshape {
            describe,
            response,
            config,
            sql,
        } => {
            debug!(sql = %sql, "Reshaping");
            commands::reshape(describe, response, config.as_deref(), sql, cli.format)?
        }
    };

    println!("{}", output);
    Ok(())
}
