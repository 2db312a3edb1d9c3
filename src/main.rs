use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use theme_tokens::{
    config::{self, RuntimeConfig},
    server,
};

#[derive(Debug, Parser)]
#[command(name = "theme-tokens", version, about = "Generate design token artifacts")]
struct Cli {
    /// Configuration file layered over the defaults and theme-tokens.toml
    #[arg(long, short, global = true, env = "THEME_TOKENS_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Write every token artifact once and exit
    Generate {
        /// JSON token tree
        #[arg(long)]
        tokens: Option<PathBuf>,
        /// Output directory
        #[arg(long)]
        out: Option<PathBuf>,
        /// Hide the per-file build log
        #[arg(long)]
        silent: Option<bool>,
    },
    /// Serve the generate endpoint
    Serve {
        /// Address to listen on, e.g. 127.0.0.1:3000
        #[arg(long)]
        bind: Option<String>,
    },
}

fn load_config(cli: &Cli) -> Result<RuntimeConfig> {
    let mut config = config::load(cli.config.as_deref()).context("loading configuration")?;
    match &cli.command {
        Command::Generate {
            tokens,
            out,
            silent,
        } => {
            if let Some(tokens) = tokens {
                config.tokens_file = tokens.clone();
            }
            if let Some(out) = out {
                config.tokens_dir = out.clone();
            }
            if let Some(silent) = silent {
                config.silent = *silent;
            }
        }
        Command::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind.clone();
            }
        }
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    theme_tokens::init_logging();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    match cli.command {
        Command::Generate { .. } => {
            let written = server::run_generation(&config)?;
            for path in written {
                println!("{}", path.display());
            }
        }
        Command::Serve { .. } => server::serve(config).await?,
    }
    Ok(())
}
