use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::config::AppConfig;
use commands::{inspect, predict, serve};

#[derive(Parser)]
#[command(name = "brentcast")]
#[command(about = "Brent oil price forecast dashboard and CLI tools")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server
    Serve {
        /// Prophet JSON model file
        #[arg(short, long, env = "BRENTCAST_MODEL_PATH")]
        model_path: Option<PathBuf>,

        /// Bind address for the web server
        ///
        /// Format: IP:PORT (e.g., 0.0.0.0:3000, 127.0.0.1:8080)
        #[arg(short, long, env = "BRENTCAST_BIND_ADDRESS")]
        bind_address: Option<String>,
    },
    /// Forecast the next business days and print the table as CSV
    ///
    /// Examples:
    ///   brentcast predict --horizon 5
    ///   brentcast predict --horizon 30 --output previsao.csv
    Predict {
        /// Number of business days to forecast (1-30)
        #[arg(long, default_value_t = 1)]
        horizon: u32,

        /// Write the CSV to this file instead of standard output
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Prophet JSON model file
        #[arg(short, long, env = "BRENTCAST_MODEL_PATH")]
        model_path: Option<PathBuf>,
    },
    /// Print a summary of the model as JSON
    Inspect {
        /// Prophet JSON model file
        #[arg(short, long, env = "BRENTCAST_MODEL_PATH")]
        model_path: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let mut config = AppConfig::load()?;
        match self.command {
            Commands::Serve { model_path, bind_address } => {
                if let Some(model_path) = model_path {
                    config.model_path = model_path;
                }
                if let Some(bind_address) = bind_address {
                    config.bind_address = bind_address;
                }
                serve(&config).await?;
            }
            Commands::Predict { horizon, output, model_path } => {
                if let Some(model_path) = model_path {
                    config.model_path = model_path;
                }
                predict(&config, horizon, output.as_deref())?;
            }
            Commands::Inspect { model_path } => {
                if let Some(model_path) = model_path {
                    config.model_path = model_path;
                }
                inspect(&config)?;
            }
        }
        Ok(())
    }
}
