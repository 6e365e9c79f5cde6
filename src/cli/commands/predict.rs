use anyhow::{Context, Result};
use compute::{Horizon, SessionContext, render};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info, trace};

use crate::config::{AppConfig, load_trained_model};

/// Forecasts `horizon` business days and writes the table CSV to `output`,
/// or to standard output.
pub fn predict(config: &AppConfig, horizon: u32, output: Option<&Path>) -> Result<()> {
    trace!("Entering predict function");
    let horizon = Horizon::new(horizon)?;
    let model = load_trained_model(config)?;

    let mut context = SessionContext::new();
    context.submit(model.as_ref(), horizon)?;
    let rendered = render(&context, model.history())?
        .context("No forecast was produced")?;
    debug!("Forecast table has {} rows", rendered.table.len());

    match output {
        Some(path) => {
            std::fs::write(path, &rendered.csv)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Forecast written to {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered.csv)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
