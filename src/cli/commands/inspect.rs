use anyhow::Result;
use tracing::trace;

use crate::config::{AppConfig, load_trained_model};

/// Prints the loaded model's summary as pretty JSON.
pub fn inspect(config: &AppConfig) -> Result<()> {
    trace!("Entering inspect function");
    let model = load_trained_model(config)?;
    println!("{}", serde_json::to_string_pretty(&model.summary())?);
    Ok(())
}
