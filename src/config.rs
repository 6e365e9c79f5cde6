use anyhow::{Context, Result};
use compute::{DEFAULT_UNCERTAINTY_SEED, TrainedModel, load_model};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use crate::schemas::AppState;
use crate::sessions::SessionStore;

pub const DEFAULT_MODEL_PATH: &str = "modelo_json_prophet.json";
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_DASHBOARD_URL: &str =
    "https://lookerstudio.google.com/embed/reporting/f28ef11e-27fe-4ceb-b1d1-5fc5060a4db8/page/0yVWE";
const DEFAULT_SESSION_TTL_SECS: u64 = 1800;
const DEFAULT_SESSION_CAPACITY: u64 = 10_000;

/// Application configuration.
///
/// Sources, lowest priority first: built-in defaults, an optional
/// `brentcast.toml` in the working directory, then `BRENTCAST_*` environment
/// variables (a `.env` file is read first).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Prophet JSON artifact loaded at startup
    pub model_path: PathBuf,
    /// Bind address for the web server (IP:PORT)
    pub bind_address: String,
    /// Idle time after which a session is forgotten
    pub session_ttl_secs: u64,
    /// Maximum number of live sessions
    pub session_capacity: u64,
    /// Seed of the uncertainty interval simulation
    pub uncertainty_seed: u64,
    /// Embedded Looker Studio report
    pub dashboard_url: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings = ::config::Config::builder()
            .set_default("model_path", DEFAULT_MODEL_PATH)?
            .set_default("bind_address", DEFAULT_BIND_ADDRESS)?
            .set_default("session_ttl_secs", DEFAULT_SESSION_TTL_SECS)?
            .set_default("session_capacity", DEFAULT_SESSION_CAPACITY)?
            .set_default("uncertainty_seed", DEFAULT_UNCERTAINTY_SEED)?
            .set_default("dashboard_url", DEFAULT_DASHBOARD_URL)?
            .add_source(::config::File::with_name("brentcast").required(false))
            .add_source(::config::Environment::with_prefix("BRENTCAST"))
            .build()
            .context("Failed to read configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        debug!(?config, "Configuration loaded");
        Ok(config)
    }

    pub fn session_ttl(&self) -> Duration {
        Duration::from_secs(self.session_ttl_secs)
    }
}

/// Loads the model described by `config`. A missing or corrupt file is fatal.
pub fn load_trained_model(config: &AppConfig) -> Result<Arc<dyn TrainedModel>> {
    let model = load_model(&config.model_path)
        .with_context(|| format!("Failed to load model from {}", config.model_path.display()))?
        .with_uncertainty_seed(config.uncertainty_seed);
    Ok(Arc::new(model))
}

/// Initialize application state: the shared model and the session store.
pub fn initialize_app_state(config: &AppConfig) -> Result<AppState> {
    info!("Loading forecasting model: {}", config.model_path.display());
    let model = load_trained_model(config)?;

    let sessions = SessionStore::new(config.session_capacity, config.session_ttl());

    Ok(AppState::new(model, sessions, config.dashboard_url.clone()))
}
