pub mod chart;
pub mod error;
pub mod horizon;
pub mod model;
pub mod prophet;
pub mod session;
pub mod table;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod timeline;

pub use chart::{ChartSpec, forecast_chart};
pub use error::{ComputeError, Result};
pub use horizon::Horizon;
pub use model::{ForecastModel, ForecastPoint, Observation, PredictedSeries, TrainedModel};
pub use prophet::{DEFAULT_UNCERTAINTY_SEED, ProphetModel, load_model};
pub use session::{ForecastRun, RenderOutput, SessionContext, on_submit, render};
pub use table::{forecast_table, read_csv, write_csv};
pub use timeline::{Frequency, Timeline};
