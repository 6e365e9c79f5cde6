use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp, Normal, Poisson};
use tracing::debug;

use super::seasonality::SeasonalDesign;
use super::trend::{flat, piecewise_linear};
use super::{Growth, ParamRow, ProphetModel};
use crate::error::{ComputeError, Result};

/// Lower and upper bounds for every timeline point, from `uncertainty_samples`
/// simulated futures.
///
/// Each simulation draws new changepoints beyond the history (Poisson process
/// with the historical changepoint rate, Laplace-distributed slope changes)
/// and Gaussian observation noise. The RNG is seeded, so repeated calls return
/// identical bounds.
pub(crate) fn intervals(
    model: &ProphetModel,
    t: &[f64],
    design: &SeasonalDesign,
    yhat: &[f64],
) -> Result<Vec<(f64, f64)>> {
    if model.uncertainty_samples == 0 {
        return Ok(yhat.iter().map(|&y| (y, y)).collect());
    }

    let mut rng = StdRng::seed_from_u64(model.uncertainty_seed);
    let t_max = t.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sims: Vec<Vec<f64>> = vec![Vec::with_capacity(model.uncertainty_samples); t.len()];

    for i in 0..model.uncertainty_samples {
        let row = &model.params.rows[i % model.params.rows.len()];
        let trend = sample_trend(model, row, t, t_max, &mut rng)?;
        let terms = design.apply(&row.beta);
        let noise = Normal::new(0.0, row.sigma_obs)
            .map_err(|e| ComputeError::Prediction(format!("invalid sigma_obs: {}", e)))?;

        for (j, sim) in sims.iter_mut().enumerate() {
            let value = trend[j] * (1.0 + terms.multiplicative[j])
                + terms.additive[j] * model.y_scale
                + noise.sample(&mut rng) * model.y_scale;
            sim.push(value);
        }
    }

    let lower_q = (1.0 - model.interval_width) / 2.0;
    let upper_q = 1.0 - lower_q;
    debug!(
        samples = model.uncertainty_samples,
        lower_q, upper_q, "Computed uncertainty simulations"
    );

    Ok(sims
        .into_iter()
        .map(|mut sim| {
            sim.sort_by(f64::total_cmp);
            (percentile(&sim, lower_q), percentile(&sim, upper_q))
        })
        .collect())
}

fn sample_trend(
    model: &ProphetModel,
    row: &ParamRow,
    t: &[f64],
    t_max: f64,
    rng: &mut StdRng,
) -> Result<Vec<f64>> {
    let scaled = match model.growth {
        Growth::Flat => flat(t, row.m),
        Growth::Linear => {
            let rate = model.changepoints_t.len() as f64 * (t_max - 1.0);
            let n_changes = if t_max > 1.0 && rate > 0.0 {
                Poisson::new(rate)
                    .map_err(|e| ComputeError::Prediction(format!("invalid changepoint rate: {}", e)))?
                    .sample(rng) as usize
            } else {
                0
            };

            let mut changepoints = model.changepoints_t.clone();
            let mut deltas = row.delta.clone();
            if n_changes > 0 {
                let mean_abs = row.delta.iter().map(|d| d.abs()).sum::<f64>()
                    / row.delta.len().max(1) as f64;
                let slope_change = Exp::new(1.0 / (mean_abs + 1e-8))
                    .map_err(|e| ComputeError::Prediction(format!("invalid delta scale: {}", e)))?;

                let mut new_ts: Vec<f64> = (0..n_changes)
                    .map(|_| 1.0 + rng.gen_range(0.0..1.0) * (t_max - 1.0))
                    .collect();
                new_ts.sort_by(f64::total_cmp);
                changepoints.extend(new_ts);
                // Laplace(0, b) as the difference of two Exp(1/b) draws
                deltas.extend(
                    (0..n_changes).map(|_| slope_change.sample(rng) - slope_change.sample(rng)),
                );
            }
            piecewise_linear(t, &deltas, row.k, row.m, &changepoints)
        }
    };

    Ok(scaled
        .into_iter()
        .map(|v| v * model.y_scale + model.floor)
        .collect())
}

/// Linear-interpolated quantile `q` in `[0, 1]` of an ascending slice.
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let position = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}
