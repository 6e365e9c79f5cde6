/// Piecewise-linear trend in scaled units.
///
/// The slope changes by `deltas[j]` at every changepoint `changepoints_t[j] <= t`
/// and the offset is adjusted so the trend stays continuous.
pub(crate) fn piecewise_linear(
    t: &[f64],
    deltas: &[f64],
    k: f64,
    m: f64,
    changepoints_t: &[f64],
) -> Vec<f64> {
    t.iter()
        .map(|&ti| {
            let mut k_t = k;
            let mut m_t = m;
            for (&s, &delta) in changepoints_t.iter().zip(deltas) {
                if s <= ti {
                    k_t += delta;
                    m_t -= s * delta;
                }
            }
            k_t * ti + m_t
        })
        .collect()
}

pub(crate) fn flat(t: &[f64], m: f64) -> Vec<f64> {
    vec![m; t.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_piecewise_linear_without_changepoints_is_a_line() {
        let trend = piecewise_linear(&[0.0, 0.5, 1.0], &[], 2.0, 1.0, &[]);
        assert_eq!(trend, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_piecewise_linear_is_continuous_at_changepoint() {
        let cp = [0.5];
        let deltas = [-2.0];
        let before = piecewise_linear(&[0.499_999], &deltas, 2.0, 1.0, &cp)[0];
        let at = piecewise_linear(&[0.5], &deltas, 2.0, 1.0, &cp)[0];
        let after = piecewise_linear(&[1.0], &deltas, 2.0, 1.0, &cp)[0];

        assert!((before - at).abs() < 1e-5);
        // slope is zero after the changepoint
        assert!((after - at).abs() < 1e-12);
    }

    #[test]
    fn test_flat_trend() {
        assert_eq!(flat(&[0.0, 3.0], 0.7), vec![0.7, 0.7]);
    }
}
