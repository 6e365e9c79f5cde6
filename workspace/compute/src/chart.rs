//! Plotly figure of a forecast.

use serde::Serialize;
use serde_json::{Value, json};

use crate::model::{Observation, PredictedSeries};

pub const CHART_TITLE: &str = "Previsão do Preço do Petróleo";
pub const X_AXIS_TITLE: &str = "Data";
pub const Y_AXIS_TITLE: &str = "US$";

const PREDICTED_COLOR: &str = "#0072B2";
const BAND_COLOR: &str = "rgba(0, 114, 178, 0.2)";
const WHITE: &str = "rgba(255, 255, 255, 1)";

/// Traces and layout, ready for `Plotly.newPlot`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub data: Vec<Value>,
    pub layout: Value,
}

/// History as markers, the point forecast as a line and the uncertainty
/// interval as a filled band, on a dark base theme with light overrides.
pub fn forecast_chart(history: &[Observation], series: &PredictedSeries) -> ChartSpec {
    let dates: Vec<String> = series.points().iter().map(|p| p.date.to_string()).collect();
    let lower: Vec<f64> = series.points().iter().map(|p| p.yhat_lower).collect();
    let yhat: Vec<f64> = series.points().iter().map(|p| p.yhat).collect();
    let upper: Vec<f64> = series.points().iter().map(|p| p.yhat_upper).collect();

    let data = vec![
        json!({
            "name": "Actual",
            "type": "scatter",
            "x": history.iter().map(|o| o.date.to_string()).collect::<Vec<_>>(),
            "y": history.iter().map(|o| o.value).collect::<Vec<_>>(),
            "mode": "markers",
            "marker": {"color": "black", "size": 4}
        }),
        // the band is drawn by filling lower -> predicted -> upper
        json!({
            "name": "Lower Bound",
            "type": "scatter",
            "x": dates,
            "y": lower,
            "mode": "lines",
            "line": {"width": 0},
            "hoverinfo": "skip"
        }),
        json!({
            "name": "Predicted",
            "type": "scatter",
            "x": dates,
            "y": yhat,
            "mode": "lines",
            "line": {"color": PREDICTED_COLOR, "width": 2},
            "fillcolor": BAND_COLOR,
            "fill": "tonexty"
        }),
        json!({
            "name": "Upper Bound",
            "type": "scatter",
            "x": dates,
            "y": upper,
            "mode": "lines",
            "line": {"width": 0},
            "fillcolor": BAND_COLOR,
            "fill": "tonexty",
            "hoverinfo": "skip"
        }),
    ];

    let mut layout = dark_base_layout();
    merge(&mut layout, light_overrides());

    ChartSpec { data, layout }
}

fn dark_base_layout() -> Value {
    json!({
        "showlegend": false,
        "height": 600,
        "font": {"color": "#f2f5fa"},
        "paper_bgcolor": "rgb(17, 17, 17)",
        "plot_bgcolor": "rgb(17, 17, 17)",
        "xaxis": {
            "type": "date",
            "gridcolor": "#283442",
            "rangeselector": {
                "buttons": [
                    {"count": 7, "label": "1w", "step": "day", "stepmode": "backward"},
                    {"count": 1, "label": "1m", "step": "month", "stepmode": "backward"},
                    {"count": 6, "label": "6m", "step": "month", "stepmode": "backward"},
                    {"count": 1, "label": "1y", "step": "year", "stepmode": "backward"},
                    {"step": "all"}
                ]
            },
            "rangeslider": {"visible": true}
        },
        "yaxis": {"gridcolor": "#283442"}
    })
}

fn light_overrides() -> Value {
    let black = || json!({"color": "black"});
    json!({
        "plot_bgcolor": WHITE,
        "paper_bgcolor": WHITE,
        "title": {"text": CHART_TITLE, "font": black()},
        "xaxis": {
            "title": {"text": X_AXIS_TITLE, "font": black()},
            "tickfont": black()
        },
        "yaxis": {
            "title": {"text": Y_AXIS_TITLE, "font": black()},
            "tickfont": black()
        }
    })
}

/// Recursively merges `update` into `target`, like Plotly's `update_layout`.
fn merge(target: &mut Value, update: Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => {
            for (key, value) in update {
                match target.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, update) => *target = update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForecastPoint;
    use chrono::NaiveDate;

    fn sample() -> (Vec<Observation>, PredictedSeries) {
        let d = |day| NaiveDate::from_ymd_opt(2024, 9, day).unwrap();
        let history = vec![
            Observation { date: d(6), value: 80.0 },
            Observation { date: d(9), value: 79.0 },
        ];
        let series = PredictedSeries::new(
            [(6, 80.1), (9, 79.2), (10, 79.5)]
                .into_iter()
                .map(|(day, yhat)| ForecastPoint {
                    date: d(day),
                    yhat,
                    yhat_lower: yhat - 2.0,
                    yhat_upper: yhat + 2.0,
                })
                .collect(),
        );
        (history, series)
    }

    #[test]
    fn test_light_theme_overrides_dark_base() {
        let (history, series) = sample();
        let chart = forecast_chart(&history, &series);

        assert_eq!(chart.layout["plot_bgcolor"], WHITE);
        assert_eq!(chart.layout["paper_bgcolor"], WHITE);
        assert_eq!(chart.layout["title"]["text"], CHART_TITLE);
        assert_eq!(chart.layout["title"]["font"]["color"], "black");
        assert_eq!(chart.layout["xaxis"]["title"]["text"], "Data");
        assert_eq!(chart.layout["yaxis"]["tickfont"]["color"], "black");
        // untouched base settings survive the merge
        assert_eq!(chart.layout["xaxis"]["rangeslider"]["visible"], true);
        assert_eq!(chart.layout["font"]["color"], "#f2f5fa");
    }

    #[test]
    fn test_traces_carry_history_and_bounds() {
        let (history, series) = sample();
        let chart = forecast_chart(&history, &series);

        let names: Vec<_> = chart.data.iter().map(|t| t["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Actual", "Lower Bound", "Predicted", "Upper Bound"]);
        assert_eq!(chart.data[0]["y"], json!([80.0, 79.0]));
        assert_eq!(chart.data[1]["y"][2], 77.5);
        assert_eq!(chart.data[3]["y"][2], 81.5);
        assert_eq!(chart.data[2]["x"][2], "2024-09-10");
    }
}
