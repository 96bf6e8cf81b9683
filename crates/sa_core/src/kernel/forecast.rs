//! Time-series model: Holt linear-trend exponential smoothing with an
//! h-step-ahead forecast per column.

use crate::error::{Fault, Result};
use crate::frame::Column;
use crate::kernel::{
    finite, Cell, Kernel, KernelInput, KernelOutput, KernelShape, Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

pub const FIT_KEYS: &[&str] = &["stat-n", "stat-sse", "stat-level", "stat-trend"];

/// Holt fit summary: final level/trend plus one-step-ahead SSE.
pub struct HoltFit {
    pub level: f64,
    pub trend: f64,
    pub sse: f64,
}

/// Fits Holt's linear method with fixed smoothing constants.
pub fn holt_fit(xs: &[f64], smoothing: f64, trend_smoothing: f64) -> Result<HoltFit> {
    if xs.len() < 4 {
        return Err(Fault::NumericFailure("forecast needs at least 4 observations".into()));
    }
    let mut level = xs[0];
    let mut trend = xs[1] - xs[0];
    let mut sse = 0.0;
    for &x in &xs[1..] {
        let predicted = level + trend;
        sse += (x - predicted).powi(2);
        let prev_level = level;
        level = smoothing * x + (1.0 - smoothing) * (level + trend);
        trend = trend_smoothing * (level - prev_level) + (1.0 - trend_smoothing) * trend;
    }
    Ok(HoltFit {
        level: finite(level, "level")?,
        trend: finite(trend, "trend")?,
        sse: finite(sse, "SSE")?,
    })
}

/// Orders observations by the bound time-index column when present.
fn ordered_values(input: &KernelInput, col: &Column) -> Result<Vec<f64>> {
    let values = col
        .as_numeric()
        .ok_or_else(|| Fault::WrongKind(col.name.clone()))?;
    let time_col = input.columns(Role::TimeIndex).first().copied();
    let Some(time_col) = time_col else {
        return input.numeric_values(col);
    };
    let times = match &time_col.data {
        crate::frame::ColumnData::Datetime(cells) => cells,
        _ => return Err(Fault::WrongKind(time_col.name.clone())),
    };
    let mut pairs: Vec<(chrono::NaiveDateTime, f64)> = times
        .iter()
        .zip(values.iter())
        .filter_map(|(t, v)| match (t, v) {
            (Some(t), Some(v)) => Some((*t, *v)),
            _ => None,
        })
        .collect();
    pairs.sort_by_key(|(t, _)| *t);
    Ok(pairs.into_iter().map(|(_, v)| v).collect())
}

pub struct HoltForecastKernel;

impl Kernel for HoltForecastKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::TimeSeries
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let columns = input.columns(Role::Feature);
        let smoothing = input.params.real("smoothing").unwrap_or(0.3);
        let trend_smoothing = input.params.real("trend").unwrap_or(0.1);
        let horizon = input.params.integer("horizon").unwrap_or(5) as usize;

        let mut table = TableArtifact::new(
            columns.iter().map(|c| Label::verbatim(&c.name)).collect(),
            FIT_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        let mut output = KernelOutput::default();

        for col in &columns {
            let xs = ordered_values(input, col)?;
            let fit = holt_fit(&xs, smoothing, trend_smoothing)?;
            table.push_row(vec![
                Cell::Count(xs.len() as i64),
                Cell::Statistic(fit.sse),
                Cell::Statistic(fit.level),
                Cell::Statistic(fit.trend),
            ]);

            let n = xs.len();
            let forecast_xs: Vec<f64> = (1..=horizon).map(|h| (n - 1 + h) as f64).collect();
            let forecast_ys: Vec<f64> =
                (1..=horizon).map(|h| fit.level + h as f64 * fit.trend).collect();
            output.insert_recipe(
                PlotRecipe::new(format!("forecast:{}", col.name), PlotKind::Forecast)
                    .with_series(PlotSeries::values(&col.name, xs))
                    .with_series(PlotSeries::points("forecast", forecast_xs, forecast_ys))
                    .with_labels("figure-forecast", "axis-time", "axis-value"),
            );
        }

        output.insert_table("fit", table);
        Ok(output)
    }
}
