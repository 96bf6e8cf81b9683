//! Declarative plot recipes.
//!
//! Kernels never render; they register recipes describing what to
//! draw. The assembler hands each recipe to the plot backend
//! collaborator, which owns fonts, pixels, and file formats.

use serde::{Deserialize, Serialize};

/// Recognized plot kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlotKind {
    HistogramWithDensity,
    Qq,
    Pp,
    Scatter,
    ScatterMatrix,
    Heatmap,
    Bar,
    GroupedBar,
    ErrorBar,
    Box,
    Line,
    Roc,
    Forecast,
    Scree,
}

impl PlotKind {
    /// Stable name used in side-car image file names.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlotKind::HistogramWithDensity => "histogram",
            PlotKind::Qq => "qq",
            PlotKind::Pp => "pp",
            PlotKind::Scatter => "scatter",
            PlotKind::ScatterMatrix => "scatter-matrix",
            PlotKind::Heatmap => "heatmap",
            PlotKind::Bar => "bar",
            PlotKind::GroupedBar => "grouped-bar",
            PlotKind::ErrorBar => "error-bar",
            PlotKind::Box => "box",
            PlotKind::Line => "line",
            PlotKind::Roc => "roc",
            PlotKind::Forecast => "forecast",
            PlotKind::Scree => "scree",
        }
    }
}

/// One named data series inside a recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSeries {
    pub label: String,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
}

impl PlotSeries {
    /// Series where only the y values matter (bars, box inputs).
    pub fn values(label: impl Into<String>, ys: Vec<f64>) -> Self {
        let xs = (0..ys.len()).map(|i| i as f64).collect();
        PlotSeries { label: label.into(), xs, ys }
    }

    pub fn points(label: impl Into<String>, xs: Vec<f64>, ys: Vec<f64>) -> Self {
        PlotSeries { label: label.into(), xs, ys }
    }
}

/// Declarative request for one figure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotRecipe {
    /// Name the output layout references.
    pub name: String,
    pub kind: PlotKind,
    pub series: Vec<PlotSeries>,
    /// Category labels for bar-like and heatmap axes.
    pub categories: Vec<String>,
    /// Locale-bundle keys, resolved at build time.
    pub title_key: String,
    pub x_label_key: String,
    pub y_label_key: String,
}

impl PlotRecipe {
    pub fn new(name: impl Into<String>, kind: PlotKind) -> Self {
        PlotRecipe {
            name: name.into(),
            kind,
            series: Vec::new(),
            categories: Vec::new(),
            title_key: String::new(),
            x_label_key: String::new(),
            y_label_key: String::new(),
        }
    }

    pub fn with_series(mut self, series: PlotSeries) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_labels(
        mut self,
        title_key: impl Into<String>,
        x_label_key: impl Into<String>,
        y_label_key: impl Into<String>,
    ) -> Self {
        self.title_key = title_key.into();
        self.x_label_key = x_label_key.into();
        self.y_label_key = y_label_key.into();
        self
    }
}
