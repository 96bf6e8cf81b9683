//! Plot backends: collaborators that turn recipes into image bytes.

use crate::error::Result;
use crate::result::FigureSection;

/// Renders one figure to image bytes. Implementations own fonts,
/// colors, and formats; callers own file placement.
pub trait PlotBackend: Send + Sync {
    /// File extension of produced images, without the dot.
    fn extension(&self) -> &'static str;

    fn render(&self, figure: &FigureSection) -> Result<Vec<u8>>;
}

/// A backend that renders nothing. Useful for hosts that only want the
/// textual report, and for tests.
pub struct NullBackend;

impl PlotBackend for NullBackend {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, _figure: &FigureSection) -> Result<Vec<u8>> {
        Ok(Vec::new())
    }
}

/// Minimal deterministic SVG renderer: axis box, series as polylines
/// or bars, localized title and axis labels. Identical input yields
/// byte-identical output.
pub struct SvgBackend {
    pub width: u32,
    pub height: u32,
}

impl Default for SvgBackend {
    fn default() -> Self {
        SvgBackend { width: 640, height: 420 }
    }
}

const SERIES_COLORS: &[&str] = &["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd"];
const MARGIN: f64 = 48.0;

impl PlotBackend for SvgBackend {
    fn extension(&self) -> &'static str {
        "svg"
    }

    fn render(&self, figure: &FigureSection) -> Result<Vec<u8>> {
        let recipe = &figure.recipe;
        let w = self.width as f64;
        let h = self.height as f64;

        let (x_min, x_max, y_min, y_max) = bounds(recipe);
        let sx = |x: f64| MARGIN + (x - x_min) / (x_max - x_min).max(1e-12) * (w - 2.0 * MARGIN);
        let sy = |y: f64| h - MARGIN - (y - y_min) / (y_max - y_min).max(1e-12) * (h - 2.0 * MARGIN);

        let mut svg = String::new();
        svg.push_str(&format!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" \
             viewBox=\"0 0 {} {}\">\n",
            self.width, self.height, self.width, self.height
        ));
        svg.push_str(&format!(
            "  <rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" fill=\"#ffffff\"/>\n",
            self.width, self.height
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"24\" text-anchor=\"middle\" font-size=\"16\">{}</text>\n",
            w / 2.0,
            escape(&recipe.title_key)
        ));
        // Axis box.
        svg.push_str(&format!(
            "  <rect x=\"{:.1}\" y=\"{:.1}\" width=\"{:.1}\" height=\"{:.1}\" \
             fill=\"none\" stroke=\"#333333\"/>\n",
            MARGIN,
            MARGIN,
            w - 2.0 * MARGIN,
            h - 2.0 * MARGIN
        ));
        svg.push_str(&format!(
            "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\">{}</text>\n",
            w / 2.0,
            h - 12.0,
            escape(&recipe.x_label_key)
        ));
        svg.push_str(&format!(
            "  <text x=\"16\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"12\" \
             transform=\"rotate(-90 16 {:.1})\">{}</text>\n",
            h / 2.0,
            h / 2.0,
            escape(&recipe.y_label_key)
        ));

        for (i, series) in recipe.series.iter().enumerate() {
            let color = SERIES_COLORS[i % SERIES_COLORS.len()];
            let points: Vec<String> = series
                .xs
                .iter()
                .zip(series.ys.iter())
                .map(|(x, y)| format!("{:.2},{:.2}", sx(*x), sy(*y)))
                .collect();
            svg.push_str(&format!(
                "  <polyline fill=\"none\" stroke=\"{}\" stroke-width=\"1.5\" points=\"{}\"/>\n",
                color,
                points.join(" ")
            ));
            for p in &points {
                let (px, py) = p.split_once(',').unwrap_or(("0", "0"));
                svg.push_str(&format!(
                    "  <circle cx=\"{px}\" cy=\"{py}\" r=\"2.5\" fill=\"{color}\"/>\n"
                ));
            }
        }

        for (i, category) in recipe.categories.iter().enumerate() {
            let x = sx(i as f64);
            svg.push_str(&format!(
                "  <text x=\"{:.1}\" y=\"{:.1}\" text-anchor=\"middle\" font-size=\"10\">{}</text>\n",
                x,
                h - MARGIN + 16.0,
                escape(category)
            ));
        }

        svg.push_str("</svg>\n");
        Ok(svg.into_bytes())
    }
}

fn bounds(recipe: &crate::plot::PlotRecipe) -> (f64, f64, f64, f64) {
    let mut x_min = f64::INFINITY;
    let mut x_max = f64::NEG_INFINITY;
    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for series in &recipe.series {
        for &x in &series.xs {
            x_min = x_min.min(x);
            x_max = x_max.max(x);
        }
        for &y in &series.ys {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }
    if !x_min.is_finite() {
        (0.0, 1.0, 0.0, 1.0)
    } else {
        (x_min, x_max.max(x_min + 1e-9), y_min, y_max.max(y_min + 1e-9))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{PlotKind, PlotRecipe, PlotSeries};

    fn figure() -> FigureSection {
        FigureSection {
            title: "Distribution: x".into(),
            figure_name: "histogram-x".into(),
            caption: "Histogram".into(),
            recipe: PlotRecipe::new("histogram:x", PlotKind::HistogramWithDensity)
                .with_series(PlotSeries::values("x", vec![1.0, 2.0, 3.0]))
                .with_labels("Histogram", "Value", "Frequency"),
        }
    }

    #[test]
    fn output_is_svg_and_deterministic() {
        let backend = SvgBackend::default();
        let a = backend.render(&figure()).unwrap();
        let b = backend.render(&figure()).unwrap();
        assert_eq!(a, b);
        let text = String::from_utf8(a).unwrap();
        assert!(text.starts_with("<svg"));
        assert!(text.contains("Histogram"));
        assert!(text.contains("polyline"));
    }

    #[test]
    fn labels_are_escaped() {
        let mut f = figure();
        f.recipe.title_key = "a < b".into();
        let text = String::from_utf8(SvgBackend::default().render(&f).unwrap()).unwrap();
        assert!(text.contains("a &lt; b"));
    }

    #[test]
    fn null_backend_emits_nothing() {
        assert!(NullBackend.render(&figure()).unwrap().is_empty());
    }
}
