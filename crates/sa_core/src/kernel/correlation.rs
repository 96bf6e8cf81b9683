//! Pairwise association: Pearson and Spearman coefficient matrices
//! with matching p-value matrices.

use crate::error::{Fault, Result};
use crate::frame::Column;
use crate::kernel::{
    finite, t_two_sided_p, Cell, Kernel, KernelInput, KernelOutput, KernelShape, Label,
    TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

/// Pearson coefficient over rows where both cells are present.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Result<f64> {
    if xs.len() != ys.len() || xs.len() < 2 {
        return Err(Fault::NumericFailure("pearson needs paired samples of length >= 2".into()));
    }
    let n = xs.len() as f64;
    let mx = xs.iter().sum::<f64>() / n;
    let my = ys.iter().sum::<f64>() / n;
    let mut sxy = 0.0;
    let mut sxx = 0.0;
    let mut syy = 0.0;
    for (x, y) in xs.iter().zip(ys.iter()) {
        sxy += (x - mx) * (y - my);
        sxx += (x - mx).powi(2);
        syy += (y - my).powi(2);
    }
    if sxx == 0.0 || syy == 0.0 {
        return Err(Fault::NumericFailure("constant column in correlation".into()));
    }
    finite(sxy / (sxx * syy).sqrt(), "correlation coefficient")
}

/// Two-sided p for a correlation coefficient on `n` pairs. Degenerate
/// |r| = 1 reports exactly zero.
pub fn correlation_p(r: f64, n: usize) -> Result<f64> {
    if n < 3 {
        return Err(Fault::NumericFailure("correlation p needs at least 3 pairs".into()));
    }
    if (r.abs() - 1.0).abs() < 1e-12 {
        return Ok(0.0);
    }
    let df = (n - 2) as f64;
    let t = r * (df / (1.0 - r * r)).sqrt();
    t_two_sided_p(t, df)
}

/// Average ranks with ties sharing their mean rank.
pub fn ranks(xs: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..xs.len()).collect();
    order.sort_by(|&a, &b| xs[a].partial_cmp(&xs[b]).unwrap_or(std::cmp::Ordering::Equal));
    let mut out = vec![0.0; xs.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && xs[order[j + 1]] == xs[order[i]] {
            j += 1;
        }
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &k in &order[i..=j] {
            out[k] = avg;
        }
        i = j + 1;
    }
    out
}

/// Pairwise-complete values for two columns.
fn pairwise(a: &Column, b: &Column) -> Result<(Vec<f64>, Vec<f64>)> {
    let av = a.as_numeric().ok_or_else(|| Fault::WrongKind(a.name.clone()))?;
    let bv = b.as_numeric().ok_or_else(|| Fault::WrongKind(b.name.clone()))?;
    let mut xs = Vec::new();
    let mut ys = Vec::new();
    for (x, y) in av.iter().zip(bv.iter()) {
        if let (Some(x), Some(y)) = (x, y) {
            xs.push(*x);
            ys.push(*y);
        }
    }
    Ok((xs, ys))
}

/// Which coefficient a `CorrelationKernel` computes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrelationMethod {
    Pearson,
    Spearman,
}

pub struct CorrelationKernel {
    pub method: CorrelationMethod,
}

impl Kernel for CorrelationKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::Correlation
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let columns = input.columns(Role::Feature);
        if columns.len() < 2 {
            return Err(Fault::NumericFailure("correlation needs at least 2 columns".into()));
        }
        let labels: Vec<Label> = columns.iter().map(|c| Label::verbatim(&c.name)).collect();
        let mut coeffs = TableArtifact::new(labels.clone(), labels.clone());
        let mut pvalues = TableArtifact::new(labels.clone(), labels);
        let mut heat_rows: Vec<Vec<f64>> = Vec::with_capacity(columns.len());

        for a in &columns {
            let mut coeff_row = Vec::with_capacity(columns.len());
            let mut p_row = Vec::with_capacity(columns.len());
            let mut heat_row = Vec::with_capacity(columns.len());
            for b in &columns {
                if std::ptr::eq(*a, *b) {
                    coeff_row.push(Cell::Statistic(1.0));
                    p_row.push(Cell::Empty);
                    heat_row.push(1.0);
                    continue;
                }
                let (xs, ys) = pairwise(a, b)?;
                let r = match self.method {
                    CorrelationMethod::Pearson => pearson(&xs, &ys)?,
                    CorrelationMethod::Spearman => pearson(&ranks(&xs), &ranks(&ys))?,
                };
                let p = correlation_p(r, xs.len())?;
                coeff_row.push(Cell::Statistic(r));
                p_row.push(Cell::Proportion(p));
                heat_row.push(r);
            }
            coeffs.push_row(coeff_row);
            pvalues.push_row(p_row);
            heat_rows.push(heat_row);
        }

        let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
        let mut heatmap = PlotRecipe::new("heatmap", PlotKind::Heatmap)
            .with_categories(names.clone())
            .with_labels("figure-heatmap", "axis-variable", "axis-variable");
        for (name, row) in names.iter().zip(heat_rows) {
            heatmap = heatmap.with_series(PlotSeries::values(name, row));
        }

        let mut output = KernelOutput::default();
        output.insert_table("coefficients", coeffs);
        output.insert_table("pvalues", pvalues);
        output.insert_recipe(heatmap);

        if self.method == CorrelationMethod::Pearson {
            let mut scatter = PlotRecipe::new("scatter-matrix", PlotKind::ScatterMatrix)
                .with_categories(names)
                .with_labels("figure-scatter-matrix", "axis-variable", "axis-variable");
            for col in &columns {
                let xs = input.numeric_values(col)?;
                scatter = scatter.with_series(PlotSeries::values(&col.name, xs));
            }
            output.insert_recipe(scatter);
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::kernel::MissingPolicy;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::params::ParamSchema;
    use crate::schema::{validate, Validated};
    use std::collections::BTreeMap;

    fn run(frame: &Frame, method: CorrelationMethod) -> KernelOutput {
        let schema = InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]);
        let Validated::Complete(binding) =
            validate(frame, &schema, &BTreeMap::new(), 3).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let input = KernelInput {
            frame,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::Pairwise,
        };
        CorrelationKernel { method }.run(&input).unwrap()
    }

    #[test]
    fn perfect_correlation_reports_r_one_p_zero() {
        let frame = Frame::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::numeric("y", vec![2.0, 4.0, 6.0, 8.0, 10.0]),
        ])
        .unwrap();
        let out = run(&frame, CorrelationMethod::Pearson);
        let coeffs = out.table("coefficients").unwrap();
        assert_eq!(coeffs.cells[0][1], Cell::Statistic(1.0));
        let pvalues = out.table("pvalues").unwrap();
        assert_eq!(pvalues.cells[0][1], Cell::Proportion(0.0));
        assert!(out.recipe("heatmap").is_some());
        assert!(out.recipe("scatter-matrix").is_some());
    }

    #[test]
    fn spearman_is_rank_invariant() {
        // Monotone but nonlinear: Spearman 1, Pearson < 1.
        let frame = Frame::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::numeric("y", vec![1.0, 8.0, 27.0, 64.0, 125.0]),
        ])
        .unwrap();
        let out = run(&frame, CorrelationMethod::Spearman);
        let coeffs = out.table("coefficients").unwrap();
        assert_eq!(coeffs.cells[0][1], Cell::Statistic(1.0));
    }

    #[test]
    fn ranks_average_ties() {
        assert_eq!(ranks(&[10.0, 20.0, 20.0, 30.0]), vec![1.0, 2.5, 2.5, 4.0]);
    }

    #[test]
    fn pairwise_policy_skips_incomplete_pairs() {
        let frame = Frame::new(vec![
            Column {
                name: "x".into(),
                data: crate::frame::ColumnData::Numeric(vec![
                    Some(1.0),
                    Some(2.0),
                    None,
                    Some(4.0),
                ]),
            },
            Column::numeric("y", vec![2.0, 4.0, 6.0, 8.0]),
        ])
        .unwrap();
        let out = run(&frame, CorrelationMethod::Pearson);
        let coeffs = out.table("coefficients").unwrap();
        assert_eq!(coeffs.cells[0][1], Cell::Statistic(1.0));
    }

    #[test]
    fn constant_column_is_numeric_failure() {
        let frame = Frame::new(vec![
            Column::numeric("x", vec![1.0, 1.0, 1.0]),
            Column::numeric("y", vec![2.0, 4.0, 6.0]),
        ])
        .unwrap();
        let schema = InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]);
        let Validated::Complete(binding) =
            validate(&frame, &schema, &BTreeMap::new(), 3).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let input = KernelInput {
            frame: &frame,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::Pairwise,
        };
        let err = CorrelationKernel { method: CorrelationMethod::Pearson }
            .run(&input)
            .unwrap_err();
        assert!(matches!(err, Fault::NumericFailure(_)));
    }
}
