//! t-test family: one-sample, two-sample (Welch), and paired.

use crate::error::{Fault, Result};
use crate::kernel::{
    decision_cell, finite, mean, sample_stdev, sample_variance, t_two_sided_p, Cell, Kernel,
    KernelInput, KernelOutput, KernelShape, Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

/// Column keys of the one-row summary table shared by the family.
pub const TEST_KEYS: &[&str] =
    &["stat-n", "stat-mean", "stat-stdev", "stat-t", "stat-df", "stat-p", "stat-decision"];

fn summary_row(xs: &[f64], t: f64, df: f64, p: f64, alpha: f64) -> Result<Vec<Cell>> {
    Ok(vec![
        Cell::Count(xs.len() as i64),
        Cell::Statistic(mean(xs)?),
        Cell::Statistic(sample_stdev(xs)?),
        Cell::Statistic(finite(t, "t statistic")?),
        Cell::Statistic(df),
        Cell::Proportion(p),
        decision_cell(p, alpha),
    ])
}

/// One-sample t against a hypothesized mean `mu0`.
pub struct OneSampleTKernel;

impl Kernel for OneSampleTKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::GroupComparison
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let col = input.binding.column(input.frame, Role::Feature)?;
        let xs = input.numeric_values(col)?;
        let mu0 = input.params.real("mu0").unwrap_or(0.0);
        let alpha = input.params.real("alpha").unwrap_or(0.05);

        let n = xs.len();
        let sd = sample_stdev(&xs)?;
        if sd == 0.0 {
            return Err(Fault::NumericFailure("zero variance sample".into()));
        }
        let m = mean(&xs)?;
        let se = sd / (n as f64).sqrt();
        let t = (m - mu0) / se;
        let df = (n - 1) as f64;
        let p = t_two_sided_p(t, df)?;

        let mut table = TableArtifact::new(
            vec![Label::verbatim(&col.name)],
            TEST_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        table.push_row(summary_row(&xs, t, df, p, alpha)?);

        let mut output = KernelOutput::default();
        output.insert_table("test", table);
        output.insert_recipe(
            PlotRecipe::new("errorbar", PlotKind::ErrorBar)
                .with_series(PlotSeries::values(&col.name, vec![m]))
                .with_series(PlotSeries::values("stderr", vec![se]))
                .with_categories(vec![col.name.clone()])
                .with_labels("figure-errorbar", "axis-sample", "axis-mean"),
        );
        Ok(output)
    }
}

/// Welch two-sample t: numeric target split by a two-level group column.
pub struct TwoSampleTKernel;

impl Kernel for TwoSampleTKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::GroupComparison
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let value_col = input.binding.column(input.frame, Role::Target)?;
        let group_col = input.binding.column(input.frame, Role::Group)?;
        let groups = split_groups(input, group_col, value_col)?;
        if groups.len() != 2 {
            return Err(Fault::NumericFailure(format!(
                "two-sample t needs exactly 2 groups, found {}",
                groups.len()
            )));
        }
        let alpha = input.params.real("alpha").unwrap_or(0.05);
        let (la, xa) = &groups[0];
        let (lb, xb) = &groups[1];

        let (va, vb) = (sample_variance(xa)?, sample_variance(xb)?);
        let (na, nb) = (xa.len() as f64, xb.len() as f64);
        let sea = va / na;
        let seb = vb / nb;
        let denom = (sea + seb).sqrt();
        if denom == 0.0 {
            return Err(Fault::NumericFailure("zero variance in both groups".into()));
        }
        let t = (mean(xa)? - mean(xb)?) / denom;
        // Welch–Satterthwaite degrees of freedom.
        let df = (sea + seb).powi(2)
            / (sea.powi(2) / (na - 1.0) + seb.powi(2) / (nb - 1.0));
        let p = t_two_sided_p(t, df)?;

        let mut test = TableArtifact::new(
            vec![Label::verbatim(format!("{la} / {lb}"))],
            TEST_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        let pooled: Vec<f64> = xa.iter().chain(xb.iter()).copied().collect();
        test.push_row(summary_row(&pooled, t, df, p, alpha)?);

        let mut output = KernelOutput::default();
        output.insert_table("test", test);
        output.insert_table("groups", group_table(&groups)?);
        output.insert_recipe(group_bar_recipe(&groups)?);
        Ok(output)
    }
}

/// Paired t on the difference of two bound numeric columns.
pub struct PairedTKernel;

impl Kernel for PairedTKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::GroupComparison
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let first = input.binding.column(input.frame, Role::Feature)?;
        let second = input.binding.column(input.frame, Role::Target)?;
        let rows = input.complete_rows(&[first, second])?;
        let diffs: Vec<f64> = rows.iter().map(|r| r[0] - r[1]).collect();
        let alpha = input.params.real("alpha").unwrap_or(0.05);

        let n = diffs.len();
        let sd = sample_stdev(&diffs)?;
        if sd == 0.0 {
            return Err(Fault::NumericFailure("zero variance in differences".into()));
        }
        let t = mean(&diffs)? / (sd / (n as f64).sqrt());
        let df = (n - 1) as f64;
        let p = t_two_sided_p(t, df)?;

        let mut table = TableArtifact::new(
            vec![Label::verbatim(format!("{} - {}", first.name, second.name))],
            TEST_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        table.push_row(summary_row(&diffs, t, df, p, alpha)?);

        let firsts: Vec<f64> = rows.iter().map(|r| r[0]).collect();
        let seconds: Vec<f64> = rows.iter().map(|r| r[1]).collect();
        let mut output = KernelOutput::default();
        output.insert_table("test", table);
        output.insert_recipe(
            PlotRecipe::new("grouped-bar", PlotKind::GroupedBar)
                .with_series(PlotSeries::values(&first.name, vec![mean(&firsts)?]))
                .with_series(PlotSeries::values(&second.name, vec![mean(&seconds)?]))
                .with_categories(vec![first.name.clone(), second.name.clone()])
                .with_labels("figure-grouped-bar", "axis-sample", "axis-mean"),
        );
        Ok(output)
    }
}

/// Splits the value column by group label, dropping rows where either
/// cell is missing. Groups come back in sorted label order.
pub fn split_groups(
    input: &KernelInput,
    group_col: &crate::frame::Column,
    value_col: &crate::frame::Column,
) -> Result<Vec<(String, Vec<f64>)>> {
    let labels = input.group_labels(group_col);
    let values = value_col
        .as_numeric()
        .ok_or_else(|| Fault::WrongKind(value_col.name.clone()))?;
    let mut groups: std::collections::BTreeMap<String, Vec<f64>> = Default::default();
    for (label, value) in labels.iter().zip(values.iter()) {
        if let (Some(l), Some(v)) = (label, value) {
            groups.entry(l.clone()).or_default().push(*v);
        }
    }
    Ok(groups.into_iter().collect())
}

/// Per-group descriptive table: n, mean, stdev per row.
pub fn group_table(groups: &[(String, Vec<f64>)]) -> Result<TableArtifact> {
    let mut table = TableArtifact::new(
        groups.iter().map(|(l, _)| Label::verbatim(l)).collect(),
        vec![Label::key("stat-n"), Label::key("stat-mean"), Label::key("stat-stdev")],
    );
    for (_, xs) in groups {
        table.push_row(vec![
            Cell::Count(xs.len() as i64),
            Cell::Statistic(mean(xs)?),
            Cell::Statistic(sample_stdev(xs)?),
        ]);
    }
    Ok(table)
}

fn group_bar_recipe(groups: &[(String, Vec<f64>)]) -> Result<PlotRecipe> {
    let mut means = Vec::with_capacity(groups.len());
    for (_, xs) in groups {
        means.push(mean(xs)?);
    }
    Ok(PlotRecipe::new("grouped-bar", PlotKind::GroupedBar)
        .with_series(PlotSeries::values("mean", means))
        .with_categories(groups.iter().map(|(l, _)| l.clone()).collect())
        .with_labels("figure-grouped-bar", "axis-group", "axis-mean"))
}
