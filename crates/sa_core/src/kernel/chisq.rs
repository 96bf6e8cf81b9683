//! Chi-square tests: goodness-of-fit against expected counts and
//! independence over a two-way contingency table.

use std::collections::BTreeMap;

use crate::error::{Fault, Result};
use crate::kernel::{
    chi2_sf, decision_cell, finite, Cell, Kernel, KernelInput, KernelOutput, KernelShape, Label,
    TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

pub const GOF_KEYS: &[&str] = &["stat-chi2", "stat-df", "stat-p", "stat-decision"];

fn gof_statistic(observed: &[f64], expected: &[f64]) -> Result<f64> {
    let mut stat = 0.0;
    for (o, e) in observed.iter().zip(expected.iter()) {
        if *e <= 0.0 {
            return Err(Fault::NumericFailure("expected counts must be positive".into()));
        }
        stat += (o - e).powi(2) / e;
    }
    finite(stat, "chi-square statistic")
}

/// Goodness-of-fit: observed counts against expected counts (uniform
/// when no expected column is bound).
pub struct Chi2GofKernel;

impl Kernel for Chi2GofKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::DistributionalTest
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let observed_col = input.binding.column(input.frame, Role::Feature)?;
        let observed = input.numeric_values(observed_col)?;
        if observed.len() < 2 {
            return Err(Fault::NumericFailure("need at least 2 categories".into()));
        }
        if observed.iter().any(|&o| o < 0.0) {
            return Err(Fault::NumericFailure("observed counts must be non-negative".into()));
        }
        let alpha = input.params.real("alpha").unwrap_or(0.05);

        let expected = match input.columns(Role::Covariate).first() {
            Some(col) => {
                let e = input.numeric_values(col)?;
                if e.len() != observed.len() {
                    return Err(Fault::NumericFailure(
                        "observed and expected lengths differ".into(),
                    ));
                }
                e
            }
            None => {
                let total: f64 = observed.iter().sum();
                vec![total / observed.len() as f64; observed.len()]
            }
        };

        let stat = gof_statistic(&observed, &expected)?;
        let df = (observed.len() - 1) as f64;
        let p = chi2_sf(stat, df)?;

        let mut test = TableArtifact::new(
            vec![Label::verbatim(&observed_col.name)],
            GOF_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        test.push_row(vec![
            Cell::Statistic(stat),
            Cell::Statistic(df),
            Cell::Proportion(p),
            decision_cell(p, alpha),
        ]);

        let categories: Vec<String> = (1..=observed.len()).map(|i| i.to_string()).collect();
        let mut output = KernelOutput::default();
        output.insert_table("test", test);
        output.insert_recipe(
            PlotRecipe::new("bar", PlotKind::Bar)
                .with_series(PlotSeries::values("observed", observed))
                .with_series(PlotSeries::values("expected", expected))
                .with_categories(categories)
                .with_labels("figure-bar", "axis-category", "axis-count"),
        );
        Ok(output)
    }
}

/// Independence over the contingency table of two label columns.
pub struct Chi2IndependenceKernel;

impl Kernel for Chi2IndependenceKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::DistributionalTest
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let row_col = input.binding.column(input.frame, Role::Feature)?;
        let col_col = input.binding.column(input.frame, Role::Target)?;
        let alpha = input.params.real("alpha").unwrap_or(0.05);

        let row_labels = input.group_labels(row_col);
        let col_labels = input.group_labels(col_col);
        let mut counts: BTreeMap<(String, String), f64> = BTreeMap::new();
        let mut row_levels: Vec<String> = Vec::new();
        let mut col_levels: Vec<String> = Vec::new();
        for (r, c) in row_labels.iter().zip(col_labels.iter()) {
            let (Some(r), Some(c)) = (r, c) else { continue };
            if !row_levels.contains(r) {
                row_levels.push(r.clone());
            }
            if !col_levels.contains(c) {
                col_levels.push(c.clone());
            }
            *counts.entry((r.clone(), c.clone())).or_insert(0.0) += 1.0;
        }
        row_levels.sort();
        col_levels.sort();
        if row_levels.len() < 2 || col_levels.len() < 2 {
            return Err(Fault::NumericFailure(
                "independence test needs at least a 2x2 table".into(),
            ));
        }

        let total: f64 = counts.values().sum();
        let row_sums: Vec<f64> = row_levels
            .iter()
            .map(|r| col_levels.iter().map(|c| counts.get(&(r.clone(), c.clone())).copied().unwrap_or(0.0)).sum())
            .collect();
        let col_sums: Vec<f64> = col_levels
            .iter()
            .map(|c| row_levels.iter().map(|r| counts.get(&(r.clone(), c.clone())).copied().unwrap_or(0.0)).sum())
            .collect();

        let mut stat = 0.0;
        let mut contingency = TableArtifact::new(
            row_levels.iter().map(Label::verbatim).collect(),
            col_levels.iter().map(Label::verbatim).collect(),
        );
        let mut heat = Vec::with_capacity(row_levels.len());
        for (i, r) in row_levels.iter().enumerate() {
            let mut row_cells = Vec::with_capacity(col_levels.len());
            let mut heat_row = Vec::with_capacity(col_levels.len());
            for (j, c) in col_levels.iter().enumerate() {
                let o = counts.get(&(r.clone(), c.clone())).copied().unwrap_or(0.0);
                let e = row_sums[i] * col_sums[j] / total;
                if e <= 0.0 {
                    return Err(Fault::NumericFailure("empty margin in contingency table".into()));
                }
                stat += (o - e).powi(2) / e;
                row_cells.push(Cell::Count(o as i64));
                heat_row.push(o);
            }
            contingency.push_row(row_cells);
            heat.push(heat_row);
        }
        let df = ((row_levels.len() - 1) * (col_levels.len() - 1)) as f64;
        let p = chi2_sf(finite(stat, "chi-square statistic")?, df)?;

        let mut test = TableArtifact::new(
            vec![Label::verbatim(format!("{} x {}", row_col.name, col_col.name))],
            GOF_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        test.push_row(vec![
            Cell::Statistic(stat),
            Cell::Statistic(df),
            Cell::Proportion(p),
            decision_cell(p, alpha),
        ]);

        let mut recipe = PlotRecipe::new("heatmap", PlotKind::Heatmap)
            .with_categories(col_levels.clone())
            .with_labels("figure-heatmap", "axis-category", "axis-category");
        for (r, heat_row) in row_levels.iter().zip(heat) {
            recipe = recipe.with_series(PlotSeries::values(r, heat_row));
        }

        let mut output = KernelOutput::default();
        output.insert_table("test", test);
        output.insert_table("contingency", contingency);
        output.insert_recipe(recipe);
        Ok(output)
    }
}
