//! Numeric kernels: pure per-procedure routines.
//!
//! A kernel takes validated bound columns plus parameters and returns
//! a keyed record of tables and plot recipes. Kernels perform no I/O,
//! read no global state, and surface numeric trouble as typed faults,
//! never as non-finite sentinels.

pub mod anova;
pub mod chisq;
pub mod correlation;
pub mod descriptive;
pub mod forecast;
pub mod mcda;
pub mod normality;
pub mod pca;
pub mod regression;
pub mod ttest;

use std::collections::BTreeMap;

use statrs::distribution::{ChiSquared, ContinuousCDF, FisherSnedecor, Normal, StudentsT};

use crate::error::{Fault, Result};
use crate::frame::{Column, Frame};
use crate::plot::PlotRecipe;
use crate::schema::{Binding, ParamValues, Role};

/// The recurring algorithmic shape a kernel implements. The assembler
/// treats every shape generically; the tag exists so hosts can group
/// procedures without inspecting their layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelShape {
    UnivariateDescriptive,
    DistributionalTest,
    GroupComparison,
    Correlation,
    Regression,
    MatrixMultiCriteria,
    FactorExtraction,
    TimeSeries,
}

/// Missing-value policy, declared per descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingPolicy {
    /// Drop any row with a missing cell in a bound column.
    DropRow,
    /// Fault with `numeric-failure` when any bound cell is missing.
    FailIfPresent,
    /// Kernels handle missingness pair by pair.
    Pairwise,
}

/// Header or row label inside a table artifact. Keys are localized by
/// the result builder; verbatim labels (column names, group levels)
/// pass through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Key(String),
    Verbatim(String),
}

impl Label {
    pub fn key(k: impl Into<String>) -> Self {
        Label::Key(k.into())
    }

    pub fn verbatim(v: impl Into<String>) -> Self {
        Label::Verbatim(v.into())
    }
}

/// One table cell. The variant picks the numeric format policy applied
/// at the result-document boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Integer count, rendered verbatim.
    Count(i64),
    /// Statistic or coefficient, rendered with the coefficient policy.
    Statistic(f64),
    /// Proportion or p-value, rendered with the proportion policy.
    Proportion(f64),
    /// Verbatim text (names, levels).
    Text(String),
    /// Locale-bundle key, localized at build time (decision text).
    Key(String),
    /// Missing / not applicable.
    Empty,
}

/// A keyed rectangular artifact emitted by a kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct TableArtifact {
    pub row_labels: Vec<Label>,
    pub col_labels: Vec<Label>,
    pub cells: Vec<Vec<Cell>>,
}

impl TableArtifact {
    pub fn new(row_labels: Vec<Label>, col_labels: Vec<Label>) -> Self {
        TableArtifact { row_labels, col_labels, cells: Vec::new() }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.cells.push(row);
    }

    /// Statistic keys of the column headers, for explanation tables.
    pub fn header_keys(&self) -> Vec<&str> {
        self.col_labels
            .iter()
            .filter_map(|l| match l {
                Label::Key(k) => Some(k.as_str()),
                Label::Verbatim(_) => None,
            })
            .collect()
    }
}

/// Keyed record returned by one kernel run.
#[derive(Debug, Clone, Default)]
pub struct KernelOutput {
    tables: BTreeMap<String, TableArtifact>,
    recipes: BTreeMap<String, PlotRecipe>,
}

impl KernelOutput {
    pub fn insert_table(&mut self, slot: impl Into<String>, table: TableArtifact) {
        self.tables.insert(slot.into(), table);
    }

    pub fn insert_recipe(&mut self, recipe: PlotRecipe) {
        self.recipes.insert(recipe.name.clone(), recipe);
    }

    pub fn table(&self, slot: &str) -> Option<&TableArtifact> {
        self.tables.get(slot)
    }

    pub fn recipe(&self, name: &str) -> Option<&PlotRecipe> {
        self.recipes.get(name)
    }

    pub fn table_slots(&self) -> Vec<&str> {
        self.tables.keys().map(|k| k.as_str()).collect()
    }

    pub fn recipe_names(&self) -> Vec<&str> {
        self.recipes.keys().map(|k| k.as_str()).collect()
    }
}

/// Everything a kernel may read: the frame, the binding, resolved
/// parameters, and the descriptor's missing policy.
pub struct KernelInput<'a> {
    pub frame: &'a Frame,
    pub binding: &'a Binding,
    pub params: &'a ParamValues,
    pub missing: MissingPolicy,
}

impl<'a> KernelInput<'a> {
    /// Columns bound to `role`.
    pub fn columns(&self, role: Role) -> Vec<&'a Column> {
        self.binding.columns(self.frame, role)
    }

    /// Present values of one numeric column under the missing policy.
    pub fn numeric_values(&self, col: &Column) -> Result<Vec<f64>> {
        let cells = col
            .as_numeric()
            .ok_or_else(|| Fault::WrongKind(col.name.clone()))?;
        match self.missing {
            MissingPolicy::FailIfPresent => {
                if cells.iter().any(|c| c.is_none()) {
                    return Err(Fault::NumericFailure(format!(
                        "column '{}' contains missing values",
                        col.name
                    )));
                }
                Ok(cells.iter().flatten().copied().collect())
            }
            MissingPolicy::DropRow | MissingPolicy::Pairwise => {
                Ok(cells.iter().flatten().copied().collect())
            }
        }
    }

    /// Listwise-complete rows across the given numeric columns, in
    /// column order. Under `DropRow` a row with any missing cell is
    /// skipped; under `FailIfPresent` it faults.
    pub fn complete_rows(&self, cols: &[&Column]) -> Result<Vec<Vec<f64>>> {
        let views: Vec<&[Option<f64>]> = cols
            .iter()
            .map(|c| c.as_numeric().ok_or_else(|| Fault::WrongKind(c.name.clone())))
            .collect::<Result<_>>()?;
        let rows = views.first().map(|v| v.len()).unwrap_or(0);
        let mut out = Vec::with_capacity(rows);
        for r in 0..rows {
            let row: Option<Vec<f64>> = views.iter().map(|v| v[r]).collect();
            match row {
                Some(values) => out.push(values),
                None => {
                    if self.missing == MissingPolicy::FailIfPresent {
                        return Err(Fault::NumericFailure(format!("missing value in row {r}")));
                    }
                }
            }
        }
        Ok(out)
    }

    /// Group labels as strings; numeric-coded groups are stringified.
    pub fn group_labels(&self, col: &Column) -> Vec<Option<String>> {
        match col.as_categorical() {
            Some(cells) => cells.to_vec(),
            None => col
                .as_numeric()
                .map(|cells| {
                    cells
                        .iter()
                        .map(|c| c.map(|v| format!("{}", v as i64)))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// A pure numeric routine.
pub trait Kernel: Send + Sync {
    fn shape(&self) -> KernelShape;
    fn run(&self, input: &KernelInput) -> Result<KernelOutput>;
}

// ---------------------------------------------------------------------------
// Shared numeric helpers.
// ---------------------------------------------------------------------------

/// Rejects non-finite results before they reach a finite-typed field.
pub fn finite(value: f64, what: &str) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(Fault::NumericFailure(format!("{what} is not finite")))
    }
}

pub fn mean(xs: &[f64]) -> Result<f64> {
    if xs.is_empty() {
        return Err(Fault::NumericFailure("mean of empty sample".into()));
    }
    Ok(xs.iter().sum::<f64>() / xs.len() as f64)
}

/// Unbiased sample variance (n-1 denominator).
pub fn sample_variance(xs: &[f64]) -> Result<f64> {
    if xs.len() < 2 {
        return Err(Fault::NumericFailure("variance needs at least 2 values".into()));
    }
    let m = mean(xs)?;
    Ok(xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (xs.len() - 1) as f64)
}

pub fn sample_stdev(xs: &[f64]) -> Result<f64> {
    Ok(sample_variance(xs)?.sqrt())
}

/// Linear-interpolation quantile on a sorted copy (the R type-7 rule).
pub fn quantile(xs: &[f64], p: f64) -> Result<f64> {
    if xs.is_empty() {
        return Err(Fault::NumericFailure("quantile of empty sample".into()));
    }
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let h = (sorted.len() - 1) as f64 * p;
    let lo = h.floor() as usize;
    let hi = h.ceil() as usize;
    if lo == hi {
        return Ok(sorted[lo]);
    }
    Ok(sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo]))
}

pub fn median(xs: &[f64]) -> Result<f64> {
    quantile(xs, 0.5)
}

/// Two-sided p-value for a Student-t statistic.
pub fn t_two_sided_p(t: f64, df: f64) -> Result<f64> {
    if df <= 0.0 {
        return Err(Fault::NumericFailure("t test with non-positive df".into()));
    }
    if t.is_infinite() {
        return Ok(0.0);
    }
    let dist = StudentsT::new(0.0, 1.0, df)
        .map_err(|e| Fault::NumericFailure(e.to_string()))?;
    Ok((2.0 * (1.0 - dist.cdf(t.abs()))).clamp(0.0, 1.0))
}

/// Upper-tail p-value for a chi-squared statistic.
pub fn chi2_sf(stat: f64, df: f64) -> Result<f64> {
    let dist = ChiSquared::new(df).map_err(|e| Fault::NumericFailure(e.to_string()))?;
    Ok((1.0 - dist.cdf(stat)).clamp(0.0, 1.0))
}

/// Upper-tail p-value for an F statistic.
pub fn f_sf(stat: f64, df1: f64, df2: f64) -> Result<f64> {
    let dist =
        FisherSnedecor::new(df1, df2).map_err(|e| Fault::NumericFailure(e.to_string()))?;
    Ok((1.0 - dist.cdf(stat)).clamp(0.0, 1.0))
}

/// Standard normal CDF.
pub fn normal_cdf(z: f64) -> f64 {
    // Unit normal construction cannot fail.
    let dist = Normal::new(0.0, 1.0).unwrap_or_else(|_| unreachable!());
    dist.cdf(z)
}

/// Standard normal quantile.
pub fn normal_quantile(p: f64) -> Result<f64> {
    if !(0.0..=1.0).contains(&p) {
        return Err(Fault::NumericFailure(format!("quantile probability {p} out of range")));
    }
    let dist = Normal::new(0.0, 1.0).unwrap_or_else(|_| unreachable!());
    Ok(dist.inverse_cdf(p.clamp(1e-12, 1.0 - 1e-12)))
}

/// Localized accept/reject decision cell for a p-value at level alpha.
pub fn decision_cell(p: f64, alpha: f64) -> Cell {
    if p < alpha {
        Cell::Key("decision-reject".into())
    } else {
        Cell::Key("decision-accept".into())
    }
}
