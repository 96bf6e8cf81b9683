//! Distributional tests: Jarque–Bera normality check per column, with
//! histogram-with-density, QQ, and PP recipes.

use crate::error::{Fault, Result};
use crate::kernel::{
    chi2_sf, decision_cell, finite, mean, normal_cdf, normal_quantile, sample_stdev, Cell,
    Kernel, KernelInput, KernelOutput, KernelShape, Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

pub const NORMALITY_KEYS: &[&str] =
    &["stat-n", "stat-skewness", "stat-kurtosis", "stat-jb", "stat-p", "stat-decision"];

/// Sample skewness (biased, moment-based).
pub fn skewness(xs: &[f64]) -> Result<f64> {
    let n = xs.len() as f64;
    let m = mean(xs)?;
    let m2 = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
    let m3 = xs.iter().map(|x| (x - m).powi(3)).sum::<f64>() / n;
    if m2 == 0.0 {
        return Err(Fault::NumericFailure("zero variance sample".into()));
    }
    finite(m3 / m2.powf(1.5), "skewness")
}

/// Excess kurtosis (biased, moment-based).
pub fn excess_kurtosis(xs: &[f64]) -> Result<f64> {
    let n = xs.len() as f64;
    let m = mean(xs)?;
    let m2 = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n;
    let m4 = xs.iter().map(|x| (x - m).powi(4)).sum::<f64>() / n;
    if m2 == 0.0 {
        return Err(Fault::NumericFailure("zero variance sample".into()));
    }
    finite(m4 / (m2 * m2) - 3.0, "kurtosis")
}

pub struct NormalityKernel;

impl Kernel for NormalityKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::DistributionalTest
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let columns = input.columns(Role::Feature);
        let alpha = input.params.real("alpha").unwrap_or(0.05);

        let mut table = TableArtifact::new(
            columns.iter().map(|c| Label::verbatim(&c.name)).collect(),
            NORMALITY_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        let mut output = KernelOutput::default();

        for col in &columns {
            let xs = input.numeric_values(col)?;
            let n = xs.len();
            if n < 8 {
                return Err(Fault::NumericFailure(format!(
                    "normality test needs at least 8 values, column '{}' has {n}",
                    col.name
                )));
            }
            let s = skewness(&xs)?;
            let k = excess_kurtosis(&xs)?;
            let jb = n as f64 / 6.0 * (s * s + k * k / 4.0);
            let p = chi2_sf(finite(jb, "JB statistic")?, 2.0)?;
            table.push_row(vec![
                Cell::Count(n as i64),
                Cell::Statistic(s),
                Cell::Statistic(k),
                Cell::Statistic(jb),
                Cell::Proportion(p),
                decision_cell(p, alpha),
            ]);

            let m = mean(&xs)?;
            let sd = sample_stdev(&xs)?;
            let mut sorted = xs.clone();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mut theo_q = Vec::with_capacity(n);
            let mut emp_p = Vec::with_capacity(n);
            let mut theo_p = Vec::with_capacity(n);
            for (i, value) in sorted.iter().enumerate() {
                let prob = (i as f64 + 0.5) / n as f64;
                theo_q.push(m + sd * normal_quantile(prob)?);
                emp_p.push(prob);
                theo_p.push(normal_cdf((value - m) / sd));
            }

            output.insert_recipe(
                PlotRecipe::new(
                    format!("histogram:{}", col.name),
                    PlotKind::HistogramWithDensity,
                )
                .with_series(PlotSeries::values(&col.name, xs))
                .with_labels("figure-histogram", "axis-value", "axis-frequency"),
            );
            output.insert_recipe(
                PlotRecipe::new(format!("qq:{}", col.name), PlotKind::Qq)
                    .with_series(PlotSeries::points(&col.name, theo_q, sorted))
                    .with_labels("figure-qq", "axis-theoretical", "axis-observed"),
            );
            output.insert_recipe(
                PlotRecipe::new(format!("pp:{}", col.name), PlotKind::Pp)
                    .with_series(PlotSeries::points(&col.name, theo_p, emp_p))
                    .with_labels("figure-pp", "axis-theoretical", "axis-empirical"),
            );
        }

        output.insert_table("test", table);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::kernel::MissingPolicy;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::params::{alpha_spec, ParamSchema};
    use crate::schema::{validate, Validated};
    use std::collections::BTreeMap;

    fn run(frame: &Frame) -> Result<KernelOutput> {
        let schema = InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]);
        let Validated::Complete(binding) = validate(frame, &schema, &BTreeMap::new(), 8)?
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::new(vec![alpha_spec()]).resolve(&BTreeMap::new())?;
        let input = KernelInput {
            frame,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::DropRow,
        };
        NormalityKernel.run(&input)
    }

    #[test]
    fn symmetric_sample_has_zero_skewness() {
        let frame = Frame::new(vec![Column::numeric(
            "x",
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        )])
        .unwrap();
        let out = run(&frame).unwrap();
        let row = &out.table("test").unwrap().cells[0];
        let Cell::Statistic(s) = row[1] else { panic!("skewness cell") };
        assert!(s.abs() < 1e-12);
        // Symmetric uniform sample: JB small, accept normality.
        assert_eq!(row[5], Cell::Key("decision-accept".into()));
    }

    #[test]
    fn emits_three_recipes_per_column() {
        let frame = Frame::new(vec![Column::numeric(
            "x",
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        )])
        .unwrap();
        let out = run(&frame).unwrap();
        assert_eq!(out.recipe_names(), vec!["histogram:x", "pp:x", "qq:x"]);
    }

    #[test]
    fn tiny_sample_is_numeric_failure() {
        let frame = Frame::new(vec![Column::numeric(
            "x",
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0],
        )])
        .unwrap();
        // Bypass the descriptor row floor to hit the kernel's own check.
        let schema = InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]);
        let Validated::Complete(binding) =
            validate(&frame, &schema, &BTreeMap::new(), 1).unwrap()
        else {
            panic!("expected binding");
        };
        let small = Frame::new(vec![Column::numeric("x", vec![1.0, 2.0, 3.0])]).unwrap();
        let params =
            ParamSchema::new(vec![alpha_spec()]).resolve(&BTreeMap::new()).unwrap();
        let input = KernelInput {
            frame: &small,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::DropRow,
        };
        let err = NormalityKernel.run(&input).unwrap_err();
        assert!(matches!(err, Fault::NumericFailure(_)));
    }
}
