//! Multi-criteria decision analysis: TOPSIS over a whole-frame matrix.
//!
//! Alternatives are rows, criteria are numeric columns; an optional
//! categorical column names the alternatives. Criteria are weighted
//! equally and treated as benefit criteria.

use crate::error::{Fault, Result};
use crate::kernel::{
    finite, Cell, Kernel, KernelInput, KernelOutput, KernelShape, Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

pub const SCORE_KEYS: &[&str] = &["stat-dist-ideal", "stat-dist-anti", "stat-score", "stat-rank"];

pub struct TopsisKernel;

impl Kernel for TopsisKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::MatrixMultiCriteria
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let criteria = input.columns(Role::Feature);
        if criteria.len() < 2 {
            return Err(Fault::NumericFailure("TOPSIS needs at least 2 criteria".into()));
        }
        let rows = input.complete_rows(&criteria)?;
        if rows.len() < 2 {
            return Err(Fault::NumericFailure("TOPSIS needs at least 2 alternatives".into()));
        }
        let n = rows.len();
        let m = criteria.len();

        let alt_labels: Vec<String> = match input.columns(Role::Group).first() {
            Some(col) => input
                .group_labels(col)
                .into_iter()
                .map(|l| l.unwrap_or_default())
                .collect(),
            None => (1..=n).map(|i| i.to_string()).collect(),
        };

        // Vector normalization per criterion.
        let mut norms = vec![0.0; m];
        for row in &rows {
            for (j, v) in row.iter().enumerate() {
                norms[j] += v * v;
            }
        }
        for (j, norm) in norms.iter_mut().enumerate() {
            *norm = norm.sqrt();
            if *norm == 0.0 {
                return Err(Fault::NumericFailure(format!(
                    "criterion '{}' is all zero",
                    criteria[j].name
                )));
            }
        }
        let weight = 1.0 / m as f64;
        let normalized: Vec<Vec<f64>> = rows
            .iter()
            .map(|row| row.iter().zip(&norms).map(|(v, s)| v / s).collect())
            .collect();
        let weighted: Vec<Vec<f64>> = normalized
            .iter()
            .map(|row| row.iter().map(|v| v * weight).collect())
            .collect();

        // Ideal and anti-ideal points per criterion (benefit direction).
        let mut ideal = vec![f64::NEG_INFINITY; m];
        let mut anti = vec![f64::INFINITY; m];
        for row in &weighted {
            for (j, v) in row.iter().enumerate() {
                ideal[j] = ideal[j].max(*v);
                anti[j] = anti[j].min(*v);
            }
        }

        let mut d_ideal = Vec::with_capacity(n);
        let mut d_anti = Vec::with_capacity(n);
        let mut scores = Vec::with_capacity(n);
        for row in &weighted {
            let dp: f64 = row
                .iter()
                .zip(&ideal)
                .map(|(v, i)| (v - i).powi(2))
                .sum::<f64>()
                .sqrt();
            let dm: f64 = row
                .iter()
                .zip(&anti)
                .map(|(v, a)| (v - a).powi(2))
                .sum::<f64>()
                .sqrt();
            if dp + dm == 0.0 {
                return Err(Fault::NumericFailure("identical alternatives".into()));
            }
            d_ideal.push(dp);
            d_anti.push(dm);
            scores.push(finite(dm / (dp + dm), "closeness score")?);
        }

        // Rank 1 is the best (highest) score.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal)
        });
        let mut rank = vec![0usize; n];
        for (pos, &i) in order.iter().enumerate() {
            rank[i] = pos + 1;
        }

        let criterion_labels: Vec<Label> =
            criteria.iter().map(|c| Label::verbatim(&c.name)).collect();
        let row_labels: Vec<Label> =
            alt_labels.iter().map(Label::verbatim).collect();

        let mut normalized_table =
            TableArtifact::new(row_labels.clone(), criterion_labels.clone());
        for row in &normalized {
            normalized_table.push_row(row.iter().map(|v| Cell::Statistic(*v)).collect());
        }
        let mut weighted_table = TableArtifact::new(row_labels.clone(), criterion_labels);
        for row in &weighted {
            weighted_table.push_row(row.iter().map(|v| Cell::Statistic(*v)).collect());
        }
        let mut score_table = TableArtifact::new(
            row_labels,
            SCORE_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        for i in 0..n {
            score_table.push_row(vec![
                Cell::Statistic(d_ideal[i]),
                Cell::Statistic(d_anti[i]),
                Cell::Statistic(scores[i]),
                Cell::Count(rank[i] as i64),
            ]);
        }

        let mut output = KernelOutput::default();
        output.insert_table("normalized", normalized_table);
        output.insert_table("weighted", weighted_table);
        output.insert_table("scores", score_table);
        output.insert_recipe(
            PlotRecipe::new("bar", PlotKind::Bar)
                .with_series(PlotSeries::values("score", scores))
                .with_categories(alt_labels)
                .with_labels("figure-bar", "axis-alternative", "axis-score"),
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::kernel::MissingPolicy;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::params::ParamSchema;
    use crate::schema::{validate, Validated};
    use std::collections::BTreeMap;

    fn schema() -> InputSchema {
        InputSchema::new(vec![
            RoleSlot::new(
                Role::Group,
                Cardinality::ZeroOrMore,
                ValueKindSet::CATEGORICAL,
                BindRule::FirstCategorical,
            ),
            RoleSlot::new(
                Role::Feature,
                Cardinality::OneOrMore,
                ValueKindSet::NUMERIC,
                BindRule::AllRemaining,
            ),
        ])
    }

    #[test]
    fn dominant_alternative_ranks_first() {
        let frame = Frame::new(vec![
            Column::categorical("alt", vec!["A", "B", "C"]),
            Column::numeric("c1", vec![9.0, 5.0, 1.0]),
            Column::numeric("c2", vec![8.0, 5.0, 2.0]),
        ])
        .unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &schema(), &BTreeMap::new(), 2).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let input = KernelInput {
            frame: &frame,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::FailIfPresent,
        };
        let out = TopsisKernel.run(&input).unwrap();
        let scores = out.table("scores").unwrap();
        assert_eq!(scores.cells[0][3], Cell::Count(1));
        assert_eq!(scores.cells[2][3], Cell::Count(3));
        let Cell::Statistic(best) = scores.cells[0][2] else { panic!("score") };
        assert!((best - 1.0).abs() < 1e-12);
        assert!(out.table("normalized").is_some());
        assert!(out.table("weighted").is_some());
        assert!(out.recipe("bar").is_some());
    }

    #[test]
    fn missing_cell_faults_under_fail_policy() {
        let frame = Frame::new(vec![
            Column {
                name: "c1".into(),
                data: crate::frame::ColumnData::Numeric(vec![Some(1.0), None, Some(3.0)]),
            },
            Column::numeric("c2", vec![1.0, 2.0, 3.0]),
        ])
        .unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &schema(), &BTreeMap::new(), 2).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let input = KernelInput {
            frame: &frame,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::FailIfPresent,
        };
        let err = TopsisKernel.run(&input).unwrap_err();
        assert!(matches!(err, Fault::NumericFailure(_)));
    }
}
