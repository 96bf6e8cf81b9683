//! Principal component extraction from the correlation matrix.

use nalgebra::DMatrix;

use crate::error::{Fault, Result};
use crate::kernel::{
    finite, Cell, Kernel, KernelInput, KernelOutput, KernelShape, Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

pub const EIGEN_KEYS: &[&str] = &["stat-eigenvalue", "stat-variance-pct", "stat-cumulative-pct"];

pub struct PcaKernel;

impl Kernel for PcaKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::FactorExtraction
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let columns = input.columns(Role::Feature);
        if columns.len() < 2 {
            return Err(Fault::NumericFailure("PCA needs at least 2 columns".into()));
        }
        let rows = input.complete_rows(&columns)?;
        let n = rows.len();
        let m = columns.len();
        if n <= m {
            return Err(Fault::NumericFailure(format!(
                "PCA needs more rows ({n}) than columns ({m})"
            )));
        }

        // Standardize, then take the correlation matrix.
        let mut means = vec![0.0; m];
        for row in &rows {
            for (j, v) in row.iter().enumerate() {
                means[j] += v;
            }
        }
        for mean in means.iter_mut() {
            *mean /= n as f64;
        }
        let mut sds = vec![0.0; m];
        for row in &rows {
            for (j, v) in row.iter().enumerate() {
                sds[j] += (v - means[j]).powi(2);
            }
        }
        for (j, sd) in sds.iter_mut().enumerate() {
            *sd = (*sd / (n as f64 - 1.0)).sqrt();
            if *sd == 0.0 {
                return Err(Fault::NumericFailure(format!(
                    "column '{}' is constant",
                    columns[j].name
                )));
            }
        }
        let mut z = DMatrix::zeros(n, m);
        for (i, row) in rows.iter().enumerate() {
            for (j, v) in row.iter().enumerate() {
                z[(i, j)] = (v - means[j]) / sds[j];
            }
        }
        let corr = z.transpose() * &z / (n as f64 - 1.0);

        let eigen = nalgebra::SymmetricEigen::new(corr);
        // Sort components by descending eigenvalue.
        let mut order: Vec<usize> = (0..m).collect();
        order.sort_by(|&a, &b| {
            eigen.eigenvalues[b]
                .partial_cmp(&eigen.eigenvalues[a])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total: f64 = eigen.eigenvalues.iter().sum();
        if total <= 0.0 {
            return Err(Fault::NumericFailure("degenerate correlation matrix".into()));
        }

        let component_labels: Vec<Label> =
            (1..=m).map(|i| Label::verbatim(format!("PC{i}"))).collect();

        let mut eigen_table = TableArtifact::new(
            component_labels.clone(),
            EIGEN_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        let mut cumulative = 0.0;
        let mut scree = Vec::with_capacity(m);
        for &idx in &order {
            let value = finite(eigen.eigenvalues[idx], "eigenvalue")?;
            let pct = value / total;
            cumulative += pct;
            eigen_table.push_row(vec![
                Cell::Statistic(value),
                Cell::Proportion(pct),
                Cell::Proportion(cumulative.min(1.0)),
            ]);
            scree.push(value);
        }

        // Loadings: eigenvector scaled by sqrt(eigenvalue).
        let mut loadings = TableArtifact::new(
            columns.iter().map(|c| Label::verbatim(&c.name)).collect(),
            component_labels,
        );
        for j in 0..m {
            let mut row = Vec::with_capacity(m);
            for &idx in &order {
                let scale = eigen.eigenvalues[idx].max(0.0).sqrt();
                row.push(Cell::Statistic(eigen.eigenvectors[(j, idx)] * scale));
            }
            loadings.push_row(row);
        }

        let mut output = KernelOutput::default();
        output.insert_table("eigenvalues", eigen_table);
        output.insert_table("loadings", loadings);
        output.insert_recipe(
            PlotRecipe::new("scree", PlotKind::Scree)
                .with_series(PlotSeries::values("eigenvalue", scree))
                .with_categories((1..=m).map(|i| format!("PC{i}")).collect())
                .with_labels("figure-scree", "axis-component", "axis-eigenvalue"),
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

    fn run(frame: &Frame) -> Result<KernelOutput> {
        let schema = InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]);
        let Validated::Complete(binding) = validate(frame, &schema, &BTreeMap::new(), 3)?
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new())?;
        let input = KernelInput {
            frame,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::FailIfPresent,
        };
        PcaKernel.run(&input)
    }

    #[test]
    fn correlated_pair_loads_on_one_component() {
        let frame = Frame::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::numeric("y", vec![2.1, 3.9, 6.2, 7.8, 10.1]),
        ])
        .unwrap();
        let out = run(&frame).unwrap();
        let eigen = out.table("eigenvalues").unwrap();
        let Cell::Proportion(first_pct) = eigen.cells[0][1] else { panic!("variance pct") };
        assert!(first_pct > 0.99);
        let Cell::Proportion(cum) = eigen.cells[1][2] else { panic!("cumulative") };
        assert!((cum - 1.0).abs() < 1e-9);
        assert_eq!(out.table("loadings").unwrap().cells.len(), 2);
        assert!(out.recipe("scree").is_some());
    }

    #[test]
    fn eigenvalues_sum_to_column_count() {
        let frame = Frame::new(vec![
            Column::numeric("a", vec![1.0, 5.0, 2.0, 8.0, 3.0]),
            Column::numeric("b", vec![9.0, 2.0, 7.0, 1.0, 6.0]),
            Column::numeric("c", vec![4.0, 4.5, 1.0, 7.0, 2.0]),
        ])
        .unwrap();
        let out = run(&frame).unwrap();
        let eigen = out.table("eigenvalues").unwrap();
        let sum: f64 = eigen
            .cells
            .iter()
            .map(|row| match row[0] {
                Cell::Statistic(v) => v,
                _ => 0.0,
            })
            .sum();
        assert!((sum - 3.0).abs() < 1e-9);
    }

    #[test]
    fn constant_column_faults() {
        let frame = Frame::new(vec![
            Column::numeric("a", vec![1.0, 1.0, 1.0, 1.0]),
            Column::numeric("b", vec![1.0, 2.0, 3.0, 4.0]),
        ])
        .unwrap();
        assert!(matches!(run(&frame), Err(Fault::NumericFailure(_))));
    }
}
