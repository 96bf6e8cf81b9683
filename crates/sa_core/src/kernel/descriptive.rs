//! Univariate descriptive reduction: one fixed-column statistic row
//! per bound feature column, plus a histogram recipe per column.

use crate::error::Result;
use crate::kernel::{
    mean, median, quantile, sample_stdev, Cell, Kernel, KernelInput, KernelOutput, KernelShape,
    Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

/// Statistic keys emitted per column, in table order.
pub const STAT_KEYS: &[&str] = &[
    "stat-count",
    "stat-mean",
    "stat-median",
    "stat-stdev",
    "stat-min",
    "stat-max",
    "stat-range",
    "stat-q1",
    "stat-q3",
    "stat-iqr",
];

pub struct DescriptiveKernel;

impl Kernel for DescriptiveKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::UnivariateDescriptive
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let columns = input.columns(Role::Feature);
        let mut table = TableArtifact::new(
            columns.iter().map(|c| Label::verbatim(&c.name)).collect(),
            STAT_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        let mut output = KernelOutput::default();

        for col in &columns {
            let xs = input.numeric_values(col)?;
            let m = mean(&xs)?;
            let sd = sample_stdev(&xs)?;
            let min = xs.iter().copied().fold(f64::INFINITY, f64::min);
            let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            let q1 = quantile(&xs, 0.25)?;
            let q3 = quantile(&xs, 0.75)?;
            table.push_row(vec![
                Cell::Count(xs.len() as i64),
                Cell::Statistic(m),
                Cell::Statistic(median(&xs)?),
                Cell::Statistic(sd),
                Cell::Statistic(min),
                Cell::Statistic(max),
                Cell::Statistic(max - min),
                Cell::Statistic(q1),
                Cell::Statistic(q3),
                Cell::Statistic(q3 - q1),
            ]);

            output.insert_recipe(
                PlotRecipe::new(format!("histogram:{}", col.name), PlotKind::HistogramWithDensity)
                    .with_series(PlotSeries::values(&col.name, xs))
                    .with_labels("figure-histogram", "axis-value", "axis-frequency"),
            );
        }

        output.insert_table("statistics", table);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::kernel::MissingPolicy;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::{validate, ParamSchema, Validated};
    use std::collections::BTreeMap;

    fn run_on(frame: &Frame) -> KernelOutput {
        let schema = InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]);
        let Validated::Complete(binding) =
            validate(frame, &schema, &BTreeMap::new(), 2).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let input = KernelInput {
            frame,
            binding: &binding,
            params: &params,
            missing: MissingPolicy::DropRow,
        };
        DescriptiveKernel.run(&input).unwrap()
    }

    #[test]
    fn one_to_five_matches_reference_values() {
        let frame =
            Frame::new(vec![Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])]).unwrap();
        let out = run_on(&frame);
        let table = out.table("statistics").unwrap();
        assert_eq!(table.cells.len(), 1);
        let row = &table.cells[0];
        assert_eq!(row[0], Cell::Count(5));
        assert_eq!(row[1], Cell::Statistic(3.0));
        assert_eq!(row[2], Cell::Statistic(3.0));
        let Cell::Statistic(sd) = row[3] else { panic!("stdev cell") };
        assert!((sd - 1.5811).abs() < 1e-4);
        assert_eq!(row[4], Cell::Statistic(1.0));
        assert_eq!(row[5], Cell::Statistic(5.0));
        assert_eq!(row[6], Cell::Statistic(4.0));
        assert_eq!(row[7], Cell::Statistic(2.0));
        assert_eq!(row[8], Cell::Statistic(4.0));
        assert_eq!(row[9], Cell::Statistic(2.0));
    }

    #[test]
    fn one_histogram_recipe_per_column() {
        let frame = Frame::new(vec![
            Column::numeric("a", vec![1.0, 2.0, 3.0]),
            Column::numeric("b", vec![4.0, 5.0, 6.0]),
        ])
        .unwrap();
        let out = run_on(&frame);
        assert_eq!(out.recipe_names(), vec!["histogram:a", "histogram:b"]);
        assert_eq!(
            out.recipe("histogram:a").unwrap().kind,
            PlotKind::HistogramWithDensity
        );
    }

    #[test]
    fn missing_values_are_dropped() {
        let frame = Frame::new(vec![Column {
            name: "x".into(),
            data: crate::frame::ColumnData::Numeric(vec![
                Some(1.0),
                None,
                Some(3.0),
                Some(5.0),
            ]),
        }])
        .unwrap();
        let out = run_on(&frame);
        let row = &out.table("statistics").unwrap().cells[0];
        assert_eq!(row[0], Cell::Count(3));
        assert_eq!(row[1], Cell::Statistic(3.0));
    }
}
