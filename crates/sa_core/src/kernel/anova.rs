//! One-way analysis of variance across a group column.

use crate::error::{Fault, Result};
use crate::kernel::ttest::{group_table, split_groups};
use crate::kernel::{
    decision_cell, f_sf, finite, mean, Cell, Kernel, KernelInput, KernelOutput, KernelShape,
    Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

pub const ANOVA_KEYS: &[&str] =
    &["stat-f", "stat-df-between", "stat-df-within", "stat-p", "stat-decision"];

pub struct OneWayAnovaKernel;

impl Kernel for OneWayAnovaKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::GroupComparison
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let value_col = input.binding.column(input.frame, Role::Target)?;
        let group_col = input.binding.column(input.frame, Role::Group)?;
        let alpha = input.params.real("alpha").unwrap_or(0.05);

        let groups = split_groups(input, group_col, value_col)?;
        if groups.len() < 2 {
            return Err(Fault::NumericFailure("anova needs at least 2 groups".into()));
        }
        let all: Vec<f64> = groups.iter().flat_map(|(_, xs)| xs.iter().copied()).collect();
        let n = all.len() as f64;
        let k = groups.len() as f64;
        if (n - k) < 1.0 {
            return Err(Fault::NumericFailure("not enough observations per group".into()));
        }
        let grand = mean(&all)?;

        let mut ss_between = 0.0;
        let mut ss_within = 0.0;
        for (_, xs) in &groups {
            let gm = mean(xs)?;
            ss_between += xs.len() as f64 * (gm - grand).powi(2);
            ss_within += xs.iter().map(|x| (x - gm).powi(2)).sum::<f64>();
        }
        let df_between = k - 1.0;
        let df_within = n - k;
        if ss_within == 0.0 {
            return Err(Fault::NumericFailure("zero within-group variance".into()));
        }
        let f = (ss_between / df_between) / (ss_within / df_within);
        let p = f_sf(finite(f, "F statistic")?, df_between, df_within)?;

        let mut test = TableArtifact::new(
            vec![Label::verbatim(&value_col.name)],
            ANOVA_KEYS.iter().map(|key| Label::key(*key)).collect(),
        );
        test.push_row(vec![
            Cell::Statistic(f),
            Cell::Statistic(df_between),
            Cell::Statistic(df_within),
            Cell::Proportion(p),
            decision_cell(p, alpha),
        ]);

        let mut boxplot = PlotRecipe::new("box", PlotKind::Box)
            .with_categories(groups.iter().map(|(l, _)| l.clone()).collect())
            .with_labels("figure-box", "axis-group", "axis-value");
        for (label, xs) in &groups {
            boxplot = boxplot.with_series(PlotSeries::values(label, xs.clone()));
        }

        let mut output = KernelOutput::default();
        output.insert_table("test", test);
        output.insert_table("groups", group_table(&groups)?);
        output.insert_recipe(boxplot);
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

    fn schema() -> InputSchema {
        InputSchema::new(vec![
            RoleSlot::new(
                Role::Group,
                Cardinality::ExactlyOne,
                ValueKindSet::GROUPABLE,
                BindRule::FirstCategorical,
            ),
            RoleSlot::new(
                Role::Target,
                Cardinality::ExactlyOne,
                ValueKindSet::NUMERIC,
                BindRule::LastColumn,
            ),
        ])
    }

    fn run(frame: &Frame) -> Result<KernelOutput> {
        let Validated::Complete(binding) = validate(frame, &schema(), &BTreeMap::new(), 4)?
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
        OneWayAnovaKernel.run(&input)
    }

    #[test]
    fn separated_groups_reject() {
        let frame = Frame::new(vec![
            Column::categorical("grp", vec!["a", "a", "a", "b", "b", "b", "c", "c", "c"]),
            Column::numeric("y", vec![1.0, 2.0, 3.0, 11.0, 12.0, 13.0, 21.0, 22.0, 23.0]),
        ])
        .unwrap();
        let out = run(&frame).unwrap();
        let row = &out.table("test").unwrap().cells[0];
        let Cell::Statistic(f) = row[0] else { panic!("f cell") };
        // ss_between = 3*(100+0+100) = 600, ss_within = 6, F = 300/1
        assert!((f - 300.0).abs() < 1e-9);
        assert_eq!(row[1], Cell::Statistic(2.0));
        assert_eq!(row[2], Cell::Statistic(6.0));
        assert_eq!(row[4], Cell::Key("decision-reject".into()));
        assert_eq!(out.table("groups").unwrap().cells.len(), 3);
        assert!(out.recipe("box").is_some());
    }

    #[test]
    fn identical_groups_accept() {
        let frame = Frame::new(vec![
            Column::categorical("grp", vec!["a", "a", "b", "b"]),
            Column::numeric("y", vec![1.0, 2.0, 1.0, 2.0]),
        ])
        .unwrap();
        let out = run(&frame).unwrap();
        let row = &out.table("test").unwrap().cells[0];
        assert_eq!(row[0], Cell::Statistic(0.0));
        assert_eq!(row[4], Cell::Key("decision-accept".into()));
    }
}
