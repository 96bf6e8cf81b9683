//! Chi-square tests: goodness-of-fit and independence.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::chisq::{Chi2GofKernel, Chi2IndependenceKernel};
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    alpha_spec, BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet,
};

const CHI_STATS_EN: &str = r#"
stat-chi2 = Chi-square
explain-stat-chi2 = Sum of squared deviations between observed and expected counts.
interpret-stat-chi2 = Larger values mean a worse fit to the expected counts.
"#;

const CHI_STATS_ZH: &str = r#"
stat-chi2 = 卡方
explain-stat-chi2 = 观测计数与期望计数之间偏差平方的总和。
interpret-stat-chi2 = 数值越大，与期望计数的拟合越差。
"#;

const GOF_EN: &str = r#"
title = Chi-Square Goodness-of-Fit Test
section-test = Test summary
section-interpret = Reading the result
section-figures = Observed vs. expected
prompt-feature = Pick the column of observed counts.
"#;

const GOF_ZH: &str = r#"
title = 卡方拟合优度检验
section-test = 检验摘要
section-interpret = 结果解读
section-figures = 观测与期望
prompt-feature = 请选择观测计数所在的列。
"#;

pub fn goodness_of_fit() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "chi-square-gof",
        shape: KernelShape::DistributionalTest,
        input_schema: InputSchema::new(vec![
            RoleSlot::new(
                Role::Feature,
                Cardinality::ExactlyOne,
                ValueKindSet::NUMERIC,
                BindRule::FirstColumn,
            )
            .with_prompt("prompt-feature"),
            RoleSlot::new(
                Role::Covariate,
                Cardinality::ZeroOrMore,
                ValueKindSet::NUMERIC,
                BindRule::LastColumn,
            ),
        ]),
        param_schema: ParamSchema::new(vec![alpha_spec()]),
        missing: MissingPolicy::FailIfPresent,
        min_rows: 2,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "test",
                title_key: "section-test",
                transposed: false,
            },
            SectionTemplate::TableInterpretation { slot: "test", title_key: "section-interpret" },
            SectionTemplate::Figure { recipe: "bar", title_key: "section-figures" },
        ],
        bundle: common::bundle(
            &format!("{CHI_STATS_EN}{GOF_EN}"),
            &format!("{CHI_STATS_ZH}{GOF_ZH}"),
        )?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(Chi2GofKernel),
    })
}

const INDEP_EN: &str = r#"
title = Chi-Square Test of Independence
section-contingency = Contingency table
section-test = Test summary
section-interpret = Reading the result
section-figures = Cell counts
prompt-feature = Pick the row variable.
prompt-target = Pick the column variable.
"#;

const INDEP_ZH: &str = r#"
title = 卡方独立性检验
section-contingency = 列联表
section-test = 检验摘要
section-interpret = 结果解读
section-figures = 单元格计数
prompt-feature = 请选择行变量。
prompt-target = 请选择列变量。
"#;

pub fn independence() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "chi-square-independence",
        shape: KernelShape::DistributionalTest,
        input_schema: InputSchema::new(vec![
            RoleSlot::new(
                Role::Feature,
                Cardinality::ExactlyOne,
                ValueKindSet::GROUPABLE,
                BindRule::FirstColumn,
            )
            .with_prompt("prompt-feature"),
            RoleSlot::new(
                Role::Target,
                Cardinality::ExactlyOne,
                ValueKindSet::GROUPABLE,
                BindRule::LastColumn,
            )
            .with_prompt("prompt-target"),
        ]),
        param_schema: ParamSchema::new(vec![alpha_spec()]),
        missing: MissingPolicy::DropRow,
        min_rows: 4,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "contingency",
                title_key: "section-contingency",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "test",
                title_key: "section-test",
                transposed: false,
            },
            SectionTemplate::TableInterpretation { slot: "test", title_key: "section-interpret" },
            SectionTemplate::Figure { recipe: "heatmap", title_key: "section-figures" },
        ],
        bundle: common::bundle(
            &format!("{CHI_STATS_EN}{INDEP_EN}"),
            &format!("{CHI_STATS_ZH}{INDEP_ZH}"),
        )?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(Chi2IndependenceKernel),
    })
}
