//! One-way analysis of variance.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::anova::OneWayAnovaKernel;
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    alpha_spec, BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet,
};

const EN: &str = r#"
title = One-Way ANOVA
section-groups = Group statistics
section-test = Test summary
section-interpret = Reading the result
section-figures = Group spread
prompt-group = Pick the column that labels the groups.
prompt-target = Pick the numeric column to compare.

stat-f = F
stat-df-between = df (between)
stat-df-within = df (within)

interpret-stat-f = Ratio of between-group to within-group variance.
interpret-stat-df-between = Number of groups minus one.
interpret-stat-df-within = Observations minus number of groups.
"#;

const ZH: &str = r#"
title = 单因素方差分析
section-groups = 分组统计
section-test = 检验摘要
section-interpret = 结果解读
section-figures = 组内离散
prompt-group = 请选择标识组别的列。
prompt-target = 请选择要比较的数值列。

stat-f = F
stat-df-between = 组间自由度
stat-df-within = 组内自由度

interpret-stat-f = 组间方差与组内方差之比。
interpret-stat-df-between = 组数减一。
interpret-stat-df-within = 观测数减组数。
"#;

pub fn descriptor() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "anova",
        shape: KernelShape::GroupComparison,
        input_schema: InputSchema::new(vec![
            RoleSlot::new(
                Role::Group,
                Cardinality::ExactlyOne,
                ValueKindSet::GROUPABLE,
                BindRule::FirstCategorical,
            )
            .with_prompt("prompt-group"),
            RoleSlot::new(
                Role::Target,
                Cardinality::ExactlyOne,
                ValueKindSet::NUMERIC,
                BindRule::LastColumn,
            )
            .with_prompt("prompt-target"),
        ]),
        param_schema: ParamSchema::new(vec![alpha_spec()]),
        missing: MissingPolicy::DropRow,
        min_rows: 4,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "groups",
                title_key: "section-groups",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "test",
                title_key: "section-test",
                transposed: false,
            },
            SectionTemplate::TableInterpretation { slot: "test", title_key: "section-interpret" },
            SectionTemplate::Figure { recipe: "box", title_key: "section-figures" },
        ],
        bundle: common::bundle(EN, ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(OneWayAnovaKernel),
    })
}
