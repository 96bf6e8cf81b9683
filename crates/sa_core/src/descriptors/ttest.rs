//! The t-test family: one-sample, independent two-sample, paired.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::ttest::{OneSampleTKernel, PairedTKernel, TwoSampleTKernel};
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    alpha_spec, BindRule, Cardinality, InputSchema, ParamKind, ParamSchema, ParamSpec, ParamValue,
    Role, RoleSlot, ValueKindSet,
};

const ONE_SAMPLE_EN: &str = r#"
title = One-Sample t Test
section-test = Test summary
section-interpret = Reading the result
section-figures = Sample mean
param-mu0 = The hypothesized mean must be a number.
"#;

const ONE_SAMPLE_ZH: &str = r#"
title = 单样本 t 检验
section-test = 检验摘要
section-interpret = 结果解读
section-figures = 样本均值
param-mu0 = 假设均值必须是数字。
"#;

pub fn one_sample() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "one-sample-t",
        shape: KernelShape::GroupComparison,
        input_schema: InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::ExactlyOne,
            ValueKindSet::NUMERIC,
            BindRule::FirstColumn,
        )
        .with_prompt("prompt-feature")]),
        param_schema: ParamSchema::new(vec![
            ParamSpec {
                name: "mu0",
                kind: ParamKind::Real,
                default: ParamValue::Real(0.0),
                validate: None,
                message_key: "param-mu0",
            },
            alpha_spec(),
        ]),
        missing: MissingPolicy::DropRow,
        min_rows: 2,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "test",
                title_key: "section-test",
                transposed: false,
            },
            SectionTemplate::TableInterpretation { slot: "test", title_key: "section-interpret" },
            SectionTemplate::Figure { recipe: "errorbar", title_key: "section-figures" },
        ],
        bundle: common::bundle(
            &format!("{ONE_SAMPLE_EN}prompt-feature = Pick the column to test.\n"),
            &format!("{ONE_SAMPLE_ZH}prompt-feature = 请选择要检验的列。\n"),
        )?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(OneSampleTKernel),
    })
}

const TWO_SAMPLE_EN: &str = r#"
title = Independent-Samples t Test
section-test = Test summary
section-groups = Group statistics
section-interpret = Reading the result
section-figures = Group means
prompt-group = Pick the column that labels the two groups.
prompt-target = Pick the numeric column to compare.
"#;

const TWO_SAMPLE_ZH: &str = r#"
title = 独立样本 t 检验
section-test = 检验摘要
section-groups = 分组统计
section-interpret = 结果解读
section-figures = 分组均值
prompt-group = 请选择标识两组的列。
prompt-target = 请选择要比较的数值列。
"#;

pub fn two_sample() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "two-sample-t",
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
            SectionTemplate::Figure { recipe: "grouped-bar", title_key: "section-figures" },
        ],
        bundle: common::bundle(TWO_SAMPLE_EN, TWO_SAMPLE_ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(TwoSampleTKernel),
    })
}

const PAIRED_EN: &str = r#"
title = Paired-Samples t Test
section-test = Test summary
section-interpret = Reading the result
section-figures = Condition means
prompt-feature = Pick the first measurement column.
prompt-target = Pick the second measurement column.
"#;

const PAIRED_ZH: &str = r#"
title = 配对样本 t 检验
section-test = 检验摘要
section-interpret = 结果解读
section-figures = 条件均值
prompt-feature = 请选择第一个测量列。
prompt-target = 请选择第二个测量列。
"#;

pub fn paired() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "paired-t",
        shape: KernelShape::GroupComparison,
        input_schema: InputSchema::new(vec![
            RoleSlot::new(
                Role::Feature,
                Cardinality::ExactlyOne,
                ValueKindSet::NUMERIC,
                BindRule::FirstColumn,
            )
            .with_prompt("prompt-feature"),
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
        min_rows: 2,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "test",
                title_key: "section-test",
                transposed: false,
            },
            SectionTemplate::TableInterpretation { slot: "test", title_key: "section-interpret" },
            SectionTemplate::Figure { recipe: "grouped-bar", title_key: "section-figures" },
        ],
        bundle: common::bundle(PAIRED_EN, PAIRED_ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(PairedTKernel),
    })
}
