//! Descriptive statistics over every bound numeric column.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::descriptive::DescriptiveKernel;
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet};

const EN: &str = r#"
title = Descriptive Statistics
section-statistics = Statistics
section-explain = What the statistics mean
section-figures = Distribution

stat-count = N
stat-median = Median
stat-min = Minimum
stat-max = Maximum
stat-range = Range
stat-q1 = Q1
stat-q3 = Q3
stat-iqr = IQR

explain-stat-count = Number of present values.
explain-stat-median = Middle value of the sorted sample.
explain-stat-min = Smallest observed value.
explain-stat-max = Largest observed value.
explain-stat-range = Maximum minus minimum.
explain-stat-q1 = First quartile.
explain-stat-q3 = Third quartile.
explain-stat-iqr = Interquartile range, Q3 minus Q1.
"#;

const ZH: &str = r#"
title = 描述性统计
section-statistics = 统计量
section-explain = 统计量说明
section-figures = 分布

stat-count = 样本量
stat-median = 中位数
stat-min = 最小值
stat-max = 最大值
stat-range = 极差
stat-q1 = 下四分位数
stat-q3 = 上四分位数
stat-iqr = 四分位距

explain-stat-count = 非缺失值的个数。
explain-stat-median = 排序后位于中间的数值。
explain-stat-min = 观测到的最小值。
explain-stat-max = 观测到的最大值。
explain-stat-range = 最大值减最小值。
explain-stat-q1 = 第一四分位数。
explain-stat-q3 = 第三四分位数。
explain-stat-iqr = 四分位距，即 Q3 减 Q1。
"#;

pub fn descriptor() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "descriptive",
        shape: KernelShape::UnivariateDescriptive,
        input_schema: InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]),
        param_schema: ParamSchema::empty(),
        missing: MissingPolicy::DropRow,
        min_rows: 2,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "statistics",
                title_key: "section-statistics",
                transposed: false,
            },
            SectionTemplate::TableExplanation {
                slot: "statistics",
                title_key: "section-explain",
            },
            SectionTemplate::Figure { recipe: "histogram", title_key: "section-figures" },
        ],
        bundle: common::bundle(EN, ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(DescriptiveKernel),
    })
}
