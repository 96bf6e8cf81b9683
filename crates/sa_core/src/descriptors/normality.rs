//! Jarque-Bera normality screening per numeric column.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::normality::NormalityKernel;
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    alpha_spec, BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet,
};

const EN: &str = r#"
title = Normality Test
section-test = Test summary
section-explain = What the statistics mean
section-histograms = Distribution
section-qq = Quantile comparison
section-pp = Probability comparison

stat-skewness = Skewness
stat-kurtosis = Excess Kurtosis
stat-jb = Jarque-Bera

explain-stat-skewness = Asymmetry of the distribution; zero for a normal sample.
explain-stat-kurtosis = Tail weight relative to the normal distribution.
explain-stat-jb = Joint statistic of skewness and kurtosis.
"#;

const ZH: &str = r#"
title = 正态性检验
section-test = 检验摘要
section-explain = 统计量说明
section-histograms = 分布
section-qq = 分位数比较
section-pp = 概率比较

stat-skewness = 偏度
stat-kurtosis = 超额峰度
stat-jb = Jarque-Bera

explain-stat-skewness = 分布的不对称程度，正态样本为零。
explain-stat-kurtosis = 相对正态分布的尾部厚度。
explain-stat-jb = 偏度与峰度的联合统计量。
"#;

pub fn descriptor() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "normality",
        shape: KernelShape::DistributionalTest,
        input_schema: InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]),
        param_schema: ParamSchema::new(vec![alpha_spec()]),
        missing: MissingPolicy::DropRow,
        min_rows: 8,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "test",
                title_key: "section-test",
                transposed: false,
            },
            SectionTemplate::TableExplanation { slot: "test", title_key: "section-explain" },
            SectionTemplate::Figure { recipe: "histogram", title_key: "section-histograms" },
            SectionTemplate::Figure { recipe: "qq", title_key: "section-qq" },
            SectionTemplate::Figure { recipe: "pp", title_key: "section-pp" },
        ],
        bundle: common::bundle(EN, ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(NormalityKernel),
    })
}
