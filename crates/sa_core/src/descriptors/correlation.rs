//! Correlation matrices: Pearson and Spearman.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::correlation::{CorrelationKernel, CorrelationMethod};
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    alpha_spec, BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet,
};

const PEARSON_EN: &str = r#"
title = Pearson Correlation
section-coefficients = Correlation coefficients
section-pvalues = Significance (two-tailed)
section-method = Method
section-heatmap = Correlation heat map
section-scatter = Pairwise scatter
prose-method = Pearson's r measures the linear association between two
    numeric columns, from -1 (perfect inverse) through 0 (none) to 1
    (perfect direct). Each pair uses the rows where both values are
    present.
"#;

const PEARSON_ZH: &str = r#"
title = Pearson 相关分析
section-coefficients = 相关系数
section-pvalues = 显著性（双尾）
section-method = 方法
section-heatmap = 相关热力图
section-scatter = 两两散点
prose-method = Pearson 相关系数 r 衡量两个数值列之间的线性关联，取值从
    -1（完全负相关）经 0（无关联）到 1（完全正相关）。每一对变量使用
    两个值都存在的行。
"#;

pub fn pearson() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "correlation",
        shape: KernelShape::Correlation,
        input_schema: matrix_schema(),
        param_schema: ParamSchema::new(vec![alpha_spec()]),
        missing: MissingPolicy::Pairwise,
        min_rows: 3,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "coefficients",
                title_key: "section-coefficients",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "pvalues",
                title_key: "section-pvalues",
                transposed: false,
            },
            SectionTemplate::Prose { text_key: "prose-method", title_key: "section-method" },
            SectionTemplate::Figure { recipe: "heatmap", title_key: "section-heatmap" },
            SectionTemplate::Figure { recipe: "scatter-matrix", title_key: "section-scatter" },
        ],
        bundle: common::bundle(PEARSON_EN, PEARSON_ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(CorrelationKernel { method: CorrelationMethod::Pearson }),
    })
}

const SPEARMAN_EN: &str = r#"
title = Spearman Rank Correlation
section-coefficients = Rank correlation coefficients
section-pvalues = Significance (two-tailed)
section-method = Method
section-heatmap = Correlation heat map
prose-method = Spearman's rho is Pearson's r computed on ranks, so it
    captures any monotone association and is insensitive to outliers
    and monotone transformations.
"#;

const SPEARMAN_ZH: &str = r#"
title = Spearman 秩相关分析
section-coefficients = 秩相关系数
section-pvalues = 显著性（双尾）
section-method = 方法
section-heatmap = 相关热力图
prose-method = Spearman 相关系数是在秩上计算的 Pearson 相关系数，能够
    捕捉任何单调关联，对离群值和单调变换不敏感。
"#;

pub fn spearman() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "spearman",
        shape: KernelShape::Correlation,
        input_schema: matrix_schema(),
        param_schema: ParamSchema::new(vec![alpha_spec()]),
        missing: MissingPolicy::Pairwise,
        min_rows: 3,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "coefficients",
                title_key: "section-coefficients",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "pvalues",
                title_key: "section-pvalues",
                transposed: false,
            },
            SectionTemplate::Prose { text_key: "prose-method", title_key: "section-method" },
            SectionTemplate::Figure { recipe: "heatmap", title_key: "section-heatmap" },
        ],
        bundle: common::bundle(SPEARMAN_EN, SPEARMAN_ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(CorrelationKernel { method: CorrelationMethod::Spearman }),
    })
}

fn matrix_schema() -> InputSchema {
    InputSchema::new(vec![RoleSlot::new(
        Role::Feature,
        Cardinality::OneOrMore,
        ValueKindSet::NUMERIC,
        BindRule::AllRemaining,
    )])
}
