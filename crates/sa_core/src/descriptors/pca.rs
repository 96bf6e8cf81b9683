//! Principal component analysis on the correlation matrix.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::pca::PcaKernel;
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet,
};

const EN: &str = r#"
title = Principal Component Analysis
section-eigenvalues = Explained variance
section-explain = What the columns mean
section-loadings = Component loadings
section-figures = Component importance

stat-eigenvalue = Eigenvalue
stat-variance-pct = Variance explained
stat-cumulative-pct = Cumulative

explain-stat-eigenvalue = Variance captured by the component, in standardized units.
explain-stat-variance-pct = Share of total variance the component explains.
explain-stat-cumulative-pct = Running total of explained variance.
"#;

const ZH: &str = r#"
title = 主成分分析
section-eigenvalues = 方差解释
section-explain = 各列含义
section-loadings = 成分载荷
section-figures = 成分重要性

stat-eigenvalue = 特征值
stat-variance-pct = 方差贡献率
stat-cumulative-pct = 累计贡献率

explain-stat-eigenvalue = 成分在标准化尺度下捕获的方差。
explain-stat-variance-pct = 成分解释的总方差比例。
explain-stat-cumulative-pct = 方差贡献率的累计值。
"#;

pub fn descriptor() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "pca",
        shape: KernelShape::FactorExtraction,
        input_schema: InputSchema::new(vec![RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        )]),
        param_schema: ParamSchema::empty(),
        missing: MissingPolicy::DropRow,
        min_rows: 3,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "eigenvalues",
                title_key: "section-eigenvalues",
                transposed: false,
            },
            SectionTemplate::TableExplanation {
                slot: "eigenvalues",
                title_key: "section-explain",
            },
            SectionTemplate::TableStatistic {
                slot: "loadings",
                title_key: "section-loadings",
                transposed: false,
            },
            SectionTemplate::Figure { recipe: "scree", title_key: "section-figures" },
        ],
        bundle: common::bundle(EN, ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(PcaKernel),
    })
}
