//! TOPSIS multi-criteria ranking.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::mcda::TopsisKernel;
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet,
};

const EN: &str = r#"
title = TOPSIS Ranking
section-normalized = Normalized decision matrix
section-weighted = Weighted decision matrix
section-scores = Closeness and ranking
section-explain = What the scores mean
section-figures = Alternative scores

stat-dist-ideal = Distance to ideal
stat-dist-anti = Distance to anti-ideal
stat-score = Closeness score
stat-rank = Rank

explain-stat-dist-ideal = Euclidean distance to the best value of every criterion.
explain-stat-dist-anti = Euclidean distance to the worst value of every criterion.
explain-stat-score = Relative closeness to the ideal; higher is better.
explain-stat-rank = Position by descending closeness; 1 is best.
"#;

const ZH: &str = r#"
title = TOPSIS 排序
section-normalized = 规范化决策矩阵
section-weighted = 加权决策矩阵
section-scores = 贴近度与排序
section-explain = 得分说明
section-figures = 方案得分

stat-dist-ideal = 与理想解的距离
stat-dist-anti = 与负理想解的距离
stat-score = 贴近度
stat-rank = 排名

explain-stat-dist-ideal = 到各准则最优值的欧氏距离。
explain-stat-dist-anti = 到各准则最劣值的欧氏距离。
explain-stat-score = 相对贴近理想解的程度，越高越好。
explain-stat-rank = 按贴近度降序排列的名次，1 为最优。
"#;

pub fn descriptor() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "topsis",
        shape: KernelShape::MatrixMultiCriteria,
        input_schema: InputSchema::new(vec![
            RoleSlot::new(
                Role::Group,
                Cardinality::ZeroOrMore,
                ValueKindSet::CATEGORICAL,
                BindRule::FirstCategorical,
            ),
            RoleSlot::new(
                Role::Feature,
                Cardinality::OneOrMore,
                ValueKindSet::NUMERIC,
                BindRule::AllRemaining,
            ),
        ]),
        param_schema: ParamSchema::empty(),
        missing: MissingPolicy::FailIfPresent,
        min_rows: 2,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "normalized",
                title_key: "section-normalized",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "weighted",
                title_key: "section-weighted",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "scores",
                title_key: "section-scores",
                transposed: false,
            },
            SectionTemplate::TableExplanation { slot: "scores", title_key: "section-explain" },
            SectionTemplate::Figure { recipe: "bar", title_key: "section-figures" },
        ],
        bundle: common::bundle(EN, ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(TopsisKernel),
    })
}
