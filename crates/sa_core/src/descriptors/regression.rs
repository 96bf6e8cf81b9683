//! Regression procedures: ordinary least squares and logistic.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::regression::{LinearRegressionKernel, LogisticRegressionKernel};
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    BindRule, Cardinality, InputSchema, ParamSchema, Role, RoleSlot, ValueKindSet,
};

const COEF_STATS_EN: &str = r#"
stat-intercept = (Intercept)
stat-coef = Coefficient
stat-se = Std. Error
"#;

const COEF_STATS_ZH: &str = r#"
stat-intercept = （截距）
stat-coef = 系数
stat-se = 标准误
"#;

const LINEAR_EN: &str = r#"
title = Linear Regression
section-coefficients = Coefficients
section-fit = Model fit
section-explain = What the fit statistics mean
section-figures = Fit quality
prompt-target = Pick the numeric column to predict.

stat-r2 = R-squared
stat-adj-r2 = Adjusted R-squared
stat-mse = MSE
stat-f = F

explain-stat-r2 = Share of response variance the model explains.
explain-stat-adj-r2 = R-squared penalized for the number of predictors.
explain-stat-mse = Mean squared residual.
explain-stat-f = Overall significance of the regression.
"#;

const LINEAR_ZH: &str = r#"
title = 线性回归
section-coefficients = 回归系数
section-fit = 模型拟合
section-explain = 拟合指标说明
section-figures = 拟合效果
prompt-target = 请选择要预测的数值列。

stat-r2 = R 方
stat-adj-r2 = 调整 R 方
stat-mse = 均方误差
stat-f = F

explain-stat-r2 = 模型解释的响应方差比例。
explain-stat-adj-r2 = 对预测变量个数加以惩罚后的 R 方。
explain-stat-mse = 残差均方。
explain-stat-f = 回归整体显著性。
"#;

pub fn linear() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "linear-regression",
        shape: KernelShape::Regression,
        input_schema: regression_schema(),
        param_schema: ParamSchema::empty(),
        missing: MissingPolicy::DropRow,
        min_rows: 4,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "coefficients",
                title_key: "section-coefficients",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "fit",
                title_key: "section-fit",
                transposed: true,
            },
            SectionTemplate::TableExplanation { slot: "fit", title_key: "section-explain" },
            SectionTemplate::Figure {
                recipe: "actual-vs-predicted",
                title_key: "section-figures",
            },
        ],
        bundle: common::bundle(
            &format!("{COEF_STATS_EN}{LINEAR_EN}"),
            &format!("{COEF_STATS_ZH}{LINEAR_ZH}"),
        )?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(LinearRegressionKernel),
    })
}

const LOGISTIC_EN: &str = r#"
title = Logistic Regression
section-coefficients = Coefficients
section-fit = Model fit
section-explain = What the fit statistics mean
section-figures = Discrimination
prompt-target = Pick the 0/1 column to predict.

stat-z = z
stat-iterations = Iterations
stat-auc = AUC

explain-stat-iterations = Newton steps until the fit converged.
explain-stat-auc = Probability a positive case scores above a negative one.
"#;

const LOGISTIC_ZH: &str = r#"
title = 逻辑回归
section-coefficients = 回归系数
section-fit = 模型拟合
section-explain = 拟合指标说明
section-figures = 判别能力
prompt-target = 请选择要预测的 0/1 列。

stat-z = z
stat-iterations = 迭代次数
stat-auc = AUC

explain-stat-iterations = 拟合收敛所用的牛顿迭代步数。
explain-stat-auc = 正例得分高于负例的概率。
"#;

pub fn logistic() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "logistic-regression",
        shape: KernelShape::Regression,
        input_schema: regression_schema(),
        param_schema: ParamSchema::empty(),
        missing: MissingPolicy::DropRow,
        min_rows: 6,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "coefficients",
                title_key: "section-coefficients",
                transposed: false,
            },
            SectionTemplate::TableStatistic {
                slot: "fit",
                title_key: "section-fit",
                transposed: true,
            },
            SectionTemplate::TableExplanation { slot: "fit", title_key: "section-explain" },
            SectionTemplate::Figure { recipe: "roc", title_key: "section-figures" },
        ],
        bundle: common::bundle(
            &format!("{COEF_STATS_EN}{LOGISTIC_EN}"),
            &format!("{COEF_STATS_ZH}{LOGISTIC_ZH}"),
        )?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(LogisticRegressionKernel),
    })
}

fn regression_schema() -> InputSchema {
    InputSchema::new(vec![
        RoleSlot::new(
            Role::Target,
            Cardinality::ExactlyOne,
            ValueKindSet::NUMERIC,
            BindRule::LastColumn,
        )
        .with_prompt("prompt-target"),
        RoleSlot::new(
            Role::Feature,
            Cardinality::OneOrMore,
            ValueKindSet::NUMERIC,
            BindRule::AllRemaining,
        ),
    ])
}
