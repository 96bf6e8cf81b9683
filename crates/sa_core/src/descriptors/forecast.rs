//! Holt linear-trend forecasting.

use crate::descriptor::{AnalysisDescriptor, SectionTemplate};
use crate::descriptors::common;
use crate::error::Result;
use crate::kernel::forecast::HoltForecastKernel;
use crate::kernel::{KernelShape, MissingPolicy};
use crate::schema::{
    BindRule, Cardinality, InputSchema, ParamKind, ParamSchema, ParamSpec, ParamValue, Role,
    RoleSlot, ValueKindSet,
};

const EN: &str = r#"
title = Trend Forecast
section-fit = Model fit
section-explain = What the fit statistics mean
section-figures = Forecast

param-smoothing = The level smoothing constant must lie strictly between 0 and 1.
param-trend = The trend smoothing constant must lie strictly between 0 and 1.
param-horizon = The forecast horizon must be a positive whole number.

stat-sse = SSE
stat-level = Final level
stat-trend = Final trend

explain-stat-sse = Sum of squared one-step-ahead errors over the fit.
explain-stat-level = Smoothed level at the last observation.
explain-stat-trend = Smoothed per-step trend at the last observation.
"#;

const ZH: &str = r#"
title = 趋势预测
section-fit = 模型拟合
section-explain = 拟合指标说明
section-figures = 预测

param-smoothing = 水平平滑系数必须介于 0 和 1 之间。
param-trend = 趋势平滑系数必须介于 0 和 1 之间。
param-horizon = 预测期数必须是正整数。

stat-sse = 误差平方和
stat-level = 期末水平
stat-trend = 期末趋势

explain-stat-sse = 拟合期间一步向前预测误差的平方和。
explain-stat-level = 最后一个观测处的平滑水平。
explain-stat-trend = 最后一个观测处的平滑趋势。
"#;

fn unit_interval(v: &ParamValue) -> bool {
    v.as_real().map(|x| x > 0.0 && x < 1.0).unwrap_or(false)
}

pub fn descriptor() -> Result<AnalysisDescriptor> {
    Ok(AnalysisDescriptor {
        id: "forecast",
        shape: KernelShape::TimeSeries,
        input_schema: InputSchema::new(vec![
            RoleSlot::new(
                Role::TimeIndex,
                Cardinality::ZeroOrMore,
                ValueKindSet::DATETIME,
                BindRule::FirstDatetime,
            ),
            RoleSlot::new(
                Role::Feature,
                Cardinality::OneOrMore,
                ValueKindSet::NUMERIC,
                BindRule::AllRemaining,
            ),
        ]),
        param_schema: ParamSchema::new(vec![
            ParamSpec {
                name: "smoothing",
                kind: ParamKind::Real,
                default: ParamValue::Real(0.3),
                validate: Some(unit_interval),
                message_key: "param-smoothing",
            },
            ParamSpec {
                name: "trend",
                kind: ParamKind::Real,
                default: ParamValue::Real(0.1),
                validate: Some(unit_interval),
                message_key: "param-trend",
            },
            ParamSpec {
                name: "horizon",
                kind: ParamKind::Integer,
                default: ParamValue::Integer(5),
                validate: Some(|v| v.as_integer().map(|h| h > 0).unwrap_or(false)),
                message_key: "param-horizon",
            },
        ]),
        missing: MissingPolicy::FailIfPresent,
        min_rows: 4,
        output_layout: vec![
            SectionTemplate::TableStatistic {
                slot: "fit",
                title_key: "section-fit",
                transposed: false,
            },
            SectionTemplate::TableExplanation { slot: "fit", title_key: "section-explain" },
            SectionTemplate::Figure { recipe: "forecast", title_key: "section-figures" },
        ],
        bundle: common::bundle(EN, ZH)?,
        naming_template: "{base}-{figure}",
        kernel: Box::new(HoltForecastKernel),
    })
}
