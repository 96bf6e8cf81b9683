//! Message blocks shared by every shipped descriptor: the fault
//! taxonomy, hypothesis-test decisions, and figure/axis labels. Each
//! descriptor concatenates these with its own procedure-specific FTL.

use crate::error::Result;
use crate::locale::LocaleBundle;

pub const COMMON_EN: &str = r#"
fault-input-missing = No input file was given.
fault-input-absent = Input file not found: { $detail }
fault-load-failure = The input file could not be read: { $detail }
fault-unknown-column = Unknown column: { $detail }
fault-wrong-kind = Column has an incompatible value kind: { $detail }
fault-schema-unsatisfied = Required input is not bound: { $detail }
fault-parameter-invalid = Invalid parameter: { $detail }
fault-numeric-failure = Computation failed: { $detail }
fault-user-cancelled = The analysis was cancelled.
fault-sink-failure = The report could not be written: { $detail }
fault-internal-invariant = Internal error: { $detail }

decision-reject = Reject the null hypothesis
decision-accept = Fail to reject the null hypothesis

param-alpha = The significance level must lie strictly between 0 and 1.

stat-n = N
stat-mean = Mean
stat-stdev = Std. Deviation
stat-t = t
stat-df = df
stat-p = p-value
stat-decision = Decision

explain-stat-n = Number of observations used.
explain-stat-mean = Arithmetic average of the sample.
explain-stat-stdev = Spread of the sample around its mean.
explain-stat-t = The t statistic of the test.
explain-stat-df = Degrees of freedom of the reference distribution.
explain-stat-p = Probability of a result at least this extreme under the null hypothesis.
explain-stat-decision = Conclusion at the chosen significance level.

interpret-stat-n = The test used this many complete observations.
interpret-stat-mean = The observed sample average.
interpret-stat-stdev = Larger values mean a more dispersed sample.
interpret-stat-t = Larger magnitudes speak against the null hypothesis.
interpret-stat-df = Determines the shape of the reference distribution.
interpret-stat-p = Values below the significance level count as significant.
interpret-stat-decision = The verdict implied by the p-value.

figure-histogram = Histogram
figure-errorbar = Mean with standard error
figure-grouped-bar = Group means
figure-box = Box plot
figure-bar = Bar chart
figure-heatmap = Heat map
figure-scatter-matrix = Scatter matrix
figure-actual-vs-predicted = Actual vs. predicted
figure-roc = ROC curve
figure-forecast = Forecast
figure-scree = Scree plot
figure-qq = Q-Q plot
figure-pp = P-P plot

axis-value = Value
axis-frequency = Frequency
axis-sample = Sample
axis-mean = Mean
axis-group = Group
axis-category = Category
axis-count = Count
axis-variable = Variable
axis-predicted = Predicted
axis-actual = Actual
axis-fpr = False positive rate
axis-tpr = True positive rate
axis-time = Time
axis-component = Component
axis-eigenvalue = Eigenvalue
axis-alternative = Alternative
axis-score = Closeness score
axis-theoretical = Theoretical quantile
axis-observed = Observed quantile
axis-empirical = Empirical proportion
"#;

pub const COMMON_ZH: &str = r#"
fault-input-missing = 未指定输入文件。
fault-input-absent = 找不到输入文件：{ $detail }
fault-load-failure = 无法读取输入文件：{ $detail }
fault-unknown-column = 未知的列：{ $detail }
fault-wrong-kind = 列的数据类型不符合要求：{ $detail }
fault-schema-unsatisfied = 缺少必需的输入：{ $detail }
fault-parameter-invalid = 参数无效：{ $detail }
fault-numeric-failure = 计算失败：{ $detail }
fault-user-cancelled = 分析已取消。
fault-sink-failure = 无法写出报告：{ $detail }
fault-internal-invariant = 内部错误：{ $detail }

decision-reject = 拒绝原假设
decision-accept = 不拒绝原假设

param-alpha = 显著性水平必须介于 0 和 1 之间。

stat-n = 样本量
stat-mean = 均值
stat-stdev = 标准差
stat-t = t
stat-df = 自由度
stat-p = p 值
stat-decision = 结论

explain-stat-n = 参与计算的观测数。
explain-stat-mean = 样本的算术平均数。
explain-stat-stdev = 样本围绕均值的离散程度。
explain-stat-t = 检验的 t 统计量。
explain-stat-df = 参考分布的自由度。
explain-stat-p = 在原假设下出现至少如此极端结果的概率。
explain-stat-decision = 在所选显著性水平下的结论。

interpret-stat-n = 检验使用了这么多条完整观测。
interpret-stat-mean = 观测到的样本平均值。
interpret-stat-stdev = 数值越大表示样本越分散。
interpret-stat-t = 绝对值越大越不支持原假设。
interpret-stat-df = 决定参考分布的形状。
interpret-stat-p = 低于显著性水平即视为显著。
interpret-stat-decision = 由 p 值得出的判定。

figure-histogram = 直方图
figure-errorbar = 均值与标准误
figure-grouped-bar = 分组均值
figure-box = 箱线图
figure-bar = 条形图
figure-heatmap = 热力图
figure-scatter-matrix = 散点图矩阵
figure-actual-vs-predicted = 实际值与预测值
figure-roc = ROC 曲线
figure-forecast = 预测
figure-scree = 碎石图
figure-qq = Q-Q 图
figure-pp = P-P 图

axis-value = 数值
axis-frequency = 频数
axis-sample = 样本
axis-mean = 均值
axis-group = 组别
axis-category = 类别
axis-count = 计数
axis-variable = 变量
axis-predicted = 预测值
axis-actual = 实际值
axis-fpr = 假阳性率
axis-tpr = 真阳性率
axis-time = 时间
axis-component = 成分
axis-eigenvalue = 特征值
axis-alternative = 方案
axis-score = 贴近度
axis-theoretical = 理论分位数
axis-observed = 观测分位数
axis-empirical = 经验比例
"#;

/// Builds a descriptor bundle from procedure-specific FTL layered over
/// the shared block.
pub fn bundle(en: &str, zh: &str) -> Result<LocaleBundle> {
    let en = format!("{COMMON_EN}\n{en}");
    let zh = format!("{COMMON_ZH}\n{zh}");
    LocaleBundle::from_sources(&[("en-US", &en), ("zh-CN", &zh)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_blocks_parse_in_both_locales() {
        let b = bundle("title = T\n", "title = 标题\n").unwrap();
        assert_eq!(b.lookup("en-US", "decision-reject"), "Reject the null hypothesis");
        assert_eq!(b.lookup("zh-CN", "decision-reject"), "拒绝原假设");
        assert!(b.has("en-US", "fault-numeric-failure"));
        assert!(b.has("zh-CN", "fault-numeric-failure"));
    }
}
