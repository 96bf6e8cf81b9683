//! Regression family: ordinary least squares and logistic (IRLS).
//!
//! Both kernels build a design matrix with a leading intercept column
//! and surface singular or non-convergent systems as typed faults.

use nalgebra::{DMatrix, DVector};

use crate::error::{Fault, Result};
use crate::kernel::{
    f_sf, finite, normal_cdf, t_two_sided_p, Cell, Kernel, KernelInput, KernelOutput,
    KernelShape, Label, TableArtifact,
};
use crate::plot::{PlotKind, PlotRecipe, PlotSeries};
use crate::schema::Role;

pub const COEF_KEYS: &[&str] = &["stat-coef", "stat-se", "stat-t", "stat-p"];
pub const FIT_KEYS: &[&str] = &["stat-r2", "stat-adj-r2", "stat-mse", "stat-f", "stat-p"];
pub const LOGIT_COEF_KEYS: &[&str] = &["stat-coef", "stat-se", "stat-z", "stat-p"];
pub const LOGIT_FIT_KEYS: &[&str] = &["stat-n", "stat-iterations", "stat-auc"];

const IRLS_MAX_ITER: usize = 25;
const IRLS_TOL: f64 = 1e-8;

/// Splits listwise-complete rows into a design matrix (with intercept)
/// and a response vector.
fn design(
    input: &KernelInput,
    features: &[&crate::frame::Column],
    target: &crate::frame::Column,
) -> Result<(DMatrix<f64>, DVector<f64>)> {
    let mut cols: Vec<&crate::frame::Column> = features.to_vec();
    cols.push(target);
    let rows = input.complete_rows(&cols)?;
    let p = features.len() + 1;
    if rows.len() <= p {
        return Err(Fault::NumericFailure(format!(
            "{} rows is too few for {p} coefficients",
            rows.len()
        )));
    }
    let mut x = DMatrix::zeros(rows.len(), p);
    let mut y = DVector::zeros(rows.len());
    for (i, row) in rows.iter().enumerate() {
        x[(i, 0)] = 1.0;
        for j in 0..features.len() {
            x[(i, j + 1)] = row[j];
        }
        y[i] = row[features.len()];
    }
    Ok((x, y))
}

fn coef_labels(features: &[&crate::frame::Column]) -> Vec<Label> {
    let mut labels = vec![Label::key("stat-intercept")];
    labels.extend(features.iter().map(|c| Label::verbatim(&c.name)));
    labels
}

/// Ordinary least squares with coefficient inference and fit metrics.
pub struct LinearRegressionKernel;

impl Kernel for LinearRegressionKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::Regression
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let features = input.columns(Role::Feature);
        let target = input.binding.column(input.frame, Role::Target)?;
        let (x, y) = design(input, &features, target)?;
        let n = x.nrows();
        let p = x.ncols();

        let xtx = x.transpose() * &x;
        let chol = xtx
            .clone()
            .cholesky()
            .ok_or_else(|| Fault::NumericFailure("singular design matrix".into()))?;
        let beta = chol.solve(&(x.transpose() * &y));
        let xtx_inv = chol.inverse();

        let fitted = &x * &beta;
        let residuals = &y - &fitted;
        let rss: f64 = residuals.iter().map(|r| r * r).sum();
        let ybar = y.iter().sum::<f64>() / n as f64;
        let tss: f64 = y.iter().map(|v| (v - ybar).powi(2)).sum();
        if tss == 0.0 {
            return Err(Fault::NumericFailure("constant response".into()));
        }
        let df_resid = (n - p) as f64;
        let sigma2 = rss / df_resid;
        let r2 = 1.0 - rss / tss;
        let adj_r2 = 1.0 - (1.0 - r2) * (n as f64 - 1.0) / df_resid;
        let mse = rss / n as f64;
        let df_model = (p - 1) as f64;
        let f_stat = if rss == 0.0 {
            f64::INFINITY
        } else {
            ((tss - rss) / df_model) / sigma2
        };
        let f_p = if f_stat.is_infinite() { 0.0 } else { f_sf(f_stat, df_model, df_resid)? };

        let mut coefs = TableArtifact::new(
            coef_labels(&features),
            COEF_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        for j in 0..p {
            let se = (sigma2 * xtx_inv[(j, j)]).sqrt();
            let (t, p_val) = if se == 0.0 {
                (f64::INFINITY, 0.0)
            } else {
                let t = beta[j] / se;
                (t, t_two_sided_p(t, df_resid)?)
            };
            coefs.push_row(vec![
                Cell::Statistic(finite(beta[j], "coefficient")?),
                Cell::Statistic(se),
                if t.is_infinite() { Cell::Empty } else { Cell::Statistic(t) },
                Cell::Proportion(p_val),
            ]);
        }

        let mut fit = TableArtifact::new(
            vec![Label::verbatim(&target.name)],
            FIT_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        fit.push_row(vec![
            Cell::Statistic(r2),
            Cell::Statistic(adj_r2),
            Cell::Statistic(mse),
            if f_stat.is_infinite() { Cell::Empty } else { Cell::Statistic(f_stat) },
            Cell::Proportion(f_p),
        ]);

        let mut output = KernelOutput::default();
        output.insert_table("coefficients", coefs);
        output.insert_table("fit", fit);
        output.insert_recipe(
            PlotRecipe::new("actual-vs-predicted", PlotKind::Scatter)
                .with_series(PlotSeries::points(
                    &target.name,
                    fitted.iter().copied().collect(),
                    y.iter().copied().collect(),
                ))
                .with_labels("figure-actual-vs-predicted", "axis-predicted", "axis-actual"),
        );
        Ok(output)
    }
}

/// Area under the ROC curve by the rank statistic.
pub fn auc(scores: &[f64], labels: &[f64]) -> Result<f64> {
    let pos = labels.iter().filter(|&&l| l == 1.0).count();
    let neg = labels.len() - pos;
    if pos == 0 || neg == 0 {
        return Err(Fault::NumericFailure("AUC needs both classes present".into()));
    }
    let ranks = crate::kernel::correlation::ranks(scores);
    let rank_sum: f64 = ranks
        .iter()
        .zip(labels.iter())
        .filter(|(_, &l)| l == 1.0)
        .map(|(r, _)| r)
        .sum();
    let u = rank_sum - pos as f64 * (pos as f64 + 1.0) / 2.0;
    Ok(u / (pos as f64 * neg as f64))
}

/// Logistic regression fitted by iteratively reweighted least squares.
pub struct LogisticRegressionKernel;

impl Kernel for LogisticRegressionKernel {
    fn shape(&self) -> KernelShape {
        KernelShape::Regression
    }

    fn run(&self, input: &KernelInput) -> Result<KernelOutput> {
        let features = input.columns(Role::Feature);
        let target = input.binding.column(input.frame, Role::Target)?;
        let (x, y) = design(input, &features, target)?;
        let n = x.nrows();
        let p = x.ncols();
        if y.iter().any(|&v| v != 0.0 && v != 1.0) {
            return Err(Fault::NumericFailure("logistic target must be coded 0/1".into()));
        }

        let mut beta = DVector::zeros(p);
        let mut converged_at = None;
        for iter in 0..IRLS_MAX_ITER {
            let eta = &x * &beta;
            let mu: DVector<f64> =
                eta.map(|e| 1.0 / (1.0 + (-e).exp())).map(|m: f64| m.clamp(1e-10, 1.0 - 1e-10));
            let w: Vec<f64> = mu.iter().map(|m| m * (1.0 - m)).collect();

            // X^T W X and X^T (y - mu)
            let mut xtwx = DMatrix::zeros(p, p);
            let mut grad = DVector::zeros(p);
            for i in 0..n {
                let xi = x.row(i);
                for a in 0..p {
                    grad[a] += xi[a] * (y[i] - mu[i]);
                    for b in 0..p {
                        xtwx[(a, b)] += xi[a] * w[i] * xi[b];
                    }
                }
            }
            let chol = xtwx
                .cholesky()
                .ok_or_else(|| Fault::NumericFailure("separable or singular logistic fit".into()))?;
            let step = chol.solve(&grad);
            beta += &step;
            if step.iter().map(|s| s.abs()).fold(0.0, f64::max) < IRLS_TOL {
                converged_at = Some(iter + 1);
                break;
            }
        }
        let iterations = converged_at.ok_or_else(|| {
            Fault::NumericFailure(format!("IRLS did not converge in {IRLS_MAX_ITER} iterations"))
        })?;

        // Standard errors from the final information matrix.
        let eta = &x * &beta;
        let mu: DVector<f64> =
            eta.map(|e| 1.0 / (1.0 + (-e).exp())).map(|m: f64| m.clamp(1e-10, 1.0 - 1e-10));
        let mut xtwx: DMatrix<f64> = DMatrix::zeros(p, p);
        for i in 0..n {
            let xi = x.row(i);
            let w = mu[i] * (1.0 - mu[i]);
            for a in 0..p {
                for b in 0..p {
                    xtwx[(a, b)] += xi[a] * w * xi[b];
                }
            }
        }
        let cov = xtwx
            .cholesky()
            .ok_or_else(|| Fault::NumericFailure("singular information matrix".into()))?
            .inverse();

        let mut coefs = TableArtifact::new(
            coef_labels(&features),
            LOGIT_COEF_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        for j in 0..p {
            let se = cov[(j, j)].sqrt();
            let z = beta[j] / se;
            let p_val = (2.0 * (1.0 - normal_cdf(z.abs()))).clamp(0.0, 1.0);
            coefs.push_row(vec![
                Cell::Statistic(finite(beta[j], "coefficient")?),
                Cell::Statistic(se),
                Cell::Statistic(z),
                Cell::Proportion(p_val),
            ]);
        }

        let scores: Vec<f64> = mu.iter().copied().collect();
        let labels: Vec<f64> = y.iter().copied().collect();
        let area = auc(&scores, &labels)?;

        let mut fit = TableArtifact::new(
            vec![Label::verbatim(&target.name)],
            LOGIT_FIT_KEYS.iter().map(|k| Label::key(*k)).collect(),
        );
        fit.push_row(vec![
            Cell::Count(n as i64),
            Cell::Count(iterations as i64),
            Cell::Statistic(area),
        ]);

        // ROC curve points over score thresholds.
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| {
            scores[b].partial_cmp(&scores[a]).unwrap_or(std::cmp::Ordering::Equal)
        });
        let pos = labels.iter().filter(|&&l| l == 1.0).count() as f64;
        let neg = n as f64 - pos;
        let mut fpr = vec![0.0];
        let mut tpr = vec![0.0];
        let (mut tp, mut fp) = (0.0, 0.0);
        for &i in &order {
            if labels[i] == 1.0 {
                tp += 1.0;
            } else {
                fp += 1.0;
            }
            fpr.push(fp / neg);
            tpr.push(tp / pos);
        }

        let mut output = KernelOutput::default();
        output.insert_table("coefficients", coefs);
        output.insert_table("fit", fit);
        output.insert_recipe(
            PlotRecipe::new("roc", PlotKind::Roc)
                .with_series(PlotSeries::points(&target.name, fpr, tpr))
                .with_labels("figure-roc", "axis-fpr", "axis-tpr"),
        );
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::kernel::MissingPolicy;
    use crate::schema::input::{BindRule, Cardinality, InputSchema, RoleSlot, ValueKindSet};
    use crate::schema::params::ParamSchema;
    use crate::schema::{validate, Validated};
    use std::collections::BTreeMap;

    fn schema() -> InputSchema {
        InputSchema::new(vec![
            RoleSlot::new(
                Role::Target,
                Cardinality::ExactlyOne,
                ValueKindSet::NUMERIC,
                BindRule::LastColumn,
            ),
            RoleSlot::new(
                Role::Feature,
                Cardinality::OneOrMore,
                ValueKindSet::NUMERIC,
                BindRule::AllRemaining,
            ),
        ])
    }

    fn kernel_input<'a>(
        frame: &'a Frame,
        binding: &'a crate::schema::Binding,
        params: &'a crate::schema::ParamValues,
    ) -> KernelInput<'a> {
        KernelInput { frame, binding, params, missing: MissingPolicy::DropRow }
    }

    #[test]
    fn ols_recovers_a_noisy_line() {
        let xs: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let noise = [0.1, -0.2, 0.05, 0.15, -0.1, 0.2, -0.05, 0.1, -0.15, 0.05, 0.1, -0.2,
            0.05, 0.15, -0.1, 0.2, -0.05, 0.1, -0.15, 0.05];
        let ys: Vec<f64> = xs.iter().zip(noise.iter()).map(|(x, e)| 2.0 + 3.0 * x + e).collect();
        let frame =
            Frame::new(vec![Column::numeric("x", xs), Column::numeric("y", ys)]).unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &schema(), &BTreeMap::new(), 3).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let out = LinearRegressionKernel
            .run(&kernel_input(&frame, &binding, &params))
            .unwrap();

        let coefs = out.table("coefficients").unwrap();
        let Cell::Statistic(intercept) = coefs.cells[0][0] else { panic!("intercept") };
        let Cell::Statistic(slope) = coefs.cells[1][0] else { panic!("slope") };
        assert!((intercept - 2.0).abs() < 0.2);
        assert!((slope - 3.0).abs() < 0.05);

        let fit = out.table("fit").unwrap();
        let Cell::Statistic(r2) = fit.cells[0][0] else { panic!("r2") };
        assert!(r2 > 0.999);
        assert!(out.recipe("actual-vs-predicted").is_some());
    }

    #[test]
    fn collinear_features_are_singular() {
        let frame = Frame::new(vec![
            Column::numeric("a", vec![1.0, 2.0, 3.0, 4.0, 5.0]),
            Column::numeric("b", vec![2.0, 4.0, 6.0, 8.0, 10.0]),
            Column::numeric("y", vec![1.0, 2.0, 2.5, 4.0, 5.5]),
        ])
        .unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &schema(), &BTreeMap::new(), 3).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let err = LinearRegressionKernel
            .run(&kernel_input(&frame, &binding, &params))
            .unwrap_err();
        assert!(matches!(err, Fault::NumericFailure(_)));
    }

    #[test]
    fn logistic_separates_shifted_classes() {
        // Overlapping classes keep the IRLS fit finite.
        let xs: Vec<f64> = vec![
            0.5, 1.0, 1.3, 1.8, 2.0, 2.2, 2.5, 2.8, 1.5, 0.8, 1.9, 2.4, 2.6, 3.0, 3.3, 3.6,
            2.1, 3.9, 4.2, 2.9,
        ];
        let ys: Vec<f64> = (0..20).map(|i| if i < 10 { 0.0 } else { 1.0 }).collect();
        let frame =
            Frame::new(vec![Column::numeric("x", xs), Column::numeric("y", ys)]).unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &schema(), &BTreeMap::new(), 3).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let out = LogisticRegressionKernel
            .run(&kernel_input(&frame, &binding, &params))
            .unwrap();
        let coefs = out.table("coefficients").unwrap();
        let Cell::Statistic(slope) = coefs.cells[1][0] else { panic!("slope") };
        assert!(slope > 0.0);
        let fit = out.table("fit").unwrap();
        let Cell::Statistic(area) = fit.cells[0][2] else { panic!("auc") };
        assert!(area > 0.8);
        assert!(out.recipe("roc").is_some());
    }

    #[test]
    fn auc_is_one_for_perfect_ranking() {
        let scores = [0.1, 0.2, 0.8, 0.9];
        let labels = [0.0, 0.0, 1.0, 1.0];
        assert_eq!(auc(&scores, &labels).unwrap(), 1.0);
    }

    #[test]
    fn non_binary_target_is_rejected() {
        let frame = Frame::new(vec![
            Column::numeric("x", vec![1.0, 2.0, 3.0, 4.0]),
            Column::numeric("y", vec![0.0, 1.0, 2.0, 1.0]),
        ])
        .unwrap();
        let Validated::Complete(binding) =
            validate(&frame, &schema(), &BTreeMap::new(), 3).unwrap()
        else {
            panic!("expected binding");
        };
        let params = ParamSchema::empty().resolve(&BTreeMap::new()).unwrap();
        let err = LogisticRegressionKernel
            .run(&kernel_input(&frame, &binding, &params))
            .unwrap_err();
        assert!(matches!(err, Fault::NumericFailure(_)));
    }
}
