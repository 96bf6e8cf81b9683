//! The shipped procedure catalog. Each submodule declares one or more
//! descriptors; `all` is what the registry loads at startup.

pub mod anova;
pub mod chisq;
pub mod common;
pub mod correlation;
pub mod descriptive;
pub mod forecast;
pub mod mcda;
pub mod normality;
pub mod pca;
pub mod regression;
pub mod ttest;

use crate::descriptor::AnalysisDescriptor;
use crate::error::Result;

/// Every shipped descriptor, in registration order.
pub fn all() -> Result<Vec<AnalysisDescriptor>> {
    Ok(vec![
        descriptive::descriptor()?,
        ttest::one_sample()?,
        ttest::two_sample()?,
        ttest::paired()?,
        chisq::goodness_of_fit()?,
        chisq::independence()?,
        normality::descriptor()?,
        correlation::pearson()?,
        correlation::spearman()?,
        anova::descriptor()?,
        regression::linear()?,
        regression::logistic()?,
        mcda::descriptor()?,
        pca::descriptor()?,
        forecast::descriptor()?,
    ])
}
