//! The numeric format policy.
//!
//! Every number in a result document is rendered here and nowhere
//! else: counts verbatim, proportions and p-values with four decimals,
//! statistics and coefficients with four decimals. Locale changes
//! never alter these strings.

/// Declarative rendering policy for table cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatPolicy {
    pub statistic_decimals: usize,
    pub proportion_decimals: usize,
}

impl Default for FormatPolicy {
    fn default() -> Self {
        FormatPolicy { statistic_decimals: 4, proportion_decimals: 4 }
    }
}

impl FormatPolicy {
    pub fn render_count(&self, value: i64) -> String {
        value.to_string()
    }

    pub fn render_statistic(&self, value: f64) -> String {
        format!("{:.*}", self.statistic_decimals, normalize_zero(value))
    }

    pub fn render_proportion(&self, value: f64) -> String {
        format!("{:.*}", self.proportion_decimals, normalize_zero(value))
    }
}

/// Avoids "-0.0000" cells.
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_render_verbatim() {
        let p = FormatPolicy::default();
        assert_eq!(p.render_count(5), "5");
        assert_eq!(p.render_count(-12), "-12");
    }

    #[test]
    fn statistics_get_four_decimals() {
        let p = FormatPolicy::default();
        assert_eq!(p.render_statistic(1.58113883), "1.5811");
        assert_eq!(p.render_statistic(3.0), "3.0000");
    }

    #[test]
    fn proportions_get_four_decimals() {
        let p = FormatPolicy::default();
        assert_eq!(p.render_proportion(0.01324), "0.0132");
        assert_eq!(p.render_proportion(0.0), "0.0000");
    }

    #[test]
    fn negative_zero_is_normalized() {
        let p = FormatPolicy::default();
        assert_eq!(p.render_statistic(-0.0), "0.0000");
    }
}
