//! gmm::report — plain-text summary of an [`EstimationResult`].
//!
//! Pure formatting: vectors with three decimals, `J` and the p-value with two,
//! framed by 60-dash rules. Nothing here computes; [`print_report`] is the
//! only place in the crate that writes to stdout.
use std::fmt;

use ndarray::Array1;

use crate::gmm::estimator::EstimationResult;

const RULE_WIDTH: usize = 60;

/// Format a vector as `[v1 v2 ...]` with three decimals.
pub fn format_vector(values: &Array1<f64>) -> String {
    let body: Vec<String> = values.iter().map(|v| format!("{v:.3}")).collect();
    format!("[{}]", body.join(" "))
}

/// Render the report for `result`.
pub fn render(result: &EstimationResult) -> String {
    result.to_string()
}

/// Print the report for `result` to stdout.
pub fn print_report(result: &EstimationResult) {
    println!("{}", render(result));
}

impl fmt::Display for EstimationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "-".repeat(RULE_WIDTH);
        writeln!(f, "{rule}")?;
        writeln!(f, "The final results are")?;
        writeln!(f, "{}", self.message)?;
        writeln!(f, "theta   =  {}", format_vector(&self.theta))?;
        writeln!(f, "s.e.    =  {}", format_vector(&self.se))?;
        writeln!(f, "t-stat  =  {}", format_vector(&self.t_stat))?;
        writeln!(f, "J-stat  = {:.2}", self.j_stat)?;
        writeln!(f, "df      =  {}", self.df)?;
        writeln!(f, "p-value = {:.2}", self.p_value)?;
        write!(f, "{rule}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Vector formatting, including non-finite entries.
    // - The full report layout.
    // -------------------------------------------------------------------------

    fn result() -> EstimationResult {
        EstimationResult {
            theta: array![1.23456, -0.5],
            message: "Optimization terminated successfully.".to_string(),
            success: true,
            j_stat: 1.2345,
            df: 2,
            p_value: 0.5391,
            se: array![0.1, 0.25],
            t_stat: array![12.3456, -2.0],
            covariance: Array2::eye(2),
            weights: Array2::eye(4),
            n_obs: 100,
            steps: Vec::new(),
        }
    }

    #[test]
    // Purpose
    // -------
    // Vectors print with three decimals; degenerate values print as-is.
    fn format_vector_uses_three_decimals() {
        assert_eq!(format_vector(&array![1.23456, -0.5]), "[1.235 -0.500]");
        assert_eq!(format_vector(&array![f64::NAN, f64::INFINITY]), "[NaN inf]");
        assert_eq!(format_vector(&Array1::zeros(0)), "[]");
    }

    #[test]
    // Purpose
    // -------
    // The rendered report has the documented line layout.
    //
    // Expect
    // ------
    // - 60-dash rules around message, vectors, `J` (2 dp), `df`, p-value
    //   (2 dp).
    fn render_produces_documented_layout() {
        let rule = "-".repeat(60);
        let expected = [
            rule.as_str(),
            "The final results are",
            "Optimization terminated successfully.",
            "theta   =  [1.235 -0.500]",
            "s.e.    =  [0.100 0.250]",
            "t-stat  =  [12.346 -2.000]",
            "J-stat  = 1.23",
            "df      =  2",
            "p-value = 0.54",
            rule.as_str(),
        ]
        .join("\n");

        assert_eq!(render(&result()), expected);
    }
}
