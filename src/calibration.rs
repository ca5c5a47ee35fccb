//! Standard curve: ordinary least-squares fit of concentration on OD.
//!
//! Regression direction matters: concentration is the dependent variable,
//! so `slope` converts OD units into µg/µl directly.

use crate::error::AssayError;

/// Fitted OD → concentration line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StandardCurve {
    pub slope: f64,
    pub intercept: f64,
    /// Square of the Pearson correlation between OD and concentration.
    pub r_squared: f64,
}

impl StandardCurve {
    /// Calibrated concentration for one OD reading.
    pub fn concentration(&self, od: f64) -> f64 {
        self.slope * od + self.intercept
    }

    /// Trend-line text as shown on the report, e.g. `y = 2.0000x + 1.0000`.
    pub fn equation(&self) -> String {
        format!("y = {:.4}x + {:.4}", self.slope, self.intercept)
    }
}

/// Fit `known_concentrations = slope * od_values + intercept`.
///
/// Both slices are paired positionally. Fails when fewer than two distinct
/// OD values are present, since the regression is undefined then.
pub fn fit(od_values: &[f64], known_concentrations: &[f64]) -> Result<StandardCurve, AssayError> {
    if od_values.len() != known_concentrations.len() {
        return Err(AssayError::Config(format!(
            "{} control wells cannot be paired with {} standard concentrations",
            od_values.len(),
            known_concentrations.len()
        )));
    }
    check_finite(od_values, "control")?;
    check_finite(known_concentrations, "standard")?;

    let distinct = distinct_count(od_values);
    if distinct < 2 {
        return Err(AssayError::InsufficientData {
            what: "standard curve (distinct control OD values)",
            found: distinct,
            required: 2,
        });
    }

    let n = od_values.len() as f64;
    let x_mean = od_values.iter().sum::<f64>() / n;
    let y_mean = known_concentrations.iter().sum::<f64>() / n;

    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    let mut ss_xy = 0.0;
    for (&x, &y) in od_values.iter().zip(known_concentrations) {
        let dx = x - x_mean;
        let dy = y - y_mean;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
        ss_xy += dx * dy;
    }

    let slope = ss_xy / ss_xx;
    let intercept = y_mean - slope * x_mean;

    // Constant concentrations leave the correlation undefined; report 0.
    let r = if ss_yy == 0.0 {
        0.0
    } else {
        (ss_xy / (ss_xx * ss_yy).sqrt()).clamp(-1.0, 1.0)
    };

    let curve = StandardCurve {
        slope,
        intercept,
        r_squared: r * r,
    };
    tracing::info!(
        slope = curve.slope,
        intercept = curve.intercept,
        r_squared = curve.r_squared,
        points = od_values.len(),
        "fitted standard curve"
    );
    Ok(curve)
}

fn check_finite(values: &[f64], role: &str) -> Result<(), AssayError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(AssayError::NonNumericInput {
            location: format!("{role} #{}", i + 1),
            value: values[i].to_string(),
        }),
        None => Ok(()),
    }
}

fn distinct_count(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    sorted.dedup();
    sorted.len()
}
