use crate::calibration::StandardCurve;
use crate::error::AssayError;

/// Reference "zero intake" concentration C0: the mean calibrated
/// concentration of the baseline wells.
pub fn compute_c0(baseline_od: &[f64], curve: &StandardCurve) -> Result<f64, AssayError> {
    if baseline_od.is_empty() {
        return Err(AssayError::InsufficientData {
            what: "baseline concentration (baseline wells)",
            found: 0,
            required: 1,
        });
    }
    if let Some(i) = baseline_od.iter().position(|od| !od.is_finite()) {
        return Err(AssayError::NonNumericInput {
            location: format!("baseline #{}", i + 1),
            value: baseline_od[i].to_string(),
        });
    }

    let total: f64 = baseline_od.iter().map(|&od| curve.concentration(od)).sum();
    let c0 = total / baseline_od.len() as f64;
    tracing::info!(c0, wells = baseline_od.len(), "computed baseline concentration");
    Ok(c0)
}
