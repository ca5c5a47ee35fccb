//! BCA feeding-assay analysis: plate-reader OD values → standard curve →
//! calibrated concentrations → per-well food intake → per-group statistics
//! → results workbook with charts.

pub mod aggregation;
pub mod baseline;
pub mod calibration;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod plate;
pub mod report;
pub mod schema;
pub mod transform;
pub mod workbook;

#[cfg(feature = "python")]
mod model;

pub use config::AssayConfig;
pub use error::{AssayError, ErrorKind};
pub use pipeline::{Pipeline, ProgressEvent, ProgressSink, RunOutcome};

#[cfg(feature = "python")]
mod python {
    use pyo3::prelude::*;
    use pyo3::types::PyModule;

    use crate::model::{AnalysisResult, FeedingModel};
    use crate::schema;

    /// Export schema constants as Python submodules
    fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
        // Sheets
        let sheets = PyModule::new(m.py(), "sheets")?;
        sheets.add("OD", schema::sheets::OD)?;
        sheets.add("RESULTS", schema::sheets::RESULTS)?;
        sheets.add("SUMMARY", schema::sheets::SUMMARY)?;
        sheets.add("STANDARD_CURVE", schema::sheets::STANDARD_CURVE)?;
        m.add_submodule(&sheets)?;

        // Results
        let results = PyModule::new(m.py(), "results")?;
        results.add("INDEX", schema::results::INDEX)?;
        results.add("GROUP", schema::results::GROUP)?;
        results.add("OD", schema::results::OD)?;
        results.add("CONCENTRATION", schema::results::CONCENTRATION)?;
        results.add("FOOD_INTAKE", schema::results::FOOD_INTAKE)?;
        m.add_submodule(&results)?;

        // Summary
        let summary = PyModule::new(m.py(), "summary")?;
        summary.add("GROUP", schema::summary::GROUP)?;
        summary.add("MEAN", schema::summary::MEAN)?;
        summary.add("STD_DEV", schema::summary::STD_DEV)?;
        summary.add("SAMPLES", schema::summary::SAMPLES)?;
        m.add_submodule(&summary)?;

        // Calibration
        let calibration = PyModule::new(m.py(), "calibration")?;
        calibration.add("OD", schema::calibration::OD)?;
        calibration.add("CONCENTRATION", schema::calibration::CONCENTRATION)?;
        calibration.add("BASELINE_OD", schema::calibration::BASELINE_OD)?;
        m.add_submodule(&calibration)?;

        Ok(())
    }

    #[pymodule]
    fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_class::<FeedingModel>()?;
        m.add_class::<AnalysisResult>()?;
        add_schema_exports(m)?;
        Ok(())
    }
}
