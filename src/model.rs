use std::path::Path;

use pyo3::prelude::*;
use pyo3_polars::PyDataFrame;

use crate::config::AssayConfig;
use crate::pipeline::{Pipeline, RunOutcome};

#[pyclass(name = "FeedingAnalysis")]
pub struct FeedingModel {
    pipeline: Pipeline,
}

#[pymethods]
impl FeedingModel {
    /// Create an analysis with the standard plate layout.
    ///
    /// `config_path`: optional TOML file overriding layout/standards/volume.
    /// `volume_ul`: total liquid volume V, overrides the config value.
    #[new]
    #[pyo3(signature = (config_path=None, volume_ul=None))]
    fn new(config_path: Option<&str>, volume_ul: Option<f64>) -> PyResult<Self> {
        let mut config = match config_path {
            Some(path) => AssayConfig::from_toml_file(path)?,
            None => AssayConfig::default(),
        };
        if let Some(volume_ul) = volume_ul {
            config = config.with_volume_ul(volume_ul)?;
        }
        Ok(Self {
            pipeline: Pipeline::new(config),
        })
    }

    /// Process one plate workbook and write the `_RESULT` workbook.
    ///
    /// `on_log` is called with each progress message (str). A GUI worker
    /// thread typically forwards these to its log view.
    #[pyo3(signature = (input_path, on_log=None, output_path=None))]
    fn run(
        &self,
        py: Python<'_>,
        input_path: &str,
        on_log: Option<PyObject>,
        output_path: Option<&str>,
    ) -> PyResult<AnalysisResult> {
        let pipeline = &self.pipeline;

        // Read, compute and write without the GIL held; only the callback
        // takes it back.
        let outcome = py.allow_threads(|| {
            let sink = |message: &str| {
                if let Some(callback) = &on_log {
                    Python::with_gil(|py| {
                        if let Err(err) = callback.call1(py, (message,)) {
                            tracing::warn!(error = %err, "progress callback raised");
                        }
                    });
                }
            };
            pipeline.run(Path::new(input_path), output_path.map(Path::new), &sink)
        })?;
        Ok(AnalysisResult { outcome })
    }

    #[getter]
    fn volume_ul(&self) -> f64 {
        self.pipeline.config().volume_ul
    }

    #[getter]
    fn standards(&self) -> Vec<f64> {
        self.pipeline.config().standards.clone()
    }

    /// Output path a run on `input_path` would write to.
    fn output_path_for(&self, input_path: &str) -> String {
        let suffix = &self.pipeline.config().output.suffix;
        path_string(&crate::pipeline::output_path_for(Path::new(input_path), suffix))
    }
}

#[pyclass(name = "AnalysisResult")]
pub struct AnalysisResult {
    outcome: RunOutcome,
}

#[pymethods]
impl AnalysisResult {
    #[getter]
    fn output_path(&self) -> String {
        path_string(&self.outcome.output_path)
    }

    #[getter]
    fn slope(&self) -> f64 {
        self.outcome.curve().slope
    }

    #[getter]
    fn intercept(&self) -> f64 {
        self.outcome.curve().intercept
    }

    #[getter]
    fn r_squared(&self) -> f64 {
        self.outcome.curve().r_squared
    }

    #[getter]
    fn c0(&self) -> f64 {
        self.outcome.c0()
    }

    #[getter]
    fn equation(&self) -> String {
        self.outcome.report.equation()
    }

    /// One row per sample well.
    #[getter]
    fn results(&self) -> PyDataFrame {
        PyDataFrame(self.outcome.report.results.clone())
    }

    /// One row per group; `Std Dev` is null for single-sample groups.
    #[getter]
    fn summary(&self) -> PyDataFrame {
        PyDataFrame(self.outcome.report.summary.clone())
    }

    #[getter]
    fn calibration(&self) -> PyDataFrame {
        PyDataFrame(self.outcome.report.calibration.clone())
    }

    fn __repr__(&self) -> String {
        format!(
            "AnalysisResult(output_path='{}', equation='{}', r_squared={}, c0={})",
            self.output_path(),
            self.equation(),
            self.outcome.report.r_squared_text(),
            self.outcome.report.c0_text(),
        )
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
