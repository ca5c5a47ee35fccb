//! Orchestration: read → calibrate → baseline → transform → aggregate →
//! assemble → write.
//!
//! Each stage consumes the complete output of the previous one; nothing is
//! shared or mutated between stages. Progress strings are one-way
//! notifications for whoever presents the run.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::aggregation::aggregate;
use crate::baseline::compute_c0;
use crate::calibration::{fit, StandardCurve};
use crate::config::AssayConfig;
use crate::error::AssayError;
use crate::plate::{read_plate, PlateReadings};
use crate::report::{assemble, BaselineData, Report};
use crate::transform::transform;
use crate::workbook::write_report;

// ── Progress ────────────────────────────────────────────────────────────────

/// Receives human-readable status lines while a run progresses.
pub trait ProgressSink {
    fn status(&self, message: &str);
}

impl<F: Fn(&str)> ProgressSink for F {
    fn status(&self, message: &str) {
        self(message)
    }
}

/// Discards every status line.
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn status(&self, _message: &str) {}
}

/// Events emitted by a background run.
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    Status(String),
    Completed(PathBuf),
    Failed(String),
}

impl ProgressSink for Sender<ProgressEvent> {
    fn status(&self, message: &str) {
        // A dropped receiver only means nobody is listening any more.
        let _ = self.send(ProgressEvent::Status(message.to_string()));
    }
}

// ── Pipeline ────────────────────────────────────────────────────────────────

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: PathBuf,
    pub report: Report,
}

impl RunOutcome {
    pub fn curve(&self) -> &StandardCurve {
        &self.report.curve
    }

    pub fn c0(&self) -> f64 {
        self.report.c0
    }
}

#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: AssayConfig,
}

impl Pipeline {
    pub fn new(config: AssayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AssayConfig {
        &self.config
    }

    /// Pure core: plate readings in, report out.
    pub fn analyze(&self, plate: &PlateReadings) -> Result<Report, AssayError> {
        self.analyze_with(plate, &NoProgress)
    }

    fn analyze_with(
        &self,
        plate: &PlateReadings,
        progress: &dyn ProgressSink,
    ) -> Result<Report, AssayError> {
        let control_od = plate.control_od();
        let baseline_od = plate.baseline_od();

        progress.status("Fitting standard curve...");
        let curve = fit(&control_od, &self.config.standards)?;

        progress.status("Computing baseline concentration C0...");
        let c0 = compute_c0(&baseline_od, &curve)?;

        progress.status("Analysing sample wells...");
        let records = transform(&plate.samples, &curve, c0, self.config.volume_ul)?;

        progress.status("Aggregating groups...");
        let summaries = aggregate(&records)?;

        assemble(
            &records,
            &summaries,
            &curve,
            BaselineData {
                control_od: &control_od,
                standards: &self.config.standards,
                baseline_od: &baseline_od,
            },
            c0,
        )
    }

    /// Read `input`, analyse it and write the results workbook.
    ///
    /// The output goes to `output` when given, otherwise next to the input
    /// (see [`output_path_for`]).
    pub fn run(
        &self,
        input: &Path,
        output: Option<&Path>,
        progress: &dyn ProgressSink,
    ) -> Result<RunOutcome, AssayError> {
        let output_path = match output {
            Some(path) => path.to_path_buf(),
            None => output_path_for(input, &self.config.output.suffix),
        };
        tracing::info!(
            input = %input.display(),
            output = %output_path.display(),
            volume_ul = self.config.volume_ul,
            "starting feeding analysis"
        );

        progress.status("Loading workbook...");
        let plate = read_plate(input, &self.config)?;

        let report = self.analyze_with(&plate, progress)?;

        progress.status("Writing results workbook...");
        write_report(&report, &output_path)?;

        Ok(RunOutcome {
            output_path,
            report,
        })
    }
}

/// `<dir>/<stem><suffix>.xlsx` for an input at `<dir>/<stem>.<ext>`.
pub fn output_path_for(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .unwrap_or_else(|| OsStr::new("plate"))
        .to_string_lossy();
    input.with_file_name(format!("{stem}{suffix}.xlsx"))
}

// ── Background execution ────────────────────────────────────────────────────

/// A run executing on a worker thread.
///
/// Dropping the handle detaches the worker; its result is then discarded.
pub struct BackgroundRun {
    events: Receiver<ProgressEvent>,
    handle: JoinHandle<Result<RunOutcome, AssayError>>,
}

impl BackgroundRun {
    pub fn events(&self) -> &Receiver<ProgressEvent> {
        &self.events
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> Result<RunOutcome, AssayError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(panic) => std::panic::resume_unwind(panic),
        }
    }
}

/// Run `pipeline` on a worker thread, streaming [`ProgressEvent`]s.
///
/// The final event is always `Completed` or `Failed`.
pub fn spawn(pipeline: Pipeline, input: PathBuf, output: Option<PathBuf>) -> BackgroundRun {
    let (tx, events) = mpsc::channel();
    let handle = thread::spawn(move || {
        let result = pipeline.run(&input, output.as_deref(), &tx);
        let event = match &result {
            Ok(outcome) => ProgressEvent::Completed(outcome.output_path.clone()),
            Err(err) => {
                tracing::error!(input = %input.display(), error = %err, "feeding analysis failed");
                ProgressEvent::Failed(err.to_string())
            }
        };
        let _ = tx.send(event);
        result
    });
    BackgroundRun { events, handle }
}
