//! In-memory report: everything the writer needs, already computed.
//!
//! Assembling never recomputes upstream values, it only copies them into
//! the three output tables plus the calibration metadata.

use polars::prelude::*;

use crate::aggregation::{summary_frame, GroupSummary};
use crate::calibration::StandardCurve;
use crate::error::AssayError;
use crate::schema::calibration;
use crate::transform::{results_frame, SampleRecord};

#[derive(Debug, Clone)]
pub struct Report {
    /// `Index, Group, OD, Concentration, Food intake`, in read order.
    pub results: DataFrame,
    /// `Group, Mean, Std Dev, Samples`, sorted by group.
    pub summary: DataFrame,
    /// `OD, Concentration, Baseline OD` for the standard wells.
    pub calibration: DataFrame,
    pub curve: StandardCurve,
    pub c0: f64,
}

/// Control/baseline data shown on the standard curve sheet.
#[derive(Debug, Clone, Copy)]
pub struct BaselineData<'a> {
    pub control_od: &'a [f64],
    pub standards: &'a [f64],
    pub baseline_od: &'a [f64],
}

pub fn assemble(
    records: &[SampleRecord],
    summaries: &[GroupSummary],
    curve: &StandardCurve,
    baseline: BaselineData<'_>,
    c0: f64,
) -> Result<Report, AssayError> {
    let calibration = DataFrame::new(vec![
        Column::new(calibration::OD.into(), baseline.control_od),
        Column::new(calibration::CONCENTRATION.into(), baseline.standards),
        Column::new(calibration::BASELINE_OD.into(), baseline.baseline_od),
    ])?;

    Ok(Report {
        results: results_frame(records)?,
        summary: summary_frame(summaries)?,
        calibration,
        curve: *curve,
        c0,
    })
}

impl Report {
    pub fn equation(&self) -> String {
        self.curve.equation()
    }

    pub fn r_squared_text(&self) -> String {
        format!("{:.4}", self.curve.r_squared)
    }

    pub fn c0_text(&self) -> String {
        format!("{:.2}", self.c0)
    }

    /// True when some group has a single sample and therefore no spread.
    pub fn has_undefined_spread(&self) -> bool {
        self.summary
            .column(crate::schema::summary::STD_DEV)
            .map(|c| c.null_count() > 0)
            .unwrap_or(false)
    }
}
