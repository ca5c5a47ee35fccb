//! Sample wells → concentration → consumption.

use polars::prelude::*;

use crate::calibration::StandardCurve;
use crate::error::AssayError;
use crate::plate::WellReading;
use crate::schema::results;

/// One transformed sample well.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleRecord {
    /// Group letter + row, e.g. `E3`.
    pub index: String,
    pub group: String,
    pub od: f64,
    /// µg/µl
    pub concentration: f64,
    /// Consumed volume (µl): `(1 - concentration / c0) * volume`.
    pub food_intake: f64,
}

impl SampleRecord {
    pub fn from_reading(
        well: &WellReading,
        curve: &StandardCurve,
        c0: f64,
        volume_ul: f64,
    ) -> Result<Self, AssayError> {
        if !well.od.is_finite() {
            return Err(AssayError::NonNumericInput {
                location: well.well.clone(),
                value: well.od.to_string(),
            });
        }
        if c0 == 0.0 {
            return Err(AssayError::DivisionByZero {
                well: well.well.clone(),
            });
        }

        let concentration = curve.concentration(well.od);
        Ok(Self {
            index: well.well.clone(),
            group: well.group(),
            od: well.od,
            concentration,
            food_intake: (1.0 - concentration / c0) * volume_ul,
        })
    }
}

/// Transform every sample well, preserving read order.
pub fn transform(
    wells: &[WellReading],
    curve: &StandardCurve,
    c0: f64,
    volume_ul: f64,
) -> Result<Vec<SampleRecord>, AssayError> {
    let records = wells
        .iter()
        .map(|well| SampleRecord::from_reading(well, curve, c0, volume_ul))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::info!(records = records.len(), c0, volume_ul, "transformed sample wells");
    Ok(records)
}

/// Tabular form of the transformed wells, in read order.
///
/// Columns: `Index, Group, OD, Concentration, Food intake`.
pub fn results_frame(records: &[SampleRecord]) -> Result<DataFrame, AssayError> {
    let index: Vec<&str> = records.iter().map(|r| r.index.as_str()).collect();
    let group: Vec<&str> = records.iter().map(|r| r.group.as_str()).collect();
    let od: Vec<f64> = records.iter().map(|r| r.od).collect();
    let concentration: Vec<f64> = records.iter().map(|r| r.concentration).collect();
    let intake: Vec<f64> = records.iter().map(|r| r.food_intake).collect();

    let df = DataFrame::new(vec![
        Column::new(results::INDEX.into(), &index),
        Column::new(results::GROUP.into(), &group),
        Column::new(results::OD.into(), &od),
        Column::new(results::CONCENTRATION.into(), &concentration),
        Column::new(results::FOOD_INTAKE.into(), &intake),
    ])?;
    Ok(df)
}
