//! Run configuration: assay constants and the fixed plate geometry.
//!
//! Every field has a default matching the standard BCA feeding layout, so
//! an empty TOML file (or no file at all) reproduces the classic run:
//! sheet "OD", controls in C25:C32, baseline in D25:D32, ten sample groups
//! in E..N and a total volume of 20 µl.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AssayError;
use crate::schema::sheets;

/// Known concentrations (µg/µl) of the eight standard wells, top to bottom.
pub const DEFAULT_STANDARDS: [f64; 8] = [0.0, 0.125, 0.25, 0.5, 0.75, 1.0, 1.5, 2.0];

/// Total liquid volume per well (µl).
pub const DEFAULT_VOLUME_UL: f64 = 20.0;

pub const DEFAULT_OUTPUT_SUFFIX: &str = "_RESULT";

/// Last row of an xlsx worksheet.
pub const MAX_SHEET_ROW: u32 = 1_048_576;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssayConfig {
    /// Total volume `V` in the consumption formula `I = (1 - C / C0) * V`.
    pub volume_ul: f64,
    /// Known standard concentrations, paired positionally with control wells.
    pub standards: Vec<f64>,
    pub layout: PlateLayout,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlateLayout {
    pub sheet: String,
    /// 1-based sheet row holding well row 1 of every column block.
    pub first_row: u32,
    pub control_column: char,
    pub baseline_column: char,
    /// Sample group columns, in read order.
    pub sample_columns: Vec<char>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Inserted between the input file stem and the extension.
    pub suffix: String,
}

impl Default for AssayConfig {
    fn default() -> Self {
        Self {
            volume_ul: DEFAULT_VOLUME_UL,
            standards: DEFAULT_STANDARDS.to_vec(),
            layout: PlateLayout::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for PlateLayout {
    fn default() -> Self {
        Self {
            sheet: sheets::OD.to_string(),
            first_row: 25,
            control_column: 'C',
            baseline_column: 'D',
            sample_columns: ('E'..='N').collect(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_OUTPUT_SUFFIX.to_string(),
        }
    }
}

impl AssayConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, AssayError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, AssayError> {
        let text = fs::read_to_string(&path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.as_ref().display(), "loaded assay configuration");
        Ok(config)
    }

    /// Replace the total volume, re-checking it.
    pub fn with_volume_ul(mut self, volume_ul: f64) -> Result<Self, AssayError> {
        self.volume_ul = volume_ul;
        self.validate()?;
        Ok(self)
    }

    /// Number of wells read from each column block.
    pub fn rows_per_column(&self) -> u32 {
        self.standards.len() as u32
    }

    pub fn validate(&self) -> Result<(), AssayError> {
        if !self.volume_ul.is_finite() || self.volume_ul <= 0.0 {
            return Err(AssayError::Config(format!(
                "volume_ul must be a positive number, got {}",
                self.volume_ul
            )));
        }
        if self.standards.len() < 2 {
            return Err(AssayError::Config(format!(
                "at least 2 standard concentrations are required, got {}",
                self.standards.len()
            )));
        }
        if let Some(bad) = self.standards.iter().find(|c| !c.is_finite()) {
            return Err(AssayError::Config(format!(
                "standard concentrations must be finite, got {bad}"
            )));
        }
        if self.output.suffix.is_empty() {
            return Err(AssayError::Config(
                "output suffix must not be empty".to_string(),
            ));
        }
        self.layout.validate()?;

        // Every column block must fit on the sheet.
        let last_row = self
            .layout
            .first_row
            .checked_add(self.rows_per_column() - 1)
            .filter(|&row| row <= MAX_SHEET_ROW);
        if last_row.is_none() {
            return Err(AssayError::Config(format!(
                "first_row {} with {} standards runs past sheet row {MAX_SHEET_ROW}",
                self.layout.first_row,
                self.standards.len()
            )));
        }
        Ok(())
    }
}

impl PlateLayout {
    pub fn validate(&self) -> Result<(), AssayError> {
        if self.sheet.trim().is_empty() {
            return Err(AssayError::Config("sheet name must not be empty".into()));
        }
        if self.first_row == 0 {
            return Err(AssayError::Config(
                "first_row is 1-based and must be at least 1".into(),
            ));
        }
        if self.sample_columns.is_empty() {
            return Err(AssayError::Config(
                "at least one sample column is required".into(),
            ));
        }

        let mut seen = HashSet::new();
        for column in self.all_columns() {
            if !column.is_ascii_uppercase() {
                return Err(AssayError::Config(format!(
                    "column '{column}' must be a single letter A-Z"
                )));
            }
            if !seen.insert(column) {
                return Err(AssayError::Config(format!(
                    "column '{column}' is assigned more than once"
                )));
            }
        }
        Ok(())
    }

    fn all_columns(&self) -> impl Iterator<Item = char> + '_ {
        [self.control_column, self.baseline_column]
            .into_iter()
            .chain(self.sample_columns.iter().copied())
    }
}
