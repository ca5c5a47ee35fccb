//! Input schema: maps the fixed plate geometry of the "OD" sheet onto
//! strongly typed [`WellReading`]s.
//!
//! Every cell is validated up front, so arithmetic further down the
//! pipeline only ever sees finite numbers. The first bad cell aborts the
//! whole run and is reported by its sheet position.

use std::fmt;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::config::{AssayConfig, PlateLayout};
use crate::error::AssayError;

/// A1-style sheet position (1-based row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRef {
    pub column: char,
    pub row: u32,
}

impl CellRef {
    pub fn new(column: char, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based `(row, column)` as used by calamine.
    pub fn position(&self) -> (u32, u32) {
        (self.row - 1, self.column as u32 - 'A' as u32)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column, self.row)
    }
}

/// One OD measurement at a known plate position.
#[derive(Debug, Clone, PartialEq)]
pub struct WellReading {
    /// Column letter + row within the block, e.g. `E3`.
    pub well: String,
    pub column: char,
    /// Row within the column block, starting at 1.
    pub row: u32,
    pub cell: CellRef,
    pub od: f64,
}

impl WellReading {
    pub fn new(column: char, row: u32, cell: CellRef, od: f64) -> Self {
        Self {
            well: format!("{column}{row}"),
            column,
            row,
            cell,
            od,
        }
    }

    /// Group identifier of the well (its column letter).
    pub fn group(&self) -> String {
        self.column.to_string()
    }
}

/// All wells of one plate, split by role.
#[derive(Debug, Clone, PartialEq)]
pub struct PlateReadings {
    pub controls: Vec<WellReading>,
    pub baseline: Vec<WellReading>,
    /// Column-major: sample columns left to right, rows top to bottom.
    pub samples: Vec<WellReading>,
}

impl PlateReadings {
    /// Read the plate out of an already loaded sheet range.
    ///
    /// An invalid layout is rejected before any cell is touched.
    pub fn from_range(range: &Range<Data>, config: &AssayConfig) -> Result<Self, AssayError> {
        config.validate()?;
        let layout = &config.layout;
        let rows = config.rows_per_column();

        let controls = read_column(range, layout, layout.control_column, rows)?;
        let baseline = read_column(range, layout, layout.baseline_column, rows)?;

        let mut samples = Vec::with_capacity(layout.sample_columns.len() * rows as usize);
        for &column in &layout.sample_columns {
            samples.extend(read_column(range, layout, column, rows)?);
        }

        Ok(Self {
            controls,
            baseline,
            samples,
        })
    }

    pub fn control_od(&self) -> Vec<f64> {
        self.controls.iter().map(|w| w.od).collect()
    }

    pub fn baseline_od(&self) -> Vec<f64> {
        self.baseline.iter().map(|w| w.od).collect()
    }
}

/// Open `path` and read the configured plate sheet.
pub fn read_plate(path: &Path, config: &AssayConfig) -> Result<PlateReadings, AssayError> {
    let workbook_err = |source| AssayError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_err)?;
    let sheet = &config.layout.sheet;

    let available = workbook.sheet_names();
    if !available.iter().any(|name| name == sheet) {
        return Err(AssayError::MissingSheet {
            sheet: sheet.clone(),
            available,
        });
    }

    let range = workbook.worksheet_range(sheet).map_err(workbook_err)?;
    tracing::debug!(
        path = %path.display(),
        sheet = %sheet,
        height = range.height(),
        width = range.width(),
        "loaded plate sheet"
    );

    PlateReadings::from_range(&range, config)
}

fn read_column(
    range: &Range<Data>,
    layout: &PlateLayout,
    column: char,
    rows: u32,
) -> Result<Vec<WellReading>, AssayError> {
    (1..=rows)
        .map(|row| {
            let cell = CellRef::new(column, layout.first_row + row - 1);
            let od = read_od(range, &layout.sheet, cell)?;
            Ok(WellReading::new(column, row, cell, od))
        })
        .collect()
}

fn read_od(range: &Range<Data>, sheet: &str, cell: CellRef) -> Result<f64, AssayError> {
    let value = range.get_value(cell.position());
    let od = match value {
        Some(Data::Float(f)) => Some(*f),
        Some(Data::Int(i)) => Some(*i as f64),
        Some(Data::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match od {
        Some(od) if od.is_finite() => Ok(od),
        _ => Err(AssayError::NonNumericInput {
            location: format!("{sheet}!{cell}"),
            value: value.map(|v| v.to_string()).unwrap_or_default(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn filled_range(config: &AssayConfig) -> Range<Data> {
        let first = config.layout.first_row;
        let last = first + config.rows_per_column() - 1;
        let mut range = Range::new((0, 0), (last, 15));
        for row in first..=last {
            for col in 2..=13u32 {
                // OD encodes its own position: column index + row / 100
                let od = col as f64 + row as f64 / 100.0;
                range.set_value((row - 1, col), Data::Float(od));
            }
        }
        range
    }

    #[test]
    fn cell_ref_round_trips_position() {
        let cell = CellRef::new('E', 27);
        assert_eq!(cell.to_string(), "E27");
        assert_eq!(cell.position(), (26, 4));
    }

    #[test]
    fn reads_standard_geometry_in_column_major_order() {
        let config = AssayConfig::default();
        let plate = PlateReadings::from_range(&filled_range(&config), &config).unwrap();

        assert_eq!(plate.controls.len(), 8);
        assert_eq!(plate.baseline.len(), 8);
        assert_eq!(plate.samples.len(), 80);

        assert_eq!(plate.controls[0].cell, CellRef::new('C', 25));
        assert_eq!(plate.controls[0].od, 2.25);
        assert_eq!(plate.baseline[7].cell, CellRef::new('D', 32));

        let first = &plate.samples[0];
        assert_eq!(first.well, "E1");
        assert_eq!(first.group(), "E");
        assert_eq!(first.od, 4.25);

        let ninth = &plate.samples[8];
        assert_eq!(ninth.well, "F1");
        assert_eq!(ninth.cell, CellRef::new('F', 25));

        let last = plate.samples.last().unwrap();
        assert_eq!(last.well, "N8");
        assert_eq!(last.cell, CellRef::new('N', 32));
    }

    #[test]
    fn accepts_integers_and_numeric_text() {
        let config = AssayConfig::default();
        let mut range = filled_range(&config);
        range.set_value((24, 2), Data::Int(1));
        range.set_value((25, 2), Data::String(" 0.75 ".into()));

        let plate = PlateReadings::from_range(&range, &config).unwrap();
        assert_eq!(plate.controls[0].od, 1.0);
        assert_eq!(plate.controls[1].od, 0.75);
    }

    #[test]
    fn empty_sample_cell_is_reported_by_position() {
        let config = AssayConfig::default();
        let mut range = filled_range(&config);
        range.set_value((26, 4), Data::Empty);

        let err = PlateReadings::from_range(&range, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NonNumericInput);
        assert_eq!(err.location(), Some("OD!E27"));
    }

    #[test]
    fn text_and_non_finite_cells_are_rejected() {
        let config = AssayConfig::default();

        let mut range = filled_range(&config);
        range.set_value((30, 3), Data::String("overflow".into()));
        let err = PlateReadings::from_range(&range, &config).unwrap_err();
        assert_eq!(err.location(), Some("OD!D31"));
        assert!(err.to_string().contains("overflow"));

        let mut range = filled_range(&config);
        range.set_value((24, 2), Data::String("NaN".into()));
        let err = PlateReadings::from_range(&range, &config).unwrap_err();
        assert_eq!(err.location(), Some("OD!C25"));
    }

    #[test]
    fn unvalidated_layout_past_u32_rows_is_an_error() {
        let mut config = AssayConfig::default();
        config.layout.first_row = u32::MAX;
        let range: Range<Data> = Range::new((0, 0), (10, 3));
        let err = PlateReadings::from_range(&range, &config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn cells_outside_the_sheet_range_are_missing() {
        let config = AssayConfig::default();
        let range: Range<Data> = Range::new((0, 0), (10, 3));
        let err = PlateReadings::from_range(&range, &config).unwrap_err();
        assert_eq!(err.location(), Some("OD!C25"));
    }
}
