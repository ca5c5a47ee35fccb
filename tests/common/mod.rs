//! Synthetic plate workbooks for end-to-end runs.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use _core::config::DEFAULT_STANDARDS;
use rust_xlsxwriter::Workbook;
use tempfile::TempDir;

/// Zero-based sheet row of well row 1 (sheet row 25).
pub const FIRST_ROW: u32 = 24;
pub const CONTROL_COL: u16 = 2; // C
pub const BASELINE_COL: u16 = 3; // D
pub const SAMPLE_COLS: std::ops::RangeInclusive<u16> = 4..=13; // E..N

/// Sample OD on even well rows: concentration 2, intake 20/3 at V = 20.
pub const LOW_OD: f64 = 0.5;
/// Sample OD on odd well rows: concentration 3, intake 0.
pub const HIGH_OD: f64 = 1.0;

/// Controls follow `c = 2 * od + 1`, baseline OD is 1.0 (C0 = 3), and every
/// sample column alternates [`LOW_OD`] and [`HIGH_OD`].
pub struct PlateFixture {
    pub dir: TempDir,
}

impl PlateFixture {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("tempdir"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Standard plate on an "OD" sheet.
    pub fn plate(&self, name: &str) -> PathBuf {
        self.plate_with(name, "OD", |_| {})
    }

    /// Standard plate, then `edit` gets a last chance to overwrite cells.
    pub fn plate_with(
        &self,
        name: &str,
        sheet: &str,
        edit: impl FnOnce(&mut rust_xlsxwriter::Worksheet),
    ) -> PathBuf {
        let path = self.path(name);
        write_plate(&path, sheet, edit);
        path
    }
}

fn write_plate(path: &Path, sheet_name: &str, edit: impl FnOnce(&mut rust_xlsxwriter::Worksheet)) {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name).expect("sheet name");

    // Header clutter above the block, as plate readers emit.
    sheet.write_string(0, 0, "Plate reader export").unwrap();

    for (i, &standard) in DEFAULT_STANDARDS.iter().enumerate() {
        let row = FIRST_ROW + i as u32;
        sheet.write_number(row, CONTROL_COL, (standard - 1.0) / 2.0).unwrap();
        sheet.write_number(row, BASELINE_COL, 1.0).unwrap();
        let od = if i % 2 == 0 { LOW_OD } else { HIGH_OD };
        for col in SAMPLE_COLS {
            sheet.write_number(row, col, od).unwrap();
        }
    }

    edit(sheet);
    workbook.save(path).expect("save plate");
}

/// Sample standard deviation of a column alternating `a` and `b`, 8 rows.
pub fn alternating_std(a: f64, b: f64) -> f64 {
    let half = (a - b).abs() / 2.0;
    (8.0 * half * half / 7.0).sqrt()
}
