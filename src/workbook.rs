//! Workbook writer: serializes a [`Report`] into an xlsx file.
//!
//! Produces three sheets:
//! - "Results": one row per sample well
//! - "Summary": one row per group, with a column chart of Mean and Std Dev
//! - "Standard_Curve": control data, fitted equation, R², C0 and a scatter
//!   chart with a linear trend line showing its equation and R²
//!
//! Numeric logic lives upstream; this module only lays out cells and charts.
use std::path::Path;

use polars::prelude::*;
use rust_xlsxwriter::{
    Chart, ChartFormat, ChartLine, ChartTrendline, ChartTrendlineType, ChartType, Color,
    Workbook, Worksheet, XlsxError,
};

use crate::error::AssayError;
use crate::report::Report;
use crate::schema::{sheets, summary};

// ── Layout ──────────────────────────────────────────────────────────────────

const SUMMARY_CHART_ANCHOR: (u32, u16) = (1, 5); // F2
const CURVE_CHART_ANCHOR: (u32, u16) = (2, 3); // D3
// A11, or two rows below the control table when that is longer
const CURVE_STATS_ROW: u32 = 10;

// 15 cm x 8 cm at 96 dpi
const CURVE_CHART_WIDTH_PX: u32 = 567;
const CURVE_CHART_HEIGHT_PX: u32 = 302;

const INTAKE_AXIS_TITLE: &str = "Daily food intake per fly (µl)";
const CONCENTRATION_AXIS_TITLE: &str = "Concentration (µg/µl)";
const UNDEFINED_SPREAD_NOTE: &str =
    "Std Dev is left blank for groups with a single sample (undefined).";

// ── Entry points ────────────────────────────────────────────────────────────

/// Write `report` to `path`, replacing any existing file.
pub fn write_report(report: &Report, path: &Path) -> Result<(), AssayError> {
    let write_err = |source| AssayError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = build_workbook(report).map_err(write_err)?;
    workbook.save(path).map_err(write_err)?;
    tracing::info!(path = %path.display(), "wrote results workbook");
    Ok(())
}

/// Lay out the full workbook in memory.
pub fn build_workbook(report: &Report) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();

    let results = workbook.add_worksheet().set_name(sheets::RESULTS)?;
    write_frame(results, &report.results)?;
    results.autofit();

    let summary_sheet = workbook.add_worksheet().set_name(sheets::SUMMARY)?;
    write_summary(summary_sheet, report)?;
    summary_sheet.autofit();

    let curve_sheet = workbook.add_worksheet().set_name(sheets::STANDARD_CURVE)?;
    write_standard_curve(curve_sheet, report)?;
    curve_sheet.autofit();

    Ok(workbook)
}

// ── Sheets ──────────────────────────────────────────────────────────────────

fn write_summary(sheet: &mut Worksheet, report: &Report) -> Result<(), XlsxError> {
    write_frame(sheet, &report.summary)?;

    let groups = report.summary.height() as u32;
    if report.has_undefined_spread() {
        sheet.write_string(groups + 2, 0, UNDEFINED_SPREAD_NOTE)?;
    }
    if groups == 0 {
        return Ok(());
    }

    let mut chart = Chart::new(ChartType::Column);
    chart.title().set_name("Food Intake");
    chart.x_axis().set_name(summary::GROUP);
    chart.y_axis().set_name(INTAKE_AXIS_TITLE);

    // Mean and Std Dev sit in columns B and C, groups in column A.
    for col in [1u16, 2] {
        chart
            .add_series()
            .set_name((sheets::SUMMARY, 0, col))
            .set_categories((sheets::SUMMARY, 1, 0, groups, 0))
            .set_values((sheets::SUMMARY, 1, col, groups, col));
    }

    let (row, col) = SUMMARY_CHART_ANCHOR;
    sheet.insert_chart(row, col, &chart)?;
    Ok(())
}

fn write_standard_curve(sheet: &mut Worksheet, report: &Report) -> Result<(), XlsxError> {
    write_frame(sheet, &report.calibration)?;
    let points = report.calibration.height() as u32;

    let stats_row = CURVE_STATS_ROW.max(points + 2);
    let stats = [
        ("Standard curve equation:", report.equation()),
        ("R²:", report.r_squared_text()),
        ("C0 (µg/µl):", report.c0_text()),
    ];
    for (offset, (label, value)) in stats.iter().enumerate() {
        let row = stats_row + offset as u32;
        sheet.write_string(row, 0, *label)?;
        sheet.write_string(row, 1, value)?;
    }

    if points == 0 {
        return Ok(());
    }

    let mut trendline = ChartTrendline::new();
    trendline
        .set_type(ChartTrendlineType::Linear)
        .display_equation(true)
        .display_r_squared(true)
        .set_format(ChartFormat::new().set_line(ChartLine::new().set_color(Color::Red)));

    let mut chart = Chart::new(ChartType::Scatter);
    chart.title().set_name("Standard Curve");
    chart.x_axis().set_name("OD Value");
    chart.y_axis().set_name(CONCENTRATION_AXIS_TITLE);
    chart
        .set_width(CURVE_CHART_WIDTH_PX)
        .set_height(CURVE_CHART_HEIGHT_PX);
    chart
        .add_series()
        .set_name("Standard Data")
        .set_categories((sheets::STANDARD_CURVE, 1, 0, points, 0))
        .set_values((sheets::STANDARD_CURVE, 1, 1, points, 1))
        .set_trendline(&trendline);

    let (row, col) = CURVE_CHART_ANCHOR;
    sheet.insert_chart(row, col, &chart)?;
    Ok(())
}

// ── Cells ───────────────────────────────────────────────────────────────────

/// Header row plus one row per frame row, starting at A1.
/// Numbers stay numeric; nulls become blank cells.
fn write_frame(sheet: &mut Worksheet, df: &DataFrame) -> Result<(), XlsxError> {
    for (col_idx, column) in df.get_columns().iter().enumerate() {
        let col = col_idx as u16;
        sheet.write_string(0, col, column.name().as_str())?;

        for (i, value) in column.as_materialized_series().iter().enumerate() {
            let row = i as u32 + 1;
            match value {
                AnyValue::Null => {}
                AnyValue::Float64(v) => {
                    sheet.write_number(row, col, v)?;
                }
                AnyValue::UInt32(v) => {
                    sheet.write_number(row, col, v)?;
                }
                AnyValue::String(s) => {
                    sheet.write_string(row, col, s)?;
                }
                other => {
                    sheet.write_string(row, col, other.to_string())?;
                }
            }
        }
    }
    Ok(())
}
