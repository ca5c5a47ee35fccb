mod common;

use _core::pipeline::{self, NoProgress, Pipeline, ProgressEvent};
use _core::schema::{results, sheets, summary};
use _core::{AssayConfig, ErrorKind};
use approx::{assert_abs_diff_eq, assert_relative_eq};
use calamine::{open_workbook_auto, Data, Reader};

use common::{alternating_std, PlateFixture};

fn cell_str(data: Option<&Data>) -> String {
    match data {
        Some(Data::String(s)) => s.clone(),
        other => panic!("expected text cell, got {other:?}"),
    }
}

fn cell_f64(data: Option<&Data>) -> f64 {
    match data {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        other => panic!("expected numeric cell, got {other:?}"),
    }
}

#[test]
fn full_run_writes_three_sheet_workbook() {
    let fixture = PlateFixture::new();
    let input = fixture.plate("20250218.OD.xlsx");

    let outcome = Pipeline::default().run(&input, None, &NoProgress).unwrap();
    assert_eq!(outcome.output_path, fixture.path("20250218.OD_RESULT.xlsx"));
    assert_relative_eq!(outcome.curve().slope, 2.0, epsilon = 1e-9);
    assert_relative_eq!(outcome.curve().intercept, 1.0, epsilon = 1e-9);
    assert_relative_eq!(outcome.curve().r_squared, 1.0, epsilon = 1e-9);
    assert_relative_eq!(outcome.c0(), 3.0, epsilon = 1e-9);

    let mut workbook = open_workbook_auto(&outcome.output_path).unwrap();
    assert_eq!(
        workbook.sheet_names(),
        [sheets::RESULTS, sheets::SUMMARY, sheets::STANDARD_CURVE]
    );

    let results_sheet = workbook.worksheet_range(sheets::RESULTS).unwrap();
    for (col, name) in results::ALL.iter().enumerate() {
        assert_eq!(cell_str(results_sheet.get_value((0, col as u32))), *name);
    }
    // 10 groups x 8 wells + header
    assert_eq!(results_sheet.height(), 81);
    assert_eq!(cell_str(results_sheet.get_value((1, 0))), "E1");
    assert_eq!(cell_str(results_sheet.get_value((1, 1))), "E");
    assert_abs_diff_eq!(
        cell_f64(results_sheet.get_value((1, 4))),
        20.0 / 3.0,
        epsilon = 1e-9
    );
    assert_eq!(cell_str(results_sheet.get_value((80, 0))), "N8");

    let summary_sheet = workbook.worksheet_range(sheets::SUMMARY).unwrap();
    for (col, name) in summary::ALL.iter().enumerate() {
        assert_eq!(cell_str(summary_sheet.get_value((0, col as u32))), *name);
    }
    assert_eq!(cell_str(summary_sheet.get_value((1, 0))), "E");
    assert_eq!(cell_str(summary_sheet.get_value((10, 0))), "N");
    assert_abs_diff_eq!(
        cell_f64(summary_sheet.get_value((1, 1))),
        10.0 / 3.0,
        epsilon = 1e-9
    );
    assert_abs_diff_eq!(
        cell_f64(summary_sheet.get_value((1, 2))),
        alternating_std(20.0 / 3.0, 0.0),
        epsilon = 1e-9
    );
    assert_eq!(cell_f64(summary_sheet.get_value((1, 3))), 8.0);

    let curve_sheet = workbook.worksheet_range(sheets::STANDARD_CURVE).unwrap();
    assert_eq!(
        cell_str(curve_sheet.get_value((10, 1))),
        "y = 2.0000x + 1.0000"
    );
    assert_eq!(cell_str(curve_sheet.get_value((11, 1))), "1.0000");
    assert_eq!(cell_str(curve_sheet.get_value((12, 1))), "3.00");
}

#[test]
fn explicit_output_path_is_honoured() {
    let fixture = PlateFixture::new();
    let input = fixture.plate("plate.xlsx");
    let output = fixture.path("custom.xlsx");

    let outcome = Pipeline::default()
        .run(&input, Some(&output), &NoProgress)
        .unwrap();
    assert_eq!(outcome.output_path, output);
    assert!(output.exists());
    assert!(!fixture.path("plate_RESULT.xlsx").exists());
}

#[test]
fn missing_od_sheet_is_rejected_before_reading_cells() {
    let fixture = PlateFixture::new();
    let input = fixture.plate_with("raw.xlsx", "Raw", |_| {});

    let err = Pipeline::default()
        .run(&input, None, &NoProgress)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingSheet);
    assert_eq!(err.location(), Some("OD"));
    assert!(err.to_string().contains("Raw"));
    assert!(!fixture.path("raw_RESULT.xlsx").exists());
}

#[test]
fn bad_cell_is_reported_by_sheet_position() {
    let fixture = PlateFixture::new();
    let input = fixture.plate_with("bad.xlsx", "OD", |sheet| {
        sheet.write_string(26, 4, "n/a").unwrap();
    });

    let err = Pipeline::default()
        .run(&input, None, &NoProgress)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NonNumericInput);
    assert_eq!(err.location(), Some("OD!E27"));
    assert!(!fixture.path("bad_RESULT.xlsx").exists());
}

#[test]
fn volume_override_scales_intake() {
    let fixture = PlateFixture::new();
    let input = fixture.plate("plate.xlsx");

    let config = AssayConfig::default().with_volume_ul(40.0).unwrap();
    let outcome = Pipeline::new(config)
        .run(&input, None, &NoProgress)
        .unwrap();

    let means = outcome
        .report
        .summary
        .column(summary::MEAN)
        .unwrap()
        .f64()
        .unwrap();
    assert_abs_diff_eq!(means.get(0).unwrap(), 20.0 / 3.0, epsilon = 1e-9);
}

#[test]
fn repeated_runs_produce_identical_tables() {
    let fixture = PlateFixture::new();
    let input = fixture.plate("plate.xlsx");
    let pipeline = Pipeline::default();

    let first = pipeline
        .run(&input, Some(&fixture.path("a.xlsx")), &NoProgress)
        .unwrap();
    let second = pipeline
        .run(&input, Some(&fixture.path("b.xlsx")), &NoProgress)
        .unwrap();

    assert!(first.report.results.equals_missing(&second.report.results));
    assert!(first.report.summary.equals_missing(&second.report.summary));
    assert_eq!(first.report.curve, second.report.curve);
}

#[test]
fn background_run_streams_status_then_completion() {
    let fixture = PlateFixture::new();
    let input = fixture.plate("plate.xlsx");

    let run = pipeline::spawn(Pipeline::default(), input, None);
    let events: Vec<ProgressEvent> = run.events().iter().collect();

    let statuses: Vec<&str> = events
        .iter()
        .filter_map(|event| match event {
            ProgressEvent::Status(message) => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        statuses,
        [
            "Loading workbook...",
            "Fitting standard curve...",
            "Computing baseline concentration C0...",
            "Analysing sample wells...",
            "Aggregating groups...",
            "Writing results workbook...",
        ]
    );

    let expected = fixture.path("plate_RESULT.xlsx");
    assert_eq!(events.last(), Some(&ProgressEvent::Completed(expected.clone())));

    let outcome = run.wait().unwrap();
    assert_eq!(outcome.output_path, expected);
    assert!(expected.exists());
}
