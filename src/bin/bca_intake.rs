use std::path::PathBuf;
use std::process::ExitCode;

use _core::pipeline::{self, Pipeline, ProgressEvent, RunOutcome};
use _core::AssayConfig;
use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "bca-intake",
    about = "Convert BCA plate-reader OD workbooks into food-intake results"
)]
struct Cli {
    /// TOML file overriding plate layout, standards or volume
    #[arg(long)]
    config: Option<PathBuf>,
    /// Total liquid volume V in µl (default 20)
    #[arg(long)]
    volume_ul: Option<f64>,
    /// Output workbook (single input only; defaults to <input>_RESULT.xlsx)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Plate workbooks containing an "OD" sheet
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    if cli.output.is_some() && cli.inputs.len() > 1 {
        bail!("--output can only be used with a single input");
    }

    let mut config = match &cli.config {
        Some(path) => AssayConfig::from_toml_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => AssayConfig::default(),
    };
    if let Some(volume_ul) = cli.volume_ul {
        config = config.with_volume_ul(volume_ul)?;
    }
    let pipeline = Pipeline::new(config);

    let mut failures = 0usize;
    for input in &cli.inputs {
        let run = pipeline::spawn(pipeline.clone(), input.clone(), cli.output.clone());
        for event in run.events().iter() {
            match event {
                ProgressEvent::Status(message) => eprintln!("{message}"),
                ProgressEvent::Completed(_) | ProgressEvent::Failed(_) => break,
            }
        }

        match run.wait() {
            Ok(outcome) => print_outcome(&outcome),
            Err(err) => {
                failures += 1;
                let location = err
                    .location()
                    .map(|l| format!(" [{l}]"))
                    .unwrap_or_default();
                eprintln!(
                    "{}: {:?}{location}: {err}",
                    input.display(),
                    err.kind()
                );
            }
        }
    }

    Ok(if failures == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    })
}

fn print_outcome(outcome: &RunOutcome) {
    let report = &outcome.report;
    println!("Results saved to: {}", outcome.output_path.display());
    println!("Standard curve: {}", report.equation());
    println!("R²: {}", report.r_squared_text());
    println!("C0 baseline concentration: {} µg/µl", report.c0_text());
}
