use polars::prelude::*;

use crate::error::AssayError;
use crate::schema::{results, summary};
use crate::transform::{results_frame, SampleRecord};

/// Descriptive statistics of the consumption metric for one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: String,
    pub mean: f64,
    /// Sample standard deviation (N - 1). `None` when the group holds a
    /// single record, where the spread is undefined.
    pub std_dev: Option<f64>,
    pub count: u32,
}

/// Per-group mean, sample standard deviation and count of food intake.
///
/// Groups are returned sorted lexicographically by identifier so repeated
/// runs lay out identically regardless of read order.
pub fn aggregate(records: &[SampleRecord]) -> Result<Vec<GroupSummary>, AssayError> {
    if records.is_empty() {
        return Ok(Vec::new());
    }

    let grouped = results_frame(records)?
        .lazy()
        .group_by([col(results::GROUP)])
        .agg([
            col(results::FOOD_INTAKE).mean().alias(summary::MEAN),
            col(results::FOOD_INTAKE).std(1).alias(summary::STD_DEV),
            col(results::FOOD_INTAKE)
                .count()
                .cast(DataType::UInt32)
                .alias(summary::SAMPLES),
        ])
        .sort([summary::GROUP], SortMultipleOptions::default())
        .collect()?;

    let summaries = summaries_from_frame(&grouped)?;
    tracing::info!(groups = summaries.len(), "aggregated sample groups");
    Ok(summaries)
}

/// Read the aggregated frame back into typed rows.
fn summaries_from_frame(grouped: &DataFrame) -> Result<Vec<GroupSummary>, AssayError> {
    let groups = grouped.column(summary::GROUP)?.str()?;
    let means = grouped.column(summary::MEAN)?.f64()?;
    let std_devs = grouped.column(summary::STD_DEV)?.f64()?;
    let counts = grouped
        .column(summary::SAMPLES)?
        .as_materialized_series()
        .u32()?;

    let mut summaries = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let group = groups.get(i).ok_or_else(|| {
            PolarsError::ComputeError(format!("null group identifier at row {i}").into())
        })?;
        let count = counts.get(i).unwrap_or(0);
        let mean = means.get(i).unwrap_or(f64::NAN);
        let std_dev = if count > 1 {
            std_devs.get(i).filter(|s| s.is_finite())
        } else {
            None
        };

        tracing::debug!(group, mean, ?std_dev, count, "group summary");
        summaries.push(GroupSummary {
            group: group.to_string(),
            mean,
            std_dev,
            count,
        });
    }
    Ok(summaries)
}

/// Tabular form of the group summaries: `Group, Mean, Std Dev, Samples`.
///
/// An undefined standard deviation is stored as null, never as zero.
pub fn summary_frame(summaries: &[GroupSummary]) -> Result<DataFrame, AssayError> {
    let group: Vec<&str> = summaries.iter().map(|s| s.group.as_str()).collect();
    let mean: Vec<f64> = summaries.iter().map(|s| s.mean).collect();
    let std_dev: Vec<Option<f64>> = summaries.iter().map(|s| s.std_dev).collect();
    let count: Vec<u32> = summaries.iter().map(|s| s.count).collect();

    let df = DataFrame::new(vec![
        Column::new(summary::GROUP.into(), &group),
        Column::new(summary::MEAN.into(), &mean),
        Column::new(summary::STD_DEV.into(), &std_dev),
        Column::new(summary::SAMPLES.into(), &count),
    ])?;
    Ok(df)
}
