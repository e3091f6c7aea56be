use polars::prelude::*;

use salesboard_core::channels::channel_stats;
use salesboard_core::status::status_distribution;
use salesboard_core::{ReportError, SchemaCapabilities};

fn caps() -> SchemaCapabilities {
    SchemaCapabilities {
        has_status: true,
        has_channel: true,
        ..Default::default()
    }
}

fn sample_df() -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            "channel".into(),
            [
                Some("홈페이지"),
                Some("홈페이지"),
                Some("소개"),
                Some("홈페이지"),
                None,
            ]
            .as_ref(),
        )
        .into(),
        Series::new(
            "status".into(),
            [
                Some("확정"),
                Some("진행중"),
                Some("확정"),
                Some("진행 완료"),
                Some("진행중"),
            ]
            .as_ref(),
        )
        .into(),
    ])
    .unwrap()
}

#[test]
fn channels_are_ranked_by_inquiry_count() -> PolarsResult<()> {
    let stats = channel_stats(&sample_df(), &caps()).unwrap();
    assert_eq!(stats.height(), 2, "rows without a channel are skipped");

    let names = stats.column("channel")?.str()?;
    assert_eq!(names.get(0), Some("홈페이지"));
    assert_eq!(names.get(1), Some("소개"));

    let counts = stats.column("inquiry_count")?.u32()?;
    assert_eq!(counts.get(0), Some(3));
    assert_eq!(counts.get(1), Some(1));

    let successes = stats.column("success_count")?.u32()?;
    assert_eq!(successes.get(0), Some(2));
    assert_eq!(successes.get(1), Some(1));

    let rates = stats.column("confirmation_rate")?.f64()?;
    assert_eq!(rates.get(0), Some(66.7));
    assert_eq!(rates.get(1), Some(100.0));
    Ok(())
}

#[test]
fn channel_rollup_requires_the_channel_column() {
    let df = sample_df();
    let caps = SchemaCapabilities {
        has_status: true,
        ..Default::default()
    };
    match channel_stats(&df, &caps) {
        Err(ReportError::MissingColumn("channel")) => {}
        other => panic!("expected MissingColumn error, got {other:?}"),
    }
}

#[test]
fn status_distribution_counts_every_raw_value() -> PolarsResult<()> {
    let stats = status_distribution(&sample_df(), &caps()).unwrap();
    assert_eq!(stats.height(), 3);

    let names = stats.column("status")?.str()?;
    let counts = stats.column("count")?.u32()?;

    // 진행중 and 확정 both occur twice; the tie breaks by name.
    assert_eq!(names.get(0), Some("진행중"));
    assert_eq!(counts.get(0), Some(2));
    assert_eq!(names.get(1), Some("확정"));
    assert_eq!(counts.get(1), Some(2));
    assert_eq!(names.get(2), Some("진행 완료"));
    assert_eq!(counts.get(2), Some(1));
    Ok(())
}

#[test]
fn status_distribution_requires_the_status_column() {
    let df = sample_df();
    match status_distribution(&df, &SchemaCapabilities::default()) {
        Err(ReportError::MissingColumn("status")) => {}
        other => panic!("expected MissingColumn error, got {other:?}"),
    }
}
