use std::fs;

use polars::prelude::*;

use salesboard_core::owners::{apply_selection, group_stats};
use salesboard_core::selection::{Roster, SelectionSet, DEFAULT_ACTIVE_MEMBERS};
use salesboard_core::types::GroupBy;
use salesboard_core::{ReportError, SchemaCapabilities};

fn caps() -> SchemaCapabilities {
    SchemaCapabilities {
        has_team: true,
        has_owner: true,
        has_status: true,
        has_sales: true,
        ..Default::default()
    }
}

fn sample_df() -> DataFrame {
    DataFrame::new(vec![
        Series::new(
            "owner".into(),
            [
                Some("홍길동, 김철수"),
                Some("홍길동"),
                Some("이영희"),
                None,
                Some(" "),
            ]
            .as_ref(),
        )
        .into(),
        Series::new(
            "team".into(),
            [
                Some("영업1팀"),
                Some("영업1팀"),
                Some("영업2팀"),
                Some("영업2팀"),
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
                Some("진행 완료"),
                Some("확정"),
                Some("진행중"),
            ]
            .as_ref(),
        )
        .into(),
        Series::new("revenue".into(), [3000.0, 1000.0, 2000.0, 500.0, 100.0].as_ref()).into(),
        Series::new("margin".into(), [600.0, 100.0, 0.0, 50.0, 10.0].as_ref()).into(),
    ])
    .unwrap()
}

fn group_value(stats: &DataFrame, key: &str, name: &str, column: &str) -> f64 {
    let names = stats.column(key).unwrap().str().unwrap();
    let idx = (0..stats.height())
        .find(|idx| names.get(*idx) == Some(name))
        .unwrap_or_else(|| panic!("group '{name}' missing"));
    stats
        .column(column)
        .unwrap()
        .f64()
        .unwrap()
        .get(idx)
        .unwrap()
}

fn group_count(stats: &DataFrame, key: &str, name: &str, column: &str) -> u32 {
    let names = stats.column(key).unwrap().str().unwrap();
    let idx = (0..stats.height())
        .find(|idx| names.get(*idx) == Some(name))
        .unwrap_or_else(|| panic!("group '{name}' missing"));
    stats
        .column(column)
        .unwrap()
        .u32()
        .unwrap()
        .get(idx)
        .unwrap()
}

#[test]
fn shared_rows_split_value_evenly_across_owners() {
    let stats = group_stats(&sample_df(), &caps(), GroupBy::Owner).unwrap();

    // 홍길동: 3000/2 from the shared row plus 1000 alone.
    let hong = group_value(&stats, "owner", "홍길동", "revenue_sum");
    assert!((hong - 2500.0).abs() < 1e-9);

    let kim = group_value(&stats, "owner", "김철수", "revenue_sum");
    assert!((kim - 1500.0).abs() < 1e-9);

    assert_eq!(group_count(&stats, "owner", "홍길동", "inquiry_count"), 2);
    assert_eq!(group_count(&stats, "owner", "김철수", "inquiry_count"), 1);
}

#[test]
fn exploded_revenue_sums_back_to_the_original_total() {
    let stats = group_stats(&sample_df(), &caps(), GroupBy::Owner).unwrap();

    let total: f64 = stats
        .column("revenue_sum")
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .flatten()
        .sum();
    // Rows without an owner token (600 of revenue) are out of owner grouping;
    // everything attributed stays intact.
    assert!((total - 6000.0).abs() < 1e-9);
}

#[test]
fn rows_without_owner_tokens_leave_owner_grouping_only() {
    let stats = group_stats(&sample_df(), &caps(), GroupBy::Owner).unwrap();
    assert_eq!(stats.height(), 3, "null and blank owners form no group");

    let teams = group_stats(&sample_df(), &caps(), GroupBy::Team).unwrap();
    assert_eq!(
        group_count(&teams, "team", "영업2팀", "inquiry_count"),
        2,
        "the ownerless row still counts for its team"
    );
}

#[test]
fn empty_tokens_inside_a_packed_field_do_not_dilute_the_split() {
    let df = DataFrame::new(vec![
        Series::new("owner".into(), [Some("홍길동,,김철수")].as_ref()).into(),
        Series::new("status".into(), [Some("확정")].as_ref()).into(),
        Series::new("revenue".into(), [1000.0].as_ref()).into(),
        Series::new("margin".into(), [100.0].as_ref()).into(),
    ])
    .unwrap();

    let stats = group_stats(&df, &caps(), GroupBy::Owner).unwrap();
    assert_eq!(stats.height(), 2);
    let hong = group_value(&stats, "owner", "홍길동", "revenue_sum");
    assert!((hong - 500.0).abs() < 1e-9, "split over two real owners");
}

#[test]
fn confirmation_and_margin_rates_are_computed_per_group() {
    let stats = group_stats(&sample_df(), &caps(), GroupBy::Owner).unwrap();

    // 홍길동: 2 inquiries, 1 confirmed.
    assert_eq!(group_value(&stats, "owner", "홍길동", "confirmation_rate"), 50.0);
    // 이영희: margin 0 over revenue 2000.
    assert_eq!(group_value(&stats, "owner", "이영희", "margin_rate"), 0.0);

    let teams = group_stats(&sample_df(), &caps(), GroupBy::Team).unwrap();
    assert_eq!(group_value(&teams, "team", "영업1팀", "confirmation_rate"), 50.0);
}

#[test]
fn money_columns_are_omitted_without_the_sales_capability() {
    let caps = SchemaCapabilities {
        has_owner: true,
        has_status: true,
        ..Default::default()
    };
    let df = DataFrame::new(vec![
        Series::new("owner".into(), [Some("홍길동")].as_ref()).into(),
        Series::new("status".into(), [Some("확정")].as_ref()).into(),
    ])
    .unwrap();

    let stats = group_stats(&df, &caps, GroupBy::Owner).unwrap();
    assert!(stats.column("revenue_sum").is_err());
    assert!(stats.column("confirmation_rate").is_ok());
}

#[test]
fn grouping_requires_the_key_column() {
    let df = DataFrame::new(vec![
        Series::new("status".into(), [Some("확정")].as_ref()).into()
    ])
    .unwrap();
    let caps = SchemaCapabilities {
        has_status: true,
        ..Default::default()
    };

    match group_stats(&df, &caps, GroupBy::Owner) {
        Err(ReportError::MissingColumn("owner")) => {}
        other => panic!("expected MissingColumn error, got {other:?}"),
    }
}

#[test]
fn empty_selection_is_an_error_not_an_empty_chart() {
    let stats = group_stats(&sample_df(), &caps(), GroupBy::Owner).unwrap();
    let selection = SelectionSet::default();

    match apply_selection(&stats, GroupBy::Owner, &selection) {
        Err(ReportError::EmptySelection) => {}
        other => panic!("expected EmptySelection error, got {other:?}"),
    }
}

#[test]
fn selection_keeps_only_checked_groups() {
    let stats = group_stats(&sample_df(), &caps(), GroupBy::Owner).unwrap();

    let mut selection = SelectionSet::all_of(["홍길동", "김철수", "이영희"]);
    selection.toggle("김철수");
    selection.toggle("이영희");

    let visible = apply_selection(&stats, GroupBy::Owner, &selection).unwrap();
    assert_eq!(visible.height(), 1);
    let names = visible.column("owner").unwrap().str().unwrap();
    assert_eq!(names.get(0), Some("홍길동"));
}

#[test]
fn selection_set_actions_mirror_the_checkbox_controls() {
    let mut selection = SelectionSet::all_of(["a", "b"]);
    assert_eq!(selection.len(), 2);
    assert!(selection.contains("a"));

    selection.select_none();
    assert!(selection.is_empty());

    selection.select_all(["a", "b", "c"]);
    assert_eq!(selection.len(), 3);

    selection.select_only(["b"]);
    assert_eq!(selection.iter().collect::<Vec<_>>(), vec!["b"]);

    selection.toggle("b");
    assert!(selection.is_empty());
    selection.toggle("b");
    assert!(selection.contains("b"));
}

#[test]
fn roster_defaults_to_the_built_in_active_members() {
    let roster = Roster::default();
    assert_eq!(roster.active_members.len(), DEFAULT_ACTIVE_MEMBERS.len());
    assert!(roster.active_members.iter().any(|name| name == "안광열"));
}

#[test]
fn roster_parses_from_a_toml_file() {
    let dir = std::env::temp_dir().join("salesboard-core-tests");
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    let path = dir.join(format!("{}-roster.toml", std::process::id()));
    fs::write(&path, "active_members = [\"홍길동\", \"김철수\"]\n")
        .expect("failed to write roster");

    let roster = Roster::from_path(&path).unwrap();
    assert_eq!(roster.active_members, vec!["홍길동", "김철수"]);

    let bad = dir.join(format!("{}-bad-roster.toml", std::process::id()));
    fs::write(&bad, "active_members = 3\n").expect("failed to write roster");
    match Roster::from_path(&bad) {
        Err(ReportError::Validation(message)) => {
            assert!(message.contains("bad-roster"), "unexpected message: {message}")
        }
        other => panic!("expected Validation error, got {other:?}"),
    }
}
