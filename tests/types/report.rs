use step_rail::{Chain, TraceReport};

use crate::types::divide;

#[test]
fn report_copies_every_step() {
    let report = Chain::of(2).map_safe(|n| n * 5).labeled("scale").get_result().report();

    assert_eq!(report.len(), 2);
    let scale = &report.steps[0];
    assert_eq!(scale.label.as_deref(), Some("scale"));
    assert_eq!(scale.input.as_deref(), Some("2"));
    assert_eq!(scale.output.as_deref(), Some("10"));
    assert!(scale.file.ends_with("report.rs"));
    assert!(scale.line > 0);
}

#[test]
fn first_failure_finds_failed_step() {
    let report = Chain::of(8)
        .map(|n| divide(*n, 0))
        .map_on_error(|_| Ok(0))
        .map(|n| divide(*n, 0))
        .get_result()
        .report();

    let failure = report.first_failure().unwrap();
    assert_eq!(failure.error.as_deref(), Some("cannot divide 0 by zero"));
    assert_eq!(report.steps.iter().filter(|step| step.error.is_some()).count(), 2);
}

#[test]
fn successful_report_has_no_failure() {
    let report = Chain::of(1).get_result().report();
    assert!(report.first_failure().is_none());
    assert!(!report.is_empty());
}

#[test]
fn nested_history_becomes_child_report() {
    let report = Chain::of(3).flat_map(|n| Chain::of(*n).map_safe(|m| m - 1)).get_result().report();
    let child = report.steps[0].child.as_deref().unwrap();

    assert_eq!(child.len(), 2);
    assert_eq!(child.steps[0].output.as_deref(), Some("2"));
    assert!(report.steps[1].child.is_none());
}

#[test]
fn default_report_is_empty() {
    let report = TraceReport::default();
    assert!(report.is_empty());
    assert_eq!(report.len(), 0);
}

#[cfg(feature = "serde")]
#[test]
fn report_serializes_to_json() {
    let report = Chain::of(3).map(|n| divide(*n, 0)).get_result().report();
    let json = serde_json::to_value(&report).unwrap();

    assert_eq!(json["steps"][0]["error"], "cannot divide 3 by zero");
    assert_eq!(json["steps"][1]["output"], "3");

    let restored: TraceReport = serde_json::from_value(json).unwrap();
    assert_eq!(restored, report);
}
