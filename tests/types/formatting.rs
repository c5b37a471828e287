use step_rail::advanced::{HistoryFormatConfig, HistoryFormatter};
use step_rail::{Chain, ChainResult, Step};

use crate::types::divide;

fn no_call_sites(config: HistoryFormatConfig) -> HistoryFormatConfig {
    HistoryFormatConfig { show_call_site: false, ..config }
}

fn three_steps() -> ChainResult<i32> {
    Chain::of(3).map_safe(|n| n * 3).map_safe(|n| n + 1).get_result()
}

#[test]
fn default_config_renders_one_line_per_step() {
    let rendered = three_steps().render(&no_call_sites(HistoryFormatConfig::default()));
    assert_eq!(rendered, "#0 in: 9 out: 10\n#1 in: 3 out: 9\n#2 in: <none> out: 3");
}

#[test]
fn call_sites_point_at_this_file() {
    let rendered = three_steps().render(&HistoryFormatConfig::default());

    assert_eq!(rendered.lines().count(), 3);
    assert!(rendered.lines().all(|line| line.contains(file!())));
}

#[test]
fn compact_config_fits_on_one_line() {
    let rendered = three_steps().render(&no_call_sites(HistoryFormatConfig::compact()));
    assert_eq!(rendered, "out: 10 | out: 9 | out: 3");
}

#[test]
fn failed_step_renders_error_instead_of_output() {
    let result = Chain::of(6).map(|n| divide(*n, 0)).get_result();
    let rendered = result.render(&no_call_sites(HistoryFormatConfig::default()));

    assert_eq!(rendered, "#0 in: 6 error: cannot divide 6 by zero\n#1 in: <none> out: 6");
}

#[test]
fn nested_history_is_indented_below_its_step() {
    let result = Chain::of(1).flat_map(|n| Chain::of(n + 1).map_safe(|m| m * 2)).get_result();
    let rendered = result.render(&no_call_sites(HistoryFormatConfig::default()));

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(
        lines,
        ["#0 in: 1 out: 4", "  #0 in: 2 out: 4", "  #1 in: <none> out: 2", "#1 in: <none> out: 1"]
    );
}

#[test]
fn pretty_config_prefixes_steps() {
    let result = Chain::of(1).flat_map(|n| Chain::of(*n)).get_result();
    let rendered = result.render(&no_call_sites(HistoryFormatConfig::pretty()));

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "├─ #0 in: 1 out: 1");
    assert_eq!(lines[1], "│  ├─ #0 in: <none> out: 1");
}

#[test]
fn strings_render_with_debug_quotes() {
    let result = Chain::of("id").map_safe(|s| s.to_uppercase()).get_result();
    let rendered = result.render(&no_call_sites(HistoryFormatConfig::compact()));
    assert_eq!(rendered, "out: \"ID\" | out: \"id\"");
}

struct Outputs;

impl HistoryFormatter for Outputs {
    fn format_step(&self, _index: usize, step: &dyn Step) -> String {
        match step.output() {
            Some(value) => format!("{:?}", value),
            None => "-".into(),
        }
    }

    fn separator(&self) -> &str {
        ","
    }
}

#[test]
fn custom_formatter_controls_every_line() {
    let result = three_steps();
    assert_eq!(Outputs.format_history(result.history().as_step()), "10,9,3");

    let empty = Chain::of(1).filter_safe(|_| false).get_result();
    assert_eq!(Outputs.format_history(empty.history().as_step()), "-,1");
}

#[test]
fn trait_defaults_render_with_pipes() {
    struct Plain;
    impl HistoryFormatter for Plain {}

    let result = Chain::of(2).get_result();
    let rendered = Plain.format_history(result.history().as_step());

    assert!(rendered.starts_with("#0 "));
    assert!(rendered.ends_with(" | in: <none> | out: 2"));
}

#[cfg(feature = "serde")]
#[test]
fn config_round_trips_through_json() {
    let config = HistoryFormatConfig::pretty();
    let json = serde_json::to_string(&config).unwrap();
    let restored: HistoryFormatConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, config);
}
