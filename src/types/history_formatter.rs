//! Rendering a history for logs and diagnostic sinks.
//!
//! Steps are rendered most recent first, one per line by default. The nested
//! history of a `flat_map` step is rendered right below that step, indented one
//! level deeper.

use std::fmt::Write as _;

use crate::types::history::{Step, StepValue};

/// Trait for customizing history rendering.
pub trait HistoryFormatter {
    /// Renders one step. `index` counts from the most recent step.
    fn format_step(&self, index: usize, step: &dyn Step) -> String {
        let mut line = format!("#{} {}", index, step.call_site());
        match step.error() {
            Some(error) => {
                let _ = write!(line, " | in: {} | error: {}", describe(step.input()), error);
            }
            None => {
                let (input, output) = (describe(step.input()), describe(step.output()));
                let _ = write!(line, " | in: {} | out: {}", input, output);
            }
        }
        line
    }

    fn separator(&self) -> &str {
        "\n"
    }

    /// Prefix added once per nesting level.
    fn indent(&self) -> &str {
        "  "
    }

    /// Renders `last` and every step before it.
    fn format_history(&self, last: &dyn Step) -> String {
        let mut lines = Vec::new();
        collect_lines(self, last, 0, &mut lines);
        lines.join(self.separator())
    }
}

fn collect_lines<F>(formatter: &F, last: &dyn Step, depth: usize, lines: &mut Vec<String>)
where
    F: HistoryFormatter + ?Sized,
{
    for (index, step) in last.steps().enumerate() {
        let mut line = formatter.indent().repeat(depth);
        line.push_str(&formatter.format_step(index, step));
        lines.push(line);

        if let Some(child) = step.child() {
            collect_lines(formatter, child, depth + 1, lines);
        }
    }
}

fn describe(value: Option<&dyn StepValue>) -> String {
    match value {
        Some(value) => format!("{:?}", value),
        None => "<none>".into(),
    }
}

/// Configuration-based history formatter.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryFormatConfig {
    pub separator: String,
    pub indent: String,
    /// Prefix for every step line, after the indentation.
    pub step_prefix: Option<String>,
    pub show_index: bool,
    pub show_call_site: bool,
    pub show_input: bool,
    pub show_output: bool,
}

impl Default for HistoryFormatConfig {
    fn default() -> Self {
        Self {
            separator: "\n".into(),
            indent: "  ".into(),
            step_prefix: None,
            show_index: true,
            show_call_site: true,
            show_input: true,
            show_output: true,
        }
    }
}

impl HistoryFormatConfig {
    /// Tree-style output with box-drawing prefixes.
    #[inline]
    pub fn pretty() -> Self {
        Self { step_prefix: Some("├─ ".into()), indent: "│  ".into(), ..Default::default() }
    }

    /// Everything on one line, without inputs or indices.
    #[inline]
    pub fn compact() -> Self {
        Self {
            separator: " | ".into(),
            indent: "> ".into(),
            show_index: false,
            show_input: false,
            ..Default::default()
        }
    }
}

impl HistoryFormatter for HistoryFormatConfig {
    fn format_step(&self, index: usize, step: &dyn Step) -> String {
        let mut parts: Vec<String> = Vec::with_capacity(4);
        if self.show_index {
            parts.push(format!("#{}", index));
        }
        if self.show_call_site {
            parts.push(step.call_site().to_string());
        }
        if self.show_input {
            parts.push(format!("in: {}", describe(step.input())));
        }
        match step.error() {
            Some(error) => parts.push(format!("error: {}", error)),
            None if self.show_output => parts.push(format!("out: {}", describe(step.output()))),
            None => {}
        }

        let body = parts.join(" ");
        match &self.step_prefix {
            Some(prefix) => format!("{}{}", prefix, body),
            None => body,
        }
    }

    fn separator(&self) -> &str {
        &self.separator
    }

    fn indent(&self) -> &str {
        &self.indent
    }
}
