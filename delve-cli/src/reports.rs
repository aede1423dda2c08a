use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::time::Duration;

use crate::simulate::{PolicySummary, RunRecord};

#[derive(Serialize)]
struct JsonReport<'a> {
    summary: &'a [PolicySummary],
    runs: &'a [RunRecord],
}

pub fn generate_console_report<W: Write>(
    out: &mut W,
    summary: &[PolicySummary],
    total_duration: Duration,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "📊 Simulation Summary".bright_cyan().bold())?;
    writeln!(out, "{}", "=====================".cyan())?;

    let total: usize = summary.iter().map(|s| s.runs).sum();
    writeln!(out, "Total runs: {total}")?;
    writeln!(out, "Total time: {total_duration:?}")?;
    writeln!(out)?;

    for entry in summary {
        writeln!(out, "{}", entry.policy.label().bold())?;
        writeln!(
            out,
            "   Victories: {}  Defeats: {}",
            entry.victories.to_string().green(),
            entry.defeats.to_string().red()
        )?;
        writeln!(out, "   Win rate: {:.1}%", entry.win_rate * 100.0)?;
        writeln!(out, "   Average final level: {:.2}", entry.average_level)?;
        writeln!(out, "   Average floor reached: {:.2}", entry.average_floor)?;
        writeln!(out, "   Escapes: {}", entry.escapes)?;
        writeln!(out)?;
    }
    Ok(())
}

pub fn generate_json_report<W: Write>(
    out: &mut W,
    summary: &[PolicySummary],
    runs: &[RunRecord],
) -> Result<()> {
    let json_output = serde_json::to_string_pretty(&JsonReport { summary, runs })?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report<W: Write>(out: &mut W, summary: &[PolicySummary]) -> Result<()> {
    writeln!(out, "# Delve Simulation Results\n")?;
    if summary.is_empty() {
        writeln!(out, "_No runs executed._")?;
        return Ok(());
    }
    writeln!(
        out,
        "| Policy | Runs | Victories | Defeats | Win rate | Avg level | Avg floor | Escapes |"
    )?;
    writeln!(out, "|---|---|---|---|---|---|---|---|")?;
    for entry in summary {
        writeln!(
            out,
            "| {} | {} | {} | {} | {:.1}% | {:.2} | {:.2} | {} |",
            entry.policy.label(),
            entry.runs,
            entry.victories,
            entry.defeats,
            entry.win_rate * 100.0,
            entry.average_level,
            entry.average_floor,
            entry.escapes
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::PlayPolicy;

    fn sample() -> Vec<PolicySummary> {
        vec![PolicySummary {
            policy: PlayPolicy::Aggressive,
            runs: 4,
            victories: 3,
            defeats: 1,
            win_rate: 0.75,
            average_level: 3.5,
            average_floor: 4.75,
            escapes: 0,
        }]
    }

    #[test]
    fn markdown_renders_a_table_row() {
        let mut out = Vec::new();
        generate_markdown_report(&mut out, &sample()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("| Aggressive | 4 | 3 | 1 | 75.0% | 3.50 | 4.75 | 0 |"));
    }

    #[test]
    fn json_report_has_summary_and_runs() {
        let mut out = Vec::new();
        generate_json_report(&mut out, &sample(), &[]).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["summary"][0]["policy"], "aggressive");
        assert_eq!(value["runs"], serde_json::json!([]));
    }

    #[test]
    fn console_report_lists_each_policy() {
        colored::control::set_override(false);
        let mut out = Vec::new();
        generate_console_report(&mut out, &sample(), Duration::from_millis(5)).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Total runs: 4"));
        assert!(text.contains("Win rate: 75.0%"));
    }
}
