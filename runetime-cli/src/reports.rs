use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use rand::RngCore;
use runetime_core::{Calculator, EtaReport, OddsReport, ParsedValue, Rune, format_duration};
use serde_json::json;

use crate::ReportFormat;

fn write_json(out: &mut dyn Write, value: &serde_json::Value) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn write_warning(out: &mut dyn Write, warning: Option<&str>) -> Result<()> {
    if let Some(warning) = warning {
        writeln!(out, "{} {}", "⚠️".yellow(), warning.yellow())?;
    }
    Ok(())
}

pub fn write_format(
    out: &mut dyn Write,
    format: ReportFormat,
    value: f64,
    rendered: &str,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, &json!({ "value": value, "formatted": rendered })),
        ReportFormat::Console => {
            writeln!(out, "{rendered}")?;
            Ok(())
        }
    }
}

pub fn write_parse(
    out: &mut dyn Write,
    format: ReportFormat,
    calc: &Calculator,
    input: &str,
    parsed: &ParsedValue,
) -> Result<()> {
    let echo = calc.format_value(parsed.value);
    match format {
        ReportFormat::Json => write_json(
            out,
            &json!({
                "input": input,
                "value": parsed.value,
                "formatted": echo,
                "warning": parsed.warning,
            }),
        ),
        ReportFormat::Console => {
            writeln!(out, "{} = {} ({})", input.bold(), parsed.value, echo.cyan())?;
            write_warning(out, parsed.warning.as_deref())
        }
    }
}

pub fn write_eta(
    out: &mut dyn Write,
    format: ReportFormat,
    calc: &Calculator,
    report: &EtaReport,
    show_trace: bool,
    rng: &mut dyn RngCore,
) -> Result<()> {
    let duration = report.duration(rng);
    let outcome = &report.outcome;
    match format {
        ReportFormat::Json => {
            let mut value = json!({
                "rune": report.rune,
                "rate": report.rate,
                "bulk": report.bulk,
                "total_time_seconds": outcome.total_time_seconds,
                "final_rps": outcome.final_rps,
                "steps": outcome.steps,
                "duration": duration,
            });
            if show_trace {
                value["trace_log"] = json!(outcome.trace_log);
            }
            write_json(out, &value)
        }
        ReportFormat::Console => {
            writeln!(out, "{}", format!("⏳ {}", report.rune).bright_cyan().bold())?;
            writeln!(
                out,
                "   Rate: {} x {} bulk",
                calc.format_value(report.rate.value),
                calc.format_value(report.bulk.value)
            )?;
            writeln!(out, "   Time: {}", duration.green())?;
            writeln!(
                out,
                "   Seconds: {}",
                calc.format_value(outcome.total_time_seconds)
            )?;
            writeln!(out, "   Final rps: {}", calc.format_value(outcome.final_rps))?;
            for warning in report.warnings() {
                write_warning(out, Some(warning))?;
            }
            if show_trace {
                writeln!(out)?;
                writeln!(out, "{}", "Trace".yellow().bold())?;
                for line in &outcome.trace_log {
                    writeln!(out, "   {line}")?;
                }
            }
            Ok(())
        }
    }
}

pub fn write_odds(
    out: &mut dyn Write,
    format: ReportFormat,
    calc: &Calculator,
    report: &OddsReport,
    rng: &mut dyn RngCore,
) -> Result<()> {
    let per_rune = format_duration(report.time_per_rune, rng);
    match format {
        ReportFormat::Json => write_json(
            out,
            &json!({
                "rune": report.rune,
                "rps": report.rps,
                "seconds": report.seconds,
                "time_per_rune": report.time_per_rune,
                "time_per_rune_text": per_rune,
                "expected_runes": report.expected_runes,
                "probability": report.probability,
            }),
        ),
        ReportFormat::Console => {
            writeln!(out, "{}", format!("🎲 {}", report.rune).bright_cyan().bold())?;
            writeln!(out, "   Rate: {}", calc.format_value(report.rps.value))?;
            writeln!(out, "   Average per rune: {}", per_rune.green())?;
            writeln!(
                out,
                "   Expected in {}s: {}",
                calc.format_value(report.seconds),
                calc.format_value(report.expected_runes)
            )?;
            writeln!(out, "   Chance of at least one: {:.2}%", report.probability * 100.0)?;
            write_warning(out, report.rps.warning.as_deref())
        }
    }
}

fn chance_label(calc: &Calculator, rune: &Rune) -> String {
    match &rune.chance {
        runetime_core::Chance::Odds(odds) => format!("1 in {}", calc.format_value(*odds)),
        runetime_core::Chance::Special(cost) => {
            format!("{} {}", calc.format_value(cost.value), cost.unit)
        }
    }
}

pub fn write_runes(
    out: &mut dyn Write,
    format: ReportFormat,
    calc: &Calculator,
    runes: &[&Rune],
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, &json!(runes)),
        ReportFormat::Console => {
            if runes.is_empty() {
                writeln!(out, "No runes match.")?;
                return Ok(());
            }
            writeln!(out, "Available runes:")?;
            for rune in runes {
                writeln!(
                    out,
                    "  {:20} {:>14}  {}",
                    rune.name,
                    chance_label(calc, rune),
                    rune.source.dimmed()
                )?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use runetime_core::{CatalogData, EtaRequest, SimulationLimits};

    fn calculator() -> Calculator {
        let data = CatalogData::from_json(include_str!("../../assets/data/catalog.json")).unwrap();
        Calculator::new(&data, SimulationLimits::default()).unwrap()
    }

    fn render(f: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn eta_json_includes_trace_when_requested() {
        let calc = calculator();
        let report = calc
            .eta(&EtaRequest {
                rune: "Basic".to_string(),
                rate: "10".to_string(),
                bulk: None,
                start: 0,
                end: 4,
            })
            .unwrap();
        let text = render(|out| {
            write_eta(out, ReportFormat::Json, &calc, &report, true, &mut StepRng::new(0, 1))
        });
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["rune"], "Basic");
        assert_eq!(value["steps"], 4);
        assert_eq!(value["trace_log"].as_array().map(Vec::len), Some(4));
    }

    #[test]
    fn parse_console_shows_ambiguity_warning() {
        let calc = calculator();
        let parsed = calc.parse_value("5tQg");
        let text = render(|out| write_parse(out, ReportFormat::Console, &calc, "5tQg", &parsed));
        assert!(text.contains("Tqg, TQg"));
    }

    #[test]
    fn runes_console_lists_special_costs() {
        let calc = calculator();
        let runes: Vec<&Rune> = calc.catalog().iter().collect();
        let text = render(|out| write_runes(out, ReportFormat::Console, &calc, &runes));
        assert!(text.contains("Available runes:"));
        assert!(text.contains("Tickets"));
        let empty = render(|out| write_runes(out, ReportFormat::Console, &calc, &[]));
        assert!(empty.contains("No runes match."));
    }

    #[test]
    fn odds_json_reports_probability() {
        let calc = calculator();
        let report = calc.odds("Uncommon", "1K", 1.0).unwrap();
        let text = render(|out| {
            write_odds(out, ReportFormat::Json, &calc, &report, &mut StepRng::new(0, 1))
        });
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let probability = value["probability"].as_f64().unwrap();
        assert!(probability > 0.63 && probability < 0.64);
        assert_eq!(value["time_per_rune_text"], "1 second");
    }
}
