use std::time::{Duration, Instant};

use fieldprobe_core::Extraction;
use owo_colors::OwoColorize;

use crate::VERSION;

const RULE_WIDTH: usize = 60;

/// Stderr progress for one run.
///
/// Step, info and timing lines only appear in verbose mode. Warnings and the
/// final success line always do.
pub struct Progress {
    verbose: bool,
    total_steps: usize,
    current_step: usize,
    started: Instant,
    timings: Vec<(&'static str, Duration)>,
}

impl Progress {
    pub fn new(verbose: bool, total_steps: usize) -> Self {
        Self { verbose, total_steps, current_step: 0, started: Instant::now(), timings: Vec::new() }
    }

    /// Banner plus one info line per `(key, value)` pair.
    pub fn banner(&self, facts: &[(&str, String)]) {
        if !self.verbose {
            return;
        }
        eprintln!("\n{} {}", "fieldprobe".bold().bright_blue(), format!("v{}", VERSION).dimmed());
        eprintln!("{}", "label/value fragment finder".dimmed());
        for (key, value) in facts {
            eprintln!("{} {} {}", "ℹ".blue(), format!("{}:", key).bright_blue(), value);
        }
        eprintln!();
    }

    /// Starts the next numbered step.
    pub fn step(&mut self, message: &str) {
        self.current_step += 1;
        if self.verbose {
            let counter = format!("[{}/{}]", self.current_step, self.total_steps);
            eprintln!("{} {}", counter.dimmed(), message.bright_cyan());
        }
    }

    /// Indented `key: value` line under the current step.
    pub fn detail(&self, key: &str, value: &str) {
        if self.verbose {
            eprintln!("  {} {}", format!("{}:", key).dimmed(), value.bright_white());
        }
    }

    /// Runs `work` and records how long it took under `label`.
    pub fn timed<T>(&mut self, label: &'static str, work: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = work();
        self.record(label, start.elapsed());
        out
    }

    pub fn record(&mut self, label: &'static str, elapsed: Duration) {
        self.timings.push((label, elapsed));
    }

    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message.bright_green());
    }

    /// Match counters and one line per fragment.
    pub fn extraction(&self, extraction: &Extraction) {
        if !self.verbose {
            return;
        }
        section("Extraction Details");
        self.detail("Label matches", &extraction.label_matches.to_string());
        self.detail("Value matches", &extraction.value_matches.to_string());
        self.detail("Pairs tried", &extraction.pairs_tried.to_string());
        for (i, fragment) in extraction.fragments.iter().enumerate() {
            eprintln!(
                "  {} {} {}",
                format!("#{}", i + 1).dimmed(),
                fragment.selector.bright_white(),
                format!("({})", format_size(fragment.html.len())).dimmed()
            );
        }
        eprintln!();
    }

    /// Per-phase timings and the wall-clock total.
    pub fn finish(&self) {
        if !self.verbose {
            return;
        }
        section("Timing Summary");
        for (label, duration) in &self.timings {
            let ms = duration.as_secs_f64() * 1000.0;
            let label = format!("{}:", label);
            match speed(ms) {
                Speed::Fast => eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "fast".dimmed()),
                Speed::Moderate => eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "moderate".bright_yellow()),
                Speed::Slow => eprintln!("  {} {:>8.2}ms ({})", label.dimmed(), ms, "slow".bright_red()),
            }
        }
        let total = self.started.elapsed().as_secs_f64() * 1000.0;
        eprintln!("  {} {:>8.2}ms\n", "Total:".bold().dimmed(), total);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Speed {
    Fast,
    Moderate,
    Slow,
}

fn speed(ms: f64) -> Speed {
    if ms < 50.0 {
        Speed::Fast
    } else if ms < 100.0 {
        Speed::Moderate
    } else {
        Speed::Slow
    }
}

fn section(title: &str) {
    let rule = "═".repeat(RULE_WIDTH);
    eprintln!("{}", rule.dimmed());
    eprintln!("{}", title.bold().cyan());
    eprintln!("{}", rule.dimmed());
}

/// Human-readable byte count: `512 B`, `2.0 KB`, `3.0 MB`.
pub fn format_size(bytes: usize) -> String {
    const UNITS: [&str; 2] = ["KB", "MB"];

    let mut size = bytes as f64;
    let mut unit = None;
    for next in UNITS {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = Some(next);
    }

    match unit {
        Some(unit) => format!("{:.1} {}", size, unit),
        None => format!("{} B", bytes),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_speed_buckets() {
        assert_eq!(speed(10.0), Speed::Fast);
        assert_eq!(speed(75.0), Speed::Moderate);
        assert_eq!(speed(250.0), Speed::Slow);
    }

    #[test]
    fn test_steps_count_up() {
        let mut progress = Progress::new(false, 4);
        progress.step("one");
        progress.step("two");
        assert_eq!(progress.current_step, 2);

        let value = progress.timed("Parse", || 7);
        assert_eq!(value, 7);
        assert_eq!(progress.timings.len(), 1);
        assert_eq!(progress.timings[0].0, "Parse");
    }
}
