//! Console output formatting for benchmark results

use crate::stats::LatencySummary;
use colored::Colorize;
use std::fmt::Write as _;

/// Formats the end-of-run report for the console
pub struct SummaryFormatter {
    /// Enable colored output
    pub enable_color: bool,
    /// Include the detailed percentile block
    pub verbose: bool,
}

impl SummaryFormatter {
    /// Create a formatter with the given options
    pub fn new(enable_color: bool, verbose: bool) -> Self {
        Self {
            enable_color,
            verbose,
        }
    }

    /// Render the full report: the one-line summary, plus detail in
    /// verbose mode
    pub fn format(&self, summary: &LatencySummary) -> String {
        let mut output = self.format_summary_line(summary);

        if self.verbose {
            output.push('\n');
            output.push_str(&self.format_detail_block(summary));
        }

        output
    }

    /// The headline result line
    pub fn format_summary_line(&self, summary: &LatencySummary) -> String {
        let line = format!(
            "Mean Time: {:.1}ms ± {:.1}ms",
            summary.mean_ms(),
            summary.std_dev_ms()
        );

        if self.enable_color {
            line.green().bold().to_string()
        } else {
            line
        }
    }

    fn format_detail_block(&self, summary: &LatencySummary) -> String {
        let mut block = String::new();

        let _ = writeln!(block, "  Samples: {}", summary.sample_count);
        let _ = writeln!(block, "  Min:     {:.1}ms", summary.min_secs * 1000.0);
        let _ = writeln!(block, "  p50:     {:.1}ms", summary.p50_secs * 1000.0);
        let _ = writeln!(block, "  p90:     {:.1}ms", summary.p90_secs * 1000.0);
        let _ = writeln!(block, "  p99:     {:.1}ms", summary.p99_secs * 1000.0);
        let _ = writeln!(block, "  Max:     {:.1}ms", summary.max_secs * 1000.0);
        let _ = write!(
            block,
            "  Generated: {}",
            summary.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        );

        if self.enable_color {
            block.dimmed().to_string()
        } else {
            block
        }
    }
}
