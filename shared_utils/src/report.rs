//! Report Module
//!
//! Final summary for a batch: either the success message or the list of
//! failed sources, followed by a one-line tally.

use crate::batch::BatchResult;
use crate::progress::format_duration;
use console::style;
use std::path::Path;
use std::time::Duration;

pub fn render_outcome(result: &BatchResult, output_dir: &Path, output_label: &str) -> String {
    if result.is_complete_success() {
        format!(
            "Conversion completed successfully. {} files are saved in '{}'.",
            output_label,
            output_dir.display()
        )
    } else {
        let mut out = String::from("Some files failed to convert:");
        for name in result.failed_names() {
            out.push_str("\n- ");
            out.push_str(name);
        }
        out
    }
}

pub fn render_tally(result: &BatchResult, duration: Duration) -> String {
    format!(
        "{} total • {} succeeded • {} failed • {:.1}% • {}",
        result.total,
        result.succeeded,
        result.failed(),
        result.success_rate(),
        format_duration(duration)
    )
}

pub fn print_summary_report(
    result: &BatchResult,
    duration: Duration,
    output_dir: &Path,
    output_label: &str,
) {
    let outcome = render_outcome(result, output_dir, output_label);
    println!();
    if result.is_complete_success() {
        println!("✅ {}", style(outcome).green());
    } else {
        println!("❌ {}", style(outcome).red());
    }
    println!("📊 {}", render_tally(result, duration));
}
