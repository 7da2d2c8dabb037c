//! Run summary: console printout and `summary.md`

use crate::output::traits::BatchReport;
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the summary under the output root
pub const SUMMARY_FILE: &str = "summary.md";

/// Writes the Markdown summary to `<output_root>/summary.md`
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written summary
/// * `Err(OutputError)` - Failed to write the file
pub fn write_summary(report: &BatchReport, output_root: &Path) -> OutputResult<PathBuf> {
    let path = output_root.join(SUMMARY_FILE);
    let mut file = File::create(&path)?;
    file.write_all(format_summary(report).as_bytes())?;
    Ok(path)
}

/// Formats a batch report as Markdown
pub fn format_summary(report: &BatchReport) -> String {
    let mut md = String::new();

    md.push_str("# Docs-Scribe Run Summary\n\n");

    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", report.started_at));
    md.push_str(&format!(
        "- **Duration**: {:.1} seconds\n",
        report.elapsed.as_secs_f64()
    ));
    if let Some(hash) = &report.config_hash {
        md.push_str(&format!("- **Config Hash**: {}\n", hash));
    }
    md.push('\n');

    md.push_str("## Results\n\n");
    md.push_str("| Outcome | Pages |\n");
    md.push_str("|---------|-------|\n");
    md.push_str(&format!("| Total | {} |\n", report.total));
    md.push_str(&format!("| Persisted | {} |\n", report.persisted.len()));
    md.push_str(&format!("| Failed | {} |\n", report.failed.len()));
    md.push_str(&format!("| Rejected | {} |\n\n", report.rejected_count()));
    md.push_str(&format!(
        "Success rate: {:.2}%\n\n",
        report.success_rate()
    ));

    if !report.failed.is_empty() {
        md.push_str("## Failed Pages\n\n");
        md.push_str("| URL | Attempts | Error |\n");
        md.push_str("|-----|----------|-------|\n");
        for failure in &report.failed {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                failure.url,
                failure.attempts,
                escape_cell(&failure.error)
            ));
        }
        md.push('\n');
    }

    if !report.flagged.is_empty() {
        md.push_str("## Validation Issues\n\n");
        for page in &report.flagged {
            let status = if page.persisted { "persisted" } else { "rejected" };
            md.push_str(&format!("### {} ({})\n\n", page.url, status));
            for issue in &page.issues {
                md.push_str(&format!("- {}\n", issue));
            }
            md.push('\n');
        }
    }

    md
}

/// Prints a short run overview to stdout
pub fn print_summary(report: &BatchReport) {
    println!("=== Docs-Scribe Run ===\n");
    println!("Overview:");
    println!("  URLs: {}", report.total);
    println!(
        "  Persisted: {} ({:.1}%)",
        report.persisted.len(),
        report.success_rate()
    );
    println!("  Failed: {}", report.failed.len());
    println!("  Rejected: {}", report.rejected_count());
    println!("  Duration: {:.1}s", report.elapsed.as_secs_f64());
    println!();

    if !report.failed.is_empty() {
        println!("Failures:");
        for failure in &report.failed {
            println!(
                "  {} after {} attempt(s): {}",
                failure.url, failure.attempts, failure.error
            );
        }
        println!();
    }
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}
