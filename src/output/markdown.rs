//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including corpus statistics, skipped URLs and failures.

use crate::output::traits::{CrawlSummary, OutputResult};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Generates a markdown summary from crawl statistics
///
/// # Arguments
///
/// * `summary` - The crawl summary data
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(summary: &CrawlSummary, output_path: &Path) -> OutputResult<()> {
    let markdown = format_markdown_summary(summary);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats a crawl summary as markdown
///
/// # Arguments
///
/// * `summary` - The crawl summary data
///
/// # Returns
///
/// A formatted markdown string
pub fn format_markdown_summary(summary: &CrawlSummary) -> String {
    let mut md = String::new();

    // Title
    md.push_str("# Jury-Corpus Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Run ID**: {}\n", summary.run_id));
    md.push_str(&format!("- **Seed**: {}\n", summary.seed_url));
    md.push_str(&format!("- **Started**: {}\n", summary.started_at));
    if let Some(finished) = &summary.finished_at {
        md.push_str(&format!("- **Finished**: {}\n", finished));
    }
    if let Some(duration) = summary.duration_seconds {
        md.push_str(&format!(
            "- **Duration**: {} seconds ({:.2} minutes)\n",
            duration,
            duration as f64 / 60.0
        ));
    }
    md.push_str(&format!("- **Status**: {}\n", summary.status));
    md.push_str(&format!("- **Config Hash**: {}\n\n", summary.config_hash));

    // Corpus statistics
    md.push_str("## Corpus Statistics\n\n");
    md.push_str(&format!("- **Pages**: {}\n", summary.total_pages));
    md.push_str(&format!("- **Files**: {}\n", summary.total_files));
    md.push_str(&format!("- **Child Links**: {}\n", summary.total_links));
    md.push_str(&format!("- **Parent Edges**: {}\n", summary.parent_edges));
    md.push_str(&format!(
        "- **Average Parents per Page**: {:.2}\n",
        summary.average_parents()
    ));
    md.push_str(&format!("- **Failed URLs**: {}\n", summary.pages_failed));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n",
        summary.success_rate()
    ));
    md.push_str(&format!(
        "- **Error Rate**: {:.2}%\n\n",
        summary.error_rate()
    ));

    // Most referenced pages
    if !summary.most_referenced.is_empty() {
        md.push_str("## Most Referenced Pages\n\n");
        md.push_str("| URL | Parents |\n");
        md.push_str("|-----|---------|\n");

        for (url, count) in &summary.most_referenced {
            md.push_str(&format!("| {} | {} |\n", url, count));
        }
        md.push('\n');
    }

    // Skipped URLs
    if !summary.skipped.is_empty() {
        md.push_str("## Top 20 Skipped URLs\n\n");
        md.push_str(&format!("Total skipped: {}\n\n", summary.skipped.len()));
        md.push_str("| URL | Reason | Referrers |\n");
        md.push_str("|-----|--------|-----------|\n");

        for record in summary.skipped.iter().take(20) {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                record.url, record.reason, record.referrers
            ));
        }
        md.push('\n');
    }

    // Failures
    if !summary.failed.is_empty() {
        md.push_str("## Failed URLs\n\n");
        md.push_str("| URL | Error |\n");
        md.push_str("|-----|-------|\n");

        for (url, error) in summary.failed.iter().take(50) {
            md.push_str(&format!("| {} | {} |\n", url, error.replace('|', "\\|")));
        }
        if summary.failed.len() > 50 {
            md.push_str(&format!("\n... and {} more\n", summary.failed.len() - 50));
        }
        md.push('\n');
    }

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SkippedRecord;

    fn create_test_summary() -> CrawlSummary {
        let mut summary = CrawlSummary::new();
        summary.run_id = 1;
        summary.seed_url = "https://www.njcourts.gov/jurors/reporting".to_string();
        summary.started_at = "2024-01-01T00:00:00Z".to_string();
        summary.finished_at = Some("2024-01-01T01:00:00Z".to_string());
        summary.duration_seconds = Some(3600);
        summary.status = "completed".to_string();
        summary.config_hash = "abc123".to_string();
        summary.total_pages = 120;
        summary.total_files = 14;
        summary.total_links = 950;
        summary.parent_edges = 300;
        summary.pages_failed = 3;
        summary
    }

    #[test]
    fn test_format_markdown_summary() {
        let summary = create_test_summary();
        let markdown = format_markdown_summary(&summary);

        assert!(markdown.contains("# Jury-Corpus Crawl Summary"));
        assert!(markdown.contains("Run ID"));
        assert!(markdown.contains("Corpus Statistics"));
        assert!(markdown.contains("https://www.njcourts.gov/jurors/reporting"));
    }

    #[test]
    fn test_markdown_contains_statistics() {
        let summary = create_test_summary();
        let markdown = format_markdown_summary(&summary);

        assert!(markdown.contains("- **Pages**: 120"));
        assert!(markdown.contains("- **Files**: 14"));
        assert!(markdown.contains("- **Child Links**: 950"));
        assert!(markdown.contains("- **Average Parents per Page**: 2.50"));
    }

    #[test]
    fn test_markdown_with_skipped_and_failed() {
        let mut summary = create_test_summary();
        summary.skipped = vec![SkippedRecord {
            url: "https://www.njcourts.gov/self-help".to_string(),
            reason: "excluded by 'https://www.njcourts.gov/self-help'".to_string(),
            referrers: 7,
        }];
        summary.failed = vec![(
            "https://www.njcourts.gov/gone".to_string(),
            "HTTP 404 fetching https://www.njcourts.gov/gone".to_string(),
        )];

        let markdown = format_markdown_summary(&summary);

        assert!(markdown.contains("Top 20 Skipped URLs"));
        assert!(markdown.contains("| https://www.njcourts.gov/self-help |"));
        assert!(markdown.contains("| 7 |"));
        assert!(markdown.contains("Failed URLs"));
        assert!(markdown.contains("HTTP 404 fetching"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        generate_markdown_summary(&create_test_summary(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Jury-Corpus Crawl Summary"));
    }
}
