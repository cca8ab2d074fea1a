use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::prelude::*;
use clap::ValueEnum;
use csv::WriterBuilder;

use crate::{AnalysisResult, WordCount};

/// Output format for file export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ExportFormat {
    Txt,
    Csv,
    Tsv,
    Json,
}

/// Serialize a result to the pretty-printed JSON document used for export.
/// Field names follow the documented shape (`topWords`, `uniqueWords`,
/// `avgWordLength`), so the file stays readable by external consumers.
pub fn result_to_json(result: &AnalysisResult) -> serde_json::Result<String> {
    serde_json::to_string_pretty(result)
}

/// Guard a CSV cell against spreadsheet formula injection by prefixing a
/// single quote when the cell starts with `=`, `+`, `-` or `@`.
///
/// # Example
/// ```
/// use lexistat::csv_safe_cell;
/// assert_eq!(csv_safe_cell("=SUM(A1)"), "'=SUM(A1)");
/// assert_eq!(csv_safe_cell("word"), "word");
/// ```
pub fn csv_safe_cell(cell: &str) -> String {
    match cell.chars().next() {
        Some('=') | Some('+') | Some('-') | Some('@') => format!("'{cell}"),
        _ => cell.to_string(),
    }
}

/// Render the human-readable text report: statistics block, top-words bar
/// chart, keyword and entity tag lists, sentiment.
pub fn render_report(result: &AnalysisResult, title: &str) -> String {
    let stats = &result.statistics;
    let mut out = String::new();
    out.push_str(&format!("Analysis: {title}\n"));
    out.push_str(&format!(
        "  characters: {}  words: {}  unique: {}  sentences: {}  avg word length: {}\n",
        stats.characters, stats.words, stats.unique_words, stats.sentences, stats.avg_word_length
    ));
    out.push_str(&format!(
        "  sentiment: {} (score {})\n",
        result.sentiment.label.as_str(),
        result.sentiment.score
    ));

    out.push_str("\nTop words:\n");
    if result.top_words.is_empty() {
        out.push_str("  (none)\n");
    } else {
        out.push_str(&bar_chart(&result.top_words));
    }

    out.push_str(&format!("\nKeywords: {}\n", tag_list(&result.keywords)));
    out.push_str(&format!("Entities: {}\n", tag_list(&result.entities)));
    out
}

fn tag_list(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

const BAR_WIDTH: usize = 32;

fn bar_chart(entries: &[WordCount]) -> String {
    let max_count = entries.iter().map(|w| w.count).max().unwrap_or(1).max(1);
    let widest = entries.iter().map(|w| w.word.len()).max().unwrap_or(0);
    let mut out = String::new();
    for entry in entries {
        let len = ((entry.count as usize * BAR_WIDTH) / max_count as usize).max(1);
        out.push_str(&format!(
            "  {:<widest$}  {} {}\n",
            entry.word,
            "#".repeat(len),
            entry.count
        ));
    }
    out
}

/// Save one result into `dir` under a timestamped name derived from `stem`,
/// e.g. `notes_20250807_141503_analysis.json`. Returns the written path.
pub fn save_result(
    result: &AnalysisResult,
    stem: &str,
    dir: &Path,
    format: ExportFormat,
) -> io::Result<PathBuf> {
    match format {
        ExportFormat::Json => {
            let json = result_to_json(result).map_err(io::Error::other)?;
            write_text(&timestamped_path(dir, stem, "analysis", "json"), &json)
        }
        ExportFormat::Txt => {
            let report = render_report(result, stem);
            write_text(&timestamped_path(dir, stem, "report", "txt"), &report)
        }
        ExportFormat::Csv => {
            let path = timestamped_path(dir, stem, "topwords", "csv");
            write_word_table(&path, &result.top_words, b',')?;
            Ok(path)
        }
        ExportFormat::Tsv => {
            let path = timestamped_path(dir, stem, "topwords", "tsv");
            write_word_table(&path, &result.top_words, b'\t')?;
            Ok(path)
        }
    }
}

fn timestamped_path(dir: &Path, stem: &str, table: &str, ext: &str) -> PathBuf {
    let local: DateTime<Local> = Local::now();
    let name = format!("{}_{}_{}.{}", stem, local.format("%Y%m%d_%H%M%S"), table, ext);
    dir.join(name)
}

fn write_text(path: &Path, content: &str) -> io::Result<PathBuf> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(content.as_bytes())?;
    Ok(path.to_path_buf())
}

fn write_word_table(path: &Path, entries: &[WordCount], delimiter: u8) -> io::Result<()> {
    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(path)
        .map_err(io::Error::other)?;
    writer
        .write_record(["word", "count"])
        .map_err(io::Error::other)?;
    for entry in entries {
        writer
            .write_record([csv_safe_cell(&entry.word), entry.count.to_string()])
            .map_err(io::Error::other)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze;

    #[test]
    fn test_report_lists_sections() {
        let r = analyze("Alice loves wonderful gardens. Gardens bloom!");
        let report = render_report(&r, "sample");
        assert!(report.contains("Analysis: sample"));
        assert!(report.contains("Top words:"));
        assert!(report.contains("gardens"));
        assert!(report.contains("# 2\n"));
        assert!(report.contains("Entities: Alice, Gardens"));
    }

    #[test]
    fn test_report_empty_result() {
        let r = analyze("");
        let report = render_report(&r, "empty");
        assert!(report.contains("(none)"));
        assert!(report.contains("sentiment: neutral (score 0)"));
    }

    #[test]
    fn test_csv_safe_cell_variants() {
        assert_eq!(csv_safe_cell("+1"), "'+1");
        assert_eq!(csv_safe_cell("-x"), "'-x");
        assert_eq!(csv_safe_cell("@a"), "'@a");
        assert_eq!(csv_safe_cell(""), "");
        assert_eq!(csv_safe_cell("plain"), "plain");
    }
}
