//! Batch command - one extraction run over many message files.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{debug, error, warn};

use kontakt_core::{ContactPipeline, MailMessage};

use super::{emit, format_contacts, load_config, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Glob pattern of .json / .jsonl message files
    #[arg(required = true)]
    input: String,

    /// Output file for contacts (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also write run statistics as JSON
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// Resource directory overriding the embedded lists
    #[arg(long)]
    resources: Option<PathBuf>,
}

/// A `.json` file holds one message or an array of them.
#[derive(Deserialize)]
#[serde(untagged)]
enum MessageFile {
    Many(Vec<MailMessage>),
    One(MailMessage),
}

pub fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.resources.is_some() {
        config.resources.dir = args.resources.clone();
    }

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            matches!(ext.to_lowercase().as_str(), "json" | "jsonl")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    eprintln!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    let pipeline = ContactPipeline::from_config(config)?;
    for warning in pipeline.lexicon().warnings() {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut run = pipeline.start_run();
    let mut failed: Vec<(PathBuf, String)> = Vec::new();

    for path in files {
        match read_messages(&path) {
            Ok(messages) => {
                debug!("{}: {} messages", path.display(), messages.len());
                for message in &messages {
                    run.process(message);
                }
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to read {}: {}", path.display(), error_msg);
                    failed.push((path.clone(), error_msg));
                } else {
                    error!("Failed to read {}: {}", path.display(), error_msg);
                    pb.abandon();
                    anyhow::bail!("Processing failed for {}: {}", path.display(), error_msg);
                }
            }
        }
        pb.inc(1);
    }

    pb.finish_with_message("Complete");

    let report = run.finish();

    let output = format_contacts(&report.contacts, args.format)?;
    emit(&output, args.output.as_deref())?;

    if let Some(stats_path) = &args.stats {
        fs::write(stats_path, serde_json::to_string_pretty(&report.stats)?)?;
        eprintln!(
            "{} Statistics written to {}",
            style("✓").green(),
            stats_path.display()
        );
    }

    let stats = &report.stats;
    eprintln!();
    eprintln!(
        "{} Processed {} messages in {:?}",
        style("✓").green(),
        stats.processed,
        start.elapsed()
    );
    eprintln!(
        "   {} external, {} internal, {} without body",
        style(stats.external).green(),
        stats.internal,
        stats.missing_body
    );
    eprintln!(
        "   {} contacts ({} accepted, {} below threshold, {} duplicates removed)",
        style(stats.unique_contacts).green(),
        stats.accepted,
        stats.rejected_low_confidence,
        stats.duplicates_removed
    );

    if !failed.is_empty() {
        eprintln!();
        eprintln!("{}", style("Failed files:").red());
        for (path, error) in &failed {
            eprintln!("  - {}: {}", path.display(), error);
        }
    }

    Ok(())
}

/// Messages from a `.json` (object or array) or `.jsonl` file.
fn read_messages(path: &Path) -> anyhow::Result<Vec<MailMessage>> {
    let content = fs::read_to_string(path)?;
    let is_jsonl = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl"));

    if is_jsonl {
        let mut messages = Vec::new();
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let message: MailMessage = serde_json::from_str(line)
                .map_err(|e| anyhow::anyhow!("line {}: {}", i + 1, e))?;
            messages.push(message);
        }
        return Ok(messages);
    }

    Ok(match serde_json::from_str::<MessageFile>(&content)? {
        MessageFile::Many(messages) => messages,
        MessageFile::One(message) => vec![message],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_read_messages_formats() {
        let dir = TempDir::new().unwrap();

        let single = dir.path().join("one.json");
        fs::write(&single, r#"{"id": "1", "body": "текст"}"#).unwrap();
        assert_eq!(read_messages(&single).unwrap().len(), 1);

        let array = dir.path().join("many.json");
        fs::write(&array, r#"[{"id": "1"}, {"id": "2"}]"#).unwrap();
        let ids: Vec<String> = read_messages(&array).unwrap().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["1".to_string(), "2".to_string()]);

        let lines = dir.path().join("stream.jsonl");
        fs::write(&lines, "{\"id\": \"a\"}\n\n{\"id\": \"b\"}\n").unwrap();
        assert_eq!(read_messages(&lines).unwrap().len(), 2);
    }

    #[test]
    fn test_read_messages_reports_bad_line() {
        let dir = TempDir::new().unwrap();
        let lines = dir.path().join("bad.jsonl");
        fs::write(&lines, "{\"id\": \"a\"}\nnot json\n").unwrap();

        let err = read_messages(&lines).unwrap_err();
        assert!(err.to_string().starts_with("line 2:"));
    }
}
