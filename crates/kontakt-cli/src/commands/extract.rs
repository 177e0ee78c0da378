//! Extract command - contacts from a single plain-text message body.

use std::fs;
use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::{debug, info};

use kontakt_core::{ContactPipeline, MailMessage};

use super::{emit, format_contacts, load_config, OutputFormat};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Plain-text body file, or "-" for stdin
    #[arg(required = true)]
    input: String,

    /// Participant address (repeatable); without any, addresses in the
    /// signature are used
    #[arg(long = "from")]
    from: Vec<String>,

    /// Message subject
    #[arg(short, long, default_value = "")]
    subject: String,

    /// Message date, e.g. "29.07.2025 10:10"
    #[arg(short, long, default_value = "")]
    date: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Resource directory overriding the embedded lists
    #[arg(long)]
    resources: Option<PathBuf>,
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = load_config(config_path)?;
    if args.resources.is_some() {
        config.resources.dir = args.resources.clone();
    }

    let body = read_body(&args.input)?;
    info!("Read {} characters from {}", body.chars().count(), args.input);

    let pipeline = ContactPipeline::from_config(config)?;
    for warning in pipeline.lexicon().warnings() {
        eprintln!("{} {}", style("⚠").yellow(), warning);
    }

    let message = MailMessage {
        id: args.input.clone(),
        subject: args.subject.clone(),
        date: args.date.clone(),
        participants: args.from.clone(),
        body: Some(body),
    };

    let report = pipeline.run([message]);
    if report.stats.internal > 0 {
        eprintln!(
            "{} No external participant found; pass --from with the sender address.",
            style("ℹ").blue()
        );
    }

    let output = format_contacts(&report.contacts, args.format)?;
    emit(&output, args.output.as_deref())?;

    if let Some(path) = &args.output {
        eprintln!(
            "{} {} contacts written to {}",
            style("✓").green(),
            report.contacts.len(),
            path.display()
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

fn read_body(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .context("Failed to read stdin")?;
        return Ok(body);
    }

    let path = PathBuf::from(input);
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }
    fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
}
