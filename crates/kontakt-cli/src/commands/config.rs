//! Config command - read and edit the kontakt JSON settings.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Subcommand};
use console::style;
use serde_json::Value;

use kontakt_core::KontaktConfig;

use super::config_path;

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Print the effective settings (defaults when no file exists)
    Show,

    /// Write the default settings to a file
    Init {
        /// Target file (default: the active config path)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print one setting, e.g. "signature.window_lines"
    Get { key: String },

    /// Change one setting; the value is parsed as JSON, else taken as text
    Set { key: String, value: String },

    /// Print the active config path
    Path,
}

pub fn run(args: ConfigArgs, explicit_path: Option<&str>) -> anyhow::Result<()> {
    let path = config_path(explicit_path);

    match args.command {
        ConfigCommand::Show => {
            if !path.exists() {
                eprintln!("{} {} not found, using defaults", style("ℹ").blue(), path.display());
            }
            println!("{}", serde_json::to_string_pretty(&load(&path)?)?);
        }
        ConfigCommand::Init { output, force } => {
            let target = output.unwrap_or(path);
            if target.exists() && !force {
                anyhow::bail!("{} already exists (pass --force to replace it)", target.display());
            }
            store(&KontaktConfig::default(), &target)?;
            eprintln!("{} Wrote default settings to {}", style("✓").green(), target.display());
        }
        ConfigCommand::Get { key } => {
            let json = serde_json::to_value(load(&path)?)?;
            println!("{}", serde_json::to_string_pretty(lookup(&json, &key)?)?);
        }
        ConfigCommand::Set { key, value } => {
            let value = parse_value(&value);
            let updated = with_setting(&load(&path)?, &key, value.clone())?;
            store(&updated, &path)?;
            eprintln!("{} {} = {}", style("✓").green(), key, value);
        }
        ConfigCommand::Path => {
            println!("{}", path.display());
            if !path.exists() {
                eprintln!(
                    "{} not created yet; run `kontakt config init`",
                    style("ℹ").blue()
                );
            }
        }
    }

    Ok(())
}

fn load(path: &Path) -> anyhow::Result<KontaktConfig> {
    if !path.exists() {
        return Ok(KontaktConfig::default());
    }
    KontaktConfig::from_file(path).with_context(|| format!("Invalid config file {}", path.display()))
}

fn store(config: &KontaktConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    config.save(path)?;
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// The value at a dotted key such as `extraction.min_confidence`.
fn lookup<'a>(json: &'a Value, key: &str) -> anyhow::Result<&'a Value> {
    key.split('.')
        .try_fold(json, |node, part| node.get(part))
        .ok_or_else(|| anyhow::anyhow!("Unknown setting: {}", key))
}

/// A copy of `config` with one existing setting replaced.
///
/// The result goes back through `KontaktConfig`, so a value of the wrong
/// type is an error rather than a silently dropped field.
fn with_setting(config: &KontaktConfig, key: &str, value: Value) -> anyhow::Result<KontaktConfig> {
    let mut json = serde_json::to_value(config)?;

    let (section, field) = match key.rsplit_once('.') {
        Some((section, field)) => (Some(section), field),
        None => (None, key),
    };
    let parent = match section {
        Some(section) => section
            .split('.')
            .try_fold(&mut json, |node, part| node.get_mut(part)),
        None => Some(&mut json),
    };

    let slot = parent
        .and_then(Value::as_object_mut)
        .and_then(|obj| obj.get_mut(field))
        .ok_or_else(|| anyhow::anyhow!("Unknown setting: {}", key))?;
    if slot.is_object() {
        anyhow::bail!("{} is a section; set one of its fields instead", key);
    }
    *slot = value;

    serde_json::from_value(json).with_context(|| format!("Invalid value for {}", key))
}
