//! Lexicon command - inspect and export the resource lists.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use console::style;

use kontakt_core::models::embedded::RESOURCES;
use kontakt_core::Lexicon;

use super::load_config;

/// Arguments for the lexicon command.
#[derive(Args)]
pub struct LexiconArgs {
    #[command(subcommand)]
    command: LexiconCommand,
}

#[derive(Subcommand)]
enum LexiconCommand {
    /// Show entry counts per resource file
    Show {
        /// Resource directory (default: configured directory or embedded lists)
        #[arg(long)]
        resources: Option<PathBuf>,
    },

    /// Write the embedded default lists to a directory for editing
    Export {
        /// Target directory
        dir: PathBuf,

        /// Overwrite existing files
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: LexiconArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    match args.command {
        LexiconCommand::Show { resources } => {
            let dir = match resources {
                Some(dir) => Some(dir),
                None => load_config(config_path)?.resources.dir,
            };
            show(dir)
        }
        LexiconCommand::Export { dir, force } => export(&dir, force),
    }
}

fn show(dir: Option<PathBuf>) -> anyhow::Result<()> {
    let lexicon = Lexicon::load(dir.as_deref())?;

    match &dir {
        Some(dir) => println!("Resources: {}", dir.display()),
        None => println!("Resources: embedded"),
    }
    println!();

    for (file, count) in lexicon.summary() {
        println!("  {:<28} {:>5}", file, count);
    }

    if !lexicon.warnings().is_empty() {
        println!();
        println!("{}", style("Warnings:").yellow());
        for warning in lexicon.warnings() {
            println!("  - {}", warning);
        }
    }

    Ok(())
}

fn export(dir: &Path, force: bool) -> anyhow::Result<()> {
    fs::create_dir_all(dir)?;

    for resource in RESOURCES {
        let path = dir.join(resource.file);
        if path.exists() && !force {
            anyhow::bail!(
                "{} already exists. Use --force to overwrite.",
                path.display()
            );
        }
        fs::write(&path, resource.contents)?;
    }

    println!(
        "{} Wrote {} resource files to {}",
        style("✓").green(),
        RESOURCES.len(),
        dir.display()
    );

    Ok(())
}
