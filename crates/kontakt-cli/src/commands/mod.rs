//! Subcommand implementations and shared helpers.

pub mod batch;
pub mod config;
pub mod extract;
pub mod lexicon;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use kontakt_core::{Contact, KontaktConfig};

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of contacts
    Json,
    /// One CSV row per contact
    Csv,
}

/// `<config dir>/kontakt/config.json`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kontakt")
        .join("config.json")
}

/// The `--config` path if given, else the default location.
pub fn config_path(explicit: Option<&str>) -> PathBuf {
    explicit.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load the configuration. An explicit path must exist; the default
/// location falls back to built-in defaults.
pub fn load_config(explicit: Option<&str>) -> anyhow::Result<KontaktConfig> {
    if let Some(path) = explicit {
        return KontaktConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to read config file {}", path));
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading config from {}", path.display());
        Ok(KontaktConfig::from_file(&path)?)
    } else {
        Ok(KontaktConfig::default())
    }
}

/// Render contacts in the requested format.
pub fn format_contacts(contacts: &[Contact], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(contacts)?),
        OutputFormat::Csv => {
            let mut buffer = Vec::new();
            write_contacts_csv(&mut buffer, contacts)?;
            Ok(String::from_utf8(buffer)?)
        }
    }
}

fn write_contacts_csv<W: Write>(writer: W, contacts: &[Contact]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "fio",
        "position",
        "company",
        "email",
        "phones",
        "address",
        "city",
        "inn",
        "confidence_score",
        "issues",
        "source",
        "email_date",
        "email_subject",
    ])?;

    for contact in contacts {
        let record: Vec<String> = vec![
            contact.fio.clone(),
            contact.position.clone(),
            contact.company.clone(),
            contact.email.clone(),
            contact.phones.join("; "),
            contact.address.clone(),
            contact.city.clone(),
            contact.inn.clone().unwrap_or_default(),
            format!("{:.2}", contact.confidence_score),
            contact.issues.join("; "),
            contact.source.clone(),
            contact.email_date.clone(),
            contact.email_subject.clone(),
        ];
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write `content` to `output`, or stdout when no path is given.
pub fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        None => println!("{}", content),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_rendering() {
        let contact = Contact {
            fio: "Иванов Иван".to_string(),
            email: "ivanov@vector.ru".to_string(),
            phones: vec!["+7 (383) 212-34-56".to_string(), "+7 (383) 212-34-57".to_string()],
            confidence_score: 0.6,
            ..Contact::default()
        };
        let csv = format_contacts(&[contact], OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("fio,position,company,email,phones"));
        assert!(lines[1].contains("+7 (383) 212-34-56; +7 (383) 212-34-57"));
        assert!(lines[1].contains("0.60"));
    }

    #[test]
    fn test_config_path_override() {
        assert_eq!(config_path(Some("/tmp/k.json")), PathBuf::from("/tmp/k.json"));
        assert!(config_path(None).ends_with("kontakt/config.json"));
    }
}
