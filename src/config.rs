use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::output::ReportFormat;
use crate::types::InteractionMode;

/// Defaults loaded from a TOML file; command-line flags take precedence.
///
/// ```toml
/// mode = "receive"
/// format = "json"
/// output_dir = "./reports"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub mode: Option<InteractionMode>,
    pub format: Option<ReportFormat>,
    pub output_dir: Option<PathBuf>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// Effective settings after merging the config file with CLI flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub mode: InteractionMode,
    pub format: ReportFormat,
    pub output_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn resolve(
        file: FileConfig,
        mode: Option<InteractionMode>,
        format: Option<ReportFormat>,
        output_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            mode: mode.or(file.mode).unwrap_or_default(),
            format: format.or(file.format).unwrap_or_default(),
            output_dir: output_dir.or(file.output_dir),
        }
    }

    /// Plain text to the terminal; anything else goes through a report renderer
    pub fn prints_styled(&self) -> bool {
        self.format == ReportFormat::Text && self.output_dir.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() -> Result<()> {
        let config = FileConfig::from_toml_str(
            r#"
            mode = "receive"
            format = "tsv"
            output_dir = "out"
            "#,
        )?;

        assert_eq!(config.mode, Some(InteractionMode::Receive));
        assert_eq!(config.format, Some(ReportFormat::Tsv));
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        Ok(())
    }

    #[test]
    fn test_empty_config_is_default() -> Result<()> {
        assert_eq!(FileConfig::from_toml_str("")?, FileConfig::default());
        Ok(())
    }

    #[test]
    fn test_rejects_unknown_values() {
        assert!(FileConfig::from_toml_str("mode = \"donate\"").is_err());
        assert!(FileConfig::from_toml_str("colour = \"red\"").is_err());
    }

    #[test]
    fn test_from_file() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "format = \"html\"")?;

        let config = FileConfig::from_file(file.path())?;
        assert_eq!(config.format, Some(ReportFormat::Html));
        assert_eq!(config.mode, None);

        assert!(FileConfig::from_file(file.path().with_extension("missing")).is_err());
        Ok(())
    }

    #[test]
    fn test_cli_flags_override_file() {
        let file = FileConfig {
            mode: Some(InteractionMode::Receive),
            format: Some(ReportFormat::Csv),
            output_dir: Some(PathBuf::from("from-file")),
        };

        let merged = AppConfig::resolve(file.clone(), None, Some(ReportFormat::Json), None);
        assert_eq!(merged.mode, InteractionMode::Receive);
        assert_eq!(merged.format, ReportFormat::Json);
        assert_eq!(merged.output_dir, Some(PathBuf::from("from-file")));

        let defaults = AppConfig::resolve(FileConfig::default(), None, None, None);
        assert_eq!(defaults.mode, InteractionMode::Give);
        assert_eq!(defaults.format, ReportFormat::Text);
        assert_eq!(defaults.output_dir, None);
    }

    #[test]
    fn test_prints_styled_only_for_terminal_text() {
        let terminal = AppConfig::resolve(FileConfig::default(), None, None, None);
        assert!(terminal.prints_styled());

        let json = AppConfig::resolve(FileConfig::default(), None, Some(ReportFormat::Json), None);
        assert!(!json.prints_styled());

        let to_dir = AppConfig::resolve(
            FileConfig::default(),
            None,
            None,
            Some(PathBuf::from("reports")),
        );
        assert!(!to_dir.prints_styled());
    }
}
