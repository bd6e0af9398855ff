use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::partners::delimiter_byte;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Standardize partner eligibility files into one unified dataset
#[derive(Parser, Debug, Clone)]
#[command(
    name = "eligibility-ingest",
    about = "Standardize partner eligibility files into one unified dataset",
    version
)]
pub struct Settings {
    /// Partner configuration file (JSON)
    #[arg(long, env = "ELIGIBILITY_CONFIG", default_value = "partners.json")]
    pub config: PathBuf,

    /// Directory the output datasets are written to
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,

    /// Field delimiter for the output datasets
    #[arg(long, default_value = ",")]
    pub output_delimiter: String,

    /// Number of unified rows to print after the run (0 disables)
    #[arg(long, default_value = "50")]
    pub preview: usize,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Settings {
    /// Parse the process arguments and apply the `--debug` override.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but over an explicit argument list.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(args).resolve_debug()
    }

    /// The output delimiter as a single byte.
    pub fn output_delimiter_byte(&self) -> Result<u8> {
        delimiter_byte(&self.output_delimiter)
    }

    fn resolve_debug(mut self) -> Self {
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["eligibility-ingest"]);

        assert_eq!(settings.config, PathBuf::from("partners.json"));
        assert_eq!(settings.output_dir, PathBuf::from("output"));
        assert_eq!(settings.output_delimiter, ",");
        assert_eq!(settings.preview, 50);
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.log_file.is_none());
        assert!(!settings.debug);
    }

    #[test]
    fn test_settings_cli_explicit_paths() {
        let settings = Settings::parse_from([
            "eligibility-ingest",
            "--config",
            "/etc/partners.json",
            "--output-dir",
            "/tmp/out",
        ]);
        assert_eq!(settings.config, PathBuf::from("/etc/partners.json"));
        assert_eq!(settings.output_dir, PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_settings_cli_preview_disabled() {
        let settings = Settings::parse_from(["eligibility-ingest", "--preview", "0"]);
        assert_eq!(settings.preview, 0);
    }

    #[test]
    fn test_settings_rejects_unknown_log_level() {
        let result = Settings::try_parse_from(["eligibility-ingest", "--log-level", "TRACE"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_overrides_log_level() {
        let settings = Settings::load_from_args(["eligibility-ingest", "--debug"]);
        assert_eq!(settings.log_level, "DEBUG");
    }

    #[test]
    fn test_output_delimiter_byte() {
        let settings = Settings::parse_from(["eligibility-ingest", "--output-delimiter", ";"]);
        assert_eq!(settings.output_delimiter_byte().unwrap(), b';');

        let bad = Settings::parse_from(["eligibility-ingest", "--output-delimiter", "::"]);
        assert!(bad.output_delimiter_byte().is_err());
    }
}
