//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::PathBuf;

/// DuoFlow - autonomous trigger-bus orchestrator for code analysis
///
/// Feed it a code sample and the agent roster audits it over a
/// self-propagating trigger bus: security, review, performance,
/// compliance, refactoring, and integration agents react to typed
/// signals and chain follow-up signals until the workflow settles.
///
/// Examples:
///   duoflow --input src/server.js
///   duoflow --input snippet.py --model qwen2.5-coder:32b --format json
///   duoflow --input snippet.py --fail-on high
///   duoflow --dry-run
///   duoflow --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the code sample to analyze
    ///
    /// Not required for --dry-run or --init-config.
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Ollama model to use for analysis
    ///
    /// Recommended models: llama3.2:latest, codellama:34b, qwen2.5-coder:32b.
    /// Can also be set via DUOFLOW_MODEL env var or .duoflow.toml config.
    #[arg(short, long, default_value = "llama3.2:latest", env = "DUOFLOW_MODEL")]
    pub model: String,

    /// Output file path for the report
    #[arg(short, long, default_value = "duoflow_report.md", value_name = "FILE")]
    pub output: PathBuf,

    /// Ollama API endpoint URL
    #[arg(long, default_value = "http://localhost:11434", env = "OLLAMA_URL")]
    pub ollama_url: String,

    /// Path to configuration file
    ///
    /// If not specified, looks for .duoflow.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format (markdown, json)
    #[arg(long, default_value = "markdown", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Temperature for LLM responses (0.0 - 1.0)
    ///
    /// Lower values produce more consistent/deterministic output
    #[arg(long, default_value = "0.1")]
    pub temperature: f32,

    /// Request timeout in seconds, per adapter call
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Bound the number of triggers consumed in one run
    ///
    /// A safety valve against runaway signal chains. Unset, the bus
    /// drains until the queue empties.
    #[arg(long, value_name = "COUNT")]
    pub max_triggers: Option<usize>,

    /// Fail if findings at or above this severity are present
    ///
    /// Useful for CI pipelines. Exit code 2 when the threshold is hit.
    /// Values: high, medium, low, info
    #[arg(long, value_name = "LEVEL")]
    pub fail_on: Option<SeverityLevel>,

    /// Dry run: print the agent roster and subscription matrix, no LLM calls
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .duoflow.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

/// Severity level for --fail-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
pub enum SeverityLevel {
    Info,
    Low,
    Medium,
    High,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // The input file is required unless we only print the roster
        if !self.dry_run {
            match self.input {
                None => return Err("An input file is required (use --input)".to_string()),
                Some(ref path) => {
                    if !path.exists() {
                        return Err(format!("Input file does not exist: {}", path.display()));
                    }
                    if !path.is_file() {
                        return Err(format!("Input path is not a file: {}", path.display()));
                    }
                }
            }

            // Validate Ollama URL format
            if !self.ollama_url.starts_with("http://") && !self.ollama_url.starts_with("https://") {
                return Err("Ollama URL must start with 'http://' or 'https://'".to_string());
            }
        }

        // Validate temperature range
        if !(0.0..=1.0).contains(&self.temperature) {
            return Err("Temperature must be between 0.0 and 1.0".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        // Validate timeout if provided
        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        // Validate trigger bound if provided
        if let Some(max_triggers) = self.max_triggers {
            if max_triggers == 0 {
                return Err("Max triggers must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            input: None,
            model: "test".to_string(),
            output: PathBuf::from("test.md"),
            ollama_url: "http://localhost:11434".to_string(),
            config: None,
            verbose: false,
            quiet: false,
            format: OutputFormat::Markdown,
            temperature: 0.1,
            timeout: None,
            max_triggers: None,
            fail_on: None,
            dry_run: true,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_requires_input_without_dry_run() {
        let mut args = make_args();
        args.dry_run = false;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_temperature_range() {
        let mut args = make_args();
        args.temperature = 1.5;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_zero_max_triggers() {
        let mut args = make_args();
        args.max_triggers = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_severity_level_ordering() {
        assert!(SeverityLevel::Info < SeverityLevel::Low);
        assert!(SeverityLevel::Medium < SeverityLevel::High);
    }
}
