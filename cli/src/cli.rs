use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use promptgen_shared::capabilities::MAX_TIMEOUT_MS;
use promptgen_shared::{Category, ServiceConfig, DEFAULT_BASE_URL};

const MAX_TIMEOUT_SECS: u64 = MAX_TIMEOUT_MS / 1000;

/// Generate AI security testing prompts from the command line.
#[derive(Parser, Debug)]
#[command(name = "promptgen")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Base URL of the generation service
    #[arg(long, global = true, env = "PROMPTGEN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter used when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Submit a generation request and print the resulting prompts
    Generate(GenerateArgs),

    /// List the attack categories that can be requested
    Categories,

    /// Check whether the generation service is up
    Health(HealthArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// What the AI agent or system under test does
    #[arg(long, default_value = "")]
    pub overview: String,

    /// System prompt of the agent under test
    #[arg(long, default_value = "")]
    pub meta_prompt: String,

    /// Number of prompts to generate (1-100)
    #[arg(long, default_value_t = promptgen_shared::DEFAULT_PROMPT_COUNT, allow_negative_numbers = true)]
    pub count: i64,

    /// Category to target; repeat for several, first mention sets the order
    #[arg(long = "category", short = 'c')]
    pub categories: Vec<Category>,

    /// Optional supporting document (txt, pdf, doc, docx)
    #[arg(long)]
    pub document: Option<PathBuf>,

    /// Also download the generated spreadsheet
    #[arg(long)]
    pub download: bool,

    /// Also write the QR code image, when the service provides one
    #[arg(long)]
    pub qr: bool,

    /// Directory for downloaded files
    #[arg(long, env = "PROMPTGEN_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub timeouts: TimeoutArgs,
}

#[derive(Args, Debug)]
pub struct HealthArgs {
    #[command(flatten)]
    pub timeouts: TimeoutArgs,
}

#[derive(Args, Debug, Clone, Copy)]
pub struct TimeoutArgs {
    /// Seconds to wait for prompt generation
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS))]
    pub generate_timeout: u64,

    /// Seconds to wait for the QR image
    #[arg(long, default_value_t = 15, value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS))]
    pub qr_timeout: u64,

    /// Seconds to wait for the spreadsheet download
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS))]
    pub download_timeout: u64,

    /// Seconds to wait for the health check
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=MAX_TIMEOUT_SECS))]
    pub health_timeout: u64,
}

impl TimeoutArgs {
    pub fn service_config(self, base_url: &str) -> ServiceConfig {
        ServiceConfig {
            generate_timeout_ms: self.generate_timeout.saturating_mul(1000),
            qr_timeout_ms: self.qr_timeout.saturating_mul(1000),
            download_timeout_ms: self.download_timeout.saturating_mul(1000),
            health_timeout_ms: self.health_timeout.saturating_mul(1000),
            ..ServiceConfig::default().with_base_url(base_url)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn repeated_categories_keep_order() {
        let cli = Cli::parse_from([
            "promptgen",
            "generate",
            "--category",
            "Data Leakage",
            "-c",
            "prompt injection",
        ]);
        let Commands::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        assert_eq!(
            args.categories,
            vec![Category::DataLeakage, Category::PromptInjection]
        );
        assert_eq!(args.count, 10);
    }

    #[test]
    fn unknown_category_is_rejected() {
        let result = Cli::try_parse_from(["promptgen", "generate", "-c", "Toxicity Generation"]);
        assert!(result.is_err());
    }

    #[test]
    fn timeouts_outside_request_limits_are_rejected() {
        for args in [
            ["promptgen", "health", "--health-timeout", "0"],
            ["promptgen", "health", "--qr-timeout", "301"],
            ["promptgen", "generate", "--generate-timeout", "600"],
        ] {
            assert!(Cli::try_parse_from(args).is_err(), "{args:?}");
        }
        let cli = Cli::try_parse_from(["promptgen", "health", "--download-timeout", "300"]).unwrap();
        let Commands::Health(args) = cli.command else {
            panic!("expected health");
        };
        assert_eq!(args.timeouts.service_config(DEFAULT_BASE_URL).validate(), Ok(()));
    }

    #[test]
    fn timeouts_map_to_milliseconds() {
        let config = TimeoutArgs {
            generate_timeout: 2,
            qr_timeout: 1,
            download_timeout: 3,
            health_timeout: 4,
        }
        .service_config("http://127.0.0.1:9");
        assert_eq!(config.generate_timeout_ms, 2000);
        assert_eq!(config.health_timeout_ms, 4000);
        assert_eq!(config.base_url, "http://127.0.0.1:9");
    }
}
