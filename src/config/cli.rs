use crate::adapters::Provider;
use crate::core::pipeline::CorrectionMode;
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_string, Validate};
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "dryland")]
#[command(about = "Audit, repair and re-geocode address coordinates that land in water")]
pub struct CliConfig {
    /// CSV file with id,line1,city,state,zip,latitude,longitude columns
    #[arg(long)]
    pub input: String,

    #[arg(long, default_value = "./output/coordinates.csv")]
    pub output: String,

    /// Region table in TOML; the built-in New Orleans table when omitted
    #[arg(long)]
    pub config: Option<String>,

    #[arg(long, value_enum, default_value_t = CorrectionMode::Audit)]
    pub mode: CorrectionMode,

    /// Overrides the provider from the region config
    #[arg(long, value_enum)]
    pub provider: Option<Provider>,

    #[arg(long, env = "DRYLAND_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Seed for the random repair search, for reproducible runs
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Process records without writing the output file")]
    pub dry_run: bool,
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("input", &self.input)?;
        validate_non_empty_string("output", &self.output)?;
        if let Some(config) = &self.config {
            validate_non_empty_string("config", config)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_defaults() {
        let config = CliConfig::try_parse_from(["dryland", "--input", "in.csv"]).unwrap();
        assert_eq!(config.mode, CorrectionMode::Audit);
        assert_eq!(config.output, "./output/coordinates.csv");
        assert!(config.provider.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_geocode_mode() {
        let config = CliConfig::try_parse_from([
            "dryland",
            "--input",
            "in.csv",
            "--mode",
            "geocode",
            "--provider",
            "google",
            "--api-key",
            "k",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(config.mode, CorrectionMode::Geocode);
        assert_eq!(config.provider, Some(Provider::Google));
        assert_eq!(config.api_key.as_deref(), Some("k"));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_input_is_required() {
        assert!(CliConfig::try_parse_from(["dryland"]).is_err());
    }
}
