use crate::config::AppConfig;
use crate::utils::error::Result;
use crate::utils::validation::{validate_file_extensions, Validate};
use clap::Parser;

pub const DATA_EXTENSIONS: [&str; 3] = ["csv", "tsv", "json"];

#[derive(Debug, Clone, Parser)]
#[command(name = "sample-app")]
#[command(about = "Runs the sample shop demo flows: users, catalog, payments and a data pipeline")]
pub struct CliArgs {
    /// Path to a JSON or TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Call the payment gateway and write mail to the outbox. Without it the demo always runs
    /// in dev mode, whatever DEBUG or the config file say
    #[arg(long)]
    pub live: bool,

    /// Run the configured pipeline over this CSV/TSV/JSON file (relative to data_dir)
    #[arg(long)]
    pub data: Option<String>,
}

impl CliArgs {
    /// Resolves the effective configuration: file (or environment), then command-line overrides.
    pub fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::from_env()?,
        };

        // demo 預設走開發模式
        config.debug = !self.live;
        if self.verbose {
            config.log_level = "DEBUG".to_string();
        }

        Ok(config)
    }
}

impl CliArgs {
    /// The `--config` path when it points at nothing; loading then falls back to the
    /// environment, so callers should warn once logging is up.
    pub fn missing_config_file(&self) -> Option<&str> {
        self.config
            .as_deref()
            .filter(|path| !std::path::Path::new(path).exists())
    }
}

impl Validate for CliArgs {
    fn validate(&self) -> Result<()> {
        if let Some(data) = &self.data {
            validate_file_extensions("data", std::slice::from_ref(data), &DATA_EXTENSIONS)?;
        }
        Ok(())
    }
}
