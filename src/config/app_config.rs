use crate::utils::error::{AppError, Result};
use crate::utils::helpers::deep_merge;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_range, validate_required_field,
    validate_url, Validate,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

const LOG_LEVELS: [&str; 7] = [
    "TRACE", "DEBUG", "INFO", "WARN", "WARNING", "ERROR", "CRITICAL",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app_name: String,
    pub debug: bool,
    pub secret_key: String,

    pub database_url: String,
    pub redis_url: String,

    pub email_host: String,
    pub email_port: u32,
    pub email_username: String,
    pub email_password: String,

    pub payment_api_key: String,
    pub payment_gateway_url: String,

    pub log_level: String,
    pub token_expiry_hours: i64,
    pub outbox_dir: String,
    pub data_dir: String,

    pub pipeline: PipelineSettings,
}

/// Cleaning steps for record pipelines, in the order they run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub required_fields: Vec<String>,
    pub normalize_fields: Vec<String>,
    pub numeric_fields: Vec<String>,
    pub stats_field: Option<String>,
    pub group_by: Option<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            required_fields: vec!["name".to_string(), "price".to_string()],
            normalize_fields: vec!["name".to_string(), "category".to_string()],
            numeric_fields: vec!["price".to_string()],
            stats_field: Some("price".to_string()),
            group_by: Some("category".to_string()),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "SampleApp".to_string(),
            debug: false,
            secret_key: "default-secret-key-change-in-production".to_string(),
            database_url: "sqlite:///sample.db".to_string(),
            redis_url: "redis://localhost:6379/0".to_string(),
            email_host: "smtp.gmail.com".to_string(),
            email_port: 587,
            email_username: String::new(),
            email_password: String::new(),
            payment_api_key: String::new(),
            payment_gateway_url: "https://api.payment.example.com".to_string(),
            log_level: "INFO".to_string(),
            token_expiry_hours: 24,
            outbox_dir: "./outbox".to_string(),
            data_dir: "./data".to_string(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl AppConfig {
    /// 預設值加上環境變數覆蓋
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`AppConfig::from_env`], reading variables through `lookup`.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let set = |name: &str, target: &mut String| {
            if let Some(value) = lookup(name) {
                *target = value;
            }
        };

        set("SECRET_KEY", &mut config.secret_key);
        set("DATABASE_URL", &mut config.database_url);
        set("REDIS_URL", &mut config.redis_url);
        set("EMAIL_HOST", &mut config.email_host);
        set("EMAIL_USERNAME", &mut config.email_username);
        set("EMAIL_PASSWORD", &mut config.email_password);
        set("PAYMENT_API_KEY", &mut config.payment_api_key);
        set("PAYMENT_GATEWAY_URL", &mut config.payment_gateway_url);
        set("LOG_LEVEL", &mut config.log_level);

        if let Some(debug) = lookup("DEBUG") {
            config.debug = debug.trim().eq_ignore_ascii_case("true");
        }

        if let Some(port) = lookup("EMAIL_PORT") {
            config.email_port =
                port.trim()
                    .parse()
                    .map_err(|_| AppError::InvalidConfigValueError {
                        field: "EMAIL_PORT".to_string(),
                        value: port.clone(),
                        reason: "Port must be a number".to_string(),
                    })?;
        }

        Ok(config)
    }

    /// Loads overrides from a JSON object on top of [`AppConfig::from_env`].
    ///
    /// Keys are case-insensitive (`APP_NAME` and `app_name` both work) and unknown keys are
    /// ignored. A missing file only logs a warning.
    pub fn from_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let base = Self::from_env()?;

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("Config file not found: {}", path.display());
                return Ok(base);
            }
            Err(e) => return Err(e.into()),
        };

        let overrides: Value = serde_json::from_str(&content)?;
        base.apply_overrides(overrides)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        let overrides: Value = toml::from_str(&processed_content)?;
        Self::from_env()?.apply_overrides(overrides)
    }

    /// `.json` files go through [`AppConfig::from_json`]; anything else is read as TOML.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(path)
        } else {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml_str(&content)
        }
    }

    fn apply_overrides(self, overrides: Value) -> Result<Self> {
        if !overrides.is_object() {
            return Err(AppError::config("configuration root must be an object"));
        }

        let base = serde_json::to_value(&self)?;
        let merged = deep_merge(&base, &lowercase_keys(overrides));
        Ok(serde_json::from_value(merged)?)
    }

    /// 替換環境變數 (例如 ${API_KEY})
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::LazyLock;

        static ENV_VAR_RE: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid env var regex"));

        ENV_VAR_RE
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    /// Non-secret settings, keyed the way operators write them in env files.
    pub fn public_view(&self) -> Value {
        serde_json::json!({
            "APP_NAME": self.app_name,
            "DEBUG": self.debug,
            "DATABASE_URL": self.database_url,
            "LOG_LEVEL": self.log_level,
        })
    }

    pub fn sender_address(&self) -> &str {
        if self.email_username.is_empty() {
            "noreply@localhost"
        } else {
            &self.email_username
        }
    }
}

fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), lowercase_keys(v)))
                .collect(),
        ),
        other => other,
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("app_name", &self.app_name)?;
        validate_url("payment_gateway_url", &self.payment_gateway_url)?;
        validate_range("email_port", self.email_port, 1, 65535)?;
        validate_range("token_expiry_hours", self.token_expiry_hours, 1, 720)?;
        validate_path("outbox_dir", &self.outbox_dir)?;
        validate_path("data_dir", &self.data_dir)?;
        self.pipeline.validate()?;

        let level = self.log_level.trim().to_ascii_uppercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(AppError::InvalidConfigValueError {
                field: "log_level".to_string(),
                value: self.log_level.clone(),
                reason: format!("Valid levels: {}", LOG_LEVELS.join(", ")),
            });
        }

        Ok(())
    }
}

impl Validate for PipelineSettings {
    /// Grouped reports carry stats, so `group_by` needs a `stats_field` that is cast to numbers.
    fn validate(&self) -> Result<()> {
        if self.group_by.is_none() {
            return Ok(());
        }

        let stats_field = validate_required_field("pipeline.stats_field", &self.stats_field)?;
        if !self.numeric_fields.iter().any(|f| f == stats_field) {
            return Err(AppError::InvalidConfigValueError {
                field: "pipeline.stats_field".to_string(),
                value: stats_field.clone(),
                reason: "must be listed in pipeline.numeric_fields".to_string(),
            });
        }
        Ok(())
    }
}
