use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{
    CONFIG_FILE, DEFAULT_LINE_OCTETS, DEFAULT_MAX_DEPTH, DEFAULT_TIMEZONE, PRODUCT_ID,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    pub parser: ParserConfig,
    pub serializer: SerializerConfig,
    pub broker: BrokerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ParserConfig {
    /// Promote recoverable problems (value fallbacks, unresolved zones) to errors.
    pub strict: bool,
    pub max_depth: usize,
    /// Longest physical line accepted in strict mode.
    pub max_line_octets: usize,
    pub default_timezone: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_depth: DEFAULT_MAX_DEPTH,
            max_line_octets: DEFAULT_LINE_OCTETS,
            default_timezone: DEFAULT_TIMEZONE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SerializerConfig {
    pub line_octets: usize,
}

impl Default for SerializerConfig {
    fn default() -> Self {
        Self {
            line_octets: DEFAULT_LINE_OCTETS,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Drop messages for attendees who only see insignificant changes.
    pub suppress_insignificant: bool,
    pub product_id: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            suppress_insignificant: false,
            product_id: PRODUCT_ID.to_string(),
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `KASUMI_*` environment variables and an optional
    /// `kasumi.toml` in the working directory. Environment variables take
    /// precedence over the file, the file over built-in defaults.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_from(CONFIG_FILE)
    }

    /// ## Summary
    /// Same as [`Settings::load`] with an explicit configuration file path.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load_from(path: &str) -> Result<Self> {
        let defaults = Self::default();

        let settings = Config::builder()
            .set_default("parser.strict", defaults.parser.strict)?
            .set_default("parser.max_depth", to_i64(defaults.parser.max_depth))?
            .set_default(
                "parser.max_line_octets",
                to_i64(defaults.parser.max_line_octets),
            )?
            .set_default("parser.default_timezone", defaults.parser.default_timezone)?
            .set_default(
                "serializer.line_octets",
                to_i64(defaults.serializer.line_octets),
            )?
            .set_default(
                "broker.suppress_insignificant",
                defaults.broker.suppress_insignificant,
            )?
            .set_default("broker.product_id", defaults.broker.product_id)?
            // TOML file
            .add_source(config::File::with_name(path).required(false))
            // Env
            .add_source(
                config::Environment::with_prefix("KASUMI")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(config::Case::Snake)
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize::<Settings>()?;

        tracing::debug!(
            strict = settings.parser.strict,
            max_depth = settings.parser.max_depth,
            line_octets = settings.serializer.line_octets,
            "Loaded settings"
        );

        Ok(settings)
    }
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// ## Summary
/// Loads configuration from environment variables and `kasumi.toml`.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    Settings::load()
}
