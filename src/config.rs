use crate::analytics::category::RuleSet;
use crate::error::{config_error, env_error, TallyResult};
use dotenvy::dotenv;
use std::env;
use std::fs;
use std::path::Path;

/// Default Redis connection URL
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

/// Default debounce delay for report recomputation, in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 250;

/// Default watch-mode refresh interval, in seconds
pub const DEFAULT_REFRESH_INTERVAL: u64 = 300;

/// Default location of the category rule table
pub const DEFAULT_RULES_FILE: &str = "config/category_rules.toml";

/// Main configuration structure for the dashboard
#[derive(Debug, Clone)]
pub struct Config {
    /// Google Calendar API client ID
    pub google_client_id: String,
    /// Google Calendar API client secret
    pub google_client_secret: String,
    /// Redis connection URL for the ephemeral OAuth token
    pub redis_url: String,
    /// Viewer timezone used for day bucketing
    pub timezone: String,
    /// Debounce delay for report recomputation, in milliseconds
    pub debounce_ms: u64,
    /// Watch-mode refresh interval, in seconds
    pub refresh_interval: u64,
    /// Optional restriction to specific calendar IDs
    pub calendars: Option<Vec<String>>,
    /// Category rule table for classifying events
    pub rules: RuleSet,
}

impl Config {
    /// Load configuration from environment and the rule file
    pub fn load() -> TallyResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        // Required environment variables
        let google_client_id =
            env::var("GOOGLE_CLIENT_ID").map_err(|_| env_error("GOOGLE_CLIENT_ID"))?;
        let google_client_secret =
            env::var("GOOGLE_CLIENT_SECRET").map_err(|_| env_error("GOOGLE_CLIENT_SECRET"))?;

        // Optional values with defaults
        let redis_url = env::var("REDIS_URL").unwrap_or_else(|_| String::from(DEFAULT_REDIS_URL));
        let timezone = env::var("TIMEZONE").unwrap_or_else(|_| String::from("UTC"));

        let debounce_ms = match env::var("DEBOUNCE_MS") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid DEBOUNCE_MS format"))?,
            Err(_) => DEFAULT_DEBOUNCE_MS,
        };

        let refresh_interval = match env::var("REFRESH_INTERVAL") {
            Ok(value) => value
                .parse::<u64>()
                .map_err(|_| config_error("Invalid REFRESH_INTERVAL format"))?,
            Err(_) => DEFAULT_REFRESH_INTERVAL,
        };

        // Optional comma-separated calendar restriction
        let calendars = env::var("WORKTALLY_CALENDARS")
            .ok()
            .map(|raw| {
                raw.split(',')
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|ids| !ids.is_empty());

        // Category rule table, from file when present
        let rules_file =
            env::var("RULES_FILE").unwrap_or_else(|_| String::from(DEFAULT_RULES_FILE));
        let rules = load_rules(&rules_file)?;

        Ok(Config {
            google_client_id,
            google_client_secret,
            redis_url,
            timezone,
            debounce_ms,
            refresh_interval,
            calendars,
            rules,
        })
    }
}

/// Load the category rule table from a TOML file, falling back to the
/// built-in table when the file does not exist
fn load_rules(path: &str) -> TallyResult<RuleSet> {
    if !Path::new(path).exists() {
        tracing::debug!("Rule file {} not found, using built-in rules", path);
        return Ok(RuleSet::default());
    }

    let content = fs::read_to_string(path)?;
    let rules = toml::from_str::<RuleSet>(&content)
        .map_err(|e| config_error(&format!("Invalid rule file {}: {}", path, e)))?;

    tracing::debug!("Loaded {} category rules from {}", rules.len(), path);
    Ok(rules)
}
