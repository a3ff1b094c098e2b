use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;

use crate::core::errors::AssistError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_SECTIONS_TABLE: &str = "page_section";
pub const DEFAULT_TOKEN_BUDGET: usize = 1500;
pub const DEFAULT_PRODUCT_NAME: &str = "the product";

const OPENAI_KEY: &str = "OPENAI_KEY";
const SUPABASE_URL: &str = "SUPABASE_URL";
const SUPABASE_SERVICE_ROLE_KEY: &str = "SUPABASE_SERVICE_ROLE_KEY";

/// Process-wide settings read once at startup.
///
/// Credentials are kept optional here and only enforced per request via
/// [`Settings::credentials`], so a misconfigured deployment still answers
/// every query with a structured configuration error.
#[derive(Debug, Clone)]
pub struct Settings {
    pub openai_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub openai_base_url: String,
    pub embedding_model: String,
    pub sections_table: String,
    pub token_budget: usize,
    pub product_name: String,
    pub tokenizer_path: Option<PathBuf>,
    pub http_timeout: Option<Duration>,
    pub host: String,
    pub port: u16,
    pub log_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_key: None,
            supabase_url: None,
            supabase_service_role_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            sections_table: DEFAULT_SECTIONS_TABLE.to_string(),
            token_budget: DEFAULT_TOKEN_BUDGET,
            product_name: DEFAULT_PRODUCT_NAME.to_string(),
            tokenizer_path: None,
            http_timeout: None,
            host: "0.0.0.0".to_string(),
            port: 8000,
            log_dir: None,
        }
    }
}

/// Credentials required before any remote call is made.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub openai_key: String,
    pub supabase_url: String,
    pub supabase_service_role_key: String,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup. Blank values are treated
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Settings::default();

        Ok(Settings {
            openai_key: get(OPENAI_KEY),
            supabase_url: get(SUPABASE_URL),
            supabase_service_role_key: get(SUPABASE_SERVICE_ROLE_KEY),
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            embedding_model: get("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            sections_table: get("SECTIONS_TABLE").unwrap_or(defaults.sections_table),
            token_budget: parse_optional(&get, "CONTEXT_TOKEN_BUDGET")?
                .unwrap_or(defaults.token_budget),
            product_name: get("PRODUCT_NAME").unwrap_or(defaults.product_name),
            tokenizer_path: get("TOKENIZER_PATH").map(PathBuf::from),
            http_timeout: parse_optional::<u64, _>(&get, "HTTP_TIMEOUT_SECS")?
                .map(Duration::from_secs),
            host: get("HOST").unwrap_or(defaults.host),
            port: parse_optional(&get, "PORT")?.unwrap_or(defaults.port),
            log_dir: get("LOG_DIR").map(PathBuf::from),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Fails with a configuration error naming the first missing variable.
    pub fn credentials(&self) -> Result<Credentials, AssistError> {
        Ok(Credentials {
            openai_key: require(&self.openai_key, OPENAI_KEY)?,
            supabase_url: require(&self.supabase_url, SUPABASE_URL)?,
            supabase_service_role_key: require(
                &self.supabase_service_role_key,
                SUPABASE_SERVICE_ROLE_KEY,
            )?,
        })
    }
}

fn require(value: &Option<String>, name: &str) -> Result<String, AssistError> {
    value
        .clone()
        .ok_or_else(|| AssistError::configuration(format!("Missing environment variable {name}")))
}

fn parse_optional<T, G>(get: &G, key: &str) -> anyhow::Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .with_context(|| format!("Invalid value for {key}: {raw:?}"))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ErrorKind;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.token_budget, 1500);
        assert_eq!(settings.embedding_model, "text-embedding-ada-002");
        assert_eq!(settings.sections_table, "page_section");
        assert_eq!(settings.bind_addr(), "0.0.0.0:8000");
        assert!(settings.http_timeout.is_none());
    }

    #[test]
    fn missing_openai_key_is_a_configuration_error() {
        let settings = Settings::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ]))
        .unwrap();

        let err = settings.credentials().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert!(err.message().contains("OPENAI_KEY"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_KEY", "sk-test"),
            ("SUPABASE_URL", "   "),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
        ]))
        .unwrap();

        let err = settings.credentials().unwrap_err();
        assert!(err.message().contains("SUPABASE_URL"));
    }

    #[test]
    fn complete_credentials_resolve() {
        let settings = Settings::from_lookup(lookup(&[
            ("OPENAI_KEY", "sk-test"),
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "service"),
            ("OPENAI_BASE_URL", "http://127.0.0.1:9999/v1/"),
            ("CONTEXT_TOKEN_BUDGET", "200"),
            ("HTTP_TIMEOUT_SECS", "30"),
        ]))
        .unwrap();

        let creds = settings.credentials().unwrap();
        assert_eq!(creds.openai_key, "sk-test");
        assert_eq!(settings.openai_base_url, "http://127.0.0.1:9999/v1");
        assert_eq!(settings.token_budget, 200);
        assert_eq!(settings.http_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn malformed_numbers_fail_startup() {
        let err = Settings::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}
