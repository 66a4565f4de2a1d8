//! Runtime configuration: a TOML file, overridden by `STREAMDESK_*` environment variables.

use eyre::{Context, bail};
use serde::Deserialize;
use std::fmt::{self, Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_NEWS_API_KEY: &str = "STREAMDESK_NEWS_API_KEY";
pub const ENV_CLIENT_ID: &str = "STREAMDESK_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "STREAMDESK_CLIENT_SECRET";
pub const ENV_TOKEN_PATH: &str = "STREAMDESK_TOKEN_PATH";
pub const ENV_LOG_TRAFFIC: &str = "STREAMDESK_LOG_TRAFFIC";

#[derive(Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub news_api_key: String,
    pub oauth_client_id: String,
    pub oauth_client_secret: String,
    /// Where [`FileTokenStore`](crate::token_store::FileTokenStore) keeps the tokens.
    pub token_path: PathBuf,
    /// Log request and response bodies at debug level. Credentials are always redacted.
    pub log_traffic: bool,
    /// Published to when no stream is bound.
    pub fallback_publish_url: String,
    pub fallback_stream_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_api_key: String::new(),
            oauth_client_id: String::new(),
            oauth_client_secret: String::new(),
            token_path: default_token_path(),
            log_traffic: false,
            fallback_publish_url: "rtmp://a.rtmp.youtube.com/live2".into(),
            fallback_stream_name: String::new(),
        }
    }
}

fn default_token_path() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => Path::new(&home).join(".config/streamdesk/tokens.json"),
        None => PathBuf::from("streamdesk-tokens.json"),
    }
}

impl Config {
    /// Reads the config file at `path`, then applies environment overrides.
    ///
    /// A missing file is not an error; every key falls back to its default.
    pub fn load(path: &Path) -> eyre::Result<Self> {
        tracing::debug!(path = %path.display(), "loading config");
        let mut config = match std::fs::read_to_string(path) {
            Ok(text) => Self::from_toml(&text)
                .with_context(|| format!("invalid config: {}", path.display()))?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => {
                return Err(e).with_context(|| format!("read config {}", path.display()));
            }
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        tracing::debug!(config = %config, "using config");
        Ok(config)
    }

    pub fn from_toml(text: &str) -> eyre::Result<Self> {
        toml::from_str(text).context("parse TOML")
    }

    /// Overrides fields from whichever `STREAMDESK_*` variables `lookup` yields.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<()> {
        if let Some(v) = lookup(ENV_NEWS_API_KEY) {
            self.news_api_key = v;
        }
        if let Some(v) = lookup(ENV_CLIENT_ID) {
            self.oauth_client_id = v;
        }
        if let Some(v) = lookup(ENV_CLIENT_SECRET) {
            self.oauth_client_secret = v;
        }
        if let Some(v) = lookup(ENV_TOKEN_PATH) {
            self.token_path = PathBuf::from(v);
        }
        if let Some(v) = lookup(ENV_LOG_TRAFFIC) {
            self.log_traffic = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "" | "0" | "false" | "no" | "off" => false,
                other => bail!("{ENV_LOG_TRAFFIC} must be a boolean, got {other:?}"),
            };
        }
        Ok(())
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        fn set(value: &str) -> &'static str {
            if value.is_empty() { "<unset>" } else { "..." }
        }
        write!(
            f,
            "Config {{ news_api_key = {}, oauth_client_id = {}, oauth_client_secret = {}, \
             token_path = '{}', log_traffic = {}, fallback_publish_url = '{}' }}",
            set(&self.news_api_key),
            set(&self.oauth_client_id),
            set(&self.oauth_client_secret),
            self.token_path.display(),
            self.log_traffic,
            self.fallback_publish_url,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            news_api_key = "news-key"
            log_traffic = true
            "#,
        )
        .unwrap();
        assert_eq!(config.news_api_key, "news-key");
        assert!(config.log_traffic);
        assert_eq!(config.oauth_client_id, "");
        assert_eq!(config.fallback_publish_url, "rtmp://a.rtmp.youtube.com/live2");
    }

    #[test]
    fn unknown_key_is_rejected() {
        assert!(Config::from_toml("news_key = \"x\"").is_err());
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(
            config.fallback_publish_url,
            Config::default().fallback_publish_url
        );
    }

    #[test]
    fn env_overrides_file() {
        let mut config = Config::from_toml(
            r#"
            oauth_client_id = "from-file"
            token_path = "/tmp/file-tokens.json"
            "#,
        )
        .unwrap();
        let env: HashMap<&str, &str> = [
            (ENV_CLIENT_ID, "from-env"),
            (ENV_CLIENT_SECRET, "secret"),
            (ENV_LOG_TRAFFIC, "yes"),
        ]
        .into_iter()
        .collect();

        config
            .apply_env(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.oauth_client_id, "from-env");
        assert_eq!(config.oauth_client_secret, "secret");
        assert_eq!(config.token_path, PathBuf::from("/tmp/file-tokens.json"));
        assert!(config.log_traffic);
    }

    #[test]
    fn bad_boolean_in_env() {
        let mut config = Config::default();
        let e = config
            .apply_env(|name| (name == ENV_LOG_TRAFFIC).then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(e.to_string().contains(ENV_LOG_TRAFFIC));
    }

    #[test]
    fn display_hides_secrets() {
        let config = Config {
            news_api_key: "news-secret".into(),
            oauth_client_secret: "oauth-secret".into(),
            ..Config::default()
        };
        let shown = config.to_string();
        assert!(!shown.contains("news-secret"), "{shown}");
        assert!(!shown.contains("oauth-secret"), "{shown}");
        assert!(shown.contains("oauth_client_id = <unset>"));
    }
}
