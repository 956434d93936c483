use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::validate;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    #[serde(default)]
    pub scrape: ScrapeConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub notify: Option<NotifyConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
    /// How long to wait on a locked database before giving up.
    #[serde(default = "default_busy_timeout_secs")]
    pub busy_timeout_secs: u64,
}

fn default_busy_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScrapeConfig {
    /// Search URL used when `startit scrape` is run without one.
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct FetchConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:55.0) Gecko/20100101 Firefox/55.0".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    /// Default recipient; `startit scrape --to` overrides it.
    pub to: String,
    pub from: String,
    #[serde(default = "default_smtp_host")]
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP login. Defaults to `from`.
    #[serde(default)]
    pub username: Option<String>,
    /// Environment variable holding the SMTP password.
    #[serde(default = "default_password_env")]
    pub password_env: String,
    /// Also send a digest when postings only disappeared.
    #[serde(default = "default_include_expired")]
    pub include_expired: bool,
}

fn default_smtp_host() -> String {
    "smtp.gmail.com".to_string()
}
fn default_smtp_port() -> u16 {
    587
}
fn default_password_env() -> String {
    "STARTIT_SMTP_PASSWORD".to_string()
}
fn default_include_expired() -> bool {
    true
}

impl NotifyConfig {
    pub fn username(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.from)
    }

    pub fn password(&self) -> Result<String> {
        std::env::var(&self.password_env).with_context(|| {
            format!(
                "SMTP password not set: export {} or disable [notify]",
                self.password_env
            )
        })
    }
}

fn looks_like_mailbox(address: &str) -> bool {
    match address.split_once('@') {
        Some((local, domain)) => !local.trim().is_empty() && !domain.trim().is_empty(),
        None => false,
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate_config(&config)?;

    Ok(config)
}

pub fn validate_config(config: &Config) -> Result<()> {
    if config.fetch.timeout_secs == 0 {
        anyhow::bail!("fetch.timeout_secs must be > 0");
    }

    if let Some(url) = &config.scrape.url {
        validate::validate(url).context("scrape.url")?;
    }

    if let Some(notify) = &config.notify {
        if !looks_like_mailbox(&notify.to) {
            anyhow::bail!("notify.to must be an email address, got '{}'", notify.to);
        }
        if !looks_like_mailbox(&notify.from) {
            anyhow::bail!("notify.from must be an email address, got '{}'", notify.from);
        }
        if notify.smtp_port == 0 {
            anyhow::bail!("notify.smtp_port must be > 0");
        }
        if notify.password_env.trim().is_empty() {
            anyhow::bail!("notify.password_env must name an environment variable");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<Config> {
        let config: Config = toml::from_str(toml_str)?;
        validate_config(&config)?;
        Ok(config)
    }

    #[test]
    fn test_minimal_config_defaults() {
        let cfg = parse("[db]\npath = \"./data/startit.sqlite\"\n").unwrap();
        assert_eq!(cfg.fetch.timeout_secs, 30);
        assert_eq!(cfg.db.busy_timeout_secs, 5);
        assert!(cfg.fetch.user_agent.contains("Firefox"));
        assert!(cfg.scrape.url.is_none());
        assert!(cfg.notify.is_none());
    }

    #[test]
    fn test_notify_defaults() {
        let cfg = parse(
            r#"
[db]
path = "db.sqlite"

[notify]
to = "me@example.com"
from = "spider@example.com"
"#,
        )
        .unwrap();
        let notify = cfg.notify.unwrap();
        assert_eq!(notify.smtp_host, "smtp.gmail.com");
        assert_eq!(notify.smtp_port, 587);
        assert_eq!(notify.username(), "spider@example.com");
        assert_eq!(notify.password_env, "STARTIT_SMTP_PASSWORD");
        assert!(notify.include_expired);
    }

    #[test]
    fn test_rejects_invalid_scrape_url() {
        let err = parse(
            r#"
[db]
path = "db.sqlite"

[scrape]
url = "https://startit.rs/poslovi/pretraga/python/qa/"
"#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("invalid link"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        assert!(parse("[db]\npath = \"db\"\n[fetch]\ntimeout_secs = 0\n").is_err());
    }

    #[test]
    fn test_rejects_bad_recipient() {
        let err = parse(
            r#"
[db]
path = "db.sqlite"

[notify]
to = "nobody"
from = "spider@example.com"
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("notify.to"));
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/startit.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
