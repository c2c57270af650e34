use anyhow::{Context, Result, bail};
use std::path::PathBuf;

pub const DEFAULT_PAGE_PATH_REGEX: &str = r"(([\w-]{1,})(/[\w-]{1,})*)/";

#[derive(Clone, Debug)]
pub struct CmsConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub bind_addr: String,
    // first entry is the fallback when nothing else resolves
    pub languages: Vec<String>,
    pub default_language: String,
    pub language_cookie_name: String,
    pub page_path_regex: String,
    pub debug: bool,
    pub markup_backend: String,
    pub use_x_accel_redirect: bool,
    pub media_root: PathBuf,
    pub media_url: String,
    pub login_url: String,
}

impl CmsConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("Failed to determine DATABASE_URL from environment variables")?;

        let max_connections = std::env::var("MAX_CONNECTIONS")
            .ok()
            .and_then(|val| val.parse::<u32>().ok())
            .unwrap_or(15);

        let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let languages = parse_languages(
            &std::env::var("LANGUAGES").unwrap_or_else(|_| "en,ja".to_string()),
        );

        let default_language = std::env::var("LANGUAGE_CODE")
            .ok()
            .or_else(|| languages.first().cloned())
            .unwrap_or_default();

        let config = Self {
            database_url,
            max_connections,
            bind_addr,
            languages,
            default_language,
            language_cookie_name: std::env::var("LANGUAGE_COOKIE_NAME")
                .unwrap_or_else(|_| "cms_language".to_string()),
            page_path_regex: std::env::var("PAGE_PATH_REGEX")
                .unwrap_or_else(|_| DEFAULT_PAGE_PATH_REGEX.to_string()),
            debug: env_flag("DEBUG"),
            markup_backend: std::env::var("MARKUP_BACKEND")
                .unwrap_or_else(|_| "markdown".to_string()),
            use_x_accel_redirect: env_flag("USE_X_ACCEL_REDIRECT"),
            media_root: PathBuf::from(
                std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string()),
            ),
            media_url: std::env::var("MEDIA_URL").unwrap_or_else(|_| "/media/".to_string()),
            login_url: std::env::var("LOGIN_URL")
                .unwrap_or_else(|_| "/accounts/login/".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.languages.is_empty() {
            bail!("LANGUAGES must name at least one language");
        }
        if !self.languages.contains(&self.default_language) {
            bail!(
                "LANGUAGE_CODE '{}' is not one of the configured LANGUAGES",
                self.default_language
            );
        }
        regex::Regex::new(&self.page_path_regex)
            .with_context(|| format!("Invalid PAGE_PATH_REGEX '{}'", self.page_path_regex))?;
        Ok(())
    }
}

fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .map(|val| matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

pub fn parse_languages(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|code| code.trim().to_lowercase())
        .filter(|code| !code.is_empty())
        .collect()
}
