use std::{fs, path::Path, time::Duration};

use anyhow::{anyhow, Context};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "vehicle_inventory.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Listing, search, update and delete.
    pub directory_url: String,
    pub import_url: String,
    pub export_url: String,
    pub page_size: u32,
    pub notification_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            directory_url: "http://localhost:3001/graphql".into(),
            import_url: "http://localhost:3000/graphql".into(),
            export_url: "http://localhost:3002/graphql".into(),
            page_size: 100,
            notification_secs: 10,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    pub fn notification_duration(&self) -> Duration {
        Duration::from_secs(self.notification_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    directory_url: Option<String>,
    import_url: Option<String>,
    export_url: Option<String>,
    page_size: Option<u32>,
    notification_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
}

/// Defaults, then the TOML file (if present), then `APP__*` environment
/// variables. Callers layer their own overrides on top and then [`validate`].
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let raw = match fs::read_to_string(path) {
        Ok(raw) => Some(raw),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read '{}'", path.display()))
        }
    };

    let mut settings = Settings::default();
    if let Some(raw) = raw {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid configuration in '{}'", path.display()))?;
    }
    apply_env(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.directory_url {
        settings.directory_url = v;
    }
    if let Some(v) = file_cfg.import_url {
        settings.import_url = v;
    }
    if let Some(v) = file_cfg.export_url {
        settings.export_url = v;
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.notification_secs {
        settings.notification_secs = v;
    }
    if let Some(v) = file_cfg.request_timeout_secs {
        settings.request_timeout_secs = v;
    }
    Ok(())
}

fn apply_env(
    settings: &mut Settings,
    lookup: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<()> {
    if let Some(v) = lookup("APP__DIRECTORY_URL") {
        settings.directory_url = v;
    }
    if let Some(v) = lookup("APP__IMPORT_URL") {
        settings.import_url = v;
    }
    if let Some(v) = lookup("APP__EXPORT_URL") {
        settings.export_url = v;
    }
    if let Some(v) = lookup("APP__PAGE_SIZE") {
        settings.page_size = v
            .parse()
            .with_context(|| format!("APP__PAGE_SIZE is not a number: '{v}'"))?;
    }
    if let Some(v) = lookup("APP__NOTIFICATION_SECS") {
        settings.notification_secs = v
            .parse()
            .with_context(|| format!("APP__NOTIFICATION_SECS is not a number: '{v}'"))?;
    }
    if let Some(v) = lookup("APP__REQUEST_TIMEOUT_SECS") {
        settings.request_timeout_secs = v
            .parse()
            .with_context(|| format!("APP__REQUEST_TIMEOUT_SECS is not a number: '{v}'"))?;
    }
    Ok(())
}

pub fn validate(settings: &Settings) -> anyhow::Result<()> {
    for (name, value) in [
        ("directory_url", &settings.directory_url),
        ("import_url", &settings.import_url),
        ("export_url", &settings.export_url),
    ] {
        let parsed = Url::parse(value).with_context(|| format!("{name} is not a URL: '{value}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(anyhow!("{name} must use http or https, got '{value}'"));
        }
    }
    if settings.page_size == 0 {
        return Err(anyhow!("page_size must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
