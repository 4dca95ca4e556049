use std::{fs, path::Path, time::Duration};

use anyhow::Context;
use list_core::{config::DEFAULT_PAGE_SIZE, ListConfig};
use serde::Deserialize;

pub const DEFAULT_CONFIG_FILE: &str = "browser.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Listing backend; the offline dataset is used when unset.
    pub api_url: Option<String>,
    pub page_size: u32,
    pub search_param: String,
    pub page_param: String,
    /// Artificial delay of the offline dataset.
    pub offline_latency_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let list = ListConfig::default();
        Self {
            api_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_param: list.search_param,
            page_param: list.page_param,
            offline_latency_ms: 250,
        }
    }
}

impl Settings {
    pub fn list_config(&self) -> ListConfig {
        ListConfig::default()
            .with_page_size(self.page_size)
            .with_params(self.search_param.clone(), self.page_param.clone())
    }

    pub fn offline_latency(&self) -> Duration {
        Duration::from_millis(self.offline_latency_ms)
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    api_url: Option<String>,
    page_size: Option<u32>,
    search_param: Option<String>,
    page_param: Option<String>,
    offline_latency_ms: Option<u64>,
}

/// Defaults, then `path` (or `browser.toml` when present), then the environment.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    let mut settings = Settings::default();

    match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file '{}'", path.display()))?;
            apply_file(&mut settings, &raw)
                .with_context(|| format!("invalid config file '{}'", path.display()))?;
        }
        None => {
            if let Ok(raw) = fs::read_to_string(DEFAULT_CONFIG_FILE) {
                apply_file(&mut settings, &raw)
                    .with_context(|| format!("invalid config file '{DEFAULT_CONFIG_FILE}'"))?;
            }
        }
    }

    apply_env(&mut settings, |key| std::env::var(key).ok());
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file_cfg: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file_cfg.api_url {
        settings.api_url = non_blank(v);
    }
    if let Some(v) = file_cfg.page_size {
        settings.page_size = v;
    }
    if let Some(v) = file_cfg.search_param {
        settings.search_param = v;
    }
    if let Some(v) = file_cfg.page_param {
        settings.page_param = v;
    }
    if let Some(v) = file_cfg.offline_latency_ms {
        settings.offline_latency_ms = v;
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("BROWSER_API_URL") {
        settings.api_url = non_blank(v);
    }
    if let Some(v) = var("APP__API_URL") {
        settings.api_url = non_blank(v);
    }

    if let Some(v) = var("APP__PAGE_SIZE") {
        if let Ok(parsed) = v.parse::<u32>() {
            settings.page_size = parsed;
        }
    }

    if let Some(v) = var("APP__SEARCH_PARAM") {
        settings.search_param = v;
    }
    if let Some(v) = var("APP__PAGE_PARAM") {
        settings.page_param = v;
    }

    if let Some(v) = var("APP__OFFLINE_LATENCY_MS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.offline_latency_ms = parsed;
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
