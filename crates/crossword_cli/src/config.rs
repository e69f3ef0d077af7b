use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use crossword_engine::FetchSettings;
use engine_logging::engine_info;
use serde::Deserialize;

use crate::cli::Cli;

/// Optional overrides read from a RON file, e.g.
/// `(request_timeout_secs: Some(60), user_agent: Some("me"))`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    pub request_timeout_secs: Option<u64>,
    pub redirect_limit: Option<usize>,
    pub max_bytes: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        engine_info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    pub fn apply(&self, settings: &mut FetchSettings) {
        if let Some(base_url) = &self.base_url {
            settings.base_url = base_url.clone();
        }
        if let Some(user_agent) = &self.user_agent {
            settings.user_agent = user_agent.clone();
        }
        if let Some(secs) = self.connect_timeout_secs {
            settings.connect_timeout = Duration::from_secs(secs);
        }
        if let Some(secs) = self.request_timeout_secs {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = self.redirect_limit {
            settings.redirect_limit = limit;
        }
        if let Some(max_bytes) = self.max_bytes {
            settings.max_bytes = max_bytes;
        }
    }
}

/// Defaults, then the config file, then command-line flags.
pub fn fetch_settings(cli: &Cli) -> anyhow::Result<FetchSettings> {
    let mut settings = FetchSettings::default();
    if let Some(path) = &cli.config {
        FileConfig::load(path)?.apply(&mut settings);
    }
    if let Some(base_url) = &cli.base_url {
        settings.base_url = base_url.clone();
    }
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::FileConfig;
    use crossword_engine::FetchSettings;
    use std::time::Duration;

    #[test]
    fn partial_config_only_overrides_given_fields() {
        let config: FileConfig =
            ron::from_str("(request_timeout_secs: Some(5), base_url: Some(\"http://localhost\"))")
                .unwrap();
        let mut settings = FetchSettings::default();
        let redirects = settings.redirect_limit;
        config.apply(&mut settings);
        assert_eq!(settings.request_timeout, Duration::from_secs(5));
        assert_eq!(settings.base_url, "http://localhost");
        assert_eq!(settings.redirect_limit, redirects);
    }
}
