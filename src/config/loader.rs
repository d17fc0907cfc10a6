use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::info;
use serde::Deserialize;

use crate::error::{Context, Result};

use super::{validator, HarvestConfig};

/// Environment variable naming an optional JSON overlay for the builtin configuration.
pub const CONFIG_ENV_VAR: &str = "HARVEST_CONFIG";

/// Fields a JSON overlay may set; anything absent keeps its builtin value.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawHarvestConfig {
    endpoint: Option<String>,
    symbols: Option<Vec<String>>,
    page_size: Option<u32>,
    max_requests_per_window: Option<u32>,
    budget_window_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    retry_backoff_secs: Option<u64>,
    start_id: Option<i64>,
    output_root: Option<PathBuf>,
    max_concurrent_symbols: Option<usize>,
}

impl RawHarvestConfig {
    fn apply(self, base: HarvestConfig) -> HarvestConfig {
        let max_concurrent_symbols = match (self.max_concurrent_symbols, &self.symbols) {
            (Some(limit), _) => limit,
            // A replaced symbol list keeps the one-task-per-symbol default.
            (None, Some(symbols)) => symbols.len(),
            (None, None) => base.max_concurrent_symbols,
        };

        HarvestConfig {
            endpoint: self.endpoint.unwrap_or(base.endpoint),
            symbols: self.symbols.unwrap_or(base.symbols),
            page_size: self.page_size.unwrap_or(base.page_size),
            max_requests_per_window: self
                .max_requests_per_window
                .unwrap_or(base.max_requests_per_window),
            budget_window: self
                .budget_window_secs
                .map(Duration::from_secs)
                .unwrap_or(base.budget_window),
            request_timeout: self
                .request_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(base.request_timeout),
            retry_backoff: self
                .retry_backoff_secs
                .map(Duration::from_secs)
                .unwrap_or(base.retry_backoff),
            start_id: self.start_id.unwrap_or(base.start_id),
            output_root: self.output_root.unwrap_or(base.output_root),
            max_concurrent_symbols,
        }
    }
}

/// Read a JSON overlay from `path`, apply it to the builtin config and validate the result.
pub fn load_config(path: &Path) -> Result<HarvestConfig> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read harvest config at {}", path.display()))?;

    let raw: RawHarvestConfig = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse harvest config at {}", path.display()))?;

    let config = raw.apply(HarvestConfig::builtin());
    validator::validate_config(&config)?;
    Ok(config)
}

/// Use the overlay named by `HARVEST_CONFIG` when set, the builtin config otherwise.
pub fn resolve_config() -> Result<HarvestConfig> {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(path) => {
            let path = PathBuf::from(path);
            info!("Loading harvest config from {}", path.display());
            load_config(&path)
        }
        None => {
            let config = HarvestConfig::builtin();
            validator::validate_config(&config)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(contents.as_bytes()).expect("write config");
        file
    }

    #[test]
    fn overlay_overrides_only_present_fields() {
        let file = write_config(
            r#"{
                "symbols": ["BTCUSDT"],
                "max_requests_per_window": 600,
                "output_root": "data"
            }"#,
        );

        let config = load_config(file.path()).expect("config loads");
        let builtin = HarvestConfig::builtin();

        assert_eq!(config.symbols, vec!["BTCUSDT"]);
        assert_eq!(config.max_requests_per_window, 600);
        assert_eq!(config.output_root, PathBuf::from("data"));
        assert_eq!(config.max_concurrent_symbols, 1);
        assert_eq!(config.endpoint, builtin.endpoint);
        assert_eq!(config.page_size, builtin.page_size);
        assert_eq!(config.budget_window, builtin.budget_window);
    }

    #[test]
    fn empty_overlay_is_the_builtin_config() {
        let file = write_config("{}");
        let config = load_config(file.path()).expect("config loads");
        assert_eq!(config, HarvestConfig::builtin());
    }

    #[test]
    fn rejects_unknown_fields() {
        let file = write_config(r#"{ "symbol": "BTCUSDT" }"#);
        let err = load_config(file.path()).expect_err("unknown field should fail");
        assert!(
            err.to_string().contains("failed to parse harvest config"),
            "unexpected error message: {err}"
        );
    }

    #[test]
    fn overlay_is_validated() {
        let file = write_config(r#"{ "page_size": 5000 }"#);
        let err = load_config(file.path()).expect_err("oversized page should fail");
        assert!(
            err.to_string().contains("page_size"),
            "unexpected error message: {err}"
        );
    }
}
