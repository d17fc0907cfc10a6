use std::collections::HashSet;

use crate::error::{AppError, Result};

use super::{HarvestConfig, MAX_PAGE_SIZE};

/// Validate a harvest config, reporting every problem at once.
pub fn validate_config(config: &HarvestConfig) -> Result<()> {
    let mut issues = Vec::new();

    validate_endpoint(&config.endpoint, &mut issues);
    validate_symbols(&config.symbols, &mut issues);

    if config.page_size == 0 || config.page_size > MAX_PAGE_SIZE {
        issues.push(format!(
            "page_size must be between 1 and {MAX_PAGE_SIZE} (got {})",
            config.page_size
        ));
    }

    if config.max_requests_per_window == 0 {
        issues.push("max_requests_per_window must be at least 1".to_string());
    }

    if config.budget_window.is_zero() {
        issues.push("budget_window must be longer than zero".to_string());
    }

    if config.request_timeout.is_zero() {
        issues.push("request_timeout must be longer than zero".to_string());
    }

    if config.start_id < 0 {
        issues.push(format!("start_id must not be negative (got {})", config.start_id));
    }

    if config.max_concurrent_symbols == 0 {
        issues.push("max_concurrent_symbols must be at least 1".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "invalid harvest config: {}",
            issues.join("; ")
        )))
    }
}

fn validate_endpoint(endpoint: &str, issues: &mut Vec<String>) {
    let trimmed = endpoint.trim();
    if trimmed.is_empty() {
        issues.push("endpoint must not be empty".to_string());
    } else if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        issues.push(format!("endpoint must be an http(s) URL (got `{trimmed}`)"));
    }
}

fn validate_symbols(symbols: &[String], issues: &mut Vec<String>) {
    if symbols.is_empty() {
        issues.push("at least one symbol must be configured".to_string());
        return;
    }

    let mut seen = HashSet::new();
    let mut duplicates = Vec::new();

    for symbol in symbols {
        // Symbols double as directory names.
        if symbol.is_empty() || !symbol.chars().all(|c| c.is_ascii_alphanumeric()) {
            issues.push(format!(
                "symbol `{symbol}` must be non-empty ASCII alphanumeric"
            ));
        }
        if !seen.insert(symbol.as_str()) {
            duplicates.push(symbol.clone());
        }
    }

    if !duplicates.is_empty() {
        duplicates.sort();
        duplicates.dedup();
        issues.push(format!(
            "symbols contain duplicates: {}",
            duplicates.join(", ")
        ));
    }
}
