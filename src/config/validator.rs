use crate::error::{AppError, Result};

use super::Config;

/// Check the configuration invariants, reporting every problem at once.
pub fn validate_config(config: &Config) -> Result<()> {
    let mut issues = Vec::new();

    if config.api.base_url.trim().is_empty() {
        issues.push("api.base_url must not be empty".to_string());
    } else if !config.api.base_url.starts_with("http://")
        && !config.api.base_url.starts_with("https://")
    {
        issues.push(format!(
            "api.base_url must be an http(s) URL, found `{}`",
            config.api.base_url
        ));
    }

    for (label, path) in [
        ("api.quote_path", &config.api.quote_path),
        ("api.search_path", &config.api.search_path),
    ] {
        if !path.starts_with('/') {
            issues.push(format!("{label} must start with `/`, found `{path}`"));
        }
    }

    if config.api.default_key.trim().is_empty() {
        issues.push("api.default_key must not be empty".to_string());
    }

    for (label, ttl) in [
        ("cache.quote_ttl", config.cache.quote_ttl),
        ("cache.search_ttl", config.cache.search_ttl),
        ("cache.history_ttl", config.cache.history_ttl),
    ] {
        if ttl.is_zero() {
            issues.push(format!("{label} must be greater than zero"));
        }
    }

    if config.quota.per_minute_limit == 0 {
        issues.push("quota.per_minute_limit must be greater than zero".to_string());
    } else if config.quota.warning_threshold >= config.quota.per_minute_limit {
        issues.push(format!(
            "quota.warning_threshold ({}) must be below quota.per_minute_limit ({})",
            config.quota.warning_threshold, config.quota.per_minute_limit
        ));
    }

    if config.batch.size == 0 {
        issues.push("batch.size must be at least 1".to_string());
    }

    if config.storage.key_name.trim().is_empty() {
        issues.push("storage.key_name must not be empty".to_string());
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(AppError::message(format!(
            "invalid configuration: {}",
            issues.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn builtin_config_is_valid() {
        validate_config(&Config::builtin()).expect("builtin config should be valid");
    }

    #[test]
    fn rejects_zero_ttl_and_batch_size() {
        let mut config = Config::builtin();
        config.cache.search_ttl = Duration::ZERO;
        config.batch.size = 0;

        let err = validate_config(&config).expect_err("validation should fail");
        let message = err.to_string();
        assert!(
            message.contains("cache.search_ttl"),
            "unexpected error message: {message}"
        );
        assert!(
            message.contains("batch.size"),
            "unexpected error message: {message}"
        );
    }

    #[test]
    fn rejects_warning_threshold_above_limit() {
        let mut config = Config::builtin();
        config.quota.warning_threshold = 60;

        let err = validate_config(&config).expect_err("validation should fail");
        assert!(
            err.to_string().contains("warning_threshold"),
            "unexpected error message: {}",
            err
        );
    }

    #[test]
    fn rejects_non_http_base_url() {
        let mut config = Config::builtin();
        config.api.base_url = "ftp://example.com".to_string();

        let err = validate_config(&config).expect_err("validation should fail");
        assert!(err.to_string().contains("http(s)"));
    }
}
