//! Configuration validation

use super::*;

/// Validate complete configuration
pub fn validate_config(config: &ClientConfig) -> Result<()> {
    validate_dataset_url(&config.dataset_url)?;
    validate_http(&config.http)?;

    if config.memo_capacity == 0 {
        return Err(Error::Validation("memo_capacity must be at least 1".to_string()));
    }
    if config.max_random_draws == 0 {
        return Err(Error::Validation("max_random_draws must be at least 1".to_string()));
    }
    if config.cache_dir.as_os_str().is_empty() {
        return Err(Error::Validation("cache_dir must not be empty".to_string()));
    }

    Ok(())
}

fn validate_dataset_url(url: &str) -> Result<()> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(Error::Validation(
            "dataset URL must start with 'http://' or 'https://'".to_string(),
        ));
    }
    if url.ends_with('/') {
        return Err(Error::Validation(format!(
            "dataset URL {url} must not end with '/'"
        )));
    }
    Ok(())
}

/// Validate HTTP settings
fn validate_http(http: &HttpConfig) -> Result<()> {
    if http.timeout_ms == 0 {
        return Err(Error::Validation("http.timeout_ms must be positive".to_string()));
    }

    if let Some(bad) = http.retry_statuses.iter().find(|s| !(100..=599).contains(*s)) {
        return Err(Error::Validation(format!(
            "http.retry_statuses contains invalid status {bad}"
        )));
    }

    Ok(())
}
