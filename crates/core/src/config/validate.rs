use super::{types::Config, ConfigError};

const MAX_PAGE_SIZE: u32 = 100;

/// Validate configuration
/// Currently validates:
/// - API base URL is http(s)
/// - Timeout is not 0
/// - Page size is within 1..=100
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.api.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "api.base_url must be an http(s) URL, got '{}'",
            config.api.base_url
        )));
    }

    if config.api.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "api.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.api.page_size == 0 || config.api.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "api.page_size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }

    Ok(())
}
