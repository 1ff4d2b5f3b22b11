use crate::config::types::{
    Config, ExtractConfig, FetchConfig, ListingConfig, OutputConfig, PolitenessConfig,
};
use crate::crawler::DelayRange;
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on attempts per URL
const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_listing_config(&config.listing)?;
    validate_fetch_config(&config.fetch)?;
    validate_politeness_config(&config.politeness)?;
    validate_extract_config(&config.extract)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the listing section
fn validate_listing_config(config: &ListingConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url).map_err(|e| {
        ConfigError::InvalidUrl(format!("Invalid listing url '{}': {}", config.url, e))
    })?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Listing url '{}' must use http or https",
            config.url
        )));
    }

    if config.target_count < 1 {
        return Err(ConfigError::Validation(
            "target-count must be >= 1".to_string(),
        ));
    }

    if config.max_pages < 1 {
        return Err(ConfigError::Validation("max-pages must be >= 1".to_string()));
    }

    Selector::parse(&config.link_selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("link-selector '{}': {:?}", config.link_selector, e))
    })?;

    if !config.detail_path_prefix.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "detail-path-prefix must start with '/', got '{}'",
            config.detail_path_prefix
        )));
    }

    Ok(())
}

/// Validates HTTP identity and retry settings
fn validate_fetch_config(config: &FetchConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.accept_language.trim().is_empty() {
        return Err(ConfigError::Validation(
            "accept-language cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.max_attempts < 1 || config.max_attempts > MAX_ATTEMPTS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-attempts must be between 1 and {}, got {}",
            MAX_ATTEMPTS_LIMIT, config.max_attempts
        )));
    }

    validate_delay_range("backoff", &config.backoff)
}

fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    validate_delay_range("page-delay", &config.page_delay)?;
    validate_delay_range("item-delay", &config.item_delay)
}

fn validate_extract_config(config: &ExtractConfig) -> Result<(), ConfigError> {
    if config.entity_type.trim().is_empty() {
        return Err(ConfigError::Validation(
            "entity-type cannot be empty".to_string(),
        ));
    }

    if config.genre_limit < 1 {
        return Err(ConfigError::Validation(
            "genre-limit must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.records_path.is_empty() {
        return Err(ConfigError::Validation(
            "records-path cannot be empty".to_string(),
        ));
    }

    if config.failures_path.is_empty() {
        return Err(ConfigError::Validation(
            "failures-path cannot be empty".to_string(),
        ));
    }

    if config.records_path == config.failures_path {
        return Err(ConfigError::Validation(
            "records-path and failures-path must differ".to_string(),
        ));
    }

    Ok(())
}

fn validate_delay_range(name: &str, range: &DelayRange) -> Result<(), ConfigError> {
    if range.min_ms > range.max_ms {
        return Err(ConfigError::Validation(format!(
            "{} min-ms ({}) must not exceed max-ms ({})",
            name, range.min_ms, range.max_ms
        )));
    }
    Ok(())
}
