use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::url::{parse_http_url, ScopeFilter};
use crate::ConfigError;
use scraper::Selector;

/// Upper bound on concurrent fetches
const MAX_WORKERS: u32 = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.seed_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "seed_url cannot be empty".to_string(),
        ));
    }

    parse_http_url(&config.seed_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed_url '{}': {}", config.seed_url, e)))?;

    let scope = ScopeFilter::from_config(config)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid domain '{}': {}", config.domain, e)))?;

    if let Err(rejection) = scope.check(&config.seed_url) {
        return Err(ConfigError::Validation(format!(
            "seed_url '{}' is out of scope ({})",
            config.seed_url, rejection
        )));
    }

    if config.excluded_prefixes.iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "excluded_prefixes cannot contain empty entries".to_string(),
        ));
    }

    if config.workers < 1 || config.workers > MAX_WORKERS {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and {}, got {}",
            MAX_WORKERS, config.workers
        )));
    }

    Selector::parse(&config.content_selector).map_err(|e| {
        ConfigError::InvalidSelector(format!("'{}': {:?}", config.content_selector, e))
    })?;

    if config.page_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "page_extensions cannot be empty".to_string(),
        ));
    }

    for ext in &config.page_extensions {
        if ext.is_empty() || ext.contains('.') {
            return Err(ConfigError::Validation(format!(
                "page extension '{}' must be non-empty and written without a dot",
                ext
            )));
        }
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.header.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user agent header cannot be empty".to_string(),
        ));
    }

    if config.header.chars().any(|c| c.is_control()) {
        return Err(ConfigError::Validation(
            "user agent header cannot contain control characters".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.corpus_path.is_empty() {
        return Err(ConfigError::Validation(
            "corpus_path cannot be empty".to_string(),
        ));
    }

    for (name, value) in [
        ("database_path", &config.database_path),
        ("export_dir", &config.export_dir),
        ("summary_path", &config.summary_path),
    ] {
        if matches!(value, Some(path) if path.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "{} cannot be empty when set",
                name
            )));
        }
    }

    if config.source.is_empty() {
        return Err(ConfigError::Validation("source cannot be empty".to_string()));
    }

    Ok(())
}
