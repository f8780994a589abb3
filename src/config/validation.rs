use crate::config::types::{Config, CrawlerConfig, LookupConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_lookup_config(&config.lookup)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawl trail configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("entry-url", &config.entry_url)?;

    if config.pages_to_visit < 1 {
        return Err(ConfigError::Validation(
            "pages-to-visit must be >= 1".to_string(),
        ));
    }

    if config.cluster_size < 1 {
        return Err(ConfigError::Validation(format!(
            "cluster-size must be >= 1, got {}",
            config.cluster_size
        )));
    }

    if config.max_workers < 1 || config.max_workers > 256 {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and 256, got {}",
            config.max_workers
        )));
    }

    // Rejects NaN, negatives and values too large for a Duration.
    if Duration::try_from_secs_f64(config.delay_seconds).is_err() {
        return Err(ConfigError::Validation(format!(
            "delay-seconds must be a non-negative number of seconds, got {}",
            config.delay_seconds
        )));
    }

    if config.request_timeout_seconds < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-seconds must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates lookup configuration
fn validate_lookup_config(config: &LookupConfig) -> Result<(), ConfigError> {
    validate_http_url("search-url", &config.search_url)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "lookup user-agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.directory.is_empty() {
        return Err(ConfigError::Validation(
            "output directory cannot be empty".to_string(),
        ));
    }

    if config.file_name.is_empty() {
        return Err(ConfigError::Validation(
            "output file-name cannot be empty".to_string(),
        ));
    }

    if config.file_name.contains('/') || config.file_name.contains('\\') {
        return Err(ConfigError::Validation(format!(
            "output file-name must not contain path separators, got '{}'",
            config.file_name
        )));
    }

    Ok(())
}

/// Parses a URL and requires an http or https scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler() -> CrawlerConfig {
        CrawlerConfig {
            entry_url: "http://example.com/random-word/".to_string(),
            pages_to_visit: 100,
            cluster_size: 20,
            max_workers: 4,
            delay_seconds: 0.05,
            request_timeout_seconds: 10,
        }
    }

    #[test]
    fn test_validate_http_url() {
        assert!(validate_http_url("entry-url", "http://example.com/").is_ok());
        assert!(validate_http_url("entry-url", "https://example.com/a?b=c").is_ok());

        assert!(validate_http_url("entry-url", "").is_err());
        assert!(validate_http_url("entry-url", "not a url").is_err());
        assert!(validate_http_url("entry-url", "ftp://example.com/").is_err());
    }

    #[test]
    fn test_validate_crawler_limits() {
        assert!(validate_crawler_config(&crawler()).is_ok());

        let mut config = crawler();
        config.max_workers = 0;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler();
        config.max_workers = 257;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler();
        config.pages_to_visit = 0;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler();
        config.delay_seconds = -1.0;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler();
        config.delay_seconds = f64::NAN;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler();
        config.delay_seconds = 1e20;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler();
        config.delay_seconds = f64::INFINITY;
        assert!(validate_crawler_config(&config).is_err());

        let mut config = crawler();
        config.delay_seconds = 0.0;
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_validate_output_file_name() {
        let ok = OutputConfig {
            directory: "./data".to_string(),
            file_name: "slang.csv".to_string(),
        };
        assert!(validate_output_config(&ok).is_ok());

        let nested = OutputConfig {
            directory: "./data".to_string(),
            file_name: "sub/slang.csv".to_string(),
        };
        assert!(validate_output_config(&nested).is_err());

        let empty = OutputConfig {
            directory: String::new(),
            file_name: "slang.csv".to_string(),
        };
        assert!(validate_output_config(&empty).is_err());
    }

    #[test]
    fn test_validate_crawler_name() {
        let mut config = UserAgentConfig {
            crawler_name: "Slang-Harvest".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
        };
        assert!(validate_user_agent_config(&config).is_ok());

        config.crawler_name = "Slang Harvest".to_string();
        assert!(validate_user_agent_config(&config).is_err());
    }
}
