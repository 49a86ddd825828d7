use crate::config::types::{
    Config, CrawlerConfig, EmbeddingConfig, OutputConfig, SelectorConfig, UserAgentConfig,
};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Upper bound on simultaneous detail-page fetches per listing page
pub const MAX_DETAIL_CONCURRENCY: u32 = 32;

/// Upper bound on texts per embedding request
pub const MAX_EMBEDDING_BATCH: usize = 2048;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_selectors(&config.selectors)?;
    if let Some(embedding) = &config.embedding {
        validate_embedding_config(embedding)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url '{}': {}", config.base_url, e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.max_concurrent_detail_fetches < 1
        || config.max_concurrent_detail_fetches > MAX_DETAIL_CONCURRENCY
    {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_detail_fetches must be between 1 and {}, got {}",
            MAX_DETAIL_CONCURRENCY, config.max_concurrent_detail_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.dataset_path.is_empty() {
        return Err(ConfigError::Validation(
            "dataset_path cannot be empty".to_string(),
        ));
    }

    if config.vectors_path.is_empty() {
        return Err(ConfigError::Validation(
            "vectors_path cannot be empty".to_string(),
        ));
    }

    if config.size_threshold < 1 {
        return Err(ConfigError::Validation(
            "size_threshold must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every configured selector compiles
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    for (name, css) in [
        ("card", &config.card),
        ("title-link", &config.title_link),
        ("price", &config.price),
        ("rating", &config.rating),
        ("next-page", &config.next_page),
        ("breadcrumb-category", &config.breadcrumb_category),
    ] {
        Selector::parse(css).map_err(|e| {
            ConfigError::InvalidSelector(format!("{} = '{}': {:?}", name, css, e))
        })?;
    }

    if config.currency_symbol.trim().is_empty() {
        return Err(ConfigError::Validation(
            "currency_symbol cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the optional embedding section
fn validate_embedding_config(config: &EmbeddingConfig) -> Result<(), ConfigError> {
    Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid embedding endpoint: {}", e)))?;

    if config.model.trim().is_empty() {
        return Err(ConfigError::Validation(
            "embedding model cannot be empty".to_string(),
        ));
    }

    if config.api_key_env.trim().is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    if config.batch_size < 1 || config.batch_size > MAX_EMBEDDING_BATCH {
        return Err(ConfigError::Validation(format!(
            "embedding batch_size must be between 1 and {}, got {}",
            MAX_EMBEDDING_BATCH, config.batch_size
        )));
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    };

    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}
