use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads, parses and validates the configuration at `path`
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use catalog_crawler::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Base URL: {}", config.crawler.base_url);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Hex-encoded SHA-256 of the configuration text
///
/// Logged at startup so a dataset can be traced back to the configuration
/// that produced it.
fn fingerprint(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

/// Loads a configuration together with the fingerprint of the same bytes
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;
    Ok((config, fingerprint(&content)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[crawler]
base-url = "https://books.toscrape.com/"
max-concurrent-detail-fetches = 4

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
dataset-path = "./books.csv"
vectors-path = "./books.vectors.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.base_url, "https://books.toscrape.com/");
        assert_eq!(config.crawler.max_concurrent_detail_fetches, 4);
        assert_eq!(config.crawler.request_timeout_secs, 30);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.output.size_threshold, 1000);
        assert_eq!(config.selectors.card, "article.product_pod");
        assert!(config.embedding.is_none());
    }

    #[test]
    fn test_load_config_with_overrides() {
        let config_content = r#"
[crawler]
base-url = "http://127.0.0.1:8080/"

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
dataset-path = "./books.csv"
vectors-path = "./books.vectors.json"
size-threshold = 10

[selectors]
card = "div.item"
currency-symbol = "$"

[embedding]
endpoint = "https://api.example.com/v1"
model = "mini"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.output.size_threshold, 10);
        assert_eq!(config.selectors.card, "div.item");
        assert_eq!(config.selectors.currency_symbol, "$");
        // Unset selector keys keep their defaults
        assert_eq!(config.selectors.next_page, "li.next a");

        let embedding = config.embedding.unwrap();
        assert_eq!(embedding.model, "mini");
        assert_eq!(embedding.api_key_env, "OPENAI_API_KEY");
        assert_eq!(embedding.batch_size, 64);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let config_content = "this is not valid TOML {{{";
        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[crawler]
base-url = "https://books.toscrape.com/"
max-concurrent-detail-fetches = 0

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
dataset-path = "./books.csv"
vectors-path = "./books.vectors.json"
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    const MINIMAL_CONFIG: &str = r#"
[crawler]
base-url = "https://books.toscrape.com/"

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"
contact-email = "admin@example.com"

[output]
dataset-path = "./books.csv"
vectors-path = "./books.vectors.json"
"#;

    #[test]
    fn test_load_config_with_hash_fingerprints_file_bytes() {
        let file = create_temp_config(MINIMAL_CONFIG);

        let (config, hash) = load_config_with_hash(file.path()).unwrap();

        assert_eq!(config.crawler.base_url, "https://books.toscrape.com/");
        assert_eq!(hash, fingerprint(MINIMAL_CONFIG));
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_fingerprint_tracks_threshold_change() {
        let tweaked = format!("{}size-threshold = 50\n", MINIMAL_CONFIG);
        let original = create_temp_config(MINIMAL_CONFIG);
        let edited = create_temp_config(&tweaked);

        let (_, before) = load_config_with_hash(original.path()).unwrap();
        let (config, after) = load_config_with_hash(edited.path()).unwrap();

        assert_eq!(config.output.size_threshold, 50);
        assert_ne!(before, after);
    }
}
