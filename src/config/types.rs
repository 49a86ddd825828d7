use serde::Deserialize;

/// Main configuration structure for the catalog crawler
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub selectors: SelectorConfig,
    #[serde(default)]
    pub embedding: Option<EmbeddingConfig>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Root listing page of the catalog; also the base for product links
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of detail pages fetched at once for one listing page
    #[serde(rename = "max-concurrent-detail-fetches", default = "default_concurrency")]
    pub max_concurrent_detail_fetches: u32,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(rename = "connect-timeout-secs", default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the CSV dataset
    #[serde(rename = "dataset-path")]
    pub dataset_path: String,

    /// Path to the precomputed embedding vectors
    #[serde(rename = "vectors-path")]
    pub vectors_path: String,

    /// Record count separating a small crawl from a full one in the summary
    #[serde(rename = "size-threshold", default = "default_size_threshold")]
    pub size_threshold: usize,
}

/// CSS selectors describing the catalog markup
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// One catalog card on a listing page
    pub card: String,

    /// Link inside a card carrying the `title` and `href` attributes
    #[serde(rename = "title-link")]
    pub title_link: String,

    /// Price text node inside a card
    pub price: String,

    /// Element whose last class token spells the rating
    pub rating: String,

    /// "Next page" link on a listing page
    #[serde(rename = "next-page")]
    pub next_page: String,

    /// Category link in the breadcrumb of a detail page
    #[serde(rename = "breadcrumb-category")]
    pub breadcrumb_category: String,

    /// Currency symbol prefixed to prices
    #[serde(rename = "currency-symbol")]
    pub currency_symbol: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: "article.product_pod".to_string(),
            title_link: "h3 a".to_string(),
            price: ".price_color".to_string(),
            rating: "p.star-rating".to_string(),
            next_page: "li.next a".to_string(),
            breadcrumb_category: "ul.breadcrumb li:nth-child(3) a".to_string(),
            currency_symbol: "£".to_string(),
        }
    }
}

/// Embedding endpoint configuration (OpenAI-compatible)
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the API; `/embeddings` is appended
    pub endpoint: String,

    /// Model name sent with every request
    pub model: String,

    /// Environment variable holding the API key
    #[serde(rename = "api-key-env", default = "default_api_key_env")]
    pub api_key_env: String,

    /// Number of texts per request
    #[serde(rename = "batch-size", default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_concurrency() -> u32 {
    1
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_size_threshold() -> usize {
    1000
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_batch_size() -> usize {
    64
}
