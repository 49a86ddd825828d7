//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small catalog and run the full
//! pagination, extraction and dataset cycle end-to-end.

use catalog_crawler::config::{Config, CrawlerConfig, OutputConfig, SelectorConfig, UserAgentConfig};
use catalog_crawler::crawler::{run_crawl, Coordinator};
use catalog_crawler::{CrawlPhase, CrawlerError, Dataset, SizeClass, UNKNOWN_CATEGORY};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration rooted at `base_url`, writing to `dataset_path`
fn create_test_config(base_url: &str, dataset_path: &Path, concurrency: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            base_url: base_url.to_string(),
            max_concurrent_detail_fetches: concurrency,
            request_timeout_secs: 5,
            connect_timeout_secs: 5,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            dataset_path: dataset_path.display().to_string(),
            vectors_path: dataset_path.with_extension("vectors.json").display().to_string(),
            size_threshold: 1000,
        },
        selectors: SelectorConfig::default(),
        embedding: None,
    }
}

fn card(title: &str, href: &str, price: Option<&str>, rating: &str) -> String {
    let price = price
        .map(|p| format!(r#"<p class="price_color">{}</p>"#, p))
        .unwrap_or_default();
    format!(
        r#"<article class="product_pod">
            <p class="star-rating {rating}"></p>
            <h3><a href="{href}" title="{title}">{title}</a></h3>
            <div class="product_price">{price}</div>
        </article>"#
    )
}

fn listing(cards: &[String], next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<ul class="pager"><li class="next"><a href="{}">next</a></li></ul>"#, href))
        .unwrap_or_default();
    format!(
        "<html><body><ol class=\"row\">{}</ol>{}</body></html>",
        cards.join("\n"),
        next
    )
}

fn detail(category: &str) -> String {
    format!(
        r#"<html><body><ul class="breadcrumb">
            <li><a href="/">Home</a></li>
            <li><a href="/books">Books</a></li>
            <li><a href="/books/cat">{}</a></li>
            <li class="active">Item</li>
        </ul></body></html>"#,
        category
    )
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html")
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(html(body))
        .mount(server)
        .await;
}

/// Two listing pages, three cards, one missing its price
async fn mount_two_page_catalog(server: &MockServer) {
    mount_html(
        server,
        "/",
        listing(
            &[
                card("A Light in the Attic", "catalogue/a-light/index.html", Some("£10.50"), "Three"),
                card("Tipping the Velvet", "catalogue/tipping/index.html", Some("£53.74"), "One"),
            ],
            Some("catalogue/page-2.html"),
        ),
    )
    .await;
    mount_html(
        server,
        "/catalogue/page-2.html",
        listing(
            &[card("Soumission", "catalogue/soumission/index.html", None, "Five")],
            None,
        ),
    )
    .await;

    mount_html(server, "/catalogue/a-light/index.html", detail("Poetry")).await;
    mount_html(server, "/catalogue/tipping/index.html", detail("Historical Fiction")).await;
    mount_html(server, "/catalogue/soumission/index.html", detail("Fiction")).await;
}

#[tokio::test]
async fn test_full_crawl_two_pages() {
    let server = MockServer::start().await;
    mount_two_page_catalog(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");
    let base_url = format!("{}/", server.uri());

    let report = run_crawl(create_test_config(&base_url, &dataset_path, 1))
        .await
        .unwrap();

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.records, 3);
    assert_eq!(report.unknown_categories, 0);
    assert_eq!(report.size_class, SizeClass::BelowThreshold);

    let dataset = Dataset::read(&dataset_path).unwrap();
    let records = dataset.records();
    assert_eq!(records.len(), 3);

    assert_eq!(records[0].title, "A Light in the Attic");
    assert_eq!(records[0].category, "Poetry");
    assert_eq!(records[0].price, 10.5);
    assert_eq!(records[0].rating, 3);
    assert_eq!(
        records[0].product_page_url,
        format!("{}catalogue/a-light/index.html", base_url)
    );

    assert_eq!(records[1].category, "Historical Fiction");
    assert_eq!(records[1].rating, 1);

    assert_eq!(records[2].title, "Soumission");
    assert_eq!(records[2].price, 0.0);
    assert_eq!(records[2].rating, 5);
}

#[tokio::test]
async fn test_single_page_without_next_link() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        listing(&[card("Only", "only/index.html", Some("£1.00"), "Two")], None),
    )
    .await;
    mount_html(&server, "/only/index.html", detail("Travel")).await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");
    let mut coordinator =
        Coordinator::new(create_test_config(&format!("{}/", server.uri()), &dataset_path, 1))
            .unwrap();

    let dataset = coordinator.run().await.unwrap();

    assert_eq!(coordinator.phase(), CrawlPhase::Done);
    assert_eq!(coordinator.pages_visited(), 1);
    assert_eq!(dataset.len(), 1);
    assert_eq!(dataset.records()[0].category, "Travel");
}

#[tokio::test]
async fn test_empty_listing_writes_header_only() {
    let server = MockServer::start().await;
    mount_html(&server, "/", listing(&[], None)).await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");

    let report = run_crawl(create_test_config(&format!("{}/", server.uri()), &dataset_path, 1))
        .await
        .unwrap();

    assert_eq!(report.records, 0);
    let written = std::fs::read_to_string(&dataset_path).unwrap();
    assert_eq!(written.trim_end(), "title,category,price,rating,product_page_url");
}

#[tokio::test]
async fn test_absolute_product_link_is_kept() {
    let server = MockServer::start().await;
    let absolute = format!("{}/elsewhere/item.html", server.uri());
    mount_html(
        &server,
        "/",
        listing(&[card("Absolute", &absolute, Some("£2.00"), "Four")], None),
    )
    .await;
    mount_html(&server, "/elsewhere/item.html", detail("Science")).await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");
    let mut coordinator =
        Coordinator::new(create_test_config(&format!("{}/", server.uri()), &dataset_path, 1))
            .unwrap();

    let dataset = coordinator.run().await.unwrap();

    assert_eq!(dataset.records()[0].product_page_url, absolute);
    assert_eq!(dataset.records()[0].category, "Science");
}

#[tokio::test]
async fn test_listing_failure_aborts_without_output() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        listing(&[card("First", "first/index.html", Some("£1.00"), "One")], Some("page-2.html")),
    )
    .await;
    mount_html(&server, "/first/index.html", detail("Poetry")).await;
    Mock::given(method("GET"))
        .and(path("/page-2.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");

    let err = run_crawl(create_test_config(&format!("{}/", server.uri()), &dataset_path, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlerError::Http { status: 500, .. }));
    assert!(!dataset_path.exists());
}

#[tokio::test]
async fn test_next_control_without_href_aborts_without_output() {
    let server = MockServer::start().await;
    let body = format!(
        r#"<html><body><ol class="row">{}</ol>
        <ul class="pager"><li class="next"><a>next</a></li></ul></body></html>"#,
        card("First", "first/index.html", Some("£1.00"), "One")
    );
    mount_html(&server, "/", body).await;
    mount_html(&server, "/first/index.html", detail("Poetry")).await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");

    let err = run_crawl(create_test_config(&format!("{}/", server.uri()), &dataset_path, 1))
        .await
        .unwrap_err();

    assert!(matches!(err, CrawlerError::MalformedNextLink { .. }));
    assert!(!dataset_path.exists());
}

#[tokio::test]
async fn test_detail_failures_become_unknown() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        listing(
            &[
                card("Broken", "broken/index.html", Some("£1.00"), "One"),
                card("No Crumb", "nocrumb/index.html", Some("£2.00"), "Two"),
                card("No Link", "", Some("£3.00"), "Three"),
                card("Fine", "fine/index.html", Some("£4.00"), "Four"),
            ],
            None,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/broken/index.html"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_html(
        &server,
        "/nocrumb/index.html",
        "<html><body><p>no breadcrumb</p></body></html>".to_string(),
    )
    .await;
    mount_html(&server, "/fine/index.html", detail("Poetry")).await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");
    let base_url = format!("{}/", server.uri());

    let report = run_crawl(create_test_config(&base_url, &dataset_path, 1))
        .await
        .unwrap();
    assert_eq!(report.records, 4);
    assert_eq!(report.unknown_categories, 3);

    let dataset = Dataset::read(&dataset_path).unwrap();
    let categories: Vec<&str> = dataset
        .records()
        .iter()
        .map(|r| r.category.as_str())
        .collect();
    assert_eq!(
        categories,
        vec![UNKNOWN_CATEGORY, UNKNOWN_CATEGORY, UNKNOWN_CATEGORY, "Poetry"]
    );
    assert_eq!(dataset.records()[2].product_page_url, base_url);
}

#[tokio::test]
async fn test_concurrent_detail_fetches_preserve_order() {
    let server = MockServer::start().await;
    let cards: Vec<String> = (0..8)
        .map(|i| card(&format!("Item {}", i), &format!("item-{}/index.html", i), Some("£1.00"), "One"))
        .collect();
    mount_html(&server, "/", listing(&cards, None)).await;

    for i in 0..8u64 {
        // Earlier items answer more slowly so completion order is reversed
        Mock::given(method("GET"))
            .and(path(format!("/item-{}/index.html", i)))
            .respond_with(
                html(detail(&format!("Category {}", i)))
                    .set_delay(std::time::Duration::from_millis(20 * (8 - i))),
            )
            .mount(&server)
            .await;
    }

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");
    let mut coordinator =
        Coordinator::new(create_test_config(&format!("{}/", server.uri()), &dataset_path, 4))
            .unwrap();

    let dataset = coordinator.run().await.unwrap();

    for (i, record) in dataset.records().iter().enumerate() {
        assert_eq!(record.title, format!("Item {}", i));
        assert_eq!(record.category, format!("Category {}", i));
    }
}

#[tokio::test]
async fn test_rerun_overwrites_dataset() {
    let server = MockServer::start().await;
    mount_two_page_catalog(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let dataset_path = dir.path().join("books.csv");
    std::fs::write(&dataset_path, "stale contents\nfrom an earlier run\n").unwrap();

    let config = create_test_config(&format!("{}/", server.uri()), &dataset_path, 2);
    run_crawl(config.clone()).await.unwrap();
    let first = std::fs::read_to_string(&dataset_path).unwrap();
    assert!(!first.contains("stale contents"));

    run_crawl(config).await.unwrap();
    let second = std::fs::read_to_string(&dataset_path).unwrap();
    assert_eq!(first, second);
    assert_eq!(Dataset::read(&dataset_path).unwrap().len(), 3);
}
