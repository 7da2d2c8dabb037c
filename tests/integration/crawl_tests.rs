//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small documentation site and run the
//! whole pipeline against it: collect, render, convert, validate, persist.

use docs_scribe::config::{load_config, Config};
use docs_scribe::crawler::{collect_urls, run_crawl, CrawlOptions, HttpRenderer};
use docs_scribe::output::{sanitize_filename, SUMMARY_FILE};
use docs_scribe::ScribeError;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILLER: &str = "This paragraph exists so the converted page comfortably clears the \
                      minimum content length that the validator applies to every page.";

/// Writes a config file pointing at `base_url` and loads it back
fn create_test_config(dir: &Path, base_url: &str, enforce: bool) -> Config {
    let toml = format!(
        r#"
[site]
base-url = "{base}/"
seed-url = "{base}/docs/"

[crawler]
max-concurrent = 3
max-retries = 2
retry-base-delay-ms = 10

[rate-limit]
max-tokens = 5
refill-rate = 50.0
poll-interval-ms = 5

[renderer]
navigation-timeout-ms = 2000
readiness-timeout-ms = 2000

[output]
output-dir = "{out}"
log-dir = "{logs}"

[validation]
enforce = {enforce}
"#,
        base = base_url,
        out = dir.join("out").display(),
        logs = dir.join("logs").display(),
        enforce = enforce,
    );

    let config_path = dir.join("docs-scribe.toml");
    fs::write(&config_path, toml).expect("Failed to write config");
    load_config(&config_path).expect("Failed to load config")
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(server)
        .await;
}

fn seed_page() -> String {
    r##"<html><head><title>Docs</title></head><body>
        <nav>
          <a href="/docs/intro">Introduction</a>
          <a href="/docs/setup#install">Setup</a>
          <a href="/docs/intro">Introduction (again)</a>
          <a href="/docs/broken">Broken</a>
          <a href="#main">Skip to content</a>
          <a href="https://elsewhere.example.org/docs/intro">Elsewhere</a>
        </nav>
        <main id="main"><p>Welcome.</p></main>
    </body></html>"##
        .to_string()
}

fn intro_page() -> String {
    format!(
        r#"<html><head>
            <title>Introduction</title>
            <meta name="description" content="What the product does">
        </head><body>
            <header><a href="/">Home</a></header>
            <nav class="breadcrumb"><a href="/docs/">Docs</a> <a href="/docs/intro">Introduction</a></nav>
            <main>
              <h1>Introduction</h1>
              <p>{filler}</p>
              <time datetime="2024-03-01">March 1</time>
              <table>
                <tr><th>Option</th><th>Default</th></tr>
                <tr><td>verbose</td><td>false</td></tr>
              </table>
              <pre><code class="language-rust">fn main() {{}}</code></pre>
            </main>
            <footer>Copyright</footer>
        </body></html>"#,
        filler = FILLER
    )
}

fn setup_page() -> String {
    format!(
        r#"<html><head><title>Setup</title></head><body>
            <h1>Setup</h1>
            <ul><li>Install the binary</li><li>Write a config file</li></ul>
            <p>{filler}</p>
        </body></html>"#,
        filler = FILLER
    )
}

async fn docs_site() -> MockServer {
    let server = MockServer::start().await;
    mount_page(&server, "/docs/", html(&seed_page())).await;
    mount_page(&server, "/docs/intro", html(&intro_page())).await;
    mount_page(&server, "/docs/setup", html(&setup_page())).await;
    Mock::given(method("GET"))
        .and(path("/docs/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_collect_urls_from_seed() {
    let server = docs_site().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server.uri(), false);

    let renderer = HttpRenderer::new(&config.renderer).unwrap();
    let urls = collect_urls(&config, &renderer).await.unwrap();

    let base = server.uri();
    assert_eq!(
        urls,
        vec![
            format!("{}/docs/intro", base),
            format!("{}/docs/setup", base),
            format!("{}/docs/broken", base),
        ]
    );
}

#[tokio::test]
async fn test_full_crawl() {
    let server = docs_site().await;
    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server.uri(), false);
    let base = server.uri();

    let renderer = Arc::new(HttpRenderer::new(&config.renderer).unwrap());
    let options = CrawlOptions {
        urls: None,
        config_hash: Some("test-hash".to_string()),
    };
    let report = run_crawl(&config, renderer, options).await.unwrap();

    // Two pages persisted, the 500 page failed after every attempt
    assert_eq!(report.total, 3);
    assert_eq!(report.persisted.len(), 2);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].url, format!("{}/docs/broken", base));
    assert_eq!(report.failed[0].attempts, 2);
    assert!(report.failed[0].error.contains("500"));
    assert!(!report.is_complete());

    let out = dir.path().join("out");
    let intro_url = format!("{}/docs/intro", base);
    let intro_name = sanitize_filename(&intro_url);

    let markdown = fs::read_to_string(out.join("content").join(format!("{}.md", intro_name))).unwrap();
    assert!(markdown.starts_with("---\ntitle: Introduction\n"));
    assert!(markdown.contains(&format!("url: {}\n", intro_url)));
    assert!(markdown.contains("lastModified: 2024-03-01\n"));
    assert!(markdown.contains("# Introduction"));
    assert!(markdown.contains("| Option | Default |"));
    assert!(markdown.contains("```rust\nfn main() {}\n```"));
    assert!(!markdown.contains("Copyright"));
    assert!(!markdown.contains("<table>"));

    let json = fs::read_to_string(out.join("metadata").join(format!("{}.json", intro_name))).unwrap();
    let metadata: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(metadata["url"], intro_url);
    assert_eq!(metadata["title"], "Introduction");
    assert_eq!(metadata["description"], "What the product does");
    assert_eq!(metadata["lastModified"], "2024-03-01");
    assert_eq!(metadata["parentPage"], format!("{}/docs/", base));
    assert!(metadata["category"].is_string());

    let setup_name = sanitize_filename(&format!("{}/docs/setup", base));
    let setup = fs::read_to_string(out.join("content").join(format!("{}.md", setup_name))).unwrap();
    assert!(setup.contains("- Install the binary\n- Write a config file"));

    // Failed pages leave no artifacts
    let broken_name = sanitize_filename(&format!("{}/docs/broken", base));
    assert!(!out.join("content").join(format!("{}.md", broken_name)).exists());
    assert_eq!(fs::read_dir(out.join("metadata")).unwrap().count(), 2);

    let summary = fs::read_to_string(out.join(SUMMARY_FILE)).unwrap();
    assert!(summary.contains("- **Config Hash**: test-hash"));
    assert!(summary.contains("| Persisted | 2 |"));
    assert!(summary.contains("/docs/broken | 2 |"));
}

#[tokio::test]
async fn test_crawl_given_urls_skips_collection() {
    let server = MockServer::start().await;
    mount_page(&server, "/docs/setup", html(&setup_page())).await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(html(&seed_page()))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server.uri(), false);
    let renderer = Arc::new(HttpRenderer::new(&config.renderer).unwrap());
    let options = CrawlOptions {
        urls: Some(vec![format!("{}/docs/setup", server.uri())]),
        config_hash: None,
    };

    let report = run_crawl(&config, renderer, options).await.unwrap();
    assert_eq!(report.total, 1);
    assert!(report.is_complete());
}

#[tokio::test]
async fn test_enforced_validation_rejects_short_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/docs/stub", html("<html><head><title>Stub</title></head><body><p>TBD</p></body></html>")).await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server.uri(), true);
    let renderer = Arc::new(HttpRenderer::new(&config.renderer).unwrap());
    let options = CrawlOptions {
        urls: Some(vec![format!("{}/docs/stub", server.uri())]),
        config_hash: None,
    };

    let report = run_crawl(&config, renderer, options).await.unwrap();
    assert!(report.persisted.is_empty());
    assert_eq!(report.rejected_count(), 1);
    assert!(report.flagged[0].issues[0].contains("below the minimum"));
    assert_eq!(fs::read_dir(dir.path().join("out").join("content")).unwrap().count(), 0);
}

#[tokio::test]
async fn test_seed_failure_aborts_run() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let config = create_test_config(dir.path(), &server.uri(), false);
    let renderer = Arc::new(HttpRenderer::new(&config.renderer).unwrap());

    let result = run_crawl(&config, renderer, CrawlOptions::default()).await;
    assert!(matches!(result, Err(ScribeError::Render(_))));
    assert!(!dir.path().join("out").join(SUMMARY_FILE).exists());
}
