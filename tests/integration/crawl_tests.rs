//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end, from configuration to written outputs.

use jury_corpus::config::{
    load_config, Config, CrawlerConfig, OutputConfig, TraversalOrder, UserAgentConfig,
};
use jury_corpus::crawler::{crawl, ShutdownHandle};
use jury_corpus::output::record_key;
use jury_corpus::storage::{SqliteStorage, Storage};
use jury_corpus::{Corpus, CorpusError, UrlState};
use std::collections::BTreeSet;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling the mock server from `seed_path`
fn create_test_config(base_url: &str, seed_path: &str, out_dir: &Path) -> Config {
    Config {
        crawler: CrawlerConfig {
            seed_url: format!("{}{}", base_url, seed_path),
            domain: base_url.to_string(),
            excluded_prefixes: vec![format!("{}/self-help", base_url)],
            traversal: TraversalOrder::DepthFirst,
            workers: 1,
            content_selector: "div#page-content".to_string(),
            page_extensions: vec!["html".to_string(), "aspx".to_string()],
            extract_file_text: false,
            request_timeout_secs: 5,
        },
        user_agent: UserAgentConfig::default(),
        output: OutputConfig {
            corpus_path: out_dir
                .join("scraped_data.json")
                .to_string_lossy()
                .into_owned(),
            database_path: None,
            export_dir: None,
            summary_path: None,
            source: "test".to_string(),
        },
    }
}

/// Builds a page whose content container links to every href
fn html(title: &str, hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect();
    format!(
        r#"<html><head><title>{title}</title></head><body>
            <header><a href="/about">About</a></header>
            <div id="page-content"><h1>{title}</h1><p>{title} content</p>{anchors}</div>
        </body></html>"#
    )
}

async fn mount_page(server: &MockServer, page_path: &str, title: &str, hrefs: &[&str], expected: u64) {
    Mock::given(method("GET"))
        .and(path(page_path))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html(title, hrefs), "text/html"))
        .expect(expected)
        .mount(server)
        .await;
}

/// Mounts root -> {a, b} -> c
async fn mount_diamond(server: &MockServer) {
    mount_page(server, "/jurors", "Jurors", &["/jurors/a", "/jurors/b"], 1).await;
    mount_page(server, "/jurors/a", "A", &["/jurors/c"], 1).await;
    mount_page(server, "/jurors/b", "B", &["/jurors/c", "/jurors"], 1).await;
    mount_page(server, "/jurors/c", "C", &[], 1).await;
}

fn urls(base_url: &str, paths: &[&str]) -> BTreeSet<String> {
    paths.iter().map(|p| format!("{}{}", base_url, p)).collect()
}

#[tokio::test]
async fn test_diamond_crawl_records_both_parents() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_diamond(&mock_server).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, "/jurors", dir.path());

    let output = crawl(&config, "hash", ShutdownHandle::new())
        .await
        .expect("Crawl failed");

    let corpus = &output.corpus;
    assert_eq!(corpus.len(), 4);

    let c = corpus.get(&format!("{}/jurors/c", base_url)).unwrap();
    assert_eq!(c.parent_pages, urls(&base_url, &["/jurors/a", "/jurors/b"]));
    assert_eq!(c.title, "C");
    assert!(c.text.contains("C content"));

    let root = corpus.get(&format!("{}/jurors", base_url)).unwrap();
    assert_eq!(root.child_links, urls(&base_url, &["/jurors/a", "/jurors/b"]));
    // b links back to the seed, so the seed gains b as a parent
    assert_eq!(root.parent_pages, urls(&base_url, &["/jurors/b"]));
    assert!(!root.child_links.contains(&format!("{}/about", base_url)));

    // The JSON corpus round-trips to the same structure
    let written: Corpus = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("scraped_data.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(&written, corpus);
}

#[tokio::test]
async fn test_breadth_first_with_workers_matches_depth_first() {
    let depth_server = MockServer::start().await;
    mount_diamond(&depth_server).await;
    let breadth_server = MockServer::start().await;
    mount_diamond(&breadth_server).await;

    let dir = tempfile::tempdir().unwrap();
    let depth_config = create_test_config(&depth_server.uri(), "/jurors", dir.path());
    let mut breadth_config = create_test_config(&breadth_server.uri(), "/jurors", dir.path());
    breadth_config.crawler.traversal = TraversalOrder::BreadthFirst;
    breadth_config.crawler.workers = 4;

    let depth = crawl(&depth_config, "hash", ShutdownHandle::new()).await.unwrap();
    let breadth = crawl(&breadth_config, "hash", ShutdownHandle::new()).await.unwrap();

    // Same shape once the server address is factored out
    let shape = |corpus: &Corpus, base: &str| -> Vec<(String, Vec<String>)> {
        corpus
            .pages()
            .map(|page| {
                (
                    page.url.replacen(base, "", 1),
                    page.parent_pages
                        .iter()
                        .map(|p| p.replacen(base, "", 1))
                        .collect(),
                )
            })
            .collect()
    };
    assert_eq!(
        shape(&depth.corpus, &depth_server.uri()),
        shape(&breadth.corpus, &breadth_server.uri())
    );
}

#[tokio::test]
async fn test_pdf_link_becomes_file_without_fetching() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/jurors", "Jurors", &["/forms/jury.pdf"], 1).await;
    Mock::given(method("GET"))
        .and(path("/forms/jury.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4".to_vec(), "application/pdf"))
        .expect(0)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, "/jurors", dir.path());

    let output = crawl(&config, "hash", ShutdownHandle::new()).await.unwrap();

    let file = output
        .corpus
        .get(&format!("{}/forms/jury.pdf", base_url))
        .unwrap();
    assert!(file.is_file);
    assert_eq!(file.title, "jury.pdf");
    assert_eq!(file.text, "");
    assert!(file.child_links.is_empty());
    assert_eq!(file.parent_pages, urls(&base_url, &["/jurors"]));
    assert_eq!(output.report.files, 1);
}

#[tokio::test]
async fn test_excluded_prefix_is_never_fetched() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/jurors",
        "Jurors",
        &["/self-help/forms", "/jurors/a"],
        1,
    )
    .await;
    mount_page(&mock_server, "/jurors/a", "A", &["/self-help/forms"], 1).await;
    mount_page(&mock_server, "/self-help/forms", "Self Help", &[], 0).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, "/jurors", dir.path());

    let output = crawl(&config, "hash", ShutdownHandle::new()).await.unwrap();

    let excluded = format!("{}/self-help/forms", base_url);
    assert!(!output.corpus.contains(&excluded));
    assert!(output
        .corpus
        .pages()
        .all(|page| !page.parent_pages.contains(&excluded)));

    let skipped = output.report.skipped.get(&excluded).unwrap();
    assert_eq!(skipped.referrers, urls(&base_url, &["/jurors", "/jurors/a"]));
}

#[tokio::test]
async fn test_dead_child_is_dropped_and_not_retried() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(&mock_server, "/jurors", "Jurors", &["/jurors/gone", "/jurors/a"], 1).await;
    mount_page(&mock_server, "/jurors/a", "A", &["/jurors/gone"], 1).await;
    Mock::given(method("GET"))
        .and(path("/jurors/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, "/jurors", dir.path());

    let output = crawl(&config, "hash", ShutdownHandle::new()).await.unwrap();

    let gone = format!("{}/jurors/gone", base_url);
    assert_eq!(output.corpus.len(), 2);
    assert!(!output.corpus.contains(&gone));
    assert!(output.report.failed.get(&gone).unwrap().contains("404"));

    // The root still lists the dead link as a child
    let root = output.corpus.get(&format!("{}/jurors", base_url)).unwrap();
    assert!(root.child_links.contains(&gone));
}

#[tokio::test]
async fn test_seed_failure_is_fatal() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/jurors"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&base_url, "/jurors", dir.path());

    let result = crawl(&config, "hash", ShutdownHandle::new()).await;

    match result {
        Err(e @ CorpusError::SeedUnreachable { .. }) => assert_eq!(e.exit_code(), 2),
        other => panic!("expected SeedUnreachable, got {:?}", other.map(|o| o.corpus.len())),
    }
    assert!(!dir.path().join("scraped_data.json").exists());
}

#[tokio::test]
async fn test_sqlite_and_export_outputs() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/jurors",
        "Jurors",
        &["/jurors/a", "/forms/jury.pdf", "/self-help"],
        1,
    )
    .await;
    mount_page(&mock_server, "/jurors/a", "A", &["/forms/jury.pdf"], 1).await;
    // Downloaded once, by the export directory
    Mock::given(method("GET"))
        .and(path("/forms/jury.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"%PDF-1.4 bytes".to_vec(), "application/pdf"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&base_url, "/jurors", dir.path());
    let db_path = dir.path().join("corpus.db");
    let export_dir = dir.path().join("export");
    let summary_path = dir.path().join("summary.md");
    config.output.database_path = Some(db_path.to_string_lossy().into_owned());
    config.output.export_dir = Some(export_dir.to_string_lossy().into_owned());
    config.output.summary_path = Some(summary_path.to_string_lossy().into_owned());

    let output = crawl(&config, "hash", ShutdownHandle::new()).await.unwrap();
    assert_eq!(output.corpus.len(), 3);

    // SQLite run mirrors the corpus
    let storage = SqliteStorage::new(&db_path).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.config_hash, "hash");
    assert_eq!(storage.load_corpus(run.id).unwrap(), output.corpus);
    assert_eq!(
        storage.count_pages_by_state(run.id, UrlState::Fetched).unwrap(),
        3
    );
    assert_eq!(storage.get_skipped_urls(run.id).unwrap().len(), 1);

    // Export directory holds page records, the raw file and sidecars
    let page_key = record_key(&format!("{}/jurors/a", base_url));
    let record: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(export_dir.join(format!("{}.json", page_key))).unwrap(),
    )
    .unwrap();
    assert_eq!(record["title"], "A");
    assert_eq!(record["source"], "test");

    let file_key = record_key(&format!("{}/forms/jury.pdf", base_url));
    let bytes = std::fs::read(export_dir.join(format!("{}_jury.pdf", file_key))).unwrap();
    assert_eq!(bytes, b"%PDF-1.4 bytes");
    assert!(export_dir
        .join(format!("{}_jury.pdf.metadata.json", file_key))
        .exists());

    let summary = std::fs::read_to_string(&summary_path).unwrap();
    assert!(summary.contains("# Jury-Corpus Crawl Summary"));
    assert!(summary.contains("- **Files**: 1"));
}

#[tokio::test]
async fn test_crawl_from_config_file() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();
    mount_page(&mock_server, "/jurors/reporting", "Reporting", &["/jurors/parking"], 1).await;
    mount_page(&mock_server, "/jurors/parking", "Parking", &[], 1).await;

    let dir = tempfile::tempdir().unwrap();
    let corpus_path = dir.path().join("scraped_data.json");
    let config_path = dir.path().join("config.toml");
    std::fs::write(
        &config_path,
        format!(
            r#"
[crawler]
seed-url = "{base}/jurors/reporting"
domain = "{base}"
excluded-prefixes = ["{base}/self-help"]
traversal = "breadth-first"
workers = 2

[output]
corpus-path = "{corpus}"
"#,
            base = base_url,
            corpus = corpus_path.to_string_lossy().replace('\\', "/"),
        ),
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let output = crawl(&config, "hash", ShutdownHandle::new()).await.unwrap();

    assert_eq!(output.corpus.len(), 2);
    assert!(corpus_path.exists());
}
