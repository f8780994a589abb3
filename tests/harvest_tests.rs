//! Integration tests for the harvester
//!
//! These tests use wiremock to stand in for both the slang dictionary and the
//! lexical authority, and run the full harvest cycle end-to-end against a
//! temporary CSV store.

use slang_harvest::config::{Config, CrawlerConfig, LookupConfig, OutputConfig, UserAgentConfig};
use slang_harvest::crawler::{run_harvest, Harvester};
use slang_harvest::output::load_store_statistics;
use slang_harvest::state::Classification;
use slang_harvest::storage::load_records;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FOUND: &str = r#"<html><body><div class="searchSummary">3 results for your search</div></body></html>"#;
const NOT_FOUND: &str = r#"<html><body><div class="searchSummary">0 results for your search</div></body></html>"#;

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, dir: &Path, pages: u32, cluster: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            entry_url: format!("{}/random-word/", base_url),
            pages_to_visit: pages,
            cluster_size: cluster,
            max_workers: 2,
            delay_seconds: 0.0,
            request_timeout_seconds: 5,
        },
        lookup: LookupConfig {
            search_url: format!("{}/search", base_url),
            user_agent: "Mozilla/5.0".to_string(),
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestHarvest".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
        },
        output: OutputConfig {
            directory: dir.to_string_lossy().to_string(),
            file_name: "slang.csv".to_string(),
        },
    }
}

/// Renders a dictionary page from `(word, sentence-with-markup)` pairs
fn page(entries: &[&str], next: Option<&str>) -> String {
    let mut html = String::from("<html><body>");
    for entry in entries {
        html.push_str(&format!(r#"<blockquote class="sentence">{}</blockquote>"#, entry));
    }
    if let Some(href) = next {
        html.push_str(&format!(r#"<a href="{}">Next &raquo;</a>"#, href));
    }
    html.push_str("</body></html>");
    html
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

async fn mount_lookup(server: &MockServer, token: &str, body: &str, times: u64) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("scope", "Entries"))
        .and(query_param("q", token))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_harvest_follows_next_link_and_memoizes() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/random-word/",
        page(
            &[
                "I <b>yeet</b> the ball.",
                "She <b>yeet</b> it again.",
            ],
            Some("/define/next"),
        ),
    )
    .await;
    mount_page(
        &mock_server,
        "/define/next",
        page(&["They <b>yeet</b> everything."], None),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "yeet"))
        .and(header("user-agent", "Mozilla/5.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FOUND))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 2, 2);
    let summary = run_harvest(config).await.unwrap();

    assert!(summary.ensure_success().is_ok());
    assert_eq!(summary.trails_run, 1);
    assert_eq!(summary.first_id, 1);
    assert_eq!(summary.records_written, 3);
    assert_eq!(summary.stats.pages_fetched, 2);
    assert_eq!(summary.stats.lookups, 1);
    assert_eq!(summary.stats.memo_hits, 2);

    let records = load_records(&summary.output_path).unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(records[0].sentence, "I yeet the ball.");
    assert_eq!(records[2].sentence, "They yeet everything.");
    assert!(records
        .iter()
        .all(|r| r.slang_word == "yeet" && r.classification == Classification::Known));

    let raw = std::fs::read_to_string(&summary.output_path).unwrap();
    assert!(raw.starts_with("id,slang_word,sentence,type\n"));
    assert!(raw.contains("1,yeet,I yeet the ball.,N\n"));
}

#[tokio::test]
async fn test_multi_token_word_stops_at_first_unknown_token() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/random-word/",
        page(&["Time for <b>bae watch</b> tonight."], None),
    )
    .await;
    mount_lookup(&mock_server, "bae", NOT_FOUND, 1).await;
    mount_lookup(&mock_server, "watch", FOUND, 0).await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 5);
    let summary = run_harvest(config).await.unwrap();

    let records = load_records(&summary.output_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].slang_word, "bae watch");
    assert_eq!(records[0].classification, Classification::Unknown);
}

#[tokio::test]
async fn test_failed_lookup_records_unknown() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/random-word/",
        page(&["That was <b>bussin</b> fr."], None),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 1);
    let summary = run_harvest(config).await.unwrap();

    assert!(summary.ensure_success().is_ok());
    assert_eq!(summary.stats.lookup_failures, 1);

    let records = load_records(&summary.output_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].classification, Classification::Unknown);
}

#[tokio::test]
async fn test_fetch_failure_writes_no_records() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/random-word/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    mount_lookup(&mock_server, "anything", FOUND, 0).await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 3, 1);
    let summary = run_harvest(config).await.unwrap();

    assert!(summary.ensure_success().is_ok());
    assert_eq!(summary.trails_run, 3);
    assert_eq!(summary.records_written, 0);
    assert_eq!(summary.stats.fetch_failures, 3);

    let raw = std::fs::read_to_string(&summary.output_path).unwrap();
    assert_eq!(raw, "id,slang_word,sentence,type\n");
}

#[tokio::test]
async fn test_censored_entries_are_skipped() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    mount_page(
        &mock_server,
        "/random-word/",
        page(
            &[
                r#"You <span class="censored">****</span> <b>simp</b>."#,
                "Stop being a <b>simp</b>.",
            ],
            None,
        ),
    )
    .await;
    mount_lookup(&mock_server, "simp", FOUND, 1).await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 1, 1);
    let summary = run_harvest(config).await.unwrap();

    let records = load_records(&summary.output_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sentence, "Stop being a simp.");
}

#[tokio::test]
async fn test_parallel_trails_never_duplicate_sentences() {
    let mock_server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // Every trail lands on the same page.
    mount_page(
        &mock_server,
        "/random-word/",
        page(
            &[
                "Big <b>rizz</b> energy.",
                "No <b>cap</b> at all.",
                "That's <b>mid</b>.",
            ],
            None,
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string(FOUND))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), dir.path(), 8, 1);
    let summary = run_harvest(config).await.unwrap();

    assert_eq!(summary.trails_run, 8);
    assert_eq!(summary.records_written, 3);
    assert_eq!(summary.stats.duplicates_skipped, 21);

    let records = load_records(&summary.output_path).unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn test_resume_skips_known_sentences_and_continues_ids() {
    let dir = TempDir::new().unwrap();

    let first_server = MockServer::start().await;
    mount_page(
        &first_server,
        "/random-word/",
        page(&["Just <b>yeet</b> it.", "Total <b>drip</b>."], None),
    )
    .await;
    mount_lookup(&first_server, "yeet", FOUND, 1).await;
    mount_lookup(&first_server, "drip", NOT_FOUND, 1).await;

    let config = create_test_config(&first_server.uri(), dir.path(), 1, 1);
    let first = run_harvest(config).await.unwrap();
    assert_eq!(first.records_written, 2);
    let after_first = std::fs::read(&first.output_path).unwrap();

    // Same page again: nothing new, file untouched, no lookups.
    let same_server = MockServer::start().await;
    mount_page(
        &same_server,
        "/random-word/",
        page(&["Just <b>yeet</b> it.", "Total <b>drip</b>."], None),
    )
    .await;
    mount_lookup(&same_server, "yeet", FOUND, 0).await;
    mount_lookup(&same_server, "drip", FOUND, 0).await;

    let config = create_test_config(&same_server.uri(), dir.path(), 1, 1);
    let harvester = Harvester::new(config).unwrap();
    assert_eq!(harvester.first_id(), 3);
    assert_eq!(harvester.state().sentences.len(), 2);
    let second = harvester.run().await.unwrap();
    assert_eq!(second.records_written, 0);
    assert_eq!(std::fs::read(&second.output_path).unwrap(), after_first);

    // A new sentence for a memoized word keeps the stored classification.
    let third_server = MockServer::start().await;
    mount_page(
        &third_server,
        "/random-word/",
        page(&["Total <b>drip</b>.", "More <b>drip</b> today."], None),
    )
    .await;
    mount_lookup(&third_server, "drip", FOUND, 0).await;

    let config = create_test_config(&third_server.uri(), dir.path(), 1, 1);
    let third = run_harvest(config).await.unwrap();
    assert_eq!(third.first_id, 3);
    assert_eq!(third.records_written, 1);

    let records = load_records(&third.output_path).unwrap();
    let ids: Vec<u64> = records.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(records[2].sentence, "More drip today.");
    assert_eq!(records[2].classification, Classification::Unknown);

    let stats = load_store_statistics(&third.output_path).unwrap();
    assert_eq!(stats.total_records, 3);
    assert_eq!(stats.known, 1);
    assert_eq!(stats.unknown, 2);
    assert_eq!(stats.distinct_words, 2);
}
