//! Integration tests for the warmer
//!
//! These tests use wiremock to stand in for the warmed site, the purge
//! API, and the log sink, and exercise full warm runs end-to-end.

use std::time::Duration;
use stoker::config::{Config, HeadersConfig, PurgeConfig, SinkConfig, TargetConfig, WarmerConfig};
use stoker::warmer::{build_http_client, run_warm, TargetWarmer};
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration warming a single target
fn create_test_config(
    base_url: &str,
    purge: Option<PurgeConfig>,
    sink_url: Option<String>,
) -> Config {
    Config {
        warmer: test_warmer_config(),
        headers: HeadersConfig::default(),
        targets: vec![TargetConfig {
            region: "id".to_string(),
            base_url: base_url.to_string(),
            user_agent: Some("StokerTest/1.0".to_string()),
            proxy_url: None,
        }],
        purge,
        log_sink: sink_url.map(|url| SinkConfig { url }),
    }
}

fn test_warmer_config() -> WarmerConfig {
    WarmerConfig {
        batch_size: 1,
        inter_batch_delay_ms: 10, // Very short for testing
        max_retries: 2,
        retry_delay_ms: 50,
        sitemap_timeout_secs: 2,
        fetch_timeout_secs: 1,
    }
}

/// Mounts a sitemap index plus one child sitemap on the site server
async fn mount_sitemaps(site: &MockServer, page_locs: &[String]) {
    let base = site.uri();

    let index_body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>{base}/sitemap-posts.xml</loc></sitemap>
</sitemapindex>"#
    );

    let url_entries: String = page_locs
        .iter()
        .map(|loc| format!("  <url><loc>{loc}</loc></url>\n"))
        .collect();
    let child_body = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{url_entries}</urlset>"#
    );

    Mock::given(method("GET"))
        .and(path("/sitemap_index.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(index_body))
        .mount(site)
        .await;

    Mock::given(method("GET"))
        .and(path("/sitemap-posts.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(child_body))
        .mount(site)
        .await;
}

#[tokio::test]
async fn test_full_warm_run_with_purge_and_sink() {
    let site = MockServer::start().await;
    let purge_api = MockServer::start().await;
    let sink = MockServer::start().await;
    let base = site.uri();

    let url_a = format!("{base}/a");
    let url_b = format!("{base}/b");

    // Sitemap lists a duplicate and a cross-host URL that must be dropped
    mount_sitemaps(
        &site,
        &[
            url_a.clone(),
            url_b.clone(),
            "https://other.test/c".to_string(),
            url_a.clone(),
        ],
    )
    .await;

    // /a: CDN miss, served from SIN edge -> must be purged
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("x-cache-status", "HIT")
                .insert_header("cf-cache-status", "MISS")
                .insert_header("cf-ray", "8f2d4a1b2c3d-SIN")
                .insert_header("x-served-by", "cache-sin1::hosted"),
        )
        .mount(&site)
        .await;

    // /b: CDN hit -> no purge
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("cf-cache-status", "Hit"),
        )
        .mount(&site)
        .await;

    // Exactly one purge call expected, for /a
    Mock::given(method("POST"))
        .and(path("/zones/zone1/purge_cache"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true
        })))
        .expect(1)
        .mount(&purge_api)
        .await;

    // Exactly one flush expected
    Mock::given(method("POST"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sink)
        .await;

    let config = create_test_config(
        &base,
        Some(PurgeConfig {
            zone_id: "zone1".to_string(),
            api_token: "test-token".to_string(),
            api_base: purge_api.uri(),
        }),
        Some(sink.uri()),
    );

    run_warm(config).await.expect("warm run should complete");

    // The purge call carried the missed URL
    let purge_requests = purge_api.received_requests().await.unwrap();
    assert_eq!(purge_requests.len(), 1);
    let purge_body: serde_json::Value =
        serde_json::from_slice(&purge_requests[0].body).unwrap();
    assert_eq!(purge_body["files"], serde_json::json!([url_a]));

    // The single flush carried one summary row plus two page rows
    let sink_requests = sink.received_requests().await.unwrap();
    assert_eq!(sink_requests.len(), 1);
    let flush: serde_json::Value = serde_json::from_slice(&sink_requests[0].body).unwrap();

    let headers = flush["headers"].as_array().unwrap();
    assert_eq!(headers[0], "run_id");
    let rows = flush["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 3);

    // Summary row first, then page rows in batch order (batch size 1)
    assert!(rows[0][11].as_str().unwrap().contains("discovered 2 URLs"));
    assert_eq!(rows[1][4], serde_json::json!(url_a));
    assert_eq!(rows[2][4], serde_json::json!(url_b));

    // Classification fields: /a resolved to the SIN edge, /b fell back to
    // the configured region
    assert_eq!(rows[1][3], serde_json::json!("SIN"));
    assert_eq!(rows[1][6], serde_json::json!("HIT"));
    assert_eq!(rows[1][7], serde_json::json!("MISS"));
    assert_eq!(rows[1][8], serde_json::json!("cache-sin1"));
    assert_eq!(rows[2][3], serde_json::json!("id"));
    assert_eq!(rows[2][7], serde_json::json!("HIT"));

    // Every row shares one run id, one start and one finish timestamp
    for row in rows {
        assert_eq!(row[0], rows[0][0]);
        assert_eq!(row[1], rows[0][1]);
        assert_eq!(row[2], rows[0][2]);
        assert!(!row[2].is_null());
    }
}

#[tokio::test]
async fn test_flat_sitemap_fallback() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;
    let base = site.uri();

    // No sitemap_index.xml (404), flat sitemap.xml only
    let flat_body = format!(
        r#"<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url><loc>{base}/page</loc></url>
</urlset>"#
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_string(flat_body))
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).insert_header("cf-cache-status", "HIT"))
        .mount(&site)
        .await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sink)
        .await;

    let config = create_test_config(&base, None, Some(sink.uri()));
    run_warm(config).await.expect("warm run should complete");

    let sink_requests = sink.received_requests().await.unwrap();
    let flush: serde_json::Value = serde_json::from_slice(&sink_requests[0].body).unwrap();
    let rows = flush["rows"].as_array().unwrap();

    assert_eq!(rows.len(), 2);
    assert!(rows[0][11].as_str().unwrap().contains("discovered 1 URLs"));
    assert_eq!(rows[1][4], serde_json::json!(format!("{base}/page")));
    assert_eq!(rows[1][10], serde_json::json!(false));
}

#[tokio::test]
async fn test_empty_discovery_still_flushes_summary() {
    let site = MockServer::start().await;
    let sink = MockServer::start().await;

    // Neither sitemap entry point exists; warming degrades to zero URLs
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&sink)
        .await;

    let config = create_test_config(&site.uri(), None, Some(sink.uri()));
    run_warm(config).await.expect("warm run should complete");

    let sink_requests = sink.received_requests().await.unwrap();
    let flush: serde_json::Value = serde_json::from_slice(&sink_requests[0].body).unwrap();
    let rows = flush["rows"].as_array().unwrap();

    assert_eq!(rows.len(), 1);
    assert!(rows[0][11].as_str().unwrap().contains("discovered 0 URLs"));
}

#[tokio::test]
async fn test_run_completes_without_purge_or_sink() {
    let site = MockServer::start().await;
    let base = site.uri();

    mount_sitemaps(&site, &[format!("{base}/a")]).await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(ResponseTemplate::new(200).insert_header("cf-cache-status", "MISS"))
        .mount(&site)
        .await;

    // A MISS with no purge credentials is a silent skip, not an error
    let config = create_test_config(&base, None, None);
    run_warm(config).await.expect("warm run should complete");
}

/// Builds a TargetWarmer pointed at the given mock site
fn build_warmer(site_uri: &str, warmer: WarmerConfig) -> TargetWarmer {
    let target = TargetConfig {
        region: "id".to_string(),
        base_url: site_uri.to_string(),
        user_agent: Some("StokerTest/1.0".to_string()),
        proxy_url: None,
    };
    let client = build_http_client(
        &target,
        Duration::from_secs(warmer.fetch_timeout_secs),
    )
    .expect("client should build");

    TargetWarmer::new(client, target, warmer, HeadersConfig::default(), None)
}

#[tokio::test]
async fn test_retry_recovers_after_transient_timeout() {
    let site = MockServer::start().await;
    let base = site.uri();

    // First attempt stalls past the 1s client timeout, second succeeds
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .up_to_n_times(1)
        .mount(&site)
        .await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).insert_header("cf-cache-status", "HIT"))
        .mount(&site)
        .await;

    let warmer = build_warmer(&base, test_warmer_config());
    let urls = vec![Url::parse(&format!("{base}/slow")).unwrap()];
    let rows = warmer.warm_urls(&urls).await;

    assert_eq!(rows.len(), 1);
    assert!(!rows[0].error);
    assert_eq!(rows[0].status_code, Some(200));

    // One timed-out attempt plus one successful retry
    let requests = site.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_retry_exhaustion_yields_failure_row() {
    let site = MockServer::start().await;
    let base = site.uri();

    // Every attempt stalls past the client timeout
    Mock::given(method("GET"))
        .and(path("/dead"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&site)
        .await;

    let warmer = build_warmer(&base, test_warmer_config());
    let urls = vec![Url::parse(&format!("{base}/dead")).unwrap()];
    let rows = warmer.warm_urls(&urls).await;

    assert_eq!(rows.len(), 1);
    assert!(rows[0].error);
    assert_eq!(rows[0].status_code, None);
    assert_eq!(rows[0].region_tag, "id");
    assert!(!rows[0].message.is_empty());

    // Exactly max_retries attempts, no more
    let requests = site.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn test_http_error_status_is_not_retried() {
    let site = MockServer::start().await;
    let base = site.uri();

    // A 503 is a response, not a transport failure: one attempt, success row
    Mock::given(method("GET"))
        .and(path("/unhappy"))
        .respond_with(ResponseTemplate::new(503).insert_header("cf-cache-status", "MISS"))
        .mount(&site)
        .await;

    let warmer = build_warmer(&base, test_warmer_config());
    let urls = vec![Url::parse(&format!("{base}/unhappy")).unwrap()];
    let rows = warmer.warm_urls(&urls).await;

    assert_eq!(rows.len(), 1);
    assert!(!rows[0].error);
    assert_eq!(rows[0].status_code, Some(503));

    let requests = site.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn test_batch_isolation_one_failure_does_not_block_siblings() {
    let site = MockServer::start().await;
    let base = site.uri();

    Mock::given(method("GET"))
        .and(path("/ok1"))
        .respond_with(ResponseTemplate::new(200).insert_header("cf-cache-status", "HIT"))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/stuck"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&site)
        .await;
    Mock::given(method("GET"))
        .and(path("/ok2"))
        .respond_with(ResponseTemplate::new(200).insert_header("cf-cache-status", "HIT"))
        .mount(&site)
        .await;

    // One batch of three, the middle URL times out through all retries
    let mut warmer_config = test_warmer_config();
    warmer_config.batch_size = 3;
    let warmer = build_warmer(&base, warmer_config);

    let urls: Vec<Url> = ["ok1", "stuck", "ok2"]
        .iter()
        .map(|p| Url::parse(&format!("{base}/{p}")).unwrap())
        .collect();
    let rows = warmer.warm_urls(&urls).await;

    assert_eq!(rows.len(), 3);
    assert_eq!(rows.iter().filter(|r| r.error).count(), 1);
    assert_eq!(rows.iter().filter(|r| !r.error).count(), 2);

    let failed = rows.iter().find(|r| r.error).unwrap();
    assert!(failed.url.ends_with("/stuck"));
}
