//! Integration tests for the crawler
//!
//! These tests serve a miniature catalogue from wiremock and run the real
//! HTTP renderer, listing walker and SQLite store against it end to end.

use jpo_scraper::config::{
    Config, CrawlerConfig, RendererConfig, RendererKind, ServerConfig, StoreConfig,
};
use jpo_scraper::crawler::crawl;
use jpo_scraper::server::{router, AppState, FAILURE_MESSAGE, SUCCESS_MESSAGE};
use jpo_scraper::storage::SqliteStore;
use jpo_scraper::{Record, ScrapeError};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration crawling `listing_url` with the HTTP renderer
fn create_test_config(listing_url: String, max_pages: u32, db_path: &str) -> Config {
    Config {
        crawler: CrawlerConfig {
            listing_url,
            max_pages,
            detail_timeout_ms: 10_000,
            pagination_timeout_ms: 30_000,
        },
        renderer: RendererConfig {
            kind: RendererKind::Http,
            user_agent: "TestBot/1.0".to_string(),
            request_timeout_ms: 5_000,
            ..RendererConfig::default()
        },
        store: StoreConfig {
            database_path: db_path.to_string(),
            collection: "parcoursup_data".to_string(),
            document_prefix: "data_".to_string(),
        },
        server: ServerConfig::default(),
    }
}

fn listing(links: &[&str], next: Option<&str>) -> String {
    let cards: String = links
        .iter()
        .map(|link| {
            format!(
                r#"<div class="fr-card"><a class="fr-btn" href="{}">Découvrir la formation</a></div>"#,
                link
            )
        })
        .collect();
    let next = next
        .map(|href| {
            format!(
                r#"<button class="fr-pagination__link fr-pagination__link--next" data-href="{}">Page suivante</button>"#,
                href
            )
        })
        .unwrap_or_default();

    format!(
        r#"<html><body><main><div class="fr-grid-row">{}</div><nav>{}</nav></main></body></html>"#,
        cards, next
    )
}

fn detail(title: &str, sessions: &[(&str, &str)]) -> String {
    let sections: String = sessions
        .iter()
        .map(|(date, horaire)| {
            format!(
                r#"<div class="fr-accordion">
                    <button class="fr-accordion__btn"><span class="fr-badge">{}</span></button>
                    <div class="fr-collapse fr-collapse--expanded">
                        <p><strong>{}</strong></p>
                        <ul class="list-unstyled">
                            <li class="fr-icon-arrow-right-line">Sur place<a href="https://etablissement.test/jpo"></a></li>
                        </ul>
                        <p><strong>Commentaire de l'établissement :</strong><span>Entrée libre</span></p>
                    </div>
                </div>"#,
                date, horaire
            )
        })
        .collect();

    format!(
        r#"<html><body>
            <h1 class="fr-h2 fr-mb-1w">{}</h1>
            <div class="fr-grid-row"><div class="fr-tile__body">{}</div></div>
        </body></html>"#,
        title, sections
    )
}

async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_two_cards() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/carte",
        listing(&["/formations/1", "/formations/2"], None),
    )
    .await;
    mount_page(
        &mock_server,
        "/formations/1",
        detail(
            "Licence Informatique",
            &[("Samedi 3 février", "9h - 17h"), ("Samedi 9 mars", "9h - 12h")],
        ),
    )
    .await;
    mount_page(&mock_server, "/formations/2", detail("BTS SIO", &[])).await;

    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let db_path = dir.path().join("jpo.db");
    let config = create_test_config(
        format!("{}/carte", mock_server.uri()),
        1,
        db_path.to_str().unwrap(),
    );
    let mut store =
        SqliteStore::new(&db_path, "parcoursup_data", "data_").expect("Failed to open store");

    let summary = crawl(&config, &mut store).await.expect("Crawl failed");

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.links, 2);
    assert_eq!(summary.records, 3);

    // The second flush (one sentinel) overwrote index 0; index 1 is from the first flush
    assert_eq!(store.count_documents().unwrap(), 2);
    assert_eq!(
        store.get_document("data_0").unwrap(),
        Some(Record::no_sessions("BTS SIO"))
    );
    assert_eq!(
        store.get_document("data_1").unwrap(),
        Some(Record {
            formation: "Licence Informatique".to_string(),
            date: "Samedi 9 mars".to_string(),
            horaire: "9h - 12h".to_string(),
            presence: "Sur place".to_string(),
            commentaire: "Entrée libre".to_string(),
            lien: "https://etablissement.test/jpo".to_string(),
        })
    );
}

#[tokio::test]
async fn test_crawl_follows_pagination() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/carte",
        listing(&["/formations/1"], Some("/carte/2")),
    )
    .await;
    mount_page(&mock_server, "/carte/2", listing(&["/formations/2"], None)).await;
    mount_page(
        &mock_server,
        "/formations/1",
        detail("BUT GEA", &[("Samedi 3 février", "9h - 17h")]),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/formations/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail("BUT TC", &[])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut store = SqliteStore::new_in_memory("parcoursup_data", "data_").unwrap();
    let config = create_test_config(format!("{}/carte", mock_server.uri()), 5, ":memory:");

    let summary = crawl(&config, &mut store).await.expect("Crawl failed");

    assert_eq!(summary.pages, 2);
    assert_eq!(summary.links, 2);
    assert_eq!(
        store.get_document("data_0").unwrap(),
        Some(Record::no_sessions("BUT TC"))
    );
}

#[tokio::test]
async fn test_page_bound_stops_pagination() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/carte",
        listing(&["/formations/1"], Some("/carte/2")),
    )
    .await;
    mount_page(&mock_server, "/carte/2", listing(&["/formations/2"], None)).await;
    mount_page(&mock_server, "/formations/1", detail("BUT GEA", &[])).await;

    Mock::given(method("GET"))
        .and(path("/formations/2"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail("BUT TC", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut store = SqliteStore::new_in_memory("parcoursup_data", "data_").unwrap();
    let config = create_test_config(format!("{}/carte", mock_server.uri()), 1, ":memory:");

    let summary = crawl(&config, &mut store).await.expect("Crawl failed");

    assert_eq!(summary.pages, 1);
    assert_eq!(summary.links, 1);
}

#[tokio::test]
async fn test_detail_timeout_aborts_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/carte",
        listing(&["/formations/1", "/formations/2", "/formations/3"], None),
    )
    .await;
    mount_page(
        &mock_server,
        "/formations/1",
        detail("BUT GEA", &[("Samedi 3 février", "9h - 17h")]),
    )
    .await;
    // No structural marker: the wait on this page fails
    mount_page(
        &mock_server,
        "/formations/2",
        "<html><body><p>Maintenance</p></body></html>".to_string(),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/formations/3"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail("BUT TC", &[])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut store = SqliteStore::new_in_memory("parcoursup_data", "data_").unwrap();
    let config = create_test_config(format!("{}/carte", mock_server.uri()), 1, ":memory:");

    let result = crawl(&config, &mut store).await;

    assert!(matches!(result, Err(ScrapeError::Timeout { .. })));
    assert_eq!(store.count_documents().unwrap(), 1);
}

async fn spawn_trigger(config: Config, store: SqliteStore) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router(AppState::new(config, store)))
            .await
            .unwrap();
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_trigger_endpoint_reports_success() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "/carte", listing(&["/formations/1"], None)).await;
    mount_page(&mock_server, "/formations/1", detail("BUT GEA", &[])).await;

    let store = SqliteStore::new_in_memory("parcoursup_data", "data_").unwrap();
    let config = create_test_config(format!("{}/carte", mock_server.uri()), 1, ":memory:");
    let base = spawn_trigger(config, store).await;

    let client = reqwest::Client::new();

    let health = client.get(format!("{}/healthz", base)).send().await.unwrap();
    assert_eq!(health.status(), 200);

    let response = client.post(format!("{}/", base)).send().await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), SUCCESS_MESSAGE);
}

#[tokio::test]
async fn test_trigger_endpoint_reports_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/carte"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let store = SqliteStore::new_in_memory("parcoursup_data", "data_").unwrap();
    let config = create_test_config(format!("{}/carte", mock_server.uri()), 1, ":memory:");
    let base = spawn_trigger(config, store).await;

    let response = reqwest::get(format!("{}/", base)).await.unwrap();
    assert_eq!(response.status(), 500);
    assert_eq!(response.text().await.unwrap(), FAILURE_MESSAGE);
}
