//! End-to-end tests: the HTTP service against a mock image upstream.

use scenery::{SceneryConfig, SceneryServer};
use scenery_search::ImageSearchConfig;
use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn results_page(urls: &[&str]) -> String {
    let tiles: String = urls
        .iter()
        .map(|u| format!(r#"<a class="iusc" m='{{"murl":"{u}"}}'><img></a>"#))
        .collect();
    format!("<html><body>{tiles}</body></html>")
}

async fn mock_upstream() -> MockServer {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/images/search"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            "https://www.shutterstock.com/paris-0.jpg",
            "https://img.example/paris-1.jpg",
            "https://img.example/paris-2.jpg",
        ])))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/search"))
        .and(query_param("q", "Rome"))
        .respond_with(ResponseTemplate::new(200).set_body_string(results_page(&[
            "https://img.example/rome-1.jpg",
        ])))
        .mount(&upstream)
        .await;
    Mock::given(method("GET"))
        .and(path("/images/search"))
        .and(query_param("q", "Atlantis"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&upstream)
        .await;
    upstream
}

async fn start_server(upstream: &MockServer) -> SceneryServer {
    let mut config = SceneryConfig::default();
    config.server.host = "127.0.0.1".into();
    config.server.port = 0;
    config.search = ImageSearchConfig {
        base_url: upstream.uri(),
        timeout_seconds: 2,
        ..Default::default()
    };
    SceneryServer::start(&config).await.expect("server starts")
}

fn url(server: &SceneryServer, route: &str) -> String {
    format!("http://{}{route}", server.addr())
}

async fn post_json(server: &SceneryServer, body: &Value) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(url(server, "/api/bulk_images"))
        .json(body)
        .send()
        .await
        .expect("request sent");
    let status = response.status().as_u16();
    let body = response.json().await.expect("JSON body");
    (status, body)
}

#[tokio::test]
async fn root_reports_service() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let body: Value = reqwest::get(url(&server, "/"))
        .await
        .expect("request sent")
        .json()
        .await
        .expect("JSON body");
    assert_eq!(body, json!({"status": "ok", "service": "image-scraper"}));
}

#[tokio::test]
async fn list_request_maps_each_location() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let (status, body) = post_json(&server, &json!(["Paris", "Rome", "Atlantis"])).await;
    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!({
            "Paris": ["https://img.example/paris-1.jpg", "https://img.example/paris-2.jpg"],
            "Rome": ["https://img.example/rome-1.jpg"],
            "Atlantis": []
        })
    );
}

#[tokio::test]
async fn single_request_returns_images_key() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let (status, body) = post_json(
        &server,
        &json!({"location": "Rome", "params": {"aspectRatio": "16:9", "highQuality": true}}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"images": ["https://img.example/rome-1.jpg"]}));
}

#[tokio::test]
async fn failed_single_request_degrades_to_empty_images() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let (status, body) = post_json(&server, &json!({"location": "Atlantis"})).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"images": []}));
}

#[tokio::test]
async fn invalid_bodies_are_rejected_with_detail() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let too_many: Vec<String> = (0..21).map(|i| format!("City {i}")).collect();
    let cases = [
        (json!([]), "Empty location list provided"),
        (json!(["Paris", 7]), "When sending an array, all items must be strings."),
        (json!(too_many), "Maximum 20 locations allowed per request"),
        (json!({"location": ""}), "Location cannot be empty"),
        (json!({"location": 42}), "The 'location' field must be a string."),
    ];

    for (body, expected) in cases {
        let (status, response) = post_json(&server, &body).await;
        assert_eq!(status, 400, "body {body}");
        assert_eq!(response["detail"], expected, "body {body}");
    }

    let (status, response) = post_json(&server, &json!({"place": "Paris"})).await;
    assert_eq!(status, 400);
    assert!(
        response["detail"]
            .as_str()
            .expect("detail string")
            .starts_with("Invalid request format"),
        "got {response}"
    );

    assert!(upstream.received_requests().await.expect("recording").is_empty());
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let response = reqwest::Client::new()
        .post(url(&server, "/api/bulk_images"))
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .expect("request sent");
    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.expect("JSON body");
    assert_eq!(body, json!({"detail": "Request body must be JSON"}));
}

#[tokio::test]
async fn health_reports_cache_size() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let health = |server: &SceneryServer| {
        let target = url(server, "/health");
        async move {
            reqwest::get(target)
                .await
                .expect("request sent")
                .json::<Value>()
                .await
                .expect("JSON body")
        }
    };

    let before = health(&server).await;
    assert_eq!(
        before,
        json!({"status": "healthy", "cache_size": 0, "service": "image-scraper"})
    );

    let (status, _) = post_json(&server, &json!(["Paris", "Rome", "Atlantis"])).await;
    assert_eq!(status, 200);

    // Failures are not cached.
    let after = health(&server).await;
    assert_eq!(after["cache_size"], 2);
}

#[tokio::test]
async fn repeated_batch_is_served_from_cache() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let first = post_json(&server, &json!(["Paris"])).await;
    let second = post_json(&server, &json!(["Paris"])).await;
    assert_eq!(first, second);

    let requests = upstream.received_requests().await.expect("recording");
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn cors_preflight_allows_configured_origin() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, url(&server, "/api/bulk_images"))
        .header("origin", "https://www.triponbuddy.com")
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .send()
        .await
        .expect("request sent");
    assert!(response.status().is_success());
    assert_eq!(
        response
            .headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("https://www.triponbuddy.com")
    );
}

#[tokio::test]
async fn any_localhost_port_is_allowed_and_headers_are_exposed() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let response = reqwest::Client::new()
        .get(url(&server, "/health"))
        .header("origin", "http://localhost:5173")
        .send()
        .await
        .expect("request sent");
    let header = |name: &str| {
        response
            .headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    assert_eq!(
        header("access-control-allow-origin").as_deref(),
        Some("http://localhost:5173")
    );
    assert_eq!(header("access-control-expose-headers").as_deref(), Some("*"));
}

#[tokio::test]
async fn unknown_origin_gets_no_cors_grant() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;

    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, url(&server, "/api/bulk_images"))
        .header("origin", "https://elsewhere.example")
        .header("access-control-request-method", "POST")
        .send()
        .await
        .expect("request sent");
    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn shutdown_stops_accepting_connections() {
    let upstream = mock_upstream().await;
    let server = start_server(&upstream).await;
    let target = url(&server, "/");

    server.shutdown();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    assert!(reqwest::get(target).await.is_err());
}
