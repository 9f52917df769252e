use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, ExpandOutput, Pixel, ShortLink, Stats, Tag};
use tower::ServiceExt;

const KEY: &str = "test-key";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {KEY}"))
        .header(http::header::CONTENT_TYPE, "application/json")
        .header(http::header::ACCEPT, "application/json")
        .body(body.to_string())
        .unwrap()
}

/// Send a request through a fresh clone of the router, sharing its state.
async fn send(app: &axum::Router, req: Request<String>) -> axum::response::Response {
    app.clone().oneshot(req).await.unwrap()
}

// --- auth ---

#[tokio::test]
async fn missing_token_returns_401() {
    let app = app(KEY);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/link/tag")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(&body_bytes(resp).await[..], br#"{"message":"Unauthenticated."}"#);
}

#[tokio::test]
async fn wrong_token_returns_401() {
    let app = app(KEY);
    let resp = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/link/pixel")
                .header(http::header::AUTHORIZATION, "Bearer nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- pixels ---

#[tokio::test]
async fn list_pixels_empty() {
    let app = app(KEY);
    let resp = send(&app, request("GET", "/api/v1/link/pixel", "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let pixels: Vec<Pixel> = body_json(resp).await;
    assert!(pixels.is_empty());
}

#[tokio::test]
async fn pixel_lifecycle() {
    let app = app(KEY);

    let resp = send(
        &app,
        request(
            "POST",
            "/api/v1/link/pixel",
            r#"{"name":"GTMPixel","pixel_id":"GTM-xxxx","pixel_type":"googletagmanager"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Pixel = body_json(resp).await;
    assert_eq!(created.name, "GTMPixel");
    let id = created.id;

    let resp = send(
        &app,
        request(
            "PUT",
            &format!("/api/v1/link/pixel/{id}"),
            &format!(r#"{{"id":{id},"name":"Renamed","pixel_id":"GTM-yyyy","pixel_type":"googletagmanager"}}"#),
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Pixel = body_json(resp).await;
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.pixel_id, "GTM-yyyy");

    let resp = send(&app, request("DELETE", &format!("/api/v1/link/pixel/{id}"), "")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&app, request("GET", &format!("/api/v1/link/pixel/{id}"), "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(&body_bytes(resp).await[..], br#"{"message":"not found"}"#);
}

#[tokio::test]
async fn get_pixel_bad_id_returns_400() {
    let app = app(KEY);
    let resp = send(&app, request("GET", "/api/v1/link/pixel/not-a-number", "")).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- tags ---

#[tokio::test]
async fn tag_lifecycle() {
    let app = app(KEY);

    let resp = send(&app, request("POST", "/api/v1/link/tag", r#"{"tag":"fall2024"}"#)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let tag: Tag = body_json(resp).await;
    assert_eq!(tag.tag, "fall2024");

    let resp = send(
        &app,
        request("PUT", &format!("/api/v1/link/tag/{}", tag.id), r#"{"tag":"winter"}"#),
    )
    .await;
    let updated: Tag = body_json(resp).await;
    assert_eq!(updated.tag, "winter");

    let resp = send(&app, request("GET", "/api/v1/link/tag", "")).await;
    let tags: Vec<Tag> = body_json(resp).await;
    assert_eq!(tags.len(), 1);

    let resp = send(&app, request("DELETE", &format!("/api/v1/link/tag/{}", tag.id), "")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, request("DELETE", &format!("/api/v1/link/tag/{}", tag.id), "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn create_tag_malformed_json_returns_422() {
    let app = app(KEY);
    let resp = send(&app, request("POST", "/api/v1/link/tag", r#"{"name":1}"#)).await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- short links ---

#[tokio::test]
async fn short_link_lifecycle() {
    let app = app(KEY);

    let resp = send(
        &app,
        request(
            "POST",
            "/api/v1/link/shorten",
            r#"{"long_url":"https://www.amazon.com/","short_id":"amz","domain":"https://t.ly/","expire_at_views":1}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let link: ShortLink = body_json(resp).await;
    assert_eq!(link.short_url, "https://t.ly/amz");
    assert_eq!(link.expire_at_views, Some(1));

    let resp = send(&app, request("GET", "/api/v1/link?short_url=https://t.ly/amz", "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: ShortLink = body_json(resp).await;
    assert_eq!(fetched.long_url, "https://www.amazon.com/");

    // first expand counts, second hits the view limit
    let expand = r#"{"short_url":"https://t.ly/amz"}"#;
    let out: ExpandOutput = body_json(send(&app, request("POST", "/api/v1/link/expand", expand)).await).await;
    assert!(!out.expired);
    let out: ExpandOutput = body_json(send(&app, request("POST", "/api/v1/link/expand", expand)).await).await;
    assert!(out.expired);

    let resp = send(&app, request("GET", "/api/v1/link/stats?short_url=https://t.ly/amz", "")).await;
    let stats: Stats = body_json(resp).await;
    assert_eq!(stats.clicks, 1);

    let resp = send(
        &app,
        request(
            "PUT",
            "/api/v1/link",
            r#"{"short_url":"https://t.ly/amz","long_url":"https://www.amazon.de/","description":"de"}"#,
        ),
    )
    .await;
    let updated: ShortLink = body_json(resp).await;
    assert_eq!(updated.long_url, "https://www.amazon.de/");
    assert_eq!(updated.description.as_deref(), Some("de"));
    assert_eq!(updated.expire_at_views, Some(1));

    let resp = send(&app, request("DELETE", "/api/v1/link", r#"{"short_url":"https://t.ly/amz"}"#)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = send(&app, request("GET", "/api/v1/link?short_url=https://t.ly/amz", "")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_to_taken_short_id_is_rejected() {
    let app = app(KEY);
    for (long_url, short_id) in [("https://www.amazon.com/", "amz"), ("https://www.ebay.com/", "eby")] {
        let body = format!(r#"{{"long_url":"{long_url}","short_id":"{short_id}","domain":"https://t.ly/"}}"#);
        let resp = send(&app, request("POST", "/api/v1/link/shorten", &body)).await;
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let resp = send(
        &app,
        request(
            "PUT",
            "/api/v1/link",
            r#"{"short_url":"https://t.ly/amz","long_url":"https://www.amazon.de/","short_id":"eby"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_bytes(resp).await,
        r#"{"message":"The short id has already been taken."}"#.as_bytes()
    );

    // both links are untouched
    let resp = send(&app, request("GET", "/api/v1/link?short_url=https://t.ly/eby", "")).await;
    let other: ShortLink = body_json(resp).await;
    assert_eq!(other.long_url, "https://www.ebay.com/");
    let resp = send(&app, request("GET", "/api/v1/link?short_url=https://t.ly/amz", "")).await;
    let original: ShortLink = body_json(resp).await;
    assert_eq!(original.long_url, "https://www.amazon.com/");

    // keeping its own short id is not a conflict
    let resp = send(
        &app,
        request(
            "PUT",
            "/api/v1/link",
            r#"{"short_url":"https://t.ly/amz","long_url":"https://www.amazon.de/","short_id":"amz"}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn expand_with_wrong_password_is_rejected() {
    let app = app(KEY);
    send(
        &app,
        request(
            "POST",
            "/api/v1/link/shorten",
            r#"{"long_url":"https://example.com","short_id":"pw","domain":"https://t.ly/","password":"hunter2"}"#,
        ),
    )
    .await;

    let resp = send(
        &app,
        request("POST", "/api/v1/link/expand", r#"{"short_url":"https://t.ly/pw","password":"guess"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send(
        &app,
        request("POST", "/api/v1/link/expand", r#"{"short_url":"https://t.ly/pw","password":"hunter2"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn list_returns_encoded_string_filtered_by_search() {
    let app = app(KEY);
    for (url, id) in [("https://www.amazon.com/", "a1"), ("https://www.ebay.com/", "e1")] {
        send(
            &app,
            request(
                "POST",
                "/api/v1/link/shorten",
                &format!(r#"{{"long_url":"{url}","short_id":"{id}","domain":"https://t.ly/"}}"#),
            ),
        )
        .await;
    }

    let resp = send(&app, request("GET", "/api/v1/link/list?search=amazon", "")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let encoded: String = body_json(resp).await;
    let inner: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    let data = inner["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["short_id"], "a1");
}

#[tokio::test]
async fn bulk_returns_encoded_string() {
    let app = app(KEY);
    let resp = send(
        &app,
        request(
            "POST",
            "/api/v1/link/bulk",
            r#"{"domain":"https://t.ly/","links":["https://a.example","https://b.example"],"tags":[7]}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let encoded: String = body_json(resp).await;
    let created: Vec<ShortLink> = serde_json::from_str(&encoded).unwrap();
    assert_eq!(created.len(), 2);

    let resp = send(&app, request("GET", "/api/v1/link/list?tag_ids=7", "")).await;
    let encoded: String = body_json(resp).await;
    let inner: serde_json::Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(inner["data"].as_array().unwrap().len(), 2);
}
