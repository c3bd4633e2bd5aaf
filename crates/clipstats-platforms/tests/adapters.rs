//! Integration tests for the platform adapters using wiremock HTTP mocks.

use clipstats_platforms::{
    AdapterError, InstagramAdapter, PlatformAdapter, TikTokAdapter, TwitterAdapter, YouTubeAdapter,
};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

#[tokio::test]
async fn youtube_maps_counters_and_snippet() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [{
            "statistics": {
                "viewCount": "1000",
                "likeCount": "80",
                "commentCount": "20"
            },
            "snippet": {
                "title": "Launch day recap",
                "channelTitle": "clipdeck",
                "publishedAt": "2026-07-01T12:00:00Z",
                "thumbnails": {
                    "medium": { "url": "https://i.ytimg.com/vi/abc/m.jpg" }
                }
            }
        }]
    });

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .and(query_param("part", "statistics,snippet"))
        .and(query_param("id", "abc"))
        .and(query_param("key", "yt-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let adapter = YouTubeAdapter::with_base_url(Some("yt-key".to_string()), 5, &server.uri())
        .expect("client construction should not fail");
    let stats = adapter.fetch("abc").await.unwrap().unwrap();

    assert_eq!(stats.views, 1000);
    assert_eq!(stats.likes, 80);
    assert_eq!(stats.comments, 20);
    assert_eq!(stats.shares, 0);
    assert_eq!(stats.title.as_deref(), Some("Launch day recap"));
    assert_eq!(stats.author.as_deref(), Some("clipdeck"));
    assert_eq!(
        stats.thumbnail_url.as_deref(),
        Some("https://i.ytimg.com/vi/abc/m.jpg")
    );
}

#[tokio::test]
async fn youtube_missing_counters_default_to_zero() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "items": [{ "statistics": { "viewCount": "7" } }]
    });

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let adapter =
        YouTubeAdapter::with_base_url(Some("yt-key".to_string()), 5, &server.uri()).unwrap();
    let stats = adapter.fetch("abc").await.unwrap().unwrap();

    assert_eq!(stats.views, 7);
    assert_eq!(stats.likes, 0);
    assert_eq!(stats.comments, 0);
}

#[tokio::test]
async fn youtube_empty_items_is_not_found() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/youtube/v3/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})))
        .mount(&server)
        .await;

    let adapter =
        YouTubeAdapter::with_base_url(Some("yt-key".to_string()), 5, &server.uri()).unwrap();
    let err = adapter.fetch("gone").await.unwrap_err();

    assert!(matches!(err, AdapterError::VideoNotFound { .. }), "{err}");
}

#[tokio::test]
async fn youtube_without_api_key_fails_fast() {
    let adapter = YouTubeAdapter::with_base_url(None, 5, "http://localhost:1").unwrap();
    let err = adapter.fetch("abc").await.unwrap_err();
    assert!(matches!(err, AdapterError::MissingApiKey { .. }), "{err}");
}

#[tokio::test]
async fn tiktok_round_trips_counters() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "code": 0,
        "data": {
            "play_count": 12000,
            "digg_count": 340,
            "comment_count": 56,
            "share_count": 12,
            "cover": "https://p16.tiktokcdn.com/cover.jpg",
            "title": "clip",
            "author": { "nickname": "creator" },
            "create_time": 1751371200
        }
    });

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let adapter = TikTokAdapter::with_base_url(5, &server.uri()).unwrap();
    let stats = adapter.fetch("7301234567890").await.unwrap().unwrap();

    assert_eq!(stats.views, 12000);
    assert_eq!(stats.likes, 340);
    assert_eq!(stats.comments, 56);
    assert_eq!(stats.shares, 12);
    assert_eq!(stats.author.as_deref(), Some("creator"));
}

#[tokio::test]
async fn tiktok_missing_data_yields_zero_counters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"code": -1, "msg": "no item"})),
        )
        .mount(&server)
        .await;

    let adapter = TikTokAdapter::with_base_url(5, &server.uri()).unwrap();
    let stats = adapter.fetch("000").await.unwrap().unwrap();

    assert_eq!(stats.views, 0);
    assert_eq!(stats.likes, 0);
    assert_eq!(stats.comments, 0);
    assert_eq!(stats.shares, 0);
}

#[tokio::test]
async fn tiktok_server_error_is_hard_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let adapter = TikTokAdapter::with_base_url(5, &server.uri()).unwrap();
    let err = adapter.fetch("123").await.unwrap_err();

    assert!(
        matches!(err, AdapterError::UnexpectedStatus { status: 503, .. }),
        "{err}"
    );
}

#[tokio::test]
async fn instagram_solves_compute_challenge_by_echoing() {
    let server = MockServer::start().await;

    // First POST (no compute headers) returns the challenge.
    Mock::given(method("POST"))
        .and(path("/api/instagram/media-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": "COMPUTE_REQUIRED",
            "challenge": { "timestamp": 1751371200, "expectedCompute": "echo-me" }
        })))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;

    // Retry with the echoed headers returns the counters.
    Mock::given(method("POST"))
        .and(path("/api/instagram/media-stats"))
        .and(header("X-Compute", "echo-me"))
        .and(header("X-Timestamp", "1751371200"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "view_count": 800,
            "like_count": 64,
            "comment_count": 8
        })))
        .with_priority(2)
        .mount(&server)
        .await;

    let adapter = InstagramAdapter::with_base_url(5, &server.uri()).unwrap();
    let stats = adapter.fetch("CxAbC123").await.unwrap().unwrap();

    assert_eq!(stats.views, 800);
    assert_eq!(stats.likes, 64);
    assert_eq!(stats.comments, 8);
    assert_eq!(stats.shares, 0);
}

#[tokio::test]
async fn instagram_posts_reel_payload() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/instagram/media-stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "view_count": 1, "like_count": 0, "comment_count": 0
        })))
        .mount(&server)
        .await;

    let adapter = InstagramAdapter::with_base_url(5, &server.uri()).unwrap();
    adapter.fetch("CxAbC123").await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value = body_json(&requests[0]);
    assert_eq!(body["type"], "reels");
    assert_eq!(body["url"], "https://www.instagram.com/reel/CxAbC123/");
}

#[tokio::test]
async fn instagram_api_error_yields_zero_counters() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/instagram/media-stats"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"error": "MEDIA_UNAVAILABLE"})),
        )
        .mount(&server)
        .await;

    let adapter = InstagramAdapter::with_base_url(5, &server.uri()).unwrap();
    let stats = adapter.fetch("CxGone").await.unwrap().unwrap();

    assert_eq!(stats.views, 0);
    assert_eq!(stats.likes, 0);
}

#[tokio::test]
async fn twitter_maps_counters_and_sums_shares() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "impression_count": 9000,
        "favorite_count": 300,
        "conversation_count": 25,
        "retweet_count": 40,
        "quote_count": 10,
        "user": { "name": "Clip Deck" },
        "created_at": "2026-07-01T12:00:00Z"
    });

    Mock::given(method("GET"))
        .and(path("/tweet-result"))
        .and(query_param("id", "1234567890"))
        .and(query_param("token", "x"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let adapter = TwitterAdapter::with_base_url(5, &server.uri()).unwrap();
    let stats = adapter
        .fetch("https://x.com/clipdeck/status/1234567890")
        .await
        .unwrap()
        .unwrap();

    assert_eq!(stats.views, 9000);
    assert_eq!(stats.likes, 300);
    assert_eq!(stats.comments, 25);
    assert_eq!(stats.shares, 50);
    assert_eq!(stats.author.as_deref(), Some("Clip Deck"));
}

#[tokio::test]
async fn twitter_without_tweet_id_returns_none() {
    let adapter = TwitterAdapter::with_base_url(5, "http://localhost:1").unwrap();
    let result = adapter.fetch("https://example.com/not-a-tweet").await;
    assert!(matches!(result, Ok(None)));
}

fn body_json(request: &Request) -> serde_json::Value {
    serde_json::from_slice(&request.body).expect("request body should be JSON")
}
