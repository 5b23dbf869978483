use super::*;
use axum::{http::StatusCode, routing::get, Json, Router};
use chrono::TimeZone;
use serde_json::json;
use tokio::net::TcpListener;

struct FixedSource {
    name: &'static str,
    result: fn() -> Result<Vec<BlogPost>, FeedError>,
}

#[async_trait]
impl FeedSource for FixedSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, _now: DateTime<Utc>) -> Result<Vec<BlogPost>, FeedError> {
        (self.result)()
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
}

fn failing(name: &'static str) -> Arc<dyn FeedSource> {
    Arc::new(FixedSource {
        name,
        result: || Err(FeedError::Unavailable("connection reset".into())),
    })
}

fn empty(name: &'static str) -> Arc<dyn FeedSource> {
    Arc::new(FixedSource {
        name,
        result: || Ok(Vec::new()),
    })
}

fn ids(posts: &[BlogPost]) -> Vec<&str> {
    posts.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn curated_aggregator_lists_all_sources_newest_first() {
    let posts = BlogAggregator::curated().fetch_all_at(now()).await;

    assert_eq!(posts.len(), 8);
    assert!(posts.windows(2).all(|w| w[0].published >= w[1].published));
    assert_eq!(posts.last().map(|p| p.id.as_str()), Some("3dins-2"));
    assert_eq!(
        posts.iter().find(|p| p.id.as_str() == "sculpteo-1").map(|p| p.published),
        Some(now() - chrono::Duration::hours(36))
    );
}

#[tokio::test]
async fn failed_source_falls_back_to_its_curated_posts() {
    let aggregator = BlogAggregator::new(vec![failing("All3DP"), empty("Sculpteo")]);
    let posts = aggregator.fetch_all_at(now()).await;
    assert_eq!(ids(&posts), vec!["all3dp-1", "sculpteo-1", "all3dp-2"]);
}

#[tokio::test]
async fn global_list_used_when_every_source_is_empty() {
    let aggregator = BlogAggregator::new(vec![failing("Unknown Blog"), empty("Another")]);
    let posts = aggregator.fetch_all_at(now()).await;
    assert_eq!(ids(&posts), vec!["1", "2", "3", "4", "5"]);
}

#[tokio::test]
async fn excluded_sources_are_not_fetched() {
    let aggregator = BlogAggregator::curated().with_excluded(["All3DP", "3D Insider"]);
    assert_eq!(aggregator.source_names().len(), 3);

    let posts = aggregator.fetch_all_at(now()).await;
    assert!(posts.iter().all(|p| p.source != "All3DP" && p.source != "3D Insider"));
    assert_eq!(posts.len(), 4);
}

async fn spawn_feed_server() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let app = Router::new()
        .route(
            "/good/feed/json",
            get(|| async {
                Json(json!({
                    "version": "https://jsonfeed.org/version/1.1",
                    "title": "Maker News",
                    "items": [
                        {
                            "id": "mn-1",
                            "url": "https://maker.example/resin",
                            "title": "Resin printers compared",
                            "summary": "Six   resin printers\nside by side.",
                            "image": "https://maker.example/resin.png",
                            "date_published": "2025-03-10T09:00:00Z",
                            "authors": [{ "name": "Kiran" }]
                        },
                        {
                            "id": "mn-2",
                            "title": "No link, skipped",
                            "date_published": "2025-03-09T09:00:00Z"
                        },
                        {
                            "id": "mn-3",
                            "url": "https://maker.example/pla",
                            "title": "PLA tips",
                            "content_text": "Dry your filament.",
                            "date_published": "2025-03-10T11:00:00+05:30",
                            "author": { "name": "Sana" }
                        }
                    ]
                }))
            }),
        )
        .route(
            "/broken/feed/json",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn json_feed_items_are_mapped_and_broken_feed_falls_back() {
    let base = spawn_feed_server().await;
    let http = Client::new();
    let good: Arc<dyn FeedSource> = Arc::new(JsonFeedSource::new(
        http.clone(),
        "Maker News",
        format!("{base}/good/feed/json"),
    ));
    let broken: Arc<dyn FeedSource> = Arc::new(JsonFeedSource::new(
        http,
        "Sculpteo",
        format!("{base}/broken/feed/json"),
    ));

    let posts = BlogAggregator::new(vec![good, broken])
        .fetch_all_at(now())
        .await;

    assert_eq!(ids(&posts), vec!["mn-1", "mn-3", "sculpteo-1"]);
    let resin = &posts[0];
    assert_eq!(resin.source, "Maker News");
    assert_eq!(resin.excerpt, "Six resin printers side by side.");
    assert_eq!(resin.author.as_deref(), Some("Kiran"));
    assert_eq!(resin.image, "https://maker.example/resin.png");
    assert_eq!(posts[1].author.as_deref(), Some("Sana"));
    assert_eq!(posts[1].image, "");
}
