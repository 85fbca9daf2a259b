use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info, warn};

use crate::config::{Config, PRODUCTS_LIMIT, PRODUCT_TITLE_MAX, REJECTION_SAMPLE_MAX};
use crate::display::truncate_title;
use crate::error::{AppError, Result};
use crate::types::{GiveawayRecord, Product};

#[derive(Debug, Default)]
pub struct FetchStats {
    pub api_total: usize,
    pub rejected: usize,
    pub decoded: usize,
    /// Whether the list came through the fallback proxy.
    pub via_proxy: bool,
    /// Sample of decode errors for rejected records.
    pub rejection_samples: Vec<String>,
}

pub fn http_client(cfg: &Config) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()?)
}

/// Fetch the full giveaway list.
///
/// When the direct request fails and `cors_proxy_url` is configured, the same
/// URL is retried once through the proxy. If that also fails, the original error
/// is returned.
pub async fn fetch_giveaways(
    client: &reqwest::Client,
    cfg: &Config,
) -> Result<(Vec<GiveawayRecord>, FetchStats)> {
    info!("[FETCH] GET {}", cfg.giveaway_api_url);
    let direct_err = match fetch_giveaway_list(client, &cfg.giveaway_api_url).await {
        Ok(result) => return Ok(result),
        Err(e) => e,
    };
    warn!("[FETCH] direct giveaway fetch failed: {direct_err}");

    let Some(proxy) = cfg.cors_proxy_url.as_deref() else {
        return Err(direct_err);
    };

    let url = proxy_url(proxy, &cfg.giveaway_api_url)?;
    info!("[FETCH] retrying through proxy: {url}");
    match fetch_giveaway_list(client, &url).await {
        Ok((records, mut stats)) => {
            stats.via_proxy = true;
            Ok((records, stats))
        }
        Err(proxy_err) => {
            warn!("[FETCH] proxy fetch failed: {proxy_err}");
            Err(direct_err)
        }
    }
}

async fn fetch_giveaway_list(
    client: &reqwest::Client,
    url: &str,
) -> Result<(Vec<GiveawayRecord>, FetchStats)> {
    let body = get_json(client, url).await?;
    let items = body
        .as_array()
        .ok_or_else(|| AppError::Upstream("giveaway response was not an array".to_string()))?;
    Ok(decode_giveaways(items))
}

/// GET `url`, requiring a 2xx status and a JSON content type.
async fn get_json(client: &reqwest::Client, url: &str) -> Result<serde_json::Value> {
    let resp = client.get(url).send().await?;

    let status = resp.status();
    if !status.is_success() {
        return Err(AppError::Upstream(format!("HTTP {status} from {url}")));
    }

    let is_json = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map_or(false, |ct| ct.contains("application/json"));
    if !is_json {
        let text = resp.text().await.unwrap_or_default();
        let sample: String = text.chars().take(200).collect();
        warn!("[FETCH] non-JSON response from {url}: {sample}");
        return Err(AppError::Upstream("response is not JSON".to_string()));
    }

    Ok(resp.json().await?)
}

/// Decode each array element on its own; malformed records are counted and skipped.
pub fn decode_giveaways(items: &[serde_json::Value]) -> (Vec<GiveawayRecord>, FetchStats) {
    let mut stats = FetchStats {
        api_total: items.len(),
        ..FetchStats::default()
    };
    let mut records = Vec::with_capacity(items.len());

    for item in items {
        match serde_json::from_value::<GiveawayRecord>(item.clone()) {
            Ok(record) => records.push(record),
            Err(e) => {
                stats.rejected += 1;
                if stats.rejection_samples.len() < REJECTION_SAMPLE_MAX {
                    stats.rejection_samples.push(e.to_string());
                }
                debug!("[FETCH] skipping malformed giveaway: {e}");
            }
        }
    }

    stats.decoded = records.len();
    (records, stats)
}

/// `https://proxy.example/` + upstream → `https://proxy.example/?url=<encoded upstream>`.
pub fn proxy_url(proxy: &str, upstream: &str) -> Result<String> {
    reqwest::Url::parse_with_params(proxy, &[("url", upstream)])
        .map(|u| u.to_string())
        .map_err(|e| AppError::Config(format!("invalid CORS_PROXY_URL {proxy}: {e}")))
}

// ---------------------------------------------------------------------------
// Reseller products
// ---------------------------------------------------------------------------

/// Fetch the reseller catalogue: the first `PRODUCTS_LIMIT` products with
/// display-length titles. Accepts a bare array or `{"products": [...]}`.
pub async fn fetch_products(client: &reqwest::Client, cfg: &Config) -> Result<Vec<Product>> {
    let body = get_json(client, &cfg.products_url).await?;
    let items = body
        .as_array()
        .or_else(|| body.get("products").and_then(|p| p.as_array()))
        .ok_or_else(|| AppError::Upstream("products response was not an array".to_string()))?;

    let products = items
        .iter()
        .filter_map(|item| match serde_json::from_value::<Product>(item.clone()) {
            Ok(p) => Some(p),
            Err(e) => {
                debug!("[FETCH] skipping malformed product: {e}");
                None
            }
        })
        .take(PRODUCTS_LIMIT)
        .map(|mut p| {
            p.title = truncate_title(&p.title, PRODUCT_TITLE_MAX);
            p
        })
        .collect();

    Ok(products)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use axum::{extract::Query, http::StatusCode, response::Html, routing::get, Json, Router};
    use serde_json::json;

    use super::*;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn giveaways_json() -> serde_json::Value {
        json!([
            {"id": 1, "title": "Hades", "type": "Game", "platforms": "PC, Steam"},
            {"id": 2, "type": "DLC"},
            {"id": 3, "title": "Celeste", "type": "Game", "platforms": "PC, Epic Games Store"}
        ])
    }

    fn upstream() -> Router {
        Router::new()
            .route("/api/giveaways", get(|| async { Json(giveaways_json()) }))
            .route("/html", get(|| async { Html("<html>blocked</html>") }))
            .route("/down", get(|| async { StatusCode::SERVICE_UNAVAILABLE }))
            .route(
                "/proxy/",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    if q.get("url").map_or(false, |u| u.ends_with("/html")) {
                        Json(giveaways_json())
                    } else {
                        Json(json!({"error": "unexpected"}))
                    }
                }),
            )
            .route(
                "/products.json",
                get(|| async {
                    Json(json!([
                        {"title": "Wireless Gaming Mouse RGB", "price": 25.5, "imgUrl": "i", "productURL": "u", "category_id": "1"},
                        {"title": "Pad", "price": "9.99"},
                        {"price": 1},
                        {"title": "c"}, {"title": "d"}, {"title": "e"}, {"title": "f"}, {"title": "g"}
                    ]))
                }),
            )
    }

    #[test]
    fn decode_skips_malformed_records() {
        let items = giveaways_json();
        let (records, stats) = decode_giveaways(items.as_array().unwrap());
        assert_eq!(records.len(), 2);
        assert_eq!(stats.api_total, 3);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.decoded, 2);
        assert_eq!(stats.rejection_samples.len(), 1);
    }

    #[test]
    fn decode_empty_list() {
        let (records, stats) = decode_giveaways(&[]);
        assert!(records.is_empty());
        assert_eq!(stats.api_total, 0);
    }

    #[test]
    fn proxy_url_encodes_upstream() {
        let url = proxy_url("https://corsproxy.io/", "https://www.gamerpower.com/api/giveaways").unwrap();
        assert_eq!(
            url,
            "https://corsproxy.io/?url=https%3A%2F%2Fwww.gamerpower.com%2Fapi%2Fgiveaways"
        );
        assert!(proxy_url("not a url", "x").is_err());
    }

    #[tokio::test]
    async fn fetches_and_decodes_giveaways() {
        let base = serve(upstream()).await;
        let cfg = Config::for_urls(&format!("{base}/api/giveaways"), "");
        let client = http_client(&cfg).unwrap();
        let (records, stats) = fetch_giveaways(&client, &cfg).await.unwrap();
        assert_eq!(records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 3]);
        assert_eq!(stats.rejected, 1);
        assert!(!stats.via_proxy);
    }

    #[tokio::test]
    async fn non_json_response_is_an_upstream_error() {
        let base = serve(upstream()).await;
        let cfg = Config::for_urls(&format!("{base}/html"), "");
        let client = http_client(&cfg).unwrap();
        let err = fetch_giveaways(&client, &cfg).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref m) if m.contains("not JSON")), "{err}");
    }

    #[tokio::test]
    async fn error_status_is_an_upstream_error() {
        let base = serve(upstream()).await;
        let cfg = Config::for_urls(&format!("{base}/down"), "");
        let client = http_client(&cfg).unwrap();
        let err = fetch_giveaways(&client, &cfg).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref m) if m.contains("503")), "{err}");
    }

    #[tokio::test]
    async fn falls_back_to_proxy() {
        let base = serve(upstream()).await;
        let mut cfg = Config::for_urls(&format!("{base}/html"), "");
        cfg.cors_proxy_url = Some(format!("{base}/proxy/"));
        let client = http_client(&cfg).unwrap();
        let (records, stats) = fetch_giveaways(&client, &cfg).await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(stats.via_proxy);
    }

    #[tokio::test]
    async fn failing_proxy_returns_original_error() {
        let base = serve(upstream()).await;
        let mut cfg = Config::for_urls(&format!("{base}/down"), "");
        cfg.cors_proxy_url = Some(format!("{base}/proxy/"));
        let client = http_client(&cfg).unwrap();
        let err = fetch_giveaways(&client, &cfg).await.unwrap_err();
        assert!(matches!(err, AppError::Upstream(ref m) if m.contains("503")), "{err}");
    }

    #[tokio::test]
    async fn products_are_limited_and_truncated() {
        let base = serve(upstream()).await;
        let cfg = Config::for_urls("", &format!("{base}/products.json"));
        let client = http_client(&cfg).unwrap();
        let products = fetch_products(&client, &cfg).await.unwrap();
        assert_eq!(products.len(), PRODUCTS_LIMIT);
        assert_eq!(products[0].title, "Wireless Gaming Mous...");
        assert_eq!(products[1].title, "Pad");
        assert!((products[1].price - 9.99).abs() < 1e-9);
        assert_eq!(products[2].title, "c");
    }
}
