//! News provider
//!
//! News is best effort: [`fetch_news_with_fallback`] never fails. It tries the
//! ticker, retries once with the company name, and finally serves mock
//! articles so the UI always has something to render.

use crate::config::AppConfig;
use crate::constants::NEWS_LIMIT;
use crate::error::{AppError, Result};
use crate::models::{mock_news, NewsArticle};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Source of news headlines for a ticker or company name
#[async_trait]
pub trait NewsProvider: Send + Sync {
    async fn fetch_news(&self, term: &str) -> Result<Vec<NewsArticle>>;
}

/// Alpha Vantage NEWS_SENTIMENT response
///
/// Throttled or rejected calls still answer 200 with an `Information` or
/// `Note` message instead of a feed.
#[derive(Debug, Deserialize)]
struct NewsSentimentResponse {
    #[serde(default)]
    feed: Option<Vec<FeedItem>>,
    #[serde(rename = "Information", default)]
    information: Option<String>,
    #[serde(rename = "Note", default)]
    note: Option<String>,
    #[serde(rename = "Error Message", default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FeedItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    url: String,
}

/// Alpha Vantage news client
#[derive(Debug, Clone)]
pub struct AlphaVantageNewsClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageNewsClient {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .map_err(|e| AppError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.alpha_vantage_base_url.trim_end_matches('/').to_string(),
            api_key: config.alpha_vantage_api_key.clone(),
        })
    }
}

#[async_trait]
impl NewsProvider for AlphaVantageNewsClient {
    async fn fetch_news(&self, term: &str) -> Result<Vec<NewsArticle>> {
        let url = format!("{}/query", self.base_url);
        debug!(term, "Fetching news");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("function", "NEWS_SENTIMENT"),
                ("tickers", term),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(AppError::RateLimit);
        }
        if !status.is_success() {
            return Err(AppError::Provider(format!(
                "news request for {} failed with HTTP {}",
                term, status
            )));
        }

        let body = response.text().await?;
        let parsed: NewsSentimentResponse = serde_json::from_str(&body)
            .map_err(|e| AppError::Provider(format!("unexpected news response: {}", e)))?;

        parse_news_response(parsed)
    }
}

fn parse_news_response(resp: NewsSentimentResponse) -> Result<Vec<NewsArticle>> {
    if let Some(feed) = resp.feed {
        return Ok(feed
            .into_iter()
            .take(NEWS_LIMIT)
            .map(|item| NewsArticle::new(item.title, item.summary, item.url))
            .collect());
    }

    let notice = resp.note.or(resp.information).or(resp.error_message);
    match notice {
        Some(msg) if is_throttle_notice(&msg) => Err(AppError::RateLimit),
        Some(msg) => Err(AppError::Provider(msg)),
        None => Ok(Vec::new()),
    }
}

fn is_throttle_notice(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("rate limit") || lower.contains("call frequency")
}

/// Fetch up to 5 articles for `symbol`, never failing
///
/// On a provider error or an empty feed the request is retried once with
/// `alternate_term` (typically the company name). Rate limits skip the retry.
/// Whatever still fails is replaced with mock articles.
pub async fn fetch_news_with_fallback(
    provider: &dyn NewsProvider,
    symbol: &str,
    alternate_term: Option<&str>,
) -> Vec<NewsArticle> {
    match provider.fetch_news(symbol).await {
        Ok(articles) if !articles.is_empty() => {
            info!(symbol, count = articles.len(), "Fetched news");
            return truncate(articles);
        }
        Ok(_) => debug!(symbol, "News feed empty"),
        Err(AppError::RateLimit) => {
            warn!(symbol, "News provider rate limited, serving mock news");
            return mock_news();
        }
        Err(e) => warn!(symbol, error = %e, "News fetch failed"),
    }

    let retry_term = alternate_term
        .map(str::trim)
        .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case(symbol));

    if let Some(term) = retry_term {
        match provider.fetch_news(term).await {
            Ok(articles) if !articles.is_empty() => {
                info!(symbol, term, count = articles.len(), "Fetched news with alternate term");
                return truncate(articles);
            }
            Ok(_) => debug!(symbol, term, "Alternate news feed empty"),
            Err(e) => warn!(symbol, term, error = %e, "Alternate news fetch failed"),
        }
    }

    info!(symbol, "Serving mock news");
    mock_news()
}

fn truncate(mut articles: Vec<NewsArticle>) -> Vec<NewsArticle> {
    articles.truncate(NEWS_LIMIT);
    articles
}
