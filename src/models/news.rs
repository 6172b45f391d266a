use serde::{Deserialize, Serialize};

/// One news headline as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub description: String,
    pub url: String,
}

impl NewsArticle {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            url: url.into(),
        }
    }
}

/// Placeholder articles served when no provider can deliver news
pub fn mock_news() -> Vec<NewsArticle> {
    vec![
        NewsArticle::new("Mock News 1", "Sample news about a stock.", "http://example.com"),
        NewsArticle::new("Mock News 2", "Another sample news.", "http://example.com"),
    ]
}
