pub mod analysis;
pub mod api_logging;
pub mod market_data;
pub mod news;

pub use analysis::{run_pipeline, summarize_prices, TechnicalAnalyzer};
pub use api_logging::{ApiStatus, RequestMetrics};
pub use market_data::{SeriesFetcher, YahooChartClient};
pub use news::{fetch_news_with_fallback, AlphaVantageNewsClient, NewsProvider};
