pub mod api;

use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{CompanyDirectory, PortfolioLedger};
use crate::services::{AlphaVantageNewsClient, NewsProvider, TechnicalAnalyzer, YahooChartClient};
use axum::{
    extract::FromRef,
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub analyzer: TechnicalAnalyzer,
    pub news: Arc<dyn NewsProvider>,
    pub ledger: PortfolioLedger,
    pub directory: Arc<CompanyDirectory>,
}

impl AppState {
    /// Wire the production providers from configuration
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = Arc::new(YahooChartClient::new(config)?);
        let news = Arc::new(AlphaVantageNewsClient::new(config)?);

        Ok(Self {
            analyzer: TechnicalAnalyzer::new(fetcher, config.analysis_period),
            news,
            ledger: PortfolioLedger::new(),
            directory: Arc::new(CompanyDirectory::new()),
        })
    }
}

// FromRef implementations to extract specific state components
impl FromRef<AppState> for TechnicalAnalyzer {
    fn from_ref(app_state: &AppState) -> TechnicalAnalyzer {
        app_state.analyzer.clone()
    }
}

impl FromRef<AppState> for PortfolioLedger {
    fn from_ref(app_state: &AppState) -> PortfolioLedger {
        app_state.ledger.clone()
    }
}

/// Build the CORS layer for the configured origins, skipping any that do not parse
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    if allowed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(allowed)
    }
}

/// Build the API router
pub fn router(app_state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/health", get(api::health_handler))
        .route("/api/technical-analysis", post(api::technical_analysis_handler))
        .route("/api/price-analysis", post(api::price_analysis_handler))
        .route("/api/news", get(api::news_handler))
        .route("/api/news-analysis", post(api::news_analysis_handler))
        .route("/api/portfolio", get(api::portfolio_handler))
        .route("/api/portfolio/add-stock", post(api::add_stock_handler))
        .route("/api/portfolio/get-price/{ticker}", get(api::get_price_handler))
        .layer(cors)
        .with_state(app_state)
}

/// Start the axum server
pub async fn serve(config: AppConfig) -> Result<()> {
    tracing::info!("Starting StockInsight server");

    let app_state = AppState::from_config(&config)?;
    let cors = cors_layer(&config.cors_origins);

    tracing::info!("Registering routes:");
    tracing::info!("  GET  /api/health");
    tracing::info!("  POST /api/technical-analysis");
    tracing::info!("  POST /api/price-analysis");
    tracing::info!("  GET  /api/news?symbol=TSLA");
    tracing::info!("  POST /api/news-analysis");
    tracing::info!("  GET  /api/portfolio");
    tracing::info!("  POST /api/portfolio/add-stock");
    tracing::info!("  GET  /api/portfolio/get-price/{{ticker}}");

    let app = router(app_state, cors);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tracing::info!(%addr, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
