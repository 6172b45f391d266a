use crate::constants::DEFAULT_NEWS_SYMBOL;
use crate::error::{AppError, Result};
use crate::models::{PortfolioEntry, PortfolioPosition};
use crate::server::AppState;
use crate::services::{fetch_news_with_fallback, RequestMetrics};
use crate::utils::{format_timestamp, normalize_symbol, round2};
use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument, warn};

#[derive(Debug, Deserialize)]
pub struct TechnicalAnalysisRequest {
    #[serde(default)]
    pub stock_symbol: String,
    pub risk_reward_ratio: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PriceAnalysisRequest {
    #[serde(default)]
    pub stock_symbol: String,
}

#[derive(Debug, Deserialize)]
pub struct NewsQuery {
    pub symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsAnalysisRequest {
    #[serde(default)]
    pub company_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AddStockRequest {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub quantity: f64,
}

#[derive(Debug, Serialize)]
pub struct AddStockResponse {
    pub success: bool,
    pub ticker: String,
    pub price: f64,
    pub quantity: f64,
    pub total_cost: f64,
    pub position: PortfolioEntry,
}

#[derive(Debug, Serialize)]
pub struct PortfolioResponse {
    pub positions: Vec<PortfolioPosition>,
    pub total_cost_basis: f64,
    pub total_market_value: f64,
    pub total_unrealized_pnl: f64,
    pub generated_at: String,
}

/// Turn a handler result into a response and emit the request summary line
fn respond<T: Serialize>(mut metrics: RequestMetrics, result: Result<T>) -> Response {
    let response = match result {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(e) => {
            metrics.fail(e.status_code().as_u16(), e.to_string());
            e.into_response()
        }
    };
    metrics.finish();
    response
}

/// Health check
#[instrument]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "message": "StockInsight Pro API is running"
        })),
    )
}

/// MACD crossover signal with ATR-based stop-loss and target
#[instrument(skip(app_state))]
pub async fn technical_analysis_handler(
    State(app_state): State<AppState>,
    Json(request): Json<TechnicalAnalysisRequest>,
) -> impl IntoResponse {
    let metrics = RequestMetrics::start("/api/technical-analysis")
        .with_symbol(normalize_symbol(&request.stock_symbol));

    let result = app_state
        .analyzer
        .analyze(&request.stock_symbol, request.risk_reward_ratio)
        .await;

    respond(metrics, result)
}

/// Latest price, day-over-day change and volatility over one month
#[instrument(skip(app_state))]
pub async fn price_analysis_handler(
    State(app_state): State<AppState>,
    Json(request): Json<PriceAnalysisRequest>,
) -> impl IntoResponse {
    let metrics = RequestMetrics::start("/api/price-analysis")
        .with_symbol(normalize_symbol(&request.stock_symbol));

    let result = app_state.analyzer.price_snapshot(&request.stock_symbol).await;

    respond(metrics, result)
}

/// News feed for a symbol (defaults to TSLA); always succeeds
#[instrument(skip(app_state))]
pub async fn news_handler(
    State(app_state): State<AppState>,
    Query(query): Query<NewsQuery>,
) -> impl IntoResponse {
    let symbol = query
        .symbol
        .map(|s| normalize_symbol(&s))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_NEWS_SYMBOL.to_string());
    let metrics = RequestMetrics::start("/api/news").with_symbol(symbol.clone());

    let company = app_state.directory.company_name(&symbol);
    let news = fetch_news_with_fallback(app_state.news.as_ref(), &symbol, company).await;

    respond(metrics, Ok(json!({ "news": news })))
}

/// Price snapshot plus news for a company name
#[instrument(skip(app_state))]
pub async fn news_analysis_handler(
    State(app_state): State<AppState>,
    Json(request): Json<NewsAnalysisRequest>,
) -> impl IntoResponse {
    let company_name = request.company_name.trim().to_string();
    let mut metrics = RequestMetrics::start("/api/news-analysis");

    if company_name.is_empty() {
        return respond::<()>(
            metrics,
            Err(AppError::InvalidInput("Company name is required".to_string())),
        );
    }

    let symbol = app_state.directory.resolve(&company_name);
    metrics = metrics.with_symbol(symbol.clone());

    let snapshot = match app_state.analyzer.price_snapshot(&symbol).await {
        Ok(snapshot) => snapshot,
        // names outside the directory resolve to their uppercased text, which may not be a ticker
        Err(AppError::NotFound(_) | AppError::InvalidInput(_)) => {
            let err = AppError::NotFound(format!(
                "No data found for '{}'. Check the company name or try again later!",
                symbol
            ));
            return respond::<()>(metrics, Err(err));
        }
        Err(e) => return respond::<()>(metrics, Err(e)),
    };

    let news =
        fetch_news_with_fallback(app_state.news.as_ref(), &symbol, Some(&company_name)).await;

    respond(
        metrics,
        Ok(json!({
            "stock_name": company_name,
            "stock_symbol": snapshot.stock_symbol,
            "current_price": snapshot.current_price,
            "change_percent": snapshot.change_percent,
            "volatility": snapshot.volatility,
            "news": news,
            "timestamp": snapshot.timestamp,
        })),
    )
}

/// Buy `quantity` shares at the latest price and record them in the ledger
#[instrument(skip(app_state))]
pub async fn add_stock_handler(
    State(app_state): State<AppState>,
    Json(request): Json<AddStockRequest>,
) -> impl IntoResponse {
    let ticker = normalize_symbol(&request.ticker);
    let metrics = RequestMetrics::start("/api/portfolio/add-stock").with_symbol(ticker.clone());

    let result = add_stock(&app_state, ticker, request.quantity).await;
    respond(metrics, result)
}

async fn add_stock(app_state: &AppState, ticker: String, quantity: f64) -> Result<AddStockResponse> {
    if ticker.is_empty() || !quantity.is_finite() || quantity <= 0.0 {
        return Err(AppError::InvalidInput(
            "Valid ticker and quantity required".to_string(),
        ));
    }

    let price = match app_state.analyzer.latest_price(&ticker).await {
        Ok(price) => price,
        Err(AppError::NotFound(_)) => {
            return Err(AppError::NotFound(
                "Invalid ticker symbol or unable to fetch price".to_string(),
            ))
        }
        Err(e) => return Err(e),
    };

    let position = app_state.ledger.add(&ticker, quantity, price).await?;
    info!(
        ticker = %ticker,
        quantity,
        price,
        total_quantity = position.quantity,
        "Added stock to portfolio"
    );

    Ok(AddStockResponse {
        success: true,
        ticker,
        price,
        quantity,
        total_cost: round2(price * quantity),
        position,
    })
}

/// Latest price for a ticker
#[instrument(skip(app_state))]
pub async fn get_price_handler(
    State(app_state): State<AppState>,
    Path(ticker): Path<String>,
) -> impl IntoResponse {
    let ticker = normalize_symbol(&ticker);
    let metrics = RequestMetrics::start("/api/portfolio/get-price").with_symbol(ticker.clone());

    let result = app_state
        .analyzer
        .latest_price(&ticker)
        .await
        .map(|price| json!({ "ticker": ticker, "price": price }));

    respond(metrics, result)
}

/// Ledger valued at current prices
///
/// Symbols whose price cannot be fetched are listed without valuation and
/// left out of the market value and P&L totals.
#[instrument(skip(app_state))]
pub async fn portfolio_handler(State(app_state): State<AppState>) -> impl IntoResponse {
    let metrics = RequestMetrics::start("/api/portfolio");

    let entries = app_state.ledger.entries().await;
    let mut positions = Vec::with_capacity(entries.len());

    for entry in entries {
        let price = match app_state.analyzer.latest_price(&entry.symbol).await {
            Ok(price) => Some(price),
            Err(e) => {
                warn!(symbol = %entry.symbol, error = %e, "Could not price position");
                None
            }
        };
        positions.push(PortfolioPosition::value(entry, price));
    }

    let total_cost_basis = round2(positions.iter().map(|p| p.entry.cost_basis()).sum());
    let total_market_value = round2(positions.iter().filter_map(|p| p.market_value).sum());
    let total_unrealized_pnl = round2(positions.iter().filter_map(|p| p.unrealized_pnl).sum());

    let response = PortfolioResponse {
        positions,
        total_cost_basis,
        total_market_value,
        total_unrealized_pnl,
        generated_at: format_timestamp(&Utc::now()),
    };

    respond(metrics, Ok(response))
}
