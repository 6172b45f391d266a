//! In-memory portfolio ledger
//!
//! The ledger lives in the server state and is shared across requests behind
//! an async `RwLock`. Entries are only ever added to or averaged; there is no
//! sell path.

use crate::error::{AppError, Result};
use crate::utils::round2;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// One holding as recorded by the ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioEntry {
    pub symbol: String,
    pub quantity: f64,
    pub weighted_avg_buy_price: f64,
    /// Time of the first add; later adds keep it
    pub added_at: DateTime<Utc>,
}

impl PortfolioEntry {
    pub fn cost_basis(&self) -> f64 {
        self.quantity * self.weighted_avg_buy_price
    }

    /// Fold another purchase into this entry using a quantity-weighted average price
    fn absorb(&mut self, quantity: f64, price: f64) {
        let total_quantity = self.quantity + quantity;
        self.weighted_avg_buy_price =
            (self.quantity * self.weighted_avg_buy_price + quantity * price) / total_quantity;
        self.quantity = total_quantity;
    }
}

/// A ledger entry valued at a freshly fetched price
///
/// Valuation fields stay `None` when no price could be fetched for the symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioPosition {
    #[serde(flatten)]
    pub entry: PortfolioEntry,
    pub current_price: Option<f64>,
    pub market_value: Option<f64>,
    pub unrealized_pnl: Option<f64>,
    pub unrealized_pnl_percent: Option<f64>,
}

impl PortfolioPosition {
    pub fn value(entry: PortfolioEntry, current_price: Option<f64>) -> Self {
        let current_price = current_price.filter(|p| p.is_finite());
        let market_value = current_price.map(|p| round2(p * entry.quantity));
        let cost = entry.cost_basis();
        let unrealized_pnl = market_value.map(|mv| round2(mv - cost));
        let unrealized_pnl_percent = unrealized_pnl
            .filter(|_| cost > 0.0)
            .map(|pnl| round2(pnl / cost * 100.0));

        Self {
            entry,
            current_price,
            market_value,
            unrealized_pnl,
            unrealized_pnl_percent,
        }
    }
}

/// Process-wide portfolio, keyed by symbol
#[derive(Debug, Clone, Default)]
pub struct PortfolioLedger {
    entries: Arc<RwLock<BTreeMap<String, PortfolioEntry>>>,
}

impl PortfolioLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a purchase, creating or averaging the entry for `symbol`
    ///
    /// The whole read-modify-write runs under one write guard, so concurrent
    /// adds to the same symbol never lose an update.
    pub async fn add(&self, symbol: &str, quantity: f64, price: f64) -> Result<PortfolioEntry> {
        self.add_at(symbol, quantity, price, Utc::now()).await
    }

    pub async fn add_at(
        &self,
        symbol: &str,
        quantity: f64,
        price: f64,
        now: DateTime<Utc>,
    ) -> Result<PortfolioEntry> {
        if symbol.trim().is_empty() {
            return Err(AppError::InvalidInput("ticker must not be empty".to_string()));
        }
        if !quantity.is_finite() || quantity <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "quantity must be greater than zero, got {}",
                quantity
            )));
        }
        if !price.is_finite() || price <= 0.0 {
            return Err(AppError::InvalidInput(format!(
                "price must be a positive number, got {}",
                price
            )));
        }

        let mut entries = self.entries.write().await;
        let entry = entries
            .entry(symbol.to_string())
            .and_modify(|e| e.absorb(quantity, price))
            .or_insert_with(|| PortfolioEntry {
                symbol: symbol.to_string(),
                quantity,
                weighted_avg_buy_price: price,
                added_at: now,
            });

        Ok(entry.clone())
    }

    pub async fn get(&self, symbol: &str) -> Option<PortfolioEntry> {
        self.entries.read().await.get(symbol).cloned()
    }

    /// Snapshot of all entries, ordered by symbol
    pub async fn entries(&self) -> Vec<PortfolioEntry> {
        self.entries.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
