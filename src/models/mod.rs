mod company_directory;
mod news;
mod portfolio;
mod price_series;
mod risk;
mod signal;
mod timeframe;
mod trade_signal;
pub mod indicators;

pub use company_directory::CompanyDirectory;
pub use indicators::{IndicatorFrame, IndicatorRow};
pub use news::{mock_news, NewsArticle};
pub use portfolio::{PortfolioEntry, PortfolioLedger, PortfolioPosition};
pub use price_series::{PriceBar, PriceSeries};
pub use risk::{clamp_risk_reward, resolve_risk_reward, size_risk, RiskLevels};
pub use signal::{decide_signal, Signal};
pub use timeframe::{Period, Timeframe};
pub use trade_signal::{PriceSnapshot, TradeSignal};
