use clap::{Parser, Subcommand};

use crate::commands;

#[derive(Parser)]
#[command(name = "stockinsight")]
#[command(about = "StockInsight stock analysis API and CLI", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server
    Serve {
        /// Address to bind (overrides HOST)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Run technical analysis for a symbol and print the signal as JSON
    Analyze {
        /// Ticker symbol, e.g. AAPL
        symbol: String,
        /// Risk/reward ratio, clamped to 1.5..=5.0 (default 2.5)
        #[arg(short, long)]
        risk_reward: Option<f64>,
    },
    /// Print the one-month price snapshot for a symbol as JSON
    Price {
        /// Ticker symbol, e.g. TSLA
        symbol: String,
    },
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { host, port } => {
            commands::serve::run(host, port).await;
        }
        Commands::Analyze { symbol, risk_reward } => {
            commands::analyze::run(&symbol, risk_reward).await;
        }
        Commands::Price { symbol } => {
            commands::price::run(&symbol).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve_flags() {
        let cli = Cli::try_parse_from(["stockinsight", "serve", "--host", "127.0.0.1", "-p", "8080"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host.as_deref(), Some("127.0.0.1"));
                assert_eq!(port, Some(8080));
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from(["stockinsight", "analyze", "AAPL", "--risk-reward", "3"]).unwrap();
        match cli.command {
            Commands::Analyze { symbol, risk_reward } => {
                assert_eq!(symbol, "AAPL");
                assert_eq!(risk_reward, Some(3.0));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_analyze_requires_symbol() {
        assert!(Cli::try_parse_from(["stockinsight", "analyze"]).is_err());
    }
}
