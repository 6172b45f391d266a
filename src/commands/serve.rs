use super::exit_with_error;
use crate::config::AppConfig;
use crate::server;

pub async fn run(host: Option<String>, port: Option<u16>) {
    let config = match AppConfig::from_env() {
        Ok(config) => config.with_bind(host, port),
        Err(e) => exit_with_error(e),
    };

    println!("🚀 Starting StockInsight server on {}", config.bind_address());
    println!("📈 Technical analysis window: {} of daily bars", config.analysis_period);
    println!("⏱️  Provider timeout: {}s", config.provider_timeout.as_secs());

    if let Err(e) = server::serve(config).await {
        exit_with_error(e);
    }
}
