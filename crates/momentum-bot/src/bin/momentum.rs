//! Momentum bot entry point

use std::sync::Arc;

use momentum_store::Store;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use momentum_bot::bot::runner::BotRunner;
use momentum_bot::bot::Orchestrator;
use momentum_bot::config::BotConfig;
use momentum_bot::insight::replicate::ReplicateClient;
use momentum_bot::market::MomentumMarketData;
use momentum_bot::market::fundamentals::FundamentalsClient;
use momentum_bot::market::news::NewsClient;
use momentum_bot::market::yahoo::YahooClient;
use momentum_bot::telegram::TelegramApi;

const DB_CONNECT_ATTEMPTS: u32 = 5;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = BotConfig::from_env()?;

    let store = Store::connect_with_retry(&config.store, DB_CONNECT_ATTEMPTS).await?;
    store.run_migrations().await?;
    info!("store connected and migrated");

    let fundamentals = config
        .alpha_vantage_api_key
        .as_ref()
        .map(|key| FundamentalsClient::new(key.clone(), config.request_timeout));
    if fundamentals.is_none() {
        info!("ALPHA_VANTAGE_API_KEY not set, fundamentals disabled");
    }
    let news = config
        .finnhub_api_key
        .as_ref()
        .map(|key| NewsClient::new(key.clone(), config.request_timeout));
    if news.is_none() {
        info!("FINNHUB_API_KEY not set, news disabled");
    }

    let market = MomentumMarketData::new(YahooClient::new(), fundamentals, news);
    let insight = ReplicateClient::new(
        config.replicate_token.clone(),
        config.replicate_model.clone(),
        config.request_timeout,
        config.generation_timeout,
    );

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(store.clone()),
        Arc::new(market),
        Arc::new(insight),
    ));
    let api = TelegramApi::new(config.telegram_token.clone(), config.poll_timeout);
    let runner = BotRunner::new(api, orchestrator, config.poll_timeout);

    tokio::select! {
        () = runner.run() => {
            error!("polling loop exited unexpectedly");
        }
        result = tokio::signal::ctrl_c() => {
            match result {
                Ok(()) => info!("shutdown signal received"),
                Err(err) => error!(%err, "failed to listen for shutdown signal"),
            }
        }
    }

    store.close().await;
    info!("bot stopped");
    Ok(())
}
