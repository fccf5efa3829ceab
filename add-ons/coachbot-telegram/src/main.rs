//! coachbot daemon: Telegram long-polling front end over the encrypted user store.
//!
//! Settings come from `config/coachbot.toml` (or `COACHBOT_CONFIG`) and `COACHBOT__*`;
//! the three API secrets from the environment or a `.env` file.

use anyhow::Context;
use coachbot_core::{required_env, CoreConfig, LoadOutcome, UserStore, ENV_TELEGRAM_TOKEN};
use coachbot_skills::{CohereCoach, OuraClient};
use coachbot_telegram::{run_polling, BotHandlers, Dispatcher, TelegramClient};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[coachbot] .env not loaded: {} (using system environment)", e);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CoreConfig::load().context("load coachbot configuration")?;

    let store = UserStore::open(&config.data_path, &config.key_path)
        .context("open encrypted user store")?;
    if let LoadOutcome::Discarded { reason } = store.load_outcome() {
        tracing::warn!(target: "coachbot::bot", %reason, "starting with an empty dataset");
    }
    let store = Arc::new(store);

    let oura = OuraClient::from_env(config.oura_base_url.clone(), config.http_timeout())
        .context("initialise Oura client")?;
    let coach = CohereCoach::from_env(&config).context("initialise Cohere client")?;
    let telegram_token = required_env(ENV_TELEGRAM_TOKEN).context("start Telegram bot")?;

    let handlers = BotHandlers::new(
        store,
        Arc::new(oura),
        Arc::new(coach),
        config.oura_history_days,
    );
    let dispatcher = Dispatcher::new(handlers);
    let telegram = TelegramClient::new(
        &telegram_token,
        &config.telegram_api_base,
        config.http_timeout(),
    );

    tracing::info!(
        target: "coachbot::bot",
        data_path = %config.data_path.display(),
        model = %config.cohere_model,
        "coachbot started"
    );

    run_polling(
        &telegram,
        &dispatcher,
        Duration::from_secs(config.poll_timeout_secs),
        async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(target: "coachbot::bot", error = %e, "cannot listen for CTRL-C");
                std::future::pending::<()>().await;
            }
        },
    )
    .await;

    tracing::info!(target: "coachbot::bot", "coachbot stopped");
    Ok(())
}
