use std::{net::SocketAddr, sync::Arc};

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use gasbot_core::{
    config::{Config, TransportMode},
    dispatcher::Dispatcher,
    messaging::port::BotApi,
    polling::{run_polling, PollSettings},
};

use crate::{
    webhook::{self, WebhookState},
    MaxClient,
};

/// Start the bot in the configured transport mode and run until SIGINT/SIGTERM.
pub async fn run(cfg: Arc<Config>) -> anyhow::Result<()> {
    let api: Arc<dyn BotApi> = Arc::new(MaxClient::new(&cfg)?);

    // Startup identity is informational only.
    match api.get_bot_identity().await {
        Ok(me) => info!(
            id = me.id,
            name = %me.display_name,
            username = me.username.as_deref().unwrap_or("-"),
            "bot started"
        ),
        Err(e) => warn!(error = %e, "could not fetch bot identity"),
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_signals(shutdown.clone()));

    let dispatcher = Dispatcher::new(api.clone());
    match cfg.mode {
        TransportMode::Webhook => {
            if let Some(url) = &cfg.webhook_url {
                match api.subscribe_webhook(url).await {
                    Ok(()) => info!(%url, "webhook subscription registered"),
                    Err(e) => warn!(error = %e, %url, "webhook subscription failed"),
                }
            }
            let addr = SocketAddr::new(cfg.bind_addr, cfg.port);
            let listener = TcpListener::bind(addr).await?;
            let state = WebhookState {
                cfg: cfg.clone(),
                dispatcher,
            };
            webhook::serve(listener, state, shutdown).await?;
        }
        TransportMode::Polling => {
            // Webhook delivery and long polling are exclusive on the platform side.
            if cfg.webhook_url.is_some() {
                warn!("WEBHOOK_URL is ignored in polling mode");
            }
            run_polling(api, dispatcher, PollSettings::from_config(&cfg), shutdown).await;
        }
    }

    info!("shutdown complete");
    Ok(())
}

async fn watch_signals(shutdown: CancellationToken) {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("SIGINT received"),
                    _ = term.recv() => info!("SIGTERM received"),
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable");
                let _ = tokio::signal::ctrl_c().await;
                info!("SIGINT received");
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        info!("interrupt received");
    }
    shutdown.cancel();
}
