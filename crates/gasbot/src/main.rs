use std::sync::Arc;

use gasbot_core::config::Config;

#[tokio::main]
async fn main() -> Result<(), gasbot_core::Error> {
    gasbot_core::logging::init("gasbot")?;

    let cfg = Arc::new(Config::load()?);

    gasbot_max::runner::run(cfg)
        .await
        .map_err(|e| gasbot_core::Error::External(format!("bot failed: {e}")))?;

    Ok(())
}
