use crate::Result;

/// Initialize tracing for the bot process.
///
/// Default filter is `info` for our crates and `warn` for everything else;
/// `RUST_LOG` overrides it. Also routes panics through tracing so a panic in
/// one update handler shows up in the log instead of only on stderr.
pub fn init(service_name: &str) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "warn,gasbot=info,gasbot_core=info,gasbot_max=info,{}=info",
            service_name.replace('-', "_")
        ))
    });

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(true)
        .init();

    std::panic::set_hook(Box::new(|info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        tracing::error!(%location, "panic: {info}");
    }));

    Ok(())
}
