use std::{env, fs, io, net::IpAddr, path::Path, str::FromStr, time::Duration};

use crate::{errors::Error, Result};

pub const DEFAULT_API_BASE: &str = "https://platform-api.max.ru";
pub const DEFAULT_DISPLAY_NAME: &str = "Газпром межрегионгаз Самара";

/// Upper bound for the server-side long-poll hold.
pub const MAX_POLL_TIMEOUT_SECS: u64 = 3600;

/// How updates reach the bot. Exactly one transport runs per process.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportMode {
    Webhook,
    Polling,
}

impl TransportMode {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "webhook" => Some(Self::Webhook),
            "polling" | "poll" | "long-poll" | "longpoll" => Some(Self::Polling),
            _ => None,
        }
    }
}

/// Typed process configuration, built once at startup and shared as `Arc<Config>`.
#[derive(Clone, Debug)]
pub struct Config {
    // Platform
    pub bot_token: String,
    pub api_base: String,
    pub request_timeout: Duration,

    // Transport
    pub mode: TransportMode,
    pub bind_addr: IpAddr,
    pub port: u16,
    pub webhook_url: Option<String>,
    pub display_name: String,

    // Long polling
    pub poll_timeout: Duration,
    pub poll_limit: u32,
    pub poll_retry_delay: Duration,
}

impl Config {
    /// Load from `.env` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        load_dotenv_if_present(Path::new(".env"))?;
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).and_then(non_empty);

        let bot_token = get("MAX_BOT_TOKEN")
            .or_else(|| get("BOT_TOKEN"))
            .ok_or_else(|| {
                Error::Config(
                    "BOT_TOKEN (or MAX_BOT_TOKEN) environment variable is required".to_string(),
                )
            })?;

        let api_base = get("MAX_API_BASE")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        let mode = match get("BOT_MODE") {
            None => TransportMode::Webhook,
            Some(raw) => TransportMode::parse(&raw).ok_or_else(|| {
                Error::Config(format!(
                    "BOT_MODE must be `webhook` or `polling`, got `{raw}`"
                ))
            })?,
        };

        let bind_addr = parse_var(&get, "BIND_ADDR")?.unwrap_or(IpAddr::from([0, 0, 0, 0]));
        let port = parse_var::<u16>(&get, "PORT")?.unwrap_or(3000);

        let webhook_url = get("WEBHOOK_URL");
        let display_name = get("BOT_DISPLAY_NAME").unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        let request_timeout =
            Duration::from_millis(positive(&get, "REQUEST_TIMEOUT_MS")?.unwrap_or(10_000));
        let poll_timeout = Duration::from_secs(
            parse_var::<u64>(&get, "POLL_TIMEOUT_SECS")?
                .map(|v| v.min(MAX_POLL_TIMEOUT_SECS))
                .unwrap_or(30),
        );
        let poll_limit = parse_var::<u64>(&get, "POLL_LIMIT")?
            .map(|v| v.clamp(1, 1000) as u32)
            .unwrap_or(100);
        let poll_retry_delay =
            Duration::from_millis(positive(&get, "POLL_RETRY_DELAY_MS")?.unwrap_or(5_000));

        Ok(Self {
            bot_token,
            api_base,
            request_timeout,
            mode,
            bind_addr,
            port,
            webhook_url,
            display_name,
            poll_timeout,
            poll_limit,
            poll_retry_delay,
        })
    }
}

/// Apply `.env` entries that are not already set in the environment.
/// A missing file is fine; an unreadable one is an error.
fn load_dotenv_if_present(path: &Path) -> Result<()> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e.into()),
    };
    for (key, val) in parse_dotenv(&contents) {
        if env::var_os(&key).is_none() {
            env::set_var(key, val);
        }
    }
    Ok(())
}

/// `KEY=value` pairs, skipping blanks and `#` comments. Matching surrounding
/// quotes are stripped.
fn parse_dotenv(contents: &str) -> Vec<(String, String)> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| line.split_once('='))
        .filter_map(|(k, v)| {
            let key = k.trim();
            if key.is_empty() {
                return None;
            }
            let v = v.trim();
            let unquoted = ['"', '\'']
                .iter()
                .find_map(|q| v.strip_prefix(*q).and_then(|rest| rest.strip_suffix(*q)))
                .unwrap_or(v);
            Some((key.to_string(), unquoted.to_string()))
        })
        .collect()
}

/// `None` when unset; a value that does not parse is a config error.
fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| Error::Config(format!("invalid {key} `{raw}`: {e}")))
        })
        .transpose()
}

/// Like `parse_var`, but zero is rejected.
fn positive(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<u64>> {
    match parse_var::<u64>(get, key)? {
        Some(0) => Err(Error::Config(format!("{key} must be greater than zero"))),
        v => Ok(v),
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}
