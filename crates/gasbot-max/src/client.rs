//! HTTP client for the messaging platform, implementing the core `BotApi` port.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::debug;

use gasbot_core::{
    config::Config,
    domain::{BotIdentity, ChatId, UpdateBatch, UserId, UserProfile},
    errors::Error,
    messaging::{port::BotApi, types::Reply},
    Result,
};

use crate::wire::{NewMessageBody, SubscriptionBody, UpdatesResponse, UserInfo};

#[derive(Clone, Debug)]
pub struct MaxClient {
    base: String,
    token: String,
    request_timeout: Duration,
    http: reqwest::Client,
}

impl MaxClient {
    pub fn new(cfg: &Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| Error::External(format!("http client build failed: {e}")))?;
        Ok(Self {
            base: cfg.api_base.clone(),
            token: cfg.bot_token.clone(),
            request_timeout: cfg.request_timeout,
            http,
        })
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base, path);
        debug!(%method, %url, "api call");
        self.http
            .request(method, url)
            .header(reqwest::header::AUTHORIZATION, &self.token)
    }

    /// Send, mapping transport errors and non-2xx statuses.
    async fn send(&self, what: &str, req: reqwest::RequestBuilder) -> Result<reqwest::Response> {
        let resp = req
            .send()
            .await
            .map_err(|e| Error::External(format!("{what} request error: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::External(format!(
                "{what} failed: {status} {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(resp)
    }

    /// Send and decode a JSON response body.
    async fn call<T: DeserializeOwned>(&self, what: &str, req: reqwest::RequestBuilder) -> Result<T> {
        self.send(what, req)
            .await?
            .json::<T>()
            .await
            .map_err(|e| Error::External(format!("{what} json error: {e}")))
    }

    /// Send where only the status matters; the body may be empty or anything.
    async fn call_unit(&self, what: &str, req: reqwest::RequestBuilder) -> Result<()> {
        self.send(what, req).await.map(drop)
    }
}

#[async_trait]
impl BotApi for MaxClient {
    async fn get_bot_identity(&self) -> Result<BotIdentity> {
        let info: UserInfo = self.call("get me", self.request(Method::GET, "/me")).await?;
        Ok(info.into_identity())
    }

    async fn get_user(&self, user_id: UserId) -> Result<UserProfile> {
        let path = format!("/users/{}", user_id.0);
        let info: UserInfo = self.call("get user", self.request(Method::GET, &path)).await?;
        Ok(info.into_profile())
    }

    async fn send_message(&self, chat_id: ChatId, reply: &Reply) -> Result<()> {
        let req = self
            .request(Method::POST, "/messages")
            .query(&[("chat_id", chat_id.0)])
            .json(&NewMessageBody::from_reply(reply));
        self.call_unit("send message", req).await
    }

    async fn acknowledge_callback(&self, callback_id: &str) -> Result<()> {
        let req = self
            .request(Method::POST, "/answers")
            .query(&[("callback_id", callback_id)])
            .json(&serde_json::json!({}));
        self.call_unit("answer callback", req).await
    }

    async fn get_updates(
        &self,
        marker: Option<i64>,
        limit: u32,
        timeout_secs: u64,
    ) -> Result<UpdateBatch> {
        let mut req = self
            .request(Method::GET, "/updates")
            .query(&[("limit", u64::from(limit)), ("timeout", timeout_secs)])
            // The server holds the request for up to `timeout_secs`.
            .timeout(Duration::from_secs(timeout_secs).saturating_add(self.request_timeout));
        if let Some(m) = marker {
            req = req.query(&[("marker", m)]);
        }
        let resp: UpdatesResponse = self.call("get updates", req).await?;
        Ok(resp.into())
    }

    async fn subscribe_webhook(&self, url: &str) -> Result<()> {
        let req = self
            .request(Method::POST, "/subscriptions")
            .json(&SubscriptionBody { url });
        self.call_unit("subscribe", req).await
    }
}
