//! Request dispatcher: one `generateContent` call with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use reqwest::header::CONTENT_TYPE;
use scenecraft_types::http::HttpResponse;
use scenecraft_types::models::GenerateContentRequest;
use tracing::{debug, warn};

use crate::client::ClientInner;
use crate::error::{Error, Result};
use crate::http_response::read_http_response;
use crate::tiers::bare_model_name;

/// 重试之间的等待实现。
pub trait Backoff: Send + Sync {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()>;
}

/// 基于 `tokio::time::sleep` 的默认实现。
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioBackoff;

impl Backoff for TokioBackoff {
    fn sleep(&self, delay: Duration) -> BoxFuture<'_, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

/// 单次尝试结果的分类。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// 200，立即返回。
    Success,
    /// 429 以外的 4xx，立即返回，由调用方检查响应体。
    ClientError,
    /// 429、5xx 及其它状态，等待后重试。
    Retryable,
}

impl AttemptOutcome {
    #[must_use]
    pub const fn classify(status: u16) -> Self {
        match status {
            200 => Self::Success,
            429 => Self::Retryable,
            400..=499 => Self::ClientError,
            _ => Self::Retryable,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(self, Self::Retryable)
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    pub(crate) inner: Arc<ClientInner>,
}

impl Dispatcher {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 发送一次 `generateContent` 请求，可重试失败最多尝试 `RetryOptions::attempts` 次。
    ///
    /// 每次可重试失败（包括最后一次）之后都会按 `initial_delay * exp_base^n` 等待。
    /// 重试耗尽时返回最后一个失败响应；若最后一次是传输错误则返回 [`Error::Network`]。
    ///
    /// # Errors
    /// 模型名为空、请求没有任何 part、序列化失败或最终传输失败时返回错误。
    pub async fn dispatch(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<HttpResponse> {
        let model = bare_model_name(model);
        if model.is_empty() {
            return Err(Error::InvalidRequest {
                message: "model identifier must not be empty".into(),
            });
        }
        if request.part_count() == 0 {
            return Err(Error::InvalidRequest {
                message: "request must contain at least one content part".into(),
            });
        }

        let url = build_model_method_url(&self.inner, model, "generateContent");
        let body = serde_json::to_vec(request)?;
        let retry = self.inner.config.retry_options;
        let attempts = retry.attempts.max(1);

        let mut last = None;
        for attempt in 0..attempts {
            debug!(model, attempt = attempt + 1, attempts, "sending generateContent");
            match self.send_once(&url, &body).await {
                Ok(response) if !AttemptOutcome::classify(response.status).is_retryable() => {
                    debug!(model, status = response.status, "generateContent returned");
                    return Ok(response);
                }
                Ok(response) => {
                    warn!(
                        model,
                        attempt = attempt + 1,
                        status = response.status,
                        "retryable status from generateContent"
                    );
                    last = Some(Ok(response));
                }
                Err(err) => {
                    let err = err.without_url();
                    warn!(model, attempt = attempt + 1, error = %err, "transport error");
                    last = Some(Err(err));
                }
            }
            self.inner.backoff.sleep(retry.delay_for(attempt)).await;
        }

        match last {
            Some(Ok(response)) => Ok(response),
            Some(Err(source)) => Err(Error::Network { attempts, source }),
            None => Err(Error::InvalidConfig {
                message: "Retry attempts must be at least 1".into(),
            }),
        }
    }

    async fn send_once(
        &self,
        url: &str,
        body: &[u8],
    ) -> std::result::Result<HttpResponse, reqwest::Error> {
        let response = self
            .inner
            .http
            .post(url)
            .query(&[("key", self.inner.config.api_key.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_vec())
            .send()
            .await?;
        read_http_response(response).await
    }
}

pub(crate) fn build_model_method_url(inner: &ClientInner, model: &str, method: &str) -> String {
    let base = &inner.api_client.base_url;
    let version = &inner.api_client.api_version;
    let model = bare_model_name(model);
    format!("{base}{version}/models/{model}:{method}")
}
