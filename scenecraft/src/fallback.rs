//! One-hop premium → standard fallback shared by analysis and synthesis.

use scenecraft_types::http::HttpResponse;
use scenecraft_types::models::GenerateContentRequest;
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::tiers::ModelTiers;

impl Dispatcher {
    /// 分发请求并用 `classify` 解释响应；高级模型失败时切换到标准模型再分发一次。
    ///
    /// 状态机：`requested → (成功 | standard → (成功 | 失败))`，最多一跳，不会回切。
    /// 只有 [`crate::Error::permits_fallback`] 为真的错误才会触发切换。
    ///
    /// # Errors
    /// 返回最后一次分发（回退后即标准模型）的错误。
    pub async fn dispatch_with_fallback<T, C>(
        &self,
        tiers: &ModelTiers,
        requested: &str,
        request: &GenerateContentRequest,
        classify: C,
    ) -> Result<T>
    where
        C: Fn(&str, HttpResponse) -> Result<T>,
    {
        let err = match self.dispatch_classified(requested, request, &classify).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        let Some(standard) = tiers.fallback_for(requested) else {
            return Err(err);
        };
        if !err.permits_fallback() {
            return Err(err);
        }

        warn!(from = requested, to = standard, error = %err, "falling back to standard model");
        self.inner
            .backoff
            .sleep(self.inner.config.retry_options.fallback_pause)
            .await;

        let result = self.dispatch_classified(standard, request, &classify).await;
        if result.is_ok() {
            info!(model = standard, "standard model answered after fallback");
        }
        result
    }

    async fn dispatch_classified<T, C>(
        &self,
        model: &str,
        request: &GenerateContentRequest,
        classify: &C,
    ) -> Result<T>
    where
        C: Fn(&str, HttpResponse) -> Result<T>,
    {
        let response = self.dispatch(model, request).await?;
        classify(model, response)
    }
}
