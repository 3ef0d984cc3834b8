//! Client configuration and transport layer.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client as HttpClient, Proxy};
use scenecraft_types::http::RetryOptions;

use crate::dispatch::{Backoff, TokioBackoff};
use crate::error::{Error, Result};
use crate::tiers::ModelTiers;

/// scenecraft 客户端。
///
/// 内部配置不可变，克隆成本为一次 `Arc` 计数。
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

pub(crate) struct ClientInner {
    pub http: HttpClient,
    pub config: ClientConfig,
    pub api_client: ApiClient,
    pub backoff: Arc<dyn Backoff>,
}

/// 客户端配置。
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// 已清洗的 API 密钥，以 `key` 查询参数发送。
    pub api_key: String,
    /// HTTP 配置。
    pub http_options: HttpOptions,
    /// 重试与回退参数。
    pub retry_options: RetryOptions,
    /// 场景分析的两档模型。
    pub analysis_models: ModelTiers,
    /// 图像合成的两档模型。
    pub synthesis_models: ModelTiers,
}

/// HTTP 配置。
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    pub timeout: Option<u64>,
    pub proxy: Option<String>,
    pub headers: HashMap<String, String>,
    pub base_url: Option<String>,
    pub api_version: Option<String>,
}

impl Client {
    /// 使用 API Key 创建客户端。
    ///
    /// # Errors
    /// 当密钥清洗后为空或构建 HTTP 客户端失败时返回错误。
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    /// 从环境变量创建客户端。
    ///
    /// # Errors
    /// 当环境变量缺失或构建客户端失败时返回错误。
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| Error::InvalidConfig {
                message: "GEMINI_API_KEY or GOOGLE_API_KEY not found".into(),
            })?;
        let mut builder = Self::builder().api_key(api_key);
        if let Ok(base_url) =
            std::env::var("GENAI_BASE_URL").or_else(|_| std::env::var("GEMINI_BASE_URL"))
        {
            if !base_url.trim().is_empty() {
                builder = builder.base_url(base_url);
            }
        }
        if let Ok(api_version) = std::env::var("GENAI_API_VERSION") {
            if !api_version.trim().is_empty() {
                builder = builder.api_version(api_version);
            }
        }
        builder.build()
    }

    /// 创建 Builder。
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// 访问请求分发器（重试 + 回退）。
    #[must_use]
    pub fn dispatcher(&self) -> crate::dispatch::Dispatcher {
        crate::dispatch::Dispatcher::new(self.inner.clone())
    }

    /// 访问场景分析 / 图像合成接口。
    #[must_use]
    pub fn studio(&self) -> crate::studio::Studio {
        crate::studio::Studio::new(self.inner.clone())
    }

    /// 访问模型目录。
    #[must_use]
    pub fn catalog(&self) -> crate::catalog::Catalog {
        crate::catalog::Catalog::new(self.inner.clone())
    }

    /// 当前配置。
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

/// 客户端 Builder。
#[derive(Default)]
pub struct ClientBuilder {
    api_key: Option<String>,
    http_options: HttpOptions,
    retry_options: Option<RetryOptions>,
    analysis_models: Option<ModelTiers>,
    synthesis_models: Option<ModelTiers>,
    backoff: Option<Arc<dyn Backoff>>,
}

impl ClientBuilder {
    /// 设置 API Key。
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// 设置请求超时（秒）。
    #[must_use]
    pub const fn timeout(mut self, secs: u64) -> Self {
        self.http_options.timeout = Some(secs);
        self
    }

    /// 设置代理。
    #[must_use]
    pub fn proxy(mut self, url: impl Into<String>) -> Self {
        self.http_options.proxy = Some(url.into());
        self
    }

    /// 增加默认 HTTP 头。
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.http_options.headers.insert(key.into(), value.into());
        self
    }

    /// 设置自定义基础 URL。
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.http_options.base_url = Some(base_url.into());
        self
    }

    /// 设置 API 版本。
    #[must_use]
    pub fn api_version(mut self, api_version: impl Into<String>) -> Self {
        self.http_options.api_version = Some(api_version.into());
        self
    }

    /// 设置重试参数。
    #[must_use]
    pub const fn retry_options(mut self, options: RetryOptions) -> Self {
        self.retry_options = Some(options);
        self
    }

    /// 设置场景分析的高级/标准模型。
    #[must_use]
    pub fn analysis_models(mut self, tiers: ModelTiers) -> Self {
        self.analysis_models = Some(tiers);
        self
    }

    /// 设置图像合成的高级/标准模型。
    #[must_use]
    pub fn synthesis_models(mut self, tiers: ModelTiers) -> Self {
        self.synthesis_models = Some(tiers);
        self
    }

    /// 替换退避等待实现。
    #[must_use]
    pub fn backoff(mut self, backoff: impl Backoff + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    /// 构建客户端。
    ///
    /// # Errors
    /// 当密钥缺失、模型名为空、参数无效或构建 HTTP 客户端失败时返回错误。
    pub fn build(self) -> Result<Client> {
        let Self {
            api_key,
            http_options,
            retry_options,
            analysis_models,
            synthesis_models,
            backoff,
        } = self;

        let api_key = sanitize_api_key(api_key.as_deref().unwrap_or_default());
        if api_key.is_empty() {
            return Err(Error::InvalidConfig {
                message: "API key required".into(),
            });
        }

        let retry_options = retry_options.unwrap_or_default();
        if retry_options.attempts == 0 {
            return Err(Error::InvalidConfig {
                message: "Retry attempts must be at least 1".into(),
            });
        }

        let analysis_models = analysis_models.unwrap_or_else(ModelTiers::analysis);
        let synthesis_models = synthesis_models.unwrap_or_else(ModelTiers::synthesis);
        for tiers in [&analysis_models, &synthesis_models] {
            if tiers.premium.trim().is_empty() || tiers.standard.trim().is_empty() {
                return Err(Error::InvalidConfig {
                    message: "Model identifiers must not be empty".into(),
                });
            }
        }

        let headers = Self::build_headers(&http_options)?;
        let http = Self::build_http_client(&http_options, headers)?;
        let config = ClientConfig {
            api_key,
            http_options,
            retry_options,
            analysis_models,
            synthesis_models,
        };
        let api_client = ApiClient::new(&config);

        Ok(Client {
            inner: Arc::new(ClientInner {
                http,
                config,
                api_client,
                backoff: backoff.unwrap_or_else(|| Arc::new(TokioBackoff)),
            }),
        })
    }

    fn build_headers(http_options: &HttpOptions) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (key, value) in &http_options.headers {
            let name =
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| Error::InvalidConfig {
                    message: format!("Invalid header name: {key}"),
                })?;
            let value = HeaderValue::from_str(value).map_err(|_| Error::InvalidConfig {
                message: format!("Invalid header value for {key}"),
            })?;
            headers.insert(name, value);
        }
        Ok(headers)
    }

    fn build_http_client(http_options: &HttpOptions, headers: HeaderMap) -> Result<HttpClient> {
        let mut http_builder = HttpClient::builder();
        if let Some(timeout) = http_options.timeout {
            http_builder = http_builder.timeout(Duration::from_secs(timeout));
        }

        if let Some(proxy_url) = &http_options.proxy {
            let proxy = Proxy::all(proxy_url).map_err(|e| Error::InvalidConfig {
                message: format!("Invalid proxy: {e}"),
            })?;
            http_builder = http_builder.proxy(proxy);
        }

        if !headers.is_empty() {
            http_builder = http_builder.default_headers(headers);
        }

        Ok(http_builder.build()?)
    }
}

/// 清洗 API Key：去掉首尾空白以及 `[A-Za-z0-9_-]` 之外的字符。
///
/// 复制粘贴时混入的引号、零宽字符、换行都会被移除。
#[must_use]
pub fn sanitize_api_key(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

pub(crate) struct ApiClient {
    pub base_url: String,
    pub api_version: String,
}

impl ApiClient {
    /// 创建 API 客户端配置。
    pub fn new(config: &ClientConfig) -> Self {
        let base_url = config.http_options.base_url.as_deref().map_or_else(
            || "https://generativelanguage.googleapis.com/".to_string(),
            normalize_base_url,
        );
        let api_version = config
            .http_options
            .api_version
            .clone()
            .unwrap_or_else(|| "v1beta".to_string());

        Self {
            base_url,
            api_version,
        }
    }
}

fn normalize_base_url(base_url: &str) -> String {
    let mut value = base_url.trim().to_string();
    if !value.ends_with('/') {
        value.push('/');
    }
    value
}
