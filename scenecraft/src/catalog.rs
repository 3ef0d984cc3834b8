//! Model catalog: which models can serve analysis and synthesis.

use std::sync::Arc;

use scenecraft_types::models::{ListModelsResponse, Model};

use crate::client::ClientInner;
use crate::error::{Error, Result};
use crate::http_response::read_http_response;
use crate::tiers::bare_model_name;

/// 可供选择的模型列表（已去掉 `models/` 前缀，按名称降序）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    pub analysis: Vec<String>,
    pub synthesis: Vec<String>,
}

#[derive(Clone)]
pub struct Catalog {
    pub(crate) inner: Arc<ClientInner>,
}

impl Catalog {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 列出支持 `generateContent` 的模型并按用途分类。
    ///
    /// 标准档模型若不在列表中会被追加到末尾。该调用不重试。
    ///
    /// # Errors
    /// 网络错误、非 200 状态或响应无法解析时返回错误。
    pub async fn list(&self) -> Result<ModelCatalog> {
        let models = self.list_all_models().await?;
        let config = &self.inner.config;
        Ok(classify_models(
            &models,
            &config.analysis_models.standard,
            &config.synthesis_models.standard,
        ))
    }

    async fn list_all_models(&self) -> Result<Vec<Model>> {
        let url = format!(
            "{}{}/models",
            self.inner.api_client.base_url, self.inner.api_client.api_version
        );
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut query = vec![("key", self.inner.config.api_key.as_str())];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }
            let response = self
                .inner
                .http
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|err| Error::Network {
                    attempts: 1,
                    source: err.without_url(),
                })?;
            let response = read_http_response(response)
                .await
                .map_err(|err| Error::Network {
                    attempts: 1,
                    source: err.without_url(),
                })?;
            if !response.is_ok() {
                return Err(Error::ApiError {
                    status: response.status,
                    message: response.body,
                });
            }
            let page: ListModelsResponse = serde_json::from_str(&response.body)?;
            models.extend(page.models);
            match page.next_page_token.filter(|token| !token.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }
        Ok(models)
    }
}

fn classify_models(
    models: &[Model],
    analysis_standard: &str,
    synthesis_standard: &str,
) -> ModelCatalog {
    let mut analysis = Vec::new();
    let mut synthesis = Vec::new();
    for model in models.iter().filter(|model| model.supports("generateContent")) {
        let Some(name) = model.name.as_deref().map(bare_model_name) else {
            continue;
        };
        if name.contains("gemini") {
            analysis.push(name.to_string());
        }
        if ["gemini", "image", "vision"]
            .iter()
            .any(|keyword| name.contains(keyword))
        {
            synthesis.push(name.to_string());
        }
    }
    finish_list(&mut analysis, analysis_standard);
    finish_list(&mut synthesis, synthesis_standard);
    ModelCatalog {
        analysis,
        synthesis,
    }
}

fn finish_list(list: &mut Vec<String>, standard: &str) {
    list.sort_unstable_by(|a, b| b.cmp(a));
    list.dedup();
    let standard = bare_model_name(standard);
    if !list.iter().any(|name| name == standard) {
        list.push(standard.to_string());
    }
}
