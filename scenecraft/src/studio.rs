//! Scene analysis and product image synthesis.

use std::sync::Arc;

use image::DynamicImage;
use scenecraft_types::config::GenerationConfig;
use scenecraft_types::content::{Content, Part, Role};
use scenecraft_types::models::GenerateContentRequest;
use scenecraft_types::scene::SceneProposal;
use tracing::debug;

use crate::client::ClientInner;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::media::encode_for_upload;

mod parsers;
mod prompts;

pub use parsers::{parse_scene_proposals, EXCERPT_CHARS, MISSING_REASON, UNTITLED_SCENE};
pub use prompts::{SCENE_QUALITY_KEYWORDS, SYNTHESIS_QUALITY_SUFFIX};

/// 图像合成的可选输入。
#[derive(Debug, Clone, Default)]
pub struct SynthesisOptions {
    /// 用户额外需求，追加在场景提示词之后。
    pub extra_requirements: Option<String>,
    /// 风格/角色参考图，作为第二张图片发送。
    pub reference_image: Option<DynamicImage>,
}

#[derive(Clone)]
pub struct Studio {
    pub(crate) inner: Arc<ClientInner>,
}

impl Studio {
    pub(crate) fn new(inner: Arc<ClientInner>) -> Self {
        Self { inner }
    }

    /// 分析商品图片，返回场景提案。
    ///
    /// `model` 为高级档时失败会回退到配置的标准分析模型一次。
    ///
    /// # Errors
    /// 见 [`Error`]：配额、接口错误、安全拦截、响应格式错误或网络失败。
    pub async fn analyze(
        &self,
        model: impl Into<String>,
        image: &DynamicImage,
    ) -> Result<Vec<SceneProposal>> {
        let model = model.into();
        let request = build_analysis_request(image)?;
        let scenes = Dispatcher::new(self.inner.clone())
            .dispatch_with_fallback(
                &self.inner.config.analysis_models,
                &model,
                &request,
                parsers::parse_analysis_response,
            )
            .await?;
        debug!(model = %model, count = scenes.len(), "scene analysis finished");
        Ok(scenes)
    }

    /// 按场景提示词合成新的商品图。
    ///
    /// `model` 为高级档时失败会回退到配置的标准合成模型一次；
    /// 图片解码失败不会触发回退。
    ///
    /// # Errors
    /// 见 [`Error`]；模型只返回文字时为 [`Error::DeclinedSynthesis`]。
    pub async fn synthesize(
        &self,
        model: impl Into<String>,
        product: &DynamicImage,
        scene_prompt: &str,
        options: SynthesisOptions,
    ) -> Result<DynamicImage> {
        let model = model.into();
        let request = build_synthesis_request(product, scene_prompt, &options)?;
        let image = Dispatcher::new(self.inner.clone())
            .dispatch_with_fallback(
                &self.inner.config.synthesis_models,
                &model,
                &request,
                parsers::parse_synthesis_response,
            )
            .await?;
        debug!(
            model = %model,
            width = image.width(),
            height = image.height(),
            "image synthesis finished"
        );
        Ok(image)
    }
}

pub(crate) fn build_analysis_request(image: &DynamicImage) -> Result<GenerateContentRequest> {
    let parts = vec![
        Part::text(prompts::analysis_prompt()),
        Part::blob(encode_for_upload(image)?),
    ];
    Ok(GenerateContentRequest {
        contents: vec![Content::from_parts(parts, Role::User)],
        generation_config: Some(GenerationConfig::json_output()),
    })
}

pub(crate) fn build_synthesis_request(
    product: &DynamicImage,
    scene_prompt: &str,
    options: &SynthesisOptions,
) -> Result<GenerateContentRequest> {
    if scene_prompt.trim().is_empty() {
        return Err(Error::InvalidRequest {
            message: "scene prompt must not be empty".into(),
        });
    }
    let text = prompts::synthesis_prompt(
        scene_prompt,
        options.extra_requirements.as_deref(),
        options.reference_image.is_some(),
    );
    let mut parts = vec![Part::text(text), Part::blob(encode_for_upload(product)?)];
    if let Some(reference) = &options.reference_image {
        parts.push(Part::blob(encode_for_upload(reference)?));
    }
    Ok(GenerateContentRequest {
        contents: vec![Content::from_parts(parts, Role::User)],
        generation_config: Some(GenerationConfig::image_output()),
    })
}
