use serde::{Deserialize, Serialize};

use crate::enums::Modality;

/// 生成配置（请求体中的 `generation_config`）。
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GenerationConfig {
    /// 为 `application/json` 时模型输出 JSON 文本。
    #[serde(
        default,
        alias = "responseMimeType",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_mime_type: Option<String>,
    #[serde(
        default,
        alias = "responseModalities",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_modalities: Option<Vec<Modality>>,
}

impl GenerationConfig {
    /// JSON 输出模式（场景分析）。
    #[must_use]
    pub fn json_output() -> Self {
        Self {
            response_mime_type: Some("application/json".into()),
            response_modalities: None,
        }
    }

    /// 图像输出模式（图像合成）。
    #[must_use]
    pub fn image_output() -> Self {
        Self {
            response_mime_type: None,
            response_modalities: Some(vec![Modality::Image]),
        }
    }
}
