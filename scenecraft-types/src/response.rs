use serde::{Deserialize, Serialize};

use crate::content::{Blob, Content};
use crate::enums::{BlockedReason, FinishReason};

/// 生成内容响应。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_feedback: Option<PromptFeedback>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
}

impl GenerateContentResponse {
    /// 第一个候选。
    #[must_use]
    pub fn first_candidate(&self) -> Option<&Candidate> {
        self.candidates.first()
    }

    /// 提取第一个候选的文本。
    #[must_use]
    pub fn text(&self) -> Option<String> {
        self.first_candidate()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(Content::first_text)
            .map(ToString::to_string)
    }

    /// 提取第一个候选中的内联数据。
    #[must_use]
    pub fn inline_data(&self) -> Option<&Blob> {
        self.first_candidate()
            .and_then(|candidate| candidate.content.as_ref())
            .and_then(Content::first_inline_data)
    }

    /// Prompt 被拦截的原因（若有）。
    #[must_use]
    pub fn prompt_block_reason(&self) -> Option<BlockedReason> {
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason)
    }
}

/// 响应候选。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<FinishReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finish_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<i32>,
}

impl Candidate {
    #[must_use]
    pub fn is_safety_blocked(&self) -> bool {
        self.finish_reason.is_some_and(FinishReason::is_safety_block)
    }

    /// 候选的 part 列表，缺失 content 时为空。
    #[must_use]
    pub fn parts(&self) -> &[crate::content::Part] {
        self.content
            .as_ref()
            .map(|content| content.parts.as_slice())
            .unwrap_or_default()
    }
}

/// Prompt 反馈。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<BlockedReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason_message: Option<String>,
}
