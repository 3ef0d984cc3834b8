//! Response parsing for scene analysis and image synthesis.

use image::error::{DecodingError, ImageFormatHint};
use image::{DynamicImage, ImageError};
use scenecraft_types::content::{Part, PartKind};
use scenecraft_types::http::HttpResponse;
use scenecraft_types::response::{Candidate, GenerateContentResponse};
use scenecraft_types::scene::SceneProposal;
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};
use crate::media::decode_image;

/// 缺少标题时的占位前缀，后接序号。
pub const UNTITLED_SCENE: &str = "Untitled scene";
/// 缺少理由时的占位文本。
pub const MISSING_REASON: &str = "No rationale provided.";
/// 错误信息中引用模型文本的最大字符数。
pub const EXCERPT_CHARS: usize = 200;

/// 把非 200 响应转换成对应错误，200 则解析响应体。
pub(crate) fn check_status(model: &str, response: HttpResponse) -> Result<GenerateContentResponse> {
    match response.status {
        200 => serde_json::from_str(&response.body)
            .map_err(|err| Error::malformed(format!("invalid JSON body from {model}: {err}"))),
        429 => Err(Error::QuotaExceeded {
            model: model.to_string(),
            message: api_error_message(&response.body),
        }),
        status => Err(Error::ApiError {
            status,
            message: api_error_message(&response.body),
        }),
    }
}

/// 优先取 `{"error": {"message": ...}}`，否则返回截断后的原始响应体。
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .and_then(Value::as_str)
                .map(ToString::to_string)
        })
        .unwrap_or_else(|| excerpt(body))
}

fn first_candidate<'a>(
    model: &str,
    response: &'a GenerateContentResponse,
) -> Result<&'a Candidate> {
    let Some(candidate) = response.first_candidate() else {
        if let Some(reason) = response.prompt_block_reason() {
            return Err(Error::SafetyBlocked {
                model: model.to_string(),
                reason: format!("prompt blocked ({reason:?})"),
            });
        }
        return Err(Error::malformed(format!("{model} returned no candidates")));
    };
    if candidate.is_safety_blocked() {
        let reason = candidate.finish_message.clone().unwrap_or_else(|| {
            candidate
                .finish_reason
                .map_or_else(String::new, |reason| format!("finish reason {reason:?}"))
        });
        return Err(Error::SafetyBlocked {
            model: model.to_string(),
            reason,
        });
    }
    if candidate.parts().is_empty() {
        return Err(Error::malformed(format!(
            "{model} returned a candidate without content parts"
        )));
    }
    Ok(candidate)
}

/// 解析场景分析响应。
pub(crate) fn parse_analysis_response(
    model: &str,
    response: HttpResponse,
) -> Result<Vec<SceneProposal>> {
    let response = check_status(model, response)?;
    let candidate = first_candidate(model, &response)?;
    let text = candidate
        .content
        .as_ref()
        .and_then(|content| content.first_text())
        .ok_or_else(|| Error::malformed(format!("{model} returned no text part")))?;
    parse_scene_proposals(text)
}

/// 解析场景 JSON；容忍 Markdown 代码块包裹、对象包裹数组以及缺失字段。
///
/// # Errors
/// 文本不是 JSON、找不到数组或数组中没有可用条目时返回错误。
pub fn parse_scene_proposals(text: &str) -> Result<Vec<SceneProposal>> {
    let value: Value = match serde_json::from_str(text.trim()) {
        Ok(value) => value,
        Err(_) => serde_json::from_str(strip_code_fences(text)).map_err(|err| {
            Error::malformed(format!("scene list is not valid JSON: {err}"))
        })?,
    };

    let entries = match &value {
        Value::Array(items) => items.as_slice(),
        Value::Object(map) if map.contains_key("title") || map.contains_key("prompt") => {
            std::slice::from_ref(&value)
        }
        Value::Object(map) => map
            .values()
            .find_map(Value::as_array)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::malformed("scene list JSON holds no array"))?,
        _ => return Err(Error::malformed("scene list JSON is not an array")),
    };

    let mut scenes = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        match scene_from_value(scenes.len() + 1, entry) {
            Some(scene) => scenes.push(scene),
            None => warn!(index, "skipping scene entry that is not an object"),
        }
    }
    if scenes.is_empty() {
        return Err(Error::malformed("scene list is empty"));
    }
    Ok(scenes)
}

/// 缺失字段的替换规则：标题为 `Untitled scene N`，提示词沿用标题，理由为固定文本。
fn scene_from_value(ordinal: usize, value: &Value) -> Option<SceneProposal> {
    let object = value.as_object()?;
    let field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(ToString::to_string)
    };
    let title = field("title").unwrap_or_else(|| format!("{UNTITLED_SCENE} {ordinal}"));
    let prompt = field("prompt").unwrap_or_else(|| title.clone());
    let reason = field("reason").unwrap_or_else(|| MISSING_REASON.to_string());
    Some(SceneProposal {
        title,
        prompt,
        reason,
    })
}

/// 去掉 ```` ```json ```` / ```` ``` ```` 代码块包裹，取第一个与最后一个围栏之间的内容；
/// 没有代码块时原样返回（去除首尾空白）。
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let body = trimmed[start + 3..].trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    let body = body.rfind("```").map_or(body, |end| &body[..end]);
    body.trim()
}

/// 解析图像合成响应并解码图片。
pub(crate) fn parse_synthesis_response(
    model: &str,
    response: HttpResponse,
) -> Result<DynamicImage> {
    let response = check_status(model, response)?;
    let candidate = first_candidate(model, &response)?;
    let parts = candidate.parts();

    for part in parts.iter().filter(|part| !part.is_thought()) {
        if let Some(blob) = part.inline_data_ref() {
            return decode_image(&blob.data);
        }
        if carries_undecodable_inline_data(part) {
            return Err(Error::Image {
                source: ImageError::Decoding(DecodingError::new(
                    ImageFormatHint::Unknown,
                    format!("inline image data from {model} is not valid base64"),
                )),
            });
        }
    }

    let text: Vec<&str> = parts
        .iter()
        .filter(|part| !part.is_thought())
        .filter_map(|part| part.text_value())
        .collect();
    if text.is_empty() {
        return Err(Error::malformed(format!(
            "{model} returned neither an image nor text"
        )));
    }
    Err(Error::DeclinedSynthesis {
        model: model.to_string(),
        excerpt: excerpt(&text.join(" ")),
    })
}

/// base64 无法解码的内联数据会落到 `PartKind::Other`，按图片解码失败处理。
fn carries_undecodable_inline_data(part: &Part) -> bool {
    matches!(
        &part.kind,
        PartKind::Other(map) if map.contains_key("inlineData") || map.contains_key("inline_data")
    )
}

/// 截断到 [`EXCERPT_CHARS`] 个字符。
pub(crate) fn excerpt(text: &str) -> String {
    let text = text.trim();
    if text.chars().count() <= EXCERPT_CHARS {
        return text.to_string();
    }
    let mut short: String = text.chars().take(EXCERPT_CHARS).collect();
    short.push('…');
    short
}
