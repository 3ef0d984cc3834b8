//! Premium / standard model tiers.

/// 场景分析默认高级模型。
pub const DEFAULT_ANALYSIS_PREMIUM: &str = "gemini-2.5-pro";
/// 场景分析默认标准模型（回退目标）。
pub const DEFAULT_ANALYSIS_STANDARD: &str = "gemini-2.5-flash-preview-09-2025";
/// 图像合成默认高级模型。
pub const DEFAULT_SYNTHESIS_PREMIUM: &str = "gemini-3-pro-image-preview";
/// 图像合成默认标准模型（回退目标）。
pub const DEFAULT_SYNTHESIS_STANDARD: &str = "gemini-2.5-flash-image-preview";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Premium,
    Standard,
}

/// 一个用途下的两档模型。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTiers {
    pub premium: String,
    pub standard: String,
}

impl ModelTiers {
    pub fn new(premium: impl Into<String>, standard: impl Into<String>) -> Self {
        Self {
            premium: premium.into(),
            standard: standard.into(),
        }
    }

    #[must_use]
    pub fn analysis() -> Self {
        Self::new(DEFAULT_ANALYSIS_PREMIUM, DEFAULT_ANALYSIS_STANDARD)
    }

    #[must_use]
    pub fn synthesis() -> Self {
        Self::new(DEFAULT_SYNTHESIS_PREMIUM, DEFAULT_SYNTHESIS_STANDARD)
    }

    /// 判断模型所属档位。
    ///
    /// 只有标准模型本身属于 `Standard`；其余任意模型（包括调用方自选的模型）都按
    /// `Premium` 处理，失败时可回退一次。
    #[must_use]
    pub fn tier_of(&self, model: &str) -> Tier {
        if bare_model_name(model) == bare_model_name(&self.standard) {
            Tier::Standard
        } else {
            Tier::Premium
        }
    }

    /// 回退目标；标准档返回 `None`。
    #[must_use]
    pub fn fallback_for(&self, model: &str) -> Option<&str> {
        match self.tier_of(model) {
            Tier::Premium => Some(self.standard.as_str()),
            Tier::Standard => None,
        }
    }
}

/// 去掉 `models/` 前缀。
pub(crate) fn bare_model_name(model: &str) -> &str {
    model.trim().strip_prefix("models/").unwrap_or(model.trim())
}
