use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// 一次 HTTP 往返的原始结果。
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status: u16,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: String,
}

impl HttpResponse {
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// 请求重试与回退参数。
///
/// 第 `n` 次（从 0 开始）可重试失败后等待 `initial_delay * exp_base^n`。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryOptions {
    /// 单次分发的最大尝试次数（至少 1）。
    pub attempts: u32,
    pub initial_delay: Duration,
    pub exp_base: u32,
    /// 切换到标准模型前的停顿。
    pub fallback_pause: Duration,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            attempts: 3,
            initial_delay: Duration::from_secs(2),
            exp_base: 2,
            fallback_pause: Duration::from_secs(1),
        }
    }
}

impl RetryOptions {
    /// 无等待的重试参数（测试与本地调试用）。
    #[must_use]
    pub const fn immediate(attempts: u32) -> Self {
        Self {
            attempts,
            initial_delay: Duration::ZERO,
            exp_base: 0,
            fallback_pause: Duration::ZERO,
        }
    }

    /// 第 `attempt` 次失败后的等待时长。
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self.exp_base.saturating_pow(attempt);
        self.initial_delay.saturating_mul(factor)
    }
}
