//! Error definitions for the client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP client error: {source}")]
    HttpClient {
        #[from]
        source: reqwest::Error,
    },

    /// 所有尝试都未拿到 HTTP 响应。
    #[error("Network failure after {attempts} attempt(s): {source}")]
    Network {
        attempts: u32,
        #[source]
        source: reqwest::Error,
    },

    #[error("Quota exceeded for model {model} (status 429), please try again later: {message}")]
    QuotaExceeded { model: String, message: String },

    #[error("API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Blocked by content safety policy on model {model}: {reason}")]
    SafetyBlocked { model: String, reason: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Model {model} declined to synthesize an image and replied with text: {excerpt}")]
    DeclinedSynthesis { model: String, excerpt: String },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    #[error("Image error: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },
}

impl Error {
    /// 该错误是否允许从高级模型切换到标准模型再试一次。
    #[must_use]
    pub const fn permits_fallback(&self) -> bool {
        matches!(
            self,
            Self::QuotaExceeded { .. }
                | Self::ApiError { .. }
                | Self::SafetyBlocked { .. }
                | Self::MalformedResponse { .. }
                | Self::DeclinedSynthesis { .. }
        )
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_failures_permit_fallback() {
        let quota = Error::QuotaExceeded {
            model: "m".into(),
            message: "slow down".into(),
        };
        assert!(quota.permits_fallback());
        assert!(Error::malformed("no candidates").permits_fallback());
        assert!(Error::ApiError {
            status: 400,
            message: "bad".into()
        }
        .permits_fallback());
    }

    #[test]
    fn local_failures_are_terminal() {
        let config = Error::InvalidConfig {
            message: "missing key".into(),
        };
        assert!(!config.permits_fallback());
        let decode = Error::from(image::ImageError::IoError(std::io::Error::other("truncated")));
        assert!(!decode.permits_fallback());
    }

    #[test]
    fn messages_are_human_readable() {
        let err = Error::DeclinedSynthesis {
            model: "gemini-2.5-flash-image-preview".into(),
            excerpt: "I cannot draw that".into(),
        };
        let message = err.to_string();
        assert!(message.contains("declined"));
        assert!(message.contains("I cannot draw that"));
    }
}
