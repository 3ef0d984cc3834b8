use serde::{Deserialize, Serialize};

/// 场景提案：标题、生图提示词与推荐理由。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneProposal {
    pub title: String,
    pub prompt: String,
    pub reason: String,
}
