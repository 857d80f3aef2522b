// ==========================================
// im2txt 图像描述模型 - 词向量加载配置
// ==========================================
// 职责: 描述如何加载预训练 GloVe 词向量表
// 约束: 纯值类型，按值嵌入 ModelConfig，不共享
// ==========================================

use serde::{Deserialize, Serialize};

use crate::config::paths;

/// 预训练词向量（GloVe）加载配置
///
/// 可识别选项: embedding / source_directory / vocabulary_length /
/// start_token / end_token / unknown_token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmbeddingConfig {
    /// 词向量维度
    pub embedding: usize,

    /// 词向量文件所在目录（保留末尾 `/`）
    pub source_directory: String,

    /// 加载的词表长度（取频率最高的前 N 个词）
    pub vocabulary_length: usize,

    /// 句首标记
    pub start_token: String,

    /// 句尾标记
    pub end_token: String,

    /// 未登录词标记
    pub unknown_token: String,
}

impl EmbeddingConfig {
    /// 创建默认词向量配置
    pub fn new() -> Self {
        Self::default()
    }

    /// 三个哨兵标记，顺序为 (start, end, unknown)
    pub fn sentinel_tokens(&self) -> [&str; 3] {
        [
            self.start_token.as_str(),
            self.end_token.as_str(),
            self.unknown_token.as_str(),
        ]
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            embedding: 300,
            source_directory: paths::DEFAULT_EMBEDDING_DIR.to_string(),
            vocabulary_length: 70000,
            start_token: "<S>".to_string(),
            end_token: "</S>".to_string(),
            unknown_token: "<UNK>".to_string(),
        }
    }
}
