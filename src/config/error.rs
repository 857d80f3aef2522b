// ==========================================
// im2txt 图像描述模型 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 默认值构造不会失败；错误只来自加载、覆写、快照与严格校验
// ==========================================

use std::path::PathBuf;

use thiserror::Error;

use crate::config::validator::ValidationViolation;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    // ===== 设置文件 =====
    #[error("设置文件读取失败 ({path}): {source}")]
    SettingsFileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("设置文件解析失败 ({path}): {message}")]
    SettingsFileParse { path: PathBuf, message: String },

    // ===== 键值覆写 =====
    #[error("未识别的配置键: {0}")]
    UnknownKey(String),

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },

    // ===== 快照 =====
    #[error("配置快照无效: {0}")]
    InvalidSnapshot(String),

    // ===== 校验 =====
    #[error("配置校验失败 (模式: {mode}): {} 项错误", .violations.len())]
    Validation {
        mode: String,
        violations: Vec<ValidationViolation>,
    },

    // ===== 通用 =====
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
